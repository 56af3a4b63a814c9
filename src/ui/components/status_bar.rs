// Status bar component - 상태바
//
// 항목 수, 선택/붙여넣기 대기 수, 아카이브 여부, 토스트 메시지

use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

#[derive(Default)]
pub struct StatusBar<'a> {
    file_count: usize,
    dir_count: usize,
    marked_count: usize,
    /// 예: "2 to copy"
    pending: Option<String>,
    /// 아카이브 안이면 형식 이름
    archive: Option<&'a str>,
    toast: Option<&'a str>,
    bg_color: Option<Color>,
    fg_color: Option<Color>,
    highlight_color: Option<Color>,
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(mut self, files: usize, dirs: usize) -> Self {
        self.file_count = files;
        self.dir_count = dirs;
        self
    }

    pub fn marked_count(mut self, count: usize) -> Self {
        self.marked_count = count;
        self
    }

    pub fn pending(mut self, pending: Option<String>) -> Self {
        self.pending = pending;
        self
    }

    pub fn archive(mut self, format: Option<&'a str>) -> Self {
        self.archive = format;
        self
    }

    pub fn toast(mut self, toast: Option<&'a str>) -> Self {
        self.toast = toast;
        self
    }

    /// 테마 적용
    pub fn theme(mut self, theme: &Theme) -> Self {
        self.bg_color = Some(theme.status_bar_bg.to_color());
        self.fg_color = Some(theme.status_bar_fg.to_color());
        self.highlight_color = Some(theme.file_marked.to_color());
        self
    }

    fn left_text(&self) -> String {
        let mut text = format!(" {} files, {} dirs", self.file_count, self.dir_count);
        if self.marked_count > 0 {
            text.push_str(&format!(" | {} marked", self.marked_count));
        }
        if let Some(pending) = &self.pending {
            text.push_str(&format!(" | {}", pending));
        }
        text
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg = self.bg_color.unwrap_or(Color::Rgb(0, 122, 204));
        let fg = self.fg_color.unwrap_or(Color::White);
        buf.set_style(area, Style::default().bg(bg));

        let left = match self.toast {
            Some(toast) => format!(" {}", toast),
            None => self.left_text(),
        };
        let right = self
            .archive
            .map(|format| format!("[{}] ", format))
            .unwrap_or_default();

        let padding = (area.width as usize).saturating_sub(left.width() + right.width());
        let left_style = if self.toast.is_some() {
            Style::default().fg(self.highlight_color.unwrap_or(Color::Yellow))
        } else {
            Style::default().fg(fg)
        };
        let line = Line::from(vec![
            Span::styled(left, left_style),
            Span::raw(" ".repeat(padding)),
            Span::styled(right, Style::default().fg(fg)),
        ]);
        Paragraph::new(line).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_text() {
        let bar = StatusBar::new()
            .counts(10, 5)
            .marked_count(2)
            .pending(Some("3 to move".into()));
        assert_eq!(bar.left_text(), " 10 files, 5 dirs | 2 marked | 3 to move");

        assert_eq!(StatusBar::new().counts(1, 0).left_text(), " 1 files, 0 dirs");
    }
}
