//! 대화상자 위젯
//!
//! 이름 입력, 확인, 진행률, 결과/오류 표시

use crate::app::text_edit::TextInput;
use crate::models::operation::TransferProgress;
use crate::ui::Theme;
use crate::utils::formatter::format_file_size;
use crate::utils::path_display::truncate_middle;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// 대화상자 내부 좌우 여백
const DIALOG_H_PADDING: u16 = 2;
/// 대화상자 내부 상단 여백
const DIALOG_V_PADDING: u16 = 1;

/// 입력 대화상자 용도
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPurpose {
    NewFolder,
    Rename,
}

impl InputPurpose {
    fn title(&self) -> &'static str {
        match self {
            InputPurpose::NewFolder => "New folder",
            InputPurpose::Rename => "Rename",
        }
    }

    fn prompt(&self) -> &'static str {
        match self {
            InputPurpose::NewFolder => "Folder name:",
            InputPurpose::Rename => "New name:",
        }
    }
}

/// 대화상자 종류
#[derive(Debug, Clone)]
pub enum DialogKind {
    Input {
        purpose: InputPurpose,
        input: TextInput,
        selected_button: usize, // 0: OK, 1: Cancel
    },
    Confirm {
        title: String,
        message: String,
        selected_button: usize, // 0: OK, 1: Cancel
    },
    Progress {
        title: String,
        progress: TransferProgress,
        cancelling: bool,
    },
    Message {
        title: String,
        message: String,
    },
    Error {
        title: String,
        message: String,
    },
}

impl DialogKind {
    pub fn input(purpose: InputPurpose, initial: impl Into<String>) -> Self {
        DialogKind::Input {
            purpose,
            input: TextInput::new(initial),
            selected_button: 0,
        }
    }

    pub fn confirm(title: impl Into<String>, message: impl Into<String>) -> Self {
        DialogKind::Confirm {
            title: title.into(),
            message: message.into(),
            selected_button: 0,
        }
    }

    pub fn progress(title: impl Into<String>, progress: TransferProgress, cancelling: bool) -> Self {
        DialogKind::Progress {
            title: title.into(),
            progress,
            cancelling,
        }
    }

    pub fn message(title: impl Into<String>, message: impl Into<String>) -> Self {
        DialogKind::Message {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        DialogKind::Error {
            title: title.into(),
            message: message.into(),
        }
    }

    /// OK/Cancel 전환
    pub fn toggle_button(&mut self) {
        if let DialogKind::Input {
            selected_button, ..
        }
        | DialogKind::Confirm {
            selected_button, ..
        } = self
        {
            *selected_button = 1 - (*selected_button).min(1);
        }
    }

    pub fn selected_button(&self) -> Option<usize> {
        match self {
            DialogKind::Input {
                selected_button, ..
            }
            | DialogKind::Confirm {
                selected_button, ..
            } => Some(*selected_button),
            _ => None,
        }
    }

    pub fn input_mut(&mut self) -> Option<&mut TextInput> {
        match self {
            DialogKind::Input { input, .. } => Some(input),
            _ => None,
        }
    }
}

pub struct Dialog<'a> {
    kind: &'a DialogKind,
    bg_color: Color,
    fg_color: Color,
    border_color: Color,
    button_bg: Color,
    button_selected_bg: Color,
    input_bg: Color,
    muted_color: Color,
    warning_color: Color,
    error_color: Color,
}

impl<'a> Dialog<'a> {
    pub fn new(kind: &'a DialogKind) -> Self {
        Self {
            kind,
            bg_color: Color::Rgb(45, 45, 48),
            fg_color: Color::Rgb(212, 212, 212),
            border_color: Color::Rgb(0, 120, 212),
            button_bg: Color::Rgb(60, 60, 60),
            button_selected_bg: Color::Rgb(0, 120, 212),
            input_bg: Color::Rgb(30, 30, 30),
            muted_color: Color::Rgb(128, 128, 128),
            warning_color: Color::Rgb(255, 165, 0),
            error_color: Color::Rgb(244, 71, 71),
        }
    }

    /// 테마 적용
    pub fn theme(mut self, theme: &Theme) -> Self {
        self.bg_color = theme.dialog_bg.to_color();
        self.fg_color = theme.fg_primary.to_color();
        self.border_color = theme.accent.to_color();
        self.button_bg = theme.button_bg.to_color();
        self.button_selected_bg = theme.accent.to_color();
        self.input_bg = theme.panel_bg.to_color();
        self.muted_color = theme.muted.to_color();
        self.warning_color = theme.warning.to_color();
        self.error_color = theme.error.to_color();
        self
    }

    /// 화면 중앙 영역
    fn calculate_area(&self, screen: Rect) -> Rect {
        let sw = screen.width;
        let sh = screen.height;

        let (width, height) = match self.kind {
            DialogKind::Input { .. } => (50u16, 7u16),
            DialogKind::Confirm { .. } => (44, 8),
            DialogKind::Progress { .. } => (50, 9),
            DialogKind::Message { message, .. } | DialogKind::Error { message, .. } => {
                let lines = message.lines().count().max(1) as u16;
                (56, 5 + lines)
            }
        };

        let width = width.min(sw.saturating_sub(4));
        let height = height.min(sh.saturating_sub(2));
        Rect {
            x: screen.x + sw.saturating_sub(width) / 2,
            y: screen.y + sh.saturating_sub(height) / 2,
            width,
            height,
        }
    }

    fn frame(&self, buf: &mut Buffer, area: Rect, title: &str, accent: Color) -> Rect {
        Block::default()
            .title(format!(" {} ", title))
            .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent))
            .style(Style::default().bg(self.bg_color))
            .render(area, buf);

        Rect {
            x: area.x + DIALOG_H_PADDING,
            y: area.y + DIALOG_V_PADDING,
            width: area.width.saturating_sub(DIALOG_H_PADDING * 2),
            height: area.height.saturating_sub(DIALOG_V_PADDING * 2),
        }
    }

    fn render_button(&self, buf: &mut Buffer, x: u16, y: u16, label: &str, selected: bool) -> u16 {
        let bg = if selected {
            self.button_selected_bg
        } else {
            self.button_bg
        };
        let padded = format!(" {} ", label);
        buf.set_string(x, y, &padded, Style::default().fg(self.fg_color).bg(bg));
        padded.width() as u16
    }

    fn render_ok_cancel(&self, buf: &mut Buffer, area: Rect, selected_button: usize) {
        let y = area.y + area.height.saturating_sub(2);
        // " OK " + 2 + " Cancel "
        let x = area.x + area.width.saturating_sub(14) / 2;
        let ok_width = self.render_button(buf, x, y, "OK", selected_button == 0);
        self.render_button(buf, x + ok_width + 2, y, "Cancel", selected_button == 1);
    }

    fn render_input(
        &self,
        buf: &mut Buffer,
        area: Rect,
        purpose: InputPurpose,
        input: &TextInput,
        selected_button: usize,
    ) {
        let inner = self.frame(buf, area, purpose.title(), self.border_color);
        buf.set_string(inner.x, inner.y, purpose.prompt(), Style::default().fg(self.fg_color));

        let field_y = inner.y + 1;
        buf.set_style(
            Rect {
                x: inner.x,
                y: field_y,
                width: inner.width,
                height: 1,
            },
            Style::default().bg(self.input_bg),
        );

        // 커서가 보이도록 앞부분을 잘라낸다
        let max_cols = inner.width.saturating_sub(2) as usize;
        let value = input.value();
        let before_cursor = &value[..input.cursor()];
        let mut start = 0;
        let mut cursor_col = before_cursor.width();
        for c in before_cursor.chars() {
            if cursor_col < max_cols {
                break;
            }
            start += c.len_utf8();
            cursor_col -= c.width().unwrap_or(0);
        }
        buf.set_stringn(
            inner.x + 1,
            field_y,
            &value[start..],
            max_cols,
            Style::default().fg(self.fg_color).bg(self.input_bg),
        );
        if let Some(cell) = buf.cell_mut((inner.x + 1 + cursor_col as u16, field_y)) {
            if input.cursor() < value.len() {
                cell.set_style(Style::default().fg(self.input_bg).bg(self.fg_color));
            } else {
                cell.set_char('▏');
            }
        }

        self.render_ok_cancel(buf, area, selected_button);
    }

    fn render_confirm(
        &self,
        buf: &mut Buffer,
        area: Rect,
        title: &str,
        message: &str,
        selected_button: usize,
    ) {
        let inner = self.frame(buf, area, title, self.warning_color);
        Paragraph::new(message)
            .style(Style::default().fg(self.fg_color))
            .wrap(Wrap { trim: true })
            .render(
                Rect {
                    height: inner.height.saturating_sub(2),
                    ..inner
                },
                buf,
            );
        self.render_ok_cancel(buf, area, selected_button);
    }

    fn render_progress(
        &self,
        buf: &mut Buffer,
        area: Rect,
        title: &str,
        progress: &TransferProgress,
        cancelling: bool,
    ) {
        let inner = self.frame(buf, area, title, self.border_color);
        let text_style = Style::default().fg(self.fg_color);

        let current = truncate_middle(&progress.current, inner.width as usize);
        buf.set_string(inner.x, inner.y, &current, text_style);

        let percent = progress.percentage();
        Gauge::default()
            .ratio(f64::from(percent) / 100.0)
            .gauge_style(Style::default().fg(self.border_color).bg(self.button_bg))
            .label(format!("{}%", percent))
            .render(
                Rect {
                    x: inner.x,
                    y: inner.y + 2,
                    width: inner.width,
                    height: 1,
                },
                buf,
            );

        let mut counts = format!("{} / {} items", progress.items_done, progress.items_total);
        if progress.bytes_total > 0 {
            counts.push_str(&format!(
                "  ({} / {})",
                format_file_size(progress.bytes_done),
                format_file_size(progress.bytes_total)
            ));
        }
        buf.set_string(inner.x, inner.y + 4, &counts, text_style);

        let hint = if cancelling {
            "Cancelling..."
        } else {
            "Press Esc to cancel"
        };
        buf.set_string(inner.x, inner.y + 6, hint, Style::default().fg(self.muted_color));
    }

    fn render_message(&self, buf: &mut Buffer, area: Rect, title: &str, message: &str, is_error: bool) {
        let accent = if is_error {
            self.error_color
        } else {
            self.border_color
        };
        let inner = self.frame(buf, area, title, accent);
        Paragraph::new(message)
            .style(Style::default().fg(self.fg_color))
            .wrap(Wrap { trim: false })
            .render(
                Rect {
                    height: inner.height.saturating_sub(2),
                    ..inner
                },
                buf,
            );

        let y = area.y + area.height.saturating_sub(2);
        let x = area.x + area.width.saturating_sub(4) / 2;
        self.render_button(buf, x, y, "OK", true);
    }
}

impl Widget for Dialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dialog_area = self.calculate_area(area);
        Clear.render(dialog_area, buf);

        match self.kind {
            DialogKind::Input {
                purpose,
                input,
                selected_button,
            } => self.render_input(buf, dialog_area, *purpose, input, *selected_button),
            DialogKind::Confirm {
                title,
                message,
                selected_button,
            } => self.render_confirm(buf, dialog_area, title, message, *selected_button),
            DialogKind::Progress {
                title,
                progress,
                cancelling,
            } => self.render_progress(buf, dialog_area, title, progress, *cancelling),
            DialogKind::Message { title, message } => {
                self.render_message(buf, dialog_area, title, message, false)
            }
            DialogKind::Error { title, message } => {
                self.render_message(buf, dialog_area, title, message, true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_button() {
        let mut dialog = DialogKind::confirm("Delete", "Delete 'a'?");
        assert_eq!(dialog.selected_button(), Some(0));
        dialog.toggle_button();
        assert_eq!(dialog.selected_button(), Some(1));
        dialog.toggle_button();
        assert_eq!(dialog.selected_button(), Some(0));

        let mut message = DialogKind::message("Copy", "done");
        message.toggle_button();
        assert_eq!(message.selected_button(), None);
    }

    #[test]
    fn test_render_progress_does_not_panic_on_tiny_area() {
        let mut progress = TransferProgress::new(3, 0);
        progress.current = "a-very-long-file-name.bin".into();
        let kind = DialogKind::progress("Copying", progress, false);

        let area = Rect::new(0, 0, 12, 6);
        let mut buf = Buffer::empty(area);
        Dialog::new(&kind).render(area, &mut buf);
    }

    #[test]
    fn test_render_input_shows_value() {
        let kind = DialogKind::input(InputPurpose::NewFolder, "New folder");
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        Dialog::new(&kind).render(area, &mut buf);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("New folder"));
        assert!(text.contains("Folder name:"));
    }
}
