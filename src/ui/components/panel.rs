// Panel component - 현재 위치의 항목 목록
//
// 커서 행 강조, 선택/붙여넣기 대기 표시, 스크롤

use crate::models::entry::{Entry, FileKind};
use crate::models::navigation::Cursor;
use crate::models::selection::SelectionSet;
use crate::ui::Theme;
use crate::utils::formatter::{format_date, format_file_size};
use crate::utils::path_display::{fit_path, truncate_middle};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// 목록 패널
pub struct Panel<'a> {
    title: &'a str,
    entries: &'a [Entry],
    cursor: Cursor,
    marked: Option<&'a SelectionSet>,
    /// 현재 위치에서 담아 둔 항목일 때만 전달
    pending: Option<&'a SelectionSet>,
    package_extensions: &'a [String],
    border_color: Color,
    bg_color: Color,
    file_normal_color: Color,
    file_selected_color: Color,
    file_selected_bg_color: Color,
    directory_color: Color,
    archive_color: Color,
    marked_color: Color,
    pending_color: Color,
    muted_color: Color,
}

impl<'a> Panel<'a> {
    pub fn new(entries: &'a [Entry]) -> Self {
        Self {
            title: "",
            entries,
            cursor: Cursor::default(),
            marked: None,
            pending: None,
            package_extensions: &[],
            border_color: Color::Rgb(0, 120, 212),
            bg_color: Color::Rgb(30, 30, 30),
            file_normal_color: Color::Rgb(212, 212, 212),
            file_selected_color: Color::Rgb(255, 255, 255),
            file_selected_bg_color: Color::Rgb(0, 120, 212),
            directory_color: Color::Rgb(86, 156, 214),
            archive_color: Color::Rgb(206, 145, 120),
            marked_color: Color::Rgb(255, 215, 0),
            pending_color: Color::Rgb(78, 201, 176),
            muted_color: Color::Rgb(128, 128, 128),
        }
    }

    /// 제목 설정 (경로)
    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    pub fn cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn marked(mut self, marked: &'a SelectionSet) -> Self {
        self.marked = Some(marked);
        self
    }

    pub fn pending(mut self, pending: Option<&'a SelectionSet>) -> Self {
        self.pending = pending;
        self
    }

    pub fn package_extensions(mut self, extensions: &'a [String]) -> Self {
        self.package_extensions = extensions;
        self
    }

    /// 테마 적용
    pub fn theme(mut self, theme: &Theme) -> Self {
        self.border_color = theme.panel_border.to_color();
        self.bg_color = theme.panel_bg.to_color();
        self.file_normal_color = theme.file_normal.to_color();
        self.file_selected_color = theme.file_selected.to_color();
        self.file_selected_bg_color = theme.file_selected_bg.to_color();
        self.directory_color = theme.directory.to_color();
        self.archive_color = theme.archive.to_color();
        self.marked_color = theme.file_marked.to_color();
        self.pending_color = theme.file_pending.to_color();
        self.muted_color = theme.muted.to_color();
        self
    }

    fn entry_color(&self, entry: &Entry) -> Color {
        if entry.is_parent_marker() {
            return self.muted_color;
        }
        if entry.is_folder {
            return self.directory_color;
        }
        match entry.kind(self.package_extensions) {
            FileKind::Archive | FileKind::Package => self.archive_color,
            FileKind::Other => self.file_normal_color,
        }
    }

    fn render_entry(&self, entry: &Entry, is_cursor: bool, area: Rect, buf: &mut Buffer) {
        let is_marked = self.marked.is_some_and(|m| m.contains(&entry.name));
        let is_pending = self.pending.is_some_and(|p| p.contains(&entry.name));

        let (marker, marker_color) = if is_marked {
            ("*", self.marked_color)
        } else if is_pending {
            ("+", self.pending_color)
        } else {
            (" ", self.file_normal_color)
        };

        let base = if is_cursor {
            Style::default()
                .fg(self.file_selected_color)
                .bg(self.file_selected_bg_color)
        } else {
            Style::default().fg(self.entry_color(entry))
        };
        let name_style = if is_marked {
            base.add_modifier(Modifier::BOLD)
        } else {
            base
        };

        // " * name/      size  YYYY-MM-DD HH:MM"
        let width = area.width as usize;
        let show_details = width >= 44 && !entry.is_parent_marker();
        let details_width = if show_details { 10 + 1 + 16 + 1 } else { 0 };
        let name_width = width.saturating_sub(3 + details_width);

        let mut name = entry.name.clone();
        if entry.is_folder && !entry.is_parent_marker() {
            name.push('/');
        }
        let name = truncate_middle(&name, name_width);

        let mut spans = vec![
            Span::styled(" ", base),
            Span::styled(marker, base.fg(marker_color)),
            Span::styled(" ", base),
            Span::styled(format!("{:<w$}", name, w = name_width), name_style),
        ];
        if show_details {
            let size = if entry.is_folder {
                "<DIR>".to_string()
            } else {
                format_file_size(entry.size)
            };
            spans.push(Span::styled(format!("{:>10} ", size), base));
            spans.push(Span::styled(format!("{} ", format_date(entry.modified)), base));
        }

        buf.set_style(area, base);
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}

impl Widget for Panel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = fit_path(self.title, area.width.saturating_sub(4) as usize);
        let block = Block::default()
            .title(format!(" {} ", title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_color))
            .style(Style::default().bg(self.bg_color));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.entries.is_empty() {
            buf.set_string(
                inner.x + 1,
                inner.y,
                "(empty)",
                Style::default().fg(self.muted_color),
            );
            return;
        }

        let cursor_index = self.cursor.index();
        let visible = self
            .entries
            .iter()
            .enumerate()
            .skip(self.cursor.scroll)
            .take(inner.height as usize);
        for (row, (index, entry)) in visible.enumerate() {
            let row_area = Rect {
                x: inner.x,
                y: inner.y + row as u16,
                width: inner.width,
                height: 1,
            };
            self.render_entry(entry, index == cursor_index, row_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn rendered_rows(panel: Panel<'_>, area: Rect) -> Vec<String> {
        let mut buf = Buffer::empty(area);
        panel.render(area, &mut buf);
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buf.cell((x, y)).map_or(" ", |c| c.symbol()).to_string())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_render_starts_at_scroll_offset() {
        let entries: Vec<Entry> = (0..10)
            .map(|i| Entry::file(format!("f{}", i), 1, SystemTime::UNIX_EPOCH))
            .collect();
        let panel = Panel::new(&entries)
            .title("/tmp")
            .cursor(Cursor { scroll: 4, rel: 1 });

        let rows = rendered_rows(panel, Rect::new(0, 0, 30, 5));
        assert!(rows[1].contains("f4"));
        assert!(rows[3].contains("f6"));
        assert!(!rows.iter().any(|r| r.contains("f3")));
    }

    #[test]
    fn test_marked_entry_shows_marker() {
        let entries = vec![Entry::parent_marker(), Entry::file("a", 1, SystemTime::UNIX_EPOCH)];
        let mut sets = crate::models::selection::SelectionSets::new();
        sets.toggle_mark(&entries[1], std::path::Path::new("/tmp"));

        let panel = Panel::new(&entries).title("/tmp").marked(&sets.marked);
        let rows = rendered_rows(panel, Rect::new(0, 0, 30, 4));
        assert!(rows[2].contains("* a"));
        assert!(rows[1].contains(".."));
    }
}
