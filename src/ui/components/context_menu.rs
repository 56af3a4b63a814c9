// Context menu component - 항목 메뉴 팝업
//
// 강조 행 옆에 보이는 항목만 세로로 그린다.

use crate::models::context_menu::ContextMenu;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::Span,
    widgets::{Block, Borders, Clear, Widget},
};
use unicode_width::UnicodeWidthStr;

pub struct ContextMenuView<'a> {
    menu: &'a ContextMenu,
    /// 메뉴를 붙일 행 (화면 좌표)
    anchor_y: u16,
    bg_color: Color,
    fg_color: Color,
    selected_bg: Color,
    selected_fg: Color,
    border_color: Color,
}

impl<'a> ContextMenuView<'a> {
    pub fn new(menu: &'a ContextMenu) -> Self {
        Self {
            menu,
            anchor_y: 0,
            bg_color: Color::Rgb(45, 45, 48),
            fg_color: Color::Rgb(212, 212, 212),
            selected_bg: Color::Rgb(0, 120, 212),
            selected_fg: Color::White,
            border_color: Color::Rgb(60, 60, 60),
        }
    }

    pub fn anchor_y(mut self, y: u16) -> Self {
        self.anchor_y = y;
        self
    }

    /// 테마 적용
    pub fn theme(mut self, theme: &Theme) -> Self {
        self.bg_color = theme.dialog_bg.to_color();
        self.fg_color = theme.fg_primary.to_color();
        self.selected_bg = theme.file_selected_bg.to_color();
        self.selected_fg = theme.file_selected.to_color();
        self.border_color = theme.accent.to_color();
        self
    }

    fn popup_area(&self, area: Rect) -> Rect {
        let label_width = self
            .menu
            .items()
            .iter()
            .map(|item| item.label().width())
            .max()
            .unwrap_or(0) as u16;
        let width = (label_width + 4).min(area.width);
        let height = (self.menu.items().len() as u16 + 2).min(area.height);

        // 오른쪽 끝에 붙이고 아래로 넘치면 위로 올린다
        let x = area.x + area.width.saturating_sub(width + 2);
        let max_y = area.y + area.height.saturating_sub(height);
        Rect {
            x,
            y: self.anchor_y.clamp(area.y, max_y),
            width,
            height,
        }
    }
}

impl Widget for ContextMenuView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = self.popup_area(area);
        Clear.render(popup, buf);
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_color))
            .style(Style::default().bg(self.bg_color))
            .render(popup, buf);

        for (i, item) in self.menu.items().iter().enumerate() {
            let y = popup.y + 1 + i as u16;
            if y + 1 >= popup.y + popup.height {
                break;
            }
            let (bg, fg) = if i == self.menu.selected() {
                (self.selected_bg, self.selected_fg)
            } else {
                (self.bg_color, self.fg_color)
            };
            let row = Rect {
                x: popup.x + 1,
                y,
                width: popup.width.saturating_sub(2),
                height: 1,
            };
            buf.set_style(row, Style::default().bg(bg));
            buf.set_span(
                row.x + 1,
                y,
                &Span::styled(item.label(), Style::default().fg(fg).bg(bg)),
                row.width.saturating_sub(1),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::context_menu::MenuContext;
    use crate::models::selection::MarkAllLabel;

    #[test]
    fn test_popup_stays_inside_area() {
        let menu = ContextMenu::build(MenuContext {
            on_parent_entry: false,
            pending_empty: false,
            in_archive: false,
            mark_label: MarkAllLabel::MarkAll,
        });
        let area = Rect::new(0, 0, 40, 8);
        let view = ContextMenuView::new(&menu).anchor_y(7);
        let popup = view.popup_area(area);

        assert!(popup.y + popup.height <= area.height);
        assert!(popup.x + popup.width <= area.width);

        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf);
    }
}
