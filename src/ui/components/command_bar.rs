// Command bar component - 하단 단축키 안내

use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// 커맨드 항목
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandItem {
    pub key: &'static str,
    pub label: &'static str,
    pub enabled: bool,
}

impl CommandItem {
    pub fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

pub struct CommandBar {
    commands: Vec<CommandItem>,
    bg_color: Color,
    key_fg_color: Color,
    label_fg_color: Color,
    disabled_color: Color,
}

impl CommandBar {
    pub fn new(commands: Vec<CommandItem>) -> Self {
        Self {
            commands,
            bg_color: Color::Rgb(45, 45, 48),
            key_fg_color: Color::Rgb(0, 120, 212),
            label_fg_color: Color::Rgb(204, 204, 204),
            disabled_color: Color::Rgb(100, 100, 100),
        }
    }

    /// 테마 적용
    pub fn theme(mut self, theme: &Theme) -> Self {
        self.bg_color = theme.command_bar_bg.to_color();
        self.key_fg_color = theme.accent.to_color();
        self.label_fg_color = theme.command_bar_fg.to_color();
        self.disabled_color = theme.muted.to_color();
        self
    }
}

impl Widget for CommandBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(self.bg_color));

        let mut spans = vec![Span::raw(" ")];
        for (i, cmd) in self.commands.iter().enumerate() {
            let (key_style, label_style) = if cmd.enabled {
                (
                    Style::default()
                        .fg(self.key_fg_color)
                        .add_modifier(Modifier::BOLD),
                    Style::default().fg(self.label_fg_color),
                )
            } else {
                (
                    Style::default().fg(self.disabled_color),
                    Style::default().fg(self.disabled_color),
                )
            };

            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(cmd.key, key_style));
            spans.push(Span::styled(":", label_style));
            spans.push(Span::styled(cmd.label, label_style));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_item_creation() {
        let item = CommandItem::new("v", "Paste").enabled(false);
        assert_eq!(item.key, "v");
        assert_eq!(item.label, "Paste");
        assert!(!item.enabled);
    }
}
