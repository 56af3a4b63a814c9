//! 액션 레지스트리
//!
//! 키 바인딩과 커맨드바 항목이 모두 이 표를 참조한다.

use crate::ui::components::command_bar::CommandItem;
use crossterm::event::{KeyCode, KeyModifiers};

/// 일반 모드에서 실행할 수 있는 액션
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Navigation
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    GoToParent,
    EnterSelected,
    GoHome,
    // Selection
    ToggleMark,
    ToggleMarkAll,
    // File Operations
    Copy,
    Cut,
    Paste,
    Delete,
    Rename,
    NewFolder,
    // System
    OpenMenu,
    Refresh,
    Quit,
}

/// 커맨드바 표시 정보
pub struct CommandBarEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub priority: u8,
}

/// 액션 메타데이터
pub struct ActionDef {
    pub action: Action,
    pub id: &'static str,
    pub label: &'static str,
    pub command_bar: Option<CommandBarEntry>,
}

/// 키 바인딩 정의
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: Option<KeyModifiers>, // None = any modifier
    pub action: Action,
}

const fn def(action: Action, id: &'static str, label: &'static str) -> ActionDef {
    ActionDef {
        action,
        id,
        label,
        command_bar: None,
    }
}

const fn bar(
    action: Action,
    id: &'static str,
    label: &'static str,
    key: &'static str,
    priority: u8,
) -> ActionDef {
    ActionDef {
        action,
        id,
        label,
        command_bar: Some(CommandBarEntry {
            key,
            label,
            priority,
        }),
    }
}

pub static ACTION_DEFS: &[ActionDef] = &[
    def(Action::MoveUp, "move_up", "Move up"),
    def(Action::MoveDown, "move_down", "Move down"),
    def(Action::PageUp, "page_up", "Page up"),
    def(Action::PageDown, "page_down", "Page down"),
    def(Action::GoToParent, "go_parent", "Parent folder"),
    def(Action::EnterSelected, "enter", "Open"),
    bar(Action::GoHome, "go_home", "Home", "~", 0),
    bar(Action::ToggleMark, "toggle_mark", "Mark", "Space", 1),
    bar(Action::ToggleMarkAll, "toggle_mark_all", "All", "a", 2),
    bar(Action::Copy, "copy", "Copy", "c", 3),
    bar(Action::Cut, "cut", "Move", "x", 4),
    bar(Action::Paste, "paste", "Paste", "v", 5),
    bar(Action::Delete, "delete", "Delete", "d", 6),
    bar(Action::Rename, "rename", "Rename", "r", 7),
    bar(Action::NewFolder, "new_folder", "Folder", "n", 8),
    bar(Action::OpenMenu, "open_menu", "Menu", "m", 9),
    def(Action::Refresh, "refresh", "Refresh"),
    bar(Action::Quit, "quit", "Quit", "q", 10),
];

const fn key(code: KeyCode, action: Action) -> KeyBinding {
    KeyBinding {
        code,
        modifiers: Some(KeyModifiers::NONE),
        action,
    }
}

const fn any(code: KeyCode, action: Action) -> KeyBinding {
    KeyBinding {
        code,
        modifiers: None,
        action,
    }
}

static KEY_BINDINGS: &[KeyBinding] = &[
    any(KeyCode::Up, Action::MoveUp),
    key(KeyCode::Char('k'), Action::MoveUp),
    any(KeyCode::Down, Action::MoveDown),
    key(KeyCode::Char('j'), Action::MoveDown),
    any(KeyCode::PageUp, Action::PageUp),
    any(KeyCode::PageDown, Action::PageDown),
    any(KeyCode::Left, Action::GoToParent),
    any(KeyCode::Backspace, Action::GoToParent),
    key(KeyCode::Char('h'), Action::GoToParent),
    any(KeyCode::Enter, Action::EnterSelected),
    any(KeyCode::Right, Action::EnterSelected),
    key(KeyCode::Char('l'), Action::EnterSelected),
    key(KeyCode::Char('~'), Action::GoHome),
    KeyBinding {
        code: KeyCode::Char('~'),
        modifiers: Some(KeyModifiers::SHIFT),
        action: Action::GoHome,
    },
    key(KeyCode::Char(' '), Action::ToggleMark),
    any(KeyCode::Insert, Action::ToggleMark),
    key(KeyCode::Char('a'), Action::ToggleMarkAll),
    key(KeyCode::Char('c'), Action::Copy),
    any(KeyCode::F(5), Action::Copy),
    key(KeyCode::Char('x'), Action::Cut),
    any(KeyCode::F(6), Action::Cut),
    key(KeyCode::Char('v'), Action::Paste),
    key(KeyCode::Char('d'), Action::Delete),
    any(KeyCode::Delete, Action::Delete),
    any(KeyCode::F(8), Action::Delete),
    key(KeyCode::Char('r'), Action::Rename),
    any(KeyCode::F(2), Action::Rename),
    key(KeyCode::Char('n'), Action::NewFolder),
    any(KeyCode::F(7), Action::NewFolder),
    key(KeyCode::Char('m'), Action::OpenMenu),
    any(KeyCode::Tab, Action::OpenMenu),
    KeyBinding {
        code: KeyCode::Char('r'),
        modifiers: Some(KeyModifiers::CONTROL),
        action: Action::Refresh,
    },
    key(KeyCode::Char('q'), Action::Quit),
    any(KeyCode::F(10), Action::Quit),
    KeyBinding {
        code: KeyCode::Char('c'),
        modifiers: Some(KeyModifiers::CONTROL),
        action: Action::Quit,
    },
];

pub fn key_bindings() -> &'static [KeyBinding] {
    KEY_BINDINGS
}

/// 키 입력으로 액션 조회
pub fn find_action(modifiers: KeyModifiers, code: KeyCode) -> Option<Action> {
    key_bindings()
        .iter()
        .find(|binding| {
            binding.code == code
                && binding
                    .modifiers
                    .map_or(true, |required| modifiers == required)
        })
        .map(|binding| binding.action)
}

impl Action {
    pub fn def(&self) -> Option<&'static ActionDef> {
        ACTION_DEFS.iter().find(|d| d.action == *self)
    }

    pub fn label(&self) -> &'static str {
        self.def().map_or("", |d| d.label)
    }
}

/// 커맨드바 항목 (priority 순). `enabled`로 지금 쓸 수 없는 항목을 흐리게 표시한다.
pub fn generate_command_bar_items(enabled: impl Fn(Action) -> bool) -> Vec<CommandItem> {
    let mut entries: Vec<(&CommandBarEntry, &ActionDef)> = ACTION_DEFS
        .iter()
        .filter_map(|def| def.command_bar.as_ref().map(|cb| (cb, def)))
        .collect();
    entries.sort_by_key(|(cb, _)| cb.priority);

    entries
        .into_iter()
        .map(|(cb, def)| CommandItem::new(cb.key, cb.label).enabled(enabled(def.action)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_action_vim_keys() {
        assert_eq!(
            find_action(KeyModifiers::NONE, KeyCode::Char('j')),
            Some(Action::MoveDown)
        );
        assert_eq!(
            find_action(KeyModifiers::NONE, KeyCode::Char('h')),
            Some(Action::GoToParent)
        );
        // 수식키가 다르면 다른 액션
        assert_eq!(
            find_action(KeyModifiers::CONTROL, KeyCode::Char('r')),
            Some(Action::Refresh)
        );
        assert_eq!(
            find_action(KeyModifiers::NONE, KeyCode::Char('r')),
            Some(Action::Rename)
        );
        assert_eq!(find_action(KeyModifiers::ALT, KeyCode::Char('j')), None);
    }

    #[test]
    fn test_any_modifier_binding() {
        assert_eq!(
            find_action(KeyModifiers::SHIFT, KeyCode::Down),
            Some(Action::MoveDown)
        );
        assert_eq!(
            find_action(KeyModifiers::NONE, KeyCode::F(10)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_every_action_has_definition() {
        let all = [
            Action::MoveUp,
            Action::MoveDown,
            Action::PageUp,
            Action::PageDown,
            Action::GoToParent,
            Action::EnterSelected,
            Action::GoHome,
            Action::ToggleMark,
            Action::ToggleMarkAll,
            Action::Copy,
            Action::Cut,
            Action::Paste,
            Action::Delete,
            Action::Rename,
            Action::NewFolder,
            Action::OpenMenu,
            Action::Refresh,
            Action::Quit,
        ];
        for action in all {
            assert!(action.def().is_some(), "{:?} has no definition", action);
        }
    }

    #[test]
    fn test_command_bar_items_sorted_and_flagged() {
        let items = generate_command_bar_items(|a| a != Action::Paste);
        assert_eq!(items.first().map(|i| i.label), Some("Home"));
        assert_eq!(items.last().map(|i| i.label), Some("Quit"));
        let paste = items.iter().find(|i| i.label == "Paste").unwrap();
        assert!(!paste.enabled);
    }
}
