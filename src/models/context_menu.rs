use crate::models::selection::MarkAllLabel;

/// 항목 메뉴 동작
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    MarkAll,
    UnmarkAll,
    Move,
    Copy,
    Paste,
    Delete,
    Rename,
    NewFolder,
}

impl MenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::MarkAll => "Mark all",
            MenuAction::UnmarkAll => "Unmark all",
            MenuAction::Move => "Move",
            MenuAction::Copy => "Copy",
            MenuAction::Paste => "Paste",
            MenuAction::Delete => "Delete",
            MenuAction::Rename => "Rename",
            MenuAction::NewFolder => "New folder",
        }
    }
}

/// 메뉴를 열 때의 상황
#[derive(Debug, Clone, Copy)]
pub struct MenuContext {
    pub on_parent_entry: bool,
    pub pending_empty: bool,
    pub in_archive: bool,
    pub mark_label: MarkAllLabel,
}

/// 항목 메뉴 (보이는 항목만 담는다)
#[derive(Debug, Clone)]
pub struct ContextMenu {
    items: Vec<MenuAction>,
    selected: usize,
}

impl ContextMenu {
    pub fn build(ctx: MenuContext) -> Self {
        let mark = match ctx.mark_label {
            MarkAllLabel::MarkAll => MenuAction::MarkAll,
            MarkAllLabel::UnmarkAll => MenuAction::UnmarkAll,
        };
        let order = [
            mark,
            MenuAction::Move,
            MenuAction::Copy,
            MenuAction::Paste,
            MenuAction::Delete,
            MenuAction::Rename,
            MenuAction::NewFolder,
        ];

        let items = order
            .into_iter()
            .filter(|action| is_visible(*action, &ctx))
            .collect();
        Self { items, selected: 0 }
    }

    pub fn items(&self) -> &[MenuAction] {
        &self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn current(&self) -> Option<MenuAction> {
        self.items.get(self.selected).copied()
    }

    pub fn contains(&self, action: MenuAction) -> bool {
        self.items.contains(&action)
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }
}

fn is_visible(action: MenuAction, ctx: &MenuContext) -> bool {
    match action {
        MenuAction::MarkAll | MenuAction::UnmarkAll | MenuAction::Copy => !ctx.on_parent_entry,
        MenuAction::Move | MenuAction::Delete | MenuAction::Rename => {
            !ctx.on_parent_entry && !ctx.in_archive
        }
        MenuAction::Paste => !ctx.pending_empty && !ctx.in_archive,
        MenuAction::NewFolder => !ctx.in_archive,
    }
}
