// UI Components
pub mod command_bar;
pub mod context_menu;
pub mod dialog;
pub mod panel;
pub mod status_bar;

pub use command_bar::{CommandBar, CommandItem};
pub use context_menu::ContextMenuView;
pub use dialog::{Dialog, DialogKind, InputPurpose};
pub use panel::Panel;
pub use status_bar::StatusBar;
