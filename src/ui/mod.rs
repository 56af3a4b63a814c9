// UI Layer
pub mod components;
pub mod layout;
pub mod theme;

pub use components::{
    CommandBar, CommandItem, ContextMenuView, Dialog, DialogKind, InputPurpose, Panel, StatusBar,
};
pub use layout::LayoutAreas;
pub use theme::Theme;
