// Data Models
pub mod archive_context;
pub mod context_menu;
pub mod entry;
pub mod entry_list;
pub mod navigation;
pub mod operation;
pub mod selection;

pub use archive_context::ArchiveContext;
pub use context_menu::{ContextMenu, MenuAction, MenuContext};
pub use entry::{Entry, FileKind, PARENT_ENTRY_NAME};
pub use entry_list::{EntryList, EntrySource, Location, SortPolicy};
pub use navigation::{Cursor, NavigationState};
pub use operation::{
    TransferMode, TransferProgress, TransferSnapshot, TransferStatus, TransferSummary,
};
pub use selection::{CommitReport, MarkAllLabel, SelectionSet, SelectionSets};
