// System Layer
pub mod archive;
pub mod filesystem;
pub mod installer;

pub use archive::{detect_archive_format, ArchiveFormat, ArchiveFs, ArchiveHandle, ArchiveService};
pub use filesystem::{FileService, FileSystem, MountPoint, Stat};
pub use installer::{Installer, PackageInstaller};
