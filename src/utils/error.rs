use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {path}")]
    PathNotFound { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Already exists: {path}")]
    AlreadyExists { path: PathBuf },

    #[error("Cannot copy '{src}' into itself ('{dest}')")]
    RecursiveTarget { src: PathBuf, dest: PathBuf },

    #[error("Failed to {action} '{src}' -> '{dest}': {reason}")]
    TransferFailed {
        action: &'static str,
        src: PathBuf,
        dest: PathBuf,
        reason: String,
    },

    #[error("Unsupported archive format: {path}")]
    ArchiveUnsupportedFormat { path: PathBuf },

    #[error("Failed to read archive '{path}': {reason}")]
    ArchiveListFailed { path: PathBuf, reason: String },

    #[error("Failed to extract '{entry}' from '{path}': {reason}")]
    ArchiveExtractFailed {
        path: PathBuf,
        entry: String,
        reason: String,
    },

    #[error("Archive entry not found: {entry}")]
    ArchiveEntryNotFound { entry: String },

    #[error("Failed to install '{path}': {reason}")]
    InstallFailed { path: PathBuf, reason: String },

    #[error("Location is read-only: {location}")]
    ReadOnlyLocation { location: String },

    #[error("Nothing to paste")]
    NothingToPaste,

    #[error("No entry selected")]
    NothingSelected,

    #[error("Invalid name: '{name}'")]
    InvalidName { name: String },

    #[error("Another operation is in progress")]
    Busy,
}

/// 상위 계층이 대응 방식을 결정할 때 쓰는 오류 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 대상이 사라짐 (상위로 올라가 재시도, 선택 목록에서 제거)
    NotFound,
    PermissionDenied,
    /// 그 밖의 입출력 실패 (UI에 표시, 항목 단위 중단)
    IoFailure,
    Busy,
}

impl ShellError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShellError::PathNotFound { .. } | ShellError::ArchiveEntryNotFound { .. } => {
                ErrorKind::NotFound
            }
            ShellError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            ShellError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            ShellError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                ErrorKind::PermissionDenied
            }
            ShellError::Busy => ErrorKind::Busy,
            _ => ErrorKind::IoFailure,
        }
    }

    /// io 오류를 경로 정보가 담긴 변형으로 변환
    pub fn from_io(error: std::io::Error, path: &Path) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => ShellError::PathNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => ShellError::PermissionDenied {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::AlreadyExists => ShellError::AlreadyExists {
                path: path.to_path_buf(),
            },
            _ => ShellError::Io(error),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_from_io_maps_common_kinds() {
        let path = Path::new("/tmp/x");
        let err = ShellError::from_io(io::Error::from(io::ErrorKind::NotFound), path);
        assert!(matches!(err, ShellError::PathNotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = ShellError::from_io(io::Error::from(io::ErrorKind::PermissionDenied), path);
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        let err = ShellError::from_io(io::Error::other("disk on fire"), path);
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_busy_and_other_kinds() {
        assert_eq!(ShellError::Busy.kind(), ErrorKind::Busy);
        assert_eq!(
            ShellError::ReadOnlyLocation {
                location: "archive".into()
            }
            .kind(),
            ErrorKind::IoFailure
        );
    }
}
