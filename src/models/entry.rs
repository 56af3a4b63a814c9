use std::path::Path;
use std::time::SystemTime;

/// 상위 디렉토리로 가는 가상 엔트리 이름
pub const PARENT_ENTRY_NAME: &str = "..";

/// 목록의 한 항목 (디렉토리 엔트리 또는 아카이브 내부 엔트리)
///
/// 목록 안에서는 `name`이 유일한 식별자다. 선택 목록은 복제본을 보관한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 표시 이름이자 부모 기준 경로 조각
    pub name: String,
    pub is_folder: bool,
    /// 바이트 단위 크기 (폴더는 0)
    pub size: u64,
    pub modified: SystemTime,
}

impl Entry {
    pub fn file(name: impl Into<String>, size: u64, modified: SystemTime) -> Self {
        Self {
            name: name.into(),
            is_folder: false,
            size,
            modified,
        }
    }

    pub fn folder(name: impl Into<String>, modified: SystemTime) -> Self {
        Self {
            name: name.into(),
            is_folder: true,
            size: 0,
            modified,
        }
    }

    pub fn parent_marker() -> Self {
        Self::folder(PARENT_ENTRY_NAME, SystemTime::UNIX_EPOCH)
    }

    pub fn is_parent_marker(&self) -> bool {
        self.name == PARENT_ENTRY_NAME
    }

    /// 파일 종류 판단 (폴더는 항상 `Other`)
    pub fn kind(&self, package_extensions: &[String]) -> FileKind {
        if self.is_folder {
            return FileKind::Other;
        }
        classify_name(&self.name, package_extensions)
    }
}

/// 진입(Enter) 시 처리 방식을 결정하는 파일 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// 가상 디렉토리로 열 수 있는 아카이브
    Archive,
    /// 설치 가능한 패키지
    Package,
    Other,
}

/// 이름의 확장자로 파일 종류를 판단한다.
///
/// 패키지 확장자가 아카이브 확장자보다 우선한다. (zip 기반 패키지)
pub fn classify_name(name: &str, package_extensions: &[String]) -> FileKind {
    let lower = name.to_lowercase();
    let ext = Path::new(&lower)
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();

    if !ext.is_empty()
        && package_extensions
            .iter()
            .any(|p| p.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    {
        return FileKind::Package;
    }
    if crate::system::archive::detect_archive_format(Path::new(&lower)).is_some() {
        return FileKind::Archive;
    }
    FileKind::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packages() -> Vec<String> {
        vec!["vpk".to_string()]
    }

    #[test]
    fn test_parent_marker() {
        let parent = Entry::parent_marker();
        assert!(parent.is_parent_marker());
        assert!(parent.is_folder);
        assert!(!Entry::file("a", 1, SystemTime::now()).is_parent_marker());
    }

    #[test]
    fn test_classify_name() {
        assert_eq!(classify_name("photos.ZIP", &packages()), FileKind::Archive);
        assert_eq!(classify_name("src.tar.gz", &packages()), FileKind::Archive);
        assert_eq!(classify_name("game.vpk", &packages()), FileKind::Package);
        assert_eq!(classify_name("notes.txt", &packages()), FileKind::Other);
        assert_eq!(classify_name("Makefile", &packages()), FileKind::Other);
    }

    #[test]
    fn test_folder_is_never_archive() {
        let folder = Entry::folder("backup.zip", SystemTime::now());
        assert_eq!(folder.kind(&packages()), FileKind::Other);
    }
}
