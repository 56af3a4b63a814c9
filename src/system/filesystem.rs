use crate::models::entry::Entry;
use crate::utils::error::{Result, ShellError};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// 마운트 포인트 정보 (Home 목록의 한 줄)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    pub name: String,
    pub path: PathBuf,
}

/// 경로 조회 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Exists { is_folder: bool },
    NotFound,
}

impl Stat {
    pub fn exists(&self) -> bool {
        matches!(self, Stat::Exists { .. })
    }
}

/// 실제 디렉토리에 대한 작업
///
/// 작업 스레드에서도 호출되므로 `Send + Sync`.
pub trait FileService: Send + Sync {
    fn list(&self, dir: &Path) -> Result<Vec<Entry>>;

    fn stat(&self, path: &Path) -> Stat;

    /// 재귀 복사. 대상이 이미 있으면 실패하고 아무것도 덮어쓰지 않는다.
    /// `on_bytes`에는 파일 하나를 복사할 때마다 바이트 수가 전달된다.
    fn copy(&self, src: &Path, dest: &Path, on_bytes: &mut dyn FnMut(u64)) -> Result<u64>;

    /// 이동. 대상이 완성된 뒤에만 원본을 지운다.
    fn move_path(&self, src: &Path, dest: &Path, on_bytes: &mut dyn FnMut(u64)) -> Result<u64>;

    /// 재귀 삭제
    fn remove(&self, path: &Path) -> Result<()>;

    fn mkdir(&self, path: &Path) -> Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
}

/// 파일 시스템 모듈
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystem;

impl FileSystem {
    pub fn new() -> Self {
        Self
    }

    /// 시스템 마운트 포인트 목록 반환
    pub fn list_mount_points(&self) -> Vec<MountPoint> {
        let mut points = Vec::new();

        // 홈 디렉토리
        if let Some(home) = dirs::home_dir().filter(|p| p.is_dir()) {
            points.push(MountPoint {
                name: "home".to_string(),
                path: home,
            });
        }

        // 루트
        let root = PathBuf::from("/");
        if root.is_dir() {
            points.push(MountPoint {
                name: "/".to_string(),
                path: root,
            });
        }

        #[cfg(target_os = "macos")]
        let bases: &[&str] = &["/Volumes"];
        #[cfg(not(target_os = "macos"))]
        let bases: &[&str] = &["/mnt", "/media"];

        for base in bases {
            let Ok(read_dir) = fs::read_dir(base) else {
                continue;
            };
            let mut found: Vec<PathBuf> = read_dir
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect();
            found.sort();
            for path in found {
                points.push(MountPoint {
                    name: path.to_string_lossy().to_string(),
                    path,
                });
            }
        }

        points
    }

    fn entry_from_path(path: &Path, name: String) -> Option<Entry> {
        // symlink는 대상 메타데이터 우선
        let metadata = fs::metadata(path)
            .or_else(|_| fs::symlink_metadata(path))
            .ok()?;
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Some(if metadata.is_dir() {
            Entry::folder(name, modified)
        } else {
            Entry::file(name, metadata.len(), modified)
        })
    }

    fn copy_recursive(&self, src: &Path, dest: &Path, on_bytes: &mut dyn FnMut(u64)) -> Result<u64> {
        let metadata = fs::symlink_metadata(src).map_err(|e| ShellError::from_io(e, src))?;

        if metadata.is_dir() {
            fs::create_dir(dest).map_err(|e| copy_error(src, dest, e))?;
            let mut total = 0u64;
            for entry in fs::read_dir(src).map_err(|e| ShellError::from_io(e, src))? {
                let entry = entry.map_err(ShellError::Io)?;
                total += self.copy_recursive(&entry.path(), &dest.join(entry.file_name()), on_bytes)?;
            }
            Ok(total)
        } else {
            let copied = fs::copy(src, dest).map_err(|e| copy_error(src, dest, e))?;
            on_bytes(copied);
            Ok(copied)
        }
    }
}

impl FileService for FileSystem {
    /// 디렉토리 읽기 (읽을 수 없는 개별 엔트리는 건너뜀)
    fn list(&self, dir: &Path) -> Result<Vec<Entry>> {
        if !dir.exists() {
            return Err(ShellError::PathNotFound {
                path: dir.to_path_buf(),
            });
        }
        if !dir.is_dir() {
            return Err(ShellError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }

        let read_dir = fs::read_dir(dir).map_err(|e| ShellError::from_io(e, dir))?;
        let mut entries = Vec::new();
        for entry in read_dir {
            let Ok(entry) = entry else { continue };
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(item) = Self::entry_from_path(&entry.path(), name) {
                entries.push(item);
            }
        }
        Ok(entries)
    }

    fn stat(&self, path: &Path) -> Stat {
        match fs::symlink_metadata(path) {
            Ok(metadata) => Stat::Exists {
                is_folder: metadata.is_dir(),
            },
            Err(_) => Stat::NotFound,
        }
    }

    fn copy(&self, src: &Path, dest: &Path, on_bytes: &mut dyn FnMut(u64)) -> Result<u64> {
        if self.stat(src) == Stat::NotFound {
            return Err(ShellError::PathNotFound {
                path: src.to_path_buf(),
            });
        }
        if self.stat(dest).exists() {
            return Err(ShellError::AlreadyExists {
                path: dest.to_path_buf(),
            });
        }
        if dest.starts_with(src) {
            return Err(ShellError::RecursiveTarget {
                src: src.to_path_buf(),
                dest: dest.to_path_buf(),
            });
        }

        match self.copy_recursive(src, dest, on_bytes) {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                // 일부만 복사된 대상은 남기지 않는다
                if !self.stat(dest).exists() {
                    return Err(e);
                }
                if let Err(cleanup) = self.remove(dest) {
                    tracing::warn!(dest = %dest.display(), error = %cleanup, "failed to clean up partial copy");
                }
                Err(e)
            }
        }
    }

    fn move_path(&self, src: &Path, dest: &Path, on_bytes: &mut dyn FnMut(u64)) -> Result<u64> {
        if self.stat(src) == Stat::NotFound {
            return Err(ShellError::PathNotFound {
                path: src.to_path_buf(),
            });
        }
        if self.stat(dest).exists() {
            return Err(ShellError::AlreadyExists {
                path: dest.to_path_buf(),
            });
        }
        if dest.starts_with(src) {
            return Err(ShellError::RecursiveTarget {
                src: src.to_path_buf(),
                dest: dest.to_path_buf(),
            });
        }

        // 같은 파일시스템이면 rename 한 번으로 끝난다
        let size = fs::symlink_metadata(src)
            .map(|m| if m.is_dir() { 0 } else { m.len() })
            .unwrap_or(0);
        if fs::rename(src, dest).is_ok() {
            on_bytes(size);
            return Ok(size);
        }

        let copied = self.copy(src, dest, on_bytes)?;
        self.remove(src).map_err(|e| ShellError::TransferFailed {
            action: "move",
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
            reason: format!("copied but failed to remove source: {}", e),
        })?;
        Ok(copied)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let metadata = fs::symlink_metadata(path).map_err(|e| ShellError::from_io(e, path))?;
        let result = if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|e| ShellError::from_io(e, path))
    }

    fn mkdir(&self, path: &Path) -> Result<()> {
        fs::create_dir(path).map_err(|e| ShellError::from_io(e, path))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        if self.stat(to).exists() {
            return Err(ShellError::AlreadyExists {
                path: to.to_path_buf(),
            });
        }
        fs::rename(from, to).map_err(|e| ShellError::from_io(e, from))
    }
}

fn copy_error(src: &Path, dest: &Path, e: std::io::Error) -> ShellError {
    if e.kind() == std::io::ErrorKind::PermissionDenied {
        ShellError::PermissionDenied {
            path: dest.to_path_buf(),
        }
    } else {
        ShellError::TransferFailed {
            action: "copy",
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
            reason: e.to_string(),
        }
    }
}
