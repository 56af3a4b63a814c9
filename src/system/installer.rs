use crate::system::archive::unpack_zip;
use crate::utils::error::{Result, ShellError};
use std::fs;
use std::path::{Path, PathBuf};

/// 패키지 설치
pub trait Installer: Send + Sync {
    fn install(&self, package: &Path) -> Result<()>;
}

/// zip 기반 패키지를 `<install_root>/<패키지 이름>` 아래에 푼다.
#[derive(Debug, Clone)]
pub struct PackageInstaller {
    install_root: PathBuf,
}

impl PackageInstaller {
    pub fn new(install_root: PathBuf) -> Self {
        Self { install_root }
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    fn target_for(&self, package: &Path) -> Result<PathBuf> {
        let stem = package
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ShellError::InstallFailed {
                path: package.to_path_buf(),
                reason: "package has no name".to_string(),
            })?;
        Ok(self.install_root.join(stem))
    }
}

impl Installer for PackageInstaller {
    fn install(&self, package: &Path) -> Result<()> {
        if !package.is_file() {
            return Err(ShellError::PathNotFound {
                path: package.to_path_buf(),
            });
        }

        let target = self.target_for(package)?;
        if target.exists() {
            return Err(ShellError::InstallFailed {
                path: package.to_path_buf(),
                reason: format!("already installed at {}", target.display()),
            });
        }

        fs::create_dir_all(&target).map_err(|e| ShellError::from_io(e, &target))?;
        match unpack_zip(package, &target) {
            Ok(bytes) => {
                tracing::info!(package = %package.display(), target = %target.display(), bytes, "package installed");
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_dir_all(&target);
                Err(ShellError::InstallFailed {
                    path: package.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::archive::tests::write_zip;
    use tempfile::TempDir;

    #[test]
    fn test_install_unpacks_package() {
        let temp = TempDir::new().unwrap();
        let package = temp.path().join("game.vpk");
        write_zip(&package, &[("eboot.bin", "bin"), ("sce_sys/param.sfo", "sfo")]);
        let installer = PackageInstaller::new(temp.path().join("apps"));

        installer.install(&package).unwrap();

        let target = temp.path().join("apps/game");
        assert_eq!(fs::read(target.join("eboot.bin")).unwrap(), b"bin");
        assert!(target.join("sce_sys/param.sfo").exists());
    }

    #[test]
    fn test_install_twice_fails() {
        let temp = TempDir::new().unwrap();
        let package = temp.path().join("game.vpk");
        write_zip(&package, &[("eboot.bin", "bin")]);
        let installer = PackageInstaller::new(temp.path().join("apps"));

        installer.install(&package).unwrap();
        match installer.install(&package) {
            Err(ShellError::InstallFailed { .. }) => {}
            other => panic!("expected InstallFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_broken_package_leaves_nothing_behind() {
        let temp = TempDir::new().unwrap();
        let package = temp.path().join("broken.vpk");
        fs::write(&package, b"not a zip").unwrap();
        let installer = PackageInstaller::new(temp.path().join("apps"));

        assert!(installer.install(&package).is_err());
        assert!(!temp.path().join("apps/broken").exists());
    }
}
