//! 설정 파일 (TOML)
//!
//! 위치: `$BOKSL_SHELL_SETTINGS` 또는 `<config_dir>/boksl-shell/settings.toml`.
//! 파일이 없으면 기본값을 쓴다.

use crate::models::entry_list::SortPolicy;
use crate::system::filesystem::{FileSystem, MountPoint};
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_ENV: &str = "BOKSL_SHELL_SETTINGS";
const APP_DIR: &str = "boksl-shell";

/// 설정 파일의 마운트 항목
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MountConfig {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 목록 화면에 보이는 행 수 (터미널 크기로 다시 맞춰짐)
    pub visible_rows: usize,
    pub sort: SortPolicy,
    /// 설치 대상으로 취급할 확장자
    pub package_extensions: Vec<String>,
    pub install_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    /// 비어 있으면 시스템 마운트 포인트를 자동으로 찾는다
    pub mounts: Vec<MountConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(env::temp_dir)
            .join(APP_DIR);
        Self {
            visible_rows: 20,
            sort: SortPolicy::Alphabetical,
            package_extensions: vec!["vpk".to_string()],
            install_dir: data_dir.join("apps"),
            log_dir: data_dir.join("logs"),
            log_level: "info".to_string(),
            mounts: Vec::new(),
        }
    }
}

impl Settings {
    /// 기본 위치에서 설정을 읽는다.
    pub fn load() -> anyhow::Result<Self> {
        match settings_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid settings file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        if settings.visible_rows == 0 {
            anyhow::bail!("visible_rows must be at least 1");
        }
        Ok(settings)
    }

    /// Home 목록에 보일 마운트 테이블
    pub fn mount_points(&self) -> Vec<MountPoint> {
        if self.mounts.is_empty() {
            return FileSystem::new().list_mount_points();
        }
        self.mounts
            .iter()
            .map(|m| MountPoint {
                name: m.name.clone(),
                path: m.path.clone(),
            })
            .collect()
    }
}

fn settings_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var(SETTINGS_ENV) {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("settings.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_partial_settings_keeps_defaults() {
        let settings = Settings::parse(
            r#"
            sort = "append"
            package_extensions = ["vpk", "pkg"]

            [[mounts]]
            name = "sd0"
            path = "/mnt/sd0"
            "#,
        )
        .unwrap();

        assert_eq!(settings.sort, SortPolicy::Append);
        assert_eq!(settings.visible_rows, 20);
        assert_eq!(settings.package_extensions.len(), 2);
        assert_eq!(
            settings.mount_points(),
            vec![MountPoint {
                name: "sd0".to_string(),
                path: PathBuf::from("/mnt/sd0"),
            }]
        );
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(Settings::parse("visible_rows = 0").is_err());
        assert!(Settings::parse("sort = \"random\"").is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::load_from(&temp.path().join("none.toml")).unwrap();
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        fs::write(&path, "visible_rows = 7\nlog_level = \"debug\"\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.visible_rows, 7);
        assert_eq!(settings.log_level, "debug");
    }
}
