//! 백그라운드 작업 모델
//!
//! 작업 스레드에 넘기는 스냅샷, 진행 상태, 최종 요약 정의

use crate::models::entry::Entry;
use std::path::{Path, PathBuf};

/// 작업 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// 일반 복사
    NormalCopy,
    /// 이동 (복사 후 원본 삭제)
    Move,
    /// 아카이브 내부 항목을 밖으로 복사
    Extract,
    /// 삭제
    Delete,
    /// 패키지 설치
    Install,
}

impl TransferMode {
    pub fn name(&self) -> &'static str {
        match self {
            TransferMode::NormalCopy => "Copy",
            TransferMode::Move => "Move",
            TransferMode::Extract => "Extract",
            TransferMode::Delete => "Delete",
            TransferMode::Install => "Install",
        }
    }

    /// 진행 중 표시용 동사
    pub fn verb_ing(&self) -> &'static str {
        match self {
            TransferMode::NormalCopy => "Copying",
            TransferMode::Move => "Moving",
            TransferMode::Extract => "Extracting",
            TransferMode::Delete => "Deleting",
            TransferMode::Install => "Installing",
        }
    }
}

/// 작업 스레드 입력 (넘긴 뒤에는 바뀌지 않는다)
#[derive(Debug, Clone)]
pub struct TransferSnapshot {
    pub mode: TransferMode,
    /// 원본 항목들이 있는 디렉토리 (Extract면 아카이브 내부 가상 경로)
    pub source_dir: PathBuf,
    pub entries: Vec<Entry>,
    /// 대상 디렉토리 (Delete/Install은 None)
    pub destination: Option<PathBuf>,
    /// Extract 원본 아카이브 / Install 패키지 파일
    pub archive_path: Option<PathBuf>,
}

impl TransferSnapshot {
    pub fn paste(
        mode: TransferMode,
        source_dir: PathBuf,
        entries: Vec<Entry>,
        destination: PathBuf,
        archive_path: Option<PathBuf>,
    ) -> Self {
        Self {
            mode,
            source_dir,
            entries,
            destination: Some(destination),
            archive_path,
        }
    }

    pub fn delete(source_dir: PathBuf, entries: Vec<Entry>) -> Self {
        Self {
            mode: TransferMode::Delete,
            source_dir,
            entries,
            destination: None,
            archive_path: None,
        }
    }

    pub fn install(package: &Path, entry: Entry) -> Self {
        Self {
            mode: TransferMode::Install,
            source_dir: package
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            entries: vec![entry],
            destination: None,
            archive_path: Some(package.to_path_buf()),
        }
    }

    /// 항목의 원본 경로
    pub fn source_of(&self, entry: &Entry) -> PathBuf {
        self.source_dir.join(&entry.name)
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }
}

/// 작업 진행 상태 (단조 증가)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferProgress {
    /// 현재 처리 중인 항목
    pub current: String,
    pub items_done: usize,
    pub items_total: usize,
    pub bytes_done: u64,
    pub bytes_total: u64,
}

impl TransferProgress {
    pub fn new(items_total: usize, bytes_total: u64) -> Self {
        Self {
            items_total,
            bytes_total,
            ..Self::default()
        }
    }

    /// 진행률 계산 (0-100)
    pub fn percentage(&self) -> u8 {
        if self.bytes_total > 0 {
            ((self.bytes_done.min(self.bytes_total) as f64 / self.bytes_total as f64) * 100.0) as u8
        } else if self.items_total > 0 {
            ((self.items_done.min(self.items_total) as f64 / self.items_total as f64) * 100.0) as u8
        } else {
            100
        }
    }
}

/// 최종 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Succeeded,
    SucceededWithErrors,
    Cancelled,
    Failed,
}

/// 작업 결과 요약
#[derive(Debug, Clone)]
pub struct TransferSummary {
    pub mode: TransferMode,
    pub status: TransferStatus,
    pub succeeded: usize,
    pub failed: usize,
    /// 중단으로 시도하지 않은 항목
    pub skipped: usize,
    pub bytes_done: u64,
    pub errors: Vec<String>,
}

impl TransferSummary {
    pub fn new(mode: TransferMode) -> Self {
        Self {
            mode,
            status: TransferStatus::Succeeded,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            bytes_done: 0,
            errors: Vec::new(),
        }
    }

    /// 작업 스레드가 결과 없이 끝났을 때
    pub fn aborted(mode: TransferMode, reason: impl Into<String>) -> Self {
        let mut summary = Self::new(mode);
        summary.failed = 1;
        summary.errors.push(reason.into());
        summary.status = TransferStatus::Failed;
        summary
    }

    /// 집계로부터 최종 상태 결정
    pub fn finish(&mut self, cancelled: bool) {
        self.status = if cancelled {
            TransferStatus::Cancelled
        } else if self.failed == 0 {
            TransferStatus::Succeeded
        } else if self.succeeded == 0 {
            TransferStatus::Failed
        } else {
            TransferStatus::SucceededWithErrors
        };
    }

    pub fn headline(&self) -> String {
        match self.status {
            TransferStatus::Succeeded => format!("{} completed", self.mode.name()),
            TransferStatus::SucceededWithErrors => format!(
                "{} completed with errors ({} ok, {} failed)",
                self.mode.name(),
                self.succeeded,
                self.failed
            ),
            TransferStatus::Cancelled => format!("{} cancelled", self.mode.name()),
            TransferStatus::Failed => format!("{} failed", self.mode.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_prefers_bytes() {
        let mut progress = TransferProgress::new(4, 200);
        progress.items_done = 1;
        progress.bytes_done = 150;
        assert_eq!(progress.percentage(), 75);

        let mut progress = TransferProgress::new(4, 0);
        progress.items_done = 1;
        assert_eq!(progress.percentage(), 25);

        assert_eq!(TransferProgress::new(0, 0).percentage(), 100);
    }

    #[test]
    fn test_finish_status_rules() {
        let mut summary = TransferSummary::new(TransferMode::NormalCopy);
        summary.succeeded = 3;
        summary.finish(false);
        assert_eq!(summary.status, TransferStatus::Succeeded);

        summary.failed = 1;
        summary.finish(false);
        assert_eq!(summary.status, TransferStatus::SucceededWithErrors);

        summary.succeeded = 0;
        summary.finish(false);
        assert_eq!(summary.status, TransferStatus::Failed);

        summary.finish(true);
        assert_eq!(summary.status, TransferStatus::Cancelled);
    }
}
