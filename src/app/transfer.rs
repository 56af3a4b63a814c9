//! 백그라운드 작업 실행
//!
//! 작업은 스냅샷만 들고 별도 스레드에서 돈다. 진행 상황은 채널로 보내고,
//! 취소는 항목 사이에서 확인하는 플래그로 처리한다. UI 스레드는 매 프레임
//! `poll`로 채널을 비우고 스레드가 끝났으면 join한다.

use crate::models::entry::Entry;
use crate::models::operation::{
    TransferMode, TransferProgress, TransferSnapshot, TransferSummary,
};
use crate::system::archive::ArchiveService;
use crate::system::filesystem::FileService;
use crate::system::installer::Installer;
use crate::utils::error::{Result, ShellError};
use std::path::{Component, Path};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

/// 작업 실행기 (서비스 묶음)
#[derive(Clone)]
pub struct TransferEngine {
    fs: Arc<dyn FileService>,
    archives: Arc<dyn ArchiveService>,
    installer: Arc<dyn Installer>,
}

impl TransferEngine {
    pub fn new(
        fs: Arc<dyn FileService>,
        archives: Arc<dyn ArchiveService>,
        installer: Arc<dyn Installer>,
    ) -> Self {
        Self {
            fs,
            archives,
            installer,
        }
    }

    /// 작업 스레드를 띄운다.
    pub fn start(&self, snapshot: TransferSnapshot) -> Result<TransferHandle> {
        let (progress_tx, progress_rx) = mpsc::channel::<TransferProgress>();
        let cancel_flag = Arc::new(AtomicBool::new(false));
        let cancel_for_worker = Arc::clone(&cancel_flag);
        let engine = self.clone();
        let mode = snapshot.mode;
        let progress = TransferProgress::new(snapshot.entries.len(), progress_bytes_total(&snapshot));

        let join_handle = std::thread::Builder::new()
            .name(format!("transfer-{}", mode.name().to_lowercase()))
            .spawn(move || engine.run(&snapshot, &progress_tx, &cancel_for_worker))
            .map_err(ShellError::Io)?;

        tracing::info!(mode = mode.name(), items = progress.items_total, "transfer started");
        Ok(TransferHandle {
            mode,
            progress_rx,
            join_handle: Some(join_handle),
            cancel_flag,
            progress,
        })
    }

    /// 스냅샷을 순서대로 처리한다. (작업 스레드에서 호출)
    pub fn run(
        &self,
        snapshot: &TransferSnapshot,
        progress_tx: &Sender<TransferProgress>,
        cancel: &AtomicBool,
    ) -> TransferSummary {
        let mut summary = TransferSummary::new(snapshot.mode);
        let mut progress =
            TransferProgress::new(snapshot.entries.len(), progress_bytes_total(snapshot));
        let mut cancelled = false;

        for (idx, entry) in snapshot.entries.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                cancelled = true;
                summary.skipped += snapshot.entries.len() - idx;
                break;
            }

            progress.current = entry.name.clone();
            let _ = progress_tx.send(progress.clone());

            let result = self.run_item(snapshot, entry, &mut progress, progress_tx);
            progress.items_done += 1;
            let _ = progress_tx.send(progress.clone());

            match result {
                Ok(()) => summary.succeeded += 1,
                Err(e) => {
                    tracing::warn!(mode = snapshot.mode.name(), item = %entry.name, error = %e, "transfer item failed");
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {}", entry.name, e));
                    // 이동은 첫 실패에서 멈추고 나머지는 원본에 그대로 둔다
                    if snapshot.mode == TransferMode::Move {
                        summary.skipped += snapshot.entries.len() - idx - 1;
                        break;
                    }
                }
            }
        }

        summary.bytes_done = progress.bytes_done;
        summary.finish(cancelled);
        tracing::info!(
            mode = snapshot.mode.name(),
            status = ?summary.status,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "transfer finished"
        );
        summary
    }

    fn run_item(
        &self,
        snapshot: &TransferSnapshot,
        entry: &Entry,
        progress: &mut TransferProgress,
        progress_tx: &Sender<TransferProgress>,
    ) -> Result<()> {
        let src = snapshot.source_of(entry);
        let mut on_bytes = |bytes: u64| {
            progress.bytes_done = progress.bytes_done.saturating_add(bytes);
            let _ = progress_tx.send(progress.clone());
        };

        match snapshot.mode {
            TransferMode::NormalCopy => {
                let dest = destination_of(snapshot, entry)?;
                self.fs.copy(&src, &dest, &mut on_bytes).map(|_| ())
            }
            TransferMode::Move => {
                let dest = destination_of(snapshot, entry)?;
                self.fs.move_path(&src, &dest, &mut on_bytes).map(|_| ())
            }
            TransferMode::Extract => {
                let container = snapshot
                    .archive_path
                    .as_deref()
                    .ok_or_else(|| ShellError::ArchiveEntryNotFound {
                        entry: entry.name.clone(),
                    })?;
                let dest_dir = snapshot
                    .destination
                    .as_deref()
                    .ok_or(ShellError::NothingToPaste)?;
                let inner = inner_path(container, &snapshot.source_dir, &entry.name);
                let bytes = self.archives.extract(container, &inner, dest_dir)?;
                on_bytes(bytes);
                Ok(())
            }
            TransferMode::Delete => self.fs.remove(&src),
            TransferMode::Install => {
                let package = snapshot.archive_path.as_deref().unwrap_or(&src);
                self.installer.install(package)?;
                on_bytes(entry.size);
                Ok(())
            }
        }
    }
}

fn destination_of(snapshot: &TransferSnapshot, entry: &Entry) -> Result<std::path::PathBuf> {
    snapshot
        .destination
        .as_ref()
        .map(|dir| dir.join(&entry.name))
        .ok_or(ShellError::NothingToPaste)
}

/// 폴더가 섞여 있으면 전체 바이트를 미리 알 수 없으므로 항목 수로 진행률을 낸다
fn progress_bytes_total(snapshot: &TransferSnapshot) -> u64 {
    match snapshot.mode {
        TransferMode::Delete => 0,
        _ if snapshot.entries.iter().any(|e| e.is_folder) => 0,
        _ => snapshot.total_bytes(),
    }
}

/// 아카이브 컨테이너 기준 내부 경로 ("docs/a.txt")
fn inner_path(container: &Path, source_dir: &Path, name: &str) -> String {
    let mut parts: Vec<String> = source_dir
        .strip_prefix(container)
        .map(|rest| {
            rest.components()
                .filter_map(|c| match c {
                    Component::Normal(v) => Some(v.to_string_lossy().to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    parts.push(name.to_string());
    parts.join("/")
}

/// 실행 중인 작업
pub struct TransferHandle {
    mode: TransferMode,
    progress_rx: Receiver<TransferProgress>,
    join_handle: Option<JoinHandle<TransferSummary>>,
    cancel_flag: Arc<AtomicBool>,
    progress: TransferProgress,
}

impl TransferHandle {
    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    pub fn progress(&self) -> &TransferProgress {
        &self.progress
    }

    /// 다음 항목으로 넘어가기 전에 멈추도록 요청
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }

    /// 진행 이벤트를 비우고, 스레드가 끝났으면 결과를 돌려준다. 막히지 않는다.
    pub fn poll(&mut self) -> Option<TransferSummary> {
        self.drain_progress();

        let is_finished = self
            .join_handle
            .as_ref()
            .is_some_and(JoinHandle::is_finished);
        if !is_finished {
            return None;
        }
        self.drain_progress();
        self.join_handle.take().map(|handle| self.join(handle))
    }

    /// 끝날 때까지 기다린다.
    pub fn wait(mut self) -> TransferSummary {
        match self.join_handle.take() {
            Some(handle) => {
                let summary = self.join(handle);
                self.drain_progress();
                summary
            }
            None => TransferSummary::aborted(self.mode, "transfer already collected"),
        }
    }

    fn join(&self, handle: JoinHandle<TransferSummary>) -> TransferSummary {
        handle.join().unwrap_or_else(|_| {
            tracing::error!(mode = self.mode.name(), "transfer worker panicked");
            TransferSummary::aborted(self.mode, "transfer worker panicked")
        })
    }

    fn drain_progress(&mut self) {
        while let Ok(event) = self.progress_rx.try_recv() {
            // 진행률은 줄어들지 않는다
            if event.items_done >= self.progress.items_done
                && event.bytes_done >= self.progress.bytes_done
            {
                self.progress = event;
            }
        }
    }
}

/// 작업 슬롯 (용량 1)
pub struct WorkerSlot {
    engine: TransferEngine,
    running: Option<TransferHandle>,
}

impl WorkerSlot {
    pub fn new(engine: TransferEngine) -> Self {
        Self {
            engine,
            running: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    /// 이미 실행 중이면 `Busy`로 거절한다. (대기열 없음)
    pub fn submit(&mut self, snapshot: TransferSnapshot) -> Result<()> {
        if self.running.is_some() {
            return Err(ShellError::Busy);
        }
        self.running = Some(self.engine.start(snapshot)?);
        Ok(())
    }

    pub fn progress(&self) -> Option<&TransferProgress> {
        self.running.as_ref().map(TransferHandle::progress)
    }

    pub fn cancel(&self) {
        if let Some(handle) = &self.running {
            handle.cancel();
        }
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(TransferHandle::is_cancel_requested)
    }

    /// 끝난 작업이 있으면 슬롯을 비우고 요약을 돌려준다.
    pub fn poll(&mut self) -> Option<TransferSummary> {
        let summary = self.running.as_mut()?.poll()?;
        self.running = None;
        Some(summary)
    }

    /// 실행 중인 작업이 끝날 때까지 기다린다.
    pub fn wait(&mut self) -> Option<TransferSummary> {
        self.running.take().map(TransferHandle::wait)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::operation::TransferStatus;
    use crate::system::archive::ArchiveFs;
    use crate::system::filesystem::FileSystem;
    use crate::system::installer::PackageInstaller;
    use std::fs;
    use std::path::PathBuf;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn engine(temp: &TempDir) -> TransferEngine {
        TransferEngine::new(
            Arc::new(FileSystem::new()),
            Arc::new(ArchiveFs::new()),
            Arc::new(PackageInstaller::new(temp.path().join("apps"))),
        )
    }

    fn file(name: &str, size: u64) -> Entry {
        Entry::file(name, size, SystemTime::UNIX_EPOCH)
    }

    fn run(engine: &TransferEngine, snapshot: &TransferSnapshot) -> TransferSummary {
        let (tx, _rx) = mpsc::channel();
        engine.run(snapshot, &tx, &AtomicBool::new(false))
    }

    fn setup(temp: &TempDir, names: &[&str]) -> (PathBuf, PathBuf) {
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        for name in names {
            fs::write(src.join(name), name.as_bytes()).unwrap();
        }
        (src, dst)
    }

    #[test]
    fn test_copy_collision_fails_item_and_continues() {
        let temp = TempDir::new().unwrap();
        let (src, dst) = setup(&temp, &["a", "b", "c"]);
        fs::write(dst.join("b"), b"old").unwrap();

        let snapshot = TransferSnapshot::paste(
            TransferMode::NormalCopy,
            src,
            vec![file("a", 1), file("b", 1), file("c", 1)],
            dst.clone(),
            None,
        );
        let summary = run(&engine(&temp), &snapshot);

        assert_eq!(summary.status, TransferStatus::SucceededWithErrors);
        assert_eq!((summary.succeeded, summary.failed), (2, 1));
        assert_eq!(fs::read(dst.join("b")).unwrap(), b"old");
        assert!(dst.join("c").exists());
    }

    #[test]
    fn test_move_aborts_on_first_failure() {
        let temp = TempDir::new().unwrap();
        let (src, dst) = setup(&temp, &["1", "2", "4", "5"]);

        // 세 번째 항목은 원본이 없어 실패한다
        let snapshot = TransferSnapshot::paste(
            TransferMode::Move,
            src.clone(),
            ["1", "2", "3", "4", "5"].iter().map(|n| file(n, 1)).collect(),
            dst.clone(),
            None,
        );
        let summary = run(&engine(&temp), &snapshot);

        assert_eq!(summary.status, TransferStatus::SucceededWithErrors);
        assert_eq!((summary.succeeded, summary.failed, summary.skipped), (2, 1, 2));
        assert!(dst.join("1").exists() && dst.join("2").exists());
        assert!(src.join("4").exists() && src.join("5").exists());
        assert!(!dst.join("4").exists());
    }

    #[test]
    fn test_delete_continues_and_reports() {
        let temp = TempDir::new().unwrap();
        let (src, _) = setup(&temp, &["a", "c"]);

        let snapshot = TransferSnapshot::delete(src.clone(), vec![file("a", 1), file("b", 1), file("c", 1)]);
        let summary = run(&engine(&temp), &snapshot);

        assert_eq!((summary.succeeded, summary.failed), (2, 1));
        assert!(!src.join("a").exists());
        assert!(!src.join("c").exists());
    }

    #[test]
    fn test_cancel_before_start_skips_everything() {
        let temp = TempDir::new().unwrap();
        let (src, dst) = setup(&temp, &["a", "b"]);
        let snapshot = TransferSnapshot::paste(
            TransferMode::NormalCopy,
            src,
            vec![file("a", 1), file("b", 1)],
            dst.clone(),
            None,
        );

        let (tx, _rx) = mpsc::channel();
        let summary = engine(&temp).run(&snapshot, &tx, &AtomicBool::new(true));

        assert_eq!(summary.status, TransferStatus::Cancelled);
        assert_eq!(summary.skipped, 2);
        assert!(!dst.join("a").exists());
    }

    /// 정해진 수만큼 복사한 뒤 취소 플래그를 세우는 파일 서비스
    struct CancelAfterFs {
        inner: FileSystem,
        cancel: Arc<AtomicBool>,
        remaining: std::sync::atomic::AtomicUsize,
    }

    impl FileService for CancelAfterFs {
        fn list(&self, dir: &Path) -> Result<Vec<Entry>> {
            self.inner.list(dir)
        }

        fn stat(&self, path: &Path) -> crate::system::filesystem::Stat {
            self.inner.stat(path)
        }

        fn copy(&self, src: &Path, dest: &Path, on_bytes: &mut dyn FnMut(u64)) -> Result<u64> {
            let bytes = self.inner.copy(src, dest, on_bytes)?;
            if self.remaining.fetch_sub(1, Ordering::SeqCst) == 1 {
                self.cancel.store(true, Ordering::SeqCst);
            }
            Ok(bytes)
        }

        fn move_path(&self, src: &Path, dest: &Path, on_bytes: &mut dyn FnMut(u64)) -> Result<u64> {
            self.inner.move_path(src, dest, on_bytes)
        }

        fn remove(&self, path: &Path) -> Result<()> {
            self.inner.remove(path)
        }

        fn mkdir(&self, path: &Path) -> Result<()> {
            self.inner.mkdir(path)
        }

        fn rename(&self, from: &Path, to: &Path) -> Result<()> {
            self.inner.rename(from, to)
        }
    }

    #[test]
    fn test_cancel_between_items_reports_partial_completion() {
        let temp = TempDir::new().unwrap();
        let (src, dst) = setup(&temp, &["a", "b", "c", "d"]);
        let cancel = Arc::new(AtomicBool::new(false));
        let engine = TransferEngine::new(
            Arc::new(CancelAfterFs {
                inner: FileSystem::new(),
                cancel: Arc::clone(&cancel),
                remaining: std::sync::atomic::AtomicUsize::new(2),
            }),
            Arc::new(ArchiveFs::new()),
            Arc::new(PackageInstaller::new(temp.path().join("apps"))),
        );
        let snapshot = TransferSnapshot::paste(
            TransferMode::NormalCopy,
            src,
            ["a", "b", "c", "d"].iter().map(|n| file(n, 1)).collect(),
            dst.clone(),
            None,
        );

        let (tx, rx) = mpsc::channel();
        let summary = engine.run(&snapshot, &tx, &cancel);

        assert_eq!(summary.status, TransferStatus::Cancelled);
        assert_eq!((summary.succeeded, summary.failed, summary.skipped), (2, 0, 2));
        assert!(dst.join("a").exists() && dst.join("b").exists());
        assert!(!dst.join("c").exists() && !dst.join("d").exists());
        let last = rx.try_iter().last().unwrap();
        assert_eq!(last.items_done, 2);
    }

    #[test]
    fn test_extract_from_archive_subdir() {
        let temp = TempDir::new().unwrap();
        let zip = temp.path().join("pack.zip");
        crate::system::archive::tests::write_zip(&zip, &[("docs/a.txt", "alpha"), ("docs/b.txt", "beta")]);
        let dst = temp.path().join("out");
        fs::create_dir(&dst).unwrap();

        let snapshot = TransferSnapshot::paste(
            TransferMode::Extract,
            zip.join("docs"),
            vec![file("a.txt", 5)],
            dst.clone(),
            Some(zip.clone()),
        );
        let summary = run(&engine(&temp), &snapshot);

        assert_eq!(summary.status, TransferStatus::Succeeded);
        assert_eq!(summary.bytes_done, 5);
        assert_eq!(fs::read(dst.join("a.txt")).unwrap(), b"alpha");
        assert!(!dst.join("b.txt").exists());
    }

    #[test]
    fn test_worker_slot_rejects_second_submit() {
        let temp = TempDir::new().unwrap();
        let (src, dst) = setup(&temp, &["a"]);
        let snapshot = TransferSnapshot::paste(
            TransferMode::NormalCopy,
            src,
            vec![file("a", 1)],
            dst.clone(),
            None,
        );

        let mut slot = WorkerSlot::new(engine(&temp));
        slot.submit(snapshot.clone()).unwrap();
        assert!(matches!(slot.submit(snapshot), Err(ShellError::Busy)));

        let summary = slot.wait().unwrap();
        assert_eq!(summary.status, TransferStatus::Succeeded);
        assert!(!slot.is_busy());
        assert!(dst.join("a").exists());
    }

    #[test]
    fn test_handle_progress_is_monotonic() {
        let temp = TempDir::new().unwrap();
        let (src, dst) = setup(&temp, &["a", "b"]);
        let snapshot = TransferSnapshot::paste(
            TransferMode::NormalCopy,
            src,
            vec![file("a", 1), file("b", 1)],
            dst,
            None,
        );

        let mut handle = engine(&temp).start(snapshot).unwrap();
        let mut last = 0;
        let summary = loop {
            if let Some(summary) = handle.poll() {
                break summary;
            }
            assert!(handle.progress().items_done >= last);
            last = handle.progress().items_done;
            std::thread::yield_now();
        };
        assert_eq!(summary.succeeded, 2);
        assert_eq!(handle.progress().items_done, 2);
        assert_eq!(handle.progress().percentage(), 100);
    }

    #[test]
    fn test_inner_path() {
        let container = Path::new("/d/pack.zip");
        assert_eq!(inner_path(container, container, "a"), "a");
        assert_eq!(inner_path(container, &container.join("x/y"), "a"), "x/y/a");
    }
}
