//! 셸 세션: 목록, 커서/깊이, 아카이브 상태, 선택 목록을 한데 묶은 상태
//!
//! 모든 변경은 UI 스레드에서만 일어난다. 작업 스레드는 스냅샷만 받는다.

use crate::models::archive_context::ArchiveContext;
use crate::models::entry::{Entry, FileKind};
use crate::models::entry_list::{EntryList, EntrySource, Location, SortPolicy};
use crate::models::navigation::NavigationState;
use crate::models::operation::{TransferMode, TransferSnapshot};
use crate::models::selection::{CommitReport, MarkAllLabel, SelectionSets};
use crate::system::archive::{detect_archive_format, ArchiveService};
use crate::system::filesystem::{FileService, MountPoint, Stat};
use crate::utils::error::{Result, ShellError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

const NEW_FOLDER_NAME: &str = "New folder";

/// 세션 생성 옵션 (설정 파일에서 옴)
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub sort: SortPolicy,
    pub visible_rows: usize,
    pub package_extensions: Vec<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            sort: SortPolicy::Alphabetical,
            visible_rows: 20,
            package_extensions: vec!["vpk".to_string()],
        }
    }
}

/// Enter 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnterOutcome {
    /// 목록이 비어 있음
    Nothing,
    Navigated,
    OpenedArchive,
    /// 설치 확인이 필요함
    InstallRequested(PathBuf),
    /// 처리할 방법이 없는 파일
    Unsupported(String),
}

/// 목록 소스: Home은 마운트 테이블, 아카이브 안은 아카이브, 그 외는 파일 시스템
struct SessionSource<'a> {
    fs: &'a dyn FileService,
    archives: &'a dyn ArchiveService,
    archive: &'a ArchiveContext,
    mounts: &'a [MountPoint],
}

impl EntrySource for SessionSource<'_> {
    fn list(&self, location: &Location) -> Result<Vec<Entry>> {
        match location {
            Location::Home => Ok(self
                .mounts
                .iter()
                .map(|m| Entry::folder(m.name.clone(), SystemTime::UNIX_EPOCH))
                .collect()),
            Location::Dir(path) => match (self.archive.handle(), self.archive.inner_path(path)) {
                (Some(handle), Some(inner)) => self.archives.list(handle, &inner),
                _ => self.fs.list(path),
            },
        }
    }
}

pub struct ShellSession {
    pub entries: EntryList,
    pub nav: NavigationState,
    pub archive: ArchiveContext,
    pub selection: SelectionSets,
    mounts: Vec<MountPoint>,
    package_extensions: Vec<String>,
    fs: Arc<dyn FileService>,
    archives: Arc<dyn ArchiveService>,
}

impl ShellSession {
    pub fn new(
        fs: Arc<dyn FileService>,
        archives: Arc<dyn ArchiveService>,
        mounts: Vec<MountPoint>,
        options: SessionOptions,
    ) -> Self {
        let mut session = Self {
            entries: EntryList::new(options.sort),
            nav: NavigationState::new(options.visible_rows),
            archive: ArchiveContext::new(),
            selection: SelectionSets::new(),
            mounts,
            package_extensions: options.package_extensions,
            fs,
            archives,
        };
        // Home 목록은 실패하지 않는다
        let _ = session.refresh_with_fallback();
        session
    }

    pub fn file_service(&self) -> Arc<dyn FileService> {
        Arc::clone(&self.fs)
    }

    pub fn archive_service(&self) -> Arc<dyn ArchiveService> {
        Arc::clone(&self.archives)
    }

    pub fn depth(&self) -> usize {
        self.nav.depth()
    }

    pub fn location(&self) -> &Location {
        self.entries.location()
    }

    pub fn current_dir(&self) -> Option<&Path> {
        self.entries.location().path()
    }

    pub fn in_archive(&self) -> bool {
        self.archive.is_active()
    }

    pub fn highlighted(&self) -> Option<&Entry> {
        self.entries.get(self.nav.cursor.index())
    }

    pub fn mounts(&self) -> &[MountPoint] {
        &self.mounts
    }

    pub fn package_extensions(&self) -> &[String] {
        &self.package_extensions
    }

    // === 커서 이동 ===

    pub fn move_up(&mut self) {
        self.nav.move_up();
    }

    pub fn move_down(&mut self) {
        self.nav.move_down(self.entries.len());
    }

    pub fn page_up(&mut self) {
        self.nav.page_up();
    }

    pub fn page_down(&mut self) {
        self.nav.page_down(self.entries.len());
    }

    pub fn set_visible_rows(&mut self, rows: usize) {
        self.nav.set_window(rows);
        self.nav.clamp(self.entries.len());
    }

    // === 탐색 ===

    /// 현재 위치의 폴더 `name`으로 들어간다.
    ///
    /// Home에서는 같은 이름의 마운트 루트로 간다. 새 위치를 읽지 못하면 상위로
    /// 올라가며 재시도하고, 처음 만난 오류를 돌려준다. (상태는 항상 유효)
    pub fn descend(&mut self, name: &str) -> Result<()> {
        let target = match self.entries.location() {
            Location::Home => self
                .mounts
                .iter()
                .find(|m| m.name == name)
                .map(|m| m.path.clone())
                .ok_or_else(|| ShellError::PathNotFound {
                    path: PathBuf::from(name),
                })?,
            Location::Dir(path) => path.join(name),
        };

        self.nav.descend();
        self.selection.unmark_all();
        self.entries.set_location(Location::Dir(target));
        self.refresh_with_fallback()
    }

    /// 한 단계 위로. 마운트 루트에서는 Home으로 간다.
    pub fn ascend(&mut self) -> Result<()> {
        if self.nav.depth() == 0 {
            return Ok(());
        }
        self.step_up();
        self.refresh_with_fallback()
    }

    /// Home으로. 열린 아카이브가 있으면 닫는다. 여러 번 호출해도 같다.
    pub fn go_home(&mut self) {
        self.nav.reset_home();
        self.archive.close(self.archives.as_ref());
        self.selection.unmark_all();
        self.entries.set_location(Location::Home);
        let _ = self.refresh_with_fallback();
    }

    /// 강조 항목 처리: `..`는 상위로, 폴더는 하위로, 파일은 종류에 따라
    pub fn enter_selected(&mut self) -> Result<EnterOutcome> {
        let Some(entry) = self.highlighted().cloned() else {
            return Ok(EnterOutcome::Nothing);
        };
        self.selection.unmark_all();

        if entry.is_parent_marker() {
            self.ascend()?;
            return Ok(EnterOutcome::Navigated);
        }
        if entry.is_folder {
            self.descend(&entry.name)?;
            return Ok(EnterOutcome::Navigated);
        }

        let Some(dir) = self.current_dir().map(Path::to_path_buf) else {
            return Ok(EnterOutcome::Unsupported(entry.name));
        };
        // 아카이브 안의 파일은 실제 경로가 아니므로 중첩 열기/설치를 하지 않는다
        if self.in_archive() {
            return Ok(EnterOutcome::Unsupported(entry.name));
        }
        match entry.kind(&self.package_extensions) {
            FileKind::Archive => {
                self.open_archive(&entry.name)?;
                Ok(EnterOutcome::OpenedArchive)
            }
            FileKind::Package => Ok(EnterOutcome::InstallRequested(dir.join(&entry.name))),
            FileKind::Other => Ok(EnterOutcome::Unsupported(entry.name)),
        }
    }

    /// 현재 디렉토리의 아카이브 파일을 가상 디렉토리로 연다.
    pub fn open_archive(&mut self, name: &str) -> Result<()> {
        if self.in_archive() {
            return Err(ShellError::ReadOnlyLocation {
                location: "nested archive".to_string(),
            });
        }
        let dir = self
            .current_dir()
            .ok_or_else(|| ShellError::ReadOnlyLocation {
                location: "Home".to_string(),
            })?;
        let container = dir.join(name);
        let handle = self.archives.open(&container)?;

        tracing::info!(container = %container.display(), depth = self.nav.depth(), "entering archive");
        self.archive.enter(handle, self.nav.depth());
        self.nav.descend();
        self.selection.unmark_all();
        self.entries.set_location(Location::Dir(container));
        self.refresh_with_fallback()
    }

    /// 현재 위치를 다시 읽는다. 실패하면 성공할 때까지 상위로 올라간다.
    ///
    /// 처음 만난 오류를 돌려주지만, 돌아온 시점의 상태는 항상 유효하다.
    pub fn refresh_with_fallback(&mut self) -> Result<()> {
        let mut first_error = None;
        loop {
            let source = SessionSource {
                fs: self.fs.as_ref(),
                archives: self.archives.as_ref(),
                archive: &self.archive,
                mounts: &self.mounts,
            };
            match self.entries.refresh(&source) {
                Ok(()) => break,
                Err(e) => {
                    tracing::warn!(location = %self.entries.location().display(), error = %e, "listing failed, moving up");
                    if self.entries.location().is_home() {
                        first_error.get_or_insert(e);
                        break;
                    }
                    first_error.get_or_insert(e);
                    self.step_up();
                }
            }
        }
        self.nav.clamp(self.entries.len());

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// 새로 고침 + 선택 목록 대조
    pub fn refresh(&mut self) -> Result<()> {
        let result = self.refresh_with_fallback();
        self.reconcile_selections();
        result
    }

    /// 목록을 다시 읽지 않고 한 단계 위로 상태만 옮긴다.
    fn step_up(&mut self) {
        self.selection.unmark_all();
        let parent = self
            .current_dir()
            .and_then(Path::parent)
            .map(Path::to_path_buf);

        match parent {
            Some(parent) if self.nav.depth() > 1 => {
                self.nav.ascend();
                // 목록을 읽기 전에 아카이브를 닫는다
                if self.archive.should_close(self.nav.depth()) {
                    self.archive.close(self.archives.as_ref());
                }
                self.entries.set_location(Location::Dir(parent));
            }
            _ => {
                self.nav.reset_home();
                self.archive.close(self.archives.as_ref());
                self.entries.set_location(Location::Home);
            }
        }
    }

    // === 선택 ===

    /// 강조 항목 선택 토글. Home과 `..`에서는 아무것도 하지 않는다.
    pub fn toggle_mark(&mut self) {
        let (Some(entry), Some(dir)) = (self.highlighted().cloned(), self.current_dir()) else {
            return;
        };
        let dir = dir.to_path_buf();
        self.selection.toggle_mark(&entry, &dir);
    }

    pub fn toggle_mark_all(&mut self) {
        let Some(dir) = self.current_dir().map(Path::to_path_buf) else {
            return;
        };
        let highlighted = self.highlighted().cloned();
        self.selection
            .toggle_mark_all(&self.entries, highlighted.as_ref(), &dir);
    }

    pub fn mark_all_label(&self) -> MarkAllLabel {
        self.selection
            .mark_all_label(&self.entries, self.highlighted())
    }

    /// 복사(`move_requested == false`) 또는 잘라내기를 붙여넣기 대기 목록에 담는다.
    pub fn commit(&mut self, move_requested: bool) -> Result<CommitReport> {
        let dir = self
            .current_dir()
            .map(Path::to_path_buf)
            .ok_or_else(|| ShellError::ReadOnlyLocation {
                location: "Home".to_string(),
            })?;
        if move_requested && self.in_archive() {
            return Err(ShellError::ReadOnlyLocation {
                location: "archive".to_string(),
            });
        }
        let entry = self
            .highlighted()
            .filter(|e| !e.is_parent_marker())
            .cloned()
            .ok_or(ShellError::NothingSelected)?;

        let container = self.archive.container_path().map(Path::to_path_buf);
        let report =
            self.selection
                .commit_to_pending(&entry, &dir, move_requested, container.as_deref());
        tracing::debug!(mode = ?report.mode, count = report.names.len(), "clipboard updated");
        Ok(report)
    }

    // === 작업 스냅샷 ===

    /// 붙여넣기 스냅샷. 대기 목록을 먼저 저장소와 대조한다.
    pub fn paste_snapshot(&mut self) -> Result<TransferSnapshot> {
        let destination = self.writable_dir()?;
        self.reconcile_selections();

        let pending = self.selection.pending();
        let origin = pending
            .origin()
            .map(Path::to_path_buf)
            .ok_or(ShellError::NothingToPaste)?;
        if pending.is_empty() {
            return Err(ShellError::NothingToPaste);
        }

        Ok(TransferSnapshot::paste(
            self.selection.pending_mode(),
            origin,
            pending.to_vec(),
            destination,
            self.selection.pending_archive().map(Path::to_path_buf),
        ))
    }

    /// 삭제 스냅샷. 선택 목록을 먼저 저장소와 대조하고, 대기 목록은 건드리지 않는다.
    pub fn delete_snapshot(&mut self) -> Result<TransferSnapshot> {
        let dir = self.writable_dir()?;
        self.reconcile_selections();
        let entry = self
            .highlighted()
            .filter(|e| !e.is_parent_marker())
            .cloned()
            .ok_or(ShellError::NothingSelected)?;
        if !self.entry_exists(&dir, &entry) {
            return Err(ShellError::PathNotFound {
                path: dir.join(&entry.name),
            });
        }
        Ok(TransferSnapshot::delete(
            dir,
            self.selection.resolve_targets(&entry),
        ))
    }

    pub fn install_snapshot(&self, package: &Path) -> Result<TransferSnapshot> {
        let entry = match self.fs.stat(package) {
            Stat::Exists { is_folder: false } => {
                let name = package
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let size = self
                    .entries
                    .find_by_name(&name)
                    .map(|e| e.size)
                    .unwrap_or(0);
                Entry::file(name, size, SystemTime::UNIX_EPOCH)
            }
            _ => {
                return Err(ShellError::PathNotFound {
                    path: package.to_path_buf(),
                })
            }
        };
        Ok(TransferSnapshot::install(package, entry))
    }

    // === 편집 ===

    /// 새 폴더 생성. 이름이 없으면 "New folder", "New folder (2)", ... 중 빈 이름
    pub fn create_folder(&mut self, name: Option<&str>) -> Result<String> {
        let dir = self.writable_dir()?;
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(given) => {
                validate_name(given)?;
                given.to_string()
            }
            None => self.next_new_folder_name(&dir),
        };
        self.fs.mkdir(&dir.join(&name))?;
        tracing::info!(dir = %dir.display(), name = %name, "folder created");

        self.refresh()?;
        self.select_by_name(&name);
        Ok(name)
    }

    pub fn next_new_folder_name(&self, dir: &Path) -> String {
        let mut candidate = NEW_FOLDER_NAME.to_string();
        let mut n = 2;
        while self.fs.stat(&dir.join(&candidate)).exists() {
            candidate = format!("{} ({})", NEW_FOLDER_NAME, n);
            n += 1;
        }
        candidate
    }

    pub fn rename_highlighted(&mut self, new_name: &str) -> Result<()> {
        let dir = self.writable_dir()?;
        let entry = self
            .highlighted()
            .filter(|e| !e.is_parent_marker())
            .cloned()
            .ok_or(ShellError::NothingSelected)?;
        let new_name = new_name.trim();
        validate_name(new_name)?;
        if new_name == entry.name {
            return Ok(());
        }

        self.fs.rename(&dir.join(&entry.name), &dir.join(new_name))?;
        tracing::info!(from = %entry.name, to = %new_name, "renamed");
        self.refresh()?;
        self.select_by_name(new_name);
        Ok(())
    }

    fn select_by_name(&mut self, name: &str) {
        if let Some(index) = self.entries.position(name) {
            self.nav.select(index);
        }
    }

    /// 쓰기 가능한 실제 디렉토리 (Home, 아카이브 안은 불가)
    fn writable_dir(&self) -> Result<PathBuf> {
        if self.in_archive() {
            return Err(ShellError::ReadOnlyLocation {
                location: "archive".to_string(),
            });
        }
        self.current_dir()
            .map(Path::to_path_buf)
            .ok_or_else(|| ShellError::ReadOnlyLocation {
                location: "Home".to_string(),
            })
    }

    // === 대조 ===

    /// `origin` 아래에 `entry`가 아직 있는지 (열린 아카이브, 닫힌 아카이브, 파일 시스템 순)
    pub fn entry_exists(&self, origin: &Path, entry: &Entry) -> bool {
        if let (Some(handle), Some(inner)) = (self.archive.handle(), self.archive.inner_path(origin)) {
            return handle.contains(&join_inner(&inner, &entry.name));
        }
        if self.fs.stat(&origin.join(&entry.name)).exists() {
            return true;
        }

        // 닫힌 아카이브에서 담아 둔 항목: 컨테이너를 잠시 열어 확인
        for container in origin.ancestors() {
            if self.fs.stat(container) != (Stat::Exists { is_folder: false }) {
                continue;
            }
            if detect_archive_format(container).is_none() {
                return false;
            }
            let Ok(rest) = origin.strip_prefix(container) else {
                return false;
            };
            let inner = rest
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/");
            return match self.archives.open(container) {
                Ok(handle) => {
                    let found = handle.contains(&join_inner(&inner, &entry.name));
                    self.archives.close(handle);
                    found
                }
                Err(_) => false,
            };
        }
        false
    }

    /// 사라진 항목을 선택/대기 목록에서 제거
    pub fn reconcile_selections(&mut self) {
        let mut selection = std::mem::take(&mut self.selection);
        selection.reconcile(|origin, entry| self.entry_exists(origin, entry));
        self.selection = selection;
    }

    /// 붙여넣기 모드가 이동인지 (확인 대화상자 여부 결정)
    pub fn pending_is_move(&self) -> bool {
        self.selection.pending_mode() == TransferMode::Move
    }
}

fn join_inner(inner: &str, name: &str) -> String {
    if inner.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", inner, name)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(ShellError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}
