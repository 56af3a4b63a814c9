//! 다중 선택(marked)과 붙여넣기 대기(pending) 목록
//!
//! 두 목록 모두 목록 항목의 복제본을 이름 순서(삽입 순서)대로 보관한다.
//! 원본 목록이 새로 고쳐져도 영향을 받지 않으며, 사용 전에 실제 저장소와
//! 대조(reconcile)해서 사라진 항목을 걸러낸다.

use crate::models::entry::Entry;
use crate::models::entry_list::EntryList;
use crate::models::operation::TransferMode;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// 이름으로 키가 매겨진 순서 있는 항목 집합 + 출처 디렉토리
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    items: IndexMap<String, Entry>,
    origin: Option<PathBuf>,
}

impl SelectionSet {
    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.items.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.keys().map(String::as_str).collect()
    }

    pub fn to_vec(&self) -> Vec<Entry> {
        self.items.values().cloned().collect()
    }

    fn insert(&mut self, entry: &Entry, origin: &Path) {
        if self.origin.as_deref() != Some(origin) {
            self.items.clear();
            self.origin = Some(origin.to_path_buf());
        }
        self.items.insert(entry.name.clone(), entry.clone());
    }

    fn remove(&mut self, name: &str) {
        self.items.shift_remove(name);
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.origin = None;
    }

    fn retain(&mut self, mut keep: impl FnMut(&Path, &Entry) -> bool) {
        let Some(origin) = self.origin.clone() else {
            return;
        };
        self.items.retain(|_, entry| keep(&origin, entry));
    }
}

/// 모두 선택 / 모두 해제 메뉴 표시
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkAllLabel {
    MarkAll,
    UnmarkAll,
}

/// 붙여넣기 대기 목록에 담은 결과 (안내 메시지용)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub mode: TransferMode,
    pub names: Vec<String>,
    pub single_is_folder: bool,
}

#[derive(Debug, Clone)]
pub struct SelectionSets {
    pub marked: SelectionSet,
    pending: SelectionSet,
    pending_mode: TransferMode,
    /// Extract 모드일 때 원본 아카이브 파일
    pending_archive: Option<PathBuf>,
}

impl Default for SelectionSets {
    fn default() -> Self {
        Self {
            marked: SelectionSet::default(),
            pending: SelectionSet::default(),
            pending_mode: TransferMode::NormalCopy,
            pending_archive: None,
        }
    }
}

impl SelectionSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &SelectionSet {
        &self.pending
    }

    pub fn pending_mode(&self) -> TransferMode {
        self.pending_mode
    }

    pub fn pending_archive(&self) -> Option<&Path> {
        self.pending_archive.as_deref()
    }

    pub fn is_marked(&self, name: &str) -> bool {
        self.marked.contains(name)
    }

    /// 강조 항목의 선택 상태를 뒤집는다. `..`는 무시.
    pub fn toggle_mark(&mut self, entry: &Entry, origin: &Path) {
        if entry.is_parent_marker() {
            return;
        }
        if self.marked.contains(&entry.name) {
            self.marked.remove(&entry.name);
        } else {
            self.marked.insert(entry, origin);
        }
    }

    pub fn mark_all(&mut self, list: &EntryList, origin: &Path) {
        for entry in list.iter().filter(|e| !e.is_parent_marker()) {
            self.marked.insert(entry, origin);
        }
    }

    pub fn unmark_all(&mut self) {
        self.marked.clear();
    }

    pub fn mark_all_label(&self, list: &EntryList, highlighted: Option<&Entry>) -> MarkAllLabel {
        let on_marked = highlighted.is_some_and(|e| self.marked.contains(&e.name));
        if on_marked || (self.marked.len() == list.selectable_len() && !self.marked.is_empty()) {
            MarkAllLabel::UnmarkAll
        } else {
            MarkAllLabel::MarkAll
        }
    }

    /// 메뉴의 모두 선택/해제 동작
    ///
    /// 일단 모두 해제하고, 이전에 전부 선택된 상태가 아니었고 강조 항목도
    /// 선택되지 않았던 경우에만 전부 선택한다.
    pub fn toggle_mark_all(&mut self, list: &EntryList, highlighted: Option<&Entry>, origin: &Path) {
        let label = self.mark_all_label(list, highlighted);
        self.unmark_all();
        if label == MarkAllLabel::MarkAll {
            self.mark_all(list, origin);
        }
    }

    /// 작업 대상 결정: 강조 항목이 선택되어 있으면 선택 목록 전체, 아니면 강조 항목 하나
    pub fn resolve_targets(&self, highlighted: &Entry) -> Vec<Entry> {
        if self.marked.contains(&highlighted.name) {
            self.marked.to_vec()
        } else {
            vec![highlighted.clone()]
        }
    }

    /// 복사/잘라내기: 대상 항목을 붙여넣기 대기 목록으로 옮긴다.
    ///
    /// 이동 요청이면 Move, 아카이브 안이면 Extract, 그 외에는 NormalCopy.
    pub fn commit_to_pending(
        &mut self,
        highlighted: &Entry,
        origin: &Path,
        move_requested: bool,
        archive: Option<&Path>,
    ) -> CommitReport {
        let targets = self.resolve_targets(highlighted);
        let mode = if move_requested {
            TransferMode::Move
        } else if archive.is_some() {
            TransferMode::Extract
        } else {
            TransferMode::NormalCopy
        };

        self.pending.clear();
        for entry in &targets {
            self.pending.insert(entry, origin);
        }
        self.pending_mode = mode;
        self.pending_archive = if mode == TransferMode::Extract {
            archive.map(Path::to_path_buf)
        } else {
            None
        };

        CommitReport {
            mode,
            single_is_folder: targets.len() == 1 && targets[0].is_folder,
            names: targets.into_iter().map(|e| e.name).collect(),
        }
    }

    pub fn clear_pending(&mut self) {
        self.pending.clear();
        self.pending_archive = None;
        self.pending_mode = TransferMode::NormalCopy;
    }

    /// 저장소에 더 이상 없는 항목을 양쪽 목록에서 조용히 제거한다.
    ///
    /// `exists(origin, entry)`는 출처 디렉토리 기준으로 항목 존재 여부를 알려준다.
    pub fn reconcile(&mut self, mut exists: impl FnMut(&Path, &Entry) -> bool) {
        self.marked.retain(&mut exists);
        self.pending.retain(&mut exists);
        if self.pending.is_empty() {
            self.pending_archive = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entry_list::{Location, SortPolicy};
    use std::time::SystemTime;

    fn list_of(names: &[&str]) -> EntryList {
        let mut list = EntryList::new(SortPolicy::Append);
        list.set_location(Location::Dir(PathBuf::from("/d")));
        list.insert(Entry::parent_marker(), SortPolicy::Append);
        for name in names {
            list.insert(Entry::file(*name, 1, SystemTime::UNIX_EPOCH), SortPolicy::Append);
        }
        list
    }

    fn origin() -> PathBuf {
        PathBuf::from("/d")
    }

    #[test]
    fn test_toggle_ignores_parent_marker() {
        let mut sets = SelectionSets::new();
        sets.toggle_mark(&Entry::parent_marker(), &origin());
        assert!(sets.marked.is_empty());
    }

    #[test]
    fn test_mark_all_then_unmark_all_is_empty() {
        let list = list_of(&["a", "b", "c"]);
        let mut sets = SelectionSets::new();
        sets.mark_all(&list, &origin());
        assert_eq!(sets.marked.len(), 3);
        assert!(!sets.is_marked(".."));
        sets.unmark_all();
        assert!(sets.marked.is_empty());
    }

    #[test]
    fn test_mark_all_label_and_toggle() {
        let list = list_of(&["a", "b"]);
        let a = list.get(1).cloned().unwrap();
        let b = list.get(2).cloned().unwrap();
        let mut sets = SelectionSets::new();

        assert_eq!(sets.mark_all_label(&list, Some(&a)), MarkAllLabel::MarkAll);
        sets.toggle_mark(&b, &origin());
        // 강조 항목(a)은 선택되지 않았고 전부 선택된 것도 아님
        assert_eq!(sets.mark_all_label(&list, Some(&a)), MarkAllLabel::MarkAll);
        // 강조 항목이 선택되어 있으면 해제 라벨
        assert_eq!(sets.mark_all_label(&list, Some(&b)), MarkAllLabel::UnmarkAll);

        sets.toggle_mark_all(&list, Some(&a), &origin());
        assert_eq!(sets.marked.names(), vec!["a", "b"]);

        sets.toggle_mark_all(&list, Some(&a), &origin());
        assert!(sets.marked.is_empty());
    }

    #[test]
    fn test_commit_uses_marked_only_when_highlight_is_marked() {
        let list = list_of(&["a", "b", "c"]);
        let a = list.get(1).cloned().unwrap();
        let b = list.get(2).cloned().unwrap();
        let c = list.get(3).cloned().unwrap();
        let mut sets = SelectionSets::new();
        sets.toggle_mark(&a, &origin());
        sets.toggle_mark(&c, &origin());

        let report = sets.commit_to_pending(&b, &origin(), false, None);
        assert_eq!(report.names, vec!["b"]);
        assert_eq!(report.mode, TransferMode::NormalCopy);

        let report = sets.commit_to_pending(&c, &origin(), true, None);
        assert_eq!(report.names, vec!["a", "c"]);
        assert_eq!(sets.pending_mode(), TransferMode::Move);
        assert_eq!(sets.pending().origin(), Some(origin().as_path()));
    }

    #[test]
    fn test_commit_inside_archive_is_extract() {
        let list = list_of(&["x.txt"]);
        let x = list.get(1).cloned().unwrap();
        let mut sets = SelectionSets::new();
        let archive = PathBuf::from("/d/pack.zip");

        let report = sets.commit_to_pending(&x, &archive.join("docs"), false, Some(&archive));
        assert_eq!(report.mode, TransferMode::Extract);
        assert_eq!(sets.pending_archive(), Some(archive.as_path()));
    }

    #[test]
    fn test_pending_survives_unmark() {
        let list = list_of(&["a"]);
        let a = list.get(1).cloned().unwrap();
        let mut sets = SelectionSets::new();
        sets.toggle_mark(&a, &origin());
        sets.commit_to_pending(&a, &origin(), false, None);
        sets.unmark_all();
        assert_eq!(sets.pending().len(), 1);
    }

    #[test]
    fn test_reconcile_drops_only_missing() {
        let list = list_of(&["a", "b", "c"]);
        let mut sets = SelectionSets::new();
        sets.mark_all(&list, &origin());
        let b = list.get(2).cloned().unwrap();
        sets.commit_to_pending(&b, &origin(), false, None);

        sets.reconcile(|_, entry| entry.name != "b");
        assert_eq!(sets.marked.names(), vec!["a", "c"]);
        assert_eq!(sets.pending().names(), vec!["a", "c"]);

        sets.reconcile(|_, _| false);
        assert!(sets.marked.is_empty());
        assert!(sets.pending().is_empty());
    }
}
