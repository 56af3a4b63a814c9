//! 현재 위치의 항목 목록
//!
//! 실제 디렉토리, 마운트 루트(Home), 아카이브 내부 가상 디렉토리를
//! 하나의 순서 있는 목록으로 표현한다.

use crate::models::entry::Entry;
use crate::utils::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 목록이 나타내는 위치
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// 마운트 목록 (depth 0)
    Home,
    /// 디렉토리 경로 (아카이브 내부라면 컨테이너 경로 아래의 가상 경로)
    Dir(PathBuf),
}

impl Location {
    pub fn is_home(&self) -> bool {
        matches!(self, Location::Home)
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Location::Home => None,
            Location::Dir(path) => Some(path),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Location::Home => "Home".to_string(),
            Location::Dir(path) => path.to_string_lossy().to_string(),
        }
    }
}

/// 삽입 정렬 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortPolicy {
    Append,
    /// 바이트 순서(대소문자 구분) 오름차순, 폴더/파일 구분 없음
    #[default]
    Alphabetical,
}

/// 목록을 채워주는 쪽 (파일 시스템, 아카이브, 마운트 테이블)
pub trait EntrySource {
    fn list(&self, location: &Location) -> Result<Vec<Entry>>;
}

#[derive(Debug, Clone)]
pub struct EntryList {
    entries: Vec<Entry>,
    location: Location,
    policy: SortPolicy,
}

impl EntryList {
    pub fn new(policy: SortPolicy) -> Self {
        Self {
            entries: Vec::new(),
            location: Location::Home,
            policy,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    pub fn policy(&self) -> SortPolicy {
        self.policy
    }

    /// 현재 위치를 다시 읽어 목록 전체를 재구성한다.
    ///
    /// 실패하면 목록은 비어 있고 위치는 그대로 남는다. (호출자가 상위로 이동)
    pub fn refresh(&mut self, source: &dyn EntrySource) -> Result<()> {
        self.clear();
        let listed = source.list(&self.location)?;

        if !self.location.is_home() {
            self.entries.push(Entry::parent_marker());
        }
        for entry in listed {
            if entry.is_parent_marker() {
                continue;
            }
            self.insert(entry, self.policy);
        }
        Ok(())
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// 정책에 따라 삽입. `..`는 항상 맨 앞에 남는다.
    pub fn insert(&mut self, entry: Entry, policy: SortPolicy) {
        let floor = usize::from(self.has_parent_marker());
        match policy {
            SortPolicy::Append => self.entries.push(entry),
            SortPolicy::Alphabetical => {
                let idx = self.entries[floor..]
                    .partition_point(|e| e.name.as_bytes() <= entry.name.as_bytes());
                self.entries.insert(floor + idx, entry);
            }
        }
    }

    /// 첫 번째 일치 항목 제거. 없으면 아무것도 하지 않는다.
    pub fn remove_by_name(&mut self, name: &str) -> Option<Entry> {
        let idx = self.position(name)?;
        Some(self.entries.remove(idx))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `..`를 제외한 항목 수
    pub fn selectable_len(&self) -> usize {
        self.entries.len() - usize::from(self.has_parent_marker())
    }

    fn has_parent_marker(&self) -> bool {
        self.entries.first().is_some_and(Entry::is_parent_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ShellError;
    use std::time::SystemTime;

    struct FixedSource(Vec<Entry>);

    impl EntrySource for FixedSource {
        fn list(&self, _location: &Location) -> Result<Vec<Entry>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSource;

    impl EntrySource for BrokenSource {
        fn list(&self, location: &Location) -> Result<Vec<Entry>> {
            Err(ShellError::PathNotFound {
                path: location.path().map(Path::to_path_buf).unwrap_or_default(),
            })
        }
    }

    fn file(name: &str) -> Entry {
        Entry::file(name, 1, SystemTime::UNIX_EPOCH)
    }

    fn names(list: &EntryList) -> Vec<&str> {
        list.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_refresh_prepends_parent_outside_home() {
        let source = FixedSource(vec![file("b"), file("a"), Entry::folder("C", SystemTime::UNIX_EPOCH)]);
        let mut list = EntryList::new(SortPolicy::Alphabetical);
        list.set_location(Location::Dir(PathBuf::from("/data")));
        list.refresh(&source).unwrap();

        assert_eq!(names(&list), vec!["..", "C", "a", "b"]);
        assert_eq!(list.selectable_len(), 3);
    }

    #[test]
    fn test_refresh_at_home_has_no_parent() {
        let source = FixedSource(vec![file("sd0"), file("home")]);
        let mut list = EntryList::new(SortPolicy::Append);
        list.refresh(&source).unwrap();

        assert_eq!(names(&list), vec!["sd0", "home"]);
        assert_eq!(list.selectable_len(), 2);
    }

    #[test]
    fn test_refresh_failure_keeps_location() {
        let mut list = EntryList::new(SortPolicy::Alphabetical);
        let location = Location::Dir(PathBuf::from("/gone"));
        list.set_location(location.clone());

        assert!(list.refresh(&BrokenSource).is_err());
        assert_eq!(list.location(), &location);
        assert!(list.is_empty());
    }

    #[test]
    fn test_insert_keeps_parent_first() {
        let mut list = EntryList::new(SortPolicy::Alphabetical);
        list.insert(Entry::parent_marker(), SortPolicy::Append);
        list.insert(file("#hash"), SortPolicy::Alphabetical);
        list.insert(file("-dash"), SortPolicy::Alphabetical);

        assert_eq!(names(&list), vec!["..", "#hash", "-dash"]);
    }

    #[test]
    fn test_remove_and_find() {
        let mut list = EntryList::new(SortPolicy::Append);
        list.insert(file("a"), SortPolicy::Append);
        list.insert(file("b"), SortPolicy::Append);

        assert!(list.find_by_name("b").is_some());
        assert!(list.remove_by_name("b").is_some());
        assert!(list.remove_by_name("b").is_none());
        assert!(list.find_by_name("b").is_none());
        assert_eq!(list.len(), 1);
    }
}
