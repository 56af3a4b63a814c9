use crate::system::archive::{ArchiveHandle, ArchiveService};
use std::path::{Component, Path, PathBuf};

/// 아카이브 내부 탐색 상태
///
/// 열린 아카이브는 최대 하나. 핸들을 소유하므로 닫기는 정확히 한 번만 일어난다.
#[derive(Debug, Default)]
pub struct ArchiveContext {
    handle: Option<ArchiveHandle>,
    /// 아카이브에 들어가기 직전의 깊이
    open_depth: usize,
}

impl ArchiveContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn open_depth(&self) -> usize {
        self.open_depth
    }

    pub fn handle(&self) -> Option<&ArchiveHandle> {
        self.handle.as_ref()
    }

    pub fn container_path(&self) -> Option<&Path> {
        self.handle.as_ref().map(ArchiveHandle::container)
    }

    pub fn enter(&mut self, handle: ArchiveHandle, depth: usize) {
        self.handle = Some(handle);
        self.open_depth = depth;
    }

    /// 상위 이동 후 깊이가 진입 깊이 이하가 되면 닫아야 한다.
    pub fn should_close(&self, depth: usize) -> bool {
        self.is_active() && depth <= self.open_depth
    }

    /// 열려 있으면 닫는다. 이미 닫혀 있으면 아무것도 하지 않는다.
    pub fn close(&mut self, service: &dyn ArchiveService) {
        if let Some(handle) = self.handle.take() {
            tracing::debug!(container = %handle.container().display(), "closing archive");
            service.close(handle);
        }
        self.open_depth = 0;
    }

    /// 가상 경로를 아카이브 내부 경로("a/b")로 변환. 아카이브 밖이면 None.
    pub fn inner_path(&self, path: &Path) -> Option<String> {
        let container = self.container_path()?;
        let rest = path.strip_prefix(container).ok()?;
        Some(
            rest.components()
                .filter_map(|c| match c {
                    Component::Normal(v) => Some(v.to_string_lossy().to_string()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/"),
        )
    }

    pub fn virtual_path(&self, inner: &str) -> Option<PathBuf> {
        let container = self.container_path()?;
        Some(inner.split('/').filter(|s| !s.is_empty()).fold(
            container.to_path_buf(),
            |acc, part| acc.join(part),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_context_maps_nothing() {
        let ctx = ArchiveContext::new();
        assert!(!ctx.is_active());
        assert!(!ctx.should_close(0));
        assert_eq!(ctx.inner_path(Path::new("/a/b.zip/c")), None);
    }

    #[test]
    fn test_inner_and_virtual_paths() {
        let mut ctx = ArchiveContext::new();
        ctx.enter(ArchiveHandle::for_tests("/data/pack.zip"), 2);

        assert!(ctx.is_active());
        assert_eq!(ctx.open_depth(), 2);
        assert_eq!(
            ctx.inner_path(Path::new("/data/pack.zip")).as_deref(),
            Some("")
        );
        assert_eq!(
            ctx.inner_path(Path::new("/data/pack.zip/docs/img")).as_deref(),
            Some("docs/img")
        );
        assert_eq!(ctx.inner_path(Path::new("/data/other")), None);
        assert_eq!(
            ctx.virtual_path("docs/img"),
            Some(PathBuf::from("/data/pack.zip/docs/img"))
        );
        assert!(ctx.should_close(2));
        assert!(!ctx.should_close(3));
    }
}
