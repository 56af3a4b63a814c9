use crate::models::entry::Entry;
use crate::utils::error::{Result, ShellError};
use flate2::read::GzDecoder;
use sevenz_rust2::Password as SevenZPassword;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tar::Archive as TarArchive;
use zip::ZipArchive;
use zstd::stream::read::Decoder as ZstdDecoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    TarZst,
    SevenZ,
    Jar,
    War,
}

impl ArchiveFormat {
    pub fn display_name(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::TarZst => "tar.zst",
            ArchiveFormat::SevenZ => "7z",
            ArchiveFormat::Jar => "jar",
            ArchiveFormat::War => "war",
        }
    }
}

/// 아카이브 안의 항목 ("a/b/c.txt" 형태의 정규화된 경로)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub size: u64,
    pub is_dir: bool,
}

/// 열린 아카이브
///
/// 복제할 수 없으며 `ArchiveService::close`에 넘겨야 닫힌다.
#[derive(Debug)]
pub struct ArchiveHandle {
    container: PathBuf,
    format: ArchiveFormat,
    modified: SystemTime,
    entries: Vec<ArchiveEntry>,
}

impl ArchiveHandle {
    pub fn new(container: PathBuf, format: ArchiveFormat, entries: Vec<ArchiveEntry>) -> Self {
        let modified = fs::metadata(&container)
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        Self {
            container,
            format,
            modified,
            entries,
        }
    }

    pub fn container(&self) -> &Path {
        &self.container
    }

    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    #[cfg(test)]
    pub(crate) fn for_tests(container: impl Into<PathBuf>) -> Self {
        Self {
            container: container.into(),
            format: ArchiveFormat::Zip,
            modified: SystemTime::UNIX_EPOCH,
            entries: Vec::new(),
        }
    }

    /// `inner` 디렉토리의 직속 자식 목록 (명시되지 않은 중간 디렉토리도 포함)
    pub fn children(&self, inner: &str) -> Option<Vec<Entry>> {
        let inner = normalize_entry_name(inner);
        let prefix = if inner.is_empty() {
            String::new()
        } else {
            format!("{}/", inner)
        };

        let mut found_dir = inner.is_empty();
        let mut children: BTreeMap<String, Entry> = BTreeMap::new();
        for entry in &self.entries {
            if entry.path == inner && entry.is_dir {
                found_dir = true;
                continue;
            }
            let Some(rest) = entry.path.strip_prefix(&prefix) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            found_dir = true;

            let mut parts = rest.splitn(2, '/');
            let name = parts.next().unwrap_or_default().to_string();
            let nested = parts.next().is_some();
            let item = if nested || entry.is_dir {
                Entry::folder(name.clone(), self.modified)
            } else {
                Entry::file(name.clone(), entry.size, self.modified)
            };
            // 폴더 판정이 파일보다 우선 (중간 디렉토리가 먼저 나올 수 있음)
            match children.get(&name) {
                Some(existing) if existing.is_folder => {}
                _ => {
                    children.insert(name, item);
                }
            }
        }

        found_dir.then(|| children.into_values().collect())
    }

    pub fn contains(&self, inner: &str) -> bool {
        let inner = normalize_entry_name(inner);
        if inner.is_empty() {
            return true;
        }
        let prefix = format!("{}/", inner);
        self.entries
            .iter()
            .any(|e| e.path == inner || e.path.starts_with(&prefix))
    }
}

/// 아카이브를 가상 디렉토리로 다루는 쪽
pub trait ArchiveService: Send + Sync {
    fn open(&self, container: &Path) -> Result<ArchiveHandle>;

    /// `inner` 디렉토리의 직속 자식 목록
    fn list(&self, handle: &ArchiveHandle, inner: &str) -> Result<Vec<Entry>>;

    /// `inner` 항목(파일 또는 폴더 하위 전체)을 `dest_dir` 아래에 풀어낸다.
    ///
    /// 작업 스레드에서 호출되므로 핸들 대신 컨테이너 경로를 받는다.
    fn extract(&self, container: &Path, inner: &str, dest_dir: &Path) -> Result<u64>;

    fn close(&self, handle: ArchiveHandle);
}

/// zip/jar/war, tar, tar.gz, tar.zst, 7z 지원
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveFs;

impl ArchiveFs {
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveService for ArchiveFs {
    fn open(&self, container: &Path) -> Result<ArchiveHandle> {
        let format =
            detect_archive_format(container).ok_or_else(|| ShellError::ArchiveUnsupportedFormat {
                path: container.to_path_buf(),
            })?;
        let entries = list_entries(container, format)?;
        tracing::debug!(
            container = %container.display(),
            format = format.display_name(),
            entries = entries.len(),
            "opened archive"
        );
        Ok(ArchiveHandle::new(container.to_path_buf(), format, entries))
    }

    fn list(&self, handle: &ArchiveHandle, inner: &str) -> Result<Vec<Entry>> {
        handle
            .children(inner)
            .ok_or_else(|| ShellError::ArchiveEntryNotFound {
                entry: inner.to_string(),
            })
    }

    fn extract(&self, container: &Path, inner: &str, dest_dir: &Path) -> Result<u64> {
        let inner = normalize_entry_name(inner);
        let name = inner.rsplit('/').next().unwrap_or_default();
        if name.is_empty() {
            return Err(ShellError::ArchiveEntryNotFound { entry: inner });
        }
        let target = dest_dir.join(name);
        if fs::symlink_metadata(&target).is_ok() {
            return Err(ShellError::AlreadyExists { path: target });
        }

        let format =
            detect_archive_format(container).ok_or_else(|| ShellError::ArchiveUnsupportedFormat {
                path: container.to_path_buf(),
            })?;
        let selector = EntrySelector::new(&inner);
        let result = match format {
            ArchiveFormat::Zip | ArchiveFormat::Jar | ArchiveFormat::War => {
                extract_zip(container, dest_dir, &selector)
            }
            ArchiveFormat::Tar => {
                let file = File::open(container).map_err(|e| ShellError::from_io(e, container))?;
                extract_tar_like(TarArchive::new(file), container, dest_dir, &selector)
            }
            ArchiveFormat::TarGz => {
                let file = File::open(container).map_err(|e| ShellError::from_io(e, container))?;
                extract_tar_like(TarArchive::new(GzDecoder::new(file)), container, dest_dir, &selector)
            }
            ArchiveFormat::TarZst => {
                let file = File::open(container).map_err(|e| ShellError::from_io(e, container))?;
                let decoder = ZstdDecoder::new(file).map_err(ShellError::Io)?;
                extract_tar_like(TarArchive::new(decoder), container, dest_dir, &selector)
            }
            ArchiveFormat::SevenZ => extract_7z(container, dest_dir, &selector),
        };

        match result {
            Ok(Some(bytes)) => Ok(bytes),
            Ok(None) => Err(ShellError::ArchiveEntryNotFound { entry: inner }),
            Err(e) => {
                if target.exists() {
                    let _ = fs::remove_dir_all(&target).or_else(|_| fs::remove_file(&target));
                }
                Err(e)
            }
        }
    }

    fn close(&self, handle: ArchiveHandle) {
        tracing::debug!(container = %handle.container.display(), "archive closed");
        drop(handle);
    }
}

pub fn detect_archive_format(path: &Path) -> Option<ArchiveFormat> {
    let name = path.file_name()?.to_string_lossy().to_lowercase();
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        return Some(ArchiveFormat::TarGz);
    }
    if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
        return Some(ArchiveFormat::TarZst);
    }
    match path
        .extension()
        .and_then(OsStr::to_str)?
        .to_lowercase()
        .as_str()
    {
        "zip" => Some(ArchiveFormat::Zip),
        "tar" => Some(ArchiveFormat::Tar),
        "7z" => Some(ArchiveFormat::SevenZ),
        "jar" => Some(ArchiveFormat::Jar),
        "war" => Some(ArchiveFormat::War),
        _ => None,
    }
}

/// zip 기반 파일 전체를 `dest_dir` 아래에 푼다. (패키지 설치용)
pub fn unpack_zip(path: &Path, dest_dir: &Path) -> Result<u64> {
    let selector = EntrySelector::everything();
    extract_zip(path, dest_dir, &selector).map(|bytes| bytes.unwrap_or(0))
}

fn list_entries(path: &Path, format: ArchiveFormat) -> Result<Vec<ArchiveEntry>> {
    match format {
        ArchiveFormat::Zip | ArchiveFormat::Jar | ArchiveFormat::War => list_zip_entries(path),
        ArchiveFormat::Tar => {
            let file = File::open(path).map_err(|e| ShellError::from_io(e, path))?;
            list_tar_like_entries(TarArchive::new(file), path)
        }
        ArchiveFormat::TarGz => {
            let file = File::open(path).map_err(|e| ShellError::from_io(e, path))?;
            list_tar_like_entries(TarArchive::new(GzDecoder::new(file)), path)
        }
        ArchiveFormat::TarZst => {
            let file = File::open(path).map_err(|e| ShellError::from_io(e, path))?;
            let decoder = ZstdDecoder::new(file).map_err(ShellError::Io)?;
            list_tar_like_entries(TarArchive::new(decoder), path)
        }
        ArchiveFormat::SevenZ => list_7z_entries(path),
    }
}

fn list_zip_entries(path: &Path) -> Result<Vec<ArchiveEntry>> {
    let file = File::open(path).map_err(|e| ShellError::from_io(e, path))?;
    let mut archive = ZipArchive::new(file).map_err(|e| list_failed(path, e))?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        // 암호화된 항목도 목록에는 보이도록 압축을 풀지 않고 읽는다
        let entry = archive.by_index_raw(i).map_err(|e| list_failed(path, e))?;
        push_entry(&mut entries, entry.name(), entry.size(), entry.is_dir());
    }
    Ok(entries)
}

fn list_tar_like_entries<R: Read>(mut archive: TarArchive<R>, src: &Path) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    for entry_result in archive.entries().map_err(|e| list_failed(src, e))? {
        let entry = entry_result.map_err(|e| list_failed(src, e))?;
        let path = entry.path().map_err(|e| list_failed(src, e))?;
        let name = archive_display_path(&path);
        push_entry(
            &mut entries,
            &name,
            entry.size(),
            entry.header().entry_type().is_dir(),
        );
    }
    Ok(entries)
}

fn list_7z_entries(path: &Path) -> Result<Vec<ArchiveEntry>> {
    let file = File::open(path).map_err(|e| ShellError::from_io(e, path))?;
    let reader = sevenz_rust2::SevenZReader::new(file, SevenZPassword::empty())
        .map_err(|e| list_failed(path, e))?;

    let mut entries = Vec::new();
    for e in &reader.archive().files {
        push_entry(&mut entries, &e.name, e.size, e.is_directory);
    }
    Ok(entries)
}

fn push_entry(entries: &mut Vec<ArchiveEntry>, raw_name: &str, size: u64, is_dir: bool) {
    let path = normalize_entry_name(raw_name);
    if path.is_empty() {
        return;
    }
    entries.push(ArchiveEntry { path, size, is_dir });
}

fn list_failed(path: &Path, e: impl ToString) -> ShellError {
    ShellError::ArchiveListFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// 풀어낼 항목 선택 규칙
///
/// `inner`와 같거나 그 하위인 항목만 고르고, `inner`의 부모 경로를 떼어
/// 대상 디렉토리 기준 상대 경로를 만든다.
struct EntrySelector {
    inner: String,
    strip: String,
}

impl EntrySelector {
    fn new(inner: &str) -> Self {
        let inner = normalize_entry_name(inner);
        let strip = match inner.rfind('/') {
            Some(idx) => inner[..=idx].to_string(),
            None => String::new(),
        };
        Self { inner, strip }
    }

    fn everything() -> Self {
        Self {
            inner: String::new(),
            strip: String::new(),
        }
    }

    fn relative(&self, raw_name: &str) -> Option<String> {
        let name = normalize_entry_name(raw_name);
        let selected = self.inner.is_empty()
            || name == self.inner
            || name
                .strip_prefix(&self.inner)
                .is_some_and(|rest| rest.starts_with('/'));
        if !selected || name.is_empty() {
            return None;
        }
        name.strip_prefix(&self.strip).map(str::to_string)
    }
}

fn extract_zip(path: &Path, dest_dir: &Path, selector: &EntrySelector) -> Result<Option<u64>> {
    let file = File::open(path).map_err(|e| ShellError::from_io(e, path))?;
    let mut archive = ZipArchive::new(file).map_err(|e| extract_failed(path, &selector.inner, e))?;

    let mut matched = false;
    let mut bytes = 0u64;
    for idx in 0..archive.len() {
        let mut entry = archive
            .by_index(idx)
            .map_err(|e| extract_failed(path, &selector.inner, e))?;
        let Some(relative) = selector.relative(entry.name()) else {
            continue;
        };
        matched = true;
        let is_dir = entry.is_dir();
        bytes += write_entry(path, dest_dir, &relative, is_dir, &mut entry)?;
    }
    Ok(matched.then_some(bytes))
}

fn extract_tar_like<R: Read>(
    mut archive: TarArchive<R>,
    src: &Path,
    dest_dir: &Path,
    selector: &EntrySelector,
) -> Result<Option<u64>> {
    let mut matched = false;
    let mut bytes = 0u64;
    for entry_result in archive
        .entries()
        .map_err(|e| extract_failed(src, &selector.inner, e))?
    {
        let mut entry = entry_result.map_err(|e| extract_failed(src, &selector.inner, e))?;
        let path_buf = entry
            .path()
            .map_err(|e| extract_failed(src, &selector.inner, e))?
            .into_owned();
        let Some(relative) = selector.relative(&archive_display_path(&path_buf)) else {
            continue;
        };
        matched = true;
        let is_dir = entry.header().entry_type().is_dir();
        bytes += write_entry(src, dest_dir, &relative, is_dir, &mut entry)?;
    }
    Ok(matched.then_some(bytes))
}

fn extract_7z(path: &Path, dest_dir: &Path, selector: &EntrySelector) -> Result<Option<u64>> {
    let file = File::open(path).map_err(|e| ShellError::from_io(e, path))?;
    let mut matched = false;
    let mut bytes = 0u64;
    let mut failure: Option<ShellError> = None;

    let mut extract_fn = |entry: &sevenz_rust2::SevenZArchiveEntry,
                          reader: &mut dyn Read,
                          _output_path: &PathBuf|
     -> std::result::Result<bool, sevenz_rust2::Error> {
        let Some(relative) = selector.relative(&entry.name) else {
            return Ok(true);
        };
        matched = true;
        match write_entry(path, dest_dir, &relative, entry.is_directory, reader) {
            Ok(written) => {
                bytes += written;
                Ok(true)
            }
            Err(e) => {
                failure = Some(e);
                Ok(false)
            }
        }
    };

    let result = sevenz_rust2::decompress_with_extract_fn(file, dest_dir, &mut extract_fn);
    if let Some(e) = failure {
        return Err(e);
    }
    result.map_err(|e| extract_failed(path, &selector.inner, e))?;
    Ok(matched.then_some(bytes))
}

fn write_entry(
    archive: &Path,
    dest_dir: &Path,
    relative: &str,
    is_dir: bool,
    reader: &mut dyn Read,
) -> Result<u64> {
    let dest = sanitize_extract_path(dest_dir, Path::new(relative))
        .ok_or_else(|| extract_failed(archive, relative, "blocked unsafe path"))?;

    if is_dir {
        fs::create_dir_all(&dest).map_err(|e| ShellError::from_io(e, &dest))?;
        return Ok(0);
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| ShellError::from_io(e, parent))?;
    }
    let mut out = File::create(&dest).map_err(|e| ShellError::from_io(e, &dest))?;
    io::copy(reader, &mut out).map_err(|e| extract_failed(archive, relative, e))
}

fn extract_failed(path: &Path, entry: &str, e: impl ToString) -> ShellError {
    ShellError::ArchiveExtractFailed {
        path: path.to_path_buf(),
        entry: entry.to_string(),
        reason: e.to_string(),
    }
}

fn archive_display_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(v) => Some(v.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn normalize_entry_name(name: &str) -> String {
    name.replace('\\', "/").trim_matches('/').to_string()
}

fn sanitize_extract_path(dest_root: &Path, raw_path: &Path) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for comp in raw_path.components() {
        match comp {
            Component::Normal(v) => clean.push(v),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        return None;
    }
    let out = dest_root.join(clean);
    out.starts_with(dest_root).then_some(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// 테스트용 zip 생성: 이름이 '/'로 끝나면 디렉토리
    pub(crate) fn write_zip(path: &Path, items: &[(&str, &str)]) {
        let file = File::create(path).expect("create zip");
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        for (name, data) in items {
            if name.ends_with('/') {
                writer.add_directory(*name, options).expect("add dir");
            } else {
                writer.start_file(*name, options).expect("start file");
                writer.write_all(data.as_bytes()).expect("write data");
            }
        }
        writer.finish().expect("finish zip");
    }

    fn sample_zip(temp: &TempDir) -> PathBuf {
        let path = temp.path().join("pack.zip");
        write_zip(
            &path,
            &[
                ("readme.txt", "hi"),
                ("docs/", ""),
                ("docs/guide.md", "guide"),
                ("src/lib/mod.rs", "mod"),
            ],
        );
        path
    }

    fn names(entries: &[Entry]) -> Vec<(&str, bool)> {
        entries.iter().map(|e| (e.name.as_str(), e.is_folder)).collect()
    }

    #[test]
    fn test_detect_archive_format() {
        assert_eq!(detect_archive_format(Path::new("a.zip")), Some(ArchiveFormat::Zip));
        assert_eq!(detect_archive_format(Path::new("a.TGZ")), Some(ArchiveFormat::TarGz));
        assert_eq!(
            detect_archive_format(Path::new("a.tar.zst")),
            Some(ArchiveFormat::TarZst)
        );
        assert_eq!(detect_archive_format(Path::new("a.7z")), Some(ArchiveFormat::SevenZ));
        assert_eq!(detect_archive_format(Path::new("a.txt")), None);
    }

    #[test]
    fn test_list_root_and_implicit_directories() {
        let temp = TempDir::new().unwrap();
        let service = ArchiveFs::new();
        let handle = service.open(&sample_zip(&temp)).unwrap();

        let root = service.list(&handle, "").unwrap();
        assert_eq!(
            names(&root),
            vec![("docs", true), ("readme.txt", false), ("src", true)]
        );

        let lib = service.list(&handle, "src/lib").unwrap();
        assert_eq!(names(&lib), vec![("mod.rs", false)]);

        assert!(matches!(
            service.list(&handle, "missing"),
            Err(ShellError::ArchiveEntryNotFound { .. })
        ));
        service.close(handle);
    }

    #[test]
    fn test_extract_single_file_and_folder() {
        let temp = TempDir::new().unwrap();
        let zip = sample_zip(&temp);
        let out = temp.path().join("out");
        fs::create_dir(&out).unwrap();
        let service = ArchiveFs::new();

        assert_eq!(service.extract(&zip, "readme.txt", &out).unwrap(), 2);
        assert_eq!(fs::read(out.join("readme.txt")).unwrap(), b"hi");

        service.extract(&zip, "src/lib", &out).unwrap();
        assert_eq!(fs::read(out.join("lib/mod.rs")).unwrap(), b"mod");
        assert!(!out.join("src").exists());
    }

    #[test]
    fn test_extract_refuses_existing_target() {
        let temp = TempDir::new().unwrap();
        let zip = sample_zip(&temp);
        let out = temp.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("readme.txt"), b"keep").unwrap();

        let result = ArchiveFs::new().extract(&zip, "readme.txt", &out);
        assert!(matches!(result, Err(ShellError::AlreadyExists { .. })));
        assert_eq!(fs::read(out.join("readme.txt")).unwrap(), b"keep");
    }

    #[test]
    fn test_tar_gz_listing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bundle.tar.gz");
        let file = File::create(&path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_size(3);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "pkg/a.txt", &b"abc"[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let service = ArchiveFs::new();
        let handle = service.open(&path).unwrap();
        assert_eq!(names(&service.list(&handle, "").unwrap()), vec![("pkg", true)]);
        assert!(handle.contains("pkg/a.txt"));
        assert!(!handle.contains("pkg/b.txt"));
    }

    #[test]
    fn test_sanitize_extract_path_blocks_escape() {
        let root = Path::new("/tmp/out");
        assert!(sanitize_extract_path(root, Path::new("../etc/passwd")).is_none());
        assert!(sanitize_extract_path(root, Path::new("/abs")).is_none());
        assert_eq!(
            sanitize_extract_path(root, Path::new("./a/b")),
            Some(PathBuf::from("/tmp/out/a/b"))
        );
    }
}
