//! Compiler host filesystem on top of [`AsyncCache`].

use std::future::Future;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;
use tracing::trace;

use crate::backend::{Backend, EntryKind};
use crate::cache::AsyncCache;
use crate::error::{HostError, HostResult};
use crate::hash::{ContentHasher, Sha256Hasher};
use crate::host::{CompilerHost, TimerCallback, TimerId};
use crate::key::{self, relative_to};
use crate::matcher::{GlobMatcher, PatternMatcher};
use crate::options::HostOptions;

/// Synchronous compiler host filesystem backed by asynchronous storage.
///
/// Reads and listings answer [`HostError::NotReady`] until the cache has the
/// data; writes are handed to storage and never wait.
pub struct SyncFs {
    cache: AsyncCache,
    options: HostOptions,
    project_root: String,
    pattern_root: String,
    matcher: Arc<dyn PatternMatcher>,
    hasher: Arc<dyn ContentHasher>,
}

struct FileFilter<'a> {
    extensions: &'a [String],
    excludes: &'a [String],
    includes: &'a [String],
}

impl SyncFs {
    pub fn new(backend: impl Backend, options: HostOptions) -> Self {
        let project_root = key::normalize(&key::uri_to_path(&options.project_root));
        let pattern_root = key::resolve(&project_root, options.pattern_root());
        Self {
            cache: AsyncCache::new(backend, options.case_sensitive),
            matcher: Arc::new(GlobMatcher::new(options.case_sensitive)),
            hasher: Arc::new(Sha256Hasher),
            options,
            project_root,
            pattern_root,
        }
    }

    pub fn with_matcher(mut self, matcher: impl PatternMatcher + 'static) -> Self {
        self.matcher = Arc::new(matcher);
        self
    }

    pub fn with_hasher(mut self, hasher: impl ContentHasher + 'static) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }

    pub fn cache(&self) -> &AsyncCache {
        &self.cache
    }

    pub fn options(&self) -> &HostOptions {
        &self.options
    }

    pub fn project_root(&self) -> &str {
        &self.project_root
    }

    /// Absolute, normalized form of `path`.
    pub fn resolve(&self, path: &str) -> String {
        key::resolve(&self.project_root, path)
    }

    /// See [`AsyncCache::drain_pending`].
    pub fn drain_pending(&self) -> impl Future<Output = bool> + Send + 'static {
        self.cache.drain_pending()
    }

    fn walk(
        &self,
        dir: &str,
        filter: &FileFilter<'_>,
        depth: Option<u32>,
        files: &mut Vec<String>,
    ) -> HostResult<()> {
        if depth == Some(0) {
            return Ok(());
        }

        let entries = self.cache.read_directory(dir)?;
        for entry in entries.iter() {
            let path = join(dir, &entry.name);
            match entry.kind {
                EntryKind::File => {
                    if self.accepts_file(&entry.name, &path, filter)? {
                        files.push(path);
                    }
                }
                EntryKind::Directory => {
                    if self.prunes_directory(&path, filter)? {
                        trace!(path = %path, "skipping excluded directory");
                        continue;
                    }
                    self.walk(&path, filter, depth.map(|d| d - 1), files)?;
                }
                EntryKind::Other => {}
            }
        }
        Ok(())
    }

    fn accepts_file(&self, name: &str, path: &str, filter: &FileFilter<'_>) -> HostResult<bool> {
        if !filter.extensions.is_empty()
            && !filter.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
        {
            return Ok(false);
        }
        for pattern in filter.excludes {
            if self.matches(path, pattern)? {
                return Ok(false);
            }
        }
        // Every include pattern has to match, not just one.
        for pattern in filter.includes {
            if !self.matches(path, pattern)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether an exclude pattern covers everything below `dir`.
    fn prunes_directory(&self, dir: &str, filter: &FileFilter<'_>) -> HostResult<bool> {
        let dir_marker = format!("{dir}/");
        for pattern in filter.excludes {
            let recursive_tail = pattern == "**" || pattern.ends_with("/**");
            if recursive_tail && self.matches(&dir_marker, pattern)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Match `path` against `pattern`, relative to the pattern root unless
    /// the pattern itself is absolute.
    fn matches(&self, path: &str, pattern: &str) -> HostResult<bool> {
        let candidate = if key::is_absolute(pattern) {
            path
        } else {
            relative_to(&self.pattern_root, path)
        };
        self.matcher.matches(candidate, pattern)
    }
}

fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

fn millis(time: SystemTime) -> u128 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

impl CompilerHost for SyncFs {
    fn args(&self) -> &[String] {
        &self.options.args
    }

    fn new_line(&self) -> &str {
        &self.options.new_line
    }

    fn use_case_sensitive_file_names(&self) -> bool {
        self.options.case_sensitive
    }

    fn write(&self, text: &str) -> HostResult<()> {
        Err(HostError::unsupported("write", json!([text])))
    }

    fn write_output_is_tty(&self) -> HostResult<bool> {
        Err(HostError::unsupported("writeOutputIsTTY", json!([])))
    }

    fn get_width_of_terminal(&self) -> HostResult<usize> {
        Err(HostError::unsupported("getWidthOfTerminal", json!([])))
    }

    fn read_file(&self, path: &str, _encoding: Option<&str>) -> HostResult<Option<Arc<str>>> {
        Ok(self.cache.read_file(&self.resolve(path))?.into_content())
    }

    fn get_file_size(&self, path: &str) -> HostResult<u64> {
        Err(HostError::unsupported("getFileSize", json!([path])))
    }

    fn write_file(&self, path: &str, data: &str, write_byte_order_mark: bool) -> HostResult<()> {
        self.cache
            .write_file(&self.resolve(path), data, write_byte_order_mark);
        Ok(())
    }

    fn resolve_path(&self, path: &str) -> HostResult<String> {
        Err(HostError::unsupported("resolvePath", json!([path])))
    }

    fn file_exists(&self, path: &str) -> HostResult<bool> {
        Ok(self.cache.file_exists(&self.resolve(path))?)
    }

    fn directory_exists(&self, path: &str) -> HostResult<bool> {
        Ok(self.cache.directory_exists(&self.resolve(path))?)
    }

    fn create_directory(&self, path: &str) -> HostResult<()> {
        Err(HostError::unsupported("createDirectory", json!([path])))
    }

    fn get_executing_file_path(&self) -> String {
        self.project_root.clone()
    }

    fn get_current_directory(&self) -> String {
        self.project_root.clone()
    }

    fn get_directories(&self, path: &str) -> HostResult<Vec<String>> {
        let root = self.resolve(path);
        let entries = self.cache.read_directory(&root)?;
        Ok(entries
            .iter()
            .filter(|entry| entry.kind == EntryKind::Directory)
            .map(|entry| join(&root, &entry.name))
            .collect())
    }

    fn read_directory(
        &self,
        path: &str,
        extensions: &[String],
        excludes: &[String],
        includes: &[String],
        depth: Option<u32>,
    ) -> HostResult<Vec<String>> {
        let filter = FileFilter {
            extensions,
            excludes,
            includes,
        };
        let mut files = Vec::new();
        self.walk(&self.resolve(path), &filter, depth, &mut files)?;
        Ok(files)
    }

    fn get_modified_time(&self, path: &str) -> HostResult<Option<SystemTime>> {
        Err(HostError::unsupported("getModifiedTime", json!([path])))
    }

    fn set_modified_time(&self, path: &str, time: SystemTime) -> HostResult<()> {
        Err(HostError::unsupported(
            "setModifiedTime",
            json!([path, millis(time)]),
        ))
    }

    fn delete_file(&self, path: &str) -> HostResult<()> {
        Err(HostError::unsupported("deleteFile", json!([path])))
    }

    fn create_hash(&self, data: &str) -> HostResult<String> {
        Ok(self.hasher.hex(data))
    }

    fn create_sha256_hash(&self, data: &str) -> HostResult<String> {
        Ok(self.hasher.hex(data))
    }

    fn exit(&self, exit_code: Option<i32>) -> HostResult<()> {
        Err(HostError::unsupported("exit", json!([exit_code])))
    }

    fn realpath(&self, path: &str) -> HostResult<String> {
        Err(HostError::unsupported("realpath", json!([path])))
    }

    fn set_timeout(&self, _callback: TimerCallback, ms: u64) -> HostResult<TimerId> {
        Err(HostError::unsupported("setTimeout", json!([null, ms])))
    }

    fn clear_timeout(&self, timer: TimerId) -> HostResult<()> {
        Err(HostError::unsupported("clearTimeout", json!([timer.0])))
    }

    fn clear_screen(&self) -> HostResult<()> {
        Err(HostError::unsupported("clearScreen", json!([])))
    }

    fn base64_decode(&self, input: &str) -> HostResult<String> {
        Err(HostError::unsupported("base64decode", json!([input])))
    }

    fn base64_encode(&self, input: &str) -> HostResult<String> {
        Err(HostError::unsupported("base64encode", json!([input])))
    }
}
