//! Synchronous cache over asynchronous storage.
//!
//! Lookups never wait. A miss issues the storage operation, parks it in the
//! pending set and answers [`NotReady`] carrying that operation; the caller
//! waits on it (see [`run_until_ready`](crate::run_until_ready)) and asks
//! again. Once an operation settles its result stays cached for the life of
//! the cache, absent results included.
//!
//! Inside a tokio runtime every operation is spawned as soon as it is
//! issued, so it runs to completion even if nobody waits on it. Without a
//! runtime an operation only makes progress while it is awaited.

use std::collections::HashMap;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared, join_all};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

use crate::backend::{Backend, DirEntry};
use crate::error::NotReady;
use crate::key::CacheKey;

const BOM: &str = "\u{feff}";

type Settled = Shared<BoxFuture<'static, ()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingKind {
    ReadFile,
    ReadDirectory,
    WriteFile,
}

/// Handle to one in-flight storage operation.
///
/// Cloning shares the operation. Awaiting it resolves once the result is
/// cached; any number of clones can be awaited.
#[derive(Clone)]
pub struct Pending {
    kind: PendingKind,
    path: Arc<str>,
    done: Arc<AtomicBool>,
    settled: Settled,
}

impl Pending {
    pub fn kind(&self) -> PendingKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the operation has settled and its result is cached.
    pub fn is_settled(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

impl IntoFuture for Pending {
    type Output = ();
    type IntoFuture = Shared<BoxFuture<'static, ()>>;

    fn into_future(self) -> Self::IntoFuture {
        self.settled
    }
}

impl fmt::Debug for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl fmt::Display for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            PendingKind::ReadFile => "read",
            PendingKind::ReadDirectory => "listing",
            PendingKind::WriteFile => "write",
        };
        write!(f, "{} of {}", what, self.path)
    }
}

/// Cached outcome of a file fetch or write.
///
/// `Absent` covers both a missing file and a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEntry {
    Content(Arc<str>),
    Absent,
}

impl FileEntry {
    pub fn content(&self) -> Option<&Arc<str>> {
        match self {
            FileEntry::Content(content) => Some(content),
            FileEntry::Absent => None,
        }
    }

    pub fn into_content(self) -> Option<Arc<str>> {
        match self {
            FileEntry::Content(content) => Some(content),
            FileEntry::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FileEntry::Absent)
    }
}

#[derive(Default)]
struct CacheState {
    files: HashMap<CacheKey, FileEntry>,
    directories: HashMap<CacheKey, Arc<[DirEntry]>>,
    pending: Vec<Pending>,
}

/// Per-path results of file reads, writes and directory listings.
///
/// Cheap to clone; clones share the same maps and pending set. Build a fresh
/// one per compile run.
///
/// Concurrent misses on the same path are not coalesced: each miss issues
/// its own storage operation.
#[derive(Clone)]
pub struct AsyncCache {
    backend: Arc<dyn Backend>,
    case_sensitive: bool,
    state: Arc<Mutex<CacheState>>,
}

impl AsyncCache {
    pub fn new(backend: impl Backend, case_sensitive: bool) -> Self {
        Self {
            backend: Arc::new(backend),
            case_sensitive,
            state: Arc::default(),
        }
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn key(&self, path: &str) -> CacheKey {
        CacheKey::new(path, self.case_sensitive)
    }

    /// Cached file content, or [`NotReady`] while it is being fetched.
    pub fn read_file(&self, path: &str) -> Result<FileEntry, NotReady> {
        let key = self.key(path);
        let cached = self.state.lock().files.get(&key).cloned();
        if let Some(entry) = cached {
            trace!(path = %key, "file cache hit");
            return Ok(entry);
        }

        debug!(path = %key, "file cache miss");
        let fetch = self.backend.read_file(key.path());
        let state = Arc::downgrade(&self.state);
        let path: Arc<str> = key.path().into();
        let settled = async move {
            let entry = match fetch.await {
                Ok(bytes) => FileEntry::Content(decode_text(bytes).into()),
                Err(error) => {
                    warn!(path = %key, %error, "failed to read file");
                    FileEntry::Absent
                }
            };
            if let Some(state) = state.upgrade() {
                state.lock().files.entry(key).or_insert(entry);
            }
        };
        Err(NotReady(self.track(PendingKind::ReadFile, path, settled)))
    }

    pub fn file_exists(&self, path: &str) -> Result<bool, NotReady> {
        Ok(!self.read_file(path)?.is_absent())
    }

    /// Write `content` to storage.
    ///
    /// Never answers [`NotReady`]. The cached entry becomes `content` once
    /// storage accepts the write, or `Absent` if it fails; until then reads
    /// see whatever was cached before.
    pub fn write_file(&self, path: &str, content: &str, write_byte_order_mark: bool) -> Pending {
        let key = self.key(path);
        debug!(path = %key, bytes = content.len(), "writing file");

        let mut bytes = Vec::with_capacity(content.len() + BOM.len());
        if write_byte_order_mark {
            bytes.extend_from_slice(BOM.as_bytes());
        }
        bytes.extend_from_slice(content.as_bytes());

        let write = self.backend.write_file(key.path(), bytes);
        let staged: Arc<str> = content.into();
        let state = Arc::downgrade(&self.state);
        let path: Arc<str> = key.path().into();
        let settled = async move {
            let entry = match write.await {
                Ok(()) => FileEntry::Content(staged),
                Err(error) => {
                    warn!(path = %key, %error, "failed to write file");
                    FileEntry::Absent
                }
            };
            if let Some(state) = state.upgrade() {
                state.lock().files.insert(key, entry);
            }
        };
        self.track(PendingKind::WriteFile, path, settled)
    }

    /// Cached directory listing, or [`NotReady`] while it is being fetched.
    ///
    /// A directory that is missing or cannot be listed reads as empty.
    pub fn read_directory(&self, path: &str) -> Result<Arc<[DirEntry]>, NotReady> {
        let key = self.key(path);
        let cached = self.state.lock().directories.get(&key).cloned();
        if let Some(entries) = cached {
            trace!(path = %key, "directory cache hit");
            return Ok(entries);
        }

        debug!(path = %key, "directory cache miss");
        let fetch = self.backend.read_directory(key.path());
        let state = Arc::downgrade(&self.state);
        let path: Arc<str> = key.path().into();
        let settled = async move {
            let entries: Arc<[DirEntry]> = match fetch.await {
                Ok(entries) => entries.into(),
                Err(error) => {
                    warn!(path = %key, %error, "failed to list directory");
                    Vec::new().into()
                }
            };
            if let Some(state) = state.upgrade() {
                state.lock().directories.entry(key).or_insert(entries);
            }
        };
        Err(NotReady(self.track(PendingKind::ReadDirectory, path, settled)))
    }

    pub fn directory_exists(&self, path: &str) -> Result<bool, NotReady> {
        Ok(!self.read_directory(path)?.is_empty())
    }

    /// Number of operations issued since the last drain.
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Wait for every operation issued so far, then forget them.
    ///
    /// The set is taken when this is called, not when the future is first
    /// polled; operations issued afterwards stay for the next drain. Resolves
    /// to whether anything was pending.
    pub fn drain_pending(&self) -> impl Future<Output = bool> + Send + 'static {
        let pending = std::mem::take(&mut self.state.lock().pending);
        async move {
            if pending.is_empty() {
                return false;
            }
            debug!(count = pending.len(), "draining pending operations");
            join_all(pending.into_iter().map(IntoFuture::into_future)).await;
            true
        }
    }

    fn track(
        &self,
        kind: PendingKind,
        path: Arc<str>,
        settle: impl Future<Output = ()> + Send + 'static,
    ) -> Pending {
        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();
        let settle = async move {
            settle.await;
            flag.store(true, Ordering::Release);
        };

        let settled = match Handle::try_current() {
            Ok(runtime) => {
                let task = runtime.spawn(settle);
                let path = path.clone();
                async move {
                    if let Err(error) = task.await {
                        warn!(%path, %error, "storage operation did not finish");
                    }
                }
                .boxed()
            }
            Err(_) => settle.boxed(),
        };

        let pending = Pending {
            kind,
            path,
            done,
            settled: settled.shared(),
        };
        self.state.lock().pending.push(pending.clone());
        pending
    }
}

/// Decode fetched bytes as UTF-8 text, replacing invalid sequences and
/// dropping a leading byte-order mark.
fn decode_text(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };
    match text.strip_prefix(BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    }
}
