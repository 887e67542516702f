//! In-memory storage, for tests and for hosts that preload a workspace.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;

use super::{Backend, DirEntry, EntryKind};
use crate::error::BackendError;
use crate::key::normalize;

/// Which backend method a call counter refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Write,
    List,
}

#[derive(Default)]
struct MemoryState {
    files: BTreeMap<String, Vec<u8>>,
    directories: BTreeSet<String>,
    specials: BTreeSet<String>,
    failing: HashSet<String>,
    calls: HashMap<(Operation, String), usize>,
}

/// A file tree held in memory.
///
/// Directories exist implicitly above every stored file and can be created
/// empty with [`MemoryBackend::create_dir`]. Listings come back sorted by
/// name. Every call is counted per path, and any path can be made to fail.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a backend from `(path, content)` pairs.
    pub fn with_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: AsRef<str>,
        C: AsRef<[u8]>,
    {
        let backend = Self::new();
        for (path, content) in files {
            backend.insert(path.as_ref(), content.as_ref());
        }
        backend
    }

    pub fn insert(&self, path: &str, content: impl AsRef<[u8]>) {
        self.state
            .lock()
            .files
            .insert(normalize(path), content.as_ref().to_vec());
    }

    pub fn create_dir(&self, path: &str) {
        self.state.lock().directories.insert(normalize(path));
    }

    /// Add an entry that is neither a file nor a directory, such as a socket.
    pub fn create_special(&self, path: &str) {
        self.state.lock().specials.insert(normalize(path));
    }

    /// Make every operation on `path` fail from now on.
    pub fn fail(&self, path: &str) {
        self.state.lock().failing.insert(normalize(path));
    }

    /// Let operations on `path` succeed again.
    pub fn heal(&self, path: &str) {
        self.state.lock().failing.remove(&normalize(path));
    }

    /// Current stored bytes for `path`.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().files.get(&normalize(path)).cloned()
    }

    /// How many times `operation` was issued for `path`.
    pub fn calls(&self, operation: Operation, path: &str) -> usize {
        self.state
            .lock()
            .calls
            .get(&(operation, normalize(path)))
            .copied()
            .unwrap_or(0)
    }

    fn record(&self, operation: Operation, path: &str) -> String {
        let path = normalize(path);
        *self
            .state
            .lock()
            .calls
            .entry((operation, path.clone()))
            .or_default() += 1;
        path
    }
}

impl MemoryState {
    fn check(&self, path: &str) -> Result<(), BackendError> {
        if self.failing.contains(path) {
            return Err(BackendError::Other(format!("injected failure for {path}")));
        }
        Ok(())
    }

    fn list(&self, path: &str) -> Result<Vec<DirEntry>, BackendError> {
        self.check(path)?;
        let prefix = if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{path}/")
        };

        let mut children: BTreeMap<&str, EntryKind> = BTreeMap::new();
        let mut found = self.directories.contains(path);

        let files = self.files.keys().map(|p| (p, EntryKind::File));
        let directories = self.directories.iter().map(|p| (p, EntryKind::Directory));
        let specials = self.specials.iter().map(|p| (p, EntryKind::Other));
        for (stored, kind) in files.chain(directories).chain(specials) {
            let Some(rest) = stored.strip_prefix(&prefix) else {
                continue;
            };
            found = true;
            match rest.split_once('/') {
                Some((dir, _)) => {
                    children.insert(dir, EntryKind::Directory);
                }
                None => {
                    children.entry(rest).or_insert(kind);
                }
            }
        }

        if !found {
            return Err(BackendError::NotFound(path.to_string()));
        }
        Ok(children
            .into_iter()
            .map(|(name, kind)| DirEntry::new(name, kind))
            .collect())
    }
}

impl Backend for MemoryBackend {
    fn read_file(&self, path: &str) -> BoxFuture<'static, Result<Vec<u8>, BackendError>> {
        let path = self.record(Operation::Read, path);
        let state = self.state.clone();
        async move {
            let state = state.lock();
            state.check(&path)?;
            state
                .files
                .get(&path)
                .cloned()
                .ok_or(BackendError::NotFound(path))
        }
        .boxed()
    }

    fn write_file(&self, path: &str, data: Vec<u8>) -> BoxFuture<'static, Result<(), BackendError>> {
        let path = self.record(Operation::Write, path);
        let state = self.state.clone();
        async move {
            let mut state = state.lock();
            state.check(&path)?;
            state.files.insert(path, data);
            Ok::<_, BackendError>(())
        }
        .boxed()
    }

    fn read_directory(
        &self,
        path: &str,
    ) -> BoxFuture<'static, Result<Vec<DirEntry>, BackendError>> {
        let path = self.record(Operation::List, path);
        let state = self.state.clone();
        async move { state.lock().list(&path) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MemoryBackend {
        MemoryBackend::with_files([
            ("/proj/a.ts", "a"),
            ("/proj/src/b.ts", "b"),
            ("/proj/src/deep/c.ts", "c"),
        ])
    }

    #[tokio::test]
    async fn lists_files_and_implicit_directories() {
        let listing = backend().read_directory("/proj").await.unwrap();
        assert_eq!(
            listing,
            vec![DirEntry::file("a.ts"), DirEntry::directory("src")]
        );
    }

    #[tokio::test]
    async fn lists_explicit_empty_directory() {
        let backend = backend();
        backend.create_dir("/proj/empty");
        assert!(backend.read_directory("/proj/empty").await.unwrap().is_empty());
        assert!(
            backend
                .read_directory("/proj")
                .await
                .unwrap()
                .contains(&DirEntry::directory("empty"))
        );
    }

    #[tokio::test]
    async fn lists_special_entries_as_other() {
        let backend = backend();
        backend.create_special("/proj/src/socket");
        let listing = backend.read_directory("/proj/src").await.unwrap();
        assert!(listing.contains(&DirEntry::new("socket", EntryKind::Other)));
    }

    #[tokio::test]
    async fn missing_directory_is_not_found() {
        let err = backend().read_directory("/nope").await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }

    #[tokio::test]
    async fn injected_failure_and_heal() {
        let backend = backend();
        backend.fail("/proj/a.ts");
        assert!(backend.read_file("/proj/a.ts").await.is_err());
        backend.heal("/proj/a.ts");
        assert_eq!(backend.read_file("/proj/a.ts").await.unwrap(), b"a");
    }

    #[tokio::test]
    async fn counts_calls_when_issued() {
        let backend = backend();
        let first = backend.read_file("/proj/a.ts");
        let _second = backend.read_file("/proj//a.ts");
        assert_eq!(backend.calls(Operation::Read, "/proj/a.ts"), 2);
        drop(first);
        assert_eq!(backend.calls(Operation::List, "/proj"), 0);
    }

    #[tokio::test]
    async fn write_applies_when_polled() {
        let backend = backend();
        let write = backend.write_file("/proj/new.ts", b"new".to_vec());
        assert_eq!(backend.contents("/proj/new.ts"), None);
        write.await.unwrap();
        assert_eq!(backend.contents("/proj/new.ts"), Some(b"new".to_vec()));
    }
}
