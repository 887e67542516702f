//! Asynchronous storage capability behind the cache.
//!
//! Calling a method issues the operation; the returned future is the
//! operation in flight. Futures are `'static` so the cache can park them in
//! its pending set, which means implementations clone whatever state they
//! need into the future instead of borrowing `self`.

mod memory;
#[cfg(feature = "native")]
mod native;

pub use memory::{MemoryBackend, Operation};
#[cfg(feature = "native")]
pub use native::TokioBackend;

use futures::future::BoxFuture;

use crate::error::BackendError;

/// Kind of a directory child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
    /// Symlinks, devices and anything else storage reports.
    Other,
}

/// One child of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, EntryKind::File)
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, EntryKind::Directory)
    }
}

pub trait Backend: Send + Sync + 'static {
    /// Read the whole file at `path`.
    fn read_file(&self, path: &str) -> BoxFuture<'static, Result<Vec<u8>, BackendError>>;

    /// Replace the file at `path` with `data`.
    fn write_file(&self, path: &str, data: Vec<u8>) -> BoxFuture<'static, Result<(), BackendError>>;

    /// List the children of the directory at `path`, in storage order.
    fn read_directory(
        &self,
        path: &str,
    ) -> BoxFuture<'static, Result<Vec<DirEntry>, BackendError>>;
}

impl<B: Backend + ?Sized> Backend for std::sync::Arc<B> {
    fn read_file(&self, path: &str) -> BoxFuture<'static, Result<Vec<u8>, BackendError>> {
        (**self).read_file(path)
    }

    fn write_file(&self, path: &str, data: Vec<u8>) -> BoxFuture<'static, Result<(), BackendError>> {
        (**self).write_file(path, data)
    }

    fn read_directory(
        &self,
        path: &str,
    ) -> BoxFuture<'static, Result<Vec<DirEntry>, BackendError>> {
        (**self).read_directory(path)
    }
}
