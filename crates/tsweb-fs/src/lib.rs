//! Synchronous compiler-host filesystem over asynchronous storage.
//!
//! A compiler asks for files synchronously; the storage behind it only
//! answers asynchronously. [`AsyncCache`] bridges the two: a cache miss
//! issues the storage operation and answers [`NotReady`] carrying it, the
//! caller waits on it through [`run_until_ready`] and repeats the work, and
//! from then on the answer comes from the cache.
//!
//! [`SyncFs`] puts the [`CompilerHost`] contract on top of the cache, and
//! [`drive`] runs a compiler step until it completes or no outstanding
//! operation can change its answer.
//!
//! # Features
//!
//! - `native` - [`TokioBackend`] on the local filesystem via `tokio::fs`

mod backend;
mod cache;
mod drive;
mod error;
mod hash;
mod host;
mod key;
mod matcher;
mod options;
mod ready;
mod sync_fs;

#[cfg(feature = "native")]
pub use backend::TokioBackend;
pub use backend::{Backend, DirEntry, EntryKind, MemoryBackend, Operation};
pub use cache::{AsyncCache, FileEntry, Pending, PendingKind};
pub use drive::{StepOutcome, drive, find_project_configs, prefetch};
pub use error::{BackendError, HostError, HostResult, NotReady};
pub use hash::{ContentHasher, Sha256Hasher};
pub use host::{CompilerHost, TimerCallback, TimerId};
pub use key::{CacheKey, is_absolute, normalize, relative_to, resolve, uri_to_path};
pub use matcher::{GlobMatcher, PatternMatcher};
pub use options::HostOptions;
pub use ready::{Suspended, run_until_ready};
pub use sync_fs::SyncFs;
