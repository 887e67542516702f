//! The synchronous environment contract a compiler expects from its host.

use std::sync::Arc;
use std::time::SystemTime;

use crate::error::HostResult;

/// Identifies a timer registered through [`CompilerHost::set_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Callback scheduled by [`CompilerHost::set_timeout`].
pub type TimerCallback = Box<dyn FnOnce() + Send>;

/// Synchronous filesystem and environment operations for a compiler.
///
/// Every fallible method may answer [`HostError::NotReady`]; callers run
/// compiler steps inside [`run_until_ready`](crate::run_until_ready).
/// Implementations may leave methods out by answering
/// [`HostError::Unsupported`].
///
/// [`HostError::NotReady`]: crate::HostError::NotReady
/// [`HostError::Unsupported`]: crate::HostError::Unsupported
pub trait CompilerHost {
    fn args(&self) -> &[String];
    fn new_line(&self) -> &str;
    fn use_case_sensitive_file_names(&self) -> bool;

    fn write(&self, text: &str) -> HostResult<()>;
    fn write_output_is_tty(&self) -> HostResult<bool>;
    fn get_width_of_terminal(&self) -> HostResult<usize>;

    /// File content, or `None` if the file does not exist or cannot be read.
    fn read_file(&self, path: &str, encoding: Option<&str>) -> HostResult<Option<Arc<str>>>;
    fn get_file_size(&self, path: &str) -> HostResult<u64>;
    fn write_file(&self, path: &str, data: &str, write_byte_order_mark: bool) -> HostResult<()>;
    fn resolve_path(&self, path: &str) -> HostResult<String>;
    fn file_exists(&self, path: &str) -> HostResult<bool>;
    fn directory_exists(&self, path: &str) -> HostResult<bool>;
    fn create_directory(&self, path: &str) -> HostResult<()>;
    fn get_executing_file_path(&self) -> String;
    fn get_current_directory(&self) -> String;

    /// Absolute paths of the subdirectories of `path`.
    fn get_directories(&self, path: &str) -> HostResult<Vec<String>>;

    /// Absolute paths of the files below `path`.
    ///
    /// Files must end with one of `extensions` (when given), match no
    /// `excludes` pattern and match every `includes` pattern. `depth` bounds
    /// how many directory levels are listed; `Some(0)` lists nothing.
    fn read_directory(
        &self,
        path: &str,
        extensions: &[String],
        excludes: &[String],
        includes: &[String],
        depth: Option<u32>,
    ) -> HostResult<Vec<String>>;

    fn get_modified_time(&self, path: &str) -> HostResult<Option<SystemTime>>;
    fn set_modified_time(&self, path: &str, time: SystemTime) -> HostResult<()>;
    fn delete_file(&self, path: &str) -> HostResult<()>;
    fn create_hash(&self, data: &str) -> HostResult<String>;
    fn create_sha256_hash(&self, data: &str) -> HostResult<String>;
    fn exit(&self, exit_code: Option<i32>) -> HostResult<()>;
    fn realpath(&self, path: &str) -> HostResult<String>;
    fn set_timeout(&self, callback: TimerCallback, ms: u64) -> HostResult<TimerId>;
    fn clear_timeout(&self, timer: TimerId) -> HostResult<()>;
    fn clear_screen(&self) -> HostResult<()>;
    fn base64_decode(&self, input: &str) -> HostResult<String>;
    fn base64_encode(&self, input: &str) -> HostResult<String>;
}
