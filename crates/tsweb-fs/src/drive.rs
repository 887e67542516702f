//! Driving synchronous compiler steps to completion.

use tracing::debug;

use crate::error::HostResult;
use crate::host::CompilerHost;
use crate::ready::run_until_ready;
use crate::sync_fs::SyncFs;

const PROJECT_CONFIG: &str = "tsconfig.json";

/// Result of one pass of a compiler step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome<T> {
    /// Nothing left unresolved.
    Complete(T),
    /// Some diagnostics remain; more data may resolve them.
    Incomplete(T),
}

impl<T> StepOutcome<T> {
    pub fn is_complete(&self) -> bool {
        matches!(self, StepOutcome::Complete(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            StepOutcome::Complete(value) | StepOutcome::Incomplete(value) => value,
        }
    }
}

/// Run `step` until it completes or no outstanding operation is left that
/// could change its answer.
///
/// Each pass runs inside [`run_until_ready`]. An incomplete pass drains the
/// pending set and runs again; when the drain finds nothing pending the
/// incomplete outcome is returned. A complete pass drains too, so writes it
/// issued have reached storage on return. Errors other than not-ready end
/// the loop.
pub async fn drive<T, F>(fs: &SyncFs, mut step: F) -> HostResult<StepOutcome<T>>
where
    F: FnMut(&SyncFs) -> HostResult<StepOutcome<T>>,
{
    let mut pass = 0usize;
    loop {
        pass += 1;
        let outcome = run_until_ready(|| step(fs)).await?;
        if outcome.is_complete() {
            debug!(pass, "step complete");
            fs.drain_pending().await;
            return Ok(outcome);
        }
        if !fs.drain_pending().await {
            debug!(pass, "step incomplete with nothing pending");
            return Ok(outcome);
        }
        debug!(pass, "step incomplete, running again");
    }
}

/// Issue reads for `paths` up front and wait for all of them.
///
/// Returns whether any operation had to be waited on.
pub async fn prefetch<I, P>(fs: &SyncFs, paths: I) -> bool
where
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    for path in paths {
        // A miss only has to be issued here; the drain below waits for it.
        let _ = fs.cache().read_file(&fs.resolve(path.as_ref()));
    }
    fs.drain_pending().await
}

/// Absolute paths of every `tsconfig.json` below `root`, skipping
/// `node_modules`.
pub async fn find_project_configs(fs: &SyncFs, root: &str) -> HostResult<Vec<String>> {
    let extensions = [".json".to_string()];
    let excludes = ["**/node_modules/**".to_string()];
    let files =
        run_until_ready(|| fs.read_directory(root, &extensions, &excludes, &[], None)).await?;
    Ok(files
        .into_iter()
        .filter(|path| path.rsplit('/').next() == Some(PROJECT_CONFIG))
        .collect())
}
