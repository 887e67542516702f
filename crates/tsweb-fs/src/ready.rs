//! Retrying synchronous work until the data it needs has arrived.

use tracing::debug;

use crate::cache::Pending;
use crate::error::{HostError, NotReady};

/// Errors that may carry a [`NotReady`] signal.
pub trait Suspended: Sized {
    /// Split out the operation to wait for, or hand back a real failure.
    fn split_pending(self) -> Result<Pending, Self>;
}

impl Suspended for NotReady {
    fn split_pending(self) -> Result<Pending, Self> {
        Ok(self.0)
    }
}

impl Suspended for HostError {
    fn split_pending(self) -> Result<Pending, Self> {
        match self {
            HostError::NotReady(not_ready) => Ok(not_ready.0),
            other => Err(other),
        }
    }
}

/// Run `operation` until it stops answering not-ready.
///
/// Each not-ready answer is waited on and `operation` is called again from
/// the start, so it must be safe to repeat. Any other error is returned
/// as is. There is no timeout.
pub async fn run_until_ready<T, E, F>(mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: Suspended,
{
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(error) => {
                let pending = error.split_pending()?;
                debug!(%pending, "waiting for pending operation");
                pending.await;
            }
        }
    }
}
