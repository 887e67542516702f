use std::io;

use crate::cache::Pending;

/// Failure reported by a storage [`Backend`](crate::Backend).
///
/// The cache never hands these to its callers: a failed read or listing is
/// logged and degraded to an absent entry.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl BackendError {
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            return BackendError::NotFound(path.into());
        }
        BackendError::Io {
            path: path.into(),
            source,
        }
    }
}

/// The requested value is still being fetched.
///
/// Carries the in-flight operation; wait on it and ask again.
#[derive(Debug, Clone, thiserror::Error)]
#[error("not ready: waiting for {0}")]
pub struct NotReady(pub Pending);

impl NotReady {
    pub fn pending(&self) -> &Pending {
        &self.0
    }

    pub fn into_pending(self) -> Pending {
        self.0
    }
}

/// Errors surfaced through the compiler host contract.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    NotReady(#[from] NotReady),

    /// A contract method this host deliberately leaves out.
    #[error("Method {method} not implemented. {args}")]
    Unsupported { method: &'static str, args: String },

    #[error("Invalid glob pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl HostError {
    pub fn unsupported(method: &'static str, args: serde_json::Value) -> Self {
        HostError::Unsupported {
            method,
            args: args.to_string(),
        }
    }

    /// Whether this is the retryable not-ready signal.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, HostError::NotReady(_))
    }
}

pub type HostResult<T> = Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unsupported_names_method_and_arguments() {
        let err = HostError::unsupported("realpath", json!(["/proj/a.ts"]));
        assert_eq!(
            err.to_string(),
            r#"Method realpath not implemented. ["/proj/a.ts"]"#
        );
        assert!(!err.is_not_ready());
    }

    #[test]
    fn io_not_found_becomes_not_found() {
        let err = BackendError::io("/x", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, BackendError::NotFound(path) if path == "/x"));

        let err = BackendError::io("/x", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, BackendError::Io { .. }));
    }
}
