//! Errors raised while reading a process snapshot.
//!
//! There are exactly two kinds. `Unavailable` means the reader could not even
//! attempt to parse (missing path, permissions, exited process, a platform
//! query that failed). `Malformed` means the source was read but its content
//! does not have the expected shape, which usually points at a kernel format
//! change.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot source {} is unavailable: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("platform query {name} failed")]
    PlatformQuery { name: &'static str },

    #[error("malformed snapshot {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl SnapshotError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SnapshotError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for both a source that could not be opened and a failed
    /// page size / tick rate query.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            SnapshotError::Unavailable { .. } | SnapshotError::PlatformQuery { .. }
        )
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, SnapshotError::Malformed { .. })
    }

    /// Re-labels a parse error produced on raw text with the file it came from.
    pub(crate) fn at(self, source: impl Into<PathBuf>) -> Self {
        match self {
            SnapshotError::Malformed { reason, .. } => SnapshotError::Malformed {
                path: source.into(),
                reason,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message() {
        let err = SnapshotError::malformed("/proc/self/statm", "expected 7 fields, found 3");
        assert_eq!(
            err.to_string(),
            "malformed snapshot /proc/self/statm: expected 7 fields, found 3"
        );
        assert!(err.is_malformed());
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_unavailable_kinds() {
        let err = SnapshotError::Unavailable {
            path: PathBuf::from("/proc/424242/io"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.is_unavailable());
        assert!(SnapshotError::PlatformQuery { name: "_SC_CLK_TCK" }.is_unavailable());
    }

    #[test]
    fn test_at_relabels_only_malformed() {
        let err = SnapshotError::malformed("<text>", "bad").at("/tmp/stat");
        match err {
            SnapshotError::Malformed { path, reason } => {
                assert_eq!(path, PathBuf::from("/tmp/stat"));
                assert_eq!(reason, "bad");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
