//! Build error taxonomy.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while producing the dist tree.
///
/// Every variant is fatal: the build never retries or recovers locally, and
/// a failure partway through leaves the output directory partially built.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("source document not found: {}", path.display())]
    MissingSourceDocument { path: PathBuf },

    #[error("refusing to build into {}: {reason}", output.display())]
    UnsafeOutput {
        output: PathBuf,
        reason: &'static str,
    },

    #[error("malformed source document: {reason}")]
    MalformedDocument { reason: String },

    #[error("bundling failed for {}: {reason}", entry.display())]
    BundlingFailure { entry: PathBuf, reason: String },

    #[error("failed to {action} {}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}
