//! Error types for scanning and purging.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReclaimError>;

#[derive(Debug, Error)]
pub enum ReclaimError {
    /// The root path could not be stat'ed or canonicalized. Fatal.
    #[error("cannot access root path {}: {source}", .path.display())]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("root path {} is not a directory", .path.display())]
    RootNotDirectory { path: PathBuf },

    /// A companion-file probe failed for a reason other than "not found".
    #[error("failed to probe {}: {source}", .path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Size computation hit an entry it could not read.
    #[error("failed to measure {}: {source}", .path.display())]
    Measure {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to parse pattern table: {0}")]
    PatternSyntax(#[from] toml::de::Error),

    #[error("invalid pattern for marker '{marker}': {reason}")]
    InvalidPattern { marker: String, reason: String },
}
