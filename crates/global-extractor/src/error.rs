//! Error types shared by the build pipeline stages.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while building, assembling or reporting.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list snippet directory {}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize bundle")]
    Serialize(#[from] serde_json::Error),

    #[error("malformed test results in {}", path.display())]
    MalformedResults {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("table markers not found in {}", .0.display())]
    MissingTableMarkers(PathBuf),

    #[error("failed to launch test runtime `{program}`")]
    Runner {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BuildError>;

/// Read a file to a string, tagging failures with the path.
pub(crate) fn read_to_string(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| BuildError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a file, creating its parent directory first.
pub(crate) fn write_file(path: &std::path::Path, contents: impl AsRef<[u8]>) -> Result<()> {
    let tag = |source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(tag)?;
    }
    std::fs::write(path, contents).map_err(tag)
}
