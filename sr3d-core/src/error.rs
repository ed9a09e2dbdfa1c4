/// Error types for resource loading.
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Failure to read or parse a mesh file.
#[derive(Debug)]
pub enum MeshError {
    Io { path: PathBuf, source: io::Error },
    /// A `v` or `f` line whose payload could not be read. `line` is 1-based.
    Parse { line: usize, reason: String },
    /// A face refers to a vertex that has not been declared.
    IndexOutOfRange {
        line: usize,
        index: i64,
        vertices: usize,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::Io { path, source } => {
                write!(f, "failed to read mesh {}: {}", path.display(), source)
            }
            MeshError::Parse { line, reason } => write!(f, "line {}: {}", line, reason),
            MeshError::IndexOutOfRange {
                line,
                index,
                vertices,
            } => write!(
                f,
                "line {}: vertex index {} out of range (1..={})",
                line, index, vertices
            ),
        }
    }
}

impl std::error::Error for MeshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MeshError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failure to load a renderer configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Json(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Json(e) => write!(f, "invalid config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}
