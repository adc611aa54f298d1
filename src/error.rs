//! Error types for module-bom
//!
//! All modules use `BomResult<T>` as their return type. Every variant is
//! fatal to the build invocation that produced it.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for module-bom operations
pub type BomResult<T> = Result<T, BomError>;

/// All errors that can occur while building a bill of materials
#[derive(Error, Debug)]
pub enum BomError {
    // Dependency errors
    #[error("Failed to resolve dependency {id} ({version}) for stack {stack}: {reason}")]
    Resolution {
        id: String,
        version: String,
        stack: String,
        reason: String,
    },

    #[error("Failed to deliver dependency {id}: {reason}")]
    Provision { id: String, reason: String },

    // Tool errors
    #[error("Failed to run {command}: {reason}")]
    ToolExecution { command: String, reason: String },

    #[error("Failed to open {path}: {source}")]
    ReportNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    ReportFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to remove {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Layer errors
    #[error("Invalid layer {name}: {reason}")]
    Layer { name: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BomError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a delivery error for a dependency
    pub fn provision(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Provision {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a tool execution error
    pub fn tool_execution(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ToolExecution {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Resolution { .. } => {
                Some("Check the [[metadata.dependencies]] entries in buildpack.toml for this stack")
            }
            Self::ReportNotFound { .. } => {
                Some("The tool exited cleanly but wrote no report; check its output above")
            }
            Self::ToolExecution { .. } => {
                Some("Make sure node_modules is installed before this step")
            }
            _ => None,
        }
    }
}
