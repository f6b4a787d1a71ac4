use std::path::PathBuf;
use thiserror::Error;

/// Result type for call-site reconstruction
pub type Result<T> = std::result::Result<T, CallSiteError>;

/// Errors that can occur while reconstructing a call
#[derive(Error, Debug)]
pub enum CallSiteError {
    /// File or line of the call is unknown
    #[error("Impossible to reconstruct the call of {target}: file or line were not specified")]
    PreconditionNotMet { target: String },

    /// The calling source is not in a parseable language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The calling source could not be located
    #[error("Source file {file} not found ({searched} location(s) searched)")]
    SourceNotFound { file: String, searched: usize },

    /// Reading the calling source failed
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the source code
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    /// Nothing on the line calls the target type
    #[error("No call of {target} found at line {line}")]
    NoMatch { target: String, line: u32 },

    /// Several calls of the target type start on the line
    #[error("{count} calls of {target} found at line {line}, cannot tell which one failed")]
    Ambiguous {
        target: String,
        line: u32,
        count: usize,
    },

    /// Reconstruction is switched off
    #[error("Call-site reconstruction is disabled")]
    Disabled,
}

impl CallSiteError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }
}
