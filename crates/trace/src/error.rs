use thiserror::Error;

/// Result type for trace lookups
pub type Result<T> = std::result::Result<T, TraceError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// No captured frame belongs to the requested type
    #[error("Stack trace does not contain a call of {type_name} ({frames} frame(s) captured)")]
    NotFound { type_name: String, frames: usize },
}
