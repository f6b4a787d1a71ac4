use contract_trace::{CallTrace, Traced};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Result type for assertions
pub type Result<T> = std::result::Result<T, AssertionError>;

type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// A defect in the library or in the way it is wired into the host, never a
/// failed check of user data
#[derive(Debug)]
pub struct AssertionContainsError {
    message: String,
    source: Option<BoxedSource>,
}

impl AssertionContainsError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach the failure that revealed the defect
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Message without the internal error prefix
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AssertionContainsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[INTERNAL ERROR]: {}", self.message)
    }
}

impl StdError for AssertionContainsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

/// A failed check: the data does not satisfy the contract
#[derive(Debug)]
pub struct AssertionFailed {
    message: String,
    cause: Option<Box<AssertionContainsError>>,
    trace: CallTrace,
}

impl AssertionFailed {
    pub(crate) fn from_parts(
        message: String,
        cause: Option<AssertionContainsError>,
        trace: CallTrace,
    ) -> Self {
        Self {
            message,
            cause: cause.map(Box::new),
            trace,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Why the message had to fall back to the generic one
    pub fn cause(&self) -> Option<&AssertionContainsError> {
        self.cause.as_deref()
    }
}

impl fmt::Display for AssertionFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for AssertionFailed {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

impl Traced for AssertionFailed {
    fn call_trace(&self) -> &CallTrace {
        &self.trace
    }
}

/// Every way an assertion can fail
#[derive(Error, Debug)]
pub enum AssertionError {
    /// The checked value violates the contract
    #[error(transparent)]
    Failed(#[from] AssertionFailed),

    /// The library itself is broken or misused
    #[error(transparent)]
    Internal(#[from] AssertionContainsError),
}

impl AssertionError {
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    pub fn as_failure(&self) -> Option<&AssertionFailed> {
        match self {
            Self::Failed(failed) => Some(failed),
            Self::Internal(_) => None,
        }
    }
}

/// Check an invariant of the library itself
pub fn ensure(
    condition: bool,
    message: impl Into<String>,
) -> std::result::Result<(), AssertionContainsError> {
    if condition {
        Ok(())
    } else {
        Err(AssertionContainsError::new(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_error_prefix() {
        let error = AssertionContainsError::new("broken");
        assert_eq!(error.to_string(), "[INTERNAL ERROR]: broken");
        assert_eq!(error.message(), "broken");
        assert!(error.source().is_none());
    }

    #[test]
    fn test_internal_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = AssertionContainsError::with_source("cannot read", io);
        assert_eq!(error.source().map(ToString::to_string).as_deref(), Some("gone"));
    }

    #[test]
    fn test_failure_display_is_message() {
        let failed = AssertionFailed::from_parts(
            "Assertion failed.".to_string(),
            Some(AssertionContainsError::new("no source")),
            CallTrace::default(),
        );
        assert_eq!(failed.to_string(), "Assertion failed.");
        assert_eq!(
            failed.source().map(ToString::to_string).as_deref(),
            Some("[INTERNAL ERROR]: no source")
        );

        let error = AssertionError::from(failed);
        assert!(error.is_failure());
        assert!(!error.is_internal());
        assert_eq!(error.to_string(), "Assertion failed.");
    }

    #[test]
    fn test_ensure() {
        assert!(ensure(true, "fine").is_ok());
        let error = ensure(false, "of(\"null\") is not allowed.").unwrap_err();
        assert_eq!(error.to_string(), "[INTERNAL ERROR]: of(\"null\") is not allowed.");
        assert!(AssertionError::from(error).is_internal());
    }
}
