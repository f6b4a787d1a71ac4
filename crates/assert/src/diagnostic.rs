use crate::config::DiagnosticsConfig;
use crate::error::{AssertionContainsError, AssertionFailed};
use contract_callsite::{CallSite, CallSiteReconstruction};
use contract_dump::{fstr_with, Args, Renderer, Value};
use contract_trace::CallTrace;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Message of failures without an explicit one, when the call was recovered
pub const DEFAULT_TEMPLATE: &str = "{assertion} failed in {file} at line {line}.";

/// Message of failures without an explicit one, when nothing could be recovered
pub const FALLBACK_MESSAGE: &str = "Assertion failed.";

/// Final message of a failing assertion
#[derive(Debug)]
pub struct Diagnostic {
    pub message: String,
    /// Set when the message had to fall back to [`FALLBACK_MESSAGE`]
    pub cause: Option<AssertionContainsError>,
}

/// Builds failure messages, recovering the failing call when none was given
#[derive(Clone)]
pub struct DiagnosticAssembler {
    reconstructor: Arc<dyn CallSiteReconstruction>,
    renderer: Renderer,
}

impl std::fmt::Debug for DiagnosticAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticAssembler")
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

impl DiagnosticAssembler {
    pub fn new(reconstructor: Arc<dyn CallSiteReconstruction>, renderer: Renderer) -> Self {
        Self {
            reconstructor,
            renderer,
        }
    }

    pub fn from_config(config: &DiagnosticsConfig) -> Self {
        Self::new(config.reconstructor(), config.renderer())
    }

    /// Assembler of the installed configuration
    pub fn current() -> Self {
        Self::from_config(DiagnosticsConfig::current())
    }

    pub const fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Describe the failing call of `entry_type` found in `raised_at`.
    ///
    /// Never fails: anything going wrong (including a panic while parsing)
    /// yields [`FALLBACK_MESSAGE`] with the reason attached.
    pub fn assemble_default_message(&self, raised_at: &CallTrace, entry_type: &str) -> Diagnostic {
        match self.recover_call(raised_at, entry_type) {
            Ok(args) => Diagnostic {
                message: fstr_with(&self.renderer, DEFAULT_TEMPLATE, &args),
                cause: None,
            },
            Err(cause) => {
                log::warn!("Falling back to a generic assertion message: {cause}");
                Diagnostic {
                    message: FALLBACK_MESSAGE.to_string(),
                    cause: Some(cause),
                }
            }
        }
    }

    fn recover_call(
        &self,
        raised_at: &CallTrace,
        entry_type: &str,
    ) -> Result<Args, AssertionContainsError> {
        let frame = raised_at.find_top_frame_of_type(entry_type).map_err(|e| {
            AssertionContainsError::with_source(
                format!("Cannot locate the call of {entry_type}"),
                e,
            )
        })?;

        let site = CallSite {
            file: frame.file(),
            line: frame.line(),
            column: frame.column(),
        };

        let reconstructed = panic::catch_unwind(AssertUnwindSafe(|| {
            self.reconstructor.reconstruct_call(site, entry_type)
        }));

        let assertion = match reconstructed {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                return Err(AssertionContainsError::with_source(
                    format!("Cannot reconstruct the call of {entry_type}::{}", frame.function()),
                    e,
                ))
            }
            Err(payload) => {
                return Err(AssertionContainsError::new(format!(
                    "Reconstruction of the call of {entry_type}::{} panicked: {}",
                    frame.function(),
                    panic_message(payload.as_ref())
                )))
            }
        };

        let mut args = Args::new().with("assertion", assertion);
        if let Some(file) = frame.file() {
            args.insert("file", file);
        }
        if let Some(line) = frame.line() {
            args.insert("line", line);
        }
        Ok(args)
    }

    /// Build the error of a failed check.
    ///
    /// A non-empty `template` is interpolated with `args`; an empty one asks
    /// for the failing call to be recovered from the current trace.
    pub fn failure(&self, template: &str, args: &Args, entry_type: &str) -> AssertionFailed {
        let trace = CallTrace::capture_current();

        if template.is_empty() {
            let diagnostic = self.assemble_default_message(&trace, entry_type);
            return AssertionFailed::from_parts(diagnostic.message, diagnostic.cause, trace);
        }

        AssertionFailed::from_parts(fstr_with(&self.renderer, template, args), None, trace)
    }

    /// Value rendered now, inserted into messages as plain text
    pub fn rendered(&self, value: &Value) -> Value {
        Value::text(self.renderer.render(value))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use contract_callsite::{CallSiteError, Disabled, Result as CallSiteResult};
    use contract_trace::{Frame, InvocationKind};
    use pretty_assertions::assert_eq;

    const ENTRY: &str = "contract_assert::Assert";

    struct Fixed(&'static str);

    impl CallSiteReconstruction for Fixed {
        fn reconstruct_call(&self, _site: CallSite<'_>, _target: &str) -> CallSiteResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct Exploding;

    impl CallSiteReconstruction for Exploding {
        fn reconstruct_call(&self, _site: CallSite<'_>, _target: &str) -> CallSiteResult<String> {
            panic!("grammar mismatch");
        }
    }

    fn assembler(reconstructor: impl CallSiteReconstruction + 'static) -> DiagnosticAssembler {
        DiagnosticAssembler::new(Arc::new(reconstructor), Renderer::default())
    }

    fn trace_with_entry() -> CallTrace {
        CallTrace::from_frames(vec![
            Frame::new("check").declared_by("app::Service", InvocationKind::Instance),
            Frame::new("is_true")
                .at("src/service.rs", 12, 9)
                .declared_by(ENTRY, InvocationKind::Static),
            Frame::new("main"),
        ])
    }

    #[test]
    fn test_recovered_call() {
        let diagnostic = assembler(Fixed("Assert::is_true(42 == 43)"))
            .assemble_default_message(&trace_with_entry(), ENTRY);
        assert_eq!(
            diagnostic.message,
            "Assert::is_true(42 == 43) failed in src/service.rs at line 12."
        );
        assert!(diagnostic.cause.is_none());
    }

    #[test]
    fn test_disabled_reconstruction_falls_back() {
        let diagnostic = assembler(Disabled).assemble_default_message(&trace_with_entry(), ENTRY);
        assert_eq!(diagnostic.message, FALLBACK_MESSAGE);

        let cause = diagnostic.cause.unwrap();
        let source = std::error::Error::source(&cause).unwrap();
        assert!(source.downcast_ref::<CallSiteError>().is_some());
    }

    #[test]
    fn test_missing_entry_frame_falls_back() {
        let trace = CallTrace::from_frames(vec![Frame::new("main")]);
        let diagnostic = assembler(Fixed("unused")).assemble_default_message(&trace, ENTRY);
        assert_eq!(diagnostic.message, FALLBACK_MESSAGE);
        assert!(diagnostic
            .cause
            .unwrap()
            .message()
            .contains("Cannot locate the call of contract_assert::Assert"));
    }

    #[test]
    fn test_missing_location_falls_back() {
        let trace = CallTrace::from_frames(vec![
            Frame::new("is_true").declared_by(ENTRY, InvocationKind::Static)
        ]);
        let diagnostic = assembler(contract_callsite::SourceReconstructor::new())
            .assemble_default_message(&trace, ENTRY);
        assert_eq!(diagnostic.message, FALLBACK_MESSAGE);
        assert!(diagnostic.cause.is_some());
    }

    #[test]
    fn test_missing_source_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.rs");
        let trace = CallTrace::from_frames(vec![Frame::new("is_true")
            .at(missing.to_string_lossy(), 3, 5)
            .declared_by(ENTRY, InvocationKind::Static)]);

        let diagnostic = assembler(contract_callsite::SourceReconstructor::new())
            .assemble_default_message(&trace, ENTRY);
        assert_eq!(diagnostic.message, "Assertion failed.");

        let cause = diagnostic.cause.unwrap();
        let source = std::error::Error::source(&cause).unwrap();
        assert!(matches!(
            source.downcast_ref::<CallSiteError>(),
            Some(CallSiteError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn test_panicking_reconstruction_falls_back() {
        let diagnostic = assembler(Exploding).assemble_default_message(&trace_with_entry(), ENTRY);
        assert_eq!(diagnostic.message, FALLBACK_MESSAGE);
        assert!(diagnostic.cause.unwrap().message().contains("grammar mismatch"));
    }

    #[test]
    fn test_failure_with_explicit_template() {
        let args = Args::new().with("subject", -3);
        let failed = assembler(Disabled).failure("Value {subject} is not positive.", &args, ENTRY);
        assert_eq!(failed.message(), "Value -3 is not positive.");
        assert!(failed.cause().is_none());
    }
}
