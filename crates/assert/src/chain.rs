use crate::diagnostic::DiagnosticAssembler;
use crate::error::AssertionError;
use crate::facade::Assert;
use contract_dump::Args;
use contract_trace::{enter, Frame, FrameGuard, InvocationKind};

/// Failure template of a chain: the one set with `message()`, else each
/// check's default
#[derive(Debug, Clone, Default)]
pub(crate) struct Template(Option<String>);

impl Template {
    pub(crate) fn set(&mut self, template: impl Into<String>) {
        self.0 = Some(template.into());
    }

    pub(crate) fn or<'a>(&'a self, default: &'a str) -> &'a str {
        self.0.as_deref().unwrap_or(default)
    }
}

/// Record an assertion call on the shadow stack until the guard drops
#[track_caller]
pub(crate) fn enter_call(
    declaring_type: &'static str,
    kind: InvocationKind,
    function: &'static str,
) -> FrameGuard {
    enter(Frame::here(function, declaring_type, kind))
}

/// Error of a failed check, built while the failing call is still on the
/// shadow stack
pub(crate) fn failure(
    template: &str,
    args: impl FnOnce(&DiagnosticAssembler) -> Args,
) -> AssertionError {
    let assembler = DiagnosticAssembler::current();
    let args = args(&assembler);
    assembler.failure(template, &args, Assert::TYPE_NAME).into()
}
