use crate::array::ArrayAssertions;
use crate::chain::{enter_call, failure};
use crate::diagnostic::DiagnosticAssembler;
use crate::error::Result;
use crate::numeric::{FloatAssertions, NumericAssertions};
use crate::string::{BinaryStringAssertions, StringAssertions};
use contract_dump::{first_non_utf8_sequence, Args, Value};
use contract_trace::{enter, Frame, InvocationKind};

const SAME_TEMPLATE: &str = "{expected} is not the same as {value}.{notice}";
const LOOSE_NOTICE: &str = " However, non-strict comparison says they are equal.";
const UNREACHABLE_TEMPLATE: &str = "Unreachable code is actually reachable.";
const INVALID_UTF8_TEMPLATE: &str = "The string is not properly UTF-8 encoded, first invalid sequence \
     [offset {offset} byte(s)]: 0x{hex}; use Assert::string_binary() to work with non-UTF-8 strings.";

/// Entry point of every assertion.
///
/// Checks return `Ok` when the contract holds. A failed check without a
/// message describes itself with the source text of the call:
///
/// ```rust,no_run
/// use contract_assert::Assert;
///
/// let err = Assert::is_true(42 == 43).unwrap_err();
/// // "Assert::is_true(42 == 43) failed in src/main.rs at line 3."
/// println!("{err}");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Assert;

impl Assert {
    /// Name the call-site reconstruction looks for
    pub const TYPE_NAME: &'static str = "contract_assert::Assert";

    #[track_caller]
    fn check(
        function: &'static str,
        arguments: Vec<Value>,
        passed: bool,
        template: &str,
        args: impl FnOnce(&DiagnosticAssembler) -> Args,
    ) -> Result<()> {
        let _frame = enter(
            Frame::here(function, Self::TYPE_NAME, InvocationKind::Static).with_arguments(arguments),
        );
        if passed {
            return Ok(());
        }
        Err(failure(template, args))
    }

    #[track_caller]
    pub fn is_true(value: bool) -> Result<()> {
        Self::check("is_true", vec![value.into()], value, "", |_| Args::new())
    }

    #[track_caller]
    pub fn is_true_with(value: bool, message: &str) -> Result<()> {
        Self::check("is_true_with", vec![value.into()], value, message, |_| Args::new())
    }

    #[track_caller]
    pub fn is_false(value: bool) -> Result<()> {
        Self::check("is_false", vec![value.into()], !value, "", |_| Args::new())
    }

    #[track_caller]
    pub fn is_false_with(value: bool, message: &str) -> Result<()> {
        Self::check("is_false_with", vec![value.into()], !value, message, |_| Args::new())
    }

    #[track_caller]
    pub fn is_null(value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let passed = value.is_null();
        Self::check("is_null", vec![value], passed, "", |_| Args::new())
    }

    #[track_caller]
    pub fn is_null_with(value: impl Into<Value>, message: &str) -> Result<()> {
        let value = value.into();
        let passed = value.is_null();
        Self::check("is_null_with", vec![value], passed, message, |_| Args::new())
    }

    #[track_caller]
    pub fn not_null(value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let passed = !value.is_null();
        Self::check("not_null", vec![value], passed, "", |_| Args::new())
    }

    #[track_caller]
    pub fn not_null_with(value: impl Into<Value>, message: &str) -> Result<()> {
        let value = value.into();
        let passed = !value.is_null();
        Self::check("not_null_with", vec![value], passed, message, |_| Args::new())
    }

    /// Strict equality; the message notes when the values are loosely equal
    #[track_caller]
    pub fn same(value: impl Into<Value>, expected: impl Into<Value>) -> Result<()> {
        Self::compare("same", value.into(), expected.into(), SAME_TEMPLATE)
    }

    /// [`Assert::same`] with a template over `{expected}`, `{value}` and `{notice}`
    #[track_caller]
    pub fn same_with(
        value: impl Into<Value>,
        expected: impl Into<Value>,
        message: &str,
    ) -> Result<()> {
        Self::compare("same_with", value.into(), expected.into(), message)
    }

    #[track_caller]
    fn compare(function: &'static str, value: Value, expected: Value, template: &str) -> Result<()> {
        let passed = value.identical(&expected);
        let arguments = if passed {
            Vec::new()
        } else {
            vec![value.clone(), expected.clone()]
        };

        Self::check(function, arguments, passed, template, |assembler| {
            let notice = if value.loosely_equals(&expected) {
                LOOSE_NOTICE
            } else {
                ""
            };
            Args::new()
                .with("expected", assembler.rendered(&expected))
                .with("value", assembler.rendered(&value))
                .with("notice", notice)
        })
    }

    /// Fails unconditionally
    #[track_caller]
    pub fn unreachable<T>() -> Result<T> {
        Self::unreachable_with(UNREACHABLE_TEMPLATE)
    }

    #[track_caller]
    pub fn unreachable_with<T>(message: &str) -> Result<T> {
        let _frame = enter_call(Self::TYPE_NAME, InvocationKind::Static, "unreachable");
        Err(failure(message, |_| Args::new()))
    }

    /// Numbers and numeric text
    #[track_caller]
    pub fn numeric(value: impl Into<Value>) -> Result<NumericAssertions> {
        let value = value.into();
        let _frame = enter_call(Self::TYPE_NAME, InvocationKind::Static, "numeric");

        match value.as_f64() {
            Some(number) => Ok(NumericAssertions::new(value, number)),
            None => Err(failure(
                "Value {value} is not numeric (int, float or numeric text).",
                |assembler| Args::new().with("value", assembler.rendered(&value)),
            )),
        }
    }

    #[track_caller]
    pub fn float(value: impl Into<Value>) -> Result<FloatAssertions> {
        let value = value.into();
        let _frame = enter_call(Self::TYPE_NAME, InvocationKind::Static, "float");

        match value {
            Value::Float(number) => Ok(FloatAssertions::new(number)),
            other => Err(failure("Value {value} is not a float.", |_| {
                Args::new().with("value", other)
            })),
        }
    }

    /// Text that must be well-formed UTF-8 without control characters
    #[track_caller]
    pub fn string(value: impl Into<Value>) -> Result<StringAssertions> {
        let value = value.into();
        let _frame = enter_call(Self::TYPE_NAME, InvocationKind::Static, "string");

        let bytes = Self::text(value)?;
        if let Some(invalid) = first_non_utf8_sequence(&bytes, 10) {
            return Err(failure(INVALID_UTF8_TEMPLATE, |_| {
                Args::new()
                    .with("subject", Value::bytes(bytes.clone()))
                    .with("offset", invalid.offset)
                    .with("hex", invalid.hex())
            }));
        }
        Ok(StringAssertions::utf8(bytes))
    }

    /// Text measured in bytes
    #[track_caller]
    pub fn string_8bit(value: impl Into<Value>) -> Result<StringAssertions> {
        let value = value.into();
        let _frame = enter_call(Self::TYPE_NAME, InvocationKind::Static, "string_8bit");
        Ok(StringAssertions::eight_bit(Self::text(value)?))
    }

    /// Arbitrary bytes; no encoding check at all
    #[track_caller]
    pub fn string_binary(value: impl Into<Value>) -> Result<BinaryStringAssertions> {
        let value = value.into();
        let _frame = enter_call(Self::TYPE_NAME, InvocationKind::Static, "string_binary");
        Ok(BinaryStringAssertions::new(Self::text(value)?))
    }

    #[track_caller]
    pub fn array(value: impl Into<Value>) -> Result<ArrayAssertions> {
        let value = value.into();
        let _frame = enter_call(Self::TYPE_NAME, InvocationKind::Static, "array");

        if value.as_array().is_some() {
            return Ok(ArrayAssertions::new(value));
        }
        Err(failure("Value {value} is not an array.", |_| {
            Args::new().with("value", value)
        }))
    }

    fn text(value: Value) -> Result<Vec<u8>> {
        match value {
            Value::Text(bytes) => Ok(bytes),
            other => Err(failure("Value {value} is not a string.", |_| {
                Args::new().with("value", other)
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contract_trace::{depth, CallTrace, Traced};
    use pretty_assertions::assert_eq;

    fn message<T: std::fmt::Debug>(result: Result<T>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_passing_checks() {
        assert!(Assert::is_true(true).is_ok());
        assert!(Assert::is_false(false).is_ok());
        assert!(Assert::is_null(None::<i32>).is_ok());
        assert!(Assert::is_null(Value::Null).is_ok());
        assert!(Assert::not_null(Some(42)).is_ok());
        assert!(Assert::same(42, 42).is_ok());
        assert!(Assert::same(3usize, 3).is_ok());
        assert!(Assert::same(vec!["a"], vec!["a"]).is_ok());
    }

    #[test]
    fn test_explicit_messages() {
        assert_eq!(
            message(Assert::is_false_with(42 == 42, "It seems like 42 == 42.")),
            "It seems like 42 == 42."
        );
        assert_eq!(message(Assert::unreachable::<()>()), "Unreachable code is actually reachable.");
        assert_eq!(message(Assert::unreachable_with::<u8>("nope")), "nope");
    }

    #[test]
    fn test_same_notices_loose_equality() {
        assert_eq!(
            message(Assert::same(42, "42")),
            "\"42\" is not the same as 42. However, non-strict comparison says they are equal."
        );
        assert_eq!(message(Assert::same("a", "b")), "\"b\" is not the same as \"a\".");
        assert_eq!(
            message(Assert::same_with(1, 2, "{value} vs {expected}")),
            "1 vs 2"
        );
    }

    #[test]
    fn test_failure_keeps_entry_frame() {
        let before = depth();
        let err = Assert::is_true_with(false, "custom").unwrap_err();
        assert_eq!(depth(), before);

        let failed = err.as_failure().unwrap();
        let trace = CallTrace::capture_from(failed);
        let frame = trace.find_top_frame_of_type(Assert::TYPE_NAME).unwrap();
        assert_eq!(frame.function(), "is_true_with");
        assert_eq!(frame.file(), Some(file!()));
        assert_eq!(frame.raw_arguments(), Some(&[Value::Bool(false)][..]));
        assert_eq!(failed.call_trace().len(), trace.len());
    }

    #[test]
    fn test_entry_type_checks() {
        assert_eq!(
            message(Assert::numeric("forty")),
            "Value \"forty\" is not numeric (int, float or numeric text)."
        );
        assert!(Assert::numeric(" 42.5").is_ok());
        assert_eq!(message(Assert::float(5)), "Value 5 is not a float.");
        assert_eq!(message(Assert::string(5)), "Value 5 is not a string.");
        assert_eq!(message(Assert::array("x")), "Value x is not an array.");
        assert!(Assert::string_binary(Value::bytes(vec![0u8, 255])).is_ok());
        assert!(Assert::string_8bit(Value::bytes(vec![0xE9])).is_ok());
    }

    #[test]
    fn test_invalid_utf8_names_offset() {
        let err = Assert::string(Value::bytes(b"abc\xFF\xFEdef".to_vec())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The string is not properly UTF-8 encoded, first invalid sequence [offset 3 byte(s)]: \
             0xfffe646566; use Assert::string_binary() to work with non-UTF-8 strings."
        );
    }
}
