use crate::chain::{enter_call, failure, Template};
use crate::error::{AssertionContainsError, Result};
use contract_dump::{Args, Value};
use contract_trace::InvocationKind;
use regex::bytes::Regex;

/// How lengths of a checked string are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Characters of well-formed UTF-8
    Utf8,
    /// Bytes
    EightBit,
}

impl Encoding {
    fn len(self, bytes: &[u8]) -> usize {
        match self {
            // continuation bytes never start a character
            Self::Utf8 => bytes.iter().filter(|b| (**b & 0xC0) != 0x80).count(),
            Self::EightBit => bytes.len(),
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

fn text_list<I>(list: I) -> Vec<Vec<u8>>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    list.into_iter().map(|item| item.as_ref().to_vec()).collect()
}

fn list_value(list: &[Vec<u8>]) -> Value {
    Value::list(list.iter().map(|item| Value::bytes(item.clone())))
}

/// Checks over text accepted by [`crate::Assert::string`] or
/// [`crate::Assert::string_8bit`]
#[derive(Debug, Clone)]
pub struct StringAssertions {
    subject: Vec<u8>,
    encoding: Encoding,
    template: Template,
}

impl StringAssertions {
    pub const TYPE_NAME: &'static str = "contract_assert::StringAssertions";

    pub(crate) fn utf8(subject: Vec<u8>) -> Self {
        Self::new(subject, Encoding::Utf8)
    }

    pub(crate) fn eight_bit(subject: Vec<u8>) -> Self {
        Self::new(subject, Encoding::EightBit)
    }

    fn new(subject: Vec<u8>, encoding: Encoding) -> Self {
        Self {
            subject,
            encoding,
            template: Template::default(),
        }
    }

    #[must_use]
    pub fn message(mut self, template: impl Into<String>) -> Self {
        self.template.set(template);
        self
    }

    pub fn subject(&self) -> &[u8] {
        &self.subject
    }

    pub const fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Length in the unit of the chain's encoding
    pub fn len(&self) -> usize {
        self.encoding.len(&self.subject)
    }

    pub fn is_empty(&self) -> bool {
        self.subject.is_empty()
    }

    #[track_caller]
    fn check(
        self,
        function: &'static str,
        passed: bool,
        default: &str,
        args: impl FnOnce(&Self) -> Args,
    ) -> Result<Self> {
        let _frame = enter_call(Self::TYPE_NAME, InvocationKind::Instance, function);
        if passed {
            return Ok(self);
        }
        Err(failure(self.template.or(default), |_| args(&self)))
    }

    fn subject_value(&self) -> Value {
        Value::bytes(self.subject.clone())
    }

    #[track_caller]
    pub fn starts_with(self, prefix: &str) -> Result<Self> {
        let passed = self.subject.starts_with(prefix.as_bytes());
        self.check(
            "starts_with",
            passed,
            "{subject} does not start with \"{prefix}\".",
            |chain| Args::new().with("subject", chain.subject_value()).with("prefix", prefix),
        )
    }

    #[track_caller]
    pub fn ends_with(self, suffix: &str) -> Result<Self> {
        let passed = self.subject.ends_with(suffix.as_bytes());
        self.check(
            "ends_with",
            passed,
            "{subject} does not end with \"{suffix}\".",
            |chain| Args::new().with("subject", chain.subject_value()).with("suffix", suffix),
        )
    }

    #[track_caller]
    pub fn length_exactly(self, expected: usize) -> Result<Self> {
        let actual = self.len();
        self.check(
            "length_exactly",
            actual == expected,
            "Expected {expected} chars, the actual string contains {actual}.",
            |_| Args::new().with("expected", expected).with("actual", actual),
        )
    }

    #[track_caller]
    pub fn length_min(self, min: usize) -> Result<Self> {
        let actual = self.len();
        self.check(
            "length_min",
            actual >= min,
            "Expected at least {min} chars, the actual string contains {actual}.",
            |_| Args::new().with("min", min).with("actual", actual),
        )
    }

    #[track_caller]
    pub fn length_max(self, max: usize) -> Result<Self> {
        let actual = self.len();
        self.check(
            "length_max",
            actual <= max,
            "Expected at most {max} chars, the actual string contains {actual}.",
            |_| Args::new().with("max", max).with("actual", actual),
        )
    }

    #[track_caller]
    pub fn is_in<I>(self, list: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let list = text_list(list);
        let passed = list.iter().any(|item| *item == self.subject);
        self.check(
            "is_in",
            passed,
            "Value \"{subject}\" is not in array {list}.",
            |chain| {
                Args::new()
                    .with("subject", chain.subject_value())
                    .with("list", list_value(&list))
            },
        )
    }

    #[track_caller]
    pub fn not_in<I>(self, list: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let list = text_list(list);
        let passed = !list.iter().any(|item| *item == self.subject);
        self.check(
            "not_in",
            passed,
            "Value \"{subject}\" in the list: {list}.",
            |chain| {
                Args::new()
                    .with("subject", chain.subject_value())
                    .with("list", list_value(&list))
            },
        )
    }

    /// A pattern that does not compile is a misuse, reported as an internal error
    #[track_caller]
    pub fn matches_regex(self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            AssertionContainsError::with_source(
                format!("RegEx \"{pattern}\" failed with error \"{e}\"."),
                e,
            )
        })?;
        let passed = regex.is_match(&self.subject);
        self.check(
            "matches_regex",
            passed,
            "\"{subject}\" does not match pattern \"{pattern}\".",
            |chain| Args::new().with("subject", chain.subject_value()).with("pattern", pattern),
        )
    }

    /// Not empty; whitespace counts as content
    #[track_caller]
    pub fn not_blank(self) -> Result<Self> {
        let passed = !self.subject.is_empty();
        self.check("not_blank", passed, "Value is empty.", |_| Args::new())
    }

    #[track_caller]
    pub fn contains_not(self, substring: &str) -> Result<Self> {
        let passed = !contains(&self.subject, substring.as_bytes());
        self.check(
            "contains_not",
            passed,
            "String \"{subject}\" contains \"{substring}\".",
            |chain| {
                Args::new()
                    .with("subject", chain.subject_value())
                    .with("substring", substring)
            },
        )
    }
}

/// Checks over arbitrary bytes accepted by [`crate::Assert::string_binary`]
#[derive(Debug, Clone)]
pub struct BinaryStringAssertions {
    subject: Vec<u8>,
    template: Template,
}

impl BinaryStringAssertions {
    pub const TYPE_NAME: &'static str = "contract_assert::BinaryStringAssertions";

    pub(crate) fn new(subject: Vec<u8>) -> Self {
        Self {
            subject,
            template: Template::default(),
        }
    }

    #[must_use]
    pub fn message(mut self, template: impl Into<String>) -> Self {
        self.template.set(template);
        self
    }

    pub fn subject(&self) -> &[u8] {
        &self.subject
    }

    #[track_caller]
    fn membership(
        self,
        function: &'static str,
        list: Vec<Vec<u8>>,
        expect_member: bool,
        default: &str,
    ) -> Result<Self> {
        let _frame = enter_call(Self::TYPE_NAME, InvocationKind::Instance, function);
        if list.contains(&self.subject) == expect_member {
            return Ok(self);
        }
        Err(failure(self.template.or(default), |assembler| {
            Args::new()
                .with("subject", assembler.rendered(&Value::bytes(self.subject.clone())))
                .with("list", list_value(&list))
        }))
    }

    #[track_caller]
    pub fn length_exactly(self, expected: usize) -> Result<Self> {
        let _frame = enter_call(Self::TYPE_NAME, InvocationKind::Instance, "length_exactly");
        let actual = self.subject.len();
        if actual == expected {
            return Ok(self);
        }
        Err(failure(
            self.template
                .or("Expected {expected} bytes, the actual string contains {actual}."),
            |_| Args::new().with("expected", expected).with("actual", actual),
        ))
    }

    #[track_caller]
    pub fn is_in<I>(self, list: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        self.membership("is_in", text_list(list), true, "Value {subject} is not in {list}.")
    }

    #[track_caller]
    pub fn not_in<I>(self, list: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        self.membership("not_in", text_list(list), false, "Value {subject} in the list: {list}.")
    }
}
