use crate::chain::{enter_call, failure, Template};
use crate::dot_path::{DotPath, PathCache};
use crate::error::{AssertionContainsError, Result};
use contract_dump::{dump, list, Args, Key, ObjectValue, TypeLabel, Value};
use contract_trace::InvocationKind;
use once_cell::sync::Lazy;
use regex::Regex;

static TYPE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:::)?[A-Za-z_][A-Za-z0-9_]*(?:::[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("type path pattern is valid")
});

/// What `of()` accepts an element as
#[derive(Debug, Clone, PartialEq, Eq)]
enum ElementType {
    /// One of the kind names of [`Value::kind_name`]
    Kind(&'static str),
    /// Closures and other anonymous objects
    Callable,
    /// Objects whose type (or declared parent/interface) has this path
    Named(String),
}

impl ElementType {
    fn parse(name: &str) -> Result<Self> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "null" => {
                return Err(AssertionContainsError::new("of(\"null\") is not allowed.").into())
            }
            "bool" | "boolean" => "boolean",
            "int" | "integer" => "integer",
            "float" | "double" => "double",
            "string" => "string",
            "array" => "array",
            "object" => "object",
            "resource" => "resource",
            "callable" => return Ok(Self::Callable),
            _ if TYPE_PATH.is_match(name) => {
                return Ok(Self::Named(name.trim_start_matches("::").to_string()))
            }
            _ => {
                return Err(AssertionContainsError::new(format!(
                    "of() expects a primitive type, \"callable\" or a type path, but {} provided.",
                    dump(&Value::from(name))
                ))
                .into())
            }
        };
        Ok(Self::Kind(kind))
    }

    fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Kind(kind), _) => value.kind_name() == *kind,
            (Self::Callable, Value::Object(object)) => object.label.name().is_none(),
            (Self::Named(path), Value::Object(object)) => names_type(object, path),
            _ => false,
        }
    }
}

fn path_is(name: &str, path: &str) -> bool {
    name == path || name.ends_with(&format!("::{path}"))
}

fn names_type(object: &ObjectValue, path: &str) -> bool {
    match &object.label {
        TypeLabel::Named(name) => path_is(name, path),
        TypeLabel::Anonymous { parent, interfaces } => parent
            .iter()
            .chain(interfaces)
            .any(|name| path_is(name, path)),
    }
}

/// Identity of an element for uniqueness checks
#[derive(Debug)]
enum Identity<'v> {
    Hash(&'v str),
    Snapshot(&'v ObjectValue),
    Plain(&'v Value),
}

impl<'v> Identity<'v> {
    fn of(value: &'v Value) -> Result<Self> {
        match value {
            Value::Object(object) => Ok(match &object.unique_hash {
                Some(hash) => Self::Hash(hash),
                None => Self::Snapshot(object),
            }),
            Value::Resource(_) => Err(AssertionContainsError::new(format!(
                "Array contains value which cannot be checked for uniqueness: {}.",
                dump(value)
            ))
            .into()),
            plain => Ok(Self::Plain(plain)),
        }
    }

    fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Hash(a), Self::Hash(b)) => a == b,
            (Self::Snapshot(a), Self::Snapshot(b)) => a == b,
            (Self::Plain(a), Self::Plain(b)) => a.identical(b),
            _ => false,
        }
    }
}

/// Checks over an array accepted by [`crate::Assert::array`]
#[derive(Debug, Clone)]
pub struct ArrayAssertions {
    subject: Value,
    template: Template,
}

impl ArrayAssertions {
    pub const TYPE_NAME: &'static str = "contract_assert::ArrayAssertions";

    pub(crate) fn new(subject: Value) -> Self {
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

    pub fn subject(&self) -> &Value {
        &self.subject
    }

    pub fn into_inner(self) -> Value {
        self.subject
    }

    fn entries(&self) -> &[(Key, Value)] {
        self.subject.as_array().unwrap_or(&[])
    }

    fn has_key(&self, key: &Key) -> bool {
        let key = key.normalized();
        self.entries().iter().any(|(k, _)| k.normalized() == key)
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

    /// Switch to dot-notation checks over the same array
    pub fn dot_notated(self, cache: &PathCache) -> DotNotatedAssertions<'_> {
        DotNotatedAssertions::new(self.subject, cache)
    }

    /// Every element has the type `type_name`: a primitive (`int`, `string`,
    /// ...), `callable` for closures, or a type path matched by its last
    /// segments
    #[track_caller]
    pub fn of(self, type_name: &str) -> Result<Self> {
        let expected = ElementType::parse(type_name)?;
        let offender = self
            .entries()
            .iter()
            .map(|(_, value)| value)
            .find(|value| !expected.accepts(value))
            .map(dump);

        self.check(
            "of",
            offender.is_none(),
            "Expected array of {type}, found {value}.",
            |_| {
                Args::new()
                    .with("type", type_name)
                    .with("value", offender.unwrap_or_default())
            },
        )
    }

    #[track_caller]
    pub fn values_satisfy(self, condition: impl Fn(&Value) -> bool) -> Result<Self> {
        let offender = self
            .entries()
            .iter()
            .find(|(_, value)| !condition(value))
            .map(|(_, value)| dump(value));

        self.check(
            "values_satisfy",
            offender.is_none(),
            "Element {value} does not satisfy the condition.",
            |_| Args::new().with("value", offender.unwrap_or_default()),
        )
    }

    #[track_caller]
    pub fn keys_and_values_satisfy(self, condition: impl Fn(&Key, &Value) -> bool) -> Result<Self> {
        let offender = self
            .entries()
            .iter()
            .find(|(key, value)| !condition(key, value))
            .map(|(key, value)| (dump(&Value::from(key.clone())), dump(value)));
        let passed = offender.is_none();

        self.check(
            "keys_and_values_satisfy",
            passed,
            "Element with key {key} and value {value} does not satisfy the condition.",
            |_| {
                let (key, value) = offender.unwrap_or_default();
                Args::new().with("key", key).with("value", value)
            },
        )
    }

    #[track_caller]
    pub fn key_exists(self, key: impl Into<Key>) -> Result<Self> {
        let key = key.into();
        let passed = self.has_key(&key);
        self.check("key_exists", passed, "Key {key} doesn't exist.", |_| {
            Args::new().with("key", dump(&Value::from(key)))
        })
    }

    #[track_caller]
    pub fn keys_exist<I>(self, keys: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Key>,
    {
        let missing: Vec<Value> = keys
            .into_iter()
            .map(Into::into)
            .filter(|key| !self.has_key(key))
            .map(Value::from)
            .collect();

        self.check(
            "keys_exist",
            missing.is_empty(),
            "Array {subject} doesn't contain the following key(s): {missing}.",
            |chain| {
                Args::new()
                    .with("subject", chain.subject.clone())
                    .with("missing", list(&missing))
            },
        )
    }

    #[track_caller]
    pub fn key_does_not_exist(self, key: impl Into<Key>) -> Result<Self> {
        let key = key.into();
        let passed = !self.has_key(&key);
        self.check(
            "key_does_not_exist",
            passed,
            "Key {key} exists, but must not.",
            |_| Args::new().with("key", dump(&Value::from(key))),
        )
    }

    #[track_caller]
    pub fn not_empty(self) -> Result<Self> {
        let passed = !self.entries().is_empty();
        self.check("not_empty", passed, "Array is empty.", |chain| {
            Args::new().with("subject", chain.subject.clone())
        })
    }

    /// Keys are exactly `0..n` in order
    #[track_caller]
    pub fn indexed(self) -> Result<Self> {
        let passed = self.subject.is_sequential();
        self.check(
            "indexed",
            passed,
            "Array {subject} is not indexed (contains string keys or order of numeric keys is broken).",
            |chain| Args::new().with("subject", chain.subject.clone()),
        )
    }

    /// Some element is strictly equal to `needle`
    #[track_caller]
    pub fn contains(self, needle: impl Into<Value>) -> Result<Self> {
        let needle = needle.into();
        let passed = self.entries().iter().any(|(_, value)| value.identical(&needle));
        self.check(
            "contains",
            passed,
            "Array {subject} does not contain value {needle}.",
            |chain| {
                Args::new()
                    .with("subject", chain.subject.clone())
                    .with("needle", dump(&needle))
            },
        )
    }

    /// No two elements are the same. Objects exposing a unique hash are
    /// compared by it, other objects by their snapshot.
    #[track_caller]
    pub fn unique(self) -> Result<Self> {
        let mut seen: Vec<(&Key, Identity<'_>)> = Vec::with_capacity(self.entries().len());
        let mut duplicate = None;

        for (key, value) in self.entries() {
            let identity = Identity::of(value)?;
            if let Some((first, _)) = seen.iter().find(|(_, other)| other.same_as(&identity)) {
                let shown = match &identity {
                    Identity::Hash(hash) => format!("{}:{hash}", dump(value)),
                    _ => dump(value),
                };
                duplicate = Some((shown, Value::list([(*first).clone(), key.clone()])));
                break;
            }
            seen.push((key, identity));
        }

        self.check(
            "unique",
            duplicate.is_none(),
            "Array contains non-unique values, at least this one: {duplicate}.",
            |chain| {
                let (shown, keys) = duplicate.unwrap_or((String::new(), Value::Null));
                Args::new()
                    .with("subject", chain.subject.clone())
                    .with("duplicate", shown)
                    .with("keys", keys)
            },
        )
    }
}

/// Checks addressing nested keys with dot paths, see [`crate::DotPath`]
#[derive(Debug, Clone)]
pub struct DotNotatedAssertions<'c> {
    subject: Value,
    dots: DotPath<'c>,
    template: Template,
}

impl<'c> DotNotatedAssertions<'c> {
    pub const TYPE_NAME: &'static str = "contract_assert::DotNotatedAssertions";

    pub(crate) fn new(subject: Value, cache: &'c PathCache) -> Self {
        Self {
            subject,
            dots: DotPath::new(cache),
            template: Template::default(),
        }
    }

    #[must_use]
    pub fn message(mut self, template: impl Into<String>) -> Self {
        self.template.set(template);
        self
    }

    pub fn subject(&self) -> &Value {
        &self.subject
    }

    /// Value at `path`, if any
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.dots.get(&self.subject, path).ok()
    }

    #[track_caller]
    fn check(
        self,
        function: &'static str,
        passed: bool,
        default: &str,
        args: impl FnOnce() -> Args,
    ) -> Result<Self> {
        let _frame = enter_call(Self::TYPE_NAME, InvocationKind::Instance, function);
        if passed {
            return Ok(self);
        }
        Err(failure(self.template.or(default), |_| {
            args().with("subject", self.subject.clone())
        }))
    }

    #[track_caller]
    pub fn key_exists(self, key: &str) -> Result<Self> {
        let passed = self.dots.exists(&self.subject, key);
        self.check(
            "key_exists",
            passed,
            "Array {subject} doesn't contain \"{key}\" (using dot notation).",
            || Args::new().with("key", key),
        )
    }

    #[track_caller]
    pub fn keys_exist<I>(self, keys: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let missing: Vec<Value> = keys
            .into_iter()
            .filter_map(|key| {
                let key: &str = key.as_ref();
                (!self.dots.exists(&self.subject, key)).then(|| Value::from(key))
            })
            .collect();

        self.check(
            "keys_exist",
            missing.is_empty(),
            "Array {subject} doesn't contain the following key(s): {missing} (using dot notation).",
            || Args::new().with("missing", list(&missing)),
        )
    }

    #[track_caller]
    pub fn key_does_not_exist(self, key: &str) -> Result<Self> {
        let passed = !self.dots.exists(&self.subject, key);
        self.check(
            "key_does_not_exist",
            passed,
            "Array {subject} DOES contain key \"{key}\", but must not.",
            || Args::new().with("key", key),
        )
    }
}
