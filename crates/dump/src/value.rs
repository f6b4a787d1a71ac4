use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Key of an [`Value::Array`] entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Text(String),
}

impl Key {
    /// Integer position if this is an integer key
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Text(_) => None,
        }
    }

    /// Text in canonical decimal form (`"7"`, `"-3"`, not `"07"` or `"+3"`)
    /// becomes an integer key, like array keys of dynamic languages do
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let digits = text.strip_prefix('-').unwrap_or(text);
        let canonical = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && (digits == "0" || !digits.starts_with('0'))
            && text != "-0";
        if canonical {
            if let Ok(i) = text.parse::<i64>() {
                return Self::Int(i);
            }
        }
        Self::Text(text.to_string())
    }

    /// Same key after canonical decimal text is turned into an integer
    #[must_use]
    pub fn normalized(&self) -> Self {
        match self {
            Self::Int(i) => Self::Int(*i),
            Self::Text(s) => Self::parse(s),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Int(i) => Self::Int(i),
            Key::Text(s) => Self::Text(s.into_bytes()),
        }
    }
}

macro_rules! key_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Key {
            fn from(v: $t) -> Self {
                Self::Int(i64::from(v))
            }
        })*
    };
}

key_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for Key {
    fn from(v: usize) -> Self {
        i64::try_from(v).map_or_else(|_| Self::Text(v.to_string()), Self::Int)
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Display name of an object value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeLabel {
    /// Fully qualified name of a nameable type
    Named(String),
    /// A type without a name (closures), with the relations it declares
    Anonymous {
        parent: Option<String>,
        interfaces: Vec<String>,
    },
}

impl TypeLabel {
    /// Label of `T`, anonymous for closure types
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        Self::from_type_name(std::any::type_name::<T>())
    }

    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        if name.contains("{{closure}}") {
            Self::anonymous()
        } else {
            Self::Named(name.to_string())
        }
    }

    #[must_use]
    pub const fn anonymous() -> Self {
        Self::Anonymous {
            parent: None,
            interfaces: Vec::new(),
        }
    }

    /// Builder: record the parent of an anonymous type
    #[must_use]
    pub fn extends(self, parent: impl Into<String>) -> Self {
        match self {
            Self::Anonymous { interfaces, .. } => Self::Anonymous {
                parent: Some(parent.into()),
                interfaces,
            },
            named @ Self::Named(_) => named,
        }
    }

    /// Builder: record an interface implemented by an anonymous type
    #[must_use]
    pub fn implements(self, interface: impl Into<String>) -> Self {
        match self {
            Self::Anonymous {
                parent,
                mut interfaces,
            } => {
                interfaces.push(interface.into());
                Self::Anonymous { parent, interfaces }
            }
            named @ Self::Named(_) => named,
        }
    }

    /// Type name, `None` for anonymous types
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Anonymous { .. } => None,
        }
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Anonymous { parent, interfaces } => {
                f.write_str("[anonymous class")?;
                if let Some(parent) = parent {
                    write!(f, " extends {parent}")?;
                }
                if !interfaces.is_empty() {
                    write!(f, " implements {}", interfaces.join(", "))?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Optional capabilities a type can expose to the renderer.
///
/// Every method has a default, so implementing the trait with an empty body
/// yields a value rendered by its type name only.
pub trait Describe {
    fn label(&self) -> TypeLabel {
        TypeLabel::of::<Self>()
    }

    /// Text form of the value (rendered as `(__toString → ...)`)
    fn to_text(&self) -> Option<String> {
        None
    }

    /// Debug structure of the value (rendered as `(__debugInfo → ...)`)
    fn debug_info(&self) -> Option<Value> {
        None
    }

    /// Stable identity used by uniqueness checks
    fn unique_hash(&self) -> Option<String> {
        None
    }
}

/// Snapshot of a composite value taken through [`Describe`]
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    pub label: TypeLabel,
    pub text: Option<String>,
    pub debug_info: Option<Value>,
    pub unique_hash: Option<String>,
}

impl ObjectValue {
    #[must_use]
    pub const fn new(label: TypeLabel) -> Self {
        Self {
            label,
            text: None,
            debug_info: None,
            unique_hash: None,
        }
    }

    pub fn describe<T: Describe + ?Sized>(value: &T) -> Self {
        Self {
            label: value.label(),
            text: value.to_text(),
            debug_info: value.debug_info(),
            unique_hash: value.unique_hash(),
        }
    }
}

/// A runtime value as seen by the renderer and the assertions.
///
/// `Array` is an ordered keyed container: a list is an array whose keys are
/// `0..n` in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(Vec<u8>),
    Array(Vec<(Key, Value)>),
    Object(Box<ObjectValue>),
    Resource(String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into().into_bytes())
    }

    /// Raw bytes, possibly not UTF-8
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Self::Text(b.into())
    }

    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (Key::from(i), v.into()))
                .collect(),
        )
    }

    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        Self::Array(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn object<T: Describe + ?Sized>(value: &T) -> Self {
        Self::Object(Box::new(ObjectValue::describe(value)))
    }

    /// Object whose text capability is its `Display` output
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        let mut object = ObjectValue::new(TypeLabel::of::<T>());
        object.text = Some(value.to_string());
        Self::Object(Box::new(object))
    }

    /// Object known only by its type (closures render as anonymous)
    pub fn opaque<T: ?Sized>(_value: &T) -> Self {
        Self::Object(Box::new(ObjectValue::new(TypeLabel::of::<T>())))
    }

    pub fn resource(kind: impl Into<String>) -> Self {
        Self::Resource(kind.into())
    }

    /// Kind name used in type checks and messages
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "double",
            Self::Text(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Resource(_) => "resource",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Scalars are interpolated verbatim into messages
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Bool(_) | Self::Int(_) | Self::UInt(_) | Self::Float(_) | Self::Text(_)
        )
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Text(b) => Some(b),
            _ => None,
        }
    }

    /// Text content when it is valid UTF-8
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[(Key, Value)]> {
        match self {
            Self::Array(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<(Key, Value)>> {
        match self {
            Self::Array(entries) => Some(entries),
            _ => None,
        }
    }

    /// Entry of an array by key
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.as_array()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Numbers and numeric text as `f64`
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f64),
            #[allow(clippy::cast_precision_loss)]
            Self::UInt(u) => Some(*u as f64),
            Self::Float(f) => Some(*f),
            Self::Text(_) => self
                .as_str()?
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }

    /// Keys are exactly `0..n` in order
    #[must_use]
    pub fn is_sequential(&self) -> bool {
        self.as_array().is_some_and(|entries| {
            entries
                .iter()
                .enumerate()
                .all(|(i, (k, _))| k.as_int().and_then(|k| usize::try_from(k).ok()) == Some(i))
        })
    }

    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::UInt(u) => *u != 0,
            Self::Float(f) => *f != 0.0,
            Self::Text(b) => !(b.is_empty() || b.as_slice() == b"0"),
            Self::Array(entries) => !entries.is_empty(),
            Self::Object(_) | Self::Resource(_) => true,
        }
    }

    /// Strict equality where signed and unsigned integers of the same value
    /// are the same integer
    #[must_use]
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Int(i), Self::UInt(u)) | (Self::UInt(u), Self::Int(i)) => {
                u64::try_from(*i).is_ok_and(|i| i == *u)
            }
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.identical(vb))
            }
            _ => self == other,
        }
    }

    /// Equality after type juggling (numbers vs numeric text, truthiness of
    /// booleans and null); strict equality is `==`.
    #[must_use]
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Bool(b), v) | (v, Self::Bool(b)) => *b == v.truthy(),
            (Self::Null, v) | (v, Self::Null) => !v.truthy(),
            (Self::Text(a), Self::Text(b)) => {
                a == b || matches!((self.as_f64(), other.as_f64()), (Some(x), Some(y)) if x == y)
            }
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| other.get(k).is_some_and(|w| v.loosely_equals(w)))
            }
            (Self::Object(a), Self::Object(b)) => a.label == b.label && a.text == b.text,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => self == other,
            },
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! value_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Self::Int(i64::from(v))
            }
        })*
    };
}

macro_rules! value_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Self::UInt(u64::from(v))
            }
        })*
    };
}

value_from_signed!(i8, i16, i32, i64);
value_from_unsigned!(u8, u16, u32, u64);

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        i64::try_from(v).map_or_else(|_| Self::Float(v as f64), Self::Int)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        u64::try_from(v).map_or_else(|_| Self::Float(v as f64), Self::UInt)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::text(v.to_string())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::text(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v.into_bytes())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Self::text(v.as_str())
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Null
    }
}

impl From<ObjectValue> for Value {
    fn from(v: ObjectValue) -> Self {
        Self::Object(Box::new(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::list(v)
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(v: &[T]) -> Self {
        Self::list(v.iter().cloned())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Self::list(v)
    }
}

impl<K: Into<Key>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(v: BTreeMap<K, V>) -> Self {
        Self::map(v)
    }
}

impl<K: Into<Key>, V: Into<Value>, S> From<HashMap<K, V, S>> for Value {
    fn from(v: HashMap<K, V, S>) -> Self {
        let mut entries: Vec<(Key, Value)> =
            v.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Self::Array(entries)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else {
                    n.as_f64().map_or(Self::Null, Self::Float)
                }
            }
            serde_json::Value::String(s) => Self::from(s),
            serde_json::Value::Array(items) => Self::list(items),
            serde_json::Value::Object(map) => Self::map(map),
        }
    }
}
