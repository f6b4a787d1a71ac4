use crate::encoding::is_utf8_encoded;
use crate::value::{Key, ObjectValue, Value};
use serde::{Deserialize, Serialize};

/// Nesting depth used when no depth is given
pub const DEFAULT_DEPTH: usize = 5;

const ELLIPSIS: &str = "...";

/// Bounds applied while rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderLimits {
    /// Nesting depth of containers before they collapse to a count
    pub max_depth: usize,

    /// Text longer than this (in scalar values) gets truncated
    pub max_text_chars: usize,

    /// Scalar values kept from truncated text
    pub truncated_text_chars: usize,

    /// Bytes shown for text that is not UTF-8
    pub max_binary_bytes: usize,

    /// Elements shown per container
    pub max_elements: usize,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_DEPTH,
            max_text_chars: 45,
            truncated_text_chars: 42,
            max_binary_bytes: 10,
            max_elements: 10,
        }
    }
}

impl RenderLimits {
    /// Limits for terse one-line messages
    pub fn compact() -> Self {
        Self {
            max_depth: 2,
            max_text_chars: 24,
            truncated_text_chars: 21,
            max_elements: 5,
            ..Default::default()
        }
    }

    /// Validate limits
    pub fn validate(&self) -> Result<(), String> {
        if self.truncated_text_chars > self.max_text_chars {
            return Err(format!(
                "truncated_text_chars ({}) cannot exceed max_text_chars ({})",
                self.truncated_text_chars, self.max_text_chars
            ));
        }

        if self.max_binary_bytes == 0 {
            return Err("max_binary_bytes must be > 0".to_string());
        }

        Ok(())
    }
}

/// Value renderer bound to a set of limits
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    limits: RenderLimits,
}

impl Renderer {
    #[must_use]
    pub const fn new(limits: RenderLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub const fn limits(&self) -> &RenderLimits {
        &self.limits
    }

    /// Render with the configured depth
    #[must_use]
    pub fn render(&self, value: &Value) -> String {
        self.render_depth(value, self.limits.max_depth)
    }

    #[must_use]
    pub fn render_depth(&self, value: &Value, depth: usize) -> String {
        match value {
            Value::Text(bytes) => self.render_text(bytes),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::UInt(u) => u.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Array(entries) => {
                if depth > 0 {
                    self.render_array(entries, value.is_sequential(), depth - 1)
                } else {
                    format!("(array) {} element(s)", entries.len())
                }
            }
            Value::Object(object) => self.render_object(object, depth),
            Value::Resource(kind) => format!("resource \"{kind}\""),
        }
    }

    fn render_text(&self, bytes: &[u8]) -> String {
        if is_utf8_encoded(bytes) {
            // the prefix check guarantees valid UTF-8
            let text = String::from_utf8_lossy(bytes);
            if text.chars().count() > self.limits.max_text_chars {
                let kept: String = text.chars().take(self.limits.truncated_text_chars).collect();
                return format!("\"{kept}{ELLIPSIS}\"");
            }
            return format!("\"{text}\"");
        }

        let shown = &bytes[..bytes.len().min(self.limits.max_binary_bytes)];
        let hex: Vec<String> = shown.iter().map(|b| format!("{b:02x}")).collect();
        let more = if bytes.len() > self.limits.max_binary_bytes {
            " ..."
        } else {
            ""
        };
        format!("\\x{}{more}", hex.join("\\x"))
    }

    fn render_key(&self, key: &Key) -> String {
        match key {
            Key::Int(i) => i.to_string(),
            Key::Text(s) => self.render_text(s.as_bytes()),
        }
    }

    fn render_array(&self, entries: &[(Key, Value)], sequential: bool, depth: usize) -> String {
        let reduced = entries.len() > self.limits.max_elements;
        let shown = &entries[..entries.len().min(self.limits.max_elements)];

        let mut parts: Vec<String> = if sequential {
            shown
                .iter()
                .map(|(_, v)| self.render_depth(v, depth))
                .collect()
        } else {
            shown
                .iter()
                .map(|(k, v)| format!("{}: {}", self.render_key(k), self.render_depth(v, depth)))
                .collect()
        };

        if reduced {
            parts.push(ELLIPSIS.to_string());
        }

        if sequential {
            format!("[{}]", parts.join(", "))
        } else {
            format!("{{{}}}", parts.join(", "))
        }
    }

    fn render_object(&self, object: &ObjectValue, depth: usize) -> String {
        let label = object.label.to_string();

        if let Some(text) = &object.text {
            return format!(
                "{label} (__toString → {})",
                self.render_text(text.as_bytes())
            );
        }

        if let Some(info) = &object.debug_info {
            return format!("{label} (__debugInfo → {})", self.render_depth(info, depth));
        }

        label
    }
}

/// Render a value with default limits
#[must_use]
pub fn dump(value: &Value) -> String {
    Renderer::default().render(value)
}

/// Render a value with default limits and an explicit depth
#[must_use]
pub fn dump_with_depth(value: &Value, depth: usize) -> String {
    Renderer::default().render_depth(value, depth)
}

/// UTF-8 text as is, anything else rendered
#[must_use]
pub fn stringify(value: &Value) -> String {
    match value.as_str() {
        Some(text) => text.to_string(),
        None => dump(value),
    }
}

/// Comma separated rendering of several values
#[must_use]
pub fn list(values: &[Value]) -> String {
    values.iter().map(dump).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Describe, TypeLabel};
    use pretty_assertions::assert_eq;

    struct Point {
        x: i32,
        y: i32,
    }

    impl Describe for Point {
        fn label(&self) -> TypeLabel {
            TypeLabel::Named("geo::Point".to_string())
        }

        fn debug_info(&self) -> Option<Value> {
            Some(Value::map([("x", self.x), ("y", self.y)]))
        }
    }

    struct Email(&'static str);

    impl Describe for Email {
        fn label(&self) -> TypeLabel {
            TypeLabel::Named("mail::Email".to_string())
        }

        fn to_text(&self) -> Option<String> {
            Some(self.0.to_string())
        }

        fn debug_info(&self) -> Option<Value> {
            Some(Value::Null)
        }
    }

    struct Marker;

    impl Describe for Marker {}

    #[test]
    fn test_scalars() {
        assert_eq!(dump(&Value::Null), "null");
        assert_eq!(dump(&Value::from(true)), "true");
        assert_eq!(dump(&Value::from(false)), "false");
        assert_eq!(dump(&Value::from(-42)), "-42");
        assert_eq!(dump(&Value::from(42.5)), "42.5");
        assert_eq!(dump(&Value::from(u64::MAX)), "18446744073709551615");
    }

    #[test]
    fn test_short_text_is_quoted_unchanged() {
        assert_eq!(dump(&Value::from("hello")), "\"hello\"");
        let exact: String = "ж".repeat(45);
        assert_eq!(dump(&Value::from(exact.as_str())), format!("\"{exact}\""));
    }

    #[test]
    fn test_long_text_is_truncated_by_scalar_values() {
        let long: String = "ж".repeat(46);
        let rendered = dump(&Value::from(long.as_str()));
        let inner = rendered.trim_matches('"');
        assert!(inner.ends_with("..."));
        assert_eq!(inner.trim_end_matches("...").chars().count(), 42);
    }

    #[test]
    fn test_binary_text_is_hex_dumped() {
        assert_eq!(dump(&Value::bytes(vec![0xFF, 0x00, 0x10])), "\\xff\\x00\\x10");
        let rendered = dump(&Value::bytes(vec![0xAB; 64]));
        assert_eq!(
            rendered,
            "\\xab\\xab\\xab\\xab\\xab\\xab\\xab\\xab\\xab\\xab ..."
        );
    }

    #[test]
    fn test_rendering_rendered_text_only_quotes_again() {
        let once = dump(&Value::from("abc"));
        let twice = dump(&Value::from(once.as_str()));
        assert_eq!(twice, "\"\"abc\"\"");
    }

    #[test]
    fn test_sequential_and_keyed_arrays() {
        assert_eq!(dump(&Value::from(vec![10, 20, 30])), "[10, 20, 30]");
        assert_eq!(
            dump(&Value::map([("a", 1), ("b", 2)])),
            "{\"a\": 1, \"b\": 2}"
        );
        assert_eq!(dump(&Value::map([(1, "x"), (0, "y")])), "{1: \"x\", 0: \"y\"}");
        assert_eq!(dump(&Value::list(Vec::<Value>::new())), "[]");
    }

    #[test]
    fn test_array_element_cap() {
        let rendered = dump(&Value::from((0..12).collect::<Vec<i32>>()));
        assert_eq!(rendered, "[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, ...]");
    }

    #[test]
    fn test_depth_cut_off() {
        let nested = Value::from(vec![vec![vec![1, 2]]]);
        assert_eq!(dump_with_depth(&nested, 2), "[[(array) 2 element(s)]]");
        assert_eq!(dump_with_depth(&nested, 0), "(array) 1 element(s)");
        assert_eq!(dump(&nested), "[[[1, 2]]]");
    }

    #[test]
    fn test_objects() {
        assert_eq!(
            dump(&Value::object(&Point { x: 1, y: 2 })),
            "geo::Point (__debugInfo → {\"x\": 1, \"y\": 2})"
        );
        assert_eq!(
            dump(&Value::object(&Email("me@example.com"))),
            "mail::Email (__toString → \"me@example.com\")"
        );
        assert!(dump(&Value::object(&Marker)).ends_with("Marker"));

        let closure = || 1;
        assert_eq!(dump(&Value::opaque(&closure)), "[anonymous class]");
    }

    #[test]
    fn test_resource() {
        assert_eq!(dump(&Value::resource("stream")), "resource \"stream\"");
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&Value::from("as is")), "as is");
        assert_eq!(stringify(&Value::from(vec![1, 2])), "[1, 2]");
        assert_eq!(stringify(&Value::bytes(vec![0xFF])), "\\xff");
    }

    #[test]
    fn test_list() {
        assert_eq!(
            list(&[Value::from("a"), Value::from(1), Value::Null]),
            "\"a\", 1, null"
        );
    }

    #[test]
    fn test_limits_validation() {
        assert!(RenderLimits::default().validate().is_ok());
        assert!(RenderLimits::compact().validate().is_ok());
        let broken = RenderLimits {
            truncated_text_chars: 50,
            ..Default::default()
        };
        assert!(broken.validate().is_err());
    }

    #[test]
    fn test_compact_limits() {
        let renderer = Renderer::new(RenderLimits::compact());
        assert_eq!(
            renderer.render(&Value::from((0..7).collect::<Vec<i32>>())),
            "[0, 1, 2, 3, 4, ...]"
        );
    }
}
