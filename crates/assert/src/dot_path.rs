//! Dot-notation access to nested arrays.
//!
//! `"foo.bar"` addresses `array["foo"]["bar"]`. A literal dot or backslash
//! inside a key is escaped: `"foo\.bar.baz"` addresses `array["foo.bar"]["baz"]`.
//! Empty segments are skipped, so `"a..b"` is `"a.b"`.

use crate::config::{DiagnosticsConfig, DEFAULT_PATH_CACHE_CAPACITY};
use contract_dump::{dump, Key, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

static SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:[^\\.]|\\.)+").expect("segment pattern is valid"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DotPathError {
    #[error("Key \"{path}\" (segment \"{segment}\") does not exist or contains non-array.")]
    Missing { path: String, segment: String },

    #[error("Key \"{path}\" (segment \"{segment}\") contains non-array: {found}.")]
    NotAnArray {
        path: String,
        segment: String,
        found: String,
    },

    #[error("Key \"{0}\" has no segments.")]
    Empty(String),

    #[error("Dot notation applies to arrays only, got {0}.")]
    NotAnArrayRoot(String),
}

/// Memoised segment lists of dot paths.
///
/// Dropped wholesale when an insertion would exceed the capacity.
#[derive(Debug)]
pub struct PathCache {
    segments: Mutex<HashMap<String, Arc<[String]>>>,
    capacity: usize,
    resets: AtomicUsize,
}

impl Default for PathCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_PATH_CACHE_CAPACITY)
    }
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            segments: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            resets: AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &DiagnosticsConfig) -> Self {
        Self::with_capacity(config.path_cache_capacity)
    }

    /// Segments of `path`, unescaped
    pub fn segments(&self, path: &str) -> Arc<[String]> {
        // the map only holds derived data, so a poisoned lock is still usable
        let mut segments = self.segments.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = segments.get(path) {
            return Arc::clone(cached);
        }

        if segments.len() >= self.capacity {
            segments.clear();
            let resets = self.resets.fetch_add(1, Ordering::Relaxed) + 1;
            log::debug!("Dot path cache cleared after {} entries ({resets} reset(s))", self.capacity);
        }

        let parsed: Arc<[String]> = split(path).into();
        segments.insert(path.to_string(), Arc::clone(&parsed));
        parsed
    }

    pub fn len(&self) -> usize {
        self.segments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// How many times the cache was cleared for being full
    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::Relaxed)
    }
}

fn split(path: &str) -> Vec<String> {
    SEGMENT
        .find_iter(path)
        .map(|m| unescape(m.as_str()))
        .collect()
}

fn unescape(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('.' | '\\')) => out.push(next),
                Some(next) => {
                    out.push(c);
                    out.push(next);
                }
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn entry<'v>(entries: &'v [(Key, Value)], key: &Key) -> Option<&'v Value> {
    entries
        .iter()
        .find(|(k, _)| k.normalized() == *key)
        .map(|(_, v)| v)
}

fn entries_mut<'v>(
    current: &'v mut Value,
    path: &str,
    segment: &str,
) -> Result<&'v mut Vec<(Key, Value)>, DotPathError> {
    match current {
        Value::Array(entries) => Ok(entries),
        other => Err(DotPathError::NotAnArray {
            path: path.to_string(),
            segment: segment.to_string(),
            found: dump(other),
        }),
    }
}

/// Dot-notation reads and writes over [`Value::Array`]s
#[derive(Debug, Clone, Copy)]
pub struct DotPath<'c> {
    cache: &'c PathCache,
}

impl<'c> DotPath<'c> {
    pub const fn new(cache: &'c PathCache) -> Self {
        Self { cache }
    }

    pub fn get<'v>(&self, array: &'v Value, path: &str) -> Result<&'v Value, DotPathError> {
        let mut current = array;
        for segment in self.cache.segments(path).iter() {
            let key = Key::parse(segment);
            current = current
                .as_array()
                .and_then(|entries| entry(entries, &key))
                .ok_or_else(|| DotPathError::Missing {
                    path: path.to_string(),
                    segment: segment.clone(),
                })?;
        }
        Ok(current)
    }

    pub fn exists(&self, array: &Value, path: &str) -> bool {
        self.get(array, path).is_ok()
    }

    /// Store `value` at `path`, creating missing (or null) intermediate arrays
    pub fn set(&self, array: &mut Value, path: &str, value: Value) -> Result<(), DotPathError> {
        let segments = self.cache.segments(path);
        let Some((last, parents)) = segments.split_last() else {
            return Err(DotPathError::Empty(path.to_string()));
        };

        if array.as_array().is_none() {
            return Err(DotPathError::NotAnArrayRoot(dump(array)));
        }

        let mut current = array;
        for segment in parents {
            let key = Key::parse(segment);
            let entries = entries_mut(current, path, segment)?;

            let index = match entries.iter().position(|(k, _)| k.normalized() == key) {
                Some(index) => index,
                None => {
                    entries.push((key, Value::Array(Vec::new())));
                    entries.len() - 1
                }
            };
            let slot = &mut entries[index].1;
            if slot.is_null() {
                *slot = Value::Array(Vec::new());
            }
            current = slot;
        }

        let entries = entries_mut(current, path, last)?;
        let key = Key::parse(last);
        match entries.iter().position(|(k, _)| k.normalized() == key) {
            Some(index) => entries[index].1 = value,
            None => entries.push((key, value)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Value {
        Value::map([
            ("foo", Value::from(42)),
            ("bar", Value::map([("baz", 666)])),
        ])
    }

    #[test]
    fn test_get_set_exists() {
        let cache = PathCache::new();
        let dots = DotPath::new(&cache);
        let mut array = sample();

        assert_eq!(dots.get(&array, "foo").unwrap(), &Value::from(42));
        assert_eq!(dots.get(&array, "bar.baz").unwrap(), &Value::from(666));

        dots.set(&mut array, "bar.qux", Value::from(777)).unwrap();
        assert_eq!(
            dots.get(&array, "bar").unwrap(),
            &Value::map([("baz", 666), ("qux", 777)])
        );

        assert!(dots.exists(&array, "foo"));
        assert!(!dots.exists(&array, "foo.bar"));
        assert!(dots.exists(&array, "bar.baz"));
        assert!(dots.exists(&array, "bar.qux"));
    }

    #[test]
    fn test_escapes_and_empty_segments() {
        assert_eq!(split(r"foo\.bar.baz"), vec!["foo.bar", "baz"]);
        assert_eq!(split(r"a\\.b"), vec![r"a\", "b"]);
        assert_eq!(split("a..b."), vec!["a", "b"]);
        assert_eq!(split(""), Vec::<String>::new());

        let cache = PathCache::new();
        let dots = DotPath::new(&cache);
        let array = Value::map([("foo.bar", Value::map([("baz", 1)]))]);
        assert!(dots.exists(&array, r"foo\.bar.baz"));
        assert!(!dots.exists(&array, "foo.bar.baz"));
    }

    #[test]
    fn test_numeric_segments_match_integer_keys() {
        let cache = PathCache::new();
        let dots = DotPath::new(&cache);
        let array = Value::map([("items", Value::from(vec!["a", "b"]))]);
        assert_eq!(dots.get(&array, "items.1").unwrap(), &Value::from("b"));
        assert!(!dots.exists(&array, "items.01"));
    }

    #[test]
    fn test_set_creates_and_rejects() {
        let cache = PathCache::new();
        let dots = DotPath::new(&cache);
        let mut array = Value::map([("leaf", 1)]);

        dots.set(&mut array, "a.b.c", Value::from(true)).unwrap();
        assert_eq!(dots.get(&array, "a.b.c").unwrap(), &Value::from(true));

        let err = dots.set(&mut array, "leaf.x", Value::Null).unwrap_err();
        assert_eq!(
            err,
            DotPathError::NotAnArray {
                path: "leaf.x".to_string(),
                segment: "x".to_string(),
                found: "1".to_string(),
            }
        );

        assert_eq!(
            dots.set(&mut array, "..", Value::Null),
            Err(DotPathError::Empty("..".to_string()))
        );
        assert!(matches!(
            dots.set(&mut Value::from(3), "a", Value::Null),
            Err(DotPathError::NotAnArrayRoot(_))
        ));
    }

    #[test]
    fn test_missing_segment_error() {
        let cache = PathCache::new();
        let err = DotPath::new(&cache).get(&sample(), "bar.nope").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Key \"bar.nope\" (segment \"nope\") does not exist or contains non-array."
        );
    }

    #[test]
    fn test_cache_is_cleared_when_full() {
        let cache = PathCache::with_capacity(2);
        cache.segments("a");
        cache.segments("b");
        cache.segments("a");
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.resets(), 0);

        cache.segments("c");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.resets(), 1);
        assert_eq!(cache.capacity(), 2);
    }

    #[test]
    fn test_cache_survives_poisoning() {
        let cache = PathCache::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = cache.segments.lock().unwrap();
            panic!("poison");
        }));
        assert_eq!(&*cache.segments("x.y"), ["x", "y"]);
    }
}
