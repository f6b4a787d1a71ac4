//! # Contract Assert
//!
//! Runtime contract checks whose failures describe themselves.
//!
//! ## Architecture
//!
//! ```text
//! Assert::is_true(42 == 43)           #[track_caller] entry, frame pushed
//!     │
//!     ├──> passed ──> Ok(())
//!     │
//!     └──> failed ──> DiagnosticAssembler
//!            ├─ explicit template ──> fstr(template, args)
//!            └─ no template
//!                 ├─ CallTrace::capture_current()
//!                 ├─ top frame of contract_assert::Assert
//!                 ├─ CallSiteReconstruction → "Assert::is_true(42 == 43)"
//!                 └─ "{assertion} failed in {file} at line {line}."
//!                    (or "Assertion failed." with the cause attached)
//! ```
//!
//! Fluent chains (`numeric`, `float`, `string`, `string_8bit`,
//! `string_binary`, `array`) return the chain on success so checks compose
//! with `?`.
//!
//! ## Example
//!
//! ```rust
//! use contract_assert::{Assert, PathCache};
//!
//! fn main() -> Result<(), contract_assert::AssertionError> {
//!     Assert::numeric(42)?.positive()?.between(1, 100)?;
//!     Assert::string("order-42")?.starts_with("order-")?.length_max(16)?;
//!
//!     let err = Assert::array(vec![1, 2, 1])?.unique().unwrap_err();
//!     assert_eq!(
//!         err.to_string(),
//!         "Array contains non-unique values, at least this one: 1."
//!     );
//!
//!     let cache = PathCache::new();
//!     let config = contract_assert::Value::map([("db", contract_assert::Value::map([("port", 5432)]))]);
//!     Assert::array(config)?.dot_notated(&cache).key_exists("db.port")?;
//!     Ok(())
//! }
//! ```

mod array;
mod chain;
mod config;
mod diagnostic;
mod dot_path;
mod error;
mod facade;
mod numeric;
mod string;

pub use array::{ArrayAssertions, DotNotatedAssertions};
pub use config::{ConfigError, DiagnosticsConfig, DEFAULT_PATH_CACHE_CAPACITY};
pub use diagnostic::{Diagnostic, DiagnosticAssembler, DEFAULT_TEMPLATE, FALLBACK_MESSAGE};
pub use dot_path::{DotPath, DotPathError, PathCache};
pub use error::{ensure, AssertionContainsError, AssertionError, AssertionFailed, Result};
pub use facade::Assert;
pub use numeric::{FloatAssertions, NumericAssertions};
pub use string::{BinaryStringAssertions, Encoding, StringAssertions};

pub use contract_dump::{Args, Describe, Key, TypeLabel, Value};
pub use contract_trace::{CallTrace, Traced};
