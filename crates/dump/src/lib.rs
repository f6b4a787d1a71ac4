//! # Contract Dump
//!
//! Bounded, human-readable rendering of arbitrary values and the message
//! interpolation used by every assertion failure.
//!
//! ## Architecture
//!
//! ```text
//! Rust value ──> Value (closed model: scalars, text, arrays, objects, resources)
//!                  │
//!                  ├──> dump()      depth / element / length bounded, encoding aware
//!                  ├──> stringify() text verbatim, everything else dumped
//!                  └──> fstr()      "{name}" placeholders, one pass
//! ```
//!
//! ## Example
//!
//! ```rust
//! use contract_dump::{dump, fstr, Args, Value};
//!
//! assert_eq!(dump(&Value::from(vec![10, 20, 30])), "[10, 20, 30]");
//!
//! let args = Args::new().with("x", 1).with("y", "z");
//! assert_eq!(fstr("{x} and {y}", &args), "1 and z");
//! ```

mod encoding;
mod render;
mod template;
mod value;

pub use encoding::{first_non_utf8_sequence, is_utf8_encoded, InvalidSequence};
pub use render::{dump, dump_with_depth, list, stringify, RenderLimits, Renderer, DEFAULT_DEPTH};
pub use template::{fstr, fstr_with, Args};
pub use value::{Describe, Key, ObjectValue, TypeLabel, Value};
