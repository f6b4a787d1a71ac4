//! # Contract Trace
//!
//! Call capture for assertion diagnostics.
//!
//! Rust has no runtime access to caller frames with their declaring types,
//! so instrumented entry points record themselves on a per-thread shadow
//! stack. `#[track_caller]` provides the file, line and column of the call.
//!
//! ```text
//! Assert::is_true(..)          #[track_caller]
//!     │
//!     ├──> Frame::here(..)     Location::caller() → file / line / column
//!     ├──> enter(frame)        push on the thread's shadow stack (guard pops)
//!     │
//!     └──> CallTrace::capture_current()
//!            most-recent-first snapshot, searched with find_top_frame_of_type()
//! ```

mod error;
mod frame;
mod stack;

pub use error::{Result, TraceError};
pub use frame::{Frame, InvocationKind};
pub use stack::{depth, enter, CallTrace, FrameGuard, Traced};
