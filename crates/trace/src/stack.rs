use crate::error::{Result, TraceError};
use crate::frame::Frame;
use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
    static FRAMES: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Keeps a frame on the shadow stack until dropped.
///
/// Dropping truncates the stack back to the height it had before the push,
/// so frames leaked by a panicking callee are discarded too.
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct FrameGuard {
    height: usize,
    // bound to the thread that owns the stack
    _not_send: PhantomData<*const ()>,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        let height = self.height;
        // the thread-local may already be gone during thread teardown
        let _ = FRAMES.try_with(|frames| frames.borrow_mut().truncate(height));
    }
}

/// Push a frame on the current thread's shadow stack
pub fn enter(frame: Frame) -> FrameGuard {
    let height = FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        let height = frames.len();
        log::trace!("enter {frame}");
        frames.push(frame);
        height
    });

    FrameGuard {
        height,
        _not_send: PhantomData,
    }
}

/// Number of frames currently on the shadow stack
#[must_use]
pub fn depth() -> usize {
    FRAMES.with(|frames| frames.borrow().len())
}

/// Anything that carries the trace captured when it was created
pub trait Traced {
    fn call_trace(&self) -> &CallTrace;
}

/// Snapshot of the shadow stack, most recent call first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallTrace {
    frames: Vec<Frame>,
}

impl CallTrace {
    /// Build a trace from frames already ordered most-recent-first
    #[must_use]
    pub const fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Snapshot the current thread's shadow stack
    #[must_use]
    pub fn capture_current() -> Self {
        let frames = FRAMES.with(|frames| frames.borrow().iter().rev().cloned().collect());
        Self { frames }
    }

    /// The trace captured when `source` was created
    pub fn capture_from<T: Traced + ?Sized>(source: &T) -> Self {
        source.call_trace().clone()
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// First frame, in capture order, declared by `type_name`
    pub fn find_top_frame_of_type(&self, type_name: &str) -> Result<&Frame> {
        self.frames
            .iter()
            .find(|frame| frame.declaring_type() == Some(type_name))
            .ok_or_else(|| TraceError::NotFound {
                type_name: type_name.to_string(),
                frames: self.frames.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::InvocationKind;
    use pretty_assertions::assert_eq;

    fn frame(function: &str, declaring_type: &str) -> Frame {
        Frame::new(function).declared_by(declaring_type, InvocationKind::Static)
    }

    #[test]
    fn test_capture_is_most_recent_first() {
        let _outer = enter(frame("outer", "A"));
        let _inner = enter(frame("inner", "B"));

        let trace = CallTrace::capture_current();
        let names: Vec<_> = trace.frames().iter().map(Frame::function).collect();
        assert_eq!(names, vec!["inner", "outer"]);
    }

    #[test]
    fn test_guard_pops_frame() {
        let before = depth();
        {
            let _guard = enter(frame("scoped", "A"));
            assert_eq!(depth(), before + 1);
        }
        assert_eq!(depth(), before);
    }

    #[test]
    fn test_guard_recovers_after_panic() {
        let before = depth();
        let result = std::panic::catch_unwind(|| {
            let _guard = enter(frame("panics", "A"));
            panic!("boom");
        });
        assert!(result.is_err());
        assert_eq!(depth(), before);
    }

    #[test]
    fn test_find_top_frame_of_type() {
        let trace = CallTrace::from_frames(vec![
            frame("positive", "Numbers"),
            frame("is_true", "Assert"),
            frame("is_false", "Assert"),
        ]);

        let found = trace.find_top_frame_of_type("Assert").unwrap();
        assert_eq!(found.function(), "is_true");

        let missing = trace.find_top_frame_of_type("Other").unwrap_err();
        assert_eq!(
            missing,
            TraceError::NotFound {
                type_name: "Other".to_string(),
                frames: 3
            }
        );
    }

    #[test]
    fn test_threads_have_separate_stacks() {
        let _guard = enter(frame("main", "A"));
        let other = std::thread::spawn(CallTrace::capture_current).join().unwrap();
        assert!(other.is_empty());
    }

    struct Failure {
        trace: CallTrace,
    }

    impl Traced for Failure {
        fn call_trace(&self) -> &CallTrace {
            &self.trace
        }
    }

    #[test]
    fn test_capture_from_error() {
        let failure = {
            let _guard = enter(frame("is_true", "Assert"));
            Failure {
                trace: CallTrace::capture_current(),
            }
        };
        let trace = CallTrace::capture_from(&failure);
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.frames()[0].function(), "is_true");
    }
}
