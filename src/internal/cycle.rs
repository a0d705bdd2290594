//! Active-construction stack for lazy cycle detection.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};
use crate::key::Key;

const MAX_DEPTH: usize = 1024;

/// One in-flight construction. Multibinding contributions live in their own
/// namespace, so a contribution for key K and the regular binding of K are
/// distinct frames and never collide.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Frame {
    key: Key,
    multibinding: bool,
}

// Thread-local construction state. Resolution is synchronous and recursive, so
// the stack of frames currently mid-construction on this thread is exactly the
// in-flight dependency chain.
thread_local! {
    static CONSTRUCTION_TLS: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Guard keeping a key on the thread's active-construction stack.
///
/// Pops on drop, including during unwinding from a panicking constructor.
pub(crate) struct StackGuard {
    frame: Frame,
}

impl StackGuard {
    /// Pushes a frame, failing if it is already mid-construction on this
    /// thread.
    ///
    /// The error path clones the whole stack plus the repeated key, so the
    /// reported cycle reads top-down from the outermost request.
    pub(crate) fn push(key: Key, multibinding: bool) -> DiResult<Self> {
        let frame = Frame { key, multibinding };
        CONSTRUCTION_TLS.with(|tls| {
            let mut stack = tls.borrow_mut();

            if stack.iter().any(|f| f == &frame) {
                let mut path: Vec<&'static str> =
                    stack.iter().map(|f| f.key.display_name()).collect();
                path.push(key.display_name());
                return Err(DiError::CyclicDependency(path));
            }

            if stack.len() >= MAX_DEPTH {
                return Err(DiError::DepthExceeded(stack.len()));
            }

            stack.push(frame);
            Ok(())
        })?;

        Ok(Self { frame })
    }

    /// True when the regular binding for `key` is mid-construction on the
    /// current thread.
    ///
    /// Factory captures consult this: a required parameter that is currently
    /// being constructed becomes a deferred slot instead of a recursive
    /// resolve, which is what makes factory-mediated cycles legal. Required
    /// parameters always resolve against the regular namespace, so
    /// multibinding frames are not considered.
    pub(crate) fn is_active(key: &Key) -> bool {
        CONSTRUCTION_TLS.with(|tls| {
            tls.borrow()
                .iter()
                .any(|f| f.key == *key && !f.multibinding)
        })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        CONSTRUCTION_TLS.with(|tls| {
            if let Some(last) = tls.borrow_mut().pop() {
                debug_assert_eq!(last.key, self.frame.key);
            }
        });
    }
}
