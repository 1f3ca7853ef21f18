//! Resolution stack guarding against cyclic provider graphs.

use std::cell::RefCell;
use std::fmt;
use std::panic;

use crate::signature::Signature;

// Thread-local stack of signatures currently being resolved
thread_local! {
    static RESOLUTION_TLS: RefCell<Vec<Signature>> = const { RefCell::new(Vec::new()) };
}

/// Panic payload raised when provider discovery re-enters a signature it is
/// already resolving.
///
/// A cycle between provider methods can never terminate, so it is fatal:
/// the payload is never converted into a [`GraphError`](crate::GraphError).
/// Provider discovery writes no instance cache, so unwinding leaves every
/// graph consistent.
///
/// Example path: `["A", "B", "A"]`
#[derive(Debug)]
pub struct UnboundedRecursion {
    /// The signatures on the cycle, starting and ending with the re-entered one.
    pub path: Box<[String]>,
}

impl fmt::Display for UnboundedRecursion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unbounded recursion resolving: {}", self.path.join(" -> "))
    }
}

/// Guard for managing the thread-local resolution stack
pub(crate) struct StackGuard {
    _private: (),
}

impl StackGuard {
    pub(crate) fn new(signature: &Signature) -> Self {
        RESOLUTION_TLS.with(|tls| {
            let mut stack = tls.borrow_mut();

            // Cycle detection BEFORE pushing the new signature
            if let Some(start) = stack.iter().position(|s| s == signature) {
                let mut path: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
                path.push(signature.to_string());
                drop(stack);
                panic::panic_any(UnboundedRecursion { path: path.into_boxed_slice() });
            }

            stack.push(signature.clone());
        });

        Self { _private: () }
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        // Guards drop in reverse order, also while unwinding
        RESOLUTION_TLS.with(|tls| {
            tls.borrow_mut().pop();
        });
    }
}
