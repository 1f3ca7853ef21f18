//! Internal implementation details.

pub(crate) mod circular;
pub(crate) mod sync;

pub use circular::UnboundedRecursion;
pub(crate) use circular::StackGuard;
