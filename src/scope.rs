//! Scope tags.

use std::fmt;

use crate::key::TypeKey;

/// Identifies which graph in a parent chain owns the memoized instances of a
/// scoped binding.
///
/// Any `'static` marker type can act as a scope:
///
/// ```rust
/// use ferrous_graph::{ObjectGraph, ScopeTag, Singleton};
///
/// struct RequestScope;
///
/// let root = ObjectGraph::builder().scope::<Singleton>().build().unwrap();
/// let request = root.child().scope::<RequestScope>().build().unwrap();
///
/// assert_eq!(root.scope(), Some(ScopeTag::of::<Singleton>()));
/// assert_eq!(request.scope(), Some(ScopeTag::of::<RequestScope>()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeTag {
    key: TypeKey,
}

impl ScopeTag {
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self { key: TypeKey::of::<S>() }
    }

    pub fn name(&self) -> &'static str {
        self.key.name()
    }
}

impl fmt::Display for ScopeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Built-in scope, conventionally declared by the root graph.
#[derive(Debug, Clone, Copy)]
pub struct Singleton;
