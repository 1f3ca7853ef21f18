//! Signature model: what an injection point requires.

use std::fmt;

use crate::inject::Injected;
use crate::key::TypeKey;
use crate::qualifier::QualifierKey;

/// Null-handling policy of an injection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Nullability {
    #[default]
    NonNull,
    Nullable,
}

/// How a declared type accesses its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// `Arc<T>`: the provider is invoked during injection
    Instance,
    /// `Provider<T>`: the provider itself is injected
    Provider,
    /// `Lazy<T>`: a memoizing wrapper private to the injection site
    Lazy,
}

/// The declared type of a field or parameter.
///
/// Wrapper types are reduced to their single type argument: a declared
/// `Provider<u32>` targets `u32` with [`Access::Provider`]. Only an
/// optional declared type (`Option<..>`) can hold an absent value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredType {
    target: TypeKey,
    access: Access,
    optional: bool,
    name: &'static str,
}

impl DeclaredType {
    pub fn new(target: TypeKey, access: Access, name: &'static str) -> Self {
        Self {
            target,
            access,
            optional: false,
            name,
        }
    }

    /// Declared type of `D`.
    pub fn of<D: Injected>() -> Self {
        Self {
            optional: D::NULLABLE,
            ..Self::new(TypeKey::of::<D::Target>(), D::ACCESS, std::any::type_name::<D>())
        }
    }

    /// Marks the declared type as able to hold an absent value.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn target(&self) -> TypeKey {
        self.target
    }

    pub fn access(&self) -> Access {
        self.access
    }

    /// Name of the declared type including wrappers.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Identifies what must be injected: target type, optional qualifier and
/// nullability.
///
/// Two signatures are equal iff type and qualifier match; nullability only
/// affects how a missing binding is handled.
///
/// # Examples
///
/// ```rust
/// use ferrous_graph::{Signature, Nullability, QualifierKey};
///
/// let required = Signature::of::<u32>();
/// let optional = Signature::of::<u32>().with_nullability(Nullability::Nullable);
/// assert_eq!(required, optional);
///
/// let named = Signature::of::<u32>().with_qualifier(QualifierKey::new("port"));
/// assert_ne!(required, named);
/// ```
#[derive(Debug, Clone)]
pub struct Signature {
    type_key: TypeKey,
    qualifier: Option<QualifierKey>,
    nullability: Nullability,
}

impl Signature {
    pub fn new(type_key: TypeKey, qualifier: Option<QualifierKey>, nullability: Nullability) -> Self {
        Self { type_key, qualifier, nullability }
    }

    /// Unqualified, non-null signature of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeKey::of::<T>(), None, Nullability::NonNull)
    }

    pub fn with_qualifier(mut self, qualifier: QualifierKey) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    pub fn with_nullability(mut self, nullability: Nullability) -> Self {
        self.nullability = nullability;
        self
    }

    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    pub fn qualifier(&self) -> Option<&QualifierKey> {
        self.qualifier.as_ref()
    }

    pub fn has_qualifier(&self) -> bool {
        self.qualifier.is_some()
    }

    pub fn nullability(&self) -> Nullability {
        self.nullability
    }

    pub fn is_nullable(&self) -> bool {
        self.nullability == Nullability::Nullable
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.type_key == other.type_key && self.qualifier == other.qualifier
    }
}

impl Eq for Signature {}

impl std::hash::Hash for Signature {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_key.hash(state);
        self.qualifier.hash(state);
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "@{} {}", qualifier, self.type_key)?,
            None => write!(f, "{}", self.type_key)?,
        }
        if self.is_nullable() {
            f.write_str(" (nullable)")?;
        }
        Ok(())
    }
}
