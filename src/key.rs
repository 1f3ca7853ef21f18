//! Type keys and declaration-site identities.

use std::any::TypeId;
use std::fmt;

/// Runtime identity of a Rust type.
///
/// Pairs the `TypeId` used for lookup with the `type_name` used for
/// diagnostics. Equality, ordering and hashing only consider the `TypeId`:
/// `type_name` is not guaranteed to be unique or stable.
///
/// # Examples
///
/// ```rust
/// use ferrous_graph::TypeKey;
///
/// let a = TypeKey::of::<u32>();
/// let b = TypeKey::of::<u32>();
/// assert_eq!(a, b);
/// assert_eq!(a.name(), "u32");
/// assert_ne!(a, TypeKey::of::<i32>());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for `T`.
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type name for display.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

// Hot path: TypeId-only comparison, the name is diagnostics only
impl PartialEq for TypeKey {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::hash::Hash for TypeKey {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Helper for creating type keys.
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> TypeKey {
    TypeKey::of::<T>()
}

/// Identity of a declaration site: a field, a method or a provider method.
///
/// The owner is the type declaring the member, so a member declared on a
/// base level keeps the base type as its owner even when it is injected
/// through a derived object. Signatures are cached per `SiteId`; member names
/// must therefore be unique per owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SiteId {
    owner: TypeKey,
    member: &'static str,
}

impl SiteId {
    pub fn new(owner: TypeKey, member: &'static str) -> Self {
        Self { owner, member }
    }

    /// Site of `member` declared on `O`.
    pub fn of<O: ?Sized + 'static>(member: &'static str) -> Self {
        Self::new(TypeKey::of::<O>(), member)
    }

    pub fn owner(&self) -> TypeKey {
        self.owner
    }

    pub fn member(&self) -> &'static str {
        self.member
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner.name, self.member)
    }
}
