//! Annotations, qualifiers and the qualifier canonicalizer.
//!
//! An [`Annotation`] is the metadata attached to a declaration site. An
//! annotation whose type is marked as a qualifier disambiguates bindings of
//! the same type; the [`Canonicalize`] step turns it into a comparable
//! [`QualifierKey`].

use std::fmt;
use std::sync::Arc;

use crate::key::TypeKey;

/// Built-in qualifier carrying a single `value` attribute.
///
/// # Examples
///
/// ```rust
/// use ferrous_graph::{Named, Qualifier, QualifierCanonicalizer, Canonicalize};
///
/// let key = QualifierCanonicalizer.canonicalize(&Named::new("primary").annotation());
/// assert!(key.as_str().ends_with("Named(value=primary)"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Named(pub String);

impl Named {
    pub fn new(value: impl Into<String>) -> Self {
        Named(value.into())
    }
}

/// Built-in nullability marker.
///
/// A declaration annotated with `Nullable` receives an absent value instead
/// of failing when no binding exists.
#[derive(Debug, Clone, Copy)]
pub struct Nullable;

/// An annotation instance on a declaration site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    annotation_type: TypeKey,
    values: Vec<(&'static str, String)>,
    qualifier: bool,
}

impl Annotation {
    /// A plain annotation of type `A` without attributes.
    pub fn marker<A: ?Sized + 'static>() -> Self {
        Self {
            annotation_type: TypeKey::of::<A>(),
            values: Vec::new(),
            qualifier: false,
        }
    }

    /// An annotation of type `A` whose type is marked as a qualifier.
    pub fn qualifier<A: ?Sized + 'static>() -> Self {
        Self {
            qualifier: true,
            ..Self::marker::<A>()
        }
    }

    /// `Named(value)` qualifier.
    pub fn named(value: impl Into<String>) -> Self {
        Self::qualifier::<Named>().with_value("value", value.into())
    }

    /// Nullability marker.
    pub fn nullable() -> Self {
        Self::marker::<Nullable>()
    }

    /// Adds an attribute value.
    pub fn with_value(mut self, name: &'static str, value: impl fmt::Display) -> Self {
        self.values.push((name, value.to_string()));
        self
    }

    pub fn annotation_type(&self) -> TypeKey {
        self.annotation_type
    }

    pub fn values(&self) -> &[(&'static str, String)] {
        &self.values
    }

    /// Whether the annotation type is itself marked as a qualifier.
    pub fn is_qualifier(&self) -> bool {
        self.qualifier
    }

    /// Whether this is an annotation of type `A`.
    pub fn is<A: ?Sized + 'static>(&self) -> bool {
        self.annotation_type == TypeKey::of::<A>()
    }
}

/// A qualifier value usable on declarations.
///
/// Marker types get the default implementation:
///
/// ```rust
/// use ferrous_graph::Qualifier;
///
/// struct Primary;
/// impl Qualifier for Primary {}
///
/// assert!(Primary.annotation().is_qualifier());
/// ```
pub trait Qualifier: 'static {
    /// The annotation instance describing this qualifier.
    fn annotation(&self) -> Annotation {
        Annotation::qualifier::<Self>()
    }
}

impl Qualifier for Named {
    fn annotation(&self) -> Annotation {
        Annotation::named(self.0.clone())
    }
}

impl Qualifier for Annotation {
    fn annotation(&self) -> Annotation {
        self.clone()
    }
}

/// Canonical, comparable form of a qualifier annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifierKey(Arc<str>);

impl QualifierKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        QualifierKey(Arc::from(key.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QualifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Converts a qualifier annotation into its canonical key.
pub trait Canonicalize: Send + Sync {
    fn canonicalize(&self, annotation: &Annotation) -> QualifierKey;
}

/// Default canonicalizer.
///
/// The key is the annotation type name, followed by `(name=value, ...)` with
/// the attributes sorted by name when the annotation carries any. Backslash,
/// `,`, `=`, `(` and `)` inside names and values are escaped with a
/// backslash, so distinct attribute sets never share a key.
#[derive(Debug, Default, Clone, Copy)]
pub struct QualifierCanonicalizer;

impl Canonicalize for QualifierCanonicalizer {
    fn canonicalize(&self, annotation: &Annotation) -> QualifierKey {
        let name = annotation.annotation_type().name();
        if annotation.values().is_empty() {
            return QualifierKey::new(name);
        }

        let mut values: Vec<&(&'static str, String)> = annotation.values().iter().collect();
        values.sort_by(|a, b| a.0.cmp(b.0));
        let attributes = values
            .iter()
            .map(|(k, v)| format!("{}={}", escape(k), escape(v)))
            .collect::<Vec<_>>()
            .join(", ");
        QualifierKey::new(format!("{}({})", name, attributes))
    }
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | ',' | '=' | '(' | ')') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
