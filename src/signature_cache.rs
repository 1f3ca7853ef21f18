//! Memoized signature derivation per declaration site.

use std::sync::Arc;

use crate::declaration::{Declaration, MethodDeclaration};
use crate::error::{GraphError, GraphResult};
use crate::internal::sync::{HashMap, Mutex};
use crate::key::SiteId;
use crate::qualifier::{Annotation, Canonicalize, Nullable, QualifierCanonicalizer, QualifierKey};
use crate::signature::{DeclaredType, Nullability, Signature};

/// Derives a signature from a declared type and its annotations.
pub trait SignatureDeriver: Send + Sync {
    fn derive(
        &self,
        site: SiteId,
        declared: &DeclaredType,
        annotations: &[Annotation],
    ) -> GraphResult<Signature>;

    /// Canonical key of a qualifier annotation.
    fn qualifier_key(&self, annotation: &Annotation) -> QualifierKey;
}

/// Default derivation rule.
///
/// - `type` is the declared type with `Provider`/`Lazy` reduced to their
///   type argument.
/// - `qualifier` comes from the single qualifier-marked annotation; more than
///   one is an [`AmbiguousQualifier`](GraphError::AmbiguousQualifier) error.
/// - `nullability` is `Nullable` when the [`Nullable`] marker is present.
pub struct AnnotationDeriver {
    canonicalizer: Arc<dyn Canonicalize>,
}

impl AnnotationDeriver {
    pub fn new(canonicalizer: Arc<dyn Canonicalize>) -> Self {
        Self { canonicalizer }
    }
}

impl Default for AnnotationDeriver {
    fn default() -> Self {
        Self::new(Arc::new(QualifierCanonicalizer))
    }
}

impl SignatureDeriver for AnnotationDeriver {
    fn derive(
        &self,
        site: SiteId,
        declared: &DeclaredType,
        annotations: &[Annotation],
    ) -> GraphResult<Signature> {
        let qualifiers: Vec<&Annotation> = annotations.iter().filter(|a| a.is_qualifier()).collect();
        let qualifier = match qualifiers.as_slice() {
            [] => None,
            [single] => Some(self.canonicalizer.canonicalize(single)),
            many => {
                return Err(GraphError::AmbiguousQualifier {
                    site,
                    qualifiers: many
                        .iter()
                        .map(|a| self.canonicalizer.canonicalize(a).to_string())
                        .collect(),
                })
            }
        };

        let nullability = if annotations.iter().any(|a| a.is::<Nullable>()) {
            Nullability::Nullable
        } else {
            Nullability::NonNull
        };

        Ok(Signature::new(declared.target(), qualifier, nullability))
    }

    fn qualifier_key(&self, annotation: &Annotation) -> QualifierKey {
        self.canonicalizer.canonicalize(annotation)
    }
}

/// Per-declaration-site signature cache, safe under concurrent first use.
///
/// Entries are derived lazily on first request and never evicted. Each map is
/// guarded by its own lock for the whole check-then-derive sequence, so a
/// declaration is derived at most once. Derivation failures are not cached.
///
/// Qualifiers may be computed at runtime (for example from module state), so
/// an entry is keyed by its site together with the declared type and
/// annotations it was derived from. Two module instances of one type that
/// qualify the same provider method differently get distinct entries.
///
/// # Examples
///
/// ```rust
/// use ferrous_graph::{Declaration, DeclaredType, SignatureCache, SiteId, Signature};
/// use std::sync::Arc;
///
/// struct Target;
///
/// let cache = SignatureCache::new();
/// let field = Declaration::new(
///     SiteId::of::<Target>("value"),
///     DeclaredType::of::<Arc<u32>>(),
///     Vec::new(),
/// );
///
/// assert_eq!(cache.signature(&field).unwrap(), Signature::of::<u32>());
/// assert_eq!(cache.cached_fields(), 1);
/// ```
pub struct SignatureCache {
    fields: Mutex<HashMap<SiteId, Vec<FieldEntry>>>,
    methods: Mutex<HashMap<SiteId, Vec<MethodEntry>>>,
    deriver: Arc<dyn SignatureDeriver>,
}

struct FieldEntry {
    declared: DeclaredType,
    annotations: Vec<Annotation>,
    signature: Signature,
}

impl FieldEntry {
    fn matches(&self, declaration: &Declaration) -> bool {
        self.declared == *declaration.declared() && self.annotations == declaration.annotations()
    }
}

struct MethodEntry {
    parameters: Vec<(DeclaredType, Vec<Annotation>)>,
    signatures: Option<Arc<[Signature]>>,
}

impl MethodEntry {
    fn matches(&self, method: &MethodDeclaration) -> bool {
        self.parameters.len() == method.parameters().len()
            && self
                .parameters
                .iter()
                .zip(method.parameters())
                .all(|((declared, annotations), p)| declared == p.declared() && annotations[..] == *p.annotations())
    }
}

impl SignatureCache {
    pub fn new() -> Self {
        Self::with_deriver(Arc::new(AnnotationDeriver::default()))
    }

    pub fn with_deriver(deriver: Arc<dyn SignatureDeriver>) -> Self {
        Self {
            fields: Mutex::new(HashMap::default()),
            methods: Mutex::new(HashMap::default()),
            deriver,
        }
    }

    /// Signature of a field (or provider method return value).
    pub fn signature(&self, declaration: &Declaration) -> GraphResult<Signature> {
        let mut fields = self.fields.lock();
        let entries = fields.entry(declaration.site()).or_default();
        if let Some(entry) = entries.iter().find(|e| e.matches(declaration)) {
            return Ok(entry.signature.clone());
        }

        let signature = self.deriver.derive(
            declaration.site(),
            declaration.declared(),
            declaration.annotations(),
        )?;
        entries.push(FieldEntry {
            declared: *declaration.declared(),
            annotations: declaration.annotations().to_vec(),
            signature: signature.clone(),
        });
        Ok(signature)
    }

    /// Signatures of a method's parameters, or `None` when it has none.
    ///
    /// Never returns an empty slice.
    pub fn parameter_signatures(&self, method: &MethodDeclaration) -> GraphResult<Option<Arc<[Signature]>>> {
        let mut methods = self.methods.lock();
        let entries = methods.entry(method.site()).or_default();
        if let Some(entry) = entries.iter().find(|e| e.matches(method)) {
            return Ok(entry.signatures.clone());
        }

        let signatures = if method.parameters().is_empty() {
            None
        } else {
            let derived = method
                .parameters()
                .iter()
                .map(|p| self.deriver.derive(method.site(), p.declared(), p.annotations()))
                .collect::<GraphResult<Vec<_>>>()?;
            Some(Arc::from(derived))
        };
        entries.push(MethodEntry {
            parameters: method
                .parameters()
                .iter()
                .map(|p| (*p.declared(), p.annotations().to_vec()))
                .collect(),
            signatures: signatures.clone(),
        });
        Ok(signatures)
    }

    /// Canonical key of a qualifier annotation, as used by derivation.
    pub fn qualifier_key(&self, annotation: &Annotation) -> QualifierKey {
        self.deriver.qualifier_key(annotation)
    }

    /// Number of cached field signatures.
    pub fn cached_fields(&self) -> usize {
        self.fields.lock().values().map(Vec::len).sum()
    }

    /// Number of cached method parameter lists.
    pub fn cached_methods(&self) -> usize {
        self.methods.lock().values().map(Vec::len).sum()
    }
}

impl Default for SignatureCache {
    fn default() -> Self {
        Self::new()
    }
}
