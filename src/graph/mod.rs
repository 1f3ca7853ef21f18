//! The object graph and its resolution engine.

mod builder;
mod instance_cache;

pub use builder::GraphBuilder;
pub(crate) use instance_cache::InstanceCache;

use std::sync::Arc;
use std::time::Instant;

use crate::error::{GraphError, GraphResult};
use crate::inject::{self, Argument, Injectable};
use crate::internal::sync::HashMap;
use crate::internal::StackGuard;
use crate::key::SiteId;
use crate::node::Node;
use crate::observer::Observers;
use crate::provider::{CachedNodeProvider, Lazy, MemoizedProvider, NodeProvider, Provider, ProviderRef};
use crate::qualifier::Qualifier;
use crate::scope::ScopeTag;
use crate::signature::{Access, DeclaredType, Signature};
use crate::signature_cache::SignatureCache;

/// An immutable mapping from signature to provider binding, with an optional
/// parent graph and a private instance cache.
///
/// Lookup consults the graph's own bindings first, then walks the parent
/// chain: the closest declaration wins, so a child graph may shadow a parent
/// binding.
///
/// Caching rule for a binding found for a requested signature:
///
/// - no scope and no qualifier: a new instance on every resolution;
/// - declared scope: one instance in the nearest graph (from this one
///   towards the root) servicing that scope;
/// - qualifier without scope: one instance in the requesting graph.
///
/// Cloning is cheap (`Arc` internally) and clones share the instance cache.
///
/// # Cycles
///
/// Provider methods that depend on each other cannot be resolved. When
/// provider discovery re-enters a signature it is already resolving on the
/// same thread, it panics with an [`UnboundedRecursion`](crate::UnboundedRecursion)
/// payload. This is fatal and never reported as a [`GraphError`].
///
/// # Examples
///
/// ```rust
/// use ferrous_graph::{Bindings, Module, ObjectGraph};
/// use std::sync::Arc;
///
/// struct AnswerModule;
///
/// impl Module for AnswerModule {
///     fn provides(bindings: &mut Bindings<Self>) {
///         bindings.provides::<u32>("answer").to(|_| 42);
///     }
/// }
///
/// let graph = ObjectGraph::builder().module(AnswerModule).build().unwrap();
/// let a = graph.get::<u32>().unwrap();
/// let b = graph.get::<u32>().unwrap();
/// assert_eq!(*a, 42);
/// assert!(!Arc::ptr_eq(&a, &b));
/// ```
#[derive(Clone)]
pub struct ObjectGraph {
    inner: Arc<GraphInner>,
}

struct GraphInner {
    parent: Option<ObjectGraph>,
    nodes: HashMap<Signature, Arc<Node>>,
    instances: Arc<InstanceCache>,
    scope: Option<ScopeTag>,
    signatures: Arc<SignatureCache>,
    observers: Observers,
}

impl ObjectGraph {
    /// Starts building a root graph.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    /// Starts building a child graph of this one.
    ///
    /// The child shares this graph's signature cache and observers.
    pub fn child(&self) -> GraphBuilder {
        GraphBuilder::new().parent(self)
    }

    pub fn parent(&self) -> Option<&ObjectGraph> {
        self.inner.parent.as_ref()
    }

    /// The scope this graph services, if any.
    pub fn scope(&self) -> Option<ScopeTag> {
        self.inner.scope
    }

    pub fn signature_cache(&self) -> &Arc<SignatureCache> {
        &self.inner.signatures
    }

    /// Number of bindings declared by this graph, excluding its ancestors.
    pub fn len(&self) -> usize {
        self.inner.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.nodes.is_empty()
    }

    /// Whether this graph or an ancestor binds `signature`.
    pub fn contains(&self, signature: &Signature) -> bool {
        self.find_node(signature).is_some()
    }

    /// Number of memoized instances held by this graph.
    pub fn cached_instances(&self) -> usize {
        self.inner.instances.len()
    }

    fn find_node(&self, signature: &Signature) -> Option<&Arc<Node>> {
        let mut graph = Some(self);
        while let Some(current) = graph {
            if let Some(node) = current.inner.nodes.get(signature) {
                return Some(node);
            }
            graph = current.parent();
        }
        None
    }

    fn find_graph(&self, scope: ScopeTag) -> Option<&ObjectGraph> {
        let mut graph = Some(self);
        while let Some(current) = graph {
            if current.inner.scope == Some(scope) {
                return Some(current);
            }
            graph = current.parent();
        }
        None
    }

    /// Finds a provider for `signature`.
    ///
    /// Returns `Ok(None)` when neither this graph nor any ancestor binds the
    /// signature. The binding's parameters are resolved here, once per
    /// returned provider: instance parameters are produced immediately.
    ///
    /// # Errors
    ///
    /// - [`GraphError::ScopeNotFound`] when the binding declares a scope that
    ///   no graph in the chain services.
    /// - Any error raised while resolving the binding's parameters.
    ///
    /// # Panics
    ///
    /// Panics with [`UnboundedRecursion`](crate::UnboundedRecursion) on a
    /// dependency cycle.
    pub fn find_provider(&self, signature: &Signature) -> GraphResult<Option<ProviderRef>> {
        let _guard = StackGuard::new(signature);

        let node = match self.find_node(signature) {
            Some(node) => node,
            None => return Ok(None),
        };

        let observers = &self.inner.observers;
        let started = if observers.has_observers() {
            observers.resolving(signature);
            Some(Instant::now())
        } else {
            None
        };

        let invocation = node.invocation(self)?;

        let provider: ProviderRef = if node.scope().is_none() && !signature.has_qualifier() {
            Arc::new(NodeProvider::new(invocation))
        } else {
            let target = match node.scope() {
                Some(scope) => self.find_graph(scope).ok_or_else(|| GraphError::ScopeNotFound {
                    scope: scope.name(),
                    signature: signature.clone(),
                })?,
                None => self,
            };
            Arc::new(CachedNodeProvider::new(
                target.inner.instances.clone(),
                node.id(),
                invocation,
            ))
        };

        if let Some(started) = started {
            observers.resolved(signature, started.elapsed());
        }

        Ok(Some(provider))
    }

    /// Resolves one injection point declared at `site`.
    ///
    /// A missing binding yields an absent value only when the signature is
    /// nullable and the declared type can hold one. A `Nullable` marker on a
    /// non-optional type still reports the binding as not found.
    pub(crate) fn resolve_argument(
        &self,
        site: SiteId,
        declared: &DeclaredType,
        signature: &Signature,
    ) -> GraphResult<Argument> {
        match self.find_provider(signature)? {
            Some(provider) => Ok(match declared.access() {
                Access::Instance => Argument::Instance(provider.get_any()),
                Access::Provider => Argument::Provider(provider),
                Access::Lazy => Argument::Lazy(Arc::new(MemoizedProvider::new(provider))),
            }),
            None if signature.is_nullable() && declared.is_optional() => Ok(Argument::Absent),
            None => Err(GraphError::BindingNotFound {
                owner: site.owner().name(),
                member: site.member(),
                signature: signature.clone(),
            }),
        }
    }

    pub(crate) fn observers(&self) -> &Observers {
        &self.inner.observers
    }

    /// Binds every injectable member of `object` using this graph.
    ///
    /// Members are bound in declaration order, own members before base
    /// levels. A member that fails does not stop the others: the single
    /// failure is returned as is, several are collected into
    /// [`GraphError::Incomplete`]. Members that bound successfully keep
    /// their values.
    pub fn inject<O: Injectable>(&self, object: &mut O) -> GraphResult<()> {
        inject::inject_into(self, object)
    }

    fn required(&self, signature: Signature, member: &'static str) -> GraphResult<ProviderRef> {
        let found = self.find_provider(&signature).and_then(|provider| {
            provider.ok_or_else(|| GraphError::BindingNotFound {
                owner: std::any::type_name::<ObjectGraph>(),
                member,
                signature,
            })
        });
        if let Err(err) = &found {
            self.inner.observers.binding_failed(err);
        }
        found
    }

    fn typed<T: Send + Sync + 'static>(&self, provider: ProviderRef) -> GraphResult<Arc<T>> {
        Provider::<T>::new(provider).try_get()
    }

    /// Resolves an instance of the unqualified binding of `T`.
    pub fn get<T: Send + Sync + 'static>(&self) -> GraphResult<Arc<T>> {
        let provider = self.required(Signature::of::<T>(), "get")?;
        self.typed(provider)
    }

    /// Resolves an instance of `T` bound with `qualifier`.
    pub fn get_qualified<T: Send + Sync + 'static>(&self, qualifier: impl Qualifier) -> GraphResult<Arc<T>> {
        let provider = self.required(self.qualified_signature::<T>(&qualifier), "get_qualified")?;
        self.typed(provider)
    }

    /// Resolves a provider for the unqualified binding of `T`.
    pub fn provider<T: Send + Sync + 'static>(&self) -> GraphResult<Provider<T>> {
        self.required(Signature::of::<T>(), "provider").map(Provider::new)
    }

    /// Resolves a provider for `T` bound with `qualifier`.
    pub fn provider_qualified<T: Send + Sync + 'static>(&self, qualifier: impl Qualifier) -> GraphResult<Provider<T>> {
        self.required(self.qualified_signature::<T>(&qualifier), "provider_qualified")
            .map(Provider::new)
    }

    /// Resolves a fresh memoizing wrapper for the unqualified binding of `T`.
    pub fn lazy<T: Send + Sync + 'static>(&self) -> GraphResult<Lazy<T>> {
        self.required(Signature::of::<T>(), "lazy")
            .map(|provider| Lazy::new(Arc::new(MemoizedProvider::new(provider))))
    }

    fn qualified_signature<T: 'static>(&self, qualifier: &impl Qualifier) -> Signature {
        let key = self.inner.signatures.qualifier_key(&qualifier.annotation());
        Signature::of::<T>().with_qualifier(key)
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Object Graph Debug ===\n");
        let mut graph = Some(self);
        let mut depth = 0;
        while let Some(current) = graph {
            let scope = current.scope().map_or("<none>", |scope| scope.name());
            s.push_str(&format!(
                "Graph #{} (scope: {}, cached: {}, observers: {}):\n",
                depth,
                scope,
                current.cached_instances(),
                current.inner.observers.len()
            ));
            let mut nodes: Vec<String> = current.inner.nodes.values().map(|node| node.to_string()).collect();
            nodes.sort();
            for node in nodes {
                s.push_str(&format!("  {}\n", node));
            }
            graph = current.parent();
            depth += 1;
        }
        s
    }
}

impl std::fmt::Debug for ObjectGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectGraph")
            .field("scope", &self.inner.scope.map(|s| s.name()))
            .field("bindings", &self.inner.nodes.len())
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}
