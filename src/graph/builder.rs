use std::sync::Arc;

use crate::error::GraphResult;
use crate::internal::sync::HashMap;
use crate::module::{Bindings, Module, ProvidesMethod};
use crate::node::Node;
use crate::observer::{GraphObserver, Observers};
use crate::scope::ScopeTag;
use crate::signature_cache::SignatureCache;

use super::{GraphInner, InstanceCache, ObjectGraph};

/// Builder for [`ObjectGraph`].
///
/// Accepts any number of modules, an optional parent graph and an optional
/// scope tag. When a parent is given, the new graph shares the parent's
/// signature cache unless another one is supplied, and inherits the parent's
/// observers.
///
/// # Examples
///
/// ```rust
/// use ferrous_graph::{Bindings, Module, ObjectGraph, Singleton};
///
/// struct RequestScope;
/// struct Session { id: u32 }
///
/// struct SessionModule;
///
/// impl Module for SessionModule {
///     fn provides(bindings: &mut Bindings<Self>) {
///         bindings
///             .provides::<Session>("session")
///             .scoped::<RequestScope>()
///             .to(|_| Session { id: 7 });
///     }
/// }
///
/// let root = ObjectGraph::builder().scope::<Singleton>().build().unwrap();
/// let request = root
///     .child()
///     .scope::<RequestScope>()
///     .module(SessionModule)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.get::<Session>().unwrap().id, 7);
/// ```
#[derive(Default)]
pub struct GraphBuilder {
    parent: Option<ObjectGraph>,
    scope: Option<ScopeTag>,
    methods: Vec<ProvidesMethod>,
    signatures: Option<Arc<SignatureCache>>,
    observers: Observers,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the provider methods of `module`.
    pub fn module<M: Module>(mut self, module: M) -> Self {
        self.methods.extend(Bindings::collect(module));
        self
    }

    pub fn parent(mut self, parent: &ObjectGraph) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Declares the scope serviced by the new graph.
    pub fn scope<S: ?Sized + 'static>(self) -> Self {
        self.scope_tag(ScopeTag::of::<S>())
    }

    pub fn scope_tag(mut self, scope: ScopeTag) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Uses `cache` for signature derivation instead of the parent's (or a
    /// new) one.
    pub fn signature_cache(mut self, cache: Arc<SignatureCache>) -> Self {
        self.signatures = Some(cache);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn GraphObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    /// Derives every binding's signatures and builds the graph.
    ///
    /// When two provider methods produce the same signature, the later one
    /// replaces the earlier one.
    ///
    /// # Errors
    ///
    /// Fails when a provider method or one of its parameters carries more
    /// than one qualifier.
    pub fn build(self) -> GraphResult<ObjectGraph> {
        let signatures = match (self.signatures, &self.parent) {
            (Some(cache), _) => cache,
            (None, Some(parent)) => parent.signature_cache().clone(),
            (None, None) => Arc::new(SignatureCache::new()),
        };

        let mut observers = self
            .parent
            .as_ref()
            .map(|parent| parent.observers().clone())
            .unwrap_or_default();
        observers.extend(self.observers);

        let mut nodes = HashMap::default();
        for provides in self.methods {
            let produces = signatures.signature(&provides.declaration)?;
            let parameters = signatures.parameter_signatures(&provides.method)?;
            let node = Node::new(provides.method, produces.clone(), provides.scope, parameters, provides.prepare);
            if let Some(replaced) = nodes.insert(produces, Arc::new(node)) {
                tracing::warn!(binding = %replaced, "binding replaced by a later provider method");
            }
        }

        tracing::debug!(
            bindings = nodes.len(),
            scope = ?self.scope.map(|scope| scope.name()),
            has_parent = self.parent.is_some(),
            "object graph built"
        );

        Ok(ObjectGraph {
            inner: Arc::new(GraphInner {
                parent: self.parent,
                nodes,
                instances: Arc::new(InstanceCache::new()),
                scope: self.scope,
                signatures,
                observers,
            }),
        })
    }
}
