//! Providers: deferred or memoized suppliers of one produced instance.
//!
//! Three kinds exist behind the object-safe [`AnyProvider`] trait:
//!
//! - `NodeProvider` invokes its node on every call (transient).
//! - `CachedNodeProvider` stores the first result in the instance cache of
//!   the graph owning the scope (or of the requesting graph for qualified
//!   bindings).
//! - `MemoizedProvider` stores the first result privately; it backs
//!   [`Lazy`] injection sites.
//!
//! [`Provider<T>`] and [`Lazy<T>`] are the typed handles injected into
//! declarations.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{GraphError, GraphResult};
use crate::graph::InstanceCache;
use crate::internal::sync::OnceSlot;
use crate::node::{Invocation, NodeId};

/// Type-erased instance.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Object-safe provider of a type-erased instance.
pub trait AnyProvider: Send + Sync {
    fn get_any(&self) -> AnyArc;
}

/// Shared handle to a type-erased provider.
pub type ProviderRef = Arc<dyn AnyProvider>;

/// Invokes the node on every call.
pub(crate) struct NodeProvider {
    invocation: Invocation,
}

impl NodeProvider {
    pub(crate) fn new(invocation: Invocation) -> Self {
        Self { invocation }
    }
}

impl AnyProvider for NodeProvider {
    #[inline]
    fn get_any(&self) -> AnyArc {
        (self.invocation)()
    }
}

/// Memoizes the node's instance in a graph's instance cache.
///
/// Every provider created for the same (graph, node) pair shares the stored
/// instance.
pub(crate) struct CachedNodeProvider {
    cache: Arc<InstanceCache>,
    node: NodeId,
    invocation: Invocation,
}

impl CachedNodeProvider {
    pub(crate) fn new(cache: Arc<InstanceCache>, node: NodeId, invocation: Invocation) -> Self {
        Self { cache, node, invocation }
    }
}

impl AnyProvider for CachedNodeProvider {
    #[inline]
    fn get_any(&self) -> AnyArc {
        self.cache.get_or_create(self.node, || (self.invocation)())
    }
}

/// First call computes, later calls return the stored value.
pub(crate) struct MemoizedProvider {
    inner: ProviderRef,
    value: OnceSlot<AnyArc>,
}

impl MemoizedProvider {
    pub(crate) fn new(inner: ProviderRef) -> Self {
        Self {
            inner,
            value: OnceSlot::new(),
        }
    }
}

impl AnyProvider for MemoizedProvider {
    fn get_any(&self) -> AnyArc {
        self.value.get_or_init(|| self.inner.get_any()).clone()
    }
}

fn downcast<T: Send + Sync + 'static>(value: AnyArc) -> GraphResult<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| GraphError::TypeMismatch(std::any::type_name::<T>()))
}

/// Deferred access to a binding.
///
/// Every [`get`](Provider::get) re-applies the binding's caching rule: an
/// unscoped, unqualified binding produces a new instance per call.
///
/// # Examples
///
/// ```rust
/// use ferrous_graph::{Bindings, Module, ObjectGraph};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct CounterModule {
///     calls: AtomicUsize,
/// }
///
/// impl Module for CounterModule {
///     fn provides(bindings: &mut Bindings<Self>) {
///         bindings
///             .provides::<usize>("count")
///             .to(|m| m.calls.fetch_add(1, Ordering::SeqCst) + 1);
///     }
/// }
///
/// let graph = ObjectGraph::builder().module(CounterModule::default()).build().unwrap();
/// let provider = graph.provider::<usize>().unwrap();
/// assert_eq!(*provider.get(), 1);
/// assert_eq!(*provider.get(), 2);
/// assert_eq!(*provider.get(), 3);
/// ```
pub struct Provider<T> {
    inner: ProviderRef,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Provider<T> {
    pub(crate) fn new(inner: ProviderRef) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Produces (or returns the memoized) instance.
    ///
    /// # Panics
    ///
    /// Panics if the binding produced a value of another type, which cannot
    /// happen for providers obtained from a graph.
    pub fn get(&self) -> Arc<T> {
        match self.try_get() {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }

    /// Produces the instance, reporting a type mismatch as an error.
    pub fn try_get(&self) -> GraphResult<Arc<T>> {
        downcast(self.inner.get_any())
    }

    /// The type-erased provider.
    pub fn as_any(&self) -> &ProviderRef {
        &self.inner
    }
}

impl<T> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Provider<{}>", std::any::type_name::<T>())
    }
}

/// Memoized deferred access, private to one injection site.
///
/// The first [`get`](Lazy::get) computes the instance; later calls return it
/// even when the underlying binding is transient. Clones share the memoized
/// value.
pub struct Lazy<T> {
    inner: ProviderRef,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Lazy<T> {
    /// Wraps `inner`, which must already memoize.
    pub(crate) fn new(inner: ProviderRef) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Returns the memoized instance, computing it on first use.
    ///
    /// # Panics
    ///
    /// Panics on a type mismatch, like [`Provider::get`].
    pub fn get(&self) -> Arc<T> {
        match self.try_get() {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_get(&self) -> GraphResult<Arc<T>> {
        downcast(self.inner.get_any())
    }
}

impl<T> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lazy<{}>", std::any::type_name::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(calls: Arc<AtomicUsize>) -> Invocation {
        Arc::new(move || Arc::new(calls.fetch_add(1, Ordering::SeqCst) + 1) as AnyArc)
    }

    #[test]
    fn node_provider_is_transient() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider: Provider<usize> = Provider::new(Arc::new(NodeProvider::new(counting(calls.clone()))));
        assert_eq!(*provider.get(), 1);
        assert_eq!(*provider.get(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn memoized_provider_computes_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner: ProviderRef = Arc::new(NodeProvider::new(counting(calls.clone())));
        let lazy: Lazy<usize> = Lazy::new(Arc::new(MemoizedProvider::new(inner)));
        let copy = lazy.clone();
        assert_eq!(*lazy.get(), 1);
        assert_eq!(*lazy.get(), 1);
        assert_eq!(*copy.get(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cached_providers_share_one_entry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(InstanceCache::new());
        let node = NodeId::next();
        let a: Provider<usize> =
            Provider::new(Arc::new(CachedNodeProvider::new(cache.clone(), node, counting(calls.clone()))));
        let b: Provider<usize> =
            Provider::new(Arc::new(CachedNodeProvider::new(cache.clone(), node, counting(calls.clone()))));
        assert!(Arc::ptr_eq(&a.get(), &b.get()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn try_get_reports_mismatch() {
        let provider: Provider<String> = Provider::new(Arc::new(NodeProvider::new(Arc::new(|| Arc::new(1u8) as AnyArc))));
        assert!(matches!(provider.try_get(), Err(GraphError::TypeMismatch(_))));
    }
}
