//! Realized provider bindings.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::declaration::MethodDeclaration;
use crate::error::GraphResult;
use crate::graph::ObjectGraph;
use crate::inject::Argument;
use crate::internal::sync::ArgumentList;
use crate::provider::AnyArc;
use crate::scope::ScopeTag;
use crate::signature::Signature;

/// Invokes a provider method with arguments bound in advance.
pub(crate) type Invocation = Arc<dyn Fn() -> AnyArc + Send + Sync>;

/// Binds resolved arguments to a provider method.
pub(crate) type Prepare = Arc<dyn Fn(&[Argument]) -> GraphResult<Invocation> + Send + Sync>;

static NEXT_NODE_ID: AtomicUsize = AtomicUsize::new(0);

/// Process-unique node identity, the key of every instance cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl NodeId {
    pub(crate) fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A provider method realized inside one graph.
///
/// Stateless with respect to instances: caching belongs to the instance
/// cache selected by [`ObjectGraph::find_provider`].
pub(crate) struct Node {
    id: NodeId,
    method: MethodDeclaration,
    produces: Signature,
    scope: Option<ScopeTag>,
    parameters: Option<Arc<[Signature]>>,
    prepare: Prepare,
}

impl Node {
    pub(crate) fn new(
        method: MethodDeclaration,
        produces: Signature,
        scope: Option<ScopeTag>,
        parameters: Option<Arc<[Signature]>>,
        prepare: Prepare,
    ) -> Self {
        Self {
            id: NodeId::next(),
            method,
            produces,
            scope,
            parameters,
            prepare,
        }
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn produces(&self) -> &Signature {
        &self.produces
    }

    pub(crate) fn scope(&self) -> Option<ScopeTag> {
        self.scope
    }

    /// Resolves every parameter against `graph`, in declaration order.
    pub(crate) fn collect_arguments(&self, graph: &ObjectGraph) -> GraphResult<ArgumentList> {
        let mut arguments = ArgumentList::new();
        if let Some(signatures) = &self.parameters {
            for (parameter, signature) in self.method.parameters().iter().zip(signatures.iter()) {
                arguments.push(graph.resolve_argument(self.method.site(), parameter.declared(), signature)?);
            }
        }
        Ok(arguments)
    }

    /// Resolves the arguments and binds them to the provider method.
    pub(crate) fn invocation(&self, graph: &ObjectGraph) -> GraphResult<Invocation> {
        let arguments = self.collect_arguments(graph)?;
        (self.prepare)(&arguments[..])
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("site", &self.method.site().to_string())
            .field("produces", &self.produces.to_string())
            .field("scope", &self.scope.map(|s| s.name()))
            .field("parameters", &self.parameters.as_ref().map_or(0, |p| p.len()))
            .finish()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {}", self.produces, self.method.site())?;
        if let Some(scope) = self.scope {
            write!(f, " [{}]", scope)?;
        }
        if let Some(parameters) = &self.parameters {
            let names: Vec<String> = parameters.iter().map(|s| s.to_string()).collect();
            write!(f, " ({})", names.join(", "))?;
        }
        Ok(())
    }
}
