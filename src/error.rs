//! Error types for object graph construction, resolution and injection.

use std::fmt;

use crate::key::SiteId;
use crate::signature::Signature;

/// Object graph errors
///
/// Every resolution failure is a configuration error: nothing is retried and
/// every message names the signature that was requested.
///
/// # Examples
///
/// ```rust
/// use ferrous_graph::{GraphError, ObjectGraph, Signature};
///
/// let graph = ObjectGraph::builder().build().unwrap();
/// match graph.get::<String>() {
///     Err(GraphError::BindingNotFound { signature, .. }) => {
///         assert_eq!(signature, Signature::of::<String>());
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone)]
pub enum GraphError {
    /// No node in the graph or any ancestor satisfies the signature
    BindingNotFound {
        /// Type declaring the member that needed the binding
        owner: &'static str,
        /// Member (field, method or provider method) that needed the binding
        member: &'static str,
        signature: Signature,
    },
    /// A node declares a scope that no graph in the parent chain services
    ScopeNotFound {
        scope: &'static str,
        signature: Signature,
    },
    /// More than one qualifier annotation on a single declaration site
    AmbiguousQualifier {
        site: SiteId,
        qualifiers: Vec<String>,
    },
    /// Type downcast failed
    TypeMismatch(&'static str),
    /// Several members of one object failed to bind
    Incomplete {
        owner: &'static str,
        failures: Vec<GraphError>,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::BindingNotFound { owner, member, signature } => write!(
                f,
                "Binding not found: none of the modules provides {} (required by {}::{})",
                signature, owner, member
            ),
            GraphError::ScopeNotFound { scope, signature } => write!(
                f,
                "Scope not found: no ObjectGraph defines scope {} while binding {}. \
                 Ensure that one of the graphs in the parent chain declares the scope",
                scope, signature
            ),
            GraphError::AmbiguousQualifier { site, qualifiers } => write!(
                f,
                "Ambiguous qualifier on {}: found {}",
                site,
                qualifiers.join(", ")
            ),
            GraphError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            GraphError::Incomplete { owner, failures } => {
                write!(f, "Injection into {} failed for {} members", owner, failures.len())?;
                for failure in failures {
                    write!(f, "\n  - {}", failure)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Result type for object graph operations
pub type GraphResult<T> = Result<T, GraphError>;
