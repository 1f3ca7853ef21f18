//! Diagnostic observers for object graph resolution.
//!
//! This module provides hooks for observing provider discovery and binding
//! failures, enabling structured tracing and timing of resolution.

use std::sync::Arc;
use std::time::Duration;

use crate::error::GraphError;
use crate::signature::Signature;

/// Observer trait for object graph resolution events.
///
/// Observers are registered on a [`GraphBuilder`](crate::GraphBuilder) and
/// inherited by every child graph.
///
/// # Performance
///
/// Observer calls are made synchronously during resolution. Keep
/// implementations lightweight. When no observer is registered, no timing is
/// taken at all.
///
/// # Examples
///
/// ```
/// use ferrous_graph::{GraphObserver, ObjectGraph, Signature};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct CountingObserver {
///     resolved: AtomicUsize,
/// }
///
/// impl GraphObserver for CountingObserver {
///     fn resolving(&self, _signature: &Signature) {}
///
///     fn resolved(&self, _signature: &Signature, _duration: Duration) {
///         self.resolved.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let observer = Arc::new(CountingObserver::default());
/// let graph = ObjectGraph::builder().observer(observer.clone()).build().unwrap();
/// assert!(graph.get::<String>().is_err());
/// assert_eq!(observer.resolved.load(Ordering::SeqCst), 0);
/// ```
pub trait GraphObserver: Send + Sync {
    /// Called when a node was found for `signature`, before its parameters
    /// are resolved.
    fn resolving(&self, signature: &Signature);

    /// Called when a provider for `signature` is ready.
    ///
    /// # Arguments
    ///
    /// * `signature` - The requested signature
    /// * `duration` - Time elapsed from `resolving` to `resolved`, including
    ///   the resolution of every parameter
    fn resolved(&self, signature: &Signature, duration: Duration);

    /// Called once per member that failed to bind, and for failed
    /// convenience lookups on a graph.
    fn binding_failed(&self, error: &GraphError) {
        let _ = error;
    }
}

/// Container for registered observers.
///
/// Designed to have minimal overhead when no observers are registered.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn GraphObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn GraphObserver>) {
        self.observers.push(observer);
    }

    pub(crate) fn extend(&mut self, other: Observers) {
        self.observers.extend(other.observers);
    }

    /// Returns true if any observers are registered.
    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, signature: &Signature) {
        for observer in &self.observers {
            observer.resolving(signature);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, signature: &Signature, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(signature, duration);
        }
    }

    #[inline]
    pub(crate) fn binding_failed(&self, error: &GraphError) {
        for observer in &self.observers {
            observer.binding_failed(error);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}

/// Built-in observer emitting `tracing` events.
///
/// Resolution events are logged at `DEBUG`, binding failures at `WARN`,
/// under the `ferrous_graph` target.
///
/// # Examples
///
/// ```
/// use ferrous_graph::{LoggingObserver, ObjectGraph};
/// use std::sync::Arc;
///
/// let graph = ObjectGraph::builder()
///     .observer(Arc::new(LoggingObserver::new()))
///     .build()
///     .unwrap();
/// ```
pub struct LoggingObserver {
    label: String,
}

impl LoggingObserver {
    /// Creates a new logging observer with the default label.
    pub fn new() -> Self {
        Self {
            label: "ferrous-graph".to_string(),
        }
    }

    /// Creates a new logging observer whose events carry `label`.
    pub fn with_label(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphObserver for LoggingObserver {
    fn resolving(&self, signature: &Signature) {
        tracing::debug!(target: "ferrous_graph", label = %self.label, %signature, "resolving");
    }

    fn resolved(&self, signature: &Signature, duration: Duration) {
        tracing::debug!(
            target: "ferrous_graph",
            label = %self.label,
            %signature,
            elapsed_us = duration.as_micros() as u64,
            "resolved"
        );
    }

    fn binding_failed(&self, error: &GraphError) {
        tracing::warn!(target: "ferrous_graph", label = %self.label, %error, "binding failed");
    }
}
