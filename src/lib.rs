//! # ferrous-graph
//!
//! Scoped object graphs for Rust: modules supply provider methods, target
//! objects declare injection points, and the graph decides which provider
//! satisfies each point, applying scope and qualifier rules.
//!
//! ## Features
//!
//! - **Signature matching**: injection points are keyed by target type plus an
//!   optional qualifier, with explicit nullability
//! - **Parent/child graphs**: lookups walk towards the root, and a child may
//!   shadow a parent binding
//! - **Scoped caching**: scoped bindings are memoized by the graph servicing
//!   their scope; qualified bindings by the requesting graph
//! - **Deferred access**: inject a [`Provider`] or a memoizing [`Lazy`] instead
//!   of an instance
//! - **Thread-safe caches**: signature and instance caches tolerate concurrent
//!   first use
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_graph::{Bindings, Injectable, Members, Module, ObjectGraph};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct AppModule;
//!
//! impl Module for AppModule {
//!     fn provides(bindings: &mut Bindings<Self>) {
//!         bindings
//!             .provides::<Database>("database")
//!             .to(|_| Database { url: "postgres://localhost".to_string() });
//!     }
//! }
//!
//! #[derive(Default)]
//! struct UserService {
//!     db: Option<Arc<Database>>,
//! }
//!
//! impl Injectable for UserService {
//!     fn members(members: &mut Members<Self>) {
//!         members.field("db").inject(|s, db: Arc<Database>| s.db = Some(db));
//!     }
//! }
//!
//! let graph = ObjectGraph::builder().module(AppModule).build().unwrap();
//! let mut service = UserService::default();
//! graph.inject(&mut service).unwrap();
//! assert_eq!(service.db.unwrap().url, "postgres://localhost");
//! ```
//!
//! ## Caching rules
//!
//! - **Unscoped, unqualified**: created fresh on every resolution
//! - **Scoped**: created once per graph servicing the scope
//! - **Qualified, unscoped**: created once per requesting graph
//!
//! ## Qualifiers and scopes
//!
//! ```rust
//! use ferrous_graph::{Bindings, Module, Named, ObjectGraph, Singleton};
//! use std::sync::Arc;
//!
//! struct Ports;
//!
//! impl Module for Ports {
//!     fn provides(bindings: &mut Bindings<Self>) {
//!         bindings.provides::<u16>("http").named("http").to(|_| 80);
//!         bindings.provides::<u16>("https").named("https").to(|_| 443);
//!     }
//! }
//!
//! let root = ObjectGraph::builder()
//!     .scope::<Singleton>()
//!     .module(Ports)
//!     .build()
//!     .unwrap();
//!
//! let http = root.get_qualified::<u16>(Named::new("http")).unwrap();
//! let again = root.get_qualified::<u16>(Named::new("http")).unwrap();
//! assert_eq!(*http, 80);
//! assert!(Arc::ptr_eq(&http, &again));
//! assert_eq!(*root.get_qualified::<u16>(Named::new("https")).unwrap(), 443);
//! ```

// Module declarations
pub mod declaration;
pub mod error;
pub mod graph;
pub mod inject;
pub mod key;
pub mod module;
pub mod observer;
pub mod provider;
pub mod qualifier;
pub mod scope;
pub mod signature;
pub mod signature_cache;

// Internal modules
mod internal;
mod node;

// Re-export core types
pub use declaration::{Declaration, MethodDeclaration, Parameter};
pub use error::{GraphError, GraphResult};
pub use graph::{GraphBuilder, ObjectGraph};
pub use inject::{Argument, FieldBuilder, Injectable, Injected, Members, MethodBuilder, Parameters};
pub use internal::UnboundedRecursion;
pub use key::{key_of_type, SiteId, TypeKey};
pub use module::{Bindings, Module, ProvidesBuilder};
pub use observer::{GraphObserver, LoggingObserver};
pub use provider::{AnyArc, AnyProvider, Lazy, Provider, ProviderRef};
pub use qualifier::{Annotation, Canonicalize, Named, Nullable, Qualifier, QualifierCanonicalizer, QualifierKey};
pub use scope::{ScopeTag, Singleton};
pub use signature::{Access, DeclaredType, Nullability, Signature};
pub use signature_cache::{AnnotationDeriver, SignatureCache, SignatureDeriver};
