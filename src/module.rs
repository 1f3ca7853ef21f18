//! Modules and their provider methods.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::declaration::{Declaration, MethodDeclaration};
use crate::inject::{Argument, Parameters};
use crate::key::SiteId;
use crate::node::{Invocation, Prepare};
use crate::provider::AnyArc;
use crate::qualifier::{Annotation, Qualifier};
use crate::scope::{ScopeTag, Singleton};
use crate::signature::DeclaredType;

/// A set of provider methods from which a graph is built.
///
/// Each provider method produces one type, optionally qualified and scoped,
/// and may declare parameters resolved from the graph the same way as any
/// injection point.
///
/// # Example
///
/// ```rust
/// use ferrous_graph::{Bindings, Module, ObjectGraph, Singleton};
/// use std::sync::Arc;
///
/// struct Config { url: String }
/// struct Database { url: String }
///
/// struct StorageModule;
///
/// impl Module for StorageModule {
///     fn provides(bindings: &mut Bindings<Self>) {
///         bindings
///             .provides::<Config>("config")
///             .singleton()
///             .to(|_| Config { url: "postgres://localhost".to_string() });
///
///         bindings
///             .provides::<Database>("database")
///             .to_with(|_, (config,): (Arc<Config>,)| Database { url: config.url.clone() });
///     }
/// }
///
/// let graph = ObjectGraph::builder()
///     .scope::<Singleton>()
///     .module(StorageModule)
///     .build()
///     .unwrap();
///
/// assert_eq!(graph.get::<Database>().unwrap().url, "postgres://localhost");
/// ```
pub trait Module: Send + Sync + Sized + 'static {
    /// Declares this module's provider methods.
    fn provides(bindings: &mut Bindings<Self>);
}

/// A provider method collected from a module, before signature derivation.
pub(crate) struct ProvidesMethod {
    pub(crate) declaration: Declaration,
    pub(crate) method: MethodDeclaration,
    pub(crate) scope: Option<ScopeTag>,
    pub(crate) prepare: Prepare,
}

/// Collects the provider methods of module `M`.
pub struct Bindings<M> {
    module: Arc<M>,
    methods: Vec<ProvidesMethod>,
}

impl<M: Module> Bindings<M> {
    pub(crate) fn collect(module: M) -> Vec<ProvidesMethod> {
        let mut bindings = Bindings {
            module: Arc::new(module),
            methods: Vec::new(),
        };
        M::provides(&mut bindings);
        bindings.methods
    }

    /// The module instance provider methods are invoked on.
    pub fn module(&self) -> &M {
        &self.module
    }

    /// Starts a provider method named `name` producing `T`.
    ///
    /// Method names must be unique within the module.
    pub fn provides<T: Send + Sync + 'static>(&mut self, name: &'static str) -> ProvidesBuilder<'_, M, T> {
        ProvidesBuilder {
            bindings: self,
            name,
            annotations: Vec::new(),
            parameter_annotations: Vec::new(),
            scope: None,
            _marker: PhantomData,
        }
    }
}

/// Fluent declaration of one provider method.
pub struct ProvidesBuilder<'a, M, T> {
    bindings: &'a mut Bindings<M>,
    name: &'static str,
    annotations: Vec<Annotation>,
    parameter_annotations: Vec<(usize, Annotation)>,
    scope: Option<ScopeTag>,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, M: Module, T: Send + Sync + 'static> ProvidesBuilder<'a, M, T> {
    /// Qualifies the produced value with `Named(value)`.
    pub fn named(self, value: impl Into<String>) -> Self {
        self.annotated(Annotation::named(value))
    }

    pub fn qualified(self, qualifier: impl Qualifier) -> Self {
        self.annotated(qualifier.annotation())
    }

    /// Attaches an annotation to the provider method itself.
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Memoizes the produced value in the graph servicing scope `S`.
    pub fn scoped<S: ?Sized + 'static>(self) -> Self {
        self.scope_tag(ScopeTag::of::<S>())
    }

    pub fn scope_tag(mut self, scope: ScopeTag) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Shorthand for `scoped::<Singleton>()`.
    pub fn singleton(self) -> Self {
        self.scoped::<Singleton>()
    }

    /// Attaches an annotation (typically a qualifier) to parameter `index`.
    ///
    /// # Panics
    ///
    /// The method finished by `to_with` panics if `index` is out of bounds.
    pub fn annotate_parameter(mut self, index: usize, annotation: Annotation) -> Self {
        self.parameter_annotations.push((index, annotation));
        self
    }

    /// Finishes a provider method without parameters.
    pub fn to<F>(self, factory: F)
    where
        F: Fn(&M) -> T + Send + Sync + 'static,
    {
        self.to_with(move |module, ()| factory(module))
    }

    /// Finishes a provider method whose parameters are the tuple `P`.
    pub fn to_with<P, F>(self, factory: F)
    where
        P: Parameters,
        F: Fn(&M, P) -> T + Send + Sync + 'static,
    {
        let site = SiteId::of::<M>(self.name);
        let mut method = MethodDeclaration::new(site, P::declarations());
        for (index, annotation) in self.parameter_annotations {
            method.annotate_parameter(index, annotation);
        }

        let module = self.bindings.module.clone();
        let factory = Arc::new(factory);
        let prepare: Prepare = Arc::new(move |arguments: &[Argument]| {
            let parameters = P::extract(arguments)?;
            let module = module.clone();
            let factory = factory.clone();
            let invocation: Invocation =
                Arc::new(move || Arc::new((*factory)(&*module, parameters.clone())) as AnyArc);
            Ok(invocation)
        });

        self.bindings.methods.push(ProvidesMethod {
            declaration: Declaration::new(site, DeclaredType::of::<Arc<T>>(), self.annotations),
            method,
            scope: self.scope,
            prepare,
        });
    }
}
