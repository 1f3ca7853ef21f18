//! Injectable members of a target object.

use crate::declaration::{Declaration, MethodDeclaration};
use crate::error::{GraphError, GraphResult};
use crate::graph::ObjectGraph;
use crate::internal::sync::ArgumentList;
use crate::key::SiteId;
use crate::qualifier::{Annotation, Qualifier};
use crate::signature::DeclaredType;

use super::{Argument, Injected, Parameters};

/// A type whose fields and methods can be bound from an object graph.
///
/// Members are declared in order; they are bound in that order. A "base
/// class" is expressed by composition with [`Members::base`], and is bound
/// after the object's own members.
///
/// # Example
///
/// ```rust
/// use ferrous_graph::{Bindings, Injectable, Members, Module, ObjectGraph, Provider};
/// use std::sync::Arc;
///
/// struct Numbers;
///
/// impl Module for Numbers {
///     fn provides(bindings: &mut Bindings<Self>) {
///         bindings.provides::<i32>("int_value").to(|_| 1);
///     }
/// }
///
/// #[derive(Default)]
/// struct Target {
///     value: Option<Arc<i32>>,
///     provider: Option<Provider<i32>>,
/// }
///
/// impl Injectable for Target {
///     fn members(members: &mut Members<Self>) {
///         members.field("value").inject(|t, v: Arc<i32>| t.value = Some(v));
///         members.field("provider").inject(|t, p: Provider<i32>| t.provider = Some(p));
///     }
/// }
///
/// let graph = ObjectGraph::builder().module(Numbers).build().unwrap();
/// let mut target = Target::default();
/// graph.inject(&mut target).unwrap();
///
/// assert_eq!(**target.value.as_ref().unwrap(), 1);
/// assert_eq!(*target.provider.as_ref().unwrap().get(), 1);
/// ```
pub trait Injectable: Sized + 'static {
    /// Declares this level's injectable members.
    fn members(members: &mut Members<Self>);
}

type BindField<O> = Box<dyn Fn(&mut O, &Argument) -> GraphResult<()>>;
type BindStatic = Box<dyn Fn(&Argument) -> GraphResult<()>>;
type BindMethod<O> = Box<dyn Fn(&mut O, &[Argument]) -> GraphResult<()>>;
type BindBase<O> = Box<dyn Fn(&ObjectGraph, &mut O, &mut Vec<GraphError>)>;

enum Member<O> {
    Field { declaration: Declaration, bind: BindField<O> },
    Static { declaration: Declaration, bind: BindStatic },
    Method { method: MethodDeclaration, bind: BindMethod<O> },
}

impl<O> Member<O> {
    fn bind(&self, graph: &ObjectGraph, object: &mut O) -> GraphResult<()> {
        match self {
            Member::Field { declaration, bind } => {
                let argument = resolve_field(graph, declaration)?;
                bind(object, &argument)
            }
            Member::Static { declaration, bind } => {
                let argument = resolve_field(graph, declaration)?;
                bind(&argument)
            }
            Member::Method { method, bind } => {
                let mut arguments = ArgumentList::new();
                if let Some(signatures) = graph.signature_cache().parameter_signatures(method)? {
                    for (parameter, signature) in method.parameters().iter().zip(signatures.iter()) {
                        arguments.push(graph.resolve_argument(method.site(), parameter.declared(), signature)?);
                    }
                }
                bind(object, &arguments[..])
            }
        }
    }
}

fn resolve_field(graph: &ObjectGraph, declaration: &Declaration) -> GraphResult<Argument> {
    let signature = graph.signature_cache().signature(declaration)?;
    graph.resolve_argument(declaration.site(), declaration.declared(), &signature)
}

/// Collects the injectable members of one level of `O`.
pub struct Members<O> {
    members: Vec<Member<O>>,
    bases: Vec<BindBase<O>>,
}

impl<O: Injectable> Members<O> {
    fn collect() -> Self {
        let mut members = Members {
            members: Vec::new(),
            bases: Vec::new(),
        };
        O::members(&mut members);
        members
    }

    /// Starts an injectable field named `name`.
    pub fn field(&mut self, name: &'static str) -> FieldBuilder<'_, O> {
        FieldBuilder {
            members: self,
            name,
            annotations: Vec::new(),
        }
    }

    /// Starts an injectable method named `name`.
    pub fn method(&mut self, name: &'static str) -> MethodBuilder<'_, O> {
        MethodBuilder {
            members: self,
            name,
            parameter_annotations: Vec::new(),
        }
    }

    /// Declares `B` as the base level of `O`, reached through `project`.
    ///
    /// The base level's members are bound after this level's members.
    pub fn base<B, F>(&mut self, project: F) -> &mut Self
    where
        B: Injectable,
        F: Fn(&mut O) -> &mut B + 'static,
    {
        self.bases.push(Box::new(move |graph: &ObjectGraph, object: &mut O, failures: &mut Vec<GraphError>| {
            bind_level(graph, project(object), failures)
        }));
        self
    }
}

/// Fluent declaration of one injectable field.
pub struct FieldBuilder<'a, O> {
    members: &'a mut Members<O>,
    name: &'static str,
    annotations: Vec<Annotation>,
}

impl<'a, O: Injectable> FieldBuilder<'a, O> {
    /// Qualifies the field with `Named(value)`.
    pub fn named(self, value: impl Into<String>) -> Self {
        self.annotated(Annotation::named(value))
    }

    pub fn qualified(self, qualifier: impl Qualifier) -> Self {
        self.annotated(qualifier.annotation())
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    fn declaration<D: Injected>(mut self) -> (&'a mut Members<O>, Declaration) {
        if D::NULLABLE {
            self.annotations.push(Annotation::nullable());
        }
        let declaration = Declaration::new(SiteId::of::<O>(self.name), DeclaredType::of::<D>(), self.annotations);
        (self.members, declaration)
    }

    /// Finishes an instance field declared as `D`, assigned by `setter`.
    pub fn inject<D, F>(self, setter: F)
    where
        D: Injected,
        F: Fn(&mut O, D) + 'static,
    {
        let (members, declaration) = self.declaration::<D>();
        members.members.push(Member::Field {
            declaration,
            bind: Box::new(move |object: &mut O, argument: &Argument| {
                setter(object, D::from_argument(argument)?);
                Ok(())
            }),
        });
    }

    /// Finishes a static field declared as `D`.
    ///
    /// The field is re-resolved and re-assigned on every `inject` call, for
    /// any instance of `O`: the last writer wins.
    pub fn inject_static<D, F>(self, setter: F)
    where
        D: Injected,
        F: Fn(D) + 'static,
    {
        let (members, declaration) = self.declaration::<D>();
        members.members.push(Member::Static {
            declaration,
            bind: Box::new(move |argument: &Argument| {
                setter(D::from_argument(argument)?);
                Ok(())
            }),
        });
    }
}

/// Fluent declaration of one injectable method.
pub struct MethodBuilder<'a, O> {
    members: &'a mut Members<O>,
    name: &'static str,
    parameter_annotations: Vec<(usize, Annotation)>,
}

impl<'a, O: Injectable> MethodBuilder<'a, O> {
    /// Attaches an annotation (typically a qualifier) to parameter `index`.
    pub fn annotate_parameter(mut self, index: usize, annotation: Annotation) -> Self {
        self.parameter_annotations.push((index, annotation));
        self
    }

    /// Finishes the method; `method` receives the parameter tuple `P`.
    ///
    /// # Panics
    ///
    /// Panics if a parameter annotation index is out of bounds.
    pub fn inject<P, F>(self, method: F)
    where
        P: Parameters,
        F: Fn(&mut O, P) + 'static,
    {
        let mut declaration = MethodDeclaration::new(SiteId::of::<O>(self.name), P::declarations());
        for (index, annotation) in self.parameter_annotations {
            declaration.annotate_parameter(index, annotation);
        }
        self.members.members.push(Member::Method {
            method: declaration,
            bind: Box::new(move |object: &mut O, arguments: &[Argument]| {
                method(object, P::extract(arguments)?);
                Ok(())
            }),
        });
    }
}

fn bind_level<O: Injectable>(graph: &ObjectGraph, object: &mut O, failures: &mut Vec<GraphError>) {
    let level = Members::<O>::collect();
    for member in &level.members {
        if let Err(err) = member.bind(graph, object) {
            graph.observers().binding_failed(&err);
            failures.push(err);
        }
    }
    for base in &level.bases {
        base(graph, object, failures);
    }
}

/// Binds every level of `object`, continuing past failed members.
pub(crate) fn inject_into<O: Injectable>(graph: &ObjectGraph, object: &mut O) -> GraphResult<()> {
    let mut failures = Vec::new();
    bind_level(graph, object, &mut failures);

    if failures.len() > 1 {
        return Err(GraphError::Incomplete {
            owner: std::any::type_name::<O>(),
            failures,
        });
    }
    match failures.pop() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Bindings, Module};
    use std::sync::Arc;

    struct Values;

    impl Module for Values {
        fn provides(bindings: &mut Bindings<Self>) {
            bindings.provides::<u8>("byte").to(|_| 8);
        }
    }

    #[derive(Default)]
    struct Base {
        byte: Option<Arc<u8>>,
    }

    impl Injectable for Base {
        fn members(members: &mut Members<Self>) {
            members.field("byte").inject(|b, v: Arc<u8>| b.byte = Some(v));
        }
    }

    #[derive(Default)]
    struct Derived {
        base: Base,
        order: Vec<&'static str>,
        missing: Option<Arc<u16>>,
    }

    impl Injectable for Derived {
        fn members(members: &mut Members<Self>) {
            members.base(|d| &mut d.base);
            members.method("record").inject(|d, (_,): (Arc<u8>,)| d.order.push("method"));
            members
                .field("missing")
                .inject(|d, v: Option<Arc<u16>>| d.missing = v);
        }
    }

    #[test]
    fn binds_own_members_then_base() {
        let graph = ObjectGraph::builder().module(Values).build().unwrap();
        let mut derived = Derived::default();
        graph.inject(&mut derived).unwrap();
        assert_eq!(derived.order, vec!["method"]);
        assert_eq!(derived.base.byte.as_deref(), Some(&8));
        assert!(derived.missing.is_none());
    }

    #[test]
    fn collects_every_failure() {
        let graph = ObjectGraph::builder().build().unwrap();
        let mut derived = Derived::default();
        match graph.inject(&mut derived) {
            Err(GraphError::Incomplete { failures, .. }) => assert_eq!(failures.len(), 2),
            other => panic!("expected Incomplete, got {:?}", other),
        }
    }
}
