//! Explicit descriptions of declaration sites.
//!
//! These stand in for runtime reflection: injectable types and modules
//! describe their fields, methods and parameters, and the
//! [`SignatureCache`](crate::SignatureCache) derives signatures from them.

use crate::inject::Injected;
use crate::key::SiteId;
use crate::qualifier::{Annotation, Qualifier};
use crate::signature::DeclaredType;

/// A field, or the return value of a provider method.
#[derive(Debug, Clone)]
pub struct Declaration {
    site: SiteId,
    declared: DeclaredType,
    annotations: Vec<Annotation>,
}

impl Declaration {
    pub fn new(site: SiteId, declared: DeclaredType, annotations: Vec<Annotation>) -> Self {
        Self { site, declared, annotations }
    }

    pub fn site(&self) -> SiteId {
        self.site
    }

    pub fn declared(&self) -> &DeclaredType {
        &self.declared
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// One parameter of an injectable method or provider method.
#[derive(Debug, Clone)]
pub struct Parameter {
    declared: DeclaredType,
    annotations: Vec<Annotation>,
}

impl Parameter {
    pub fn new(declared: DeclaredType, annotations: Vec<Annotation>) -> Self {
        Self { declared, annotations }
    }

    /// Parameter declared as `D`; `Option<..>` parameters carry the
    /// nullability marker.
    pub fn of<D: Injected>() -> Self {
        let annotations = if D::NULLABLE {
            vec![Annotation::nullable()]
        } else {
            Vec::new()
        };
        Self::new(DeclaredType::of::<D>(), annotations)
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn qualified(self, qualifier: impl Qualifier) -> Self {
        self.annotated(qualifier.annotation())
    }

    pub fn declared(&self) -> &DeclaredType {
        &self.declared
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// A method whose parameters are resolved from a graph.
#[derive(Debug, Clone)]
pub struct MethodDeclaration {
    site: SiteId,
    parameters: Vec<Parameter>,
}

impl MethodDeclaration {
    pub fn new(site: SiteId, parameters: Vec<Parameter>) -> Self {
        Self { site, parameters }
    }

    pub fn site(&self) -> SiteId {
        self.site
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Attaches an annotation to the parameter at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds, which is a declaration mistake.
    pub(crate) fn annotate_parameter(&mut self, index: usize, annotation: Annotation) {
        let site = self.site;
        let count = self.parameters.len();
        match self.parameters.get_mut(index) {
            Some(parameter) => parameter.annotations.push(annotation),
            None => panic!("{} declares {} parameters, cannot annotate parameter {}", site, count, index),
        }
    }
}
