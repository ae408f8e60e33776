//! Binding data model and the oracle seam to the external resolver.
//!
//! Bindings are read-only snapshots of what a resolver reported about a
//! type: its supertype, interfaces, methods, and annotations. Identity is
//! the qualified name. The graph formed by superclass and interface links
//! is expected to be acyclic, but traversals elsewhere in this crate guard
//! against cycles anyway — resolver output is not trusted that far.
//!
//! [`BindingStore`] is the in-memory oracle implementation used by tests,
//! the CLI, and embedders that already hold a full universe. A live IDE
//! integration would implement [`BindingOracle`] over its own resolver.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The external resolver could not resolve a required element.
///
/// Terminal for the current call; discovery surfaces it unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    #[error("unknown type '{0}'")]
    UnknownType(String),
}

/// What kind of declaration a binding describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Annotation,
}

/// An annotation occurrence on a declaration.
///
/// `annotation_type` is `None` when the resolver could not resolve the
/// annotation's type; such entries never match anything and never error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationUse {
    pub annotation_type: Option<String>,
}

impl AnnotationUse {
    /// An annotation whose type resolved to `name`.
    pub fn resolved(name: impl Into<String>) -> Self {
        AnnotationUse {
            annotation_type: Some(name.into()),
        }
    }

    /// An annotation the resolver could not resolve.
    pub fn unresolved() -> Self {
        AnnotationUse {
            annotation_type: None,
        }
    }
}

fn default_public() -> bool {
    true
}

/// A declared method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodBinding {
    pub name: String,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default = "default_public")]
    pub is_public: bool,
    #[serde(default)]
    pub parameter_count: usize,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
}

impl MethodBinding {
    /// A public instance method with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        MethodBinding {
            name: name.into(),
            is_static: false,
            is_public: true,
            parameter_count: 0,
            return_type: None,
            annotations: Vec::new(),
        }
    }

    /// A public static method with no parameters.
    pub fn static_method(name: impl Into<String>) -> Self {
        MethodBinding {
            is_static: true,
            ..MethodBinding::new(name)
        }
    }

    /// Add a resolved annotation.
    pub fn with_annotation(mut self, annotation_type: impl Into<String>) -> Self {
        self.annotations.push(AnnotationUse::resolved(annotation_type));
        self
    }

    /// Set the return type.
    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    /// Set the parameter count.
    pub fn with_parameters(mut self, count: usize) -> Self {
        self.parameter_count = count;
        self
    }
}

/// A resolved type: the unit of classification.
///
/// Annotation types are themselves `TypeBinding`s (kind
/// [`TypeKind::Annotation`]) whose `annotations` field holds their
/// meta-annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBinding {
    pub qualified_name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodBinding>,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
}

impl TypeBinding {
    fn named(name: impl Into<String>, kind: TypeKind) -> Self {
        TypeBinding {
            qualified_name: name.into(),
            kind,
            is_abstract: false,
            superclass: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// A concrete class.
    pub fn class(name: impl Into<String>) -> Self {
        TypeBinding::named(name, TypeKind::Class)
    }

    /// An interface.
    pub fn interface(name: impl Into<String>) -> Self {
        TypeBinding::named(name, TypeKind::Interface)
    }

    /// An annotation type.
    pub fn annotation(name: impl Into<String>) -> Self {
        TypeBinding::named(name, TypeKind::Annotation)
    }

    /// Mark the type abstract.
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Set the superclass.
    pub fn with_superclass(mut self, name: impl Into<String>) -> Self {
        self.superclass = Some(name.into());
        self
    }

    /// Add a declared interface.
    pub fn with_interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    /// Add a declared method.
    pub fn with_method(mut self, method: MethodBinding) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a resolved annotation (on the type itself).
    pub fn with_annotation(mut self, annotation_type: impl Into<String>) -> Self {
        self.annotations.push(AnnotationUse::resolved(annotation_type));
        self
    }

    /// Add an annotation entry as-is (resolved or not).
    pub fn with_annotation_use(mut self, annotation: AnnotationUse) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// Read-only binding lookup.
///
/// Unresolvable names yield `None`, mirroring a resolver that returns null
/// bindings; callers treat missing bindings as "does not match" rather
/// than an error.
pub trait BindingOracle {
    /// Resolve a qualified name to its binding, if the resolver knows it.
    fn resolve_type(&self, qualified_name: &str) -> Option<&TypeBinding>;
}

/// An in-memory type universe keyed by qualified name.
///
/// Regions partition the universe into search boundaries (a project, a
/// package); a type may belong to at most one region here, which is all
/// discovery needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BindingStore {
    types: BTreeMap<String, TypeBinding>,
    #[serde(default)]
    regions: BTreeMap<String, BTreeSet<String>>,
}

impl BindingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        BindingStore::default()
    }

    /// Insert a type, keyed by its qualified name. Replaces any previous
    /// binding with the same name.
    pub fn insert(&mut self, binding: TypeBinding) {
        self.types.insert(binding.qualified_name.clone(), binding);
    }

    /// Assign a type to a region, creating the region on first use.
    pub fn assign_region(&mut self, region: impl Into<String>, type_name: impl Into<String>) {
        self.regions
            .entry(region.into())
            .or_default()
            .insert(type_name.into());
    }

    /// The member set of a region, if the region exists.
    pub fn region(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.regions.get(name)
    }

    /// The region a type belongs to, if any.
    pub fn region_of(&self, type_name: &str) -> Option<&str> {
        self.regions
            .iter()
            .find(|(_, members)| members.contains(type_name))
            .map(|(name, _)| name.as_str())
    }

    /// All stored types in name order.
    pub fn types(&self) -> impl Iterator<Item = &TypeBinding> {
        self.types.values()
    }

    /// Number of stored types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the store holds no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl BindingOracle for BindingStore {
    fn resolve_type(&self, qualified_name: &str) -> Option<&TypeBinding> {
        self.types.get(qualified_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_resolves_by_qualified_name() {
        let mut store = BindingStore::new();
        store.insert(TypeBinding::class("com.example.Widget"));

        assert!(store.resolve_type("com.example.Widget").is_some());
        assert!(store.resolve_type("com.example.Missing").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn insert_replaces_same_name() {
        let mut store = BindingStore::new();
        store.insert(TypeBinding::class("com.example.Widget"));
        store.insert(TypeBinding::class("com.example.Widget").abstract_type());

        assert_eq!(store.len(), 1);
        assert!(store.resolve_type("com.example.Widget").unwrap().is_abstract);
    }

    #[test]
    fn regions_track_membership() {
        let mut store = BindingStore::new();
        store.insert(TypeBinding::class("com.example.A"));
        store.assign_region("proj", "com.example.A");

        assert!(store.region("proj").unwrap().contains("com.example.A"));
        assert_eq!(store.region_of("com.example.A"), Some("proj"));
        assert_eq!(store.region_of("com.example.B"), None);
        assert!(store.region("other").is_none());
    }

    #[test]
    fn builder_produces_expected_shape() {
        let ty = TypeBinding::class("com.example.Derived")
            .abstract_type()
            .with_superclass("com.example.Base")
            .with_interface("java.io.Serializable")
            .with_annotation("org.junit.runner.RunWith")
            .with_method(MethodBinding::new("check").with_annotation("org.junit.Test"));

        assert!(ty.is_abstract);
        assert_eq!(ty.superclass.as_deref(), Some("com.example.Base"));
        assert_eq!(ty.interfaces, vec!["java.io.Serializable"]);
        assert_eq!(
            ty.annotations[0].annotation_type.as_deref(),
            Some("org.junit.runner.RunWith")
        );
        assert_eq!(ty.methods[0].name, "check");
    }

    #[test]
    fn binding_round_trips_through_json_with_defaults() {
        let json = r#"{
            "qualified_name": "com.example.Plain",
            "methods": [{ "name": "run" }]
        }"#;
        let ty: TypeBinding = serde_json::from_str(json).unwrap();
        assert_eq!(ty.kind, TypeKind::Class);
        assert!(!ty.is_abstract);
        assert!(ty.superclass.is_none());
        // Methods default to public instance methods.
        assert!(ty.methods[0].is_public);
        assert!(!ty.methods[0].is_static);

        let back: TypeBinding =
            serde_json::from_str(&serde_json::to_string(&ty).unwrap()).unwrap();
        assert_eq!(back, ty);
    }

    #[test]
    fn store_round_trips_through_json() {
        let mut store = BindingStore::new();
        store.insert(TypeBinding::interface("junit.framework.Test"));
        store.assign_region("proj", "junit.framework.Test");

        let json = serde_json::to_string(&store).unwrap();
        let back: BindingStore = serde_json::from_str(&json).unwrap();
        assert!(back.resolve_type("junit.framework.Test").is_some());
        assert_eq!(back.region_of("junit.framework.Test"), Some("proj"));
    }
}
