//! Annotation marker matching.
//!
//! A [`Marker`] is a target annotation qualified name. Plain markers match
//! by exact name equality against a declaration's annotations. Meta markers
//! additionally match when the target name appears anywhere in the
//! meta-annotation closure — the annotations on the annotation's type,
//! transitively. Real annotation graphs can be cyclic (self-referential or
//! mutually meta-annotated annotations), so the closure walk carries a
//! visited set and terminates in O(distinct annotation types reachable).
//!
//! Two hierarchy-aware traversals serve the classifier:
//! superclass-chain matching for type-level markers, and the two-phase
//! method scan (superclass chain first, then the interface graph) for
//! method-level markers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::binding::{AnnotationUse, BindingOracle, TypeBinding};

/// Qualified names of the markers driving classification.
///
/// The defaults are the JUnit constants; embedders targeting another
/// framework swap in their own names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestMarkers {
    /// Type-level runner marker.
    pub run_with: String,
    /// Method-level test marker.
    pub test: String,
    /// Meta marker: matches through the meta-annotation closure.
    pub testable: String,
    /// Structural marker interface detected by implementation.
    pub legacy_test_interface: String,
    /// Name of the static suite-factory method.
    pub suite_method_name: String,
}

impl Default for TestMarkers {
    fn default() -> Self {
        TestMarkers {
            run_with: "org.junit.runner.RunWith".to_string(),
            test: "org.junit.Test".to_string(),
            testable: "org.junit.platform.commons.annotation.Testable".to_string(),
            legacy_test_interface: "junit.framework.Test".to_string(),
            suite_method_name: "suite".to_string(),
        }
    }
}

/// A single target annotation to match declarations against.
///
/// Comparison is exact qualified-name string equality; no patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    name: String,
    meta: bool,
}

impl Marker {
    /// A marker matched by direct name equality only.
    pub fn plain(name: impl Into<String>) -> Self {
        Marker {
            name: name.into(),
            meta: false,
        }
    }

    /// A marker also matched through the meta-annotation closure.
    pub fn meta(name: impl Into<String>) -> Self {
        Marker {
            name: name.into(),
            meta: true,
        }
    }

    /// The target qualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether any annotation in the sequence matches this marker.
    ///
    /// Unresolved entries are skipped, never an error.
    pub fn annotates(&self, annotations: &[AnnotationUse], oracle: &dyn BindingOracle) -> bool {
        annotations.iter().any(|a| self.matches_use(a, oracle))
    }

    /// Whether this marker annotates the type or any class on its
    /// superclass chain. First match wins; a repeated superclass name
    /// (a malformed cyclic chain) ends the walk.
    pub fn annotates_type_or_supertypes(
        &self,
        ty: &TypeBinding,
        oracle: &dyn BindingOracle,
    ) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(ty);
        while let Some(binding) = current {
            if !visited.insert(binding.qualified_name.clone()) {
                return false;
            }
            if self.annotates(&binding.annotations, oracle) {
                return true;
            }
            current = binding
                .superclass
                .as_deref()
                .and_then(|name| oracle.resolve_type(name));
        }
        false
    }

    /// Whether this marker annotates at least one method reachable from
    /// the type.
    ///
    /// Phase one scans the declared methods of the type and of every
    /// superclass. Phase two searches depth-first through the interfaces
    /// of the type and of every superclass, including inherited interfaces
    /// of interfaces.
    pub fn annotates_at_least_one_method(
        &self,
        ty: &TypeBinding,
        oracle: &dyn BindingOracle,
    ) -> bool {
        let mut chain_guard = HashSet::new();
        let mut current = Some(ty);
        while let Some(binding) = current {
            if !chain_guard.insert(binding.qualified_name.clone()) {
                break;
            }
            if self.annotates_declared_methods(binding, oracle) {
                return true;
            }
            current = binding
                .superclass
                .as_deref()
                .and_then(|name| oracle.resolve_type(name));
        }

        let mut interface_guard = HashSet::new();
        chain_guard.clear();
        current = Some(ty);
        while let Some(binding) = current {
            if !chain_guard.insert(binding.qualified_name.clone()) {
                break;
            }
            for interface in &binding.interfaces {
                if self.annotates_interface_methods(interface, oracle, &mut interface_guard) {
                    return true;
                }
            }
            current = binding
                .superclass
                .as_deref()
                .and_then(|name| oracle.resolve_type(name));
        }

        false
    }

    fn annotates_interface_methods(
        &self,
        interface: &str,
        oracle: &dyn BindingOracle,
        visited: &mut HashSet<String>,
    ) -> bool {
        if !visited.insert(interface.to_string()) {
            return false;
        }
        let Some(binding) = oracle.resolve_type(interface) else {
            return false;
        };
        if self.annotates_declared_methods(binding, oracle) {
            return true;
        }
        binding
            .interfaces
            .iter()
            .any(|inherited| self.annotates_interface_methods(inherited, oracle, visited))
    }

    fn annotates_declared_methods(&self, ty: &TypeBinding, oracle: &dyn BindingOracle) -> bool {
        ty.methods
            .iter()
            .any(|m| self.annotates(&m.annotations, oracle))
    }

    fn matches_use(&self, annotation: &AnnotationUse, oracle: &dyn BindingOracle) -> bool {
        let Some(annotation_type) = annotation.annotation_type.as_deref() else {
            return false;
        };
        if annotation_type == self.name {
            return true;
        }
        self.meta && self.meta_closure_contains(annotation_type, oracle)
    }

    /// Depth-first over "annotations on the annotation's type",
    /// visited-set guarded so cyclic meta-annotation graphs terminate.
    fn meta_closure_contains(&self, annotation_type: &str, oracle: &dyn BindingOracle) -> bool {
        let mut seen: HashSet<String> = HashSet::new();
        let mut stack: Vec<String> = Vec::new();
        push_meta_annotations(annotation_type, oracle, &mut stack);

        while let Some(name) = stack.pop() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if name == self.name {
                return true;
            }
            push_meta_annotations(&name, oracle, &mut stack);
        }
        false
    }
}

fn push_meta_annotations(
    annotation_type: &str,
    oracle: &dyn BindingOracle,
    stack: &mut Vec<String>,
) {
    if let Some(binding) = oracle.resolve_type(annotation_type) {
        for meta in &binding.annotations {
            if let Some(name) = &meta.annotation_type {
                stack.push(name.clone());
            }
        }
    }
}
