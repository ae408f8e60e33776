//! Structural test detection: legacy interface implementors and
//! suite-factory methods.
//!
//! Two detection rules predate annotation markers and are still honored:
//! implementing the legacy marker interface, and exposing the recognized
//! static suite-factory method signature. [`TestSearchEngine`] is the seam
//! discovery and classification consume; [`StructuralSearchEngine`]
//! computes both rules directly from bindings.

use std::collections::HashSet;

use tracing::debug;

use crate::binding::{BindingOracle, MethodBinding, ResolutionError, TypeBinding, TypeKind};
use crate::markers::TestMarkers;

/// Capability queries for the legacy-interface and suite-method rules.
///
/// The region-scoped finders take the candidate names already limited to
/// the search region; implementations may fail on unresolvable input.
pub trait TestSearchEngine {
    /// Whether the type implements the legacy marker interface,
    /// transitively through superclasses and superinterfaces.
    fn is_test_implementor(&self, ty: &TypeBinding, oracle: &dyn BindingOracle) -> bool;

    /// The region candidates that are concrete classes implementing the
    /// legacy marker interface.
    fn find_test_implementors(
        &self,
        region_types: &[String],
        oracle: &dyn BindingOracle,
    ) -> Result<Vec<String>, ResolutionError>;

    /// The region candidates declaring a recognized static suite-factory
    /// method.
    fn find_suite_factory_methods(
        &self,
        region_types: &[String],
        oracle: &dyn BindingOracle,
    ) -> Result<Vec<String>, ResolutionError>;
}

/// Default engine: both rules computed structurally from bindings.
#[derive(Debug, Clone)]
pub struct StructuralSearchEngine {
    markers: TestMarkers,
}

impl StructuralSearchEngine {
    /// Create an engine for the given marker names.
    pub fn new(markers: TestMarkers) -> Self {
        StructuralSearchEngine { markers }
    }

    /// Whether the type declares a recognized suite-factory method:
    /// `public static`, zero parameters, named per the configuration,
    /// returning the legacy interface (or a type implementing it).
    pub fn has_suite_method(&self, ty: &TypeBinding, oracle: &dyn BindingOracle) -> bool {
        ty.methods.iter().any(|m| self.is_suite_method(m, oracle))
    }

    fn is_suite_method(&self, method: &MethodBinding, oracle: &dyn BindingOracle) -> bool {
        if method.name != self.markers.suite_method_name
            || !method.is_static
            || !method.is_public
            || method.parameter_count != 0
        {
            return false;
        }
        match method.return_type.as_deref() {
            None => false,
            Some(rt) if rt == self.markers.legacy_test_interface => true,
            Some(rt) => oracle
                .resolve_type(rt)
                .is_some_and(|binding| self.implements_legacy(binding, oracle)),
        }
    }

    /// Visited-set DFS over the interface graph reachable from the type
    /// and its superclass chain.
    fn implements_legacy(&self, ty: &TypeBinding, oracle: &dyn BindingOracle) -> bool {
        let target = self.markers.legacy_test_interface.as_str();
        if ty.qualified_name == target {
            return true;
        }

        let mut stack: Vec<String> = Vec::new();
        let mut chain_guard = HashSet::new();
        let mut current = Some(ty);
        while let Some(binding) = current {
            if !chain_guard.insert(binding.qualified_name.clone()) {
                break;
            }
            stack.extend(binding.interfaces.iter().cloned());
            current = binding
                .superclass
                .as_deref()
                .and_then(|name| oracle.resolve_type(name));
        }

        let mut seen: HashSet<String> = HashSet::new();
        while let Some(name) = stack.pop() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if name == target {
                return true;
            }
            if let Some(interface) = oracle.resolve_type(&name) {
                stack.extend(interface.interfaces.iter().cloned());
            }
        }
        false
    }
}

impl Default for StructuralSearchEngine {
    fn default() -> Self {
        StructuralSearchEngine::new(TestMarkers::default())
    }
}

impl TestSearchEngine for StructuralSearchEngine {
    fn is_test_implementor(&self, ty: &TypeBinding, oracle: &dyn BindingOracle) -> bool {
        ty.kind == TypeKind::Class && self.implements_legacy(ty, oracle)
    }

    fn find_test_implementors(
        &self,
        region_types: &[String],
        oracle: &dyn BindingOracle,
    ) -> Result<Vec<String>, ResolutionError> {
        let mut found = Vec::new();
        for name in region_types {
            let Some(ty) = oracle.resolve_type(name) else {
                continue;
            };
            if ty.kind == TypeKind::Class && !ty.is_abstract && self.implements_legacy(ty, oracle)
            {
                found.push(name.clone());
            }
        }
        debug!(count = found.len(), "legacy test-interface implementors");
        Ok(found)
    }

    fn find_suite_factory_methods(
        &self,
        region_types: &[String],
        oracle: &dyn BindingOracle,
    ) -> Result<Vec<String>, ResolutionError> {
        let mut found = Vec::new();
        for name in region_types {
            let Some(ty) = oracle.resolve_type(name) else {
                continue;
            };
            if ty.kind == TypeKind::Class && self.has_suite_method(ty, oracle) {
                found.push(name.clone());
            }
        }
        debug!(count = found.len(), "suite-factory method declarations");
        Ok(found)
    }
}
