//! Scope-wide test discovery over a type hierarchy.
//!
//! Given a search scope — a single type or a named region — discovery
//! computes the type hierarchy reachable from the scope's containing
//! region, classifies every in-region class, and unions in the two
//! structural rules (legacy interface implementors, suite-factory
//! declarations). Once a type is confirmed, every direct and transitive
//! subclass is included without re-classification: a subclass of a test
//! class inherits the test behavior. Result-set membership doubles as the
//! recursion guard, so redundant paths and malformed cycles stay bounded.
//!
//! Discovery is all-or-nothing: resolution failures and cancellation both
//! abort the walk, with partial results discarded.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use sift_core::progress::{Cancelled, ProgressSink};

use crate::binding::{BindingOracle, BindingStore, ResolutionError, TypeKind};
use crate::classify::TestClassifier;
use crate::search::TestSearchEngine;

/// A search boundary: one type, or a named region of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// A single type by qualified name.
    Type(String),
    /// A named region (a package, a project).
    Region(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Type(name) => write!(f, "type {name}"),
            Scope::Region(name) => write!(f, "region {name}"),
        }
    }
}

/// Why discovery stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// The hierarchy oracle could not resolve the scope.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Cooperative cancellation; partial results were discarded.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// The type hierarchy reachable from a scope's containing region.
///
/// `classes` is the closure of the region's classes with their supertype
/// chains and subtype trees; `contains` answers region membership, which
/// is narrower than closure membership.
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    classes: Vec<String>,
    subclasses: BTreeMap<String, Vec<String>>,
    region: BTreeSet<String>,
}

impl TypeHierarchy {
    /// Assemble a hierarchy from precomputed parts.
    pub fn new(
        classes: Vec<String>,
        subclasses: BTreeMap<String, Vec<String>>,
        region: BTreeSet<String>,
    ) -> Self {
        TypeHierarchy {
            classes,
            subclasses,
            region,
        }
    }

    /// Every class in the hierarchy closure, region members and beyond.
    pub fn all_classes(&self) -> &[String] {
        &self.classes
    }

    /// Direct subclasses of a class, empty when none are known.
    pub fn subclasses_of(&self, name: &str) -> &[String] {
        self.subclasses
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the name lies within the original scope region.
    pub fn contains(&self, name: &str) -> bool {
        self.region.contains(name)
    }

    /// The names making up the scope region itself.
    pub fn region_members(&self) -> &BTreeSet<String> {
        &self.region
    }
}

/// Resolves a scope to its containing region's type hierarchy.
///
/// Failures here are terminal for the discovery call and bubble to the
/// caller unmodified.
pub trait HierarchyOracle {
    fn hierarchy(&self, scope: &Scope) -> Result<TypeHierarchy, ResolutionError>;
}

impl HierarchyOracle for BindingStore {
    fn hierarchy(&self, scope: &Scope) -> Result<TypeHierarchy, ResolutionError> {
        let region: BTreeSet<String> = match scope {
            Scope::Region(name) => self
                .region(name)
                .cloned()
                .ok_or_else(|| ResolutionError::UnknownRegion(name.clone()))?,
            Scope::Type(name) => {
                if self.resolve_type(name).is_none() {
                    return Err(ResolutionError::UnknownType(name.clone()));
                }
                BTreeSet::from([name.clone()])
            }
        };

        let mut subclasses: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for ty in self.types() {
            if ty.kind != TypeKind::Class {
                continue;
            }
            if let Some(superclass) = &ty.superclass {
                subclasses
                    .entry(superclass.clone())
                    .or_default()
                    .push(ty.qualified_name.clone());
            }
        }

        // Closure: region classes plus their supertype chains and subtype
        // trees. The classes set doubles as the traversal guard.
        let mut classes: BTreeSet<String> = BTreeSet::new();
        let mut stack: Vec<String> = region.iter().cloned().collect();
        while let Some(name) = stack.pop() {
            let Some(ty) = self.resolve_type(&name) else {
                continue;
            };
            if ty.kind != TypeKind::Class || !classes.insert(name.clone()) {
                continue;
            }
            if let Some(superclass) = &ty.superclass {
                stack.push(superclass.clone());
            }
            if let Some(subs) = subclasses.get(&name) {
                stack.extend(subs.iter().cloned());
            }
        }

        Ok(TypeHierarchy::new(
            classes.into_iter().collect(),
            subclasses,
            region,
        ))
    }
}

/// Drives classification over every candidate reachable from a scope.
pub struct TestDiscovery<'a> {
    bindings: &'a dyn BindingOracle,
    hierarchy: &'a dyn HierarchyOracle,
    classifier: &'a TestClassifier,
    search: &'a dyn TestSearchEngine,
}

impl<'a> TestDiscovery<'a> {
    /// Wire discovery up to its collaborators.
    pub fn new(
        bindings: &'a dyn BindingOracle,
        hierarchy: &'a dyn HierarchyOracle,
        classifier: &'a TestClassifier,
        search: &'a dyn TestSearchEngine,
    ) -> Self {
        TestDiscovery {
            bindings,
            hierarchy,
            classifier,
            search,
        }
    }

    /// Enumerate every confirmed test type reachable from `scope`.
    ///
    /// Cancellation is polled once per candidate; a cancelled sink aborts
    /// the walk and the accumulated partial set is discarded.
    pub fn find_tests(
        &self,
        scope: &Scope,
        pm: &dyn ProgressSink,
    ) -> Result<BTreeSet<String>, DiscoveryError> {
        pm.check_cancelled()?;

        // A single already-confirmed type needs no hierarchy walk.
        if let Scope::Type(name) = scope {
            if self
                .classifier
                .is_test_named(name, self.bindings, self.search)
            {
                debug!(type_name = %name, "single-type scope confirmed directly");
                return Ok(BTreeSet::from([name.clone()]));
            }
        }

        let hierarchy = self.hierarchy.hierarchy(scope)?;
        let mut result = BTreeSet::new();

        for name in hierarchy.all_classes() {
            pm.check_cancelled()?;
            if hierarchy.contains(name)
                && self
                    .classifier
                    .is_test_named(name, self.bindings, self.search)
            {
                add_type_and_subtypes(name, &hierarchy, &mut result);
            }
            pm.worked(1);
        }

        let region: Vec<String> = hierarchy.region_members().iter().cloned().collect();

        pm.check_cancelled()?;
        result.extend(self.search.find_test_implementors(&region, self.bindings)?);

        pm.check_cancelled()?;
        result.extend(
            self.search
                .find_suite_factory_methods(&region, self.bindings)?,
        );

        debug!(scope = %scope, tests = result.len(), "discovery complete");
        Ok(result)
    }
}

/// Add a confirmed type and, unconditionally, its whole subclass tree.
/// The insert result guards against re-descending shared paths.
fn add_type_and_subtypes(name: &str, hierarchy: &TypeHierarchy, result: &mut BTreeSet<String>) {
    if result.insert(name.to_string()) {
        for subclass in hierarchy.subclasses_of(name) {
            add_type_and_subtypes(subclass, hierarchy, result);
        }
    }
}
