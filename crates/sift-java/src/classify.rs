//! Per-type test classification.
//!
//! The decision policy, evaluated in order with short-circuiting:
//!
//! 1. abstract types are never tests;
//! 2. the run-with marker on the type or a superclass;
//! 3. the test marker on a reachable method;
//! 4. the testable meta marker on a reachable method;
//! 5. the testable meta marker on the type or a superclass;
//! 6. otherwise, the legacy test-interface capability decides.
//!
//! Class-level markers come before the costlier method scans, and the
//! structural fallback comes last because interface-implementation
//! analysis is the most expensive query.

use tracing::trace;

use crate::binding::{BindingOracle, TypeBinding};
use crate::markers::{Marker, TestMarkers};
use crate::search::TestSearchEngine;

/// Decides whether a type is a runnable test.
#[derive(Debug, Clone)]
pub struct TestClassifier {
    markers: TestMarkers,
    run_with: Marker,
    test: Marker,
    testable: Marker,
}

impl TestClassifier {
    /// Create a classifier for the given marker names.
    pub fn new(markers: TestMarkers) -> Self {
        let run_with = Marker::plain(&markers.run_with);
        let test = Marker::plain(&markers.test);
        let testable = Marker::meta(&markers.testable);
        TestClassifier {
            markers,
            run_with,
            test,
            testable,
        }
    }

    /// The marker configuration this classifier was built from.
    pub fn markers(&self) -> &TestMarkers {
        &self.markers
    }

    /// Whether `ty` is a runnable test.
    ///
    /// Suite-factory declarations are not part of this policy; discovery
    /// unions them in separately per region.
    pub fn is_test(
        &self,
        ty: &TypeBinding,
        oracle: &dyn BindingOracle,
        search: &dyn TestSearchEngine,
    ) -> bool {
        if ty.is_abstract {
            return false;
        }
        if self.run_with.annotates_type_or_supertypes(ty, oracle)
            || self.test.annotates_at_least_one_method(ty, oracle)
            || self.testable.annotates_at_least_one_method(ty, oracle)
            || self.testable.annotates_type_or_supertypes(ty, oracle)
        {
            return true;
        }
        search.is_test_implementor(ty, oracle)
    }

    /// Classify by qualified name through the oracle.
    ///
    /// This is the degraded entry point for elements without attached
    /// source: whatever partial binding the oracle can produce is used,
    /// and a name yielding no binding at all classifies as not-a-test
    /// rather than raising.
    pub fn is_test_named(
        &self,
        qualified_name: &str,
        oracle: &dyn BindingOracle,
        search: &dyn TestSearchEngine,
    ) -> bool {
        match oracle.resolve_type(qualified_name) {
            Some(ty) => self.is_test(ty, oracle, search),
            None => {
                trace!(type_name = qualified_name, "no binding, classified as non-test");
                false
            }
        }
    }
}

impl Default for TestClassifier {
    fn default() -> Self {
        TestClassifier::new(TestMarkers::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingStore, MethodBinding};
    use crate::search::StructuralSearchEngine;

    const RUN_WITH: &str = "org.junit.runner.RunWith";
    const TEST: &str = "org.junit.Test";
    const TESTABLE: &str = "org.junit.platform.commons.annotation.Testable";
    const LEGACY: &str = "junit.framework.Test";

    struct Fixture {
        store: BindingStore,
        classifier: TestClassifier,
        search: StructuralSearchEngine,
    }

    impl Fixture {
        fn new(types: Vec<TypeBinding>) -> Self {
            let mut store = BindingStore::new();
            for ty in types {
                store.insert(ty);
            }
            Fixture {
                store,
                classifier: TestClassifier::default(),
                search: StructuralSearchEngine::new(TestMarkers::default()),
            }
        }

        fn is_test(&self, name: &str) -> bool {
            self.classifier.is_test_named(name, &self.store, &self.search)
        }
    }

    mod abstract_rule {
        use super::*;

        #[test]
        fn abstract_type_is_never_a_test() {
            let fx = Fixture::new(vec![TypeBinding::class("com.example.T")
                .abstract_type()
                .with_annotation(RUN_WITH)
                .with_method(MethodBinding::new("check").with_annotation(TEST))]);
            assert!(!fx.is_test("com.example.T"));
        }

        #[test]
        fn abstract_base_concrete_derived() {
            // Base is abstract and annotated; Derived carries nothing of
            // its own but inherits the type-level marker.
            let fx = Fixture::new(vec![
                TypeBinding::class("com.example.Base")
                    .abstract_type()
                    .with_annotation(RUN_WITH),
                TypeBinding::class("com.example.Derived").with_superclass("com.example.Base"),
            ]);
            assert!(!fx.is_test("com.example.Base"));
            assert!(fx.is_test("com.example.Derived"));
        }
    }

    mod marker_rules {
        use super::*;

        #[test]
        fn direct_run_with() {
            let fx = Fixture::new(vec![
                TypeBinding::class("com.example.T").with_annotation(RUN_WITH)
            ]);
            assert!(fx.is_test("com.example.T"));
        }

        #[test]
        fn inherited_run_with() {
            let fx = Fixture::new(vec![
                TypeBinding::class("com.example.Base").with_annotation(RUN_WITH),
                TypeBinding::class("com.example.Derived").with_superclass("com.example.Base"),
            ]);
            assert!(fx.is_test("com.example.Derived"));
        }

        #[test]
        fn test_annotated_method() {
            let fx = Fixture::new(vec![TypeBinding::class("com.example.T")
                .with_method(MethodBinding::new("check").with_annotation(TEST))]);
            assert!(fx.is_test("com.example.T"));
        }

        #[test]
        fn jupiter_test_via_meta_marker_on_method() {
            // JUnit 5's @Test is not org.junit.Test, but it is
            // meta-annotated @Testable.
            let fx = Fixture::new(vec![
                TypeBinding::annotation("org.junit.jupiter.api.Test").with_annotation(TESTABLE),
                TypeBinding::class("com.example.T").with_method(
                    MethodBinding::new("check").with_annotation("org.junit.jupiter.api.Test"),
                ),
            ]);
            assert!(fx.is_test("com.example.T"));
        }

        #[test]
        fn testable_on_type_via_meta_closure() {
            let fx = Fixture::new(vec![
                TypeBinding::annotation("com.example.Suite").with_annotation(TESTABLE),
                TypeBinding::class("com.example.T").with_annotation("com.example.Suite"),
            ]);
            assert!(fx.is_test("com.example.T"));
        }

        #[test]
        fn no_markers_no_legacy_is_not_a_test() {
            let fx = Fixture::new(vec![TypeBinding::class("com.example.T")
                .with_method(MethodBinding::new("helper"))]);
            assert!(!fx.is_test("com.example.T"));
        }
    }

    mod legacy_fallback {
        use super::*;

        #[test]
        fn legacy_interface_implementor_is_a_test() {
            let fx = Fixture::new(vec![
                TypeBinding::interface(LEGACY),
                TypeBinding::class("com.example.OldTest").with_interface(LEGACY),
            ]);
            assert!(fx.is_test("com.example.OldTest"));
        }

        #[test]
        fn legacy_interface_through_testcase_superclass() {
            let fx = Fixture::new(vec![
                TypeBinding::interface(LEGACY),
                TypeBinding::class("junit.framework.TestCase")
                    .abstract_type()
                    .with_interface(LEGACY),
                TypeBinding::class("com.example.OldTest")
                    .with_superclass("junit.framework.TestCase"),
            ]);
            assert!(fx.is_test("com.example.OldTest"));
        }
    }

    mod degraded_resolution {
        use super::*;

        #[test]
        fn unknown_type_classifies_false() {
            let fx = Fixture::new(vec![]);
            assert!(!fx.is_test("com.example.Missing"));
        }

        #[test]
        fn classification_is_idempotent() {
            let fx = Fixture::new(vec![
                TypeBinding::class("com.example.T").with_annotation(RUN_WITH)
            ]);
            assert!(fx.is_test("com.example.T"));
            assert!(fx.is_test("com.example.T"));
        }
    }
}
