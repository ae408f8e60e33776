//! Java test-classification engine for sift.
//!
//! Given an externally supplied view of a Java type universe — qualified
//! names, supertype and interface links, declared methods and annotations —
//! this crate decides which types are runnable tests and enumerates every
//! test type reachable from a search scope:
//!
//! - `binding`: the read-only binding data model and the [`BindingOracle`]
//!   seam to the external resolver, plus the in-memory [`BindingStore`]
//! - `markers`: annotation marker matching, including transitive
//!   meta-annotation matches for the testable marker
//! - `classify`: the per-type test classification policy
//! - `search`: structural detection of legacy test-interface implementors
//!   and static suite-factory methods
//! - `discovery`: scope-wide test enumeration over a type hierarchy
//!
//! [`BindingOracle`]: binding::BindingOracle
//! [`BindingStore`]: binding::BindingStore

pub mod binding;
pub mod classify;
pub mod discovery;
pub mod markers;
pub mod search;
