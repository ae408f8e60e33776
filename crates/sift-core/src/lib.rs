//! Core infrastructure for sift.
//!
//! This crate provides language-agnostic refactoring infrastructure:
//! - Refactoring status model with severity merging
//! - Change objects and order-preserving composite aggregation
//! - The `RefactoringUnit` trait and the three-phase composite coordinator
//! - Cooperative progress reporting and cancellation

pub mod change;
pub mod progress;
pub mod refactor;
pub mod status;
