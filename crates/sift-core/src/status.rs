//! Refactoring status model: severity-ranked diagnostic entries.
//!
//! Condition checks produce a [`RefactoringStatus`], an ordered collection
//! of diagnostic entries. Merging two statuses is a union of entries; the
//! overall severity of a status is the maximum severity across its entries.

use serde::{Deserialize, Serialize};

/// Severity of a single status entry.
///
/// Ordering matters: `Ok < Info < Warning < Error < Fatal`, and the derived
/// `Ord` is what `RefactoringStatus::severity` maximizes over.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// No problem.
    #[default]
    Ok,
    /// Informational note; never blocks.
    Info,
    /// Something the user should look at; does not block.
    Warning,
    /// A blocking problem the user can override.
    Error,
    /// A blocking problem that cannot be overridden.
    Fatal,
}

/// A single diagnostic produced by a condition check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub severity: Severity,
    pub message: String,
    /// Optional pointer at the element the diagnostic concerns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl StatusEntry {
    /// Create an entry with the given severity and message.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        StatusEntry {
            severity,
            message: message.into(),
            context: None,
        }
    }

    /// Attach a context string naming the element the entry concerns.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// An ordered collection of diagnostic entries.
///
/// An empty status is "OK". Entries are kept in insertion order; merging
/// appends the other status's entries, so the aggregate preserves the order
/// in which checks ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactoringStatus {
    entries: Vec<StatusEntry>,
}

impl RefactoringStatus {
    /// Create an empty (OK) status.
    pub fn new() -> Self {
        RefactoringStatus::default()
    }

    /// Create a status holding a single entry.
    pub fn from_entry(entry: StatusEntry) -> Self {
        RefactoringStatus {
            entries: vec![entry],
        }
    }

    /// Shorthand for a single-entry info status.
    pub fn info(message: impl Into<String>) -> Self {
        RefactoringStatus::from_entry(StatusEntry::new(Severity::Info, message))
    }

    /// Shorthand for a single-entry warning status.
    pub fn warning(message: impl Into<String>) -> Self {
        RefactoringStatus::from_entry(StatusEntry::new(Severity::Warning, message))
    }

    /// Shorthand for a single-entry error status.
    pub fn error(message: impl Into<String>) -> Self {
        RefactoringStatus::from_entry(StatusEntry::new(Severity::Error, message))
    }

    /// Shorthand for a single-entry fatal status.
    pub fn fatal(message: impl Into<String>) -> Self {
        RefactoringStatus::from_entry(StatusEntry::new(Severity::Fatal, message))
    }

    /// Append a single entry.
    pub fn add_entry(&mut self, entry: StatusEntry) {
        self.entries.push(entry);
    }

    /// Merge another status into this one: union of entries, order
    /// preserved (this status's entries first).
    pub fn merge(&mut self, other: RefactoringStatus) {
        self.entries.extend(other.entries);
    }

    /// The entries in insertion order.
    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    /// Overall severity: the maximum entry severity, `Ok` when empty.
    pub fn severity(&self) -> Severity {
        self.entries
            .iter()
            .map(|e| e.severity)
            .max()
            .unwrap_or(Severity::Ok)
    }

    /// Whether the status has no entries at all.
    pub fn is_ok(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the overall severity blocks the operation.
    pub fn has_error(&self) -> bool {
        self.severity() >= Severity::Error
    }
}
