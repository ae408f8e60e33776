//! Change objects produced by refactoring units.
//!
//! A [`Change`] is an opaque, named description of a workspace
//! modification. The coordinator aggregates unit changes into a
//! [`CompositeChange`] that preserves unit order. [`TextChange`] is the
//! concrete change shape an external text-edit layer hands back: a file
//! plus a list of span replacements with atomic, overlap-checked apply
//! semantics.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named workspace modification.
///
/// Object-safe so heterogeneous changes can be aggregated; the coordinator
/// never inspects a change beyond its name.
pub trait Change: fmt::Debug {
    /// Human-readable name of the change.
    fn name(&self) -> &str;
}

// ============================================================================
// Composite Change
// ============================================================================

/// An ordered aggregation of child changes.
///
/// Children appear in the order they were added; the composite coordinator
/// relies on this to keep unit-list order in the final change.
#[derive(Debug, Default)]
pub struct CompositeChange {
    name: String,
    children: Vec<Box<dyn Change>>,
}

impl CompositeChange {
    /// Create an empty composite with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        CompositeChange {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Append a child change.
    pub fn add(&mut self, change: Box<dyn Change>) {
        self.children.push(change);
    }

    /// The child changes in insertion order.
    pub fn children(&self) -> &[Box<dyn Change>] {
        &self.children
    }

    /// Number of child changes.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the composite has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Change for CompositeChange {
    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Text Change
// ============================================================================

/// A single span replacement within a file.
///
/// `offset` and `length` are byte positions into the source the edit was
/// computed against; `length == 0` is an insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub offset: usize,
    pub length: usize,
    pub replacement: String,
}

impl TextEdit {
    /// Create a replacement edit.
    pub fn replace(offset: usize, length: usize, replacement: impl Into<String>) -> Self {
        TextEdit {
            offset,
            length,
            replacement: replacement.into(),
        }
    }

    /// Create an insertion edit.
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        TextEdit::replace(offset, 0, text)
    }
}

/// Why a [`TextChange`] could not be applied.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChangeError {
    /// Two edits touch the same bytes.
    #[error("edit at offset {offset} overlaps a preceding edit")]
    OverlappingEdits { offset: usize },

    /// An edit reaches past the end of the source.
    #[error("edit [{offset}, +{length}) is out of bounds for {source_len}-byte source")]
    OutOfBounds {
        offset: usize,
        length: usize,
        source_len: usize,
    },

    /// An edit boundary lands inside a multi-byte character.
    #[error("edit boundary at byte {offset} splits a multi-byte character")]
    SplitsCharacter { offset: usize },
}

/// A named set of text edits against a single file.
///
/// Apply semantics are all-or-nothing: the edit list is validated as a
/// whole (bounds, overlap) before any byte of the output is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChange {
    name: String,
    file: String,
    edits: Vec<TextEdit>,
}

impl TextChange {
    /// Create an empty text change for `file`.
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        TextChange {
            name: name.into(),
            file: file.into(),
            edits: Vec::new(),
        }
    }

    /// The file this change targets.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The edits in insertion order.
    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Append an edit.
    pub fn add_edit(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    /// Apply all edits to `source`, producing the edited text.
    ///
    /// Edits are applied in ascending offset order regardless of insertion
    /// order. Fails without producing output if any edit is out of bounds,
    /// lands inside a multi-byte character, or overlaps another.
    pub fn apply(&self, source: &str) -> Result<String, ChangeError> {
        let mut ordered: Vec<&TextEdit> = self.edits.iter().collect();
        ordered.sort_by_key(|e| (e.offset, e.length));

        let mut last_end = 0usize;
        for edit in &ordered {
            let end = edit.offset.saturating_add(edit.length);
            if end > source.len() {
                return Err(ChangeError::OutOfBounds {
                    offset: edit.offset,
                    length: edit.length,
                    source_len: source.len(),
                });
            }
            for boundary in [edit.offset, end] {
                if !source.is_char_boundary(boundary) {
                    return Err(ChangeError::SplitsCharacter { offset: boundary });
                }
            }
            if edit.offset < last_end {
                return Err(ChangeError::OverlappingEdits {
                    offset: edit.offset,
                });
            }
            last_end = end.max(last_end);
        }

        let mut out = String::with_capacity(source.len());
        let mut cursor = 0usize;
        for edit in &ordered {
            out.push_str(&source[cursor..edit.offset]);
            out.push_str(&edit.replacement);
            cursor = edit.offset + edit.length;
        }
        out.push_str(&source[cursor..]);
        Ok(out)
    }
}

impl Change for TextChange {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod composite {
        use super::*;

        #[test]
        fn children_keep_insertion_order() {
            let mut composite = CompositeChange::new("encapsulate fields");
            composite.add(Box::new(TextChange::new("first", "A.java")));
            composite.add(Box::new(TextChange::new("second", "B.java")));

            let names: Vec<&str> = composite.children().iter().map(|c| c.name()).collect();
            assert_eq!(names, vec!["first", "second"]);
            assert_eq!(composite.len(), 2);
            assert!(!composite.is_empty());
        }

        #[test]
        fn empty_composite() {
            let composite = CompositeChange::new("nothing");
            assert!(composite.is_empty());
            assert_eq!(composite.name(), "nothing");
        }
    }

    mod text_change {
        use super::*;

        #[test]
        fn apply_single_replacement() {
            let mut change = TextChange::new("rename", "Widget.java");
            change.add_edit(TextEdit::replace(4, 5, "count"));
            assert_eq!(change.apply("int total;").unwrap(), "int count;");
        }

        #[test]
        fn apply_multiple_edits_out_of_order() {
            let mut change = TextChange::new("encapsulate", "Widget.java");
            change.add_edit(TextEdit::replace(7, 1, "y"));
            change.add_edit(TextEdit::replace(0, 1, "x"));
            assert_eq!(change.apply("a23456_89").unwrap(), "x23456_y9");
        }

        #[test]
        fn apply_insertion() {
            let mut change = TextChange::new("add getter", "Widget.java");
            change.add_edit(TextEdit::insert(3, "XYZ"));
            assert_eq!(change.apply("abcdef").unwrap(), "abcXYZdef");
        }

        #[test]
        fn overlapping_edits_are_rejected() {
            let mut change = TextChange::new("bad", "Widget.java");
            change.add_edit(TextEdit::replace(0, 4, "A"));
            change.add_edit(TextEdit::replace(2, 4, "B"));
            assert_eq!(
                change.apply("abcdefgh"),
                Err(ChangeError::OverlappingEdits { offset: 2 })
            );
        }

        #[test]
        fn out_of_bounds_edit_is_rejected() {
            let mut change = TextChange::new("bad", "Widget.java");
            change.add_edit(TextEdit::replace(4, 10, "A"));
            assert_eq!(
                change.apply("abcdef"),
                Err(ChangeError::OutOfBounds {
                    offset: 4,
                    length: 10,
                    source_len: 6
                })
            );
        }

        #[test]
        fn edit_starting_inside_a_multibyte_character_is_rejected() {
            // Byte 1 is the middle of 'é'; validation must catch it
            // instead of the output pass slicing mid-character.
            let mut change = TextChange::new("bad", "Widget.java");
            change.add_edit(TextEdit::replace(1, 1, "X"));
            assert_eq!(
                change.apply("é_"),
                Err(ChangeError::SplitsCharacter { offset: 1 })
            );
        }

        #[test]
        fn edit_ending_inside_a_multibyte_character_is_rejected() {
            let mut change = TextChange::new("bad", "Widget.java");
            change.add_edit(TextEdit::replace(0, 1, "X"));
            assert_eq!(
                change.apply("é"),
                Err(ChangeError::SplitsCharacter { offset: 1 })
            );
        }

        #[test]
        fn whole_character_replacement_still_applies() {
            let mut change = TextChange::new("rename", "Widget.java");
            change.add_edit(TextEdit::replace(0, 2, "e"));
            assert_eq!(change.apply("é_").unwrap(), "e_");
        }

        #[test]
        fn failed_apply_produces_no_output() {
            // Apply is validated up front, so a later bad edit must not
            // leave a partially edited string behind.
            let mut change = TextChange::new("bad", "Widget.java");
            change.add_edit(TextEdit::replace(0, 1, "X"));
            change.add_edit(TextEdit::replace(100, 1, "Y"));
            assert!(change.apply("abcdef").is_err());
        }
    }
}
