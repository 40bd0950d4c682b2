//! # Edit-session state
//!
//! The storage layer itself is keyed purely on note text; the only extra
//! state a caller needs is *which note is currently being edited*. Rather
//! than leaving that to ad-hoc flags, it is modelled here as one explicit
//! tagged value the UI owns and passes into its handlers.
//!
//! [`EditState`] is `Serialize + Deserialize` so UI layers can stash it in
//! whatever session mechanism they use.
//!
//! ## Typical flow
//!
//! ```
//! use store::EditState;
//!
//! let mut state = EditState::default();
//! assert!(!state.is_editing());
//!
//! // User clicked the pencil on "buy milk": remember the original text.
//! state = EditState::begin("buy milk");
//! assert_eq!(state.original_text(), Some("buy milk"));
//!
//! // User confirmed the change: take the original and rename it.
//! let original = state.finish().unwrap();
//! assert_eq!(original, "buy milk");
//! assert!(!state.is_editing());
//! ```

use serde::{Deserialize, Serialize};

/// Whether the UI is editing an existing note, and if so which one.
///
/// `Editing` carries the note's text as it was when the edit began; that
/// original is what a `rename` call needs as its first argument once the
/// user confirms the new text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditState {
    /// No note is being edited; a save creates a new note.
    #[default]
    NotEditing,
    /// A note is being edited in place.
    Editing {
        /// The note's text at the moment the edit began.
        original_text: String,
    },
}

impl EditState {
    /// Enter editing mode for the note with the given text.
    pub fn begin(original_text: impl Into<String>) -> Self {
        EditState::Editing {
            original_text: original_text.into(),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditState::Editing { .. })
    }

    /// The text of the note being edited, if any.
    pub fn original_text(&self) -> Option<&str> {
        match self {
            EditState::NotEditing => None,
            EditState::Editing { original_text } => Some(original_text),
        }
    }

    /// Leave editing mode, returning the original text if an edit was active.
    pub fn finish(&mut self) -> Option<String> {
        match std::mem::take(self) {
            EditState::NotEditing => None,
            EditState::Editing { original_text } => Some(original_text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_editing() {
        let state = EditState::default();
        assert!(!state.is_editing());
        assert_eq!(state.original_text(), None);
    }

    #[test]
    fn test_begin_and_finish() {
        let mut state = EditState::begin("buy milk");
        assert!(state.is_editing());
        assert_eq!(state.original_text(), Some("buy milk"));

        assert_eq!(state.finish(), Some("buy milk".to_string()));
        assert_eq!(state, EditState::NotEditing);
        assert_eq!(state.finish(), None);
    }

    #[test]
    fn test_serde_roundtrip() {
        let state = EditState::begin("note");
        let json = serde_json::to_string(&state).unwrap();
        let back: EditState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
