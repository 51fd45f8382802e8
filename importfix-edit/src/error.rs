//! Error types for importfix-edit.

use importfix_types::ids::DocumentId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The caller's cancellation token fired before the edit completed.
    #[error("edit cancelled")]
    Cancelled,

    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// The range does not fit the document or splits a character.
    #[error("invalid range {start}..{end} for document of {len} bytes")]
    InvalidRange { start: u32, end: u32, len: usize },

    #[error("invalid name: '{0}'")]
    InvalidName(String),
}

impl EditError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EditError::Cancelled)
    }
}

/// Result type alias using EditError.
pub type EditResult<T> = Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::EditError;

    #[test]
    fn cancelled_is_recognized() {
        assert!(EditError::Cancelled.is_cancelled());
        assert!(!EditError::InvalidName("1x".to_string()).is_cancelled());
    }

    #[test]
    fn invalid_range_display_includes_bounds() {
        let err = EditError::InvalidRange {
            start: 4,
            end: 9,
            len: 5,
        };
        assert_eq!(err.to_string(), "invalid range 4..9 for document of 5 bytes");
    }
}
