use importfix_edit::EditError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixError {
    /// Forced resolution produced no usable metadata path.
    #[error("could not resolve '{symbol}' in '{container}'")]
    ResolutionFailed { container: String, symbol: String },

    #[error("fix cancelled")]
    Cancelled,

    /// The snapshot no longer matches what the fix was offered against.
    #[error("composition conflict: {message}")]
    CompositionConflict { message: String },

    #[error(transparent)]
    Edit(EditError),

    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl FixError {
    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        FixError::CompositionConflict {
            message: message.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, FixError::CompositionConflict { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FixError::Cancelled)
    }

    /// Process exit code for hosts that surface this error directly.
    pub fn exit_code(&self) -> i32 {
        match self {
            FixError::ResolutionFailed { .. } | FixError::CompositionConflict { .. } => 2,
            FixError::Cancelled => 130,
            FixError::Edit(_) | FixError::Collaborator(_) => 1,
        }
    }
}

impl From<EditError> for FixError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::Cancelled => FixError::Cancelled,
            other => FixError::Edit(other),
        }
    }
}

impl From<crate::resolution::Cancelled> for FixError {
    fn from(_: crate::resolution::Cancelled) -> Self {
        FixError::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(FixError::conflict("x").exit_code(), 2);
        assert_eq!(
            FixError::ResolutionFailed {
                container: "ContosoLib".into(),
                symbol: "Foo.Bar".into()
            }
            .exit_code(),
            2
        );
        assert_eq!(FixError::Cancelled.exit_code(), 130);
        assert_eq!(FixError::from(anyhow::anyhow!("io")).exit_code(), 1);
    }

    #[test]
    fn edit_cancellation_maps_to_cancelled() {
        assert!(FixError::from(EditError::Cancelled).is_cancelled());
        assert!(matches!(
            FixError::from(EditError::InvalidName("1".into())),
            FixError::Edit(_)
        ));
    }
}
