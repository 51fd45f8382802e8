use importfix_types::ids::{DocumentId, ProjectId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolutionError {
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("project '{name}' cannot reference itself")]
    SelfReference { name: String },

    #[error("adding a reference from '{from}' to '{to}' would create a cycle")]
    ReferenceCycle { from: String, to: String },

    #[error("duplicate project name '{0}'")]
    DuplicateProject(String),
}
