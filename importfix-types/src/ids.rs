//! Identifiers for solution entities and discovery providers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// Deterministic ids: v5(namespace, stable_key_bytes).
const PROJECT_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6a, 0x0e, 0x1f, 0x3c, 0x52, 0x9b, 0x4e, 0x21, 0x9d, 0x47, 0x10, 0xc2, 0x88, 0x3a, 0x5e, 0x01,
]);
const DOCUMENT_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6a, 0x0e, 0x1f, 0x3c, 0x52, 0x9b, 0x4e, 0x21, 0x9d, 0x47, 0x10, 0xc2, 0x88, 0x3a, 0x5e, 0x02,
]);

/// Identity of the workspace that owns a lineage of solution snapshots.
///
/// Every snapshot derived from another keeps its workspace id, so two
/// snapshots with different workspace ids can never be composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(pub Uuid);

impl WorkspaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkspaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "workspace#{}", self.0)
    }
}

/// Stable identifier for a project, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&PROJECT_NAMESPACE, name.as_bytes()))
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project#{}", self.0)
    }
}

/// Stable identifier for a document, derived from its project and path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn from_path(project: ProjectId, path: &str) -> Self {
        let key = format!("{}|{}", project.0, path.replace('\\', "/"));
        Self(Uuid::new_v5(&DOCUMENT_NAMESPACE, key.as_bytes()))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "document#{}", self.0)
    }
}

/// Identifies the discovery source that produced a candidate.
///
/// Part of a fix's identity: the same symbol found by two providers is two fixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub String);

impl ProviderId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_id_is_stable_per_name() {
        assert_eq!(ProjectId::from_name("App"), ProjectId::from_name("App"));
        assert_ne!(ProjectId::from_name("App"), ProjectId::from_name("app"));
    }

    #[test]
    fn document_id_normalizes_separators() {
        let p = ProjectId::from_name("App");
        assert_eq!(
            DocumentId::from_path(p, "src\\Program.cs"),
            DocumentId::from_path(p, "src/Program.cs")
        );
        assert_ne!(
            DocumentId::from_path(p, "src/Program.cs"),
            DocumentId::from_path(ProjectId::from_name("Lib"), "src/Program.cs")
        );
    }

    #[test]
    fn workspace_ids_are_unique() {
        assert_ne!(WorkspaceId::new(), WorkspaceId::new());
    }
}
