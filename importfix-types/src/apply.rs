use crate::offer::ToolInfo;
use crate::reference::ReferenceHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub fix_id: String,
    pub title: String,
    pub status: ApplyStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Set when the fix resolved a location on disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_path: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<ApplyFile>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references_added: Vec<ReferenceHandle>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_references_added: Vec<String>,

    pub dry_run: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
}

impl ApplyReport {
    pub fn new(tool: ToolInfo, fix_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            schema: crate::schema::IMPORTFIX_APPLY_V1.to_string(),
            tool,
            fix_id: fix_id.into(),
            title: title.into(),
            status: ApplyStatus::Skipped,
            message: None,
            resolved_path: None,
            files: vec![],
            references_added: vec![],
            project_references_added: vec![],
            dry_run: true,
            applied_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStatus {
    Applied,
    /// Final applicability check said no (e.g. the binding could not be resolved).
    NotApplicable,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyFile {
    pub path: String,
    pub sha256_before: String,
    pub sha256_after: String,
}
