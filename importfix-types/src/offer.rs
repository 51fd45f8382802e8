use crate::ops::{FixKindLabel, PriorityTier};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The list of fixes offered for one unresolved name.
///
/// Producing an offer never resolves anything; every entry is a description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub query: OfferQuery,

    #[serde(default)]
    pub fixes: Vec<OfferedFix>,

    pub summary: OfferSummary,
}

impl OfferReport {
    pub fn new(tool: ToolInfo, query: OfferQuery) -> Self {
        Self {
            schema: crate::schema::IMPORTFIX_OFFER_V1.to_string(),
            tool,
            query,
            fixes: vec![],
            summary: OfferSummary::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferQuery {
    pub document: String,
    pub name: String,
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferedFix {
    /// Deterministic id derived from the fix identity.
    pub id: String,
    pub title: String,
    pub priority: PriorityTier,
    pub kind: FixKindLabel,
    pub provider: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,

    /// Whether `apply` will run a final applicability check first.
    #[serde(default)]
    pub requires_check: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferSummary {
    pub hits_total: u64,
    pub duplicates_dropped: u64,
    pub noops_dropped: u64,
    pub fixes_offered: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated_to: Option<u64>,
}
