//! Deferred add-import fixes.
//!
//! A [`DeferredFix`] is cheap to create and describe. Resolution of external
//! bindings happens at most once, the first time the fix is checked or
//! executed, and composition always works on a new snapshot.

use crate::error::FixError;
use crate::ports::FixServices;
use crate::resolution::{Cancelled, Resolution, ResolutionCell};
use importfix_solution::Solution;
use importfix_types::TextRange;
use importfix_types::ids::{DocumentId, ProjectId, ProviderId};
use importfix_types::ops::{FixKindLabel, PriorityTier, tags};
use importfix_types::symbol::{ExternalBindingCandidate, SearchResult};
use std::fmt;
use std::hash::{Hash, Hasher};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

mod compose;
mod kind;

pub use kind::{AssemblyFix, FixKind, FixReference, PackageFix, ProjectFix};

use compose::Attachment;

const FIX_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6a, 0x0e, 0x1f, 0x3c, 0x52, 0x9b, 0x4e, 0x21, 0x9d, 0x47, 0x10, 0xc2, 0x88, 0x3a, 0x5e, 0x10,
]);

/// Where a fix applies, captured when it was offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixTarget {
    pub document: DocumentId,
    pub project: ProjectId,
    pub name_range: TextRange,
    /// sha256 of the document text at discovery.
    pub checksum: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixDescription {
    pub title: String,
    pub priority: PriorityTier,
    pub tags: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyChangesOperation {
    pub solution: Solution,
}

/// Result of executing a fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeActionOperation {
    ApplyChanges(ApplyChangesOperation),
}

impl CodeActionOperation {
    pub fn changed_solution(&self) -> &Solution {
        match self {
            CodeActionOperation::ApplyChanges(op) => &op.solution,
        }
    }
}

pub struct DeferredFix {
    reference: FixReference,
    target: FixTarget,
    place_system_first: bool,
    services: FixServices,
    resolution: ResolutionCell<Resolution>,
}

impl DeferredFix {
    pub fn new(
        reference: FixReference,
        target: FixTarget,
        place_system_first: bool,
        services: FixServices,
    ) -> Self {
        Self {
            reference,
            target,
            place_system_first,
            services,
            resolution: ResolutionCell::new(),
        }
    }

    pub fn reference(&self) -> &FixReference {
        &self.reference
    }

    pub fn target(&self) -> &FixTarget {
        &self.target
    }

    pub fn provider(&self) -> &ProviderId {
        &self.reference.provider
    }

    pub fn search_result(&self) -> &SearchResult {
        &self.reference.result
    }

    pub fn kind(&self) -> &FixKind {
        &self.reference.kind
    }

    pub fn label(&self) -> FixKindLabel {
        self.reference.kind.label()
    }

    /// Stable id: the same fix offered twice gets the same id.
    pub fn id(&self) -> Uuid {
        let key = format!(
            "{}|{}|{}|{}",
            self.reference.provider,
            self.label().as_str(),
            self.reference.kind.container_name().unwrap_or(""),
            self.reference.result.namespace()
        );
        Uuid::new_v5(&FIX_NAMESPACE, key.as_bytes())
    }

    /// Cached resolution, if one has been computed.
    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution.peek()
    }

    pub fn priority(&self) -> PriorityTier {
        if !self.reference.result.is_exact() {
            return PriorityTier::Low;
        }
        match self.reference.kind {
            FixKind::Namespace | FixKind::Project(_) => PriorityTier::Medium,
            FixKind::Assembly(_) | FixKind::Package(_) => PriorityTier::Low,
        }
    }

    /// Title, priority and tags. Never resolves.
    pub fn describe(&self) -> FixDescription {
        let import = self
            .services
            .imports
            .describe_import(&self.reference.result.name_parts);
        let (title, tags) = match &self.reference.kind {
            FixKind::Namespace => (import, tags::NAMESPACE),
            FixKind::Project(p) => (
                format!("{import} (add reference to '{}')", p.target_name),
                tags::ADD_REFERENCE,
            ),
            FixKind::Assembly(a) => (
                format!("{import} (from {})", a.candidate.container_name),
                tags::ADD_REFERENCE,
            ),
            FixKind::Package(p) => {
                let title = match &p.version {
                    Some(v) => format!(
                        "{import} (from package {} {v})",
                        p.candidate.container_name
                    ),
                    None => format!("{import} (from package {})", p.candidate.container_name),
                };
                (title, tags::ADD_REFERENCE)
            }
        };
        FixDescription {
            title,
            priority: self.priority(),
            tags,
        }
    }

    /// Whether the caller must call [`DeferredFix::is_applicable`] before
    /// executing.
    pub fn requires_final_applicability_check(&self) -> bool {
        self.reference.kind.binding_candidate().is_some()
    }

    /// Forces resolution for fixes that add an external reference.
    ///
    /// A cancelled check reports `false`; the next call resolves again.
    pub fn is_applicable(&self, cancel: &CancellationToken) -> bool {
        match &self.reference.kind {
            FixKind::Namespace | FixKind::Project(_) => true,
            FixKind::Assembly(AssemblyFix { candidate })
            | FixKind::Package(PackageFix { candidate, .. }) => {
                match self.resolve(candidate, cancel) {
                    Ok(resolution) => resolution.is_resolved(),
                    Err(Cancelled) => {
                        debug!(
                            container = %candidate.container_name,
                            "applicability check cancelled"
                        );
                        false
                    }
                }
            }
        }
    }

    /// Applies the fix to `solution`, which is left untouched.
    pub fn execute(
        &self,
        solution: &Solution,
        cancel: &CancellationToken,
    ) -> Result<Vec<CodeActionOperation>, FixError> {
        if cancel.is_cancelled() {
            return Err(FixError::Cancelled);
        }
        let attachment = match &self.reference.kind {
            FixKind::Namespace => Attachment::Nothing,
            FixKind::Project(p) => Attachment::Project(p.target),
            FixKind::Assembly(a) => {
                Attachment::Assembly(self.require_path(&a.candidate, cancel)?)
            }
            FixKind::Package(p) => Attachment::Package {
                name: p.candidate.container_name.clone(),
                version: p.version.clone(),
                path: self.require_path(&p.candidate, cancel)?,
            },
        };
        if cancel.is_cancelled() {
            return Err(FixError::Cancelled);
        }

        let solution = self.compose(solution, attachment, cancel)?;
        Ok(vec![CodeActionOperation::ApplyChanges(
            ApplyChangesOperation { solution },
        )])
    }

    fn resolve(
        &self,
        candidate: &ExternalBindingCandidate,
        cancel: &CancellationToken,
    ) -> Result<Resolution, Cancelled> {
        self.resolution.get_or_compute(cancel, |cancel| {
            let symbol = candidate.fully_qualified_name();
            debug!(container = %candidate.container_name, symbol = %symbol, "resolving binding");
            let path = self.services.resolver.resolve(
                self.target.project,
                &candidate.container_name,
                &symbol,
                cancel,
            )?;
            let resolution = Resolution::from_path(path);
            debug!(
                container = %candidate.container_name,
                resolved = resolution.is_resolved(),
                "binding resolution finished"
            );
            Ok(resolution)
        })
    }

    fn require_path(
        &self,
        candidate: &ExternalBindingCandidate,
        cancel: &CancellationToken,
    ) -> Result<camino::Utf8PathBuf, FixError> {
        match self.resolve(candidate, cancel)? {
            Resolution::Resolved(path) => Ok(path),
            Resolution::NotFound => Err(FixError::ResolutionFailed {
                container: candidate.container_name.clone(),
                symbol: candidate.fully_qualified_name(),
            }),
        }
    }
}

impl PartialEq for DeferredFix {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl Eq for DeferredFix {}

impl Hash for DeferredFix {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.reference.hash(state);
    }
}

impl fmt::Debug for DeferredFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredFix")
            .field("reference", &self.reference)
            .field("target", &self.target)
            .field("resolution", &self.resolution)
            .finish_non_exhaustive()
    }
}
