use crate::resolution::Cancelled;
use camino::{Utf8Path, Utf8PathBuf};
use importfix_edit::ImportInserter;
use importfix_types::ids::{DocumentId, ProjectId, ProviderId};
use importfix_types::reference::{ReferenceHandle, ReferenceProperties};
use importfix_types::symbol::{ExternalBindingCandidate, SearchResult};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What a search service is asked to find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// The unbound simple name as written in the document.
    pub name: String,
    pub project: ProjectId,
    pub document: DocumentId,
}

/// Where a symbol was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitOrigin {
    /// Already visible through the project's existing references.
    Referenced,
    /// Declared in another project of the solution.
    Project(ProjectId),
    /// Declared in an assembly the project does not reference yet.
    Assembly(ExternalBindingCandidate),
    /// Declared in a package the project does not reference yet.
    Package(ExternalBindingCandidate, Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub result: SearchResult,
    pub origin: HitOrigin,
}

/// A discovery source for unbound names.
pub trait SymbolSearch: Send + Sync {
    fn provider(&self) -> &ProviderId;

    fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Vec<SearchHit>>;
}

/// Maps an external binding to the metadata file that provides it.
///
/// Implementations may block; they should observe `cancel` and return
/// `Err(Cancelled)` promptly once it fires.
pub trait BindingResolver: Send + Sync {
    fn resolve(
        &self,
        project: ProjectId,
        container: &str,
        fully_qualified_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Utf8PathBuf>, Cancelled>;
}

/// Produces reference handles for metadata files.
pub trait MetadataService: Send + Sync {
    fn get_reference(
        &self,
        path: &Utf8Path,
        properties: ReferenceProperties,
    ) -> anyhow::Result<ReferenceHandle>;
}

/// Collaborators a fix needs at execution time.
#[derive(Clone)]
pub struct FixServices {
    pub resolver: Arc<dyn BindingResolver>,
    pub metadata: Arc<dyn MetadataService>,
    pub imports: Arc<dyn ImportInserter>,
}

impl fmt::Debug for FixServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixServices").finish_non_exhaustive()
    }
}
