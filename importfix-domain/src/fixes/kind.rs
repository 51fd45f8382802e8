use importfix_types::ids::{ProjectId, ProviderId};
use importfix_types::ops::FixKindLabel;
use importfix_types::symbol::{ExternalBindingCandidate, SearchResult};
use std::hash::{Hash, Hasher};

/// Adds a reference to another project in the solution.
#[derive(Debug, Clone)]
pub struct ProjectFix {
    pub target: ProjectId,
    pub target_name: String,
}

/// Adds a reference to an assembly on disk.
#[derive(Debug, Clone)]
pub struct AssemblyFix {
    pub candidate: ExternalBindingCandidate,
}

/// Adds a package reference.
#[derive(Debug, Clone)]
pub struct PackageFix {
    pub candidate: ExternalBindingCandidate,
    pub version: Option<String>,
}

/// What a fix attaches to the project besides the import.
///
/// Equality only looks at the container: the same symbol from two
/// containers is two fixes, and different kinds never compare equal.
#[derive(Debug, Clone)]
pub enum FixKind {
    Namespace,
    Project(ProjectFix),
    Assembly(AssemblyFix),
    Package(PackageFix),
}

impl FixKind {
    pub fn label(&self) -> FixKindLabel {
        match self {
            FixKind::Namespace => FixKindLabel::Namespace,
            FixKind::Project(_) => FixKindLabel::Project,
            FixKind::Assembly(_) => FixKindLabel::Assembly,
            FixKind::Package(_) => FixKindLabel::Package,
        }
    }

    /// Display name of the container the fix pulls the symbol from.
    pub fn container_name(&self) -> Option<&str> {
        match self {
            FixKind::Namespace => None,
            FixKind::Project(p) => Some(&p.target_name),
            FixKind::Assembly(a) => Some(&a.candidate.container_name),
            FixKind::Package(p) => Some(&p.candidate.container_name),
        }
    }

    /// Candidate that has to be resolved before the fix can run.
    pub fn binding_candidate(&self) -> Option<&ExternalBindingCandidate> {
        match self {
            FixKind::Assembly(a) => Some(&a.candidate),
            FixKind::Package(p) => Some(&p.candidate),
            FixKind::Namespace | FixKind::Project(_) => None,
        }
    }
}

impl PartialEq for FixKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FixKind::Namespace, FixKind::Namespace) => true,
            (FixKind::Project(a), FixKind::Project(b)) => a.target == b.target,
            (FixKind::Assembly(a), FixKind::Assembly(b)) => {
                a.candidate.container_name == b.candidate.container_name
            }
            (FixKind::Package(a), FixKind::Package(b)) => {
                a.candidate.container_name == b.candidate.container_name
            }
            _ => false,
        }
    }
}

impl Eq for FixKind {}

impl Hash for FixKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FixKind::Namespace => {}
            FixKind::Project(p) => p.target.hash(state),
            FixKind::Assembly(a) => a.candidate.container_name.hash(state),
            FixKind::Package(p) => p.candidate.container_name.hash(state),
        }
    }
}

/// The identity of a fix: who found what, and where it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixReference {
    pub provider: ProviderId,
    pub result: SearchResult,
    pub kind: FixKind,
}

impl FixReference {
    pub fn new(provider: ProviderId, result: SearchResult, kind: FixKind) -> Self {
        Self {
            provider,
            result,
            kind,
        }
    }
}

impl Hash for FixReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Container first, then the base identity.
        self.kind.hash(state);
        self.provider.hash(state);
        self.result.hash(state);
    }
}
