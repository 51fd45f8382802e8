use crate::error::SolutionError;
use camino::{Utf8Path, Utf8PathBuf};
use importfix_types::ids::{DocumentId, ProjectId, WorkspaceId};
use importfix_types::reference::ReferenceHandle;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
struct DocumentState {
    id: DocumentId,
    project: ProjectId,
    path: Utf8PathBuf,
    text: Arc<str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProjectState {
    id: ProjectId,
    name: String,
    documents: BTreeMap<DocumentId, Arc<DocumentState>>,
    /// Set semantics, insertion order preserved.
    references: Vec<ReferenceHandle>,
    project_references: Vec<ProjectId>,
}

impl ProjectState {
    fn new(name: &str) -> Self {
        Self {
            id: ProjectId::from_name(name),
            name: name.to_string(),
            documents: BTreeMap::new(),
            references: Vec::new(),
            project_references: Vec::new(),
        }
    }
}

/// An immutable, versioned view of every project in a workspace.
///
/// Cloning is cheap. Two snapshots compare equal when they belong to the same
/// workspace, carry the same version and hold the same content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    workspace: WorkspaceId,
    version: u64,
    projects: Arc<BTreeMap<ProjectId, Arc<ProjectState>>>,
}

impl Solution {
    /// An empty solution in a fresh workspace.
    pub fn empty() -> Self {
        Self {
            workspace: WorkspaceId::new(),
            version: 0,
            projects: Arc::new(BTreeMap::new()),
        }
    }

    pub fn builder() -> SolutionBuilder {
        SolutionBuilder::default()
    }

    pub fn workspace(&self) -> WorkspaceId {
        self.workspace
    }

    /// Bumped once for every snapshot derived with an actual change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn projects(&self) -> impl Iterator<Item = ProjectSnapshot> + '_ {
        self.projects.values().map(move |state| ProjectSnapshot {
            solution: self.clone(),
            state: Arc::clone(state),
        })
    }

    pub fn project(&self, id: ProjectId) -> Option<ProjectSnapshot> {
        self.projects.get(&id).map(|state| ProjectSnapshot {
            solution: self.clone(),
            state: Arc::clone(state),
        })
    }

    pub fn project_by_name(&self, name: &str) -> Option<ProjectSnapshot> {
        self.project(ProjectId::from_name(name))
    }

    pub fn document(&self, id: DocumentId) -> Option<DocumentSnapshot> {
        self.projects.values().find_map(|project| {
            project.documents.get(&id).map(|doc| DocumentSnapshot {
                solution: self.clone(),
                project: Arc::clone(project),
                state: Arc::clone(doc),
            })
        })
    }

    pub fn document_by_path(&self, path: &Utf8Path) -> Option<DocumentSnapshot> {
        let wanted = normalize(path.as_str());
        self.projects.values().find_map(|project| {
            project
                .documents
                .values()
                .find(|doc| normalize(doc.path.as_str()) == wanted)
                .map(|doc| DocumentSnapshot {
                    solution: self.clone(),
                    project: Arc::clone(project),
                    state: Arc::clone(doc),
                })
        })
    }

    pub fn documents(&self) -> Vec<DocumentSnapshot> {
        self.projects().flat_map(|p| p.documents()).collect()
    }

    pub fn with_document_text(
        &self,
        id: DocumentId,
        text: impl Into<Arc<str>>,
    ) -> Result<Solution, SolutionError> {
        let doc = self
            .document(id)
            .ok_or(SolutionError::DocumentNotFound(id))?;
        Ok(doc.with_text(text).solution().clone())
    }

    pub fn with_added_reference(
        &self,
        project: ProjectId,
        reference: ReferenceHandle,
    ) -> Result<Solution, SolutionError> {
        let project = self
            .project(project)
            .ok_or(SolutionError::ProjectNotFound(project))?;
        Ok(project.with_added_reference(reference).solution().clone())
    }

    pub fn with_added_project_reference(
        &self,
        from: ProjectId,
        to: ProjectId,
    ) -> Result<Solution, SolutionError> {
        let project = self
            .project(from)
            .ok_or(SolutionError::ProjectNotFound(from))?;
        Ok(project.with_added_project_reference(to)?.solution().clone())
    }

    /// Documents whose text in `newer` differs from (or is absent in) `self`.
    pub fn changed_documents(&self, newer: &Solution) -> Vec<DocumentId> {
        newer
            .projects
            .values()
            .flat_map(|p| p.documents.values())
            .filter(|doc| match self.document(doc.id) {
                Some(old) => old.state.text != doc.text,
                None => true,
            })
            .map(|doc| doc.id)
            .collect()
    }

    /// Whether `target` is reachable from `from` over project references.
    fn reaches(&self, from: ProjectId, target: ProjectId) -> bool {
        let mut seen = BTreeSet::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            if let Some(p) = self.projects.get(&id) {
                stack.extend(p.project_references.iter().copied());
            }
        }
        false
    }

    fn replace_project(&self, state: ProjectState) -> ProjectSnapshot {
        let state = Arc::new(state);
        let mut projects = Arc::clone(&self.projects);
        Arc::make_mut(&mut projects).insert(state.id, Arc::clone(&state));
        let solution = Solution {
            workspace: self.workspace,
            version: self.version + 1,
            projects,
        };
        ProjectSnapshot { solution, state }
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches("./").to_string()
}

/// A project as it exists in one solution snapshot.
#[derive(Debug, Clone)]
pub struct ProjectSnapshot {
    solution: Solution,
    state: Arc<ProjectState>,
}

impl ProjectSnapshot {
    pub fn id(&self) -> ProjectId {
        self.state.id
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn references(&self) -> &[ReferenceHandle] {
        &self.state.references
    }

    pub fn project_references(&self) -> &[ProjectId] {
        &self.state.project_references
    }

    pub fn documents(&self) -> Vec<DocumentSnapshot> {
        self.state
            .documents
            .values()
            .map(|doc| DocumentSnapshot {
                solution: self.solution.clone(),
                project: Arc::clone(&self.state),
                state: Arc::clone(doc),
            })
            .collect()
    }

    pub fn document(&self, id: DocumentId) -> Option<DocumentSnapshot> {
        self.state.documents.get(&id).map(|doc| DocumentSnapshot {
            solution: self.solution.clone(),
            project: Arc::clone(&self.state),
            state: Arc::clone(doc),
        })
    }

    pub fn has_reference(&self, reference: &ReferenceHandle) -> bool {
        self.state.references.contains(reference)
    }

    /// Whether some existing reference already provides `container`.
    pub fn references_container(&self, container: &str) -> bool {
        self.state.references.iter().any(|r| r.provides(container))
    }

    pub fn references_project(&self, id: ProjectId) -> bool {
        self.state.project_references.contains(&id)
    }

    /// Returns the project with `reference` appended. Adding a reference that
    /// is already present returns an unchanged snapshot.
    pub fn with_added_reference(&self, reference: ReferenceHandle) -> ProjectSnapshot {
        if self.has_reference(&reference) {
            debug!(
                project = %self.state.name,
                reference = %reference.display_name,
                "reference already present"
            );
            return self.clone();
        }
        let mut state = (*self.state).clone();
        state.references.push(reference);
        self.solution.replace_project(state)
    }

    pub fn with_added_project_reference(
        &self,
        target: ProjectId,
    ) -> Result<ProjectSnapshot, SolutionError> {
        if target == self.state.id {
            return Err(SolutionError::SelfReference {
                name: self.state.name.clone(),
            });
        }
        let target_project = self
            .solution
            .project(target)
            .ok_or(SolutionError::ProjectNotFound(target))?;
        if self.references_project(target) {
            return Ok(self.clone());
        }
        if self.solution.reaches(target, self.state.id) {
            return Err(SolutionError::ReferenceCycle {
                from: self.state.name.clone(),
                to: target_project.name().to_string(),
            });
        }
        let mut state = (*self.state).clone();
        state.project_references.push(target);
        Ok(self.solution.replace_project(state))
    }
}

/// A document as it exists in one solution snapshot.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    solution: Solution,
    project: Arc<ProjectState>,
    state: Arc<DocumentState>,
}

impl DocumentSnapshot {
    pub fn id(&self) -> DocumentId {
        self.state.id
    }

    pub fn project_id(&self) -> ProjectId {
        self.state.project
    }

    pub fn path(&self) -> &Utf8Path {
        &self.state.path
    }

    pub fn text(&self) -> &str {
        &self.state.text
    }

    /// sha256 of the text, used to detect that a document moved on.
    pub fn checksum(&self) -> String {
        importfix_hash::sha256_str(&self.state.text)
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn project(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            solution: self.solution.clone(),
            state: Arc::clone(&self.project),
        }
    }

    /// Returns the document with new text, inside a new solution snapshot.
    pub fn with_text(&self, text: impl Into<Arc<str>>) -> DocumentSnapshot {
        let text = text.into();
        if *text == *self.state.text {
            return self.clone();
        }
        let doc = Arc::new(DocumentState {
            text,
            ..(*self.state).clone()
        });
        let mut project = (*self.project).clone();
        project.documents.insert(doc.id, Arc::clone(&doc));
        let updated = self.solution.replace_project(project);
        DocumentSnapshot {
            solution: updated.solution,
            project: updated.state,
            state: doc,
        }
    }
}

/// Builds the initial snapshot of a workspace.
#[derive(Debug, Default)]
pub struct SolutionBuilder {
    projects: BTreeMap<ProjectId, ProjectState>,
    project_references: Vec<(String, String)>,
}

impl SolutionBuilder {
    pub fn project(mut self, name: &str) -> Self {
        self.projects
            .entry(ProjectId::from_name(name))
            .or_insert_with(|| ProjectState::new(name));
        self
    }

    pub fn document(
        mut self,
        project: &str,
        path: impl Into<Utf8PathBuf>,
        text: impl Into<Arc<str>>,
    ) -> Self {
        let path = path.into();
        let state = self
            .projects
            .entry(ProjectId::from_name(project))
            .or_insert_with(|| ProjectState::new(project));
        let id = DocumentId::from_path(state.id, path.as_str());
        state.documents.insert(
            id,
            Arc::new(DocumentState {
                id,
                project: state.id,
                path,
                text: text.into(),
            }),
        );
        self
    }

    pub fn reference(mut self, project: &str, reference: ReferenceHandle) -> Self {
        let state = self
            .projects
            .entry(ProjectId::from_name(project))
            .or_insert_with(|| ProjectState::new(project));
        if !state.references.contains(&reference) {
            state.references.push(reference);
        }
        self
    }

    pub fn project_reference(mut self, from: &str, to: &str) -> Self {
        self.project_references
            .push((from.to_string(), to.to_string()));
        self
    }

    pub fn build(self) -> Result<Solution, SolutionError> {
        let mut solution = Solution {
            workspace: WorkspaceId::new(),
            version: 0,
            projects: Arc::new(
                self.projects
                    .into_iter()
                    .map(|(id, state)| (id, Arc::new(state)))
                    .collect(),
            ),
        };
        for (from, to) in &self.project_references {
            let from_id = ProjectId::from_name(from);
            solution = solution.with_added_project_reference(from_id, ProjectId::from_name(to))?;
        }
        solution.version = 0;
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_projects() -> Solution {
        Solution::builder()
            .document("App", "src/Program.cs", "class Program {}\n")
            .document("Lib", "src/Util.cs", "class Util {}\n")
            .build()
            .expect("build")
    }

    #[test]
    fn editing_a_document_shares_untouched_projects() {
        let before = two_projects();
        let doc = before
            .document_by_path(Utf8Path::new("src/Program.cs"))
            .expect("doc");
        let after = doc.with_text("using Foo;\nclass Program {}\n");

        let lib = ProjectId::from_name("Lib");
        assert!(Arc::ptr_eq(
            &before.projects[&lib],
            &after.solution().projects[&lib]
        ));
        assert!(!Arc::ptr_eq(
            &before.projects[&ProjectId::from_name("App")],
            &after.solution().projects[&ProjectId::from_name("App")]
        ));
    }

    #[test]
    fn unchanged_text_keeps_version() {
        let before = two_projects();
        let doc = before.documents().into_iter().next().expect("doc");
        let same = doc.with_text(doc.text().to_string());
        assert_eq!(same.solution().version(), before.version());
    }

    #[test]
    fn reaches_follows_transitive_references() {
        let s = Solution::builder()
            .project("A")
            .project("B")
            .project("C")
            .project_reference("A", "B")
            .project_reference("B", "C")
            .build()
            .expect("build");
        let (a, c) = (ProjectId::from_name("A"), ProjectId::from_name("C"));
        assert!(s.reaches(a, c));
        assert!(!s.reaches(c, a));
    }
}
