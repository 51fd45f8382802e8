//! On-disk description of a solution.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use importfix_solution::{Solution, SolutionError};
use importfix_types::reference::ReferenceHandle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

pub const SOLUTION_MANIFEST: &str = "importfix-solution.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionManifest {
    #[serde(default)]
    pub projects: Vec<ProjectManifest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub name: String,

    /// Paths relative to the solution root.
    #[serde(default)]
    pub documents: Vec<Utf8PathBuf>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<ReferenceHandle>,

    /// Names of referenced projects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_references: Vec<String>,
}

impl SolutionManifest {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("parse solution manifest")
    }

    /// Manifest describing `solution`, projects and documents sorted by name.
    pub fn from_solution(solution: &Solution) -> Self {
        let mut projects: Vec<ProjectManifest> = solution
            .projects()
            .map(|p| {
                let mut documents: Vec<Utf8PathBuf> =
                    p.documents().iter().map(|d| d.path().to_path_buf()).collect();
                documents.sort();
                let mut project_references: Vec<String> = p
                    .project_references()
                    .iter()
                    .filter_map(|id| solution.project(*id).map(|r| r.name().to_string()))
                    .collect();
                project_references.sort();
                ProjectManifest {
                    name: p.name().to_string(),
                    documents,
                    references: p.references().to_vec(),
                    project_references,
                }
            })
            .collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Self { projects }
    }

    /// Builds the initial snapshot, reading document texts below `root`.
    pub fn load(&self, root: &Utf8Path) -> anyhow::Result<Solution> {
        let mut seen = BTreeSet::new();
        let mut builder = Solution::builder();
        for project in &self.projects {
            if !seen.insert(project.name.as_str()) {
                return Err(SolutionError::DuplicateProject(project.name.clone()).into());
            }
            builder = builder.project(&project.name);
            for doc in &project.documents {
                let abs = root.join(doc);
                let text = fs::read_to_string(&abs).with_context(|| format!("read {}", abs))?;
                builder = builder.document(&project.name, doc.clone(), text);
            }
            for reference in &project.references {
                builder = builder.reference(&project.name, reference.clone());
            }
            for to in &project.project_references {
                builder = builder.project_reference(&project.name, to);
            }
        }
        let solution = builder.build().context("build solution")?;
        debug!(
            projects = self.projects.len(),
            documents = solution.documents().len(),
            "loaded solution"
        );
        Ok(solution)
    }
}
