//! JSON-backed symbol index.
//!
//! `importfix-symbols.json` is a flat array of entries. Every distinct
//! `provider` becomes one search service, in first-seen order.

use anyhow::{Context, bail};
use camino::Utf8Path;
use fs_err as fs;
use importfix_domain::{HitOrigin, SearchHit, SearchQuery, SymbolSearch};
use importfix_types::ids::{ProjectId, ProviderId};
use importfix_types::symbol::{ExternalBindingCandidate, SearchResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const SYMBOL_INDEX: &str = "importfix-symbols.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrigin {
    Referenced,
    Project,
    Assembly,
    Package,
}

impl EntryOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryOrigin::Referenced => "referenced",
            EntryOrigin::Project => "project",
            EntryOrigin::Assembly => "assembly",
            EntryOrigin::Package => "package",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub provider: String,
    /// Dotted namespace that declares the symbol.
    pub namespace: String,
    pub name: String,
    pub origin: EntryOrigin,

    /// Assembly or package name; required for those origins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Declaring project; required for project origins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

impl SymbolEntry {
    fn validate(&self) -> anyhow::Result<()> {
        if self.namespace.split('.').any(|p| p.trim().is_empty()) {
            bail!("symbol '{}' has an invalid namespace '{}'", self.name, self.namespace);
        }
        match self.origin {
            EntryOrigin::Assembly | EntryOrigin::Package if self.container.is_none() => {
                bail!(
                    "symbol '{}.{}' with origin {} needs a container",
                    self.namespace,
                    self.name,
                    self.origin.as_str()
                )
            }
            EntryOrigin::Project if self.project.is_none() => {
                bail!(
                    "symbol '{}.{}' with origin project needs a project",
                    self.namespace,
                    self.name
                )
            }
            _ => Ok(()),
        }
    }

    fn name_parts(&self) -> Vec<String> {
        self.namespace.split('.').map(str::to_string).collect()
    }

    fn to_hit(&self, weight: u32) -> Option<SearchHit> {
        let parts = self.name_parts();
        let origin = match self.origin {
            EntryOrigin::Referenced => HitOrigin::Referenced,
            EntryOrigin::Project => {
                HitOrigin::Project(ProjectId::from_name(self.project.as_deref()?))
            }
            EntryOrigin::Assembly => HitOrigin::Assembly(ExternalBindingCandidate::new(
                self.container.as_deref()?,
                parts.clone(),
                self.name.clone(),
            )),
            EntryOrigin::Package => HitOrigin::Package(
                ExternalBindingCandidate::new(
                    self.container.as_deref()?,
                    parts.clone(),
                    self.name.clone(),
                ),
                self.version.clone(),
            ),
        };
        Some(SearchHit {
            result: SearchResult::new(parts, self.name.clone()).with_weight(weight),
            origin,
        })
    }
}

/// One provider's slice of the index.
#[derive(Debug, Clone)]
pub struct IndexSearch {
    provider: ProviderId,
    entries: Arc<Vec<SymbolEntry>>,
}

impl IndexSearch {
    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }
}

impl SymbolSearch for IndexSearch {
    fn provider(&self) -> &ProviderId {
        &self.provider
    }

    fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Vec<SearchHit>> {
        let mut hits = Vec::new();
        for entry in self.entries.iter() {
            if cancel.is_cancelled() {
                break;
            }
            let weight = if entry.name == query.name {
                0
            } else if entry.name.eq_ignore_ascii_case(&query.name) {
                1
            } else {
                continue;
            };
            hits.extend(entry.to_hit(weight));
        }
        Ok(hits)
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonSymbolIndex {
    searches: Vec<IndexSearch>,
}

impl JsonSymbolIndex {
    pub fn from_entries(entries: Vec<SymbolEntry>) -> anyhow::Result<Self> {
        let mut grouped: Vec<(ProviderId, Vec<SymbolEntry>)> = Vec::new();
        for entry in entries {
            entry.validate()?;
            match grouped.iter_mut().find(|(p, _)| p.as_str() == entry.provider) {
                Some((_, list)) => list.push(entry),
                None => grouped.push((ProviderId::new(entry.provider.clone()), vec![entry])),
            }
        }
        Ok(Self {
            searches: grouped
                .into_iter()
                .map(|(provider, entries)| IndexSearch {
                    provider,
                    entries: Arc::new(entries),
                })
                .collect(),
        })
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let entries: Vec<SymbolEntry> = serde_json::from_str(raw).context("parse symbol index")?;
        Self::from_entries(entries)
    }

    pub fn load(path: &Utf8Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("read {}", path))?;
        Self::parse(&raw).with_context(|| format!("load {}", path))
    }

    /// Loads `importfix-symbols.json` under `root`; a missing file is an empty index.
    pub fn load_or_empty(root: &Utf8Path) -> anyhow::Result<Self> {
        let path = root.join(SYMBOL_INDEX);
        if !path.exists() {
            debug!(path = %path, "no symbol index, using empty");
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn sources(&self) -> &[IndexSearch] {
        &self.searches
    }

    pub fn searches(&self) -> Vec<Arc<dyn SymbolSearch>> {
        self.searches
            .iter()
            .cloned()
            .map(|s| Arc::new(s) as Arc<dyn SymbolSearch>)
            .collect()
    }
}
