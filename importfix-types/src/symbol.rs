use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A symbol found by a discovery service.
///
/// `name_parts` is the dotted namespace that has to be imported for the
/// symbol to bind, e.g. `["System", "Collections", "Generic"]`.
///
/// Equality and hashing only look at `name_parts`. `desired_name` and
/// `weight` describe how the hit was scored, not what it is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub name_parts: Vec<String>,

    /// How the symbol should be spelled at the use site.
    pub desired_name: String,

    /// Discovery score. 0 is an exact match; higher is fuzzier.
    #[serde(default)]
    pub weight: u32,
}

impl SearchResult {
    pub fn new(name_parts: Vec<String>, desired_name: impl Into<String>) -> Self {
        Self {
            name_parts,
            desired_name: desired_name.into(),
            weight: 0,
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn is_exact(&self) -> bool {
        self.weight == 0
    }

    /// Dotted namespace, e.g. `System.Collections.Generic`.
    pub fn namespace(&self) -> String {
        self.name_parts.join(".")
    }
}

impl PartialEq for SearchResult {
    fn eq(&self, other: &Self) -> bool {
        self.name_parts == other.name_parts
    }
}

impl Eq for SearchResult {}

impl Hash for SearchResult {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name_parts.hash(state);
    }
}

/// A type found inside a container (assembly or package) that the project
/// does not reference yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalBindingCandidate {
    pub container_name: String,
    pub namespace_parts: Vec<String>,
    pub symbol_name: String,
}

impl ExternalBindingCandidate {
    pub fn new(
        container_name: impl Into<String>,
        namespace_parts: Vec<String>,
        symbol_name: impl Into<String>,
    ) -> Self {
        Self {
            container_name: container_name.into(),
            namespace_parts,
            symbol_name: symbol_name.into(),
        }
    }

    pub fn fully_qualified_name(&self) -> String {
        self.namespace_parts
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.symbol_name.as_str()))
            .collect::<Vec<_>>()
            .join(".")
    }
}
