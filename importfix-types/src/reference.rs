use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Assembly,
    Package,
}

/// How a metadata file is consumed by the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataImageKind {
    #[default]
    Assembly,
    Module,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceProperties {
    pub kind: MetadataImageKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub embed_interop_types: bool,
}

impl ReferenceProperties {
    /// Plain assembly reference, global alias, no interop embedding.
    pub fn assembly() -> Self {
        Self::default()
    }
}

/// An external reference attached to a project.
///
/// Two handles are the same reference when they have the same kind and the
/// same location: the path for assemblies, the name for packages. Checksums,
/// versions and properties do not make a second reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceHandle {
    pub kind: ReferenceKind,
    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Utf8PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    #[serde(default)]
    pub properties: ReferenceProperties,
}

impl ReferenceHandle {
    pub fn assembly(display_name: impl Into<String>, path: Utf8PathBuf) -> Self {
        Self {
            kind: ReferenceKind::Assembly,
            display_name: display_name.into(),
            path: Some(path),
            version: None,
            checksum: None,
            properties: ReferenceProperties::assembly(),
        }
    }

    pub fn package(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            kind: ReferenceKind::Package,
            display_name: name.into(),
            path: None,
            version,
            checksum: None,
            properties: ReferenceProperties::default(),
        }
    }

    pub fn with_path(mut self, path: Utf8PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// Key used for set semantics inside a project's reference list.
    pub fn dedup_key(&self) -> (ReferenceKind, String) {
        match self.kind {
            ReferenceKind::Assembly => (
                self.kind,
                self.path
                    .as_ref()
                    .map(|p| p.as_str().replace('\\', "/"))
                    .unwrap_or_else(|| self.display_name.clone()),
            ),
            ReferenceKind::Package => (self.kind, self.display_name.clone()),
        }
    }

    /// Whether this reference makes `container` available to the project.
    pub fn provides(&self, container: &str) -> bool {
        if self.display_name == container {
            return true;
        }
        self.path
            .as_ref()
            .and_then(|p| p.file_stem())
            .is_some_and(|stem| stem == container)
    }
}

impl PartialEq for ReferenceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.dedup_key() == other.dedup_key()
    }
}

impl Eq for ReferenceHandle {}

impl Hash for ReferenceHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dedup_key().hash(state);
    }
}
