//! Default filesystem-backed port implementations.

use crate::manifest::{SOLUTION_MANIFEST, SolutionManifest};
use crate::ports::{SolutionSource, WritePort};
use crate::settings::OfferSettings;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use importfix_domain::{BindingResolver, Cancelled, FixServices, MetadataService};
use importfix_edit::UsingDirectiveInserter;
use importfix_hash::sha256_hex;
use importfix_solution::Solution;
use importfix_types::ids::ProjectId;
use importfix_types::reference::{ReferenceHandle, ReferenceProperties};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Loads `importfix-solution.json` and the documents it lists.
#[derive(Debug, Clone)]
pub struct FsSolutionLoader {
    pub root: Utf8PathBuf,
}

impl FsSolutionLoader {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }
}

impl SolutionSource for FsSolutionLoader {
    fn load_solution(&self) -> anyhow::Result<Solution> {
        let path = self.root.join(SOLUTION_MANIFEST);
        let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path))?;
        let manifest = SolutionManifest::parse(&raw).with_context(|| format!("load {}", path))?;
        manifest.load(&self.root)
    }
}

/// Pre-built solution for embedding and testing.
#[derive(Debug, Clone)]
pub struct InMemorySolutionSource {
    solution: Solution,
}

impl InMemorySolutionSource {
    pub fn new(solution: Solution) -> Self {
        Self { solution }
    }
}

impl SolutionSource for InMemorySolutionSource {
    fn load_solution(&self) -> anyhow::Result<Solution> {
        Ok(self.solution.clone())
    }
}

/// Finds `<container>.dll` or `<container>[.version].nupkg` below the
/// configured search paths.
#[derive(Debug, Clone)]
pub struct FsBindingResolver {
    root: Utf8PathBuf,
    search_paths: Vec<Utf8PathBuf>,
}

impl FsBindingResolver {
    pub fn new(root: Utf8PathBuf, search_paths: Vec<Utf8PathBuf>) -> Self {
        Self { root, search_paths }
    }

    fn abs(&self, dir: &Utf8Path) -> Utf8PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root.join(dir)
        }
    }

    fn find_in(&self, dir: &Utf8Path, container: &str) -> Option<Utf8PathBuf> {
        let base = glob::Pattern::escape(dir.as_str());
        let name = glob::Pattern::escape(container);
        for pattern in [
            format!("{base}/**/{name}.dll"),
            format!("{base}/**/{name}.nupkg"),
            format!("{base}/**/{name}.*.nupkg"),
        ] {
            let paths = match glob::glob(&pattern) {
                Ok(paths) => paths,
                Err(err) => {
                    warn!(pattern = %pattern, error = %err, "invalid search pattern");
                    continue;
                }
            };
            let mut found: Vec<Utf8PathBuf> = paths
                .filter_map(Result::ok)
                .filter_map(|p| Utf8PathBuf::from_path_buf(p).ok())
                .collect();
            found.sort();
            if let Some(path) = found.into_iter().next() {
                return Some(
                    path.strip_prefix(&self.root)
                        .map(Utf8Path::to_path_buf)
                        .unwrap_or(path),
                );
            }
        }
        None
    }
}

impl BindingResolver for FsBindingResolver {
    fn resolve(
        &self,
        project: ProjectId,
        container: &str,
        fully_qualified_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Utf8PathBuf>, Cancelled> {
        for dir in &self.search_paths {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }
            if let Some(path) = self.find_in(&self.abs(dir), container) {
                debug!(
                    %project,
                    container,
                    symbol = fully_qualified_name,
                    path = %path,
                    "resolved binding"
                );
                return Ok(Some(path));
            }
        }
        debug!(%project, container, symbol = fully_qualified_name, "binding not found");
        Ok(None)
    }
}

/// Fixed container → path table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBindingResolver {
    paths: BTreeMap<String, Utf8PathBuf>,
}

impl InMemoryBindingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, container: &str, path: impl Into<Utf8PathBuf>) -> Self {
        self.paths.insert(container.to_string(), path.into());
        self
    }
}

impl BindingResolver for InMemoryBindingResolver {
    fn resolve(
        &self,
        _project: ProjectId,
        container: &str,
        _fully_qualified_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Utf8PathBuf>, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        Ok(self.paths.get(container).cloned())
    }
}

fn assembly_handle(path: &Utf8Path, properties: ReferenceProperties) -> ReferenceHandle {
    let name = path
        .file_stem()
        .map(str::to_string)
        .unwrap_or_else(|| path.to_string());
    let mut handle = ReferenceHandle::assembly(name, path.to_path_buf());
    handle.properties = properties;
    handle
}

/// Builds assembly references, recording the file's sha256.
#[derive(Debug, Clone)]
pub struct FsMetadataService {
    root: Utf8PathBuf,
}

impl FsMetadataService {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }
}

impl MetadataService for FsMetadataService {
    fn get_reference(
        &self,
        path: &Utf8Path,
        properties: ReferenceProperties,
    ) -> anyhow::Result<ReferenceHandle> {
        let abs = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let bytes = fs::read(&abs).with_context(|| format!("read {}", abs))?;
        Ok(assembly_handle(path, properties).with_checksum(sha256_hex(&bytes)))
    }
}

/// Metadata service that never touches the filesystem.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetadataService;

impl MetadataService for InMemoryMetadataService {
    fn get_reference(
        &self,
        path: &Utf8Path,
        properties: ReferenceProperties,
    ) -> anyhow::Result<ReferenceHandle> {
        Ok(assembly_handle(path, properties))
    }
}

/// Filesystem-backed collaborators for a solution root.
pub fn fs_services(settings: &OfferSettings) -> FixServices {
    FixServices {
        resolver: Arc::new(FsBindingResolver::new(
            settings.solution_root.clone(),
            settings.search_paths.clone(),
        )),
        metadata: Arc::new(FsMetadataService::new(settings.solution_root.clone())),
        imports: Arc::new(UsingDirectiveInserter::csharp()),
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }
}

/// Records writes instead of performing them.
#[derive(Debug, Default)]
pub struct InMemoryWritePort {
    files: Mutex<BTreeMap<Utf8PathBuf, Vec<u8>>>,
}

impl InMemoryWritePort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> BTreeMap<Utf8PathBuf, Vec<u8>> {
        self.files.lock().clone()
    }
}

impl WritePort for InMemoryWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        self.files.lock().insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}

/// Writes documents that differ between `before` and `after`, plus the
/// manifest when references changed. Returns the written paths.
pub fn write_solution(
    root: &Utf8Path,
    before: &Solution,
    after: &Solution,
    writer: &dyn WritePort,
) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let mut written = Vec::new();
    for id in before.changed_documents(after) {
        let Some(doc) = after.document(id) else {
            continue;
        };
        let path = root.join(doc.path());
        writer.write_file(&path, doc.text().as_bytes())?;
        written.push(path);
    }

    let old_manifest = SolutionManifest::from_solution(before);
    let new_manifest = SolutionManifest::from_solution(after);
    if old_manifest != new_manifest {
        let path = root.join(SOLUTION_MANIFEST);
        let mut json = serde_json::to_string_pretty(&new_manifest).context("serialize manifest")?;
        json.push('\n');
        writer.write_file(&path, json.as_bytes())?;
        written.push(path);
    }

    debug!(files = written.len(), "wrote solution");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir")
    }

    #[test]
    fn fs_resolver_finds_nested_dll() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        std::fs::create_dir_all(root.join("refs/net8")).unwrap();
        std::fs::write(root.join("refs/net8/ContosoLib.dll"), b"MZ").unwrap();

        let resolver = FsBindingResolver::new(root.clone(), vec!["refs".into()]);
        let token = CancellationToken::new();
        let found = resolver
            .resolve(ProjectId::from_name("App"), "ContosoLib", "Foo.Bar", &token)
            .unwrap();
        assert_eq!(found, Some(Utf8PathBuf::from("refs/net8/ContosoLib.dll")));

        let missing = resolver
            .resolve(ProjectId::from_name("App"), "Fabrikam", "Foo.Bar", &token)
            .unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn fs_resolver_honors_cancellation() {
        let resolver = FsBindingResolver::new(".".into(), vec!["refs".into()]);
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(
            resolver.resolve(ProjectId::from_name("App"), "X", "X.Y", &token),
            Err(Cancelled)
        );
    }

    #[test]
    fn fs_metadata_records_checksum() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        std::fs::create_dir_all(root.join("refs")).unwrap();
        std::fs::write(root.join("refs/ContosoLib.dll"), b"MZ").unwrap();

        let handle = FsMetadataService::new(root)
            .get_reference(Utf8Path::new("refs/ContosoLib.dll"), ReferenceProperties::assembly())
            .unwrap();
        assert_eq!(handle.display_name, "ContosoLib");
        assert_eq!(handle.checksum.as_deref(), Some(sha256_hex(b"MZ").as_str()));
    }

    #[test]
    fn in_memory_write_port_records() {
        let before = Solution::builder()
            .document("App", "a.cs", "class A {}\n")
            .build()
            .unwrap();
        let after = before
            .document_by_path(Utf8Path::new("a.cs"))
            .unwrap()
            .with_text("using Foo;\nclass A {}\n")
            .solution()
            .clone();
        let port = InMemoryWritePort::new();
        let written = write_solution(Utf8Path::new("root"), &before, &after, &port).unwrap();
        assert_eq!(written, vec![Utf8PathBuf::from("root/a.cs")]);
        assert_eq!(
            port.files()[Utf8Path::new("root/a.cs")],
            b"using Foo;\nclass A {}\n".to_vec()
        );
    }
}
