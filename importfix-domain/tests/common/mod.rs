#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use importfix_domain::{
    AssemblyFix, BindingResolver, Cancelled, DeferredFix, FixKind, FixReference, FixServices,
    FixTarget, MetadataService, SearchHit, SearchQuery, SymbolSearch,
};
use importfix_edit::{EditResult, ImportEdit, ImportInserter, UsingDirectiveInserter, find_name};
use importfix_solution::{DocumentSnapshot, Solution};
use importfix_types::TextSize;
use importfix_types::ids::{ProjectId, ProviderId};
use importfix_types::reference::{ReferenceHandle, ReferenceProperties};
use importfix_types::symbol::{ExternalBindingCandidate, SearchResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const PROGRAM: &str = "src/Program.cs";

pub fn parts(s: &str) -> Vec<String> {
    s.split('.').map(str::to_string).collect()
}

pub fn solution(text: &str) -> Solution {
    Solution::builder()
        .document("App", PROGRAM, text.to_string())
        .document("Other", "src/Widget.cs", "namespace Foo { class Bar {} }\n")
        .build()
        .expect("build solution")
}

/// Resolver that counts calls and optionally sleeps to widen race windows.
pub struct CountingResolver {
    pub calls: AtomicUsize,
    pub path: Option<Utf8PathBuf>,
    pub delay: Duration,
}

impl CountingResolver {
    pub fn found(path: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            path: Some(Utf8PathBuf::from(path)),
            delay: Duration::ZERO,
        }
    }

    pub fn missing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            path: None,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BindingResolver for CountingResolver {
    fn resolve(
        &self,
        _project: ProjectId,
        _container: &str,
        _fqn: &str,
        _cancel: &CancellationToken,
    ) -> Result<Option<Utf8PathBuf>, Cancelled> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Ok(self.path.clone())
    }
}

/// First call blocks until its token fires; later calls succeed.
pub struct BlockOnceResolver {
    pub calls: AtomicUsize,
    pub entered: AtomicBool,
}

impl BlockOnceResolver {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            entered: AtomicBool::new(false),
        }
    }
}

impl BindingResolver for BlockOnceResolver {
    fn resolve(
        &self,
        _project: ProjectId,
        container: &str,
        _fqn: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Utf8PathBuf>, Cancelled> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.entered.store(true, Ordering::SeqCst);
            while !cancel.is_cancelled() {
                std::thread::sleep(Duration::from_millis(1));
            }
            return Err(Cancelled);
        }
        Ok(Some(Utf8PathBuf::from(format!("refs/{container}.dll"))))
    }
}

pub struct StubMetadata;

impl MetadataService for StubMetadata {
    fn get_reference(
        &self,
        path: &Utf8Path,
        properties: ReferenceProperties,
    ) -> anyhow::Result<ReferenceHandle> {
        let name = path.file_stem().unwrap_or(path.as_str()).to_string();
        let mut handle = ReferenceHandle::assembly(name, path.to_path_buf());
        handle.properties = properties;
        Ok(handle)
    }
}

pub fn services(resolver: Arc<dyn BindingResolver>) -> FixServices {
    FixServices {
        resolver,
        metadata: Arc::new(StubMetadata),
        imports: Arc::new(UsingDirectiveInserter::csharp()),
    }
}

pub fn target_for(solution: &Solution, name: &str) -> FixTarget {
    let doc = solution
        .document_by_path(Utf8Path::new(PROGRAM))
        .expect("program document");
    FixTarget {
        document: doc.id(),
        project: doc.project_id(),
        name_range: find_name(doc.text(), name, None).expect("name in document"),
        checksum: doc.checksum(),
    }
}

pub fn assembly_fix(
    solution: &Solution,
    container: &str,
    resolver: Arc<dyn BindingResolver>,
) -> DeferredFix {
    let reference = FixReference::new(
        ProviderId::new("metadata"),
        SearchResult::new(parts("Foo"), "Bar"),
        FixKind::Assembly(AssemblyFix {
            candidate: ExternalBindingCandidate::new(container, parts("Foo"), "Bar"),
        }),
    );
    DeferredFix::new(reference, target_for(solution, "Bar"), true, services(resolver))
}

/// Search service returning a fixed list of hits.
pub struct StaticSearch {
    pub provider: ProviderId,
    pub hits: Vec<SearchHit>,
}

impl SymbolSearch for StaticSearch {
    fn provider(&self) -> &ProviderId {
        &self.provider
    }

    fn search(
        &self,
        _query: &SearchQuery,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<Vec<SearchHit>> {
        Ok(self.hits.clone())
    }
}

/// How [`MisbehavingInserter`] departs from a well-behaved inserter.
pub enum Misbehavior {
    /// Returns a document from a freshly built solution.
    ForeignWorkspace,
    /// Returns a document of the `Other` project.
    OtherProject,
    /// Inserts normally, then fires the caller's token.
    CancelAfterInsert,
}

/// Import inserter double for exercising the composition guards.
pub struct MisbehavingInserter {
    pub mode: Misbehavior,
    inner: UsingDirectiveInserter,
}

impl MisbehavingInserter {
    pub fn new(mode: Misbehavior) -> Self {
        Self {
            mode,
            inner: UsingDirectiveInserter::csharp(),
        }
    }
}

impl ImportInserter for MisbehavingInserter {
    fn describe_import(&self, name_parts: &[String]) -> String {
        self.inner.describe_import(name_parts)
    }

    fn has_import(&self, document: &DocumentSnapshot, name_parts: &[String]) -> bool {
        self.inner.has_import(document, name_parts)
    }

    fn insert_import(
        &self,
        document: &DocumentSnapshot,
        name_parts: &[String],
        place_system_first: bool,
        cancel: &CancellationToken,
    ) -> EditResult<(ImportEdit, DocumentSnapshot)> {
        let noop = ImportEdit {
            namespace: name_parts.join("."),
            offset: TextSize::from(0),
            inserted: String::new(),
        };
        match self.mode {
            Misbehavior::ForeignWorkspace => {
                let foreign = solution(document.text());
                let doc = foreign
                    .document_by_path(Utf8Path::new(PROGRAM))
                    .expect("foreign program document");
                Ok((noop, doc))
            }
            Misbehavior::OtherProject => {
                let doc = document
                    .solution()
                    .document_by_path(Utf8Path::new("src/Widget.cs"))
                    .expect("widget document");
                Ok((noop, doc))
            }
            Misbehavior::CancelAfterInsert => {
                let result = self
                    .inner
                    .insert_import(document, name_parts, place_system_first, cancel)?;
                cancel.cancel();
                Ok(result)
            }
        }
    }
}

pub fn services_with_imports(
    resolver: Arc<dyn BindingResolver>,
    imports: Arc<dyn ImportInserter>,
) -> FixServices {
    FixServices {
        resolver,
        metadata: Arc::new(StubMetadata),
        imports,
    }
}
