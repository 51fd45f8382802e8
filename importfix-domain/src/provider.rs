use crate::error::FixError;
use crate::fixes::{
    AssemblyFix, DeferredFix, FixKind, FixReference, FixTarget, PackageFix, ProjectFix,
};
use crate::ports::{FixServices, HitOrigin, SearchHit, SearchQuery, SymbolSearch};
use importfix_edit::EditError;
use importfix_solution::{DocumentSnapshot, Solution};
use importfix_types::TextRange;
use importfix_types::ids::DocumentId;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub place_system_first: bool,
    pub max_fixes: Option<usize>,
    pub projects: bool,
    pub assemblies: bool,
    pub packages: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            place_system_first: true,
            max_fixes: None,
            projects: true,
            assemblies: true,
            packages: true,
        }
    }
}

/// The unbound name a caller wants fixes for.
#[derive(Debug, Clone)]
pub struct FixContext {
    pub solution: Solution,
    pub document: DocumentId,
    pub name: String,
    pub name_range: TextRange,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferStats {
    pub hits_total: usize,
    pub duplicates_dropped: usize,
    pub noops_dropped: usize,
    pub truncated_to: Option<usize>,
}

#[derive(Debug)]
pub struct Offer {
    /// Highest priority first; discovery order within a tier.
    pub fixes: Vec<DeferredFix>,
    pub stats: OfferStats,
}

enum Classified {
    Fix(FixKind),
    NoOp,
    Disabled,
}

/// Turns search hits for one unbound name into deferred fixes.
pub struct AddImportProvider {
    searches: Vec<Arc<dyn SymbolSearch>>,
    services: FixServices,
    config: ProviderConfig,
}

impl AddImportProvider {
    pub fn new(
        searches: Vec<Arc<dyn SymbolSearch>>,
        services: FixServices,
        config: ProviderConfig,
    ) -> Self {
        Self {
            searches,
            services,
            config,
        }
    }

    pub fn offer(&self, ctx: &FixContext, cancel: &CancellationToken) -> Result<Offer, FixError> {
        let document = ctx
            .solution
            .document(ctx.document)
            .ok_or(EditError::DocumentNotFound(ctx.document))?;
        let target = FixTarget {
            document: document.id(),
            project: document.project_id(),
            name_range: ctx.name_range,
            checksum: document.checksum(),
        };
        let query = SearchQuery {
            name: ctx.name.clone(),
            project: document.project_id(),
            document: document.id(),
        };

        let mut stats = OfferStats::default();
        // Index into `fixes` for each identity already offered.
        let mut seen: HashMap<FixReference, usize> = HashMap::new();
        let mut fixes: Vec<DeferredFix> = Vec::new();

        for search in &self.searches {
            if cancel.is_cancelled() {
                return Err(FixError::Cancelled);
            }
            let hits = search.search(&query, cancel).map_err(|e| {
                let context = format!("search provider '{}'", search.provider());
                FixError::Collaborator(e.context(context))
            })?;
            if cancel.is_cancelled() {
                return Err(FixError::Cancelled);
            }
            debug!(provider = %search.provider(), hits = hits.len(), "search finished");

            for hit in hits {
                stats.hits_total += 1;
                let kind = match self.classify(&hit, &document) {
                    Classified::Fix(kind) => kind,
                    Classified::NoOp => {
                        stats.noops_dropped += 1;
                        continue;
                    }
                    Classified::Disabled => continue,
                };
                let reference = FixReference::new(search.provider().clone(), hit.result, kind);
                let fix = DeferredFix::new(
                    reference.clone(),
                    target.clone(),
                    self.config.place_system_first,
                    self.services.clone(),
                );
                match seen.get(&reference) {
                    Some(&index) => {
                        stats.duplicates_dropped += 1;
                        // The closer match wins; it keeps the first-seen slot.
                        if fix.search_result().weight < fixes[index].search_result().weight {
                            fixes[index] = fix;
                        }
                    }
                    None => {
                        seen.insert(reference, fixes.len());
                        fixes.push(fix);
                    }
                }
            }
        }

        // Stable: discovery order is kept within a tier.
        fixes.sort_by_key(|f| Reverse(f.priority()));
        if let Some(max) = self.config.max_fixes
            && fixes.len() > max
        {
            fixes.truncate(max);
            stats.truncated_to = Some(max);
        }

        info!(
            name = %ctx.name,
            offered = fixes.len(),
            duplicates = stats.duplicates_dropped,
            noops = stats.noops_dropped,
            "offered fixes"
        );
        Ok(Offer { fixes, stats })
    }

    fn classify(&self, hit: &SearchHit, document: &DocumentSnapshot) -> Classified {
        let project = document.project();
        let imported = || {
            self.services
                .imports
                .has_import(document, &hit.result.name_parts)
        };
        match &hit.origin {
            HitOrigin::Referenced => {
                if imported() {
                    Classified::NoOp
                } else {
                    Classified::Fix(FixKind::Namespace)
                }
            }
            HitOrigin::Project(_) if !self.config.projects => Classified::Disabled,
            HitOrigin::Project(id) => {
                let Some(target) = document.solution().project(*id) else {
                    return Classified::NoOp;
                };
                if *id == project.id() || (project.references_project(*id) && imported()) {
                    return Classified::NoOp;
                }
                Classified::Fix(FixKind::Project(ProjectFix {
                    target: *id,
                    target_name: target.name().to_string(),
                }))
            }
            HitOrigin::Assembly(_) if !self.config.assemblies => Classified::Disabled,
            HitOrigin::Assembly(candidate) => {
                if project.references_container(&candidate.container_name) {
                    Classified::NoOp
                } else {
                    Classified::Fix(FixKind::Assembly(AssemblyFix {
                        candidate: candidate.clone(),
                    }))
                }
            }
            HitOrigin::Package(..) if !self.config.packages => Classified::Disabled,
            HitOrigin::Package(candidate, version) => {
                if project.references_container(&candidate.container_name) {
                    Classified::NoOp
                } else {
                    Classified::Fix(FixKind::Package(PackageFix {
                        candidate: candidate.clone(),
                        version: version.clone(),
                    }))
                }
            }
        }
    }
}
