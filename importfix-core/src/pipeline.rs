//! Core offer and apply pipelines, extracted from the CLI.
//!
//! These entry points are I/O-agnostic: loading goes through
//! [`SolutionSource`](crate::ports::SolutionSource) and writing through
//! [`WritePort`].

use crate::adapters::write_solution;
use crate::ports::WritePort;
use crate::settings::{ApplySettings, OfferSettings};
use anyhow::Context;
use camino::Utf8PathBuf;
use chrono::Utc;
use importfix_domain::{
    AddImportProvider, DeferredFix, FixContext, FixError, FixServices, SymbolSearch,
};
use importfix_edit::{find_name, render_patch};
use importfix_hash::sha256_str;
use importfix_solution::Solution;
use importfix_types::apply::{ApplyFile, ApplyReport, ApplyStatus};
use importfix_types::offer::{OfferQuery, OfferReport, OfferSummary, OfferedFix, ToolInfo};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Error type for pipeline results. Exit code 2 = not applicable or
/// conflict, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("not applicable: {0}")]
    NotApplicable(String),
    #[error(transparent)]
    Fix(#[from] FixError),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolError::NotApplicable(_) => 2,
            ToolError::Fix(err) => err.exit_code(),
            ToolError::Internal(_) => 1,
        }
    }
}

/// The unbound name to offer fixes for.
#[derive(Debug, Clone)]
pub struct OfferRequest {
    pub document: Utf8PathBuf,
    pub symbol: String,
    /// 1-based line to look for the name on.
    pub line: Option<u32>,
}

/// Outcome of `run_offer`.
#[derive(Debug)]
pub struct OfferOutcome {
    pub fixes: Vec<DeferredFix>,
    pub report: OfferReport,
}

/// Run discovery for one name. Nothing is resolved.
pub fn run_offer(
    settings: &OfferSettings,
    solution: &Solution,
    searches: Vec<Arc<dyn SymbolSearch>>,
    services: FixServices,
    request: &OfferRequest,
    tool: ToolInfo,
    cancel: &CancellationToken,
) -> Result<OfferOutcome, ToolError> {
    let document = solution
        .document_by_path(&request.document)
        .with_context(|| format!("document {} is not part of the solution", request.document))?;
    let range = find_name(document.text(), &request.symbol, request.line).ok_or_else(|| {
        ToolError::NotApplicable(format!(
            "'{}' does not occur in {}",
            request.symbol, request.document
        ))
    })?;

    let provider = AddImportProvider::new(searches, services, settings.provider_config());
    let ctx = FixContext {
        solution: solution.clone(),
        document: document.id(),
        name: request.symbol.clone(),
        name_range: range,
    };
    let offer = provider.offer(&ctx, cancel)?;

    let mut report = OfferReport::new(
        tool,
        OfferQuery {
            document: document.path().to_string(),
            name: request.symbol.clone(),
            start: range.start().into(),
            end: range.end().into(),
        },
    );
    report.fixes = offer.fixes.iter().map(offered_fix).collect();
    report.summary = OfferSummary {
        hits_total: offer.stats.hits_total as u64,
        duplicates_dropped: offer.stats.duplicates_dropped as u64,
        noops_dropped: offer.stats.noops_dropped as u64,
        fixes_offered: offer.fixes.len() as u64,
        truncated_to: offer.stats.truncated_to.map(|n| n as u64),
    };

    Ok(OfferOutcome {
        fixes: offer.fixes,
        report,
    })
}

fn offered_fix(fix: &DeferredFix) -> OfferedFix {
    let description = fix.describe();
    OfferedFix {
        id: fix.id().to_string(),
        title: description.title,
        priority: description.priority,
        kind: fix.label(),
        provider: fix.provider().to_string(),
        tags: description.tags.iter().map(|t| t.to_string()).collect(),
        container: fix.kind().container_name().map(str::to_string),
        requires_check: fix.requires_final_applicability_check(),
    }
}

/// Picks a fix by 1-based index or by id (a unique prefix is enough).
pub fn select_fix<'a>(fixes: &'a [DeferredFix], selector: &str) -> Option<&'a DeferredFix> {
    if let Ok(n) = selector.parse::<usize>()
        && (1..=fixes.len()).contains(&n)
    {
        return fixes.get(n - 1);
    }
    let mut matches = fixes
        .iter()
        .filter(|f| f.id().to_string().starts_with(selector));
    match (matches.next(), matches.next()) {
        (Some(fix), None) if !selector.is_empty() => Some(fix),
        _ => None,
    }
}

/// Outcome of `run_apply`.
#[derive(Debug)]
pub struct ApplyOutcome {
    /// The changed solution, or the input when nothing was applied.
    pub solution: Solution,
    pub report: ApplyReport,
    pub patch: String,
    pub not_applicable: bool,
}

/// Run the final applicability check, execute the fix and, unless this is a
/// dry run, write the result.
pub fn run_apply(
    settings: &ApplySettings,
    solution: &Solution,
    fix: &DeferredFix,
    writer: &dyn WritePort,
    tool: ToolInfo,
    cancel: &CancellationToken,
) -> Result<ApplyOutcome, ToolError> {
    let description = fix.describe();
    let mut report = ApplyReport::new(tool, fix.id().to_string(), description.title);
    report.dry_run = settings.dry_run;

    if fix.requires_final_applicability_check() && !fix.is_applicable(cancel) {
        if cancel.is_cancelled() {
            return Err(FixError::Cancelled.into());
        }
        report.status = ApplyStatus::NotApplicable;
        report.message = fix.kind().binding_candidate().map(|c| {
            format!(
                "'{}' could not be resolved in '{}'",
                c.fully_qualified_name(),
                c.container_name
            )
        });
        info!(fix = %report.fix_id, "fix is not applicable");
        return Ok(ApplyOutcome {
            solution: solution.clone(),
            report,
            patch: String::new(),
            not_applicable: true,
        });
    }

    let operations = fix.execute(solution, cancel)?;
    let after = operations
        .first()
        .map(|op| op.changed_solution().clone())
        .context("fix produced no operations")?;

    report.resolved_path = fix
        .resolution()
        .and_then(|r| r.path().map(|p| p.to_string()));
    report.files = solution
        .changed_documents(&after)
        .into_iter()
        .filter_map(|id| {
            let new = after.document(id)?;
            let old = solution.document(id)?;
            Some(ApplyFile {
                path: new.path().to_string(),
                sha256_before: sha256_str(old.text()),
                sha256_after: sha256_str(new.text()),
            })
        })
        .collect();
    for project in after.projects() {
        let Some(old) = solution.project(project.id()) else {
            continue;
        };
        report.references_added.extend(
            project
                .references()
                .iter()
                .filter(|r| !old.has_reference(r))
                .cloned(),
        );
        report.project_references_added.extend(
            project
                .project_references()
                .iter()
                .filter(|id| !old.references_project(**id))
                .filter_map(|id| after.project(*id).map(|p| p.name().to_string())),
        );
    }
    let patch = render_patch(solution, &after);

    if !settings.dry_run {
        let written = write_solution(&settings.offer.solution_root, solution, &after, writer)
            .context("write solution")?;
        debug!(files = written.len(), "applied fix to disk");
        report.applied_at = Some(Utc::now());
    }
    report.status = ApplyStatus::Applied;
    info!(
        fix = %report.fix_id,
        files = report.files.len(),
        references = report.references_added.len(),
        dry_run = settings.dry_run,
        "applied fix"
    );

    Ok(ApplyOutcome {
        solution: after,
        report,
        patch,
        not_applicable: false,
    })
}
