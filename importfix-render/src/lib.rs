//! Rendering helpers (markdown) for human-readable reports.

use importfix_types::apply::{ApplyReport, ApplyStatus};
use importfix_types::offer::OfferReport;

pub fn render_offer_md(report: &OfferReport) -> String {
    let mut out = String::new();
    out.push_str("# importfix offer\n\n");
    out.push_str(&format!(
        "- Name: `{}` in `{}` ({}..{})\n",
        report.query.name, report.query.document, report.query.start, report.query.end
    ));
    out.push_str(&format!(
        "- Hits: {} (duplicates {}, no-ops {})\n",
        report.summary.hits_total, report.summary.duplicates_dropped, report.summary.noops_dropped
    ));
    out.push_str(&format!("- Fixes: {}", report.summary.fixes_offered));
    if let Some(max) = report.summary.truncated_to {
        out.push_str(&format!(" (truncated to {})", max));
    }
    out.push_str("\n\n## Fixes\n\n");

    if report.fixes.is_empty() {
        out.push_str("_No fixes offered._\n");
        return out;
    }

    for (i, fix) in report.fixes.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n\n", i + 1, fix.title));
        out.push_str(&format!("- Id: `{}`\n", fix.id));
        out.push_str(&format!("- Kind: `{}`\n", fix.kind.as_str()));
        out.push_str(&format!("- Priority: `{}`\n", fix.priority.as_str()));
        out.push_str(&format!("- Provider: `{}`\n", fix.provider));
        if let Some(container) = &fix.container {
            out.push_str(&format!("- Container: `{}`\n", container));
        }
        if !fix.tags.is_empty() {
            out.push_str(&format!("- Tags: {}\n", fix.tags.join(", ")));
        }
        if fix.requires_check {
            out.push_str("- Resolved on apply\n");
        }
        out.push('\n');
    }

    out
}

pub fn render_apply_md(report: &ApplyReport) -> String {
    let mut out = String::new();
    out.push_str("# importfix apply\n\n");
    out.push_str(&format!("- Fix: {} (`{}`)\n", report.title, report.fix_id));
    out.push_str(&format!("- Status: `{}`\n", status_label(report.status)));
    out.push_str(&format!("- Dry run: `{}`\n", report.dry_run));
    if let Some(path) = &report.resolved_path {
        out.push_str(&format!("- Resolved: `{}`\n", path));
    }
    if let Some(at) = &report.applied_at {
        out.push_str(&format!("- Applied at: {}\n", at.to_rfc3339()));
    }
    if let Some(msg) = &report.message {
        out.push_str(&format!("\n{}\n", msg));
    }

    if !report.files.is_empty() {
        out.push_str("\n## Files\n\n");
        for f in &report.files {
            out.push_str(&format!(
                "- `{}` {} -> {}\n",
                f.path,
                short(&f.sha256_before),
                short(&f.sha256_after)
            ));
        }
    }

    if !report.references_added.is_empty() || !report.project_references_added.is_empty() {
        out.push_str("\n## References added\n\n");
        for r in &report.references_added {
            match (&r.version, &r.path) {
                (Some(v), _) => out.push_str(&format!("- `{}` {}\n", r.display_name, v)),
                (None, Some(p)) => out.push_str(&format!("- `{}` ({})\n", r.display_name, p)),
                (None, None) => out.push_str(&format!("- `{}`\n", r.display_name)),
            }
        }
        for p in &report.project_references_added {
            out.push_str(&format!("- project `{}`\n", p));
        }
    }

    out
}

fn status_label(status: ApplyStatus) -> &'static str {
    match status {
        ApplyStatus::Applied => "applied",
        ApplyStatus::NotApplicable => "not_applicable",
        ApplyStatus::Failed => "failed",
        ApplyStatus::Skipped => "skipped",
    }
}

fn short(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}
