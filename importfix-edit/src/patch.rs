use diffy::PatchFormatter;
use importfix_solution::Solution;

/// Unified diff of every document whose text differs between two snapshots.
///
/// Documents are emitted in solution order, one `diff --git` section each.
pub fn render_patch(before: &Solution, after: &Solution) -> String {
    let mut out = String::new();
    let formatter = PatchFormatter::new();

    for id in before.changed_documents(after) {
        let Some(new) = after.document(id) else {
            continue;
        };
        let old_text = before
            .document(id)
            .map(|d| d.text().to_string())
            .unwrap_or_default();
        let path = new.path();

        out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
        out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

        let patch = diffy::create_patch(&old_text, new.text());
        let body = formatter.fmt_patch(&patch).to_string();
        // diffy repeats the file header; keep only the hunks.
        let hunks = body
            .split_inclusive('\n')
            .skip_while(|l| l.starts_with("---") || l.starts_with("+++"))
            .collect::<String>();
        out.push_str(&hunks);
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;

    #[test]
    fn unchanged_solution_renders_nothing() {
        let s = Solution::builder()
            .document("App", "a.cs", "class A {}\n")
            .build()
            .expect("build");
        assert_eq!(render_patch(&s, &s), "");
    }

    #[test]
    fn edited_document_renders_single_section() {
        let before = Solution::builder()
            .document("App", "a.cs", "class A {}\n")
            .document("App", "b.cs", "class B {}\n")
            .build()
            .expect("build");
        let after = before
            .document_by_path(Utf8Path::new("a.cs"))
            .expect("doc")
            .with_text("using Foo;\nclass A {}\n")
            .solution()
            .clone();

        let patch = render_patch(&before, &after);
        assert!(patch.starts_with("diff --git a/a.cs b/a.cs\n--- a/a.cs\n+++ b/a.cs\n@@"));
        assert!(patch.contains("+using Foo;\n"));
        assert!(!patch.contains("b.cs"));
        assert_eq!(patch.matches("--- a/").count(), 1);
    }
}
