//! Import directive insertion.

use crate::error::{EditError, EditResult};
use importfix_solution::DocumentSnapshot;
use importfix_types::TextSize;
use std::cmp::Ordering;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Inserts import directives into documents.
///
/// Implementations must be pure with respect to the input document: the
/// returned document lives in a new solution snapshot.
pub trait ImportInserter: Send + Sync {
    /// Display form of the directive, e.g. `using System.Linq;`.
    fn describe_import(&self, name_parts: &[String]) -> String;

    fn has_import(&self, document: &DocumentSnapshot, name_parts: &[String]) -> bool;

    /// Inserts the directive for `name_parts`. Inserting a directive that is
    /// already present returns the document unchanged and a no-op edit.
    fn insert_import(
        &self,
        document: &DocumentSnapshot,
        name_parts: &[String],
        place_system_first: bool,
        cancel: &CancellationToken,
    ) -> EditResult<(ImportEdit, DocumentSnapshot)>;
}

/// What an insertion did to the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEdit {
    pub namespace: String,
    pub offset: TextSize,
    /// Empty when the directive was already present.
    pub inserted: String,
}

impl ImportEdit {
    pub fn is_noop(&self) -> bool {
        self.inserted.is_empty()
    }
}

/// Surface syntax of an import directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSyntax {
    pub keyword: &'static str,
    pub terminator: &'static str,
}

impl ImportSyntax {
    pub const CSHARP: ImportSyntax = ImportSyntax {
        keyword: "using",
        terminator: ";",
    };

    pub const VISUAL_BASIC: ImportSyntax = ImportSyntax {
        keyword: "Imports",
        terminator: "",
    };

    pub fn directive(&self, namespace: &str) -> String {
        format!("{} {}{}", self.keyword, namespace, self.terminator)
    }

    fn classify(&self, line: &str) -> LineKind {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineKind::Blank;
        }
        if ["//", "/*", "*", "'", "#"]
            .iter()
            .any(|p| trimmed.starts_with(p))
        {
            return LineKind::Comment;
        }

        let Some(rest) = trimmed.strip_prefix(self.keyword) else {
            return LineKind::Other;
        };
        if !rest.starts_with(char::is_whitespace) {
            return LineKind::Other;
        }
        let rest = rest.trim();
        let body = if self.terminator.is_empty() {
            rest
        } else {
            match rest.strip_suffix(self.terminator) {
                Some(b) => b.trim(),
                None => return LineKind::Other,
            }
        };
        if body.is_empty() {
            return LineKind::Other;
        }

        // Aliases and static imports stay where they are; new directives go
        // among the plain ones.
        let plain = !body.contains('=') && !body.starts_with("static ");
        LineKind::Directive {
            namespace: body.to_string(),
            plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind {
    Blank,
    Comment,
    Directive { namespace: String, plain: bool },
    Other,
}

#[derive(Debug)]
struct DirectiveLine {
    start: usize,
    end: usize,
    namespace: String,
    plain: bool,
}

struct Layout {
    /// Offset right after leading blank/comment lines.
    preamble_end: usize,
    directives: Vec<DirectiveLine>,
}

fn scan(syntax: &ImportSyntax, text: &str) -> Layout {
    let mut preamble_end = 0;
    let mut directives = Vec::new();
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        match syntax.classify(line) {
            LineKind::Blank | LineKind::Comment => {
                if directives.is_empty() {
                    preamble_end = offset;
                }
            }
            LineKind::Directive { namespace, plain } => directives.push(DirectiveLine {
                start,
                end: offset,
                namespace,
                plain,
            }),
            LineKind::Other => break,
        }
    }

    Layout {
        preamble_end,
        directives,
    }
}

fn is_system(namespace: &str) -> bool {
    namespace == "System" || namespace.starts_with("System.")
}

/// Ordering used to place a new directive among existing ones.
pub fn compare_namespaces(a: &str, b: &str, place_system_first: bool) -> Ordering {
    if place_system_first {
        match (is_system(a), is_system(b)) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
    }
    let lower = |s: &str| s.split('.').map(str::to_ascii_lowercase).collect::<Vec<_>>();
    lower(a).cmp(&lower(b)).then_with(|| a.cmp(b))
}

fn starts_with_blank_line(rest: &str) -> bool {
    rest.lines().next().is_none_or(|l| l.trim().is_empty())
}

/// Text-based inserter for `using`/`Imports` style directives.
#[derive(Debug, Clone, Copy)]
pub struct UsingDirectiveInserter {
    syntax: ImportSyntax,
}

impl UsingDirectiveInserter {
    pub fn new(syntax: ImportSyntax) -> Self {
        Self { syntax }
    }

    pub fn csharp() -> Self {
        Self::new(ImportSyntax::CSHARP)
    }

    pub fn syntax(&self) -> ImportSyntax {
        self.syntax
    }

    /// Computes the insertion for `namespace` without building a snapshot.
    pub fn plan_insertion(
        &self,
        text: &str,
        namespace: &str,
        place_system_first: bool,
    ) -> (usize, String) {
        let layout = scan(&self.syntax, text);
        if layout
            .directives
            .iter()
            .any(|d| d.plain && d.namespace == namespace)
        {
            return (0, String::new());
        }

        let plain: Vec<&DirectiveLine> = layout.directives.iter().filter(|d| d.plain).collect();
        let position = match plain
            .iter()
            .find(|d| compare_namespaces(namespace, &d.namespace, place_system_first).is_lt())
        {
            Some(d) => d.start,
            None => match (plain.last(), layout.directives.first()) {
                (Some(last), _) => last.end,
                (None, Some(first_alias)) => first_alias.start,
                (None, None) => layout.preamble_end,
            },
        };

        let eol = if text.contains("\r\n") { "\r\n" } else { "\n" };
        let mut inserted = String::new();
        if position == text.len() && !text.is_empty() && !text.ends_with('\n') {
            inserted.push_str(eol);
        }
        inserted.push_str(&self.syntax.directive(namespace));
        inserted.push_str(eol);
        if layout.directives.is_empty() {
            let rest = &text[position..];
            if !rest.is_empty() && !starts_with_blank_line(rest) {
                inserted.push_str(eol);
            }
        }
        (position, inserted)
    }
}

impl Default for UsingDirectiveInserter {
    fn default() -> Self {
        Self::csharp()
    }
}

impl ImportInserter for UsingDirectiveInserter {
    fn describe_import(&self, name_parts: &[String]) -> String {
        self.syntax.directive(&name_parts.join("."))
    }

    fn has_import(&self, document: &DocumentSnapshot, name_parts: &[String]) -> bool {
        let namespace = name_parts.join(".");
        scan(&self.syntax, document.text())
            .directives
            .iter()
            .any(|d| d.plain && d.namespace == namespace)
    }

    fn insert_import(
        &self,
        document: &DocumentSnapshot,
        name_parts: &[String],
        place_system_first: bool,
        cancel: &CancellationToken,
    ) -> EditResult<(ImportEdit, DocumentSnapshot)> {
        if cancel.is_cancelled() {
            return Err(EditError::Cancelled);
        }
        let namespace = name_parts.join(".");
        if name_parts.is_empty() || name_parts.iter().any(|p| p.trim().is_empty()) {
            return Err(EditError::InvalidName(namespace));
        }

        let text = document.text();
        let (position, inserted) = self.plan_insertion(text, &namespace, place_system_first);
        let offset = TextSize::try_from(position).map_err(|_| EditError::InvalidRange {
            start: u32::MAX,
            end: u32::MAX,
            len: text.len(),
        })?;

        if inserted.is_empty() {
            debug!(namespace = %namespace, document = %document.path(), "import already present");
            return Ok((
                ImportEdit {
                    namespace,
                    offset,
                    inserted,
                },
                document.clone(),
            ));
        }

        let mut new_text = String::with_capacity(text.len() + inserted.len());
        new_text.push_str(&text[..position]);
        new_text.push_str(&inserted);
        new_text.push_str(&text[position..]);

        debug!(
            namespace = %namespace,
            document = %document.path(),
            offset = position,
            "inserted import directive"
        );
        let new_document = document.with_text(new_text);
        Ok((
            ImportEdit {
                namespace,
                offset,
                inserted,
            },
            new_document,
        ))
    }
}
