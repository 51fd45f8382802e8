//! Name replacement and lookup at a source range.

use crate::error::{EditError, EditResult};
use importfix_solution::DocumentSnapshot;
use importfix_types::{TextRange, TextSize};
use tracing::debug;

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Whether `name` is a plain identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_ident_start(c) => chars.all(is_ident_continue),
        _ => false,
    }
}

fn check_range(text: &str, range: TextRange) -> EditResult<(usize, usize)> {
    let start = usize::from(range.start());
    let end = usize::from(range.end());
    if end > text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
        return Err(EditError::InvalidRange {
            start: range.start().into(),
            end: range.end().into(),
            len: text.len(),
        });
    }
    Ok((start, end))
}

/// Text currently covered by `range`.
pub fn text_at<'a>(document: &'a DocumentSnapshot, range: TextRange) -> EditResult<&'a str> {
    let text = document.text();
    let (start, end) = check_range(text, range)?;
    Ok(&text[start..end])
}

/// Replaces the text at `range` with `desired`.
///
/// When the range already holds `desired` the document is returned as is.
pub fn replace_name(
    document: &DocumentSnapshot,
    range: TextRange,
    desired: &str,
) -> EditResult<DocumentSnapshot> {
    if !is_identifier(desired) {
        return Err(EditError::InvalidName(desired.to_string()));
    }
    let text = document.text();
    let (start, end) = check_range(text, range)?;
    if &text[start..end] == desired {
        return Ok(document.clone());
    }

    debug!(
        document = %document.path(),
        from = &text[start..end],
        to = desired,
        "replacing name"
    );
    let mut new_text = String::with_capacity(text.len() - (end - start) + desired.len());
    new_text.push_str(&text[..start]);
    new_text.push_str(desired);
    new_text.push_str(&text[end..]);
    Ok(document.with_text(new_text))
}

/// Finds the first whole-word occurrence of `name`.
///
/// `line` is 1-based; when given, only that line is searched.
pub fn find_name(text: &str, name: &str, line: Option<u32>) -> Option<TextRange> {
    if name.is_empty() {
        return None;
    }

    let (base, haystack) = match line {
        Some(n) => {
            let mut offset = 0;
            let mut found = None;
            for (idx, l) in text.split_inclusive('\n').enumerate() {
                if idx + 1 == n as usize {
                    found = Some((offset, l));
                    break;
                }
                offset += l.len();
            }
            found?
        }
        None => (0, text),
    };

    let mut from = 0;
    while let Some(pos) = haystack[from..].find(name) {
        let start = from + pos;
        let end = start + name.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !is_ident_continue(c));
        let after_ok = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !is_ident_continue(c));
        if before_ok && after_ok {
            let start = TextSize::try_from(base + start).ok()?;
            let end = TextSize::try_from(base + end).ok()?;
            return Some(TextRange::new(start, end));
        }
        from = end;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("Bar"));
        assert!(is_identifier("_bar1"));
        assert!(!is_identifier("1bar"));
        assert!(!is_identifier("Foo.Bar"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn find_name_skips_partial_words() {
        let text = "class Barn { Bar b; }";
        assert_eq!(find_name(text, "Bar", None), Some(range(13, 16)));
        assert_eq!(find_name(text, "Baz", None), None);
    }

    #[test]
    fn find_name_restricted_to_line() {
        let text = "Bar x;\nclass P { Bar y; }\n";
        assert_eq!(find_name(text, "Bar", Some(2)), Some(range(17, 20)));
        assert_eq!(find_name(text, "Bar", Some(1)), Some(range(0, 3)));
        assert_eq!(find_name(text, "Bar", Some(9)), None);
    }
}
