//! Edit engine for importfix.
//!
//! Responsibilities:
//! - Insert import directives in sorted position.
//! - Replace a name at a source range.
//! - Generate a unified diff preview between two solution snapshots.
//!
//! Every edit produces a new snapshot; input documents are never touched.

mod error;
mod imports;
mod patch;
mod rename;

pub use error::{EditError, EditResult};
pub use imports::{
    ImportEdit, ImportInserter, ImportSyntax, UsingDirectiveInserter, compare_namespaces,
};
pub use patch::render_patch;
pub use rename::{find_name, is_identifier, replace_name, text_at};
