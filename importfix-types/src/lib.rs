//! Shared DTOs (schemas-as-code) for the importfix workspace.
//!
//! # Design constraints
//! - Candidate types are immutable values once discovery produces them.
//! - Report types are intended to be serialized to disk or stdout.
//! - Prefer adding optional fields over changing semantics.

pub mod apply;
pub mod ids;
pub mod offer;
pub mod ops;
pub mod reference;
pub mod symbol;

pub use text_size::{TextRange, TextSize};

/// Schema identifiers.
pub mod schema {
    pub const IMPORTFIX_OFFER_V1: &str = "importfix.offer.v1";
    pub const IMPORTFIX_APPLY_V1: &str = "importfix.apply.v1";
}
