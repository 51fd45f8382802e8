//! Immutable solution snapshots.
//!
//! A [`Solution`] is a persistent value: every `with_*` method returns a new
//! solution and leaves the receiver untouched. Untouched projects and
//! documents are shared between snapshots through `Arc`; the modified path is
//! copied on write.
//!
//! [`ProjectSnapshot`] and [`DocumentSnapshot`] are views that pair a solution
//! with an id, so "the project of this document" always means the project as
//! it exists in the same snapshot.

mod error;
mod snapshot;

pub use error::SolutionError;
pub use snapshot::{DocumentSnapshot, ProjectSnapshot, Solution, SolutionBuilder};
