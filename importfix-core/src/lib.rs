//! Embeddable core library for importfix.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking
//! into an editor host or batch tool.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`SolutionSource`](ports::SolutionSource): load the solution snapshot
//! - [`WritePort`](ports::WritePort): write files
//!
//! The [`adapters`] module provides default filesystem-backed implementations
//! and in-memory ones for tests. The [`index`] module reads the JSON symbol
//! index.
//!
//! # Entry points
//!
//! - [`run_offer`](pipeline::run_offer): list fixes for an unbound name
//! - [`run_apply`](pipeline::run_apply): check, execute and write one fix

pub mod adapters;
pub mod index;
pub mod manifest;
pub mod pipeline;
pub mod ports;
pub mod settings;

// Re-export the domain types callers hold on to between offer and apply.
pub use importfix_domain::{DeferredFix, FixError, FixServices, SymbolSearch};
