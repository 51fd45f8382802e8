//! Domain logic: turn search hits for an unbound name into deferred,
//! cancellable add-import fixes.
//!
//! This crate owns *what* a fix does and when it resolves. Text edits live in
//! `importfix-edit`; snapshots live in `importfix-solution`.

mod error;
mod fixes;
mod ports;
mod provider;
mod resolution;

pub use error::FixError;
pub use fixes::{
    ApplyChangesOperation, AssemblyFix, CodeActionOperation, DeferredFix, FixDescription, FixKind,
    FixReference, FixTarget, PackageFix, ProjectFix,
};
pub use ports::{
    BindingResolver, FixServices, HitOrigin, MetadataService, SearchHit, SearchQuery, SymbolSearch,
};
pub use provider::{AddImportProvider, FixContext, Offer, OfferStats, ProviderConfig};
pub use resolution::{Cancelled, Resolution, ResolutionCell};
