//! Structural schema extraction over declared accessor contracts.
//!
//! Given a type registered in an [`mmtype::TypeUniverse`], this crate
//! derives a validated, classified property [`schema::Schema`] describing
//! the type's observable state surface: which logical properties its
//! accessor declarations define, whether each is writable, and whether its
//! storage is host-synthesized, caller-implemented or forwarded to a
//! delegate. Extraction is driven through a [`store::SchemaStore`], which
//! memoizes completed schemas per type identity and guarantees termination
//! on cyclic property graphs.

pub mod context;
pub mod error;
pub mod nature;
pub mod properties;
pub mod property;
pub mod schema;
pub mod store;
pub mod strategy;
#[cfg(any(test, feature = "test-utils"))]
pub mod tests_utils;
pub mod walker;

pub use context::ExtractionContext;
pub use error::{ExtractError, ExtractResult};
pub use nature::{NatureExtractionStrategy, NatureExtractor, PropertyNature};
pub use property::{Property, PropertyKind};
pub use schema::{Schema, SchemaKind};
pub use store::SchemaStore;
pub use strategy::{
    DelegateRelation, ExtractionStrategy, ManagedStrategy, StrategyChain, StructuralRules,
    UnmanagedInstanceStrategy, UnmanagedStrategy, ValueStrategy,
};
pub use walker::ExclusionRules;
