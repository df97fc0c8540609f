//! Abstract type and operation model consumed by the schema extractor.
//!
//! This crate carries no extraction logic. It defines the
//! [`universe::TypeUniverse`] registry that an adapter populates with
//! declared types, the immutable member descriptors under [`operation`],
//! and the covariant-aware [`signature`] equivalence those descriptors are
//! compared with.

pub mod operation;
pub mod signature;
pub mod universe;

pub use operation::{
    ConstructorDescriptor, FieldDescriptor, OperationDecl, OperationDescriptor, OperationTags,
    TypeTags, Visibility,
};
pub use universe::{TypeDecl, TypeForm, TypeId, TypeUniverse};
