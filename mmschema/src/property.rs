//! Logical properties.
//!
//! A property is one named, typed, optionally-writable attribute derived
//! from one or more accessor overrides. Properties are value objects: built
//! once by the grouper and never mutated.
use std::any::TypeId as RustTypeId;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::EnumIs;

use mmtype::TypeId;

use crate::nature::PropertyNature;

/// Provenance classification of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PropertyKind {
    /// Storage is synthesized by the host.
    Managed,
    /// Implemented by the caller.
    Unmanaged,
    /// Forwarded to a fixed delegate instance.
    Delegated,
}

/// One logical accessor pair.
///
/// Equality and hashing cover `name`, `ty` and `writable` only: two
/// properties extracted from different declaring contexts compare equal.
/// `declared_by` exists for diagnostics and is never empty.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub ty: TypeId,
    pub writable: bool,
    pub declared_by: BTreeSet<TypeId>,
    pub unmanaged: bool,
    pub kind: PropertyKind,
    natures: Vec<Arc<dyn PropertyNature>>,
}

impl Property {
    /// Assemble a property. Fails if two natures of the same concrete type
    /// were supplied; the nature index is unique by kind.
    pub(crate) fn new(
        name: String,
        ty: TypeId,
        writable: bool,
        declared_by: BTreeSet<TypeId>,
        unmanaged: bool,
        kind: PropertyKind,
        natures: Vec<Arc<dyn PropertyNature>>,
    ) -> Result<Self, &'static str> {
        debug_assert!(!declared_by.is_empty());
        let mut seen: Vec<RustTypeId> = Vec::with_capacity(natures.len());
        for nature in &natures {
            let id = nature.as_any().type_id();
            if seen.contains(&id) {
                return Err(nature.kind());
            }
            seen.push(id);
        }
        Ok(Property {
            name,
            ty,
            writable,
            declared_by,
            unmanaged,
            kind,
            natures,
        })
    }

    /// Whether the property carries a nature of concrete type `N`.
    pub fn has_nature<N: PropertyNature>(&self) -> bool {
        self.nature::<N>().is_some()
    }

    /// The property's nature of concrete type `N`, if any.
    pub fn nature<N: PropertyNature>(&self) -> Option<&N> {
        self.natures
            .iter()
            .find_map(|nature| nature.as_ref().downcast_ref::<N>())
    }

    /// All attached natures, in pipeline order.
    pub fn natures(&self) -> &[Arc<dyn PropertyNature>] {
        &self.natures
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty && self.writable == other.writable
    }
}

impl Eq for Property {}

impl Hash for Property {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.ty.hash(state);
        self.writable.hash(state);
    }
}
