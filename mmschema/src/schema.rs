//! Extraction results.
use strum::{Display, EnumIs};

use mmtype::TypeId;

use crate::property::Property;

/// Classification of a whole schema, interpreted by the external generator.
///
/// `is_manageable` answers whether values of this kind may appear as the
/// value type of a managed property; `is_managed` whether the host itself
/// materializes values of this kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SchemaKind {
    /// A simple immutable value type (scalars, strings).
    Value,
    /// A type whose instances the host synthesizes from the schema.
    Managed,
    /// An arbitrary type the host knows nothing about.
    Unmanaged,
    /// A concrete instance type with a recorded property surface.
    UnmanagedInstance,
    /// A host-materialized, read-only collection type.
    Collection,
}

impl SchemaKind {
    pub fn is_manageable(self) -> bool {
        matches!(
            self,
            SchemaKind::Value | SchemaKind::Managed | SchemaKind::Collection
        )
    }

    pub fn is_host_materialized(self) -> bool {
        matches!(self, SchemaKind::Managed | SchemaKind::Collection)
    }
}

/// The extraction result for one type. Created once per type, logically
/// immutable afterwards and owned by the schema store.
///
/// Property order is grouping order (first-seen accessor name), never
/// alphabetical, so diagnostics stay deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub ty: TypeId,
    pub kind: SchemaKind,
    pub properties: Vec<Property>,
}

impl Schema {
    pub fn value(ty: TypeId) -> Self {
        Schema {
            ty,
            kind: SchemaKind::Value,
            properties: Vec::new(),
        }
    }

    pub fn managed(ty: TypeId, properties: Vec<Property>) -> Self {
        Schema {
            ty,
            kind: SchemaKind::Managed,
            properties,
        }
    }

    pub fn unmanaged(ty: TypeId, properties: Vec<Property>) -> Self {
        Schema {
            ty,
            kind: SchemaKind::Unmanaged,
            properties,
        }
    }

    pub fn unmanaged_instance(ty: TypeId, properties: Vec<Property>) -> Self {
        Schema {
            ty,
            kind: SchemaKind::UnmanagedInstance,
            properties,
        }
    }

    pub fn collection(ty: TypeId) -> Self {
        Schema {
            ty,
            kind: SchemaKind::Collection,
            properties: Vec::new(),
        }
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }
}
