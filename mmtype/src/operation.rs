//! Declared-member descriptors.
//!
//! Everything the extractor knows about a type's members comes through the
//! plain data structures in this module. An adapter (reflection bridge,
//! compiler plugin, test fixture) declares members with [`OperationDecl`],
//! [`ConstructorDescriptor`] and [`FieldDescriptor`]; the
//! [`TypeUniverse`](crate::universe::TypeUniverse) stamps operation
//! declarations with their declaring [`TypeId`](crate::universe::TypeId) at
//! registration time, producing immutable [`OperationDescriptor`] values.
//!
//! Capability markers that the original host expressed through annotations
//! are carried as [`OperationTags`] bit sets, so downstream checks are plain
//! set-membership tests.
use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::universe::TypeId;

bitflags! {
    /// Capability markers attached to a single operation.
    ///
    /// Serialization comes from the `bitflags` serde integration when the
    /// `serde` feature is enabled.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct OperationTags: u8 {
        /// The operation must never participate in extraction.
        const IGNORE = 1 << 0;
        /// The accessor describes externally-owned state.
        const UNMANAGED = 1 << 1;
        /// The accessor identifies a variant axis of its declaring type.
        const VARIANT = 1 << 2;
    }
}

bitflags! {
    /// Capability markers attached to a whole type.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct TypeTags: u8 {
        /// The type opted into managed schema extraction.
        const MANAGED = 1 << 0;
    }
}

/// Declared visibility of an operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Visibility {
    /// Callable from anywhere. Only public operations are observable through
    /// the hierarchy walker, matching what a host introspection facility
    /// exposes on a type's public surface.
    #[default]
    Public,

    /// Visible to subtypes only.
    Protected,

    /// Visible to the declaring type only.
    Private,
}

impl Visibility {
    /// Whether the operation is part of the type's public surface.
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// An operation as supplied by the adapter, before the universe stamps it
/// with its declaring type.
///
/// `return_type` is `None` for operations that return no value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OperationDecl {
    pub name: String,
    pub parameter_types: SmallVec<[TypeId; 2]>,
    pub return_type: Option<TypeId>,
    pub is_abstract: bool,
    pub is_synthetic: bool,
    pub visibility: Visibility,
    pub tags: OperationTags,
}

impl OperationDecl {
    /// Declare an abstract, public, untagged operation.
    pub fn new(name: impl Into<String>, return_type: Option<TypeId>) -> Self {
        OperationDecl {
            name: name.into(),
            parameter_types: SmallVec::new(),
            return_type,
            is_abstract: true,
            is_synthetic: false,
            visibility: Visibility::Public,
            tags: OperationTags::empty(),
        }
    }

    /// Shorthand for a zero-parameter accessor named `get` + `suffix`.
    pub fn getter(suffix: &str, return_type: TypeId) -> Self {
        OperationDecl::new(format!("get{suffix}"), Some(return_type))
    }

    /// Shorthand for a single-parameter, void accessor named `set` + `suffix`.
    pub fn setter(suffix: &str, parameter_type: TypeId) -> Self {
        OperationDecl::new(format!("set{suffix}"), None).with_parameters([parameter_type])
    }

    pub fn with_parameters(mut self, parameters: impl IntoIterator<Item = TypeId>) -> Self {
        self.parameter_types = parameters.into_iter().collect();
        self
    }

    /// Mark the operation as carrying a concrete body.
    pub fn concrete(mut self) -> Self {
        self.is_abstract = false;
        self
    }

    /// Mark the operation as compiler-generated (e.g. a bridge method).
    pub fn synthetic(mut self) -> Self {
        self.is_synthetic = true;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn tagged(mut self, tags: OperationTags) -> Self {
        self.tags |= tags;
        self
    }
}

/// One declared operation, stamped with its declaring type.
///
/// Descriptors are value objects: they are created once during registration
/// and never mutate. Identity for signature-equivalence purposes ignores the
/// declaring type and the tags; see
/// [`signature`](crate::signature) for the exact rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OperationDescriptor {
    pub name: String,
    pub declaring_type: TypeId,
    pub parameter_types: SmallVec<[TypeId; 2]>,
    pub return_type: Option<TypeId>,
    pub is_abstract: bool,
    pub is_synthetic: bool,
    pub visibility: Visibility,
    pub tags: OperationTags,
}

impl OperationDescriptor {
    pub(crate) fn from_decl(decl: OperationDecl, declaring_type: TypeId) -> Self {
        OperationDescriptor {
            name: decl.name,
            declaring_type,
            parameter_types: decl.parameter_types,
            return_type: decl.return_type,
            is_abstract: decl.is_abstract,
            is_synthetic: decl.is_synthetic,
            visibility: decl.visibility,
            tags: decl.tags,
        }
    }

    /// Whether the operation carries the given tag on its descriptor.
    pub fn has_tag(&self, tag: OperationTags) -> bool {
        self.tags.contains(tag)
    }
}

/// A declared constructor. Only the parameter list matters to structural
/// validation: a managed type must not expose any argument-taking
/// constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConstructorDescriptor {
    pub parameter_types: SmallVec<[TypeId; 2]>,
}

impl ConstructorDescriptor {
    pub fn new(parameters: impl IntoIterator<Item = TypeId>) -> Self {
        ConstructorDescriptor {
            parameter_types: parameters.into_iter().collect(),
        }
    }

    pub fn takes_arguments(&self) -> bool {
        !self.parameter_types.is_empty()
    }
}

/// A declared field. Static fields never obstruct managed extraction;
/// instance-scoped fields do, except for one host-reserved name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldDescriptor {
    pub name: String,
    pub is_static: bool,
}

impl FieldDescriptor {
    pub fn instance(name: impl Into<String>) -> Self {
        FieldDescriptor {
            name: name.into(),
            is_static: false,
        }
    }

    pub fn of_static(name: impl Into<String>) -> Self {
        FieldDescriptor {
            name: name.into(),
            is_static: true,
        }
    }
}
