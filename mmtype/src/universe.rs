//! Type universe.
//!
//! The extractor never touches live reflection. Instead an adapter registers
//! every type it wants analyzed into a [`TypeUniverse`] up front, together
//! with the type's declared operations, constructors, fields and hierarchy
//! edges. The universe hands back stable [`TypeId`] identifiers (UUID-based)
//! and answers the two questions extraction needs: "what does this type
//! declare?" and "is this type assignable to that one?".
//!
//! Formatting helpers accept a reference to the universe so that descriptors
//! can resolve the names of the types they mention for human-friendly
//! diagnostics.
use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::{Timestamp, Uuid};

use crate::operation::{
    ConstructorDescriptor, FieldDescriptor, OperationDecl, OperationDescriptor, TypeTags,
};

/// A stable reference to a type registered in a [`TypeUniverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeId(Uuid);

/// Structural shape of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeForm {
    /// A pure contract: every operation is implicitly abstract.
    Interface,

    /// A class that cannot be instantiated directly.
    AbstractClass,

    /// A fully concrete class.
    ConcreteClass,
}

impl TypeForm {
    pub fn is_interface(self) -> bool {
        matches!(self, TypeForm::Interface)
    }

    pub fn is_abstract(self) -> bool {
        matches!(self, TypeForm::Interface | TypeForm::AbstractClass)
    }
}

/// A type as supplied by the adapter, before registration.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub form: TypeForm,
    pub superclass: Option<TypeId>,
    pub interfaces: SmallVec<[TypeId; 4]>,
    /// Number of declared type parameters. Managed extraction rejects any
    /// value other than zero.
    pub type_parameters: u32,
    pub tags: TypeTags,
    pub constructors: Vec<ConstructorDescriptor>,
    pub fields: Vec<FieldDescriptor>,
    pub operations: Vec<OperationDecl>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, form: TypeForm) -> Self {
        TypeDecl {
            name: name.into(),
            form,
            superclass: None,
            interfaces: SmallVec::new(),
            type_parameters: 0,
            tags: TypeTags::empty(),
            constructors: Vec::new(),
            fields: Vec::new(),
            operations: Vec::new(),
        }
    }

    pub fn extending(mut self, superclass: TypeId) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn implementing(mut self, interfaces: impl IntoIterator<Item = TypeId>) -> Self {
        self.interfaces.extend(interfaces);
        self
    }

    pub fn with_type_parameters(mut self, count: u32) -> Self {
        self.type_parameters = count;
        self
    }

    pub fn tagged(mut self, tags: TypeTags) -> Self {
        self.tags |= tags;
        self
    }

    pub fn with_constructor(mut self, constructor: ConstructorDescriptor) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_operation(mut self, operation: OperationDecl) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_operations(mut self, operations: impl IntoIterator<Item = OperationDecl>) -> Self {
        self.operations.extend(operations);
        self
    }
}

/// A registered type: the adapter's declaration with every operation stamped
/// with its declaring [`TypeId`]. Never mutated after registration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeData {
    pub id: TypeId,
    pub name: String,
    pub form: TypeForm,
    pub superclass: Option<TypeId>,
    pub interfaces: SmallVec<[TypeId; 4]>,
    pub type_parameters: u32,
    pub tags: TypeTags,
    pub constructors: Vec<ConstructorDescriptor>,
    pub fields: Vec<FieldDescriptor>,
    pub operations: Vec<OperationDescriptor>,
}

/// A registry of every type visible to extraction.
///
/// The registry allocates UUIDv6 identifiers (the `node_id` seeds the UUID
/// node field) and keeps all type data behind an interior read/write lock,
/// so registration and lookup are safe from concurrent threads. Extraction
/// itself only reads.
pub struct TypeUniverse {
    types: RwLock<BTreeMap<Uuid, TypeData>>,
    context: uuid::timestamp::context::Context,
    node_id: [u8; 6],
}

impl TypeUniverse {
    /// Create an empty universe. `node_id` is used when allocating UUIDs for
    /// newly registered types.
    pub fn new(node_id: [u8; 6]) -> Self {
        TypeUniverse {
            types: Default::default(),
            context: uuid::timestamp::context::Context::new(0),
            node_id,
        }
    }

    fn next_uuid(&self) -> Uuid {
        let ts = Timestamp::now(&self.context);
        Uuid::new_v6(ts, &self.node_id)
    }

    /// Allocate an identifier ahead of registration.
    ///
    /// Self-referential and mutually referential types need their identifiers
    /// before their member declarations can mention them; reserve first, then
    /// finish with [`register_reserved`](Self::register_reserved).
    pub fn reserve(&self) -> TypeId {
        TypeId(self.next_uuid())
    }

    /// Register a declared type and return its stable identifier.
    ///
    /// Each operation declaration is stamped with the new identifier as its
    /// declaring type.
    pub fn register(&self, decl: TypeDecl) -> TypeId {
        self.register_reserved(self.reserve(), decl)
    }

    /// Register a declared type under a previously [`reserve`](Self::reserve)d
    /// identifier. Replaces any earlier registration under the same
    /// identifier.
    pub fn register_reserved(&self, id: TypeId, decl: TypeDecl) -> TypeId {
        let operations = decl
            .operations
            .into_iter()
            .map(|op| OperationDescriptor::from_decl(op, id))
            .collect();
        let data = TypeData {
            id,
            name: decl.name,
            form: decl.form,
            superclass: decl.superclass,
            interfaces: decl.interfaces,
            type_parameters: decl.type_parameters,
            tags: decl.tags,
            constructors: decl.constructors,
            fields: decl.fields,
            operations,
        };
        debug!("Registered type `{}` as {}", data.name, id.0);
        self.types.write().insert(id.0, data);
        id
    }

    /// Borrow a registered type's data.
    ///
    /// The returned guard keeps a read lock held for its lifetime. The lock
    /// is recursive-read friendly, so looking up further types while holding
    /// a guard is fine; do not register new types while holding one.
    pub fn get(&self, id: TypeId) -> Option<MappedRwLockReadGuard<'_, TypeData>> {
        let guard = self.types.read_recursive();
        RwLockReadGuard::try_map(guard, |map| map.get(&id.0)).ok()
    }

    /// Whether a value of type `source` can stand wherever `target` is
    /// expected: reflexive, and transitive over superclass and interface
    /// edges.
    pub fn is_assignable(&self, target: TypeId, source: TypeId) -> bool {
        if target == source {
            return true;
        }
        let types = self.types.read_recursive();
        let mut visited = BTreeSet::new();
        let mut pending = vec![source];
        while let Some(current) = pending.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(data) = types.get(&current.0) {
                pending.extend(data.superclass);
                pending.extend(data.interfaces.iter().copied());
            }
        }
        false
    }

    /// Resolve a type's name, or a placeholder for unknown identifiers.
    pub fn name_of(&self, id: TypeId) -> String {
        match self.get(id) {
            Some(data) => data.name.clone(),
            None => format!("<unknown type {}>", id.0),
        }
    }

    /// Build a formatting helper that renders the given type's name.
    pub fn fmt(&self, id: TypeId) -> impl std::fmt::Display {
        struct Fmt<'a> {
            universe: &'a TypeUniverse,
            id: TypeId,
        }

        impl std::fmt::Display for Fmt<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self.universe.get(self.id) {
                    Some(data) => f.write_str(&data.name),
                    None => write!(f, "<unknown type {}>", self.id.0),
                }
            }
        }

        Fmt { universe: self, id }
    }

    /// Render an operation as `DeclaringType#name(Param, ...)` for
    /// diagnostics.
    pub fn describe_operation(&self, operation: &OperationDescriptor) -> String {
        let parameters = operation
            .parameter_types
            .iter()
            .map(|ty| self.name_of(*ty))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{}#{}({})",
            self.name_of(operation.declaring_type),
            operation.name,
            parameters
        )
    }

    /// Render a field as `Type#name` for diagnostics.
    pub fn describe_field(&self, declaring_type: TypeId, field: &FieldDescriptor) -> String {
        format!("{}#{}", self.name_of(declaring_type), field.name)
    }

    /// Render a constructor as `Type(Param, ...)` for diagnostics.
    pub fn describe_constructor(
        &self,
        declaring_type: TypeId,
        constructor: &ConstructorDescriptor,
    ) -> String {
        let parameters = constructor
            .parameter_types
            .iter()
            .map(|ty| self.name_of(*ty))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.name_of(declaring_type), parameters)
    }
}

impl std::fmt::Debug for TypeUniverse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let types = self.types.read_recursive();
        f.debug_struct("TypeUniverse")
            .field("types", &types.len())
            .finish()
    }
}

/// Guard type returned by [`TypeUniverse::get`], usable as a `&TypeData`.
pub type TypeDataRef<'a> = MappedRwLockReadGuard<'a, TypeData>;
