//! Extraction call-tree contexts.
//!
//! A context is one node in the extraction call tree: the type being
//! extracted plus a human-readable description of how extraction reached it
//! from the root type. Contexts are transient; they are created per type and
//! per property and discarded with the call graph that produced them.
use std::sync::Arc;

use mmtype::{TypeId, TypeUniverse};

#[derive(Debug)]
pub struct ExtractionContext {
    ty: TypeId,
    description: String,
    parent: Option<Arc<ExtractionContext>>,
}

impl ExtractionContext {
    /// Start a call tree at `ty`.
    pub fn root(universe: &TypeUniverse, ty: TypeId) -> Arc<Self> {
        Arc::new(ExtractionContext {
            ty,
            description: format!("type {}", universe.name_of(ty)),
            parent: None,
        })
    }

    /// Derive the context for a nested extraction, e.g. a property's value
    /// type. `description` should read like `property 'x' (TypeName)`.
    pub fn child(self: &Arc<Self>, ty: TypeId, description: String) -> Arc<Self> {
        Arc::new(ExtractionContext {
            ty,
            description,
            parent: Some(Arc::clone(self)),
        })
    }

    pub fn ty(&self) -> TypeId {
        self.ty
    }

    /// Whether `ty` is currently being extracted somewhere above this node.
    /// Used to detect re-entrant requests on cyclic property graphs.
    pub fn ancestry_contains(&self, ty: TypeId) -> bool {
        let mut current = self.parent.as_deref();
        while let Some(context) = current {
            if context.ty == ty {
                return true;
            }
            current = context.parent.as_deref();
        }
        false
    }

    /// Render the path from the root down to this node, root first.
    pub fn path(&self) -> String {
        let mut segments = Vec::new();
        let mut current = Some(self);
        while let Some(context) = current {
            segments.push(context.description.as_str());
            current = context.parent.as_deref();
        }
        segments.reverse();
        segments.join(" -> ")
    }
}

impl std::fmt::Display for ExtractionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}
