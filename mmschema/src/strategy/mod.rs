//! Extraction strategies.
//!
//! A strategy owns the type-level rules for one family of schemas. The
//! [`StrategyChain`] tries its strategies in a fixed priority order and the
//! first applicable one extracts; a strategy failure is final, later
//! strategies are never consulted as fallbacks for it.
use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;
use mmtype::{TypeId, TypeUniverse};

use crate::context::ExtractionContext;
use crate::error::ExtractResult;
use crate::property::Property;
use crate::schema::Schema;

pub mod managed;
pub mod unmanaged;
pub mod value;

pub use managed::{DelegateRelation, ManagedPropertyCheck, ManagedStrategy, StructuralRules};
pub use unmanaged::{UnmanagedInstanceStrategy, UnmanagedStrategy};
pub use value::ValueStrategy;

/// How a dependency's schema was obtained by the driver.
pub enum Resolution {
    /// The schema is complete.
    Ready(Arc<Schema>),
    /// The dependency's type is being extracted higher up the same call
    /// tree (cyclic property graph). It already passed its strategy's
    /// structural gate, so deferred checks treat it as satisfied.
    InFlight,
}

/// A nested extraction requested by a strategy: the child context names the
/// property's value type; `check` runs against the resolved child schema.
pub struct PropertyDependency {
    pub context: Arc<ExtractionContext>,
    pub check: Option<ManagedPropertyCheck>,
}

/// What a strategy hands back to the driver.
pub struct StrategyExtraction {
    pub schema: Schema,
    pub dependencies: Vec<PropertyDependency>,
}

impl StrategyExtraction {
    pub fn terminal(schema: Schema) -> Self {
        StrategyExtraction {
            schema,
            dependencies: Vec::new(),
        }
    }
}

pub trait ExtractionStrategy: Send + Sync {
    /// Fast applicability predicate; `extract` is only called when this
    /// returns true.
    fn is_applicable(&self, universe: &TypeUniverse, ty: TypeId) -> bool;

    fn extract(
        &self,
        context: &Arc<ExtractionContext>,
        universe: &TypeUniverse,
    ) -> ExtractResult<StrategyExtraction>;

    /// Name used in trace output.
    fn name(&self) -> &'static str;
}

/// Ordered strategy list; first applicable wins.
#[derive(Default)]
pub struct StrategyChain {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl StrategyChain {
    pub fn new() -> Self {
        StrategyChain::default()
    }

    /// Append a strategy with lower priority than everything already
    /// registered.
    pub fn push(mut self, strategy: Box<dyn ExtractionStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn extract(
        &self,
        context: &Arc<ExtractionContext>,
        universe: &TypeUniverse,
    ) -> ExtractResult<Option<StrategyExtraction>> {
        let ty = context.ty();
        for strategy in &self.strategies {
            if strategy.is_applicable(universe, ty) {
                debug!(
                    "Extracting {} with the {} strategy",
                    universe.fmt(ty),
                    strategy.name()
                );
                return strategy.extract(context, universe).map(Some);
            }
        }
        Ok(None)
    }
}

/// Description of a property dependency for the child extraction context:
/// `property 'x'` when the parent itself declares the accessor, otherwise
/// `property 'x' declared by A, B` with declarers sorted.
pub(crate) fn property_description(
    universe: &TypeUniverse,
    parent: &ExtractionContext,
    property: &Property,
) -> String {
    if property.declared_by.len() == 1 && property.declared_by.contains(&parent.ty()) {
        format!("property '{}'", property.name)
    } else {
        let declared_by: BTreeSet<String> = property
            .declared_by
            .iter()
            .map(|ty| universe.name_of(*ty))
            .collect();
        format!(
            "property '{}' declared by {}",
            property.name,
            declared_by.into_iter().collect::<Vec<_>>().join(", ")
        )
    }
}
