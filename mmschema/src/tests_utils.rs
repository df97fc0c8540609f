//! Shared fixtures for extraction tests.
use mmtype::{TypeDecl, TypeForm, TypeId, TypeUniverse};

use crate::nature::NatureExtractor;
use crate::store::SchemaStore;
use crate::strategy::{ManagedStrategy, StrategyChain, StructuralRules, UnmanagedStrategy, ValueStrategy};
use crate::walker::ExclusionRules;

/// A universe preloaded with the two scalar value types most scenarios
/// need.
pub struct Fixture {
    pub universe: TypeUniverse,
    pub int: TypeId,
    pub string: TypeId,
}

impl Fixture {
    pub fn new() -> Self {
        let universe = TypeUniverse::new([0; 6]);
        let int = universe.register(TypeDecl::new("Int", TypeForm::ConcreteClass));
        let string = universe.register(TypeDecl::new("String", TypeForm::ConcreteClass));
        Fixture {
            universe,
            int,
            string,
        }
    }

    /// Value strategy over the fixture scalars, plain managed strategy, and
    /// the tolerant fallback, in that priority order.
    pub fn default_chain(&self) -> StrategyChain {
        StrategyChain::new()
            .push(Box::new(ValueStrategy::new([self.int, self.string])))
            .push(Box::new(ManagedStrategy::new(
                ExclusionRules::none(),
                StructuralRules::default(),
                NatureExtractor::with_default_strategies(),
            )))
            .push(Box::new(UnmanagedStrategy::new(
                NatureExtractor::with_default_strategies(),
            )))
    }

    pub fn store(&self) -> SchemaStore {
        SchemaStore::new(self.default_chain())
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Fixture::new()
    }
}
