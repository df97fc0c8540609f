//! Value-type extraction: scalars and other simple immutable types the
//! generator stores inline. The applicable set is supplied by the adapter.
use std::collections::BTreeSet;
use std::sync::Arc;

use mmtype::{TypeId, TypeUniverse};

use crate::context::ExtractionContext;
use crate::error::ExtractResult;
use crate::schema::Schema;
use crate::strategy::{ExtractionStrategy, StrategyExtraction};

pub struct ValueStrategy {
    values: BTreeSet<TypeId>,
}

impl ValueStrategy {
    pub fn new(values: impl IntoIterator<Item = TypeId>) -> Self {
        ValueStrategy {
            values: values.into_iter().collect(),
        }
    }
}

impl ExtractionStrategy for ValueStrategy {
    fn is_applicable(&self, _universe: &TypeUniverse, ty: TypeId) -> bool {
        self.values.contains(&ty)
    }

    fn extract(
        &self,
        context: &Arc<ExtractionContext>,
        _universe: &TypeUniverse,
    ) -> ExtractResult<StrategyExtraction> {
        Ok(StrategyExtraction::terminal(Schema::value(context.ty())))
    }

    fn name(&self) -> &'static str {
        "value"
    }
}
