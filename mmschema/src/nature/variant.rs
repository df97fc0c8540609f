//! Variant nature: a property that identifies a variant axis of its
//! declaring type, marked by the `VARIANT` capability tag on any of its
//! getter overrides.
use std::sync::Arc;

use mmtype::{OperationDescriptor, OperationTags};

use super::{NatureExtractionStrategy, PropertyNature};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantNature;

impl PropertyNature for VariantNature {
    fn kind(&self) -> &'static str {
        "variant"
    }
}

pub struct VariantNatureStrategy;

impl NatureExtractionStrategy for VariantNatureStrategy {
    fn try_extract(
        &self,
        getters: &[OperationDescriptor],
    ) -> Option<Vec<Arc<dyn PropertyNature>>> {
        getters
            .iter()
            .any(|getter| getter.has_tag(OperationTags::VARIANT))
            .then(|| vec![Arc::new(VariantNature) as Arc<dyn PropertyNature>])
    }
}
