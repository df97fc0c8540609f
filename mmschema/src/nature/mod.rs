//! Property natures.
//!
//! A nature is an auxiliary capability facet attached to a property,
//! independent of its provenance kind. Natures are produced by an ordered
//! pipeline of pluggable strategies that inspect a property's getter
//! overrides; external collaborators extend the pipeline without touching
//! the property grouper.
use std::sync::Arc;

use downcast_rs::{Downcast, impl_downcast};
use mmtype::OperationDescriptor;

pub mod variant;

pub use variant::{VariantNature, VariantNatureStrategy};

/// One capability facet. Implementations are plain value objects; a property
/// carries at most one nature of each concrete type.
pub trait PropertyNature: Downcast + std::fmt::Debug + Send + Sync {
    /// Stable kind name, used for diagnostics and uniqueness reporting.
    fn kind(&self) -> &'static str;
}
impl_downcast!(PropertyNature);

/// A single extraction rule: inspect the getter overrides of one property
/// and either claim a set of natures or pass.
pub trait NatureExtractionStrategy: Send + Sync {
    fn try_extract(
        &self,
        getters: &[OperationDescriptor],
    ) -> Option<Vec<Arc<dyn PropertyNature>>>;
}

/// Ordered pipeline over all registered strategies. Every non-empty result
/// contributes; a property may carry natures from several strategies.
pub struct NatureExtractor {
    strategies: Vec<Box<dyn NatureExtractionStrategy>>,
}

impl NatureExtractor {
    pub fn new(strategies: Vec<Box<dyn NatureExtractionStrategy>>) -> Self {
        NatureExtractor { strategies }
    }

    /// The pipeline shipped by default: variant detection only.
    pub fn with_default_strategies() -> Self {
        NatureExtractor::new(vec![Box::new(VariantNatureStrategy)])
    }

    /// An empty pipeline; no property receives any nature.
    pub fn empty() -> Self {
        NatureExtractor::new(Vec::new())
    }

    pub fn extract(&self, getters: &[OperationDescriptor]) -> Vec<Arc<dyn PropertyNature>> {
        self.strategies
            .iter()
            .filter_map(|strategy| strategy.try_extract(getters))
            .flatten()
            .collect()
    }
}

impl Default for NatureExtractor {
    fn default() -> Self {
        NatureExtractor::with_default_strategies()
    }
}
