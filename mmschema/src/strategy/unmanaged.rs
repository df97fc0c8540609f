//! Unmanaged extraction.
//!
//! Two strategies for types the host does not synthesize. The
//! [`UnmanagedInstanceStrategy`] records a fixed property surface on a
//! concrete class; the [`UnmanagedStrategy`] is the tolerant fallback that
//! accepts any type and keeps whatever well-formed accessor pairs it finds.
use std::collections::BTreeSet;
use std::sync::Arc;

use mmtype::{OperationDescriptor, TypeId, TypeUniverse};

use crate::context::ExtractionContext;
use crate::error::{ExtractError, ExtractResult};
use crate::nature::NatureExtractor;
use crate::properties::{GrouperHooks, PropertiesExtractor};
use crate::property::PropertyKind;
use crate::schema::Schema;
use crate::strategy::{
    ExtractionStrategy, PropertyDependency, StrategyExtraction, property_description,
};
use crate::walker::{ExclusionRules, collect_operations};

/// Extracts a recorded set of properties from a concrete class assignable
/// to a fixed base type. Accessors outside the recorded set are tolerated
/// and ignored.
pub struct UnmanagedInstanceStrategy {
    base: TypeId,
    recorded: BTreeSet<String>,
    exclusions: ExclusionRules,
    natures: NatureExtractor,
}

impl UnmanagedInstanceStrategy {
    pub fn new(
        base: TypeId,
        recorded: impl IntoIterator<Item = String>,
        exclusions: ExclusionRules,
        natures: NatureExtractor,
    ) -> Self {
        UnmanagedInstanceStrategy {
            base,
            recorded: recorded.into_iter().collect(),
            exclusions,
            natures,
        }
    }
}

impl ExtractionStrategy for UnmanagedInstanceStrategy {
    fn is_applicable(&self, universe: &TypeUniverse, ty: TypeId) -> bool {
        universe.is_assignable(self.base, ty)
    }

    fn extract(
        &self,
        context: &Arc<ExtractionContext>,
        universe: &TypeUniverse,
    ) -> ExtractResult<StrategyExtraction> {
        let ty = context.ty();
        let path = context.path();
        let Some(data) = universe.get(ty) else {
            return Err(ExtractError::NoApplicableStrategy { path });
        };
        if data.form.is_abstract() {
            return Err(ExtractError::NotConcrete { path });
        }
        if data.type_parameters > 0 {
            return Err(ExtractError::Parameterized { path });
        }
        drop(data);

        let operations = collect_operations(universe, ty, &self.exclusions);
        let hooks = RecordedHooks {
            recorded: &self.recorded,
        };
        let extraction = PropertiesExtractor::new(&self.natures)
            .extract(context, universe, &operations, &hooks)?;

        let schema = Schema::unmanaged_instance(ty, extraction.properties);
        // Property types are still extracted recursively; they just carry
        // no kind-compatibility constraints here.
        let dependencies = schema
            .properties
            .iter()
            .map(|property| PropertyDependency {
                context: context.child(
                    property.ty,
                    property_description(universe, context, property),
                ),
                check: None,
            })
            .collect();

        Ok(StrategyExtraction {
            schema,
            dependencies,
        })
    }

    fn name(&self) -> &'static str {
        "unmanaged instance"
    }
}

struct RecordedHooks<'a> {
    recorded: &'a BTreeSet<String>,
}

impl GrouperHooks for RecordedHooks<'_> {
    fn classify(
        &self,
        _universe: &TypeUniverse,
        _getter: &OperationDescriptor,
        property_name: &str,
    ) -> Option<PropertyKind> {
        self.recorded
            .contains(property_name)
            .then_some(PropertyKind::Unmanaged)
    }

    fn filter_unhandled(
        &self,
        _universe: &TypeUniverse,
        _operations: Vec<OperationDescriptor>,
    ) -> Vec<OperationDescriptor> {
        Vec::new()
    }
}

/// The plain-contract fallback: applicable to anything, never recurses,
/// keeps every well-formed accessor pair and silently drops the rest.
pub struct UnmanagedStrategy {
    natures: NatureExtractor,
}

impl UnmanagedStrategy {
    pub fn new(natures: NatureExtractor) -> Self {
        UnmanagedStrategy { natures }
    }
}

impl ExtractionStrategy for UnmanagedStrategy {
    fn is_applicable(&self, universe: &TypeUniverse, ty: TypeId) -> bool {
        universe.get(ty).is_some()
    }

    fn extract(
        &self,
        context: &Arc<ExtractionContext>,
        universe: &TypeUniverse,
    ) -> ExtractResult<StrategyExtraction> {
        let ty = context.ty();
        let operations: Vec<OperationDescriptor> =
            collect_operations(universe, ty, &ExclusionRules::none())
                .into_iter()
                .filter(accessor_shaped)
                .collect();

        let extraction = PropertiesExtractor::new(&self.natures)
            .extract(context, universe, &operations, &TolerantHooks)?;
        // Leftovers (e.g. setters without getters) are deliberately ignored.

        Ok(StrategyExtraction::terminal(Schema::unmanaged(
            ty,
            extraction.properties,
        )))
    }

    fn name(&self) -> &'static str {
        "unmanaged fallback"
    }
}

/// Accessor pre-filter of the fallback strategy: only operations that look
/// like a getter or setter at all are considered.
fn accessor_shaped(operation: &OperationDescriptor) -> bool {
    let name = operation.name.as_str();
    if name.len() <= 3 {
        return false;
    }
    if name.starts_with("get") {
        return operation.parameter_types.is_empty() && operation.return_type.is_some();
    }
    if name.starts_with("set") {
        return operation.parameter_types.len() == 1 && operation.return_type.is_none();
    }
    false
}

struct TolerantHooks;

impl GrouperHooks for TolerantHooks {
    fn classify(
        &self,
        _universe: &TypeUniverse,
        _getter: &OperationDescriptor,
        _property_name: &str,
    ) -> Option<PropertyKind> {
        Some(PropertyKind::Unmanaged)
    }
}
