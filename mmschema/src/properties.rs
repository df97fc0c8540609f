//! Property grouping and accessor validation.
//!
//! The central algorithm: index candidate operations by name, reject
//! overloading, resolve getter/setter pairing under the accessor naming
//! convention, pick the representative among covariant getter overrides,
//! classify provenance through the strategy-supplied hooks and report every
//! operation that did not fold into a property.
use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use mmtype::signature;
use mmtype::{OperationDescriptor, OperationTags, TypeUniverse};

use crate::context::ExtractionContext;
use crate::error::{ExtractError, ExtractResult, GetterViolation, SetterViolation};
use crate::nature::NatureExtractor;
use crate::property::{Property, PropertyKind};

const GETTER_PREFIX: &str = "get";
const SETTER_PREFIX: &str = "set";

/// Strategy-specific behavior injected into the grouper.
///
/// The default implementations describe the plain managed rules: abstract
/// accessors become host-managed, concrete ones caller-implemented, and
/// every leftover operation stays visible to the caller.
pub trait GrouperHooks {
    /// Assign the property's provenance kind, or drop the property entirely
    /// by returning `None` (its getters then stay unhandled).
    fn classify(
        &self,
        universe: &TypeUniverse,
        getter: &OperationDescriptor,
        property_name: &str,
    ) -> Option<PropertyKind> {
        let _ = (universe, property_name);
        Some(if getter.is_abstract {
            PropertyKind::Managed
        } else {
            PropertyKind::Unmanaged
        })
    }

    /// Extra setter constraints beyond the common accessor rules.
    fn validate_setter(
        &self,
        path: &str,
        universe: &TypeUniverse,
        property_name: &str,
        getter: &OperationDescriptor,
        setter: &OperationDescriptor,
    ) -> ExtractResult<()> {
        let _ = (path, universe, property_name, getter, setter);
        Ok(())
    }

    /// Whether a concrete-bodied getter is resolved externally (e.g. by a
    /// delegate), which keeps the property from being forced unmanaged.
    fn resolves_concrete_getter(
        &self,
        universe: &TypeUniverse,
        getter: &OperationDescriptor,
    ) -> bool {
        let _ = (universe, getter);
        false
    }

    /// Filter the leftover set before it is reported to the caller.
    fn filter_unhandled(
        &self,
        universe: &TypeUniverse,
        operations: Vec<OperationDescriptor>,
    ) -> Vec<OperationDescriptor> {
        let _ = universe;
        operations
    }
}

/// The plain rules, used when a strategy has nothing to add.
pub struct DefaultHooks;

impl GrouperHooks for DefaultHooks {}

/// Outcome of grouping: the derived properties in first-seen accessor-name
/// order, plus every operation that did not pair up.
pub struct PropertiesExtraction {
    pub properties: Vec<Property>,
    pub not_handled: Vec<OperationDescriptor>,
}

impl PropertiesExtraction {
    /// Fail with the standard pairing error when any operation was left
    /// over. Offenders are listed sorted for determinism.
    pub fn ensure_all_handled(
        &self,
        context: &ExtractionContext,
        universe: &TypeUniverse,
    ) -> ExtractResult<()> {
        if self.not_handled.is_empty() {
            return Ok(());
        }
        Err(ExtractError::UnpairedOperations {
            path: context.path(),
            operations: sorted_descriptions(universe, self.not_handled.iter()),
        })
    }
}

/// Groups operations into properties. One instance per strategy; the nature
/// pipeline is shared across extractions.
pub struct PropertiesExtractor<'a> {
    natures: &'a NatureExtractor,
}

impl<'a> PropertiesExtractor<'a> {
    pub fn new(natures: &'a NatureExtractor) -> Self {
        PropertiesExtractor { natures }
    }

    pub fn extract(
        &self,
        context: &ExtractionContext,
        universe: &TypeUniverse,
        operations: &[OperationDescriptor],
        hooks: &dyn GrouperHooks,
    ) -> ExtractResult<PropertiesExtraction> {
        let path = context.path();

        // Index by name, preserving first-seen order for deterministic
        // grouping output.
        let mut name_order: Vec<&str> = Vec::new();
        let mut by_name: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (index, operation) in operations.iter().enumerate() {
            let slot = by_name.entry(operation.name.as_str()).or_default();
            if slot.is_empty() {
                name_order.push(operation.name.as_str());
            }
            slot.push(index);
        }

        self.ensure_no_overloads(&path, universe, operations, &name_order, &by_name)?;

        let mut properties = Vec::new();
        let mut handled = vec![false; operations.len()];

        for name in &name_order {
            let Some(suffix) = accessor_suffix(name, GETTER_PREFIX) else {
                continue;
            };
            let getter_indices = &by_name[name];
            let getters: Vec<OperationDescriptor> = getter_indices
                .iter()
                .map(|&index| operations[index].clone())
                .collect();

            // The overload check already guaranteed pairwise equivalence,
            // so the override with the most specialized return type stands
            // for the whole chain.
            let representative = signature::most_specialized(universe, &getters)
                .map_err(|source| ExtractError::IncomparableReturnTypes {
                    path: path.clone(),
                    source,
                })?
                .clone();

            self.validate_getter(&path, universe, &representative, suffix)?;
            // Checked by validate_getter just above.
            let Some(property_type) = representative.return_type else {
                continue;
            };

            let property_name = decapitalize(suffix);
            let setter_name = format!("{SETTER_PREFIX}{suffix}");
            let setter_indices = by_name.get(setter_name.as_str());

            let writable = setter_indices.is_some_and(|indices| !indices.is_empty());
            if let Some(setter_indices) = setter_indices {
                if let Some(&first) = setter_indices.first() {
                    let setter = &operations[first];
                    self.validate_setter(&path, universe, &representative, setter)?;
                    hooks.validate_setter(&path, universe, &property_name, &representative, setter)?;
                }
                for &index in setter_indices {
                    handled[index] = true;
                }
            }

            let Some(kind) = hooks.classify(universe, &representative, &property_name) else {
                debug!(
                    "Dropping property '{}' of {}: strategy declined to classify it",
                    property_name,
                    universe.fmt(context.ty())
                );
                continue;
            };

            let unmanaged = if representative.is_abstract {
                getters
                    .iter()
                    .any(|getter| getter.has_tag(OperationTags::UNMANAGED))
            } else {
                !hooks.resolves_concrete_getter(universe, &representative)
            };

            let declared_by: BTreeSet<_> =
                getters.iter().map(|getter| getter.declaring_type).collect();

            let natures = self.natures.extract(&getters);
            let property = Property::new(
                property_name.clone(),
                property_type,
                writable,
                declared_by,
                unmanaged,
                kind,
                natures,
            )
            .map_err(|nature| ExtractError::DuplicateNature {
                path: path.clone(),
                property: property_name,
                nature,
            })?;
            properties.push(property);

            for &index in getter_indices {
                handled[index] = true;
            }
        }

        let not_handled: Vec<OperationDescriptor> = operations
            .iter()
            .zip(&handled)
            .filter(|(_, handled)| !**handled)
            .map(|(operation, _)| operation.clone())
            .collect();
        let not_handled = hooks.filter_unhandled(universe, not_handled);

        Ok(PropertiesExtraction {
            properties,
            not_handled,
        })
    }

    fn ensure_no_overloads(
        &self,
        path: &str,
        universe: &TypeUniverse,
        operations: &[OperationDescriptor],
        name_order: &[&str],
        by_name: &BTreeMap<&str, Vec<usize>>,
    ) -> ExtractResult<()> {
        for name in name_order {
            let indices = &by_name[name];
            if indices.len() < 2 {
                continue;
            }
            let same_named: Vec<OperationDescriptor> = indices
                .iter()
                .map(|&index| operations[index].clone())
                .collect();
            let distinct = signature::dedup_equivalent(universe, &same_named);
            if distinct.len() > 1 {
                return Err(ExtractError::OverloadedOperations {
                    path: path.to_string(),
                    operations: sorted_descriptions(universe, distinct.into_iter()),
                });
            }
        }
        Ok(())
    }

    fn validate_getter(
        &self,
        path: &str,
        universe: &TypeUniverse,
        getter: &OperationDescriptor,
        suffix: &str,
    ) -> ExtractResult<()> {
        let violation = if !getter.parameter_types.is_empty() {
            Some(GetterViolation::TakesParameters)
        } else if !suffix.chars().next().is_some_and(char::is_uppercase) {
            Some(GetterViolation::LowercaseSuffix)
        } else if getter.return_type.is_none() {
            Some(GetterViolation::ReturnsNothing)
        } else {
            None
        };
        match violation {
            Some(reason) => Err(ExtractError::InvalidGetter {
                path: path.to_string(),
                operation: universe.describe_operation(getter),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn validate_setter(
        &self,
        path: &str,
        universe: &TypeUniverse,
        getter: &OperationDescriptor,
        setter: &OperationDescriptor,
    ) -> ExtractResult<()> {
        let invalid = |reason| ExtractError::InvalidSetter {
            path: path.to_string(),
            operation: universe.describe_operation(setter),
            reason,
        };
        if setter.return_type.is_some() {
            return Err(invalid(SetterViolation::ReturnsValue));
        }
        if setter.parameter_types.len() != 1 {
            return Err(invalid(SetterViolation::WrongArity));
        }
        // Setters admit no covariance: the parameter type must equal the
        // representative getter's return type exactly.
        if getter.return_type != setter.parameter_types.first().copied() {
            return Err(invalid(SetterViolation::ParameterTypeMismatch {
                expected: describe_optional(universe, getter.return_type),
                found: describe_optional(universe, setter.parameter_types.first().copied()),
            }));
        }
        Ok(())
    }
}

/// `getFoo` -> `Foo`; `None` for names that are not accessor-shaped
/// (the bare prefix included).
fn accessor_suffix<'n>(name: &'n str, prefix: &str) -> Option<&'n str> {
    name.strip_prefix(prefix).filter(|suffix| !suffix.is_empty())
}

fn decapitalize(suffix: &str) -> String {
    let mut chars = suffix.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn describe_optional(universe: &TypeUniverse, ty: Option<mmtype::TypeId>) -> String {
    match ty {
        Some(ty) => universe.name_of(ty),
        None => "void".to_string(),
    }
}

/// Sorted diagnostic descriptions for a batch of offending operations.
pub fn sorted_descriptions<'o>(
    universe: &TypeUniverse,
    operations: impl Iterator<Item = &'o OperationDescriptor>,
) -> Vec<String> {
    let descriptions: BTreeSet<String> = operations
        .map(|operation| universe.describe_operation(operation))
        .collect();
    descriptions.into_iter().collect()
}
