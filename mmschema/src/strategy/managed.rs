//! Managed-type extraction.
//!
//! The managed strategy accepts types that opted into host-synthesized
//! storage. It enforces the structural eligibility rules, derives the
//! property set through the grouper, classifies provenance (optionally
//! against a delegate type) and defers per-property kind-compatibility
//! checks until the driver has resolved each property type's own schema.
use std::collections::BTreeSet;
use std::sync::Arc;

use mmtype::signature;
use mmtype::{OperationDescriptor, TypeId, TypeTags, TypeUniverse};

use crate::context::ExtractionContext;
use crate::error::{ExtractError, ExtractResult, SetterViolation};
use crate::nature::NatureExtractor;
use crate::properties::{GrouperHooks, PropertiesExtractor, sorted_descriptions};
use crate::property::{Property, PropertyKind};
use crate::schema::Schema;
use crate::strategy::{
    ExtractionStrategy, PropertyDependency, Resolution, StrategyExtraction, property_description,
};
use crate::walker::{ExclusionRules, collect_operations};

/// Type-level rules the managed strategy enforces beyond the accessor
/// contract.
#[derive(Default)]
pub struct StructuralRules {
    /// One instance field name the host reserves for its dynamic-dispatch
    /// mechanism; it is exempt from the no-instance-fields rule.
    pub reserved_field: Option<String>,
    /// A well-known naming contract: types assignable to it receive their
    /// `name` property from the host and must not declare a setter for it.
    pub named_contract: Option<TypeId>,
}

/// A fixed delegate type whose operations a managed type may transparently
/// forward to. The delegate's operation set is computed once at
/// construction.
pub struct DelegateRelation {
    delegate: TypeId,
    operations: Vec<OperationDescriptor>,
    ignored_when_delegated: BTreeSet<String>,
}

impl DelegateRelation {
    pub fn new(
        universe: &TypeUniverse,
        delegate: TypeId,
        ignored_when_delegated: impl IntoIterator<Item = String>,
    ) -> Self {
        DelegateRelation {
            delegate,
            operations: collect_operations(universe, delegate, &ExclusionRules::none()),
            ignored_when_delegated: ignored_when_delegated.into_iter().collect(),
        }
    }

    pub fn delegate(&self) -> TypeId {
        self.delegate
    }

    /// Whether the delegate declares an operation equivalent to `operation`.
    pub fn backs(&self, universe: &TypeUniverse, operation: &OperationDescriptor) -> bool {
        self.operations
            .iter()
            .any(|declared| signature::equivalent(universe, declared, operation))
    }

    fn ignores(&self, property_name: &str) -> bool {
        self.ignored_when_delegated.contains(property_name)
    }
}

pub struct ManagedStrategy {
    exclusions: ExclusionRules,
    rules: StructuralRules,
    natures: NatureExtractor,
    delegate: Option<DelegateRelation>,
}

impl ManagedStrategy {
    pub fn new(exclusions: ExclusionRules, rules: StructuralRules, natures: NatureExtractor) -> Self {
        ManagedStrategy {
            exclusions,
            rules,
            natures,
            delegate: None,
        }
    }

    /// The variant that classifies delegate-backed accessors as
    /// [`PropertyKind::Delegated`].
    pub fn delegating(
        exclusions: ExclusionRules,
        rules: StructuralRules,
        natures: NatureExtractor,
        delegate: DelegateRelation,
    ) -> Self {
        ManagedStrategy {
            exclusions,
            rules,
            natures,
            delegate: Some(delegate),
        }
    }

    /// The superclass chain from the deepest ancestor (just below any
    /// ignore root) down to `ty` itself.
    fn class_chain(&self, universe: &TypeUniverse, ty: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::new();
        let mut current = Some(ty);
        while let Some(level) = current {
            if self.exclusions.is_ignore_root(level) || !seen.insert(level) {
                break;
            }
            chain.push(level);
            current = universe.get(level).and_then(|data| data.superclass);
        }
        chain.reverse();
        chain
    }

    fn validate_type(
        &self,
        context: &ExtractionContext,
        universe: &TypeUniverse,
        ty: TypeId,
    ) -> ExtractResult<()> {
        let path = context.path();
        let Some(data) = universe.get(ty) else {
            return Err(ExtractError::NoApplicableStrategy { path });
        };
        if !data.form.is_abstract() {
            return Err(ExtractError::NotAbstract { path });
        }
        if data.type_parameters > 0 {
            return Err(ExtractError::Parameterized { path });
        }
        drop(data);

        for level in self.class_chain(universe, ty) {
            let Some(data) = universe.get(level) else {
                continue;
            };

            if let Some(constructor) = data
                .constructors
                .iter()
                .find(|constructor| constructor.takes_arguments())
            {
                return Err(ExtractError::CustomConstructor {
                    path,
                    constructor: universe.describe_constructor(level, constructor),
                });
            }

            let fields: BTreeSet<String> = data
                .fields
                .iter()
                .filter(|field| !field.is_static)
                .filter(|field| self.rules.reserved_field.as_deref() != Some(field.name.as_str()))
                .map(|field| universe.describe_field(level, field))
                .collect();
            if !fields.is_empty() {
                return Err(ExtractError::InstanceFields {
                    path,
                    fields: fields.into_iter().collect(),
                });
            }

            let non_public: Vec<&OperationDescriptor> = data
                .operations
                .iter()
                .filter(|operation| !operation.is_synthetic)
                .filter(|operation| !operation.visibility.is_public())
                .collect();
            if !non_public.is_empty() {
                return Err(ExtractError::NonPublicOperations {
                    path,
                    operations: sorted_descriptions(universe, non_public.into_iter()),
                });
            }
        }
        Ok(())
    }
}

impl ExtractionStrategy for ManagedStrategy {
    fn is_applicable(&self, universe: &TypeUniverse, ty: TypeId) -> bool {
        universe
            .get(ty)
            .is_some_and(|data| data.tags.contains(TypeTags::MANAGED))
    }

    fn extract(
        &self,
        context: &Arc<ExtractionContext>,
        universe: &TypeUniverse,
    ) -> ExtractResult<StrategyExtraction> {
        let ty = context.ty();
        self.validate_type(context, universe, ty)?;

        let operations = collect_operations(universe, ty, &self.exclusions);
        let hooks = ManagedHooks { strategy: self };
        let extraction = PropertiesExtractor::new(&self.natures)
            .extract(context, universe, &operations, &hooks)?;
        extraction.ensure_all_handled(context, universe)?;

        let schema = Schema::managed(ty, extraction.properties);
        let dependencies = schema
            .properties
            .iter()
            .map(|property| PropertyDependency {
                context: context.child(
                    property.ty,
                    property_description(universe, context, property),
                ),
                check: Some(ManagedPropertyCheck {
                    parent: ty,
                    parent_path: context.path(),
                    property: property.clone(),
                    named_contract: self.rules.named_contract,
                }),
            })
            .collect();

        Ok(StrategyExtraction {
            schema,
            dependencies,
        })
    }

    fn name(&self) -> &'static str {
        if self.delegate.is_some() {
            "delegating managed"
        } else {
            "managed"
        }
    }
}

struct ManagedHooks<'a> {
    strategy: &'a ManagedStrategy,
}

impl GrouperHooks for ManagedHooks<'_> {
    fn classify(
        &self,
        universe: &TypeUniverse,
        getter: &OperationDescriptor,
        property_name: &str,
    ) -> Option<PropertyKind> {
        if let Some(delegate) = &self.strategy.delegate {
            let delegated = delegate.backs(universe, getter);
            if delegated && delegate.ignores(property_name) {
                return None;
            }
            return Some(match (getter.is_abstract, delegated) {
                (true, true) => PropertyKind::Delegated,
                (true, false) => PropertyKind::Managed,
                (false, _) => PropertyKind::Unmanaged,
            });
        }
        Some(if getter.is_abstract {
            PropertyKind::Managed
        } else {
            PropertyKind::Unmanaged
        })
    }

    fn validate_setter(
        &self,
        path: &str,
        universe: &TypeUniverse,
        property_name: &str,
        getter: &OperationDescriptor,
        setter: &OperationDescriptor,
    ) -> ExtractResult<()> {
        let Some(delegate) = &self.strategy.delegate else {
            return Ok(());
        };
        if !setter.is_abstract {
            return Err(ExtractError::InvalidSetter {
                path: path.to_string(),
                operation: universe.describe_operation(setter),
                reason: SetterViolation::NotAbstract,
            });
        }
        // A delegate-backed accessor pair must be forwarded as a whole.
        if delegate.backs(universe, getter) != delegate.backs(universe, setter) {
            return Err(ExtractError::DelegateMismatch {
                path: path.to_string(),
                property: property_name.to_string(),
                operations: sorted_descriptions(universe, [getter, setter].into_iter()),
            });
        }
        Ok(())
    }

    fn resolves_concrete_getter(
        &self,
        universe: &TypeUniverse,
        getter: &OperationDescriptor,
    ) -> bool {
        self.strategy
            .delegate
            .as_ref()
            .is_some_and(|delegate| delegate.backs(universe, getter))
    }

    fn filter_unhandled(
        &self,
        universe: &TypeUniverse,
        operations: Vec<OperationDescriptor>,
    ) -> Vec<OperationDescriptor> {
        let Some(delegate) = &self.strategy.delegate else {
            return operations;
        };
        // Delegate-backed leftovers are implemented by forwarding; they are
        // not defects of the managed type.
        operations
            .into_iter()
            .filter(|operation| !delegate.backs(universe, operation))
            .collect()
    }
}

/// Deferred kind-compatibility check for one managed property; runs once
/// the property type's own schema has been resolved.
pub struct ManagedPropertyCheck {
    parent: TypeId,
    parent_path: String,
    property: Property,
    named_contract: Option<TypeId>,
}

impl ManagedPropertyCheck {
    pub fn run(&self, universe: &TypeUniverse, resolution: &Resolution) -> ExtractResult<()> {
        let property = &self.property;

        if property.name == "name"
            && self
                .named_contract
                .is_some_and(|contract| universe.is_assignable(contract, self.parent))
        {
            if property.writable {
                return Err(ExtractError::NameSetterForbidden {
                    path: self.parent_path.clone(),
                });
            }
            // The host provides the name; no further rules apply.
            return Ok(());
        }

        // A type that is still in flight already passed the managed
        // structural gate, so it will resolve to a managed, manageable,
        // non-collection schema.
        let (manageable, host_materialized, collection) = match resolution {
            Resolution::Ready(schema) => (
                schema.kind.is_manageable(),
                schema.kind.is_host_materialized(),
                schema.kind.is_collection(),
            ),
            Resolution::InFlight => (true, true, false),
        };

        if manageable && property.unmanaged {
            return Err(ExtractError::UnmanagedOnManageableType {
                path: self.parent_path.clone(),
                property: property.name.clone(),
                property_type: universe.name_of(property.ty),
            });
        }
        if !manageable && !property.unmanaged {
            return Err(ExtractError::NonManageablePropertyType {
                path: self.parent_path.clone(),
                property: property.name.clone(),
                property_type: universe.name_of(property.ty),
            });
        }

        if !property.writable {
            if property.unmanaged {
                return Err(ExtractError::ReadOnlyUnmanaged {
                    path: self.parent_path.clone(),
                    property: property.name.clone(),
                });
            }
            if !host_materialized {
                return Err(ExtractError::ReadOnlyNonManaged {
                    path: self.parent_path.clone(),
                    property: property.name.clone(),
                    property_type: universe.name_of(property.ty),
                });
            }
        }

        if collection && property.writable {
            return Err(ExtractError::WritableCollection {
                path: self.parent_path.clone(),
                property: property.name.clone(),
                property_type: universe.name_of(property.ty),
            });
        }

        Ok(())
    }
}
