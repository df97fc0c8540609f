//! Hierarchy walker.
//!
//! Collects every operation declared anywhere in a type's superclass chain
//! and interface closure, in first-declared order: a level's own operations
//! first, then each newly-seen directly-implemented interface, then the
//! superclass level. A visited set keyed by type identity keeps diamond
//! inheritance from contributing an interface's operations twice, and
//! bounds the walk on declarations whose hierarchy edges form a cycle.
use std::collections::BTreeSet;

use log::debug;
use mmtype::{OperationDescriptor, OperationTags, TypeId, TypeUniverse};

use mmtype::signature;

/// Which operations never reach the grouper.
///
/// The original host hard-coded two universal root contracts whose
/// operations every concrete class inherits; here the adapter supplies the
/// root types explicitly and the rules precompute their operation sets once.
pub struct ExclusionRules {
    ignore_roots: Vec<TypeId>,
    root_operations: Vec<OperationDescriptor>,
}

impl ExclusionRules {
    /// Build rules excluding the operations declared by `roots` (and the
    /// roots themselves from the superclass walk).
    pub fn new(universe: &TypeUniverse, roots: impl IntoIterator<Item = TypeId>) -> Self {
        let ignore_roots: Vec<TypeId> = roots.into_iter().collect();
        let mut root_operations = Vec::new();
        for root in &ignore_roots {
            if let Some(data) = universe.get(*root) {
                root_operations.extend(data.operations.iter().cloned());
            }
        }
        ExclusionRules {
            ignore_roots,
            root_operations,
        }
    }

    /// No exclusions at all.
    pub fn none() -> Self {
        ExclusionRules {
            ignore_roots: Vec::new(),
            root_operations: Vec::new(),
        }
    }

    /// Whether the superclass walk must stop before `ty`.
    pub fn is_ignore_root(&self, ty: TypeId) -> bool {
        self.ignore_roots.contains(&ty)
    }

    /// Whether `operation` is equivalent to an operation declared by one of
    /// the ignore roots.
    pub fn excludes(&self, universe: &TypeUniverse, operation: &OperationDescriptor) -> bool {
        self.root_operations
            .iter()
            .any(|root_op| signature::equivalent(universe, root_op, operation))
    }
}

/// Collect the candidate operations of `ty`, deduplicated and ordered.
///
/// For non-interface levels, synthetic operations and operations equivalent
/// to an ignore-root operation are excluded; interfaces never declare those.
/// Operations tagged `IGNORE` and non-public operations are excluded
/// unconditionally.
pub fn collect_operations(
    universe: &TypeUniverse,
    ty: TypeId,
    rules: &ExclusionRules,
) -> Vec<OperationDescriptor> {
    let mut collected = Vec::new();
    let mut seen = BTreeSet::new();
    seen.insert(ty);
    walk_level(universe, ty, rules, &mut seen, &mut collected);
    debug!(
        "Collected {} candidate operations for type {}",
        collected.len(),
        universe.fmt(ty)
    );
    collected
}

fn walk_level(
    universe: &TypeUniverse,
    ty: TypeId,
    rules: &ExclusionRules,
    seen: &mut BTreeSet<TypeId>,
    collected: &mut Vec<OperationDescriptor>,
) {
    let Some(data) = universe.get(ty) else {
        return;
    };
    let is_interface = data.form.is_interface();
    let interfaces: Vec<TypeId> = data.interfaces.iter().copied().collect();
    let superclass = data.superclass;
    let operations: Vec<OperationDescriptor> = data.operations.to_vec();
    drop(data);

    for operation in operations {
        if !operation.visibility.is_public() || operation.has_tag(OperationTags::IGNORE) {
            continue;
        }
        if !is_interface
            && (operation.is_synthetic || rules.excludes(universe, &operation))
        {
            continue;
        }
        collected.push(operation);
    }

    for interface in interfaces {
        if seen.insert(interface) {
            walk_level(universe, interface, rules, seen, collected);
        }
    }

    if let Some(superclass) = superclass
        && !rules.is_ignore_root(superclass)
        && seen.insert(superclass)
    {
        walk_level(universe, superclass, rules, seen, collected);
    }
}
