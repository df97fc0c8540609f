//! Signature equivalence.
//!
//! Two operation descriptors, possibly declared by different types, denote
//! the same accessor contract when their names match, their parameter lists
//! are pairwise identical and their return types are related by the
//! covariant-override rule (one assignable to the other). Declaring type and
//! capability tags never participate in the comparison.
//!
//! The relation is symmetric and reflexive. It is not transitive across
//! arbitrary descriptors; it is transitive within a single override chain,
//! which is the only place the extractor relies on it.
use strum::EnumIs;
use thiserror::Error;

use crate::operation::OperationDescriptor;
use crate::universe::{TypeId, TypeUniverse};

#[derive(Debug, PartialEq, Eq, EnumIs, Error)]
pub enum SignatureError {
    /// Covariant override resolution requires every return type in an
    /// override chain to sit on one inheritance path.
    #[error("Cannot compare two types that aren't part of an inheritance hierarchy: {left}, {right}")]
    IncomparableReturnTypes { left: String, right: String },
}

/// Whether `a` and `b` denote the same accessor contract.
pub fn equivalent(universe: &TypeUniverse, a: &OperationDescriptor, b: &OperationDescriptor) -> bool {
    a.name == b.name
        && a.parameter_types == b.parameter_types
        && returns_related(universe, a.return_type, b.return_type)
}

fn returns_related(universe: &TypeUniverse, a: Option<TypeId>, b: Option<TypeId>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => universe.is_assignable(a, b) || universe.is_assignable(b, a),
        _ => false,
    }
}

/// Select the override with the most specialized return type.
///
/// The caller guarantees the inputs are pairwise equivalent (the overload
/// check runs first), so all return types lie on one inheritance path; two
/// unrelated return types are a hard error. Void-returning operations never
/// reach this point.
pub fn most_specialized<'a>(
    universe: &TypeUniverse,
    operations: &'a [OperationDescriptor],
) -> Result<&'a OperationDescriptor, SignatureError> {
    let mut best: Option<&OperationDescriptor> = None;
    for candidate in operations {
        let Some(current) = best else {
            best = Some(candidate);
            continue;
        };
        match (current.return_type, candidate.return_type) {
            (Some(held), Some(offered)) => {
                if held == offered {
                    continue;
                }
                if universe.is_assignable(held, offered) {
                    // The candidate returns a more derived type.
                    best = Some(candidate);
                } else if !universe.is_assignable(offered, held) {
                    return Err(SignatureError::IncomparableReturnTypes {
                        left: universe.name_of(held),
                        right: universe.name_of(offered),
                    });
                }
            }
            (held, offered) if held == offered => {}
            (held, offered) => {
                return Err(SignatureError::IncomparableReturnTypes {
                    left: describe_return(universe, held),
                    right: describe_return(universe, offered),
                });
            }
        }
    }
    // The grouper never calls this with an empty override list.
    best.ok_or_else(|| SignatureError::IncomparableReturnTypes {
        left: "<none>".to_string(),
        right: "<none>".to_string(),
    })
}

fn describe_return(universe: &TypeUniverse, ty: Option<TypeId>) -> String {
    match ty {
        Some(ty) => universe.name_of(ty),
        None => "void".to_string(),
    }
}

/// Deduplicate a same-named operation list by signature equivalence,
/// keeping the first representative of each distinct signature in input
/// order. More than one survivor means the name is overloaded.
pub fn dedup_equivalent<'a>(
    universe: &TypeUniverse,
    operations: &'a [OperationDescriptor],
) -> Vec<&'a OperationDescriptor> {
    let mut distinct: Vec<&OperationDescriptor> = Vec::new();
    for operation in operations {
        if !distinct.iter().any(|seen| equivalent(universe, seen, operation)) {
            distinct.push(operation);
        }
    }
    distinct
}
