//! Extraction failure taxonomy.
//!
//! Every validation failure is terminal for the type being extracted: no
//! partial schema is ever produced and nothing is downgraded to a warning.
//! Each variant embeds the extraction path (how the offending type was
//! reached from the root of the extraction) and describes the offending
//! operations, fields or properties by name.
use mmtype::signature::SignatureError;
use strum::EnumIs;
use thiserror::Error;

pub type ExtractResult<T> = Result<T, ExtractError>;

#[derive(Debug, PartialEq, Eq, EnumIs, Error)]
pub enum ExtractError {
    /// Structural violation: managed types must leave storage synthesis to
    /// the host.
    #[error("Invalid managed model type {path}: must be defined as an interface or an abstract class.")]
    NotAbstract { path: String },

    /// Structural violation: the unmanaged-instance strategy only accepts
    /// instantiable classes.
    #[error("Invalid model type {path}: must be defined as a concrete class.")]
    NotConcrete { path: String },

    /// Structural violation: type parameters are unsupported.
    #[error("Invalid managed model type {path}: cannot be a parameterized type.")]
    Parameterized { path: String },

    /// Structural violation: managed instances are only ever constructed by
    /// the host, which passes no arguments.
    #[error("Invalid managed model type {path}: custom constructors are not allowed (invalid constructor: {constructor}).")]
    CustomConstructor { path: String, constructor: String },

    /// Structural violation: managed types hold no state of their own.
    #[error("Invalid managed model type {path}: instance scoped fields are not allowed (found fields: {}).", fields.join(", "))]
    InstanceFields { path: String, fields: Vec<String> },

    /// Structural violation: every operation in the hierarchy must be part
    /// of the public accessor surface.
    #[error("Invalid managed model type {path}: protected and private methods are not allowed (invalid methods: {}).", operations.join(", "))]
    NonPublicOperations {
        path: String,
        operations: Vec<String>,
    },

    /// Two non-equivalent operations share a name.
    #[error("Invalid managed model type {path}: overloaded methods are not supported (invalid methods: {}).", operations.join(", "))]
    OverloadedOperations {
        path: String,
        operations: Vec<String>,
    },

    /// A getter-named operation violates the accessor convention.
    #[error("Invalid managed model type {path}: {reason} (invalid method: {operation}).")]
    InvalidGetter {
        path: String,
        operation: String,
        reason: GetterViolation,
    },

    /// A matched setter violates the accessor convention.
    #[error("Invalid managed model type {path}: {reason} (invalid method: {operation}).")]
    InvalidSetter {
        path: String,
        operation: String,
        reason: SetterViolation,
    },

    /// Covariant getter overrides returned types outside one inheritance
    /// path.
    #[error("Invalid managed model type {path}: {source}")]
    IncomparableReturnTypes {
        path: String,
        source: SignatureError,
    },

    /// Operations left over after accessor pairing.
    #[error("Invalid managed model type {path}: only paired getter/setter methods are supported (invalid methods: {}).", operations.join(", "))]
    UnpairedOperations {
        path: String,
        operations: Vec<String>,
    },

    /// The nature pipeline produced two natures of the same kind for one
    /// property.
    #[error("Invalid managed model type {path}: property '{property}' was assigned two natures of kind {nature}.")]
    DuplicateNature {
        path: String,
        property: String,
        nature: &'static str,
    },

    /// Classification conflict: an externally-owned property of a
    /// manageable type.
    #[error("Invalid managed model type {path}: property '{property}' is marked as unmanaged, but is of managed type {property_type}. Please remove the unmanaged marker.")]
    UnmanagedOnManageableType {
        path: String,
        property: String,
        property_type: String,
    },

    /// Classification conflict: a property of a non-manageable type must be
    /// explicitly marked as externally owned.
    #[error("Invalid managed model type {path}: type {property_type} cannot be used for property '{property}' as it is an unmanaged type (mark the getter as unmanaged if this property is externally owned).")]
    NonManageablePropertyType {
        path: String,
        property: String,
        property_type: String,
    },

    /// Classification conflict: nothing would ever assign an unmanaged
    /// read-only property.
    #[error("Invalid managed model type {path}: unmanaged property '{property}' cannot be read only, unmanaged properties must have setters.")]
    ReadOnlyUnmanaged { path: String, property: String },

    /// Classification conflict: read-only properties are materialized by
    /// the host and so must be of a managed kind themselves.
    #[error("Invalid managed model type {path}: read only property '{property}' has non managed type {property_type}, only managed types can be used.")]
    ReadOnlyNonManaged {
        path: String,
        property: String,
        property_type: String,
    },

    /// Classification conflict: collection-like properties are always
    /// materialized read-only.
    #[error("Invalid managed model type {path}: property '{property}' cannot have a setter ({property_type} properties must be read only).")]
    WritableCollection {
        path: String,
        property: String,
        property_type: String,
    },

    /// Classification conflict: a delegate-backed accessor pair must be
    /// forwarded as a whole.
    #[error("Invalid managed model type {path}: getter and setter for property '{property}' must both be delegated or both be implemented by the host (invalid methods: {}).", operations.join(", "))]
    DelegateMismatch {
        path: String,
        property: String,
        operations: Vec<String>,
    },

    /// Types exposing the naming contract receive their name from the host.
    #[error("Invalid managed model type {path}: managed types implementing the naming contract must not declare a setter for the name property.")]
    NameSetterForbidden { path: String },

    /// No extraction strategy accepted a type whose schema was required.
    #[error("No schema extraction strategy applies to type {path}.")]
    NoApplicableStrategy { path: String },
}

/// Accessor-naming violations reported for getter-shaped operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum GetterViolation {
    TakesParameters,
    LowercaseSuffix,
    ReturnsNothing,
}

impl std::fmt::Display for GetterViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            GetterViolation::TakesParameters => "getter methods cannot take parameters",
            GetterViolation::LowercaseSuffix => {
                "the 4th character of the getter method name must be an uppercase character"
            }
            GetterViolation::ReturnsNothing => "getter methods must return a value",
        };
        f.write_str(message)
    }
}

/// Setter violations reported for matched setter operations.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs)]
pub enum SetterViolation {
    ReturnsValue,
    WrongArity,
    /// The parameter type must equal the getter's return type exactly; no
    /// covariance applies to setters.
    ParameterTypeMismatch {
        expected: String,
        found: String,
    },
    NotAbstract,
}

impl std::fmt::Display for SetterViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetterViolation::ReturnsValue => f.write_str("setter method must have void return type"),
            SetterViolation::WrongArity => {
                f.write_str("setter method must have exactly one parameter")
            }
            SetterViolation::ParameterTypeMismatch { expected, found } => write!(
                f,
                "setter method param must be of exactly the same type as the getter returns (expected: {expected}, found: {found})"
            ),
            SetterViolation::NotAbstract => f.write_str("setter method must be abstract"),
        }
    }
}
