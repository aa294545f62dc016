//! Typed errors raised while loading, validating and compiling API configuration.
//!
//! Every failure is fatal to the single API (or method) being processed. The
//! variants fall into four families:
//!
//! - **Configuration errors**: malformed or contradictory annotations and
//!   overrides (duplicate resource parameters, name collisions, bad defaults).
//! - **Type-resolution errors**: unresolved type variables, wildcards or
//!   primitives reaching a place that needs a schema.
//! - **Transformer errors**: no usable constructor, or a transformer applied to
//!   a type outside its declared source type.
//! - **Repository integrity errors**: internal invariant violations, such as a
//!   placeholder schema escaping the schema repository.

use crate::config::ApiConfigInconsistency;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiConfigError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiConfigError {
    /// A second annotation-reading source was registered on a loader.
    #[error("only one annotation config source may be registered, found a second: {source_name}")]
    DuplicateAnnotationSource { source_name: String },

    /// A class name that is not registered in the type universe.
    #[error("{location}: unknown class '{name}'")]
    UnknownClass { location: String, name: String },

    /// A transformer name that is not registered in the type universe.
    #[error("{location}: unknown transformer '{name}'")]
    UnknownTransformer { location: String, name: String },

    /// A type expression in a model file could not be parsed.
    #[error("invalid type expression '{input}': {reason}")]
    InvalidTypeExpression { input: String, reason: String },

    /// A type that cannot be handled at the point it was encountered.
    #[error("{location}: unsupported type '{ty}': {reason}")]
    UnsupportedType {
        location: String,
        ty: String,
        reason: String,
    },

    /// None of the constructor shapes a transformer offers could be used.
    #[error(
        "transformer '{transformer}' cannot be instantiated for type '{ty}': \
         no constructor among [{attempted}]"
    )]
    TransformerInstantiation {
        transformer: String,
        ty: String,
        attempted: String,
    },

    /// A transformer applied to a type that does not extend its source type.
    #[error("transformer '{transformer}' handles '{source_type}', which is not a supertype of '{ty}'")]
    TransformerSourceMismatch {
        transformer: String,
        source_type: String,
        ty: String,
    },

    /// A parameter default value that does not convert to the parameter type.
    #[error("{method}: default value '{value}' of parameter '{parameter}' is not a valid {ty}")]
    InvalidParameterDefault {
        method: String,
        parameter: String,
        value: String,
        ty: String,
    },

    /// An API parameter with no name.
    #[error("{method}: parameter #{index} of type '{ty}' is an API parameter but has no name")]
    MissingParameterName {
        method: String,
        index: usize,
        ty: String,
    },

    /// More than one parameter classified as the request resource.
    #[error("{method}: only one resource parameter is allowed, found {count}")]
    MultipleResourceParameters { method: String, count: usize },

    /// A parameter whose type cannot be used the way it is classified.
    #[error("{method}: parameter '{parameter}' has invalid type '{ty}': {reason}")]
    InvalidParameterType {
        method: String,
        parameter: String,
        ty: String,
        reason: String,
    },

    /// A parameter whose type still contains an unresolved type variable.
    #[error("{method}: parameter '{parameter}' has unresolved type '{ty}'")]
    UnresolvedParameterType {
        method: String,
        parameter: String,
        ty: String,
    },

    /// A repeated parameter whose items are themselves repeated.
    #[error("{method}: parameter '{parameter}' of type '{ty}' is a collection of collections")]
    NestedCollection {
        method: String,
        parameter: String,
        ty: String,
    },

    /// A return type that cannot be serialized as a response body.
    #[error("{method}: invalid return type '{ty}': {reason}")]
    InvalidReturnType {
        method: String,
        ty: String,
        reason: String,
    },

    /// A resource property named like a sibling API parameter.
    #[error("{method}: resource property '{name}' conflicts with an API parameter of the same name")]
    PropertyParameterNameConflict { method: String, name: String },

    /// A path placeholder with no matching named API parameter.
    #[error("{method}: path '{path}' references '{{{name}}}' but no API parameter has that name")]
    PathParameterNotFound {
        method: String,
        path: String,
        name: String,
    },

    /// An API name that does not match the allowed format.
    #[error("invalid API name '{name}': must match {pattern}")]
    InvalidApiName { name: String, pattern: String },

    /// A method name that does not match the allowed format.
    #[error("{method}: invalid method name '{name}': must match {pattern}")]
    InvalidMethodName {
        method: String,
        name: String,
        pattern: String,
    },

    /// An HTTP method string that is not a valid token.
    #[error("{method}: invalid HTTP method '{value}'")]
    InvalidHttpMethod { method: String, value: String },

    /// Two methods of one API share a full method name.
    #[error("method name '{name}' is used by both {first} and {second}")]
    DuplicateMethodName {
        name: String,
        first: String,
        second: String,
    },

    /// Two methods of one API share HTTP method and path.
    #[error("{http_method} {path} is mapped by both {first} and {second}")]
    DuplicateRestPath {
        http_method: String,
        path: String,
        first: String,
        second: String,
    },

    /// Configs that share an ApiKey disagree on API-wide settings.
    #[error("{api}: inconsistent API-wide configuration: {}", describe_inconsistencies(.inconsistencies))]
    InconsistentApiConfiguration {
        api: String,
        inconsistencies: Vec<ApiConfigInconsistency>,
    },

    /// A placeholder schema reached a public caller.
    #[error("schema repository integrity violation for '{ty}': {reason}")]
    RepositoryIntegrity { ty: String, reason: String },

    /// A generation-run state transition that skips or repeats a state.
    #[error("{api}: cannot move from {from} to {to}")]
    InvalidStateTransition {
        api: String,
        from: String,
        to: String,
    },

    /// A dynamic config source failed.
    #[error("config source '{source_name}' failed: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    /// A document could not be rendered.
    #[error("failed to render {format} document for {api}: {message}")]
    Render {
        format: String,
        api: String,
        message: String,
    },
}

fn describe_inconsistencies(inconsistencies: &[ApiConfigInconsistency]) -> String {
    inconsistencies
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ApiConfigError {
    pub(crate) fn unsupported_type(
        location: impl Into<String>,
        ty: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ApiConfigError::UnsupportedType {
            location: location.into(),
            ty: ty.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_class(location: impl Into<String>, name: impl Into<String>) -> Self {
        ApiConfigError::UnknownClass {
            location: location.into(),
            name: name.into(),
        }
    }
}
