//! Error types for gateway domain validation.

use thiserror::Error;

/// Errors returned while constructing gateway domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayDomainError {
    /// The handler name is empty after trimming.
    #[error("handler name must not be empty")]
    EmptyHandlerName,

    /// The declaring type name is empty after trimming.
    #[error("declaring type must not be empty")]
    EmptyDeclaringType,

    /// Neither the base path nor the route path contributes any characters.
    #[error("HTTP operation '{handler}' has an empty path")]
    EmptyPath {
        /// Handler whose route is empty.
        handler: String,
    },

    /// A GraphQL field name is empty after trimming.
    #[error("GraphQL operation '{handler}' has an empty field name")]
    EmptyFieldName {
        /// Handler whose field name is empty.
        handler: String,
    },

    /// A parameter name is empty after trimming.
    #[error("parameter {position} of '{handler}' has an empty name")]
    EmptyParameterName {
        /// Handler declaring the parameter.
        handler: String,
        /// Zero-based parameter position.
        position: usize,
    },

    /// Two bindable parameters share the same name.
    #[error("parameter '{parameter}' is declared more than once on '{handler}'")]
    DuplicateParameter {
        /// Handler declaring the parameters.
        handler: String,
        /// Duplicated parameter name.
        parameter: String,
    },

    /// A tool name is empty after trimming.
    #[error("tool name must not be empty")]
    EmptyToolName,

    /// A tool description is empty after trimming.
    #[error("tool description must not be empty")]
    EmptyToolDescription,
}

/// Error returned while parsing an HTTP method from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown HTTP method: {0}")]
pub struct ParseHttpMethodError(pub String);
