//! Operation descriptors produced by discovery.

use super::{GatewayDomainError, NaturalKey, ParseHttpMethodError, ShapeKind};
use crate::gateway::ports::Invocable;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// HTTP verb of a routed handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
}

impl HttpMethod {
    /// Returns the canonical upper-case verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HttpMethod {
    type Error = ParseHttpMethodError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(ParseHttpMethodError(value.to_owned())),
        }
    }
}

/// Root operation type of a GraphQL resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GraphQlOperationType {
    /// A read-only query field.
    Query,
    /// A mutation field.
    Mutation,
}

impl GraphQlOperationType {
    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Mutation => "MUTATION",
        }
    }
}

impl fmt::Display for GraphQlOperationType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// How an operation is reached in the host application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// A routed HTTP handler.
    Http {
        /// HTTP verb.
        method: HttpMethod,
        /// Path prefix declared on the handler's owner, possibly empty.
        base_path: String,
        /// Route pattern declared on the handler itself.
        path: String,
    },
    /// A GraphQL query or mutation resolver.
    GraphQl {
        /// Root operation type.
        operation: GraphQlOperationType,
        /// Schema field the resolver answers.
        field_name: String,
    },
}

impl OperationKind {
    /// Creates an HTTP operation kind without a base path.
    #[must_use]
    pub fn http(method: HttpMethod, path: impl Into<String>) -> Self {
        Self::Http {
            method,
            base_path: String::new(),
            path: path.into(),
        }
    }

    /// Creates a GraphQL operation kind.
    #[must_use]
    pub fn graphql(operation: GraphQlOperationType, field_name: impl Into<String>) -> Self {
        Self::GraphQl {
            operation,
            field_name: field_name.into(),
        }
    }

    /// Returns the verb component of the natural key.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Http { method, .. } => method.as_str(),
            Self::GraphQl { operation, .. } => operation.as_str(),
        }
    }

    /// Returns the full route for HTTP operations or the field name for
    /// GraphQL operations.
    #[must_use]
    pub fn locator(&self) -> String {
        match self {
            Self::Http {
                base_path, path, ..
            } => join_paths(base_path, path),
            Self::GraphQl { field_name, .. } => field_name.clone(),
        }
    }

    /// Returns whether this is a GraphQL operation.
    #[must_use]
    pub const fn is_graphql(&self) -> bool {
        matches!(self, Self::GraphQl { .. })
    }
}

/// Joins a base path and a route path with exactly one separator.
#[must_use]
pub fn join_paths(base_path: &str, path: &str) -> String {
    let base = base_path.trim();
    let route = path.trim();
    if base.is_empty() {
        return route.to_owned();
    }
    if route.is_empty() {
        return base.to_owned();
    }
    match (base.ends_with('/'), route.strip_prefix('/')) {
        (true, Some(stripped)) => format!("{base}{stripped}"),
        (false, None) => format!("{base}/{route}"),
        _ => format!("{base}{route}"),
    }
}

/// Where a parameter's value comes from in the host framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterSource {
    /// A templated path segment.
    Path,
    /// A query-string parameter.
    Query,
    /// The request body.
    Body,
    /// A request header.
    Header,
    /// A GraphQL field argument.
    Argument,
    /// Request or response plumbing injected by the framework.
    FrameworkInternal,
}

impl ParameterSource {
    /// Returns whether callers supply values for this source.
    #[must_use]
    pub const fn is_bindable(self) -> bool {
        !matches!(self, Self::FrameworkInternal)
    }

    const fn required_by_default(self) -> bool {
        matches!(self, Self::Path | Self::Query | Self::Body)
    }
}

/// One input parameter of an operation.
///
/// Requiredness and the portable shape kind are resolved once, when the
/// descriptor is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterDescriptor {
    name: String,
    kind: ShapeKind,
    origin_type: String,
    source: ParameterSource,
    required: bool,
}

impl ParameterDescriptor {
    /// Creates a parameter descriptor.
    ///
    /// `explicit_required` carries an explicit required/optional annotation
    /// when the host declares one. Without it, path, query and body
    /// parameters are required unless their origin type is optional.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        origin_type: impl Into<String>,
        source: ParameterSource,
        explicit_required: Option<bool>,
    ) -> Self {
        let origin = origin_type.into().trim().to_owned();
        let kind = ShapeKind::from_origin_type(&origin);
        let required = explicit_required.unwrap_or_else(|| {
            source.required_by_default() && !ShapeKind::is_optional_wrapper(&origin)
        });
        Self {
            name: name.into().trim().to_owned(),
            kind,
            origin_type: origin,
            source,
            required,
        }
    }

    /// Returns the parameter name as seen by callers.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the portable shape kind of the declared type.
    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Returns the host-language type name.
    #[must_use]
    pub fn origin_type(&self) -> &str {
        &self.origin_type
    }

    /// Returns where the value comes from.
    #[must_use]
    pub const fn source(&self) -> ParameterSource {
        self.source
    }

    /// Returns whether callers must supply a value.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns whether the parameter is framework plumbing.
    #[must_use]
    pub const fn is_framework_internal(&self) -> bool {
        !self.source.is_bindable()
    }
}

/// A discovered, validated operation.
#[derive(Clone)]
pub struct OperationDescriptor {
    key: NaturalKey,
    kind: OperationKind,
    declaring_type: String,
    handler: String,
    parameters: Vec<ParameterDescriptor>,
    target: Arc<dyn Invocable>,
}

impl OperationDescriptor {
    /// Builds and validates an operation descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayDomainError`] when the handler, declaring type, path
    /// or field name is empty, or when bindable parameters are unnamed or
    /// share a name.
    pub fn new(
        kind: OperationKind,
        declaring_type: impl Into<String>,
        handler: impl Into<String>,
        parameters: Vec<ParameterDescriptor>,
        target: Arc<dyn Invocable>,
    ) -> Result<Self, GatewayDomainError> {
        let handler_name = handler.into().trim().to_owned();
        if handler_name.is_empty() {
            return Err(GatewayDomainError::EmptyHandlerName);
        }

        let declaring = declaring_type.into().trim().to_owned();
        if declaring.is_empty() {
            return Err(GatewayDomainError::EmptyDeclaringType);
        }

        let locator = kind.locator();
        if locator.trim().is_empty() {
            return Err(match kind {
                OperationKind::Http { .. } => GatewayDomainError::EmptyPath {
                    handler: handler_name,
                },
                OperationKind::GraphQl { .. } => GatewayDomainError::EmptyFieldName {
                    handler: handler_name,
                },
            });
        }

        validate_parameters(&handler_name, &parameters)?;

        Ok(Self {
            key: natural_key(&kind, &declaring, &handler_name),
            kind,
            declaring_type: declaring,
            handler: handler_name,
            parameters,
            target,
        })
    }

    /// Returns the stable identity of this operation.
    #[must_use]
    pub const fn key(&self) -> &NaturalKey {
        &self.key
    }

    /// Returns how the operation is reached.
    #[must_use]
    pub const fn kind(&self) -> &OperationKind {
        &self.kind
    }

    /// Returns the fully-qualified name of the type declaring the handler.
    #[must_use]
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// Returns the last path segment of the declaring type.
    #[must_use]
    pub fn declaring_type_short_name(&self) -> &str {
        short_type_name(&self.declaring_type)
    }

    /// Returns the handler's short name.
    #[must_use]
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Returns all parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// Returns the callable target.
    #[must_use]
    pub fn target(&self) -> &Arc<dyn Invocable> {
        &self.target
    }
}

impl PartialEq for OperationDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.kind == other.kind
            && self.parameters == other.parameters
    }
}

impl fmt::Debug for OperationDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("OperationDescriptor")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Computes the natural key for an operation's identity components.
#[must_use]
pub fn natural_key(kind: &OperationKind, declaring_type: &str, handler: &str) -> NaturalKey {
    NaturalKey::from_parts(
        kind.verb(),
        &kind.locator(),
        declaring_type.trim(),
        handler.trim(),
    )
}

/// Returns the last `::`- or `.`-separated segment of a type path.
#[must_use]
pub fn short_type_name(type_path: &str) -> &str {
    let after_module = type_path.rsplit("::").next().unwrap_or(type_path);
    after_module.rsplit('.').next().unwrap_or(after_module)
}

fn validate_parameters(
    handler: &str,
    parameters: &[ParameterDescriptor],
) -> Result<(), GatewayDomainError> {
    let mut seen = HashSet::new();
    for (position, parameter) in parameters.iter().enumerate() {
        if !parameter.source().is_bindable() {
            continue;
        }
        if parameter.name().is_empty() {
            return Err(GatewayDomainError::EmptyParameterName {
                handler: handler.to_owned(),
                position,
            });
        }
        if !seen.insert(parameter.name()) {
            return Err(GatewayDomainError::DuplicateParameter {
                handler: handler.to_owned(),
                parameter: parameter.name().to_owned(),
            });
        }
    }
    Ok(())
}
