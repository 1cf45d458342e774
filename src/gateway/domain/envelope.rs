//! Uniform response envelope for tool executions.

use super::RequestId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Stable, caller-visible error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed or missing input, detected before resolution.
    ValidationError,
    /// The tool name resolves to nothing.
    ToolNotFound,
    /// The underlying callable failed.
    ExecutionError,
    /// Argument coercion or result encoding failed.
    SerializationError,
    /// Anything unanticipated in the gateway itself.
    InternalError,
}

impl ErrorCode {
    /// Returns the wire form of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::ToolNotFound => "tool_not_found",
            Self::ExecutionError => "execution_error",
            Self::SerializationError => "serialization_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Which side of the gateway caused a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    /// The caller's input was at fault.
    Client,
    /// The gateway or the callable failed on its own.
    Server,
}

/// Transport-level outcome of a gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    /// 200
    Ok,
    /// 400
    BadRequest,
    /// 500
    InternalServerError,
}

impl ResponseStatus {
    /// Returns the HTTP status code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::InternalServerError => 500,
        }
    }
}

/// Kind of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Plain or JSON text.
    Text,
}

/// One item of response content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    content_type: ContentType,
    text: String,
}

impl ContentItem {
    /// Creates a text content item.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::Text,
            text: text.into(),
        }
    }

    /// Returns the content kind.
    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Returns the text payload.
    #[must_use]
    pub fn as_text(&self) -> &str {
        &self.text
    }
}

/// Response of an execution, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionEnvelope {
    request_id: RequestId,
    content: Vec<ContentItem>,
    is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    #[serde(skip)]
    fault: Option<Fault>,
}

impl ExecutionEnvelope {
    /// Creates a success envelope carrying serialized result text.
    #[must_use]
    pub fn success(request_id: RequestId, text: impl Into<String>) -> Self {
        Self {
            request_id,
            content: vec![ContentItem::text(text)],
            is_error: false,
            error_code: None,
            details: None,
            fault: None,
        }
    }

    /// Creates an error envelope.
    #[must_use]
    pub fn failure(
        error_code: ErrorCode,
        request_id: RequestId,
        message: impl Into<String>,
        fault: Fault,
    ) -> Self {
        Self {
            request_id,
            content: vec![ContentItem::text(message)],
            is_error: true,
            error_code: Some(error_code),
            details: None,
            fault: Some(fault),
        }
    }

    /// Attaches structured error details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Returns the correlation identifier.
    #[must_use]
    pub const fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Returns the content items.
    #[must_use]
    pub fn content(&self) -> &[ContentItem] {
        &self.content
    }

    /// Returns the text of the first content item.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.content.first().map(ContentItem::as_text)
    }

    /// Returns whether the execution failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.is_error
    }

    /// Returns the error code of a failed execution.
    #[must_use]
    pub const fn error_code(&self) -> Option<ErrorCode> {
        self.error_code
    }

    /// Returns structured error details, if any.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Returns the transport status this envelope should be sent with.
    #[must_use]
    pub const fn status(&self) -> ResponseStatus {
        match self.fault {
            None => ResponseStatus::Ok,
            Some(Fault::Client) => ResponseStatus::BadRequest,
            Some(Fault::Server) => ResponseStatus::InternalServerError,
        }
    }
}
