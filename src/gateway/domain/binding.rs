//! Binding of untyped caller arguments to typed operation parameters.

use super::{ParameterDescriptor, ParameterSource, ShapeKind};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value, json};
use thiserror::Error;

/// A caller-supplied value could not be coerced to its parameter's kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot bind parameter '{parameter}' as {expected}: {reason}")]
pub struct BindingError {
    /// Parameter name.
    pub parameter: String,
    /// Kind the parameter declares.
    pub expected: ShapeKind,
    /// Why coercion failed.
    pub reason: String,
}

impl BindingError {
    /// Returns structured details for error envelopes.
    #[must_use]
    pub fn details(&self) -> Value {
        json!([{
            "parameter": self.parameter,
            "expected": self.expected,
            "reason": self.reason,
        }])
    }
}

/// A bound value could not be read as the type a callable asked for.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArgumentError {
    /// The argument has no value.
    #[error("argument '{0}' is missing")]
    Missing(String),
    /// The value does not deserialize into the requested type.
    #[error("argument '{name}' is invalid: {reason}")]
    Invalid {
        /// Argument name.
        name: String,
        /// Deserialization failure.
        reason: String,
    },
}

/// One parameter after binding.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArgument {
    name: String,
    source: ParameterSource,
    value: Option<Value>,
}

impl BoundArgument {
    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns where the parameter comes from.
    #[must_use]
    pub const fn source(&self) -> ParameterSource {
        self.source
    }

    /// Returns the coerced value, or `None` when the caller supplied none.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

/// Arguments bound positionally to an operation's parameters.
///
/// Framework-internal parameters are present with no value; the host
/// supplies those itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    arguments: Vec<BoundArgument>,
}

impl BoundArguments {
    /// Returns all bound arguments in declaration order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, BoundArgument> {
        self.arguments.iter()
    }

    /// Returns the number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    /// Returns whether no parameters were bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Returns the value bound to a named parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|argument| argument.name == name)
            .and_then(BoundArgument::value)
    }

    /// Deserializes an optional argument.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::Invalid`] when the bound value does not
    /// deserialize into `T`.
    pub fn typed<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ArgumentError> {
        self.get(name)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|err| ArgumentError::Invalid {
                    name: name.to_owned(),
                    reason: err.to_string(),
                })
            })
            .transpose()
    }

    /// Deserializes an argument the callable cannot do without.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::Missing`] when no value was bound and
    /// [`ArgumentError::Invalid`] when it does not deserialize into `T`.
    pub fn required<T: DeserializeOwned>(&self, name: &str) -> Result<T, ArgumentError> {
        self.typed(name)?
            .ok_or_else(|| ArgumentError::Missing(name.to_owned()))
    }
}

impl<'a> IntoIterator for &'a BoundArguments {
    type Item = &'a BoundArgument;
    type IntoIter = std::slice::Iter<'a, BoundArgument>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Binds caller arguments to parameters.
///
/// Absent and `null` values stay absent; no defaults are invented. Unknown
/// argument names are ignored.
///
/// # Errors
///
/// Returns [`BindingError`] for the first supplied value that cannot be
/// coerced to its parameter's kind.
pub fn bind_arguments(
    parameters: &[ParameterDescriptor],
    arguments: Option<&Map<String, Value>>,
) -> Result<BoundArguments, BindingError> {
    let bound = parameters
        .iter()
        .map(|parameter| -> Result<BoundArgument, BindingError> {
            let supplied = arguments
                .filter(|_| !parameter.is_framework_internal())
                .and_then(|map| map.get(parameter.name()));
            let value = supplied
                .map(|raw| {
                    coerce(raw, parameter.kind()).map_err(|reason| BindingError {
                        parameter: parameter.name().to_owned(),
                        expected: parameter.kind(),
                        reason,
                    })
                })
                .transpose()?
                .flatten();
            Ok(BoundArgument {
                name: parameter.name().to_owned(),
                source: parameter.source(),
                value,
            })
        })
        .collect::<Result<Vec<_>, BindingError>>()?;
    Ok(BoundArguments { arguments: bound })
}

/// Coerces a JSON value to a shape kind.
///
/// Returns `Ok(None)` for `null`.
///
/// # Errors
///
/// Returns a human-readable reason when the value cannot represent `kind`.
pub fn coerce(value: &Value, kind: ShapeKind) -> Result<Option<Value>, String> {
    if value.is_null() {
        return Ok(None);
    }
    let coerced = match kind {
        ShapeKind::String => coerce_string(value),
        ShapeKind::Integer => coerce_integer(value),
        ShapeKind::Number => coerce_number(value),
        ShapeKind::Boolean => coerce_boolean(value),
        ShapeKind::Array => value.is_array().then(|| value.clone()),
        ShapeKind::Object => Some(value.clone()),
    };
    coerced
        .map(Some)
        .ok_or_else(|| format!("got {} {value}", json_kind(value)))
}

fn coerce_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(number) => Some(Value::String(number.to_string())),
        Value::Bool(flag) => Some(Value::String(flag.to_string())),
        _ => None,
    }
}

fn coerce_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(number) if number.is_i64() || number.is_u64() => Some(value.clone()),
        Value::String(text) => {
            let trimmed = text.trim();
            trimmed
                .parse::<i64>()
                .map(Number::from)
                .or_else(|_| trimmed.parse::<u64>().map(Number::from))
                .ok()
                .map(Value::Number)
        }
        _ => None,
    }
}

fn coerce_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
