//! Portable argument shapes derived from host parameter types.
//!
//! Every declared type maps to exactly one [`ShapeKind`]. Unknown types fall
//! back to [`ShapeKind::Object`] so no parameter is dropped from a schema.

use super::{ParameterDescriptor, ParameterSource, operation::short_type_name};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

const STRING_TYPES: &[&str] = &["String", "str", "char", "Character", "CharSequence"];

const INTEGER_TYPES: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
    "byte", "short", "int", "long", "Byte", "Short", "Integer", "Long", "BigInteger",
];

const NUMBER_TYPES: &[&str] = &["f32", "f64", "float", "double", "Float", "Double", "BigDecimal"];

const BOOLEAN_TYPES: &[&str] = &["bool", "boolean", "Boolean"];

const COLLECTION_TYPES: &[&str] = &[
    "Vec",
    "VecDeque",
    "LinkedList",
    "HashSet",
    "BTreeSet",
    "IndexSet",
    "SmallVec",
    "List",
    "ArrayList",
    "Set",
    "TreeSet",
    "Collection",
    "Iterable",
];

const OPTIONAL_WRAPPERS: &[&str] = &["Option", "Optional"];

/// Portable primitive kind of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Text.
    String,
    /// Whole numbers.
    Integer,
    /// Floating-point numbers.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Ordered collections.
    Array,
    /// Anything else.
    Object,
}

impl ShapeKind {
    /// Returns the JSON-schema type keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Maps a host-language type name to its shape kind.
    ///
    /// Optional wrappers (`Option<T>`, `Optional<T>`) are looked through,
    /// array and collection types map to [`ShapeKind::Array`], and anything
    /// not in the fixed table maps to [`ShapeKind::Object`].
    #[must_use]
    pub fn from_origin_type(origin_type: &str) -> Self {
        let trimmed = strip_reference(origin_type.trim());
        if let Some(inner) = optional_inner(trimmed) {
            return Self::from_origin_type(inner);
        }
        if is_array_like(trimmed) {
            return Self::Array;
        }

        let simple = short_type_name(generic_head(trimmed));
        if STRING_TYPES.contains(&simple) {
            Self::String
        } else if INTEGER_TYPES.contains(&simple) {
            Self::Integer
        } else if NUMBER_TYPES.contains(&simple) {
            Self::Number
        } else if BOOLEAN_TYPES.contains(&simple) {
            Self::Boolean
        } else {
            Self::Object
        }
    }

    /// Returns whether the type name is an optional wrapper.
    #[must_use]
    pub fn is_optional_wrapper(origin_type: &str) -> bool {
        optional_inner(strip_reference(origin_type.trim())).is_some()
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

fn strip_reference(type_name: &str) -> &str {
    let without_ampersand = type_name.trim_start_matches('&').trim_start();
    without_ampersand
        .strip_prefix("mut ")
        .unwrap_or(without_ampersand)
        .trim()
}

fn generic_head(type_name: &str) -> &str {
    type_name
        .split_once('<')
        .map_or(type_name, |(head, _)| head)
        .trim()
}

fn optional_inner(type_name: &str) -> Option<&str> {
    let (head, rest) = type_name.split_once('<')?;
    if !OPTIONAL_WRAPPERS.contains(&short_type_name(head.trim())) {
        return None;
    }
    rest.trim_end().strip_suffix('>').map(str::trim)
}

fn is_array_like(type_name: &str) -> bool {
    if type_name.ends_with("[]") || type_name.starts_with('[') {
        return true;
    }
    COLLECTION_TYPES.contains(&short_type_name(generic_head(type_name)))
}

/// Shape of one parameter as published in a tool's input schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeEntry {
    kind: ShapeKind,
    origin_type: String,
    nullable: bool,
    graphql_type: Option<String>,
}

impl ShapeEntry {
    /// Returns the portable kind.
    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Returns the host-language type hint.
    #[must_use]
    pub fn origin_type(&self) -> &str {
        &self.origin_type
    }

    /// Returns whether the caller may omit the value.
    #[must_use]
    pub const fn nullable(&self) -> bool {
        self.nullable
    }

    /// Returns the GraphQL type hint for resolver arguments.
    #[must_use]
    pub fn graphql_type(&self) -> Option<&str> {
        self.graphql_type.as_deref()
    }
}

impl Serialize for ShapeEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let field_count = if self.graphql_type.is_some() { 4 } else { 3 };
        let mut state = serializer.serialize_struct("ShapeEntry", field_count)?;
        state.serialize_field("type", &self.kind)?;
        state.serialize_field("originType", &self.origin_type)?;
        state.serialize_field("nullable", &self.nullable)?;
        if let Some(graphql_type) = &self.graphql_type {
            state.serialize_field("graphqlType", graphql_type)?;
        }
        state.end()
    }
}

/// Derives the published shape of a parameter.
///
/// `nullable` is always the inverse of the parameter's requiredness.
#[must_use]
pub fn derive_parameter_shape(parameter: &ParameterDescriptor) -> ShapeEntry {
    let graphql_type = (parameter.source() == ParameterSource::Argument).then(|| {
        let origin = strip_reference(parameter.origin_type());
        let unwrapped = optional_inner(origin).unwrap_or(origin);
        short_type_name(generic_head(unwrapped)).to_owned()
    });

    ShapeEntry {
        kind: parameter.kind(),
        origin_type: parameter.origin_type().to_owned(),
        nullable: !parameter.is_required(),
        graphql_type,
    }
}

/// Argument schema of a tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSchema {
    properties: Vec<(String, ShapeEntry)>,
    required: Vec<String>,
}

impl InputSchema {
    /// Builds a schema from an operation's parameters.
    ///
    /// Framework-internal parameters are skipped; all others appear in
    /// declaration order.
    #[must_use]
    pub fn from_parameters(parameters: &[ParameterDescriptor]) -> Self {
        let mut schema = Self::default();
        for parameter in parameters
            .iter()
            .filter(|parameter| !parameter.is_framework_internal())
        {
            schema
                .properties
                .push((parameter.name().to_owned(), derive_parameter_shape(parameter)));
            if parameter.is_required() {
                schema.required.push(parameter.name().to_owned());
            }
        }
        schema
    }

    /// Returns the shape of a named property.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&ShapeEntry> {
        self.properties
            .iter()
            .find(|(property, _)| property == name)
            .map(|(_, shape)| shape)
    }

    /// Returns property names in declaration order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the names of required properties.
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }
}

struct OrderedProperties<'a>(&'a [(String, ShapeEntry)]);

impl Serialize for OrderedProperties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, shape) in self.0 {
            map.serialize_entry(name, shape)?;
        }
        map.end()
    }
}

impl Serialize for InputSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let field_count = if self.required.is_empty() { 2 } else { 3 };
        let mut state = serializer.serialize_struct("InputSchema", field_count)?;
        state.serialize_field("type", "object")?;
        state.serialize_field("properties", &OrderedProperties(&self.properties))?;
        if !self.required.is_empty() {
            state.serialize_field("required", &self.required)?;
        }
        state.end()
    }
}
