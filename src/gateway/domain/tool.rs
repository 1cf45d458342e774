//! Tool descriptors and catalog snapshots.

use super::{GatewayDomainError, InputSchema};
use serde::Serialize;

/// Externally visible representation of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    name: String,
    description: String,
    input_schema: InputSchema,
}

impl ToolDescriptor {
    /// Creates a tool descriptor with required fields.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayDomainError`] when name or description is empty.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: InputSchema,
    ) -> Result<Self, GatewayDomainError> {
        let normalized_name = name.into().trim().to_owned();
        if normalized_name.is_empty() {
            return Err(GatewayDomainError::EmptyToolName);
        }

        let normalized_description = description.into().trim().to_owned();
        if normalized_description.is_empty() {
            return Err(GatewayDomainError::EmptyToolDescription);
        }

        Ok(Self {
            name: normalized_name,
            description: normalized_description,
            input_schema,
        })
    }

    /// Returns a copy of this descriptor under a different name.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the input schema.
    #[must_use]
    pub const fn input_schema(&self) -> &InputSchema {
        &self.input_schema
    }
}

/// Ordered tool list for one discovery generation.
///
/// A catalog is never mutated after it is published; rebuilds replace it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    generation: u64,
    tools: Vec<ToolDescriptor>,
}

impl Catalog {
    /// Creates a catalog snapshot.
    #[must_use]
    pub const fn new(generation: u64, tools: Vec<ToolDescriptor>) -> Self {
        Self { generation, tools }
    }

    /// Returns the build generation this snapshot belongs to.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the tools in catalog order.
    #[must_use]
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Returns the number of tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns whether the catalog has no tools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Consumes the catalog and returns its tools.
    #[must_use]
    pub fn into_tools(self) -> Vec<ToolDescriptor> {
        self.tools
    }
}
