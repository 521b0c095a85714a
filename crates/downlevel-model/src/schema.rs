//! Attribute schema declarations
//!
//! The schema declaration layer that owns these types lives outside this
//! workspace; it declares which attributes exist on a resource, their kinds
//! and default values. The transformation pipeline consumes only the name
//! and the expression-allowed bit; the remaining fields exist for the
//! surrounding registry and console layers.

use serde::{Deserialize, Serialize};

use crate::value::{ModelValue, ValueKind};

/// Declaration of one attribute: name, kind and capability flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    name: String,
    kind: ValueKind,
    allow_expression: bool,
    nillable: bool,
    restart_required: bool,
    default: Option<ModelValue>,
}

impl AttributeDefinition {
    /// Start building a definition for a named attribute of a given kind
    #[inline]
    pub fn builder(name: impl Into<String>, kind: ValueKind) -> AttributeDefinitionBuilder {
        AttributeDefinitionBuilder {
            name: name.into(),
            kind,
            allow_expression: false,
            nillable: false,
            restart_required: false,
            default: None,
        }
    }

    /// Attribute name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared value kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Whether an unresolved expression may be stored under this attribute
    #[inline]
    #[must_use]
    pub fn allow_expression(&self) -> bool {
        self.allow_expression
    }

    /// Whether the attribute may be left undefined
    #[inline]
    #[must_use]
    pub fn nillable(&self) -> bool {
        self.nillable
    }

    /// Whether writing the attribute requires a service restart
    #[inline]
    #[must_use]
    pub fn restart_required(&self) -> bool {
        self.restart_required
    }

    /// Declared default value, if any
    #[inline]
    #[must_use]
    pub fn default_value(&self) -> Option<&ModelValue> {
        self.default.as_ref()
    }
}

/// Builder for [`AttributeDefinition`]
#[derive(Debug, Clone)]
pub struct AttributeDefinitionBuilder {
    name: String,
    kind: ValueKind,
    allow_expression: bool,
    nillable: bool,
    restart_required: bool,
    default: Option<ModelValue>,
}

impl AttributeDefinitionBuilder {
    /// Permit unresolved expressions under this attribute
    #[inline]
    #[must_use]
    pub fn allow_expression(mut self, allow: bool) -> Self {
        self.allow_expression = allow;
        self
    }

    /// Permit the attribute to stay undefined
    #[inline]
    #[must_use]
    pub fn nillable(mut self, nillable: bool) -> Self {
        self.nillable = nillable;
        self
    }

    /// Mark writes as requiring a service restart
    #[inline]
    #[must_use]
    pub fn restart_required(mut self, required: bool) -> Self {
        self.restart_required = required;
        self
    }

    /// Declare a default value
    #[inline]
    #[must_use]
    pub fn default_value(mut self, value: impl Into<ModelValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Finish the definition
    #[inline]
    #[must_use]
    pub fn build(self) -> AttributeDefinition {
        AttributeDefinition {
            name: self.name,
            kind: self.kind,
            allow_expression: self.allow_expression,
            nillable: self.nillable,
            restart_required: self.restart_required,
            default: self.default,
        }
    }
}

/// Names of the definitions that forbid expression values
///
/// Convenience for seeding reject transformers from a resource's
/// declarations.
pub fn expression_forbidden<'a>(
    definitions: impl IntoIterator<Item = &'a AttributeDefinition>,
) -> impl Iterator<Item = &'a str> {
    definitions
        .into_iter()
        .filter(|definition| !definition.allow_expression())
        .map(AttributeDefinition::name)
}
