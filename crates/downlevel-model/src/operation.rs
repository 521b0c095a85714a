//! Management operations
//!
//! An [`Operation`] is a request against one addressed resource: an
//! operation name plus a parameter model. The well-known names cover the
//! generic attribute lifecycle; components may register arbitrary custom
//! names alongside them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::path::PathAddress;
use crate::value::ModelValue;

/// Adds a resource at the target address
pub const ADD: &str = "add";

/// Removes the resource at the target address
pub const REMOVE: &str = "remove";

/// Writes a single attribute (`name`/`value` parameters)
pub const WRITE_ATTRIBUTE: &str = "write-attribute";

/// Undefines a single attribute (`name` parameter)
pub const UNDEFINE_ATTRIBUTE: &str = "undefine-attribute";

/// Parameter holding the attribute name for write/undefine operations
pub const NAME: &str = "name";

/// Parameter holding the attribute value for write operations
pub const VALUE: &str = "value";

/// A request consisting of a target address, an operation name and a
/// parameter model
///
/// Operations may produce a response model; response rewriting is handled by
/// the transformation layer, not carried on the request itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    address: PathAddress,
    name: String,
    params: IndexMap<String, ModelValue>,
}

impl Operation {
    /// Create an operation with an empty parameter model
    #[inline]
    pub fn new(name: impl Into<String>, address: PathAddress) -> Self {
        Self {
            address,
            name: name.into(),
            params: IndexMap::new(),
        }
    }

    /// Create an `add` operation
    #[inline]
    #[must_use]
    pub fn add(address: PathAddress) -> Self {
        Self::new(ADD, address)
    }

    /// Create a `remove` operation
    #[inline]
    #[must_use]
    pub fn remove(address: PathAddress) -> Self {
        Self::new(REMOVE, address)
    }

    /// Create a `write-attribute` operation
    #[inline]
    pub fn write_attribute(
        address: PathAddress,
        attribute: impl Into<String>,
        value: impl Into<ModelValue>,
    ) -> Self {
        Self::new(WRITE_ATTRIBUTE, address)
            .with_param(NAME, attribute.into())
            .with_param(VALUE, value)
    }

    /// Create an `undefine-attribute` operation
    #[inline]
    pub fn undefine_attribute(address: PathAddress, attribute: impl Into<String>) -> Self {
        Self::new(UNDEFINE_ATTRIBUTE, address).with_param(NAME, attribute.into())
    }

    /// Target address
    #[inline]
    #[must_use]
    pub fn address(&self) -> &PathAddress {
        &self.address
    }

    /// Operation name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter value by name
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ModelValue> {
        self.params.get(name)
    }

    /// Set a parameter, replacing any existing value
    #[inline]
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<ModelValue>) {
        self.params.insert(name.into(), value.into());
    }

    /// Remove a parameter, returning its value if present
    #[inline]
    pub fn remove_param(&mut self, name: &str) -> Option<ModelValue> {
        self.params.shift_remove(name)
    }

    /// The parameter model
    #[inline]
    #[must_use]
    pub fn params(&self) -> &IndexMap<String, ModelValue> {
        &self.params
    }

    /// Mutable access to the parameter model
    #[inline]
    pub fn params_mut(&mut self) -> &mut IndexMap<String, ModelValue> {
        &mut self.params
    }

    /// Fluent parameter setter
    #[inline]
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ModelValue>) -> Self {
        self.set_param(name, value);
        self
    }

    /// Attribute named by a write/undefine operation's `name` parameter
    #[inline]
    #[must_use]
    pub fn attribute_name(&self) -> Option<&str> {
        self.params.get(NAME).and_then(ModelValue::as_str)
    }

    /// Value carried by a write operation's `value` parameter
    #[inline]
    #[must_use]
    pub fn attribute_value(&self) -> Option<&ModelValue> {
        self.params.get(VALUE)
    }
}
