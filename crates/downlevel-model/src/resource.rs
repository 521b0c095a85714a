//! Nodes of the management model tree
//!
//! A [`Resource`] owns an attribute model and an ordered collection of named
//! children, each reachable by a [`PathElement`]. The tree root is owned by
//! the surrounding resource registry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::path::{PathAddress, PathElement};
use crate::value::ModelValue;

/// A node in the hierarchical configuration tree
///
/// Attribute keys are unique; insertion order of attributes is irrelevant to
/// equality but preserved for deterministic iteration. A resource is
/// exclusively owned by its parent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Resource {
    model: IndexMap<String, ModelValue>,
    children: IndexMap<PathElement, Resource>,
}

impl Resource {
    /// Create an empty resource
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute value by name
    #[inline]
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&ModelValue> {
        self.model.get(name)
    }

    /// Set an attribute, replacing any existing value
    #[inline]
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<ModelValue>) {
        self.model.insert(name.into(), value.into());
    }

    /// Remove an attribute, returning its value if present
    ///
    /// Preserves the order of the remaining attributes.
    #[inline]
    pub fn remove_attribute(&mut self, name: &str) -> Option<ModelValue> {
        self.model.shift_remove(name)
    }

    /// Check if an attribute is present (defined or not)
    #[inline]
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.model.contains_key(name)
    }

    /// Check if an attribute is present and defined
    #[inline]
    #[must_use]
    pub fn has_defined(&self, name: &str) -> bool {
        self.model.get(name).is_some_and(ModelValue::is_defined)
    }

    /// Attribute names in insertion order
    #[inline]
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.model.keys().map(String::as_str)
    }

    /// The attribute model
    #[inline]
    #[must_use]
    pub fn model(&self) -> &IndexMap<String, ModelValue> {
        &self.model
    }

    /// Mutable access to the attribute model
    #[inline]
    pub fn model_mut(&mut self) -> &mut IndexMap<String, ModelValue> {
        &mut self.model
    }

    /// Child resource by element
    #[inline]
    #[must_use]
    pub fn child(&self, element: &PathElement) -> Option<&Resource> {
        self.children.get(element)
    }

    /// Mutable child resource by element
    #[inline]
    pub fn child_mut(&mut self, element: &PathElement) -> Option<&mut Resource> {
        self.children.get_mut(element)
    }

    /// Register a child, replacing any existing child under the same element
    #[inline]
    pub fn register_child(&mut self, element: PathElement, child: Resource) {
        self.children.insert(element, child);
    }

    /// Remove a child, returning it if present
    #[inline]
    pub fn remove_child(&mut self, element: &PathElement) -> Option<Resource> {
        self.children.shift_remove(element)
    }

    /// Children in registration order
    #[inline]
    pub fn children(&self) -> impl Iterator<Item = (&PathElement, &Resource)> {
        self.children.iter()
    }

    /// Child elements in registration order, cloned
    ///
    /// Use when child resources are mutated or removed during iteration.
    #[inline]
    #[must_use]
    pub fn child_elements(&self) -> Vec<PathElement> {
        self.children.keys().cloned().collect()
    }

    /// Check if this resource has any children
    #[inline]
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Descendant resource at a relative address
    ///
    /// An empty address resolves to `self`.
    #[must_use]
    pub fn navigate(&self, address: &PathAddress) -> Option<&Resource> {
        let mut current = self;
        for element in address.iter() {
            current = current.child(element)?;
        }
        Some(current)
    }

    /// Mutable descendant resource at a relative address
    pub fn navigate_mut(&mut self, address: &PathAddress) -> Option<&mut Resource> {
        let mut current = self;
        for element in address.iter() {
            current = current.child_mut(element)?;
        }
        Some(current)
    }

    /// Fluent attribute setter for building fixtures and defaults
    #[inline]
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<ModelValue>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Fluent child registration
    #[inline]
    #[must_use]
    pub fn with_child(mut self, element: PathElement, child: Resource) -> Self {
        self.register_child(element, child);
        self
    }
}
