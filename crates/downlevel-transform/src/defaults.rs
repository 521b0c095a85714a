//! Legacy default fabrication
//!
//! A newer model version sometimes changes the effective default of an
//! attribute. Peers on the older version still assume the old behavior, so
//! the transformed view pins the attribute to the legacy default whenever
//! the administrator never set it explicitly.

use downlevel_model::{ModelValue, PathAddress, Resource};

use crate::context::{Diagnostic, TransformationContext};
use crate::error::TransformError;
use crate::step::TransformStep;

/// Forces an attribute to a fixed legacy default when it was never set
///
/// Resource direction only; operations toward a legacy peer already carry
/// the parameters the caller chose. Idempotent by construction: once the
/// default is in place the attribute is defined and left alone.
///
/// A chain visits every node of its subtree, so a default meant for one
/// resource type should be scoped with [`at`](Self::at); the unscoped form
/// fabricates the attribute on every node the chain reaches.
#[derive(Debug, Clone)]
pub struct ApplyLegacyDefault {
    attribute: String,
    value: ModelValue,
    at: Option<PathAddress>,
}

impl ApplyLegacyDefault {
    /// Create a step pinning `attribute` to `value` at every visited node
    pub fn new(attribute: impl Into<String>, value: impl Into<ModelValue>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
            at: None,
        }
    }

    /// Create a step scoped to nodes matching an address pattern
    ///
    /// The pattern may contain wildcard elements.
    pub fn at(
        pattern: PathAddress,
        attribute: impl Into<String>,
        value: impl Into<ModelValue>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
            at: Some(pattern),
        }
    }

    /// The pinned attribute name
    #[inline]
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The legacy default value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &ModelValue {
        &self.value
    }
}

impl TransformStep for ApplyLegacyDefault {
    fn transform_resource(
        &self,
        ctx: &mut TransformationContext<'_>,
        address: &PathAddress,
        resource: &mut Resource,
    ) -> Result<(), TransformError> {
        if self.at.as_ref().is_some_and(|pattern| !pattern.matches(address)) {
            return Ok(());
        }
        if !resource.has_defined(&self.attribute) {
            resource.set_attribute(self.attribute.clone(), self.value.clone());
            ctx.record(Diagnostic::DefaultApplied {
                address: address.clone(),
                attribute: self.attribute.clone(),
            });
        }
        Ok(())
    }
}
