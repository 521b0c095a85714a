//! Discarding transformer primitives
//!
//! Discards silently remove attributes a target version does not know
//! about. They never fail: a missing attribute is a no-op, and removing an
//! already-removed attribute changes nothing, which is what makes the
//! resource contract idempotent.

use std::fmt;
use std::sync::Arc;

use downlevel_model::{ModelValue, Operation, PathAddress, Resource, WRITE_ATTRIBUTE};

use crate::context::{Diagnostic, TransformationContext};
use crate::error::TransformError;
use crate::step::{StepOutcome, TransformStep};

/// Approver callback deciding whether one governed attribute is discarded
///
/// Receives the attribute name, its current value and whether the enclosing
/// operation is a `write-attribute`.
pub type DiscardApprover = Arc<dyn Fn(&str, &ModelValue, bool) -> bool + Send + Sync>;

/// Removes governed attributes approved by a stored callback
///
/// Used to hide attributes unknown to older versions. The approver is fixed
/// at build time; the step itself is stateless afterwards.
#[derive(Clone)]
pub struct DiscardAttributes {
    attributes: Vec<String>,
    approver: DiscardApprover,
}

impl DiscardAttributes {
    /// Create a discard step with an explicit approver
    pub fn new(
        attributes: impl IntoIterator<Item = impl Into<String>>,
        approver: impl Fn(&str, &ModelValue, bool) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
            approver: Arc::new(approver),
        }
    }

    /// Create a discard step that unconditionally removes its attributes
    pub fn always(attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(attributes, |_, _, _| true)
    }

    /// Governed attribute names
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }
}

impl fmt::Debug for DiscardAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscardAttributes")
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl TransformStep for DiscardAttributes {
    fn transform_resource(
        &self,
        ctx: &mut TransformationContext<'_>,
        address: &PathAddress,
        resource: &mut Resource,
    ) -> Result<(), TransformError> {
        for name in &self.attributes {
            let approved = resource
                .attribute(name)
                .is_some_and(|value| (self.approver)(name, value, false));
            if approved {
                resource.remove_attribute(name);
                ctx.record(Diagnostic::AttributeDiscarded {
                    address: address.clone(),
                    attribute: name.clone(),
                });
            }
        }
        Ok(())
    }

    fn transform_operation(
        &self,
        ctx: &mut TransformationContext<'_>,
        operation: &mut Operation,
    ) -> Result<StepOutcome, TransformError> {
        let is_write = operation.name() == WRITE_ATTRIBUTE;
        for name in &self.attributes {
            let approved = operation
                .param(name)
                .is_some_and(|value| (self.approver)(name, value, is_write));
            if approved {
                operation.remove_param(name);
                ctx.record(Diagnostic::AttributeDiscarded {
                    address: operation.address().clone(),
                    attribute: name.clone(),
                });
            }
        }
        Ok(StepOutcome::Forward)
    }
}

/// Removes governed attributes that were never set
///
/// An older consumer rejects an explicit-but-empty attribute it does not
/// recognize, but silently tolerates its absence; defined values are left
/// untouched.
#[derive(Debug, Clone)]
pub struct DiscardUndefinedAttributes {
    attributes: Arc<[String]>,
}

impl DiscardUndefinedAttributes {
    /// Create a step governing the given attributes
    pub fn new(attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    /// Governed attribute names
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Sub-transformer for `write-attribute` operations
    ///
    /// Applies the same check to the single attribute being written instead
    /// of scanning the full parameter model: a write of an undefined value
    /// to a governed attribute is discarded as a whole operation.
    #[must_use]
    pub fn write_attribute_step(&self) -> DiscardUndefinedWrite {
        DiscardUndefinedWrite {
            attributes: Arc::clone(&self.attributes),
        }
    }

    /// Sub-transformer for `undefine-attribute` operations
    ///
    /// Undefining an attribute the target version does not know about is
    /// discarded as a whole operation.
    #[must_use]
    pub fn undefine_attribute_step(&self) -> DiscardUndefinedUndefine {
        DiscardUndefinedUndefine {
            attributes: Arc::clone(&self.attributes),
        }
    }
}

impl TransformStep for DiscardUndefinedAttributes {
    fn transform_resource(
        &self,
        ctx: &mut TransformationContext<'_>,
        address: &PathAddress,
        resource: &mut Resource,
    ) -> Result<(), TransformError> {
        for name in self.attributes.iter() {
            if resource.has_attribute(name) && !resource.has_defined(name) {
                resource.remove_attribute(name);
                ctx.record(Diagnostic::AttributeDiscarded {
                    address: address.clone(),
                    attribute: name.clone(),
                });
            }
        }
        Ok(())
    }

    fn transform_operation(
        &self,
        ctx: &mut TransformationContext<'_>,
        operation: &mut Operation,
    ) -> Result<StepOutcome, TransformError> {
        for name in self.attributes.iter() {
            let undefined = operation
                .param(name)
                .is_some_and(|value| !value.is_defined());
            if undefined {
                operation.remove_param(name);
                ctx.record(Diagnostic::AttributeDiscarded {
                    address: operation.address().clone(),
                    attribute: name.clone(),
                });
            }
        }
        Ok(StepOutcome::Forward)
    }
}

/// `write-attribute` sub-transformer of [`DiscardUndefinedAttributes`]
#[derive(Debug, Clone)]
pub struct DiscardUndefinedWrite {
    attributes: Arc<[String]>,
}

impl TransformStep for DiscardUndefinedWrite {
    fn transform_operation(
        &self,
        _ctx: &mut TransformationContext<'_>,
        operation: &mut Operation,
    ) -> Result<StepOutcome, TransformError> {
        let governed = operation
            .attribute_name()
            .is_some_and(|name| self.attributes.iter().any(|attribute| attribute == name));
        if governed {
            let defined = operation
                .attribute_value()
                .is_some_and(ModelValue::is_defined);
            if !defined {
                return Ok(StepOutcome::Discard);
            }
        }
        Ok(StepOutcome::Forward)
    }
}

/// `undefine-attribute` sub-transformer of [`DiscardUndefinedAttributes`]
#[derive(Debug, Clone)]
pub struct DiscardUndefinedUndefine {
    attributes: Arc<[String]>,
}

impl TransformStep for DiscardUndefinedUndefine {
    fn transform_operation(
        &self,
        _ctx: &mut TransformationContext<'_>,
        operation: &mut Operation,
    ) -> Result<StepOutcome, TransformError> {
        let governed = operation
            .attribute_name()
            .is_some_and(|name| self.attributes.iter().any(|attribute| attribute == name));
        if governed {
            return Ok(StepOutcome::Discard);
        }
        Ok(StepOutcome::Forward)
    }
}

/// Removes a feature's attributes when its trigger attribute is off
///
/// Reads one attribute's resolved value from the model being transformed,
/// falling back to the live snapshot for operations that do not carry it.
/// When it equals the expected value (or is undefined, if configured), the
/// whole governed set is dropped.
#[derive(Debug, Clone)]
pub struct TriggeredDiscard {
    trigger: String,
    expected: ModelValue,
    discard_if_undefined: bool,
    attributes: Vec<String>,
}

impl TriggeredDiscard {
    /// Create a triggered discard
    pub fn new(
        trigger: impl Into<String>,
        expected: impl Into<ModelValue>,
        discard_if_undefined: bool,
        attributes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            expected: expected.into(),
            discard_if_undefined,
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    fn approves(&self, value: Option<&ModelValue>) -> bool {
        match value {
            None | Some(ModelValue::Undefined) => self.discard_if_undefined,
            Some(value) => *value == self.expected,
        }
    }
}

impl TransformStep for TriggeredDiscard {
    fn transform_resource(
        &self,
        ctx: &mut TransformationContext<'_>,
        address: &PathAddress,
        resource: &mut Resource,
    ) -> Result<(), TransformError> {
        if !self.approves(resource.attribute(&self.trigger)) {
            return Ok(());
        }
        for name in &self.attributes {
            if resource.remove_attribute(name).is_some() {
                ctx.record(Diagnostic::AttributeDiscarded {
                    address: address.clone(),
                    attribute: name.clone(),
                });
            }
        }
        Ok(())
    }

    fn transform_operation(
        &self,
        ctx: &mut TransformationContext<'_>,
        operation: &mut Operation,
    ) -> Result<StepOutcome, TransformError> {
        let trigger = operation.param(&self.trigger).cloned().or_else(|| {
            ctx.read_resource(operation.address())
                .and_then(|resource| resource.attribute(&self.trigger))
                .cloned()
        });
        if !self.approves(trigger.as_ref()) {
            return Ok(StepOutcome::Forward);
        }
        for name in &self.attributes {
            if operation.remove_param(name).is_some() {
                ctx.record(Diagnostic::AttributeDiscarded {
                    address: operation.address().clone(),
                    attribute: name.clone(),
                });
            }
        }
        Ok(StepOutcome::Forward)
    }
}
