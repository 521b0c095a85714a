//! Rejecting transformer primitive
//!
//! Older protocol versions can only carry resolved, static values. Where a
//! governed attribute holds an unresolved expression, the whole
//! transformation fails; this primitive never silently discards.

use std::sync::Arc;

use downlevel_model::{AttributeDefinition, Operation, PathAddress, Resource};

use crate::context::TransformationContext;
use crate::error::TransformError;
use crate::step::{contains_expression, StepOutcome, TransformStep};

/// Fails the transformation when a governed attribute holds an expression
#[derive(Debug, Clone)]
pub struct RejectExpressionValues {
    attributes: Arc<[String]>,
}

impl RejectExpressionValues {
    /// Create a reject step governing the given attributes
    pub fn new(attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a reject step from schema declarations
    ///
    /// Only definitions that forbid expressions are governed; an attribute
    /// declared expression-capable is a concern for the peer, not for this
    /// step.
    pub fn for_definitions<'a>(
        definitions: impl IntoIterator<Item = &'a AttributeDefinition>,
    ) -> Self {
        Self::new(downlevel_model::expression_forbidden(definitions))
    }

    /// Governed attribute names
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Sub-transformer for `write-attribute` operations
    ///
    /// Checks the single value being written rather than scanning the full
    /// parameter model.
    #[must_use]
    pub fn write_attribute_step(&self) -> RejectExpressionWrite {
        RejectExpressionWrite {
            attributes: Arc::clone(&self.attributes),
        }
    }

    /// Sub-transformer for `undefine-attribute` operations
    ///
    /// An undefine carries no value, so there is nothing to check; the step
    /// exists so registrations stay symmetric per operation name.
    #[must_use]
    pub fn undefine_attribute_step(&self) -> RejectExpressionUndefine {
        RejectExpressionUndefine
    }
}

impl TransformStep for RejectExpressionValues {
    fn transform_resource(
        &self,
        _ctx: &mut TransformationContext<'_>,
        address: &PathAddress,
        resource: &mut Resource,
    ) -> Result<(), TransformError> {
        for name in self.attributes.iter() {
            if resource.attribute(name).is_some_and(contains_expression) {
                return Err(TransformError::RejectedValue {
                    attribute: name.clone(),
                    address: address.clone(),
                });
            }
        }
        Ok(())
    }

    fn transform_operation(
        &self,
        _ctx: &mut TransformationContext<'_>,
        operation: &mut Operation,
    ) -> Result<StepOutcome, TransformError> {
        for name in self.attributes.iter() {
            if operation.param(name).is_some_and(contains_expression) {
                return Err(TransformError::RejectedValue {
                    attribute: name.clone(),
                    address: operation.address().clone(),
                });
            }
        }
        Ok(StepOutcome::Forward)
    }
}

/// `write-attribute` sub-transformer of [`RejectExpressionValues`]
#[derive(Debug, Clone)]
pub struct RejectExpressionWrite {
    attributes: Arc<[String]>,
}

impl TransformStep for RejectExpressionWrite {
    fn transform_operation(
        &self,
        _ctx: &mut TransformationContext<'_>,
        operation: &mut Operation,
    ) -> Result<StepOutcome, TransformError> {
        if let Some(name) = operation.attribute_name() {
            if self.attributes.iter().any(|attribute| attribute == name)
                && operation.attribute_value().is_some_and(contains_expression)
            {
                return Err(TransformError::RejectedValue {
                    attribute: name.to_string(),
                    address: operation.address().clone(),
                });
            }
        }
        Ok(StepOutcome::Forward)
    }
}

/// `undefine-attribute` sub-transformer of [`RejectExpressionValues`]
#[derive(Debug, Clone, Copy)]
pub struct RejectExpressionUndefine;

impl TransformStep for RejectExpressionUndefine {}
