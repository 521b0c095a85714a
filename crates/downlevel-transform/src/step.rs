//! The transform step capability
//!
//! One [`TransformStep`] covers both directions a chain runs in: rewriting
//! a resource node and rewriting an operation. Primitives and custom
//! entries all implement this trait; chains hold ordered lists of it rather
//! than a subclass tree.

use downlevel_model::{ModelValue, Operation, PathAddress, Resource};

use crate::context::TransformationContext;
use crate::error::TransformError;

/// What a step decided about an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Keep going; the (possibly rewritten) operation is still forwarded
    Forward,
    /// Drop the whole operation; remaining entries are skipped
    Discard,
}

impl StepOutcome {
    /// Check if the operation was dropped
    #[inline]
    #[must_use]
    pub fn is_discard(self) -> bool {
        matches!(self, Self::Discard)
    }
}

/// One entry of a transformer chain
///
/// # Contract
/// Transforming a resource must be idempotent: applying the same step twice
/// to an already-transformed resource yields no further change. A step must
/// never mutate anything outside the resource/operation passed in; the only
/// shared state it may touch is read access through the context.
pub trait TransformStep: Send + Sync + std::fmt::Debug {
    /// Rewrite one resource node in place
    ///
    /// `address` is the node's absolute address. The default implementation
    /// leaves the resource untouched.
    ///
    /// # Errors
    /// Returns [`TransformError::RejectedValue`] when the node carries a
    /// value the target version cannot accept.
    fn transform_resource(
        &self,
        ctx: &mut TransformationContext<'_>,
        address: &PathAddress,
        resource: &mut Resource,
    ) -> Result<(), TransformError> {
        let _ = (ctx, address, resource);
        Ok(())
    }

    /// Rewrite one operation in place, or drop it
    ///
    /// The default implementation forwards the operation unchanged.
    ///
    /// # Errors
    /// Returns [`TransformError::RejectedValue`] when a parameter carries a
    /// value the target version cannot accept.
    fn transform_operation(
        &self,
        ctx: &mut TransformationContext<'_>,
        operation: &mut Operation,
    ) -> Result<StepOutcome, TransformError> {
        let _ = (ctx, operation);
        Ok(StepOutcome::Forward)
    }

    /// Rewrite an operation's response model in place
    ///
    /// Responses are advisory toward the peer, so rewriting never fails;
    /// the default implementation is a no-op.
    fn transform_response(&self, ctx: &mut TransformationContext<'_>, response: &mut ModelValue) {
        let _ = (ctx, response);
    }
}

/// Wrap a step as a shareable chain entry
///
/// Chains hold `Arc<dyn TransformStep>` so one step instance can appear in
/// several chains; this is the coercion point.
#[must_use]
pub fn step(entry: impl TransformStep + 'static) -> std::sync::Arc<dyn TransformStep> {
    std::sync::Arc::new(entry)
}

/// Check whether a value is, or contains, an unresolved expression
///
/// Recurses into lists and objects so that nested placeholders are treated
/// the same as top-level ones.
#[must_use]
pub fn contains_expression(value: &ModelValue) -> bool {
    match value {
        ModelValue::Expression(_) => true,
        ModelValue::List(values) => values.iter().any(contains_expression),
        ModelValue::Object(entries) => entries.values().any(contains_expression),
        _ => false,
    }
}
