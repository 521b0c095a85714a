//! Chain composition of transformer steps
//!
//! A chain holds an ordered list of [`TransformStep`] entries and applies
//! them as a single pass per direction. Ordering is significant and is the
//! integration author's responsibility: discard-before-reject is the common
//! pattern, so attributes removed by policy never trigger a downstream
//! reject check.

use std::sync::Arc;

use downlevel_model::{ModelValue, Operation, PathAddress, Resource};

use crate::context::{Diagnostic, TransformationContext};
use crate::error::TransformError;
use crate::step::{StepOutcome, TransformStep};

/// Ordered entries applied to every node of a resource subtree
///
/// Entries run against the same working node before recursion continues
/// depth-first, pre-order (parent before children), so a parent-level
/// discard prunes recursion into children that would otherwise be
/// individually rejected. The first failure aborts the whole pass.
#[derive(Debug, Clone, Default)]
pub struct ResourceTransformerChain {
    entries: Vec<Arc<dyn TransformStep>>,
}

impl ResourceTransformerChain {
    /// Create a chain from ordered entries
    pub fn new(entries: impl IntoIterator<Item = Arc<dyn TransformStep>>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the chain has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Transform the subtree rooted at `resource`, in place
    ///
    /// `address` is the absolute address of the subtree root.
    ///
    /// # Errors
    /// Propagates the first entry failure unchanged; the working resource
    /// is in an unspecified intermediate state afterwards and must be
    /// dropped by the caller.
    pub fn transform(
        &self,
        ctx: &mut TransformationContext<'_>,
        address: &PathAddress,
        resource: &mut Resource,
    ) -> Result<(), TransformError> {
        for entry in &self.entries {
            entry.transform_resource(ctx, address, resource)?;
        }
        // Entries may have pruned children; iterate what is left.
        for element in resource.child_elements() {
            if let Some(child) = resource.child_mut(&element) {
                let child_address = address.child(element.clone());
                self.transform(ctx, &child_address, child)?;
            }
        }
        Ok(())
    }
}

impl FromIterator<Arc<dyn TransformStep>> for ResourceTransformerChain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn TransformStep>>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Ordered entries applied to one operation
///
/// Stops at the first entry that discards the operation or fails; a
/// discarded operation is dropped rather than forwarded, which is a
/// successful outcome.
#[derive(Debug, Clone, Default)]
pub struct OperationTransformerChain {
    entries: Vec<Arc<dyn TransformStep>>,
}

impl OperationTransformerChain {
    /// Create a chain from ordered entries
    pub fn new(entries: impl IntoIterator<Item = Arc<dyn TransformStep>>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the chain has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Transform one operation in place
    ///
    /// # Errors
    /// Propagates the first entry failure unchanged.
    pub fn transform(
        &self,
        ctx: &mut TransformationContext<'_>,
        operation: &mut Operation,
    ) -> Result<StepOutcome, TransformError> {
        for entry in &self.entries {
            if entry.transform_operation(ctx, operation)?.is_discard() {
                ctx.record(Diagnostic::OperationDiscarded {
                    address: operation.address().clone(),
                    operation: operation.name().to_string(),
                });
                return Ok(StepOutcome::Discard);
            }
        }
        Ok(StepOutcome::Forward)
    }

    /// Rewrite an operation's response model through every entry, in order
    pub fn transform_response(
        &self,
        ctx: &mut TransformationContext<'_>,
        response: &mut ModelValue,
    ) {
        for entry in &self.entries {
            entry.transform_response(ctx, response);
        }
    }
}

impl FromIterator<Arc<dyn TransformStep>> for OperationTransformerChain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn TransformStep>>>(iter: I) -> Self {
        Self::new(iter)
    }
}
