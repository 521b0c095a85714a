//! Per-invocation transformation state
//!
//! A [`TransformationContext`] is created for one top-level transform
//! invocation and threaded through every chain entry: it carries the
//! negotiated target version, read access to a stable snapshot of the live
//! tree for cross-attribute decisions, and the accumulated diagnostics.

use std::fmt::{self, Display, Formatter};

use downlevel_model::{ModelVersion, PathAddress, Resource};

/// A record of something a chain silently changed or dropped
///
/// Diagnostics are local and non-fatal; rejections travel as errors instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// An attribute was removed from a resource or operation model
    AttributeDiscarded {
        /// Address of the affected resource or operation target
        address: PathAddress,
        /// The removed attribute
        attribute: String,
    },
    /// A legacy default was fabricated for a never-set attribute
    DefaultApplied {
        /// Address of the affected resource
        address: PathAddress,
        /// The defaulted attribute
        attribute: String,
    },
    /// A whole operation was dropped rather than forwarded
    OperationDiscarded {
        /// Target address of the dropped operation
        address: PathAddress,
        /// Name of the dropped operation
        operation: String,
    },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttributeDiscarded { address, attribute } => {
                write!(f, "discarded attribute '{attribute}' at {address}")
            }
            Self::DefaultApplied { address, attribute } => {
                write!(f, "applied legacy default for '{attribute}' at {address}")
            }
            Self::OperationDiscarded { address, operation } => {
                write!(f, "discarded operation '{operation}' at {address}")
            }
        }
    }
}

/// Mutable state scoped to one top-level transform invocation
///
/// Grants read access (never write access) to sibling and ancestor state in
/// the live tree. The snapshot must be treated as a moment-in-time view for
/// the duration of one chain execution.
#[derive(Debug)]
pub struct TransformationContext<'a> {
    target_version: ModelVersion,
    base_address: PathAddress,
    snapshot: &'a Resource,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> TransformationContext<'a> {
    /// Create a context for one invocation
    ///
    /// `snapshot` is the untransformed tree rooted at `base_address`;
    /// [`read_resource`](Self::read_resource) resolves against it.
    #[must_use]
    pub fn new(
        target_version: ModelVersion,
        base_address: PathAddress,
        snapshot: &'a Resource,
    ) -> Self {
        Self {
            target_version,
            base_address,
            snapshot,
            diagnostics: Vec::new(),
        }
    }

    /// The negotiated target model version
    #[inline]
    #[must_use]
    pub fn target_version(&self) -> ModelVersion {
        self.target_version
    }

    /// Absolute address the snapshot is rooted at
    #[inline]
    #[must_use]
    pub fn base_address(&self) -> &PathAddress {
        &self.base_address
    }

    /// Read a resource from the snapshot by absolute address
    ///
    /// Returns `None` for addresses outside the snapshot's subtree. The
    /// returned resource reflects pre-transformation state.
    #[must_use]
    pub fn read_resource(&self, address: &PathAddress) -> Option<&'a Resource> {
        let relative = address.relative_to(&self.base_address).ok()?;
        self.snapshot.navigate(&relative)
    }

    /// Record a diagnostic
    pub fn record(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::DefaultApplied { address, attribute } => {
                tracing::warn!(%address, %attribute, "fabricating legacy default for target version");
            }
            other => tracing::debug!(diagnostic = %other, "transformation diagnostic"),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Diagnostics recorded so far
    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the context, returning its diagnostics
    #[inline]
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
