//! Downlevel Transform
//!
//! Version-compatibility transformer chains for hierarchical management
//! models. When a peer negotiates an older model version, every resource
//! and operation crossing that boundary is passed through the chain
//! registered for the peer's version: unknown attributes are discarded,
//! unresolvable values are rejected, and newer behavior changes are masked
//! with legacy defaults.
//!
//! # Core Concepts
//!
//! - [`TransformStep`]: the one capability primitives and custom entries
//!   implement
//! - [`DiscardAttributes`] / [`DiscardUndefinedAttributes`] /
//!   [`TriggeredDiscard`]: silent removal of version-unknown attributes
//! - [`RejectExpressionValues`]: fails the transformation on values a
//!   legacy peer cannot resolve
//! - [`ApplyLegacyDefault`]: pins never-set attributes to their old default
//! - [`ResourceTransformerChain`] / [`OperationTransformerChain`]: ordered
//!   single-pass composition with short-circuit failure
//! - [`TransformerRegistry`]: write-once mapping from (pattern, version) to
//!   chains, with pass-through as the forward-compatibility default
//!
//! # Example
//!
//! ```rust
//! use downlevel_model::{ModelVersion, Resource};
//! use downlevel_transform::{
//!     step, DiscardUndefinedAttributes, ResourceTransformerChain, TransformerRegistry,
//! };
//!
//! let mut builder = TransformerRegistry::builder();
//! builder.register(
//!     "/subsystem=store".parse()?,
//!     ModelVersion::new(1, 1, 0),
//!     ResourceTransformerChain::new([step(DiscardUndefinedAttributes::new(["journal-datasource"]))]),
//! );
//! let registry = builder.build()?;
//!
//! let store = Resource::new().with_attribute("mode", "journal");
//! let transformed =
//!     registry.transform_resource(ModelVersion::new(1, 1, 0), &"/subsystem=store".parse()?, &store)?;
//! assert_eq!(transformed.resource, store);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod chain;
mod context;
mod defaults;
mod discard;
mod error;
mod registry;
mod reject;
mod step;

pub use chain::{OperationTransformerChain, ResourceTransformerChain};
pub use context::{Diagnostic, TransformationContext};
pub use defaults::ApplyLegacyDefault;
pub use discard::{
    DiscardApprover, DiscardAttributes, DiscardUndefinedAttributes, DiscardUndefinedUndefine,
    DiscardUndefinedWrite, TriggeredDiscard,
};
pub use error::{RegistrationError, TransformError};
pub use registry::{
    ChainRegistration, OperationTransformation, ResourceTransformation, TransformerRegistry,
    TransformerRegistryBuilder,
};
pub use reject::{RejectExpressionUndefine, RejectExpressionValues, RejectExpressionWrite};
pub use step::{contains_expression, step, StepOutcome, TransformStep};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
