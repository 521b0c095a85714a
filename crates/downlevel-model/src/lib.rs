//! Downlevel Model
//!
//! Addressed, typed management model tree and the operations applied to it.
//!
//! # Core Concepts
//!
//! - [`PathAddress`]: ordered `key=value` sequence locating a [`Resource`]
//! - [`Resource`]: a tree node owning an attribute model and named children
//! - [`ModelValue`]: tagged attribute value, including the unresolved
//!   [`Expression`] variant older protocol versions cannot carry
//! - [`Operation`]: an addressed request with a name and parameter model
//! - [`ModelVersion`]: totally ordered (major, minor, micro) triple
//! - [`AttributeDefinition`]: declaration surface supplied by the external
//!   schema layer
//!
//! # Example
//!
//! ```rust
//! use downlevel_model::{Expression, PathAddress, PathElement, Resource};
//!
//! let store = Resource::new()
//!     .with_attribute("store-path", Expression::new("${data.dir}/store"))
//!     .with_attribute("use-journal-store", false);
//! let root = Resource::new()
//!     .with_child(PathElement::new("subsystem", "store")?, store);
//!
//! let address: PathAddress = "/subsystem=store".parse()?;
//! assert!(root.navigate(&address).is_some());
//! # Ok::<(), downlevel_model::PathError>(())
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod operation;
mod path;
mod resource;
mod schema;
mod value;
mod version;

pub use operation::{
    Operation, ADD, NAME, REMOVE, UNDEFINE_ATTRIBUTE, VALUE, WRITE_ATTRIBUTE,
};
pub use path::{PathAddress, PathElement, PathError, WILDCARD};
pub use resource::Resource;
pub use schema::{expression_forbidden, AttributeDefinition, AttributeDefinitionBuilder};
pub use value::{Expression, ModelValue, ValueKind};
pub use version::{ModelVersion, VersionError};
