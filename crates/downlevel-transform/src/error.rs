//! Error types for the transformation pipeline
//!
//! Rejections are fatal to the enclosing operation and carry the offending
//! attribute and address verbatim. Registration errors are programming
//! errors surfaced at startup; they are never produced at transform time.

use downlevel_model::{ModelVersion, PathAddress};

/// Failure of one transform invocation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    /// A value the target version cannot understand was found
    ///
    /// Aborts the whole transformation for that resource or operation;
    /// there is no partial application of a chain.
    #[error("attribute '{attribute}' at {address} carries a value the target version cannot understand")]
    RejectedValue {
        /// The offending attribute name
        attribute: String,
        /// Address of the resource or operation target
        address: PathAddress,
    },
}

/// Failure to build a transformer registry
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistrationError {
    /// Two chains registered for the same (pattern, version) pair
    #[error("transformer chain already registered for {pattern} at version {version}")]
    DuplicateRegistration {
        /// The address pattern registered twice
        pattern: PathAddress,
        /// The model version registered twice
        version: ModelVersion,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_value_names_attribute_and_path() {
        let error = TransformError::RejectedValue {
            attribute: "store-path".to_string(),
            address: "/subsystem=store".parse().unwrap(),
        };
        let rendered = error.to_string();
        assert!(rendered.contains("store-path"));
        assert!(rendered.contains("/subsystem=store"));
    }

    #[test]
    fn duplicate_registration_names_pattern_and_version() {
        let error = RegistrationError::DuplicateRegistration {
            pattern: "/subsystem=store".parse().unwrap(),
            version: ModelVersion::new(1, 1, 0),
        };
        assert!(error.to_string().contains("1.1.0"));
    }
}
