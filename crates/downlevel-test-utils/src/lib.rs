//! Testing utilities for the downlevel workspace
//!
//! Shared fixtures modeling a small "store" subsystem: its attribute
//! declarations across schema generations, sample trees and operations.

#![allow(missing_docs)]

use downlevel_model::{
    AttributeDefinition, Expression, ModelValue, Operation, PathAddress, PathElement, Resource,
    ValueKind,
};

/// Attributes present since schema 1.1.x.
pub const BASE_ATTRIBUTES: [&str; 3] = ["store-path", "relative-to", "mode"];

/// Attributes introduced by schema 1.2.0; unknown to 1.1.x peers.
pub const ADDED_IN_1_2: [&str; 4] = [
    "use-journal-store",
    "journal-datasource",
    "journal-relative-to",
    "instance-uuid",
];

pub fn element(key: &str, value: &str) -> PathElement {
    PathElement::new(key, value).unwrap()
}

pub fn address(s: &str) -> PathAddress {
    s.parse().unwrap()
}

pub fn store_address() -> PathAddress {
    address("/subsystem=store")
}

/// Declarations for the current (1.2.0) store schema.
pub fn store_definitions() -> Vec<AttributeDefinition> {
    vec![
        AttributeDefinition::builder("store-path", ValueKind::String)
            .allow_expression(true)
            .nillable(true)
            .restart_required(true)
            .build(),
        AttributeDefinition::builder("relative-to", ValueKind::String)
            .nillable(true)
            .restart_required(true)
            .build(),
        AttributeDefinition::builder("mode", ValueKind::String)
            .default_value("journal")
            .build(),
        AttributeDefinition::builder("use-journal-store", ValueKind::Boolean)
            .nillable(true)
            .default_value(false)
            .build(),
        AttributeDefinition::builder("journal-datasource", ValueKind::String)
            .nillable(true)
            .build(),
        AttributeDefinition::builder("journal-relative-to", ValueKind::String)
            .nillable(true)
            .build(),
        AttributeDefinition::builder("instance-uuid", ValueKind::Boolean)
            .nillable(true)
            .default_value(false)
            .build(),
    ]
}

/// A store subsystem node as an administrator typically configures it.
pub fn store_resource() -> Resource {
    Resource::new()
        .with_attribute("store-path", Expression::new("${server.data.dir}/store"))
        .with_attribute("relative-to", ModelValue::Undefined)
        .with_attribute("mode", "journal")
        .with_attribute("use-journal-store", false)
        .with_attribute("journal-datasource", ModelValue::Undefined)
}

/// A store subsystem node with only static, pre-1.2 content.
pub fn legacy_store_resource() -> Resource {
    Resource::new()
        .with_attribute("store-path", "data/store")
        .with_attribute("mode", "journal")
}

/// A root tree holding the store subsystem and two journal children.
pub fn store_tree() -> Resource {
    Resource::new().with_child(
        element("subsystem", "store"),
        store_resource()
            .with_child(
                element("journal", "main"),
                Resource::new().with_attribute("journal-path", "data/journal"),
            )
            .with_child(
                element("journal", "audit"),
                Resource::new().with_attribute("journal-path", "data/audit"),
            ),
    )
}

/// An `add` carrying the same parameters as [`store_resource`].
pub fn add_store_operation() -> Operation {
    Operation::add(store_address())
        .with_param("store-path", Expression::new("${server.data.dir}/store"))
        .with_param("relative-to", ModelValue::Undefined)
        .with_param("mode", "journal")
        .with_param("use-journal-store", false)
}
