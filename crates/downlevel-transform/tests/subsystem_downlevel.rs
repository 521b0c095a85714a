//! End-to-end downlevel transformation of a store subsystem
//!
//! Builds the registry the way a subsystem initializes it: one chain per
//! supported legacy version, operation chains keyed by name, and exercises
//! resources and operations flowing toward older peers.

use downlevel_model::{
    Expression, ModelValue, ModelVersion, Operation, Resource, ADD, UNDEFINE_ATTRIBUTE,
    WRITE_ATTRIBUTE,
};
use downlevel_test_utils::{add_store_operation, legacy_store_resource, store_address, store_tree};
use downlevel_transform::{
    step, ApplyLegacyDefault, Diagnostic, DiscardUndefinedAttributes, OperationTransformerChain,
    RejectExpressionValues, ResourceTransformerChain, TransformError, TransformationContext,
    TransformStep, TransformerRegistry, TriggeredDiscard,
};

const V110: ModelVersion = ModelVersion::new(1, 1, 0);
const V111: ModelVersion = ModelVersion::new(1, 1, 1);

const JOURNAL_ATTRIBUTES: [&str; 3] = [
    "use-journal-store",
    "journal-datasource",
    "journal-relative-to",
];

/// Chains registered for the 1.1.x generations, as the subsystem would do
/// at initialization.
fn build_registry() -> TransformerRegistry {
    let journal_off = TriggeredDiscard::new("use-journal-store", false, true, JOURNAL_ATTRIBUTES);
    let discard_undefined = DiscardUndefinedAttributes::new(JOURNAL_ATTRIBUTES);
    let uuid_default = ApplyLegacyDefault::at(store_address(), "instance-uuid", false);
    let reject = RejectExpressionValues::new(["store-path", "relative-to", "mode"]);

    let mut builder = TransformerRegistry::builder();

    // 1.1.1: drop the journal feature when unused, fabricate the uuid flag.
    builder
        .register(
            store_address(),
            V111,
            ResourceTransformerChain::new([
                step(journal_off.clone()),
                step(discard_undefined.clone()),
                step(uuid_default.clone()),
            ]),
        )
        .operation_transformer(
            ADD,
            OperationTransformerChain::new([
                step(journal_off.clone()),
                step(discard_undefined.clone()),
            ]),
        )
        .operation_transformer(
            WRITE_ATTRIBUTE,
            OperationTransformerChain::new([step(discard_undefined.write_attribute_step())]),
        )
        .operation_transformer(
            UNDEFINE_ATTRIBUTE,
            OperationTransformerChain::new([step(discard_undefined.undefine_attribute_step())]),
        );

    // 1.1.0: additionally reject expressions; discards run first so removed
    // attributes never reach the reject check.
    builder
        .register(
            store_address(),
            V110,
            ResourceTransformerChain::new([
                step(journal_off.clone()),
                step(discard_undefined.clone()),
                step(reject.clone()),
                step(uuid_default),
            ]),
        )
        .operation_transformer(
            ADD,
            OperationTransformerChain::new([
                step(journal_off),
                step(discard_undefined.clone()),
                step(reject.clone()),
            ]),
        )
        .operation_transformer(
            WRITE_ATTRIBUTE,
            OperationTransformerChain::new([
                step(discard_undefined.write_attribute_step()),
                step(reject.write_attribute_step()),
            ]),
        )
        .operation_transformer(
            UNDEFINE_ATTRIBUTE,
            OperationTransformerChain::new([step(discard_undefined.undefine_attribute_step())]),
        );

    builder.build().unwrap()
}

fn store_subtree() -> Resource {
    store_tree().navigate(&store_address()).unwrap().clone()
}

#[test]
fn to_1_1_1_discards_unused_journal_and_fabricates_uuid() {
    let registry = build_registry();
    let result = registry
        .transform_resource(V111, &store_address(), &store_subtree())
        .unwrap();

    let transformed = &result.resource;
    // The journal feature is off, so every attribute it owns is hidden.
    for attribute in JOURNAL_ATTRIBUTES {
        assert!(!transformed.has_attribute(attribute), "{attribute} should be gone");
    }
    // 1.1.1 still understands expressions; the path stays as configured.
    assert!(transformed.attribute("store-path").unwrap().is_expression());
    // The legacy peer assumes the old uuid behavior.
    assert_eq!(
        transformed.attribute("instance-uuid"),
        Some(&ModelValue::Boolean(false))
    );
    // Children pass through untouched by these chains; the uuid default is
    // scoped to the subsystem node.
    assert_eq!(transformed.children().count(), 2);
    for (_, child) in transformed.children() {
        assert!(!child.has_attribute("instance-uuid"));
    }

    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::DefaultApplied { attribute, .. } if attribute == "instance-uuid")));
}

#[test]
fn to_1_1_0_rejects_the_expression_path() {
    let registry = build_registry();
    let error = registry
        .transform_resource(V110, &store_address(), &store_subtree())
        .unwrap_err();

    // The journal discard ran first, but store-path is disjoint from it and
    // independently rejected.
    assert_eq!(
        error,
        TransformError::RejectedValue {
            attribute: "store-path".to_string(),
            address: store_address(),
        }
    );
}

#[test]
fn discard_and_reject_on_disjoint_attributes_do_not_interfere() {
    let resource = Resource::new()
        .with_attribute("store-path", Expression::new("${server.data.dir}/store"))
        .with_attribute("relative-to", ModelValue::Undefined)
        .with_attribute("use-journal-store", false);

    let journal_off =
        TriggeredDiscard::new("use-journal-store", false, true, ["use-journal-store"]);
    let reject = RejectExpressionValues::new(["store-path"]);

    for chain in [
        ResourceTransformerChain::new([step(reject.clone()), step(journal_off.clone())]),
        ResourceTransformerChain::new([step(journal_off), step(reject)]),
    ] {
        let snapshot = resource.clone();
        let mut ctx = TransformationContext::new(V110, store_address(), &snapshot);
        let mut working = resource.clone();
        let error = chain
            .transform(&mut ctx, &store_address(), &mut working)
            .unwrap_err();
        assert!(
            matches!(error, TransformError::RejectedValue { ref attribute, .. } if attribute == "store-path")
        );
    }
}

#[test]
fn static_legacy_content_passes_to_1_1_0() {
    let registry = build_registry();
    let result = registry
        .transform_resource(V110, &store_address(), &legacy_store_resource())
        .unwrap();

    assert_eq!(
        result.resource.attribute("store-path"),
        Some(&ModelValue::from("data/store"))
    );
    assert_eq!(
        result.resource.attribute("instance-uuid"),
        Some(&ModelValue::Boolean(false))
    );
}

#[test]
fn peer_between_registrations_gets_the_newest_applicable_chain() {
    // 1.1.2 is not registered; the 1.1.1 chain is the newest one <= peer,
    // so expressions survive and only the journal feature is hidden.
    let registry = build_registry();
    let result = registry
        .transform_resource(ModelVersion::new(1, 1, 2), &store_address(), &store_subtree())
        .unwrap();
    assert!(result.resource.attribute("store-path").unwrap().is_expression());
    assert!(!result.resource.has_attribute("journal-datasource"));
}

#[test]
fn peer_older_than_all_registrations_passes_through() {
    let registry = build_registry();
    let original = store_subtree();
    let result = registry
        .transform_resource(ModelVersion::new(1, 0, 0), &store_address(), &original)
        .unwrap();
    assert_eq!(result.resource, original);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn add_with_expression_is_rejected_toward_1_1_0() {
    let registry = build_registry();
    let error = registry
        .transform_operation(V110, &add_store_operation(), &store_tree())
        .unwrap_err();
    assert!(matches!(
        error,
        TransformError::RejectedValue { ref attribute, .. } if attribute == "store-path"
    ));
}

#[test]
fn add_with_static_values_is_stripped_toward_1_1_1() {
    let registry = build_registry();
    let operation = Operation::add(store_address())
        .with_param("store-path", "data/store")
        .with_param("use-journal-store", false)
        .with_param("journal-datasource", "ds1");

    let result = registry
        .transform_operation(V111, &operation, &store_tree())
        .unwrap();
    let forwarded = result.operation.unwrap();

    assert!(forwarded.param("journal-datasource").is_none());
    assert!(forwarded.param("use-journal-store").is_none());
    assert_eq!(forwarded.param("store-path"), Some(&ModelValue::from("data/store")));
}

#[test]
fn write_of_undefined_journal_attribute_is_discarded() {
    let registry = build_registry();
    let operation = Operation::write_attribute(
        store_address(),
        "journal-datasource",
        ModelValue::Undefined,
    );

    let result = registry
        .transform_operation(V111, &operation, &store_tree())
        .unwrap();
    assert!(result.is_discarded());
    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::OperationDiscarded { operation, .. } if operation == WRITE_ATTRIBUTE)));
}

#[test]
fn undefine_of_journal_attribute_is_discarded_but_base_forwards() {
    let registry = build_registry();

    let governed = Operation::undefine_attribute(store_address(), "journal-datasource");
    let result = registry
        .transform_operation(V110, &governed, &store_tree())
        .unwrap();
    assert!(result.is_discarded());

    let base = Operation::undefine_attribute(store_address(), "mode");
    let result = registry.transform_operation(V110, &base, &store_tree()).unwrap();
    assert!(!result.is_discarded());
}

#[test]
fn response_models_are_rewritten_for_legacy_peers() {
    // A custom step masks a 1.2-only field from a read response.
    #[derive(Debug)]
    struct MaskInstanceUuid;

    impl TransformStep for MaskInstanceUuid {
        fn transform_response(
            &self,
            _ctx: &mut TransformationContext<'_>,
            response: &mut ModelValue,
        ) {
            if let ModelValue::Object(entries) = response {
                entries.shift_remove("instance-uuid");
            }
        }
    }

    let mut builder = TransformerRegistry::builder();
    builder
        .register(store_address(), V111, ResourceTransformerChain::default())
        .operation_transformer(
            "read-store-state",
            OperationTransformerChain::new([step(MaskInstanceUuid)]),
        );
    let registry = builder.build().unwrap();

    let operation = Operation::new("read-store-state", store_address());
    let mut entries = indexmap::IndexMap::new();
    entries.insert("instance-uuid".to_string(), ModelValue::from("generated"));
    entries.insert("mode".to_string(), ModelValue::from("journal"));
    let mut response = ModelValue::Object(entries);

    registry.transform_response(V111, &operation, &mut response, &store_tree());
    let object = response.as_object().unwrap();
    assert!(!object.contains_key("instance-uuid"));
    assert!(object.contains_key("mode"));
}

#[test]
fn operation_outcome_is_forward_when_nothing_matches() {
    let registry = build_registry();
    let custom = Operation::new("resolve-store-path", store_address());
    let result = registry
        .transform_operation(V110, &custom, &store_tree())
        .unwrap();
    assert_eq!(result.operation.as_ref().map(Operation::name), Some("resolve-store-path"));
}
