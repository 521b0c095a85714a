//! Version registry and dispatcher
//!
//! Components register, per historical model version they still support,
//! one resource chain and zero-or-more per-operation-name operation chains
//! under an address pattern. Registration is write-once at initialization;
//! the built registry is immutable and shared read-only across all
//! transform invocations.
//!
//! Dispatch favors forward compatibility: a version or path with no
//! registered chain passes through unchanged rather than failing.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use downlevel_model::{
    ModelValue, ModelVersion, Operation, PathAddress, PathElement, Resource,
};

use crate::chain::{OperationTransformerChain, ResourceTransformerChain};
use crate::context::{Diagnostic, TransformationContext};
use crate::error::{RegistrationError, TransformError};

/// Chains registered for one (pattern, version) pair
#[derive(Debug, Default)]
struct ChainSet {
    resource_chain: ResourceTransformerChain,
    operation_chains: IndexMap<String, OperationTransformerChain>,
}

/// One registration being assembled by the builder
///
/// Returned by [`TransformerRegistryBuilder::register`]; operation chains
/// and nested sub-resources are attached through it before the registry is
/// built.
#[derive(Debug)]
pub struct ChainRegistration {
    pattern: PathAddress,
    version: ModelVersion,
    resource_chain: ResourceTransformerChain,
    operation_chains: IndexMap<String, OperationTransformerChain>,
    children: Vec<ChainRegistration>,
}

impl ChainRegistration {
    fn new(
        pattern: PathAddress,
        version: ModelVersion,
        resource_chain: ResourceTransformerChain,
    ) -> Self {
        Self {
            pattern,
            version,
            resource_chain,
            operation_chains: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Attach an operation chain keyed by operation name
    ///
    /// An operation whose name has no chain here passes through this
    /// component unchanged.
    pub fn operation_transformer(
        &mut self,
        name: impl Into<String>,
        chain: OperationTransformerChain,
    ) -> &mut Self {
        self.operation_chains.insert(name.into(), chain);
        self
    }

    /// Nest a registration for a child resource type
    ///
    /// The child pattern extends this registration's pattern by `element`
    /// and shares its version.
    pub fn sub_resource(
        &mut self,
        element: PathElement,
        resource_chain: ResourceTransformerChain,
    ) -> &mut ChainRegistration {
        let pattern = self.pattern.child(element);
        let index = self.children.len();
        self.children
            .push(ChainRegistration::new(pattern, self.version, resource_chain));
        &mut self.children[index]
    }

    fn flatten_into(self, out: &mut Vec<(PathAddress, ModelVersion, ChainSet)>) {
        let Self {
            pattern,
            version,
            resource_chain,
            operation_chains,
            children,
        } = self;
        out.push((
            pattern,
            version,
            ChainSet {
                resource_chain,
                operation_chains,
            },
        ));
        for child in children {
            child.flatten_into(out);
        }
    }
}

/// Collects registrations before the registry becomes immutable
///
/// The registry state machine is write-once: UNINITIALIZED (this builder)
/// transitions to REGISTERED ([`TransformerRegistry`]) exactly once, and
/// there is no unregister transition.
#[derive(Debug, Default)]
pub struct TransformerRegistryBuilder {
    registrations: Vec<ChainRegistration>,
}

impl TransformerRegistryBuilder {
    /// Create an empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource chain for a pattern and version
    ///
    /// The pattern may contain wildcard elements for repeated sub-resource
    /// types. Returns the registration handle for attaching operation
    /// chains and sub-resources.
    pub fn register(
        &mut self,
        pattern: PathAddress,
        version: ModelVersion,
        resource_chain: ResourceTransformerChain,
    ) -> &mut ChainRegistration {
        tracing::debug!(%pattern, %version, "registering transformer chain");
        let index = self.registrations.len();
        self.registrations
            .push(ChainRegistration::new(pattern, version, resource_chain));
        &mut self.registrations[index]
    }

    /// Finish registration, producing the immutable registry
    ///
    /// # Errors
    /// Returns [`RegistrationError::DuplicateRegistration`] if two chains
    /// were registered for the same (pattern, version) pair. This is a
    /// programming error at initialization time, never recoverable at
    /// runtime.
    pub fn build(self) -> Result<TransformerRegistry, RegistrationError> {
        let mut flat = Vec::new();
        for registration in self.registrations {
            registration.flatten_into(&mut flat);
        }

        let mut entries: IndexMap<PathAddress, BTreeMap<ModelVersion, ChainSet>> = IndexMap::new();
        for (pattern, version, set) in flat {
            let versions = entries.entry(pattern.clone()).or_default();
            if versions.insert(version, set).is_some() {
                return Err(RegistrationError::DuplicateRegistration { pattern, version });
            }
        }
        Ok(TransformerRegistry { entries })
    }
}

/// Transformed view of one resource subtree
#[derive(Debug)]
pub struct ResourceTransformation {
    /// The rewritten subtree, ready for the target version
    pub resource: Resource,
    /// Diagnostics accumulated during the pass
    pub diagnostics: Vec<Diagnostic>,
}

/// Transformed view of one operation
#[derive(Debug)]
pub struct OperationTransformation {
    /// The rewritten operation, or `None` if a chain discarded it
    pub operation: Option<Operation>,
    /// Diagnostics accumulated during the pass
    pub diagnostics: Vec<Diagnostic>,
}

impl OperationTransformation {
    /// Check if the operation was dropped rather than forwarded
    #[inline]
    #[must_use]
    pub fn is_discarded(&self) -> bool {
        self.operation.is_none()
    }
}

/// Immutable mapping from (pattern, version) to pre-built chains
///
/// Built once at component initialization and safe for unsynchronized
/// concurrent reads; every transform invocation works on its own copy of
/// the data passed in.
#[derive(Debug)]
pub struct TransformerRegistry {
    entries: IndexMap<PathAddress, BTreeMap<ModelVersion, ChainSet>>,
}

impl TransformerRegistry {
    /// Start building a registry
    #[inline]
    #[must_use]
    pub fn builder() -> TransformerRegistryBuilder {
        TransformerRegistryBuilder::new()
    }

    /// Number of registered patterns
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if any chain would apply to `address` at `target`
    ///
    /// Lets a consumer that wants a hard failure for unknown versions probe
    /// before dispatching; the transform itself always passes through.
    #[must_use]
    pub fn covers(&self, target: ModelVersion, address: &PathAddress) -> bool {
        !self.covering_sets(target, address).is_empty()
    }

    /// Transform a resource subtree toward `target`
    ///
    /// `address` is the absolute address of `resource`, which doubles as
    /// the stable snapshot for cross-attribute reads. Chains registered at
    /// the address or an ancestor apply to the whole subtree first, in
    /// root-to-leaf pattern order; chains registered below it then apply at
    /// every matching descendant node.
    ///
    /// # Errors
    /// Returns [`TransformError::RejectedValue`] from the first failing
    /// chain entry; nothing of the partial pass is observable.
    pub fn transform_resource(
        &self,
        target: ModelVersion,
        address: &PathAddress,
        resource: &Resource,
    ) -> Result<ResourceTransformation, TransformError> {
        let covering = self.covering_sets(target, address);
        let descendants = self.descendant_entries(target, address);

        if covering.is_empty() && descendants.is_empty() {
            tracing::debug!(%address, %target, "no transformer registered; passing resource through");
            return Ok(ResourceTransformation {
                resource: resource.clone(),
                diagnostics: Vec::new(),
            });
        }

        let mut working = resource.clone();
        let mut ctx = TransformationContext::new(target, address.clone(), resource);

        for set in covering {
            set.resource_chain.transform(&mut ctx, address, &mut working)?;
        }

        for (pattern, set) in descendants {
            let remainder = &pattern.elements()[address.len()..];
            let mut nodes = Vec::new();
            collect_matching_nodes(
                &working,
                address,
                &PathAddress::root(),
                remainder,
                &mut nodes,
            );
            for (absolute, relative) in nodes {
                if let Some(node) = working.navigate_mut(&relative) {
                    set.resource_chain.transform(&mut ctx, &absolute, node)?;
                }
            }
        }

        Ok(ResourceTransformation {
            resource: working,
            diagnostics: ctx.into_diagnostics(),
        })
    }

    /// Transform an operation toward `target`
    ///
    /// `root` is the live tree the operation would be applied to, used as
    /// the snapshot for cross-attribute reads. Chains registered at the
    /// operation's address or an ancestor apply in root-to-leaf pattern
    /// order; within each, the chain keyed by the operation name is
    /// selected, and an unknown name passes through that component.
    ///
    /// # Errors
    /// Returns [`TransformError::RejectedValue`] from the first failing
    /// chain entry.
    pub fn transform_operation(
        &self,
        target: ModelVersion,
        operation: &Operation,
        root: &Resource,
    ) -> Result<OperationTransformation, TransformError> {
        let covering = self.covering_sets(target, operation.address());
        let mut ctx = TransformationContext::new(target, PathAddress::root(), root);
        let mut working = operation.clone();
        let mut applied = false;

        for set in &covering {
            let Some(chain) = set.operation_chains.get(operation.name()) else {
                continue;
            };
            applied = true;
            if chain.transform(&mut ctx, &mut working)?.is_discard() {
                return Ok(OperationTransformation {
                    operation: None,
                    diagnostics: ctx.into_diagnostics(),
                });
            }
        }

        if !applied {
            tracing::debug!(
                address = %operation.address(),
                name = operation.name(),
                %target,
                "no operation transformer registered; passing through"
            );
        }

        Ok(OperationTransformation {
            operation: Some(working),
            diagnostics: ctx.into_diagnostics(),
        })
    }

    /// Rewrite an operation's response model toward `target`
    ///
    /// Applies the same chains [`transform_operation`](Self::transform_operation)
    /// would select, in the same order. Response rewriting never fails.
    pub fn transform_response(
        &self,
        target: ModelVersion,
        operation: &Operation,
        response: &mut ModelValue,
        root: &Resource,
    ) -> Vec<Diagnostic> {
        let covering = self.covering_sets(target, operation.address());
        let mut ctx = TransformationContext::new(target, PathAddress::root(), root);
        for set in covering {
            if let Some(chain) = set.operation_chains.get(operation.name()) {
                chain.transform_response(&mut ctx, response);
            }
        }
        ctx.into_diagnostics()
    }

    /// Chain sets whose pattern covers `address` from above or at it,
    /// root-to-leaf, each at the greatest registered version <= target
    fn covering_sets(&self, target: ModelVersion, address: &PathAddress) -> Vec<&ChainSet> {
        let mut matched: Vec<(usize, &ChainSet)> = self
            .entries
            .iter()
            .filter(|(pattern, _)| pattern.matches_prefix_of(address))
            .filter_map(|(pattern, versions)| {
                select_version(versions, target).map(|set| (pattern.len(), set))
            })
            .collect();
        matched.sort_by_key(|(len, _)| *len);
        matched.into_iter().map(|(_, set)| set).collect()
    }

    /// Registered patterns strictly below `address`, root-to-leaf, each at
    /// the greatest registered version <= target
    fn descendant_entries(
        &self,
        target: ModelVersion,
        address: &PathAddress,
    ) -> Vec<(&PathAddress, &ChainSet)> {
        let mut matched: Vec<(&PathAddress, &ChainSet)> = self
            .entries
            .iter()
            .filter(|(pattern, _)| {
                pattern.len() > address.len()
                    && pattern
                        .elements()
                        .iter()
                        .zip(address.iter())
                        .all(|(p, c)| p.matches(c))
            })
            .filter_map(|(pattern, versions)| {
                select_version(versions, target).map(|set| (pattern, set))
            })
            .collect();
        matched.sort_by_key(|(pattern, _)| pattern.len());
        matched
    }
}

/// Greatest registered version that is <= the negotiated target
fn select_version(
    versions: &BTreeMap<ModelVersion, ChainSet>,
    target: ModelVersion,
) -> Option<&ChainSet> {
    versions.range(..=target).next_back().map(|(_, set)| set)
}

/// Collect nodes of `node`'s subtree matching a wildcard-capable remainder
///
/// `absolute` and `relative` are the subtree root's addresses; matches are
/// reported as (absolute, relative-to-subtree-root) pairs.
fn collect_matching_nodes(
    node: &Resource,
    absolute: &PathAddress,
    relative: &PathAddress,
    remainder: &[PathElement],
    out: &mut Vec<(PathAddress, PathAddress)>,
) {
    let Some((head, rest)) = remainder.split_first() else {
        out.push((absolute.clone(), relative.clone()));
        return;
    };
    for (element, child) in node.children() {
        if head.matches(element) {
            collect_matching_nodes(
                child,
                &absolute.child(element.clone()),
                &relative.child(element.clone()),
                rest,
                out,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discard::{DiscardAttributes, DiscardUndefinedAttributes};
    use crate::reject::RejectExpressionValues;
    use crate::step::step;
    use downlevel_model::{Expression, ADD, WRITE_ATTRIBUTE};
    use pretty_assertions::assert_eq;

    const V110: ModelVersion = ModelVersion::new(1, 1, 0);
    const V111: ModelVersion = ModelVersion::new(1, 1, 1);
    const V120: ModelVersion = ModelVersion::new(1, 2, 0);

    fn subsystem() -> PathAddress {
        "/subsystem=store".parse().unwrap()
    }

    fn discard_chain(attribute: &str) -> ResourceTransformerChain {
        ResourceTransformerChain::new([step(DiscardAttributes::always([attribute]))])
    }

    fn sample_tree() -> Resource {
        Resource::new().with_child(
            PathElement::new("subsystem", "store").unwrap(),
            Resource::new()
                .with_attribute("journal-datasource", "ds1")
                .with_attribute("mode", "journal"),
        )
    }

    #[test]
    fn unregistered_version_passes_through_exactly() {
        let mut builder = TransformerRegistry::builder();
        builder.register(subsystem(), V110, discard_chain("journal-datasource"));
        let registry = builder.build().unwrap();

        let store = Resource::new().with_attribute("journal-datasource", "ds1");
        // Peer is older than the oldest registered chain.
        let result = registry
            .transform_resource(ModelVersion::new(1, 0, 0), &subsystem(), &store)
            .unwrap();
        assert_eq!(result.resource, store);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn unregistered_path_passes_through_exactly() {
        let mut builder = TransformerRegistry::builder();
        builder.register(subsystem(), V110, discard_chain("journal-datasource"));
        let registry = builder.build().unwrap();

        let other = Resource::new().with_attribute("journal-datasource", "ds1");
        let result = registry
            .transform_resource(V110, &"/subsystem=other".parse().unwrap(), &other)
            .unwrap();
        assert_eq!(result.resource, other);
    }

    #[test]
    fn selects_greatest_version_at_most_target() {
        let mut builder = TransformerRegistry::builder();
        builder.register(subsystem(), V110, discard_chain("a"));
        builder.register(subsystem(), V111, discard_chain("b"));
        let registry = builder.build().unwrap();

        let store = Resource::new().with_attribute("a", 1).with_attribute("b", 2);

        // Target 1.1.0 picks the 1.1.0 chain.
        let result = registry.transform_resource(V110, &subsystem(), &store).unwrap();
        assert!(!result.resource.has_attribute("a"));
        assert!(result.resource.has_attribute("b"));

        // Target 1.2.0 picks the newest chain not newer than the peer.
        let result = registry.transform_resource(V120, &subsystem(), &store).unwrap();
        assert!(result.resource.has_attribute("a"));
        assert!(!result.resource.has_attribute("b"));
    }

    #[test]
    fn duplicate_registration_fails_at_build() {
        let mut builder = TransformerRegistry::builder();
        builder.register(subsystem(), V110, discard_chain("a"));
        builder.register(subsystem(), V110, discard_chain("b"));

        let error = builder.build().unwrap_err();
        assert_eq!(
            error,
            RegistrationError::DuplicateRegistration {
                pattern: subsystem(),
                version: V110,
            }
        );
    }

    #[test]
    fn ancestor_chains_apply_before_descendant_chains() {
        // Root-level chain renames nothing but discards; the journal chain
        // must observe the parent discard having already happened.
        let mut builder = TransformerRegistry::builder();
        builder.register(subsystem(), V110, discard_chain("use-journal-store"));
        builder.register(
            "/subsystem=store/journal=*".parse().unwrap(),
            V110,
            ResourceTransformerChain::new([step(RejectExpressionValues::new(["journal-path"]))]),
        );
        let registry = builder.build().unwrap();

        let store = Resource::new()
            .with_attribute("use-journal-store", false)
            .with_child(
                PathElement::new("journal", "main").unwrap(),
                Resource::new().with_attribute("journal-path", "data/journal"),
            );

        let result = registry.transform_resource(V110, &subsystem(), &store).unwrap();
        assert!(!result.resource.has_attribute("use-journal-store"));

        // The wildcard descendant chain rejects expressions when present.
        let bad = Resource::new().with_child(
            PathElement::new("journal", "main").unwrap(),
            Resource::new().with_attribute("journal-path", Expression::new("${data.dir}")),
        );
        let error = registry.transform_resource(V110, &subsystem(), &bad).unwrap_err();
        assert_eq!(
            error,
            TransformError::RejectedValue {
                attribute: "journal-path".to_string(),
                address: "/subsystem=store/journal=main".parse().unwrap(),
            }
        );
    }

    #[test]
    fn wildcard_pattern_reaches_every_matching_child() {
        let mut builder = TransformerRegistry::builder();
        builder.register(
            "/subsystem=store/journal=*".parse().unwrap(),
            V110,
            discard_chain("journal-path"),
        );
        let registry = builder.build().unwrap();

        let store = Resource::new()
            .with_child(
                PathElement::new("journal", "main").unwrap(),
                Resource::new().with_attribute("journal-path", "a"),
            )
            .with_child(
                PathElement::new("journal", "audit").unwrap(),
                Resource::new().with_attribute("journal-path", "b"),
            )
            .with_child(
                PathElement::new("participant", "p1").unwrap(),
                Resource::new().with_attribute("journal-path", "keep"),
            );

        let result = registry.transform_resource(V110, &subsystem(), &store).unwrap();
        for name in ["main", "audit"] {
            let child = result
                .resource
                .child(&PathElement::new("journal", name).unwrap())
                .unwrap();
            assert!(!child.has_attribute("journal-path"));
        }
        let untouched = result
            .resource
            .child(&PathElement::new("participant", "p1").unwrap())
            .unwrap();
        assert!(untouched.has_attribute("journal-path"));
    }

    #[test]
    fn sub_resource_registration_nests_under_parent() {
        let mut builder = TransformerRegistry::builder();
        builder
            .register(subsystem(), V110, ResourceTransformerChain::default())
            .sub_resource(
                PathElement::new("journal", "main").unwrap(),
                discard_chain("journal-path"),
            );
        let registry = builder.build().unwrap();

        let store = Resource::new().with_child(
            PathElement::new("journal", "main").unwrap(),
            Resource::new().with_attribute("journal-path", "data/journal"),
        );
        let result = registry.transform_resource(V110, &subsystem(), &store).unwrap();
        let child = result
            .resource
            .child(&PathElement::new("journal", "main").unwrap())
            .unwrap();
        assert!(!child.has_attribute("journal-path"));
    }

    #[test]
    fn operation_dispatch_selects_chain_by_name() {
        let discard = DiscardUndefinedAttributes::new(["journal-datasource"]);
        let mut builder = TransformerRegistry::builder();
        builder
            .register(subsystem(), V110, ResourceTransformerChain::default())
            .operation_transformer(ADD, OperationTransformerChain::new([step(discard.clone())]))
            .operation_transformer(
                WRITE_ATTRIBUTE,
                OperationTransformerChain::new([step(discard.write_attribute_step())]),
            );
        let registry = builder.build().unwrap();
        let tree = sample_tree();

        // ADD: undefined governed parameter is stripped.
        let add = Operation::add(subsystem())
            .with_param("journal-datasource", ModelValue::Undefined)
            .with_param("mode", "journal");
        let result = registry.transform_operation(V110, &add, &tree).unwrap();
        let forwarded = result.operation.unwrap();
        assert!(forwarded.param("journal-datasource").is_none());

        // WRITE_ATTRIBUTE of an undefined value: whole operation discarded.
        let write =
            Operation::write_attribute(subsystem(), "journal-datasource", ModelValue::Undefined);
        let result = registry.transform_operation(V110, &write, &tree).unwrap();
        assert!(result.is_discarded());

        // Unknown operation name passes through this component.
        let custom = Operation::new("resolve-store-path", subsystem());
        let result = registry.transform_operation(V110, &custom, &tree).unwrap();
        assert_eq!(result.operation.unwrap(), custom);
    }

    #[test]
    fn operation_rejection_carries_attribute_and_address() {
        let reject = RejectExpressionValues::new(["store-path"]);
        let mut builder = TransformerRegistry::builder();
        builder
            .register(subsystem(), V110, ResourceTransformerChain::default())
            .operation_transformer(ADD, OperationTransformerChain::new([step(reject)]));
        let registry = builder.build().unwrap();

        let add = Operation::add(subsystem()).with_param("store-path", Expression::new("${data.dir}"));
        let error = registry
            .transform_operation(V110, &add, &sample_tree())
            .unwrap_err();
        assert_eq!(
            error,
            TransformError::RejectedValue {
                attribute: "store-path".to_string(),
                address: subsystem(),
            }
        );
    }

    #[test]
    fn covers_reports_applicability() {
        let mut builder = TransformerRegistry::builder();
        builder.register(subsystem(), V110, discard_chain("a"));
        let registry = builder.build().unwrap();

        assert!(registry.covers(V110, &subsystem()));
        assert!(registry.covers(V120, &subsystem()));
        assert!(!registry.covers(ModelVersion::new(1, 0, 0), &subsystem()));
        assert!(!registry.covers(V110, &"/subsystem=other".parse().unwrap()));
        assert!(registry.covers(
            V110,
            &"/subsystem=store/journal=main".parse().unwrap()
        ));
    }

    #[test]
    fn empty_registry_is_empty() {
        let registry = TransformerRegistry::builder().build().unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
