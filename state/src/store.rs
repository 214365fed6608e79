//! Store owning the raw state tree

use connect_core::{DerivedContext, Mode, Owner, RawMap, StateError, StateResult, StoreConfig};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

use crate::node::StateNode;
use crate::registry::IdentityRegistry;

pub(crate) struct StoreInner {
    state: RawMap,
    actions: RawMap,
    libraries: RawMap,
    config: StoreConfig,
    registry: IdentityRegistry,
}

/// Holder of a raw state tree plus the actions and libraries bags handed to
/// derived entries
///
/// `Store` is a cheap handle; clones refer to the same store.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

/// Non-owning store reference held by nodes
#[derive(Clone)]
pub(crate) struct WeakStore(Weak<StoreInner>);

impl WeakStore {
    pub(crate) fn upgrade(&self) -> StateResult<Store> {
        self.0
            .upgrade()
            .map(|inner| Store { inner })
            .ok_or(StateError::StoreDropped)
    }
}

impl Store {
    /// Development-mode store over `state` with empty bags
    pub fn new(state: RawMap) -> Self {
        StoreBuilder::new().state(state).build()
    }
    
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }
    
    /// Root mutable state node.
    ///
    /// In development every call builds a new root stamped with `owner`. In
    /// production every call returns the same ownerless root.
    pub fn create_mutable_state(&self, owner: Option<Owner>) -> StateNode {
        self.inner.registry.create(self, owner)
    }
    
    /// Root of the raw state branch
    pub fn state(&self) -> &RawMap {
        &self.inner.state
    }
    
    pub fn actions(&self) -> &RawMap {
        &self.inner.actions
    }
    
    pub fn libraries(&self) -> &RawMap {
        &self.inner.libraries
    }
    
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }
    
    pub fn mode(&self) -> Mode {
        self.inner.registry.mode()
    }
    
    /// Context handed to derived entries
    pub fn context(&self) -> DerivedContext {
        DerivedContext::new(
            self.inner.state.clone(),
            self.inner.actions.clone(),
            self.inner.libraries.clone(),
        )
    }
    
    /// JSON rendering of the raw state, without derived entries
    pub fn snapshot(&self) -> Value {
        self.inner.state.to_json()
    }
    
    /// Same store
    pub fn ptr_eq(&self, other: &Store) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
    
    pub(crate) fn downgrade(&self) -> WeakStore {
        WeakStore(Arc::downgrade(&self.inner))
    }
    
    #[cfg(test)]
    pub(crate) fn registry(&self) -> &IdentityRegistry {
        &self.inner.registry
    }
}

impl PartialEq for Store {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("mode", &self.mode())
            .field("state", &self.inner.state.keys())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Store`]
#[derive(Debug, Default)]
pub struct StoreBuilder {
    state: RawMap,
    actions: RawMap,
    libraries: RawMap,
    config: StoreConfig,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    
    pub fn state(mut self, state: RawMap) -> Self {
        self.state = state;
        self
    }
    
    pub fn actions(mut self, actions: RawMap) -> Self {
        self.actions = actions;
        self
    }
    
    pub fn libraries(mut self, libraries: RawMap) -> Self {
        self.libraries = libraries;
        self
    }
    
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }
    
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }
    
    pub fn build(self) -> Store {
        debug!(mode = %self.config.mode, "Creating store");
        let registry = IdentityRegistry::new(self.config.mode);
        Store {
            inner: Arc::new(StoreInner {
                state: self.state,
                actions: self.actions,
                libraries: self.libraries,
                config: self.config,
                registry,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{raw_state, store_with};
    use crate::meta::{MetaKey, MetaValue};
    use connect_core::RawValue;
    
    fn owners_along(root: &StateNode) -> Vec<Option<Owner>> {
        let users = root.node("users").unwrap();
        let first = users.node(0).unwrap();
        let profile = first.node("profile").unwrap();
        [root, &users, &first, &profile]
            .iter()
            .map(|node| node.owner().cloned())
            .collect()
    }
    
    #[test]
    fn test_development_stamps_owners() {
        let raw = raw_state();
        let store1 = Store::builder().state(raw.clone()).mode(Mode::Development).build();
        let store2 = Store::builder().state(raw).mode(Mode::Development).build();
        let owner1 = Owner::debug("owner1");
        let owner2 = Owner::debug("owner2");
        
        let state1 = store1.create_mutable_state(Some(owner1.clone()));
        let state2 = store2.create_mutable_state(Some(owner2.clone()));
        
        assert!(owners_along(&state1).iter().all(|owner| owner.as_ref() == Some(&owner1)));
        assert!(owners_along(&state2).iter().all(|owner| owner.as_ref() == Some(&owner2)));
        assert!(!StateNode::ptr_eq(&state1, &state2));
    }
    
    #[test]
    fn test_production_shares_root_without_owner() {
        let store = store_with(Mode::Production);
        
        let state1 = store.create_mutable_state(Some(Owner::debug("owner1")));
        let state2 = store.create_mutable_state(Some(Owner::debug("owner2")));
        
        assert!(owners_along(&state1).iter().all(Option::is_none));
        assert!(owners_along(&state2).iter().all(Option::is_none));
        assert!(StateNode::ptr_eq(&state1, &state2));
        
        match state1.meta(MetaKey::Owner).unwrap() {
            MetaValue::Owner(owner) => assert!(owner.is_none()),
            other => panic!("unexpected metadata: {:?}", other),
        }
    }
    
    #[test]
    fn test_development_roots_expose_equal_data() {
        let store = store_with(Mode::Development);
        let a = store.create_mutable_state(None);
        let b = store.create_mutable_state(None);
        
        assert!(!StateNode::ptr_eq(&a, &b));
        assert_eq!(a.path(), b.path());
        assert_eq!(a.raw().unwrap(), b.raw().unwrap());
        assert_eq!(
            a.node("users").unwrap().raw().unwrap(),
            b.node("users").unwrap().raw().unwrap()
        );
    }
    
    #[test]
    fn test_production_cache_is_per_store() {
        let raw = raw_state();
        let store1 = Store::builder().state(raw.clone()).mode(Mode::Production).build();
        let store2 = Store::builder().state(raw).mode(Mode::Production).build();
        
        let state1 = store1.create_mutable_state(None);
        let state2 = store2.create_mutable_state(None);
        
        assert!(!StateNode::ptr_eq(&state1, &state2));
        assert_eq!(state1.raw().unwrap(), state2.raw().unwrap());
    }
    
    #[test]
    fn test_builder_defaults() {
        let store = Store::new(RawMap::new().with("count", 1i64));
        
        assert_eq!(store.mode(), Mode::Development);
        assert_eq!(store.config(), &StoreConfig::development());
        assert!(store.actions().is_empty());
        assert!(store.libraries().is_empty());
        assert_eq!(store.state().get("count"), Some(RawValue::from(1i64)));
    }
    
    #[test]
    fn test_snapshot_skips_derived() {
        let store = store_with(Mode::Development);
        let snapshot = store.snapshot();
        
        assert_eq!(snapshot["users"][0]["profile"]["name"], "Jon");
        assert!(snapshot.get("usersLength").is_none());
    }
    
    #[test]
    fn test_context_shares_bags() {
        let store = store_with(Mode::Development);
        let ctx = store.context();
        
        assert!(ctx.state().ptr_eq(store.state()));
        assert!(ctx.libraries().ptr_eq(store.libraries()));
        assert!(ctx.actions().ptr_eq(store.actions()));
    }
    
    #[test]
    fn test_clones_are_the_same_store() {
        let store = store_with(Mode::Production);
        let clone = store.clone();
        
        assert_eq!(store, clone);
        assert!(StateNode::ptr_eq(
            &store.create_mutable_state(None),
            &clone.create_mutable_state(None)
        ));
    }
}
