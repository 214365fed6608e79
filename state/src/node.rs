//! Mutable state nodes
//!
//! A [`StateNode`] is a view over the raw value at one path of a store's
//! state tree. It holds no data of its own: every operation walks the raw
//! tree from the store's root along the node's keys, so a node always sees
//! whatever currently occupies its path.
//!
//! Reads wrap nested maps and lists in fresh child nodes, return primitives
//! as they are, and resolve derived entries against the store. Writes go
//! straight into the raw container; raw values can never hold a node.

use connect_core::{resolve, split, Key, Owner, RawValue, StateError, StateResult, ROOT_PATH};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::derived;
use crate::meta::{MetaKey, MetaValue};
use crate::store::{Store, WeakStore};
use crate::value::StateValue;

struct NodeInner {
    store: WeakStore,
    path: String,
    keys: Vec<Key>,
    owner: Option<Owner>,
}

/// Facade over the raw value at one path of a store
///
/// Cloning a node yields the same instance; see [`StateNode::ptr_eq`].
#[derive(Clone)]
pub struct StateNode(Arc<NodeInner>);

impl StateNode {
    pub(crate) fn root(store: &Store, owner: Option<Owner>) -> Self {
        StateNode(Arc::new(NodeInner {
            store: store.downgrade(),
            path: ROOT_PATH.to_string(),
            keys: Vec::new(),
            owner,
        }))
    }

    fn child(&self, key: Key) -> Self {
        let path = resolve(&self.0.path, &key);
        let mut keys = Vec::with_capacity(self.0.keys.len() + 1);
        keys.extend_from_slice(&self.0.keys);
        keys.push(key);
        StateNode(Arc::new(NodeInner {
            store: self.0.store.clone(),
            path,
            keys,
            owner: self.0.owner.clone(),
        }))
    }

    /// Always `true`; raw values never carry this marker
    pub fn is_mutable_state(&self) -> bool {
        true
    }

    /// Dotted location, e.g. `state.users.0.profile`
    pub fn path(&self) -> &str {
        &self.0.path
    }

    /// Keys from the root to this node
    pub fn keys_from_root(&self) -> &[Key] {
        &self.0.keys
    }

    /// Debug owner; always `None` in production mode
    pub fn owner(&self) -> Option<&Owner> {
        self.0.owner.as_ref()
    }

    /// Owning store
    pub fn store(&self) -> StateResult<Store> {
        self.0.store.upgrade()
    }

    /// Same node instance
    pub fn ptr_eq(a: &StateNode, b: &StateNode) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Raw value currently at this node's path
    pub fn raw(&self) -> StateResult<RawValue> {
        let store = self.store()?;
        self.locate(&store)
            .ok_or_else(|| StateError::PathNotFound(self.path().to_string()))
    }

    /// Raw values from the root down to this node, or `None` once the path vanished
    fn lineage(&self, store: &Store) -> Option<Vec<RawValue>> {
        let mut current = RawValue::Map(store.state().clone());
        let mut lineage = Vec::with_capacity(self.0.keys.len() + 1);
        for key in &self.0.keys {
            let next = current.get(key)?;
            lineage.push(std::mem::replace(&mut current, next));
        }
        lineage.push(current);
        Some(lineage)
    }

    fn locate(&self, store: &Store) -> Option<RawValue> {
        self.0
            .keys
            .iter()
            .try_fold(RawValue::Map(store.state().clone()), |current, key| current.get(key))
    }

    /// Read a reserved metadata key
    pub fn meta(&self, key: MetaKey) -> StateResult<MetaValue> {
        Ok(match key {
            MetaKey::MutableState => MetaValue::MutableState(self.is_mutable_state()),
            MetaKey::Path => MetaValue::Path(self.path().to_string()),
            MetaKey::Raw => MetaValue::Raw(self.raw()?),
            MetaKey::Store => MetaValue::Store(self.store()?),
            MetaKey::Owner => MetaValue::Owner(self.0.owner.clone()),
        })
    }

    /// Read `key`.
    ///
    /// Reserved metadata keys are answered first. Otherwise the raw entry is
    /// returned as a primitive, a child node, a resolved derived value or an
    /// accessor. A missing entry reads as `None`.
    pub fn get(&self, key: impl Into<Key>) -> StateResult<Option<StateValue>> {
        let key = key.into();
        if let Some(meta) = MetaKey::from_key(&key) {
            return self.meta(meta).map(|meta| Some(StateValue::Meta(meta)));
        }

        let store = self.store()?;
        let Some(target) = self.locate(&store) else {
            return Ok(None);
        };
        let Some(container) = target.as_container() else {
            return Ok(None);
        };
        let Some(key) = container.normalize_key(&key) else {
            return Ok(None);
        };
        let Some(value) = container.get_key(&key) else {
            return Ok(None);
        };

        trace!(path = %self.path(), %key, kind = value.kind(), "Reading state");
        if derived::is_derived(&value) {
            let computed = derived::resolve(value, &store.context())?;
            return Ok(Some(StateValue::from_computed(computed)));
        }
        let value = match value {
            RawValue::Map(_) | RawValue::List(_) => StateValue::Node(self.child(key)),
            RawValue::Function(function) => StateValue::Accessor(function),
            primitive => StateValue::Primitive(primitive),
        };
        Ok(Some(value))
    }

    /// Child node at `key`
    pub fn node(&self, key: impl Into<Key>) -> StateResult<StateNode> {
        let key = key.into();
        match self.get(&key)? {
            Some(StateValue::Node(node)) => Ok(node),
            Some(other) => Err(StateError::NotANode {
                path: resolve(self.path(), &key),
                kind: other.kind(),
            }),
            None => Err(StateError::PathNotFound(resolve(self.path(), &key))),
        }
    }

    /// Read a dotted path relative to this node, e.g. `users.0.profile.name`
    pub fn lookup(&self, path: &str) -> StateResult<Option<StateValue>> {
        let mut current = StateValue::Node(self.clone());
        for key in split(path) {
            let StateValue::Node(node) = current else {
                return Ok(None);
            };
            match node.get(key)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Write `value` into the raw container at `key`.
    ///
    /// Writing to a list index equal to its length appends. A container that
    /// holds this node's raw value or any of its ancestors is rejected, so the
    /// raw tree stays acyclic.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<RawValue>) -> StateResult<()> {
        let key = key.into();
        if let Some(meta) = MetaKey::from_key(&key) {
            return Err(StateError::ReservedKey(meta.name().to_string()));
        }

        let store = self.store()?;
        let lineage = self
            .lineage(&store)
            .ok_or_else(|| StateError::PathNotFound(self.path().to_string()))?;
        let Some(target) = lineage.last() else {
            return Err(StateError::PathNotFound(self.path().to_string()));
        };
        let container = target.as_container().ok_or_else(|| StateError::NotAContainer {
            path: self.path().to_string(),
            kind: target.kind(),
        })?;

        let value = value.into();
        if value.is_container() && lineage.iter().any(|ancestor| reaches(&value, ancestor)) {
            return Err(StateError::CyclicWrite {
                path: resolve(self.path(), &key),
            });
        }
        trace!(path = %self.path(), %key, kind = value.kind(), "Writing state");
        container.set_key(&key, value)?;
        Ok(())
    }

    /// Remove `key` from the raw container, returning the removed value.
    ///
    /// List entries after a removed index shift down.
    pub fn remove(&self, key: impl Into<Key>) -> StateResult<Option<RawValue>> {
        let key = key.into();
        if let Some(meta) = MetaKey::from_key(&key) {
            return Err(StateError::ReservedKey(meta.name().to_string()));
        }

        let target = self.raw()?;
        let container = target.as_container().ok_or_else(|| StateError::NotAContainer {
            path: self.path().to_string(),
            kind: target.kind(),
        })?;

        trace!(path = %self.path(), %key, "Removing state");
        container.remove_key(&key)
    }

    /// Own keys of the raw value, in raw order, derived entries included.
    ///
    /// Raw entries named like a reserved metadata key are left out, since
    /// reads of those names answer with metadata.
    pub fn keys(&self) -> StateResult<Vec<Key>> {
        let store = self.store()?;
        Ok(self
            .locate(&store)
            .and_then(|target| target.as_container().map(|container| container.own_keys()))
            .unwrap_or_default()
            .into_iter()
            .filter(|key| MetaKey::from_key(key).is_none())
            .collect())
    }

    pub fn len(&self) -> StateResult<usize> {
        Ok(self.keys()?.len())
    }

    pub fn is_empty(&self) -> StateResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Whether the raw value holds an entry at `key`; reserved names never count
    pub fn contains_key(&self, key: impl Into<Key>) -> StateResult<bool> {
        let key = key.into();
        if MetaKey::from_key(&key).is_some() {
            return Ok(false);
        }
        let store = self.store()?;
        Ok(self
            .locate(&store)
            .and_then(|target| target.as_container().map(|container| container.has_key(&key)))
            .unwrap_or(false))
    }

    /// JSON rendering of the raw value, without derived entries
    pub fn to_json(&self) -> StateResult<Value> {
        Ok(self.raw()?.to_json())
    }
}

/// Whether `value` is the container `target` or holds it somewhere below
fn reaches(value: &RawValue, target: &RawValue) -> bool {
    if !target.is_container() {
        return false;
    }
    if value == target {
        return true;
    }
    match value {
        RawValue::Map(map) => map.entries().iter().any(|(_, child)| reaches(child, target)),
        RawValue::List(list) => list.items().iter().any(|child| reaches(child, target)),
        _ => false,
    }
}

impl fmt::Debug for StateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateNode")
            .field("path", &self.0.path)
            .field("owner", &self.0.owner)
            .finish()
    }
}
