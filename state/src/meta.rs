//! Reserved facade metadata
//!
//! Every node answers a closed set of metadata keys before falling back to
//! raw data. These names shadow raw entries of the same name on reads and are
//! never writable through the facade.

use connect_core::{Key, Owner, RawValue};
use std::fmt;

use crate::store::Store;

/// Reserved metadata keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKey {
    /// Constant marker, `true` on every node
    MutableState,
    Path,
    Raw,
    Store,
    Owner,
}

impl MetaKey {
    pub const ALL: [MetaKey; 5] = [
        MetaKey::MutableState,
        MetaKey::Path,
        MetaKey::Raw,
        MetaKey::Store,
        MetaKey::Owner,
    ];
    
    pub fn name(&self) -> &'static str {
        match self {
            MetaKey::MutableState => "__mutable_state",
            MetaKey::Path => "__path",
            MetaKey::Raw => "__raw",
            MetaKey::Store => "__store",
            MetaKey::Owner => "__owner",
        }
    }
    
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|meta| meta.name() == name)
    }
    
    /// Reserved key addressed by `key`, if any. Indices are never reserved.
    pub fn from_key(key: &Key) -> Option<Self> {
        key.as_field().and_then(Self::from_name)
    }
}

impl fmt::Display for MetaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of a metadata key on a particular node
#[derive(Debug, Clone)]
pub enum MetaValue {
    MutableState(bool),
    Path(String),
    Raw(RawValue),
    Store(Store),
    Owner(Option<Owner>),
}

impl MetaValue {
    pub fn key(&self) -> MetaKey {
        match self {
            MetaValue::MutableState(_) => MetaKey::MutableState,
            MetaValue::Path(_) => MetaKey::Path,
            MetaValue::Raw(_) => MetaKey::Raw,
            MetaValue::Store(_) => MetaKey::Store,
            MetaValue::Owner(_) => MetaKey::Owner,
        }
    }
    
    /// Raw rendering. A store renders as its raw state root and a missing
    /// owner as `Null`.
    pub fn to_raw(&self) -> RawValue {
        match self {
            MetaValue::MutableState(marker) => RawValue::Bool(*marker),
            MetaValue::Path(path) => RawValue::String(path.clone()),
            MetaValue::Raw(raw) => raw.clone(),
            MetaValue::Store(store) => RawValue::Map(store.state().clone()),
            MetaValue::Owner(Some(owner)) => connect_core::RawMap::new()
                .with("type", owner.kind.as_str())
                .with("name", owner.name.as_str())
                .into(),
            MetaValue::Owner(None) => RawValue::Null,
        }
    }
}
