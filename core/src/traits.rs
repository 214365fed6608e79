//! Core traits shared by raw containers
//! 
//! Maps and lists are addressed through the same keyed interface so the facade
//! can treat both uniformly.

use crate::path::Key;
use crate::types::{RawList, RawMap, RawValue};

/// Result type for connect operations
pub type StateResult<T> = Result<T, crate::error::StateError>;

/// Keyed access over a raw container
pub trait Container {
    /// Short name of the container kind, for diagnostics
    fn kind(&self) -> &'static str;
    
    /// Coerce a key to the form this container stores it under.
    ///
    /// Returns `None` when the key can never address an entry here.
    fn normalize_key(&self, key: &Key) -> Option<Key>;
    
    /// Read the entry at `key`
    fn get_key(&self, key: &Key) -> Option<RawValue>;
    
    /// Write `value` at `key`, returning the previous entry
    fn set_key(&self, key: &Key, value: RawValue) -> StateResult<Option<RawValue>>;
    
    /// Remove the entry at `key`, returning it
    fn remove_key(&self, key: &Key) -> StateResult<Option<RawValue>>;
    
    /// Own keys in storage order
    fn own_keys(&self) -> Vec<Key>;
    
    /// Number of entries
    fn entry_count(&self) -> usize;
    
    fn has_key(&self, key: &Key) -> bool {
        self.get_key(key).is_some()
    }
}

impl Container for RawMap {
    fn kind(&self) -> &'static str {
        "map"
    }
    
    fn normalize_key(&self, key: &Key) -> Option<Key> {
        Some(Key::Field(key.to_field().into_owned()))
    }
    
    fn get_key(&self, key: &Key) -> Option<RawValue> {
        self.get(&key.to_field())
    }
    
    fn set_key(&self, key: &Key, value: RawValue) -> StateResult<Option<RawValue>> {
        Ok(self.insert(key.to_field().into_owned(), value))
    }
    
    fn remove_key(&self, key: &Key) -> StateResult<Option<RawValue>> {
        Ok(self.remove(&key.to_field()))
    }
    
    fn own_keys(&self) -> Vec<Key> {
        self.keys().into_iter().map(Key::Field).collect()
    }
    
    fn entry_count(&self) -> usize {
        self.len()
    }
}

impl Container for RawList {
    fn kind(&self) -> &'static str {
        "list"
    }
    
    fn normalize_key(&self, key: &Key) -> Option<Key> {
        key.to_index().map(Key::Index)
    }
    
    fn get_key(&self, key: &Key) -> Option<RawValue> {
        key.to_index().and_then(|index| self.get(index))
    }
    
    fn set_key(&self, key: &Key, value: RawValue) -> StateResult<Option<RawValue>> {
        let index = list_index(key)?;
        self.set(index, value)
    }
    
    fn remove_key(&self, key: &Key) -> StateResult<Option<RawValue>> {
        let index = list_index(key)?;
        Ok(self.remove(index))
    }
    
    fn own_keys(&self) -> Vec<Key> {
        (0..self.len()).map(Key::Index).collect()
    }
    
    fn entry_count(&self) -> usize {
        self.len()
    }
}

fn list_index(key: &Key) -> StateResult<usize> {
    key.to_index().ok_or_else(|| crate::error::StateError::InvalidKey {
        key: key.to_string(),
        reason: "list entries are addressed by index",
    })
}
