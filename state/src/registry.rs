//! Owner and identity handling for created facades
//!
//! Development mode builds a fresh root node per request, stamped with the
//! caller's owner. Production mode builds one ownerless root node per store
//! and hands out that same instance on every request.

use connect_core::{Mode, Owner};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::node::StateNode;
use crate::store::Store;

pub(crate) struct IdentityRegistry {
    mode: Mode,
    shared: Mutex<Option<StateNode>>,
}

impl IdentityRegistry {
    pub(crate) fn new(mode: Mode) -> Self {
        Self {
            mode,
            shared: Mutex::new(None),
        }
    }
    
    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }
    
    /// Root node for `owner`, according to the store's mode
    pub(crate) fn create(&self, store: &Store, owner: Option<Owner>) -> StateNode {
        match self.mode {
            Mode::Development => {
                debug!(owner = ?owner, "Building mutable state");
                StateNode::root(store, owner)
            }
            Mode::Production => {
                if let Some(owner) = &owner {
                    debug!(%owner, "Owner ignored in production mode");
                }
                
                let mut shared = self.shared.lock();
                if let Some(root) = shared.as_ref() {
                    trace!("Serving shared mutable state");
                    return root.clone();
                }
                
                debug!("Building shared mutable state");
                let root = StateNode::root(store, None);
                *shared = Some(root.clone());
                root
            }
        }
    }
    
    /// Whether the shared production root has been built yet
    #[cfg(test)]
    pub(crate) fn has_shared(&self) -> bool {
        self.shared.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures::store_with;
    use connect_core::{Mode, Owner};
    use crate::node::StateNode;
    
    #[test]
    fn test_production_root_built_lazily() {
        let store = store_with(Mode::Production);
        assert!(!store.registry().has_shared());
        
        let first = store.create_mutable_state(None);
        assert!(store.registry().has_shared());
        
        let second = store.create_mutable_state(Some(Owner::debug("late")));
        assert!(StateNode::ptr_eq(&first, &second));
        assert_eq!(second.owner(), None);
    }
    
    #[test]
    fn test_development_never_caches() {
        let store = store_with(Mode::Development);
        let owner = Owner::debug("same");
        
        let first = store.create_mutable_state(Some(owner.clone()));
        let second = store.create_mutable_state(Some(owner.clone()));
        
        assert!(!store.registry().has_shared());
        assert!(!StateNode::ptr_eq(&first, &second));
        assert_eq!(first.owner(), Some(&owner));
        assert_eq!(second.owner(), Some(&owner));
        assert_eq!(store.registry().mode(), Mode::Development);
    }
}
