//! Facade operations behind the CLI subcommands
//!
//! Paths may be given relative to the state root (`users.0`) or absolute
//! (`state.users.0`).

use connect_core::{split, strip_root, Key, RawValue, StateError, StateResult};
use connect_state::{StateNode, StateValue};
use serde_json::Value;

fn relative(path: &str) -> &str {
    strip_root(path).unwrap_or(path)
}

/// Every node path under `node`, depth first, `node` included.
///
/// Derived entries are not invoked while walking.
pub fn list_paths(node: &StateNode) -> StateResult<Vec<String>> {
    let mut paths = Vec::new();
    collect_paths(node, &mut paths)?;
    Ok(paths)
}

fn collect_paths(node: &StateNode, paths: &mut Vec<String>) -> StateResult<()> {
    paths.push(node.path().to_string());
    let raw = node.raw()?;
    for key in node.keys()? {
        if raw.get(&key).map_or(false, |value| value.is_container()) {
            collect_paths(&node.node(key)?, paths)?;
        }
    }
    Ok(())
}

fn lookup_node(root: &StateNode, path: &str) -> StateResult<StateNode> {
    match root.lookup(relative(path))? {
        Some(StateValue::Node(node)) => Ok(node),
        Some(other) => Err(StateError::NotANode {
            path: path.to_string(),
            kind: other.kind(),
        }),
        None => Err(StateError::PathNotFound(path.to_string())),
    }
}

/// JSON value read through the facade at `path`
pub fn read(root: &StateNode, path: &str) -> StateResult<Value> {
    match root.lookup(relative(path))? {
        Some(value) => value.to_json(),
        None => Err(StateError::PathNotFound(path.to_string())),
    }
}

/// Own keys of the node at `path`
pub fn keys(root: &StateNode, path: &str) -> StateResult<Vec<String>> {
    let node = lookup_node(root, path)?;
    Ok(node.keys()?.iter().map(Key::to_string).collect())
}

/// Write a JSON value through the facade at `path`
pub fn write(root: &StateNode, path: &str, value: Value) -> StateResult<()> {
    let mut keys = split(relative(path));
    let Some(last) = keys.pop() else {
        return Err(StateError::InvalidKey {
            key: path.to_string(),
            reason: "the state root cannot be replaced",
        });
    };
    
    let parent = keys
        .iter()
        .try_fold(root.clone(), |node, key| node.node(key))?;
    parent.set(last, RawValue::from_json(value))
}
