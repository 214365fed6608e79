//! Path composition for state nodes
//!
//! A node's path is the root label followed by every key traversed to reach
//! it, joined with `.`: `state.users.0.profile`. Keys are not escaped, so a
//! key that itself contains `.` yields an ambiguous path.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Label of the top-level state branch
pub const ROOT_PATH: &str = "state";

/// Separator between path segments
pub const SEPARATOR: char = '.';

/// A single step into a raw container
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// List position
    Index(usize),
    /// Map entry name
    Field(String),
}

impl Key {
    pub fn field(name: impl Into<String>) -> Self {
        Key::Field(name.into())
    }
    
    pub fn index(index: usize) -> Self {
        Key::Index(index)
    }
    
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Key::Field(name) => Some(name),
            Key::Index(_) => None,
        }
    }
    
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(index) => Some(*index),
            Key::Field(_) => None,
        }
    }
    
    /// The list position this key addresses, accepting canonical decimal fields.
    pub fn to_index(&self) -> Option<usize> {
        match self {
            Key::Index(index) => Some(*index),
            Key::Field(name) => parse_index(name),
        }
    }
    
    /// The map entry name this key addresses.
    pub fn to_field(&self) -> Cow<'_, str> {
        match self {
            Key::Field(name) => Cow::Borrowed(name),
            Key::Index(index) => Cow::Owned(index.to_string()),
        }
    }
    
    /// Parse a single path segment; canonical decimal segments become indices.
    pub fn parse(segment: &str) -> Self {
        match parse_index(segment) {
            Some(index) => Key::Index(index),
            None => Key::Field(segment.to_string()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Field(name) => f.write_str(name),
            Key::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Field(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Field(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key::Field(name.clone())
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

/// `"0"`, `"17"`; not `"01"`, `"+1"` or `""`
fn parse_index(segment: &str) -> Option<usize> {
    let canonical = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));
    if canonical {
        segment.parse().ok()
    } else {
        None
    }
}

/// Compose a child path from its parent path and key
pub fn resolve(parent: &str, key: &Key) -> String {
    let mut path = String::with_capacity(parent.len() + 1 + 8);
    path.push_str(parent);
    path.push(SEPARATOR);
    path.push_str(&key.to_field());
    path
}

/// Split a dotted path relative to the root into keys
pub fn split(path: &str) -> Vec<Key> {
    if path.is_empty() {
        return Vec::new();
    }
    path.split(SEPARATOR).map(Key::parse).collect()
}

/// Strip the root label from an absolute path.
///
/// `"state"` becomes `""` and `"state.users.0"` becomes `"users.0"`; any
/// other input is not rooted and yields `None`.
pub fn strip_root(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(ROOT_PATH)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix(SEPARATOR)
    }
}
