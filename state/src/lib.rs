//! Connect State Management
//! 
//! Lazy, path-aware mutable state over a store's raw state tree.
//! Nodes are views: each read synthesizes a fresh node from the current raw
//! data, and each write goes straight through to the raw tree.

pub mod derived;
pub mod meta;
pub mod node;
mod registry;
pub mod store;
pub mod value;

#[cfg(test)]
mod fixtures;

pub use meta::*;
pub use node::*;
pub use store::*;
pub use value::*;
