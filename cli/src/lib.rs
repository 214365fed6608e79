//! Connect CLI library
//!
//! Loading of JSON state files and the facade operations behind the
//! `connect` binary.

pub mod commands;
pub mod loader;

pub use commands::*;
pub use loader::*;
