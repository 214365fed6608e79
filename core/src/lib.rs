//! Connect Core Library
//! 
//! Raw state model, path composition, error and configuration types shared by
//! the connect state facade and its tooling.

pub mod types;
pub mod path;
pub mod traits;
pub mod error;
pub mod config;

pub use types::*;
pub use path::*;
pub use traits::*;
pub use error::*;
pub use config::*;
