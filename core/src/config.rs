//! Configuration types for connect

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StateError;
use crate::traits::StateResult;

/// Store mode
///
/// Development builds a fresh facade per caller and stamps it with the
/// caller's owner; production shares one facade per store and drops owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    pub fn is_development(&self) -> bool {
        matches!(self, Mode::Development)
    }
    
    pub fn is_production(&self) -> bool {
        matches!(self, Mode::Production)
    }
    
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = StateError;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            other => Err(StateError::ConfigError(format!("unknown mode: {}", other))),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Identity and owner handling for created facades
    pub mode: Mode,
}

impl StoreConfig {
    pub fn development() -> Self {
        Self {
            mode: Mode::Development,
        }
    }
    
    pub fn production() -> Self {
        Self {
            mode: Mode::Production,
        }
    }
    
    pub fn from_json(json: &str) -> StateResult<Self> {
        serde_json::from_str(json).map_err(|e| StateError::ConfigError(e.to_string()))
    }
    
    pub fn to_json(&self) -> StateResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_default_is_development() {
        assert_eq!(StoreConfig::default().mode, Mode::Development);
        assert_eq!(StoreConfig::from_json("{}").unwrap(), StoreConfig::development());
    }
    
    #[test]
    fn test_config_json() {
        let config = StoreConfig::from_json(r#"{ "mode": "production" }"#).unwrap();
        assert!(config.mode.is_production());
        
        let json = config.to_json().unwrap();
        assert_eq!(StoreConfig::from_json(&json).unwrap(), config);
        
        let err = StoreConfig::from_json(r#"{ "mode": "staging" }"#).unwrap_err();
        assert!(matches!(err, StateError::ConfigError(_)));
    }
    
    #[test]
    fn test_mode_from_str() {
        assert_eq!("prod".parse::<Mode>().unwrap(), Mode::Production);
        assert_eq!(" Development ".parse::<Mode>().unwrap(), Mode::Development);
        assert!("staging".parse::<Mode>().is_err());
    }
}
