//! Loading and saving state files

use anyhow::{bail, Context};
use connect_core::{Mode, RawMap, RawValue, StoreConfig};
use connect_state::Store;
use std::path::Path;
use tracing::info;

/// Read a JSON state file. The document must be an object.
pub fn load_state(path: &Path) -> anyhow::Result<RawMap> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Error reading state file. file: {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Error parsing state file. file: {}", path.display()))?;
    
    match RawValue::from_json(json) {
        RawValue::Map(state) => {
            info!("Loaded state. file: {}, keys: {}", path.display(), state.len());
            Ok(state)
        }
        other => bail!("State file must contain an object, found {}. file: {}", other.kind(), path.display()),
    }
}

/// Store configuration from an optional file, with an optional mode override
pub fn load_config(path: Option<&Path>, mode: Option<Mode>) -> anyhow::Result<StoreConfig> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Error reading config file. file: {}", path.display()))?;
            StoreConfig::from_json(&content)
                .with_context(|| format!("Error parsing config file. file: {}", path.display()))?
        }
        None => StoreConfig::default(),
    };
    
    if let Some(mode) = mode {
        config.mode = mode;
    }
    Ok(config)
}

/// Build a store over the state file at `path`
pub fn open_store(path: &Path, config: StoreConfig) -> anyhow::Result<Store> {
    let state = load_state(path)?;
    Ok(Store::builder().state(state).config(config).build())
}

/// Write the store's raw state back as pretty JSON
pub fn save_state(path: &Path, store: &Store) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&store.snapshot())?;
    std::fs::write(path, json)
        .with_context(|| format!("Error writing state file. file: {}", path.display()))?;
    info!("Saved state. file: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    
    #[test]
    fn test_load_state() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        std::fs::write(&path, r#"{ "users": [ { "name": "Jon" } ], "count": 1 }"#).unwrap();
        
        let state = load_state(&path).unwrap();
        assert_eq!(state.keys(), vec!["users", "count"]);
        assert_eq!(state.lookup("users.0.name"), Some(RawValue::from("Jon")));
    }
    
    #[test]
    fn test_load_state_rejects_non_objects() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        
        let err = load_state(&path).unwrap_err();
        assert!(err.to_string().contains("must contain an object"));
        
        assert!(load_state(&tmp.path().join("missing.json")).is_err());
    }
    
    #[test]
    fn test_load_config_override() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{ "mode": "production" }"#).unwrap();
        
        assert_eq!(load_config(Some(path.as_path()), None).unwrap().mode, Mode::Production);
        assert_eq!(
            load_config(Some(path.as_path()), Some(Mode::Development)).unwrap().mode,
            Mode::Development
        );
        assert_eq!(load_config(None, None).unwrap(), StoreConfig::default());
    }
    
    #[test]
    fn test_save_state_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        std::fs::write(&path, r#"{ "users": [] }"#).unwrap();
        
        let store = open_store(&path, StoreConfig::default()).unwrap();
        store
            .create_mutable_state(None)
            .node("users")
            .unwrap()
            .set(0, RawValue::from_json(json!({ "name": "Arya" })))
            .unwrap();
        save_state(&path, &store).unwrap();
        
        let reloaded = load_state(&path).unwrap();
        assert_eq!(reloaded.lookup("users.0.name"), Some(RawValue::from("Arya")));
    }
}
