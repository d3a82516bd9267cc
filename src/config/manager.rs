use super::{
    checkpoint::CheckpointConfig, grid::GridConfig, search::SearchConfig,
    simulation::SimulationConfig, traits::ConfigSection,
};
use crate::error::TradegridError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub grid: GridConfig,
    pub simulation: SimulationConfig,
    pub checkpoint: CheckpointConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), TradegridError> {
        self.search.validate()?;
        self.grid.validate()?;
        self.simulation.validate()?;
        self.checkpoint.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TradegridError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TradegridError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| TradegridError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        *self.config.write().unwrap() = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TradegridError> {
        let config = self.config.read().unwrap();
        let toml_str = toml::to_string_pretty(&*config)
            .map_err(|e| TradegridError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| TradegridError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap().clone()
    }

    pub fn update<F>(&self, f: F) -> Result<(), TradegridError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap();
        f(&mut config);
        config.validate()?;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let mut config = AppConfig::default();
        config.grid.bins = vec![20]; // mismatched with 2-axis bounds
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_update_rejects_invalid() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.search.batch_size = 0);
        assert!(result.is_err());
    }
}
