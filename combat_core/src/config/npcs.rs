//! NPC definition loading

use super::ConfigError;
use crate::entity::{NpcDefinition, NpcDefinitions};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Container for NPC definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcsConfig {
    pub npcs: Vec<NpcDefinition>,
}

fn build_definitions(config: NpcsConfig) -> Result<NpcDefinitions, ConfigError> {
    let mut definitions = NpcDefinitions::new();
    for npc in config.npcs {
        if npc.hitpoints <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "npc {} ({}) must have positive hitpoints",
                npc.id, npc.name
            )));
        }
        definitions.register(npc);
    }
    Ok(definitions)
}

/// Load NPC definitions from a TOML file
pub fn load_npc_definitions(path: &Path) -> Result<NpcDefinitions, ConfigError> {
    let config: NpcsConfig = super::load_toml(path)?;
    build_definitions(config)
}

/// Load NPC definitions from a TOML string
pub fn parse_npc_definitions(content: &str) -> Result<NpcDefinitions, ConfigError> {
    let config: NpcsConfig = super::parse_toml(content)?;
    build_definitions(config)
}

/// Get the bundled NPC definitions
pub fn default_npc_definitions() -> NpcDefinitions {
    let toml = include_str!("../../config/npcs.toml");
    parse_npc_definitions(toml).unwrap_or_default()
}
