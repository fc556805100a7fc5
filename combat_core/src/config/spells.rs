//! Spell configuration loading

use super::ConfigError;
use crate::combat::{SpellDescriptor, SpellRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Container for spell configurations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellsConfig {
    pub spells: Vec<SpellDescriptor>,
}

fn build_registry(config: SpellsConfig) -> Result<SpellRegistry, ConfigError> {
    let mut registry = SpellRegistry::new();
    for spell in config.spells {
        if spell.max_hit < 0 || spell.level < 1 {
            return Err(ConfigError::ValidationError(format!(
                "spell {} ({}) has an invalid level or max hit",
                spell.id, spell.name
            )));
        }
        registry.register(spell);
    }
    Ok(registry)
}

/// Load spell configurations from a TOML file
pub fn load_spells(path: &Path) -> Result<SpellRegistry, ConfigError> {
    let config: SpellsConfig = super::load_toml(path)?;
    build_registry(config)
}

/// Load spell configurations from a TOML string
pub fn parse_spells(content: &str) -> Result<SpellRegistry, ConfigError> {
    let config: SpellsConfig = super::parse_toml(content)?;
    build_registry(config)
}

/// Get the bundled spell book
pub fn default_spells() -> SpellRegistry {
    let toml = include_str!("../../config/spells.toml");
    parse_spells(toml).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::SpellEffect;

    #[test]
    fn test_parse_spells() {
        let toml = r#"
[[spells]]
id = 1152
name = "Wind Strike"
level = 1
base_experience = 5.5
max_hit = 2
projectile = 91

[[spells]]
id = 1582
name = "Snare"
level = 50
base_experience = 60.0
max_hit = 2

[spells.effect]
type = "freeze"
ticks = 16
"#;

        let registry = parse_spells(toml).unwrap();
        assert_eq!(registry.len(), 2);
        let strike = registry.get(1152).unwrap();
        assert_eq!(strike.animation, 711);
        assert_eq!(strike.effect, SpellEffect::None);
        assert_eq!(
            registry.get(1582).unwrap().effect,
            SpellEffect::Freeze { ticks: 16 }
        );
    }

    #[test]
    fn test_rejects_negative_max_hit() {
        let toml = r#"
[[spells]]
id = 1
name = "Broken"
level = 1
base_experience = 1.0
max_hit = -3
"#;
        assert!(matches!(parse_spells(toml), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_bundled_spells() {
        let registry = parse_spells(include_str!("../../config/spells.toml")).unwrap();
        assert!(registry.get(1152).is_some());
        assert!(registry.get(1592).is_some());
    }
}
