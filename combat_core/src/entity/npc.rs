//! NPC definitions and per-spawn NPC state

use super::skills::Skills;
use crate::types::{AttackBonusType, CombatType, Position, Skill};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which strategy an NPC fights with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcStrategy {
    /// Plain melee, ranged or magic according to `combat_type`
    #[default]
    Standard,
    /// Melee with a chance of dragonfire
    Dragon,
}

/// Combat levels of an NPC definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcLevels {
    #[serde(default = "default_level")]
    pub attack: i32,
    #[serde(default = "default_level")]
    pub strength: i32,
    #[serde(default = "default_level")]
    pub defence: i32,
    #[serde(default = "default_level")]
    pub ranged: i32,
    #[serde(default = "default_level")]
    pub magic: i32,
}

impl Default for NpcLevels {
    fn default() -> Self {
        NpcLevels {
            attack: 1,
            strength: 1,
            defence: 1,
            ranged: 1,
            magic: 1,
        }
    }
}

fn default_level() -> i32 {
    1
}

/// Defence bonuses of an NPC definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NpcDefenceBonuses {
    #[serde(default)]
    pub stab: i32,
    #[serde(default)]
    pub slash: i32,
    #[serde(default)]
    pub crush: i32,
    #[serde(default)]
    pub ranged: i32,
    #[serde(default)]
    pub magic: i32,
}

/// Static data shared by every spawn of an NPC id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcDefinition {
    pub id: u16,
    pub name: String,
    pub hitpoints: i32,
    pub max_hit: i32,
    #[serde(default = "default_attack_speed")]
    pub attack_speed: i32,

    // === Rolls ===
    #[serde(default)]
    pub levels: NpcLevels,
    #[serde(default)]
    pub attack_bonus: i32,
    #[serde(default)]
    pub defence: NpcDefenceBonuses,

    // === Behaviour ===
    #[serde(default = "default_combat_type")]
    pub combat_type: CombatType,
    #[serde(default)]
    pub strategy: NpcStrategy,
    #[serde(default = "default_attack_distance")]
    pub attack_distance: i32,
    #[serde(default)]
    pub projectile: Option<u16>,
    /// Walks home when dragged past its retreat radius
    #[serde(default = "default_true")]
    pub retreats: bool,
    #[serde(default)]
    pub poisonous: bool,
    /// Styles that cannot damage this NPC
    #[serde(default)]
    pub immune_to: Vec<CombatType>,

    // === Animations ===
    #[serde(default = "default_attack_animation")]
    pub attack_animation: u16,
    #[serde(default = "default_defence_animation")]
    pub defence_animation: u16,
    #[serde(default = "default_death_animation")]
    pub death_animation: u16,
}

fn default_attack_speed() -> i32 {
    4
}
fn default_combat_type() -> CombatType {
    CombatType::Melee
}
fn default_attack_distance() -> i32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_attack_animation() -> u16 {
    422
}
fn default_defence_animation() -> u16 {
    404
}
fn default_death_animation() -> u16 {
    836
}

impl NpcDefinition {
    /// Fresh skill set for a spawn of this definition
    pub fn skills(&self) -> Skills {
        Skills::with_levels(&[
            (Skill::Attack, self.levels.attack),
            (Skill::Strength, self.levels.strength),
            (Skill::Defence, self.levels.defence),
            (Skill::Ranged, self.levels.ranged),
            (Skill::Magic, self.levels.magic),
            (Skill::Hitpoints, self.hitpoints),
        ])
    }

    /// Defence bonus against a style, melee using the best of stab/slash/crush
    pub fn defence_bonus(&self, combat_type: CombatType) -> i32 {
        match combat_type {
            CombatType::Melee => self.defence.stab.max(self.defence.slash).max(self.defence.crush),
            CombatType::Ranged => self.defence.ranged,
            CombatType::Magic => self.defence.magic,
        }
    }

    /// Defence bonus against one attack bonus type
    pub fn defence_against(&self, bonus: AttackBonusType) -> i32 {
        match bonus {
            AttackBonusType::Stab => self.defence.stab,
            AttackBonusType::Slash => self.defence.slash,
            AttackBonusType::Crush => self.defence.crush,
            AttackBonusType::Ranged => self.defence.ranged,
            AttackBonusType::Magic => self.defence.magic,
        }
    }

    pub fn is_immune_to(&self, combat_type: CombatType) -> bool {
        self.immune_to.contains(&combat_type)
    }
}

/// Most defence-weaken stacks an NPC can carry
pub const MAX_WEAKEN_STACKS: u8 = 3;

/// State only NPCs carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcState {
    pub definition: NpcDefinition,
    /// Where the NPC respawns and retreats to
    pub spawn: Position,
    /// Defence-weaken debuff stacks (0..=3)
    pub weakened: u8,
}

impl NpcState {
    pub fn new(definition: NpcDefinition, spawn: Position) -> Self {
        NpcState {
            definition,
            spawn,
            weakened: 0,
        }
    }

    /// Add one weaken stack, saturating at the maximum
    pub fn weaken(&mut self) {
        self.weakened = (self.weakened + 1).min(MAX_WEAKEN_STACKS);
    }
}

/// NPC definition registry
#[derive(Debug, Clone, Default)]
pub struct NpcDefinitions {
    definitions: HashMap<u16, NpcDefinition>,
}

impl NpcDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: NpcDefinition) {
        self.definitions.insert(definition.id, definition);
    }

    pub fn get(&self, id: u16) -> Option<&NpcDefinition> {
        self.definitions.get(&id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goblin() -> NpcDefinition {
        NpcDefinition {
            id: 100,
            name: "Goblin".to_string(),
            hitpoints: 5,
            max_hit: 1,
            attack_speed: 4,
            levels: NpcLevels::default(),
            attack_bonus: 0,
            defence: NpcDefenceBonuses {
                stab: -5,
                slash: 2,
                crush: 0,
                ranged: 0,
                magic: 0,
            },
            combat_type: CombatType::Melee,
            strategy: NpcStrategy::Standard,
            attack_distance: 1,
            projectile: None,
            retreats: true,
            poisonous: false,
            immune_to: Vec::new(),
            attack_animation: 6184,
            defence_animation: 6183,
            death_animation: 6182,
        }
    }

    #[test]
    fn test_skills_from_definition() {
        let skills = goblin().skills();
        assert_eq!(skills.level(Skill::Hitpoints), 5);
        assert_eq!(skills.level(Skill::Defence), 1);
    }

    #[test]
    fn test_melee_defence_uses_best_bonus() {
        assert_eq!(goblin().defence_bonus(CombatType::Melee), 2);
    }

    #[test]
    fn test_weaken_saturates() {
        let mut state = NpcState::new(goblin(), Position::default());
        for _ in 0..5 {
            state.weaken();
        }
        assert_eq!(state.weakened, MAX_WEAKEN_STACKS);
    }

    #[test]
    fn test_definition_defaults_from_toml() {
        let def: NpcDefinition = toml::from_str(
            r#"
id = 1
name = "Man"
hitpoints = 7
max_hit = 1
"#,
        )
        .unwrap();
        assert_eq!(def.attack_speed, 4);
        assert_eq!(def.attack_distance, 1);
        assert!(def.retreats);
        assert_eq!(def.strategy, NpcStrategy::Standard);
    }
}
