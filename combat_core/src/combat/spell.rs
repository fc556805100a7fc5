//! Combat spells - descriptors loaded from configuration and the registry
//! strategies look them up in

use super::CombatError;
use crate::entity::Entity;
use crate::types::Skill;
use crate::world::WorldEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What an accurate cast does beyond its damage
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpellEffect {
    #[default]
    None,
    /// Stop the victim from moving
    Freeze { ticks: u32 },
    /// Poison the victim starting at `damage`
    Poison { damage: i32 },
    /// One defence-weaken stack on NPC victims
    WeakenDefence,
    /// Lower a skill by a fraction of its maximum, only if it is not already lowered
    Drain { skill: Skill, percent: f64 },
}

/// A combat spell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellDescriptor {
    pub id: u16,
    pub name: String,
    /// Magic level required to cast
    pub level: i32,
    pub base_experience: f64,
    pub max_hit: i32,

    // === Visuals ===
    #[serde(default = "default_animation")]
    pub animation: u16,
    #[serde(default)]
    pub start_graphic: Option<u16>,
    #[serde(default)]
    pub projectile: Option<u16>,
    #[serde(default)]
    pub end_graphic: Option<u16>,

    #[serde(default)]
    pub effect: SpellEffect,
    /// Told to the caster when the cast splashes
    #[serde(default)]
    pub failure_message: Option<String>,
}

fn default_animation() -> u16 {
    711
}

/// Graphic shown on the victim when a cast misses
pub const SPLASH_GRAPHIC: u16 = 85;

impl SpellDescriptor {
    pub fn can_cast(&self, caster: &Entity) -> bool {
        caster.skills.level(Skill::Magic) >= self.level
    }

    /// Failure side of a splashed cast
    pub fn on_failure(&self, caster: &Entity, events: &mut Vec<WorldEvent>) {
        let Some(text) = &self.failure_message else {
            return;
        };
        if caster.is_player() {
            events.push(WorldEvent::Message {
                entity: caster.id,
                text: text.clone(),
            });
        }
    }

    /// Apply the on-hit effect of an accurate cast. Returns the poison damage
    /// the caller should start, since poison runs as its own task.
    pub fn apply_effect(&self, victim: &mut Entity) -> Option<i32> {
        match &self.effect {
            SpellEffect::None => None,
            SpellEffect::Freeze { ticks } => {
                victim.freeze(*ticks);
                None
            }
            SpellEffect::Poison { damage } => Some(*damage),
            SpellEffect::WeakenDefence => {
                if let Some(npc) = victim.npc_mut() {
                    npc.weaken();
                }
                None
            }
            SpellEffect::Drain { skill, percent } => {
                let level = victim.skills.get(*skill);
                if level.is_full() {
                    let amount = ((level.max as f64 * percent).floor() as i32).max(1);
                    victim.skills.drain(*skill, amount);
                }
                None
            }
        }
    }
}

/// Spell registry keyed by spell id
#[derive(Debug, Clone, Default)]
pub struct SpellRegistry {
    spells: HashMap<u16, SpellDescriptor>,
}

impl SpellRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spell: SpellDescriptor) {
        self.spells.insert(spell.id, spell);
    }

    pub fn get(&self, id: u16) -> Option<&SpellDescriptor> {
        self.spells.get(&id)
    }

    /// Look up a spell that must exist
    pub fn require(&self, id: u16) -> Result<&SpellDescriptor, CombatError> {
        self.spells.get(&id).ok_or(CombatError::UnknownSpell(id))
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{NpcDefinition, PlayerState, Skills};
    use crate::types::Position;

    fn bind() -> SpellDescriptor {
        SpellDescriptor {
            id: 1572,
            name: "Bind".to_string(),
            level: 20,
            base_experience: 30.0,
            max_hit: 0,
            animation: 710,
            start_graphic: Some(177),
            projectile: Some(178),
            end_graphic: Some(181),
            effect: SpellEffect::Freeze { ticks: 8 },
            failure_message: Some("Your spell failed to take hold.".to_string()),
        }
    }

    fn player(magic: i32) -> Entity {
        Entity::new_player(
            PlayerState::new("caster"),
            Position::default(),
            Skills::with_levels(&[(Skill::Magic, magic)]),
        )
    }

    #[test]
    fn test_level_requirement() {
        assert!(!bind().can_cast(&player(19)));
        assert!(bind().can_cast(&player(20)));
    }

    #[test]
    fn test_freeze_effect() {
        let mut victim = player(1);
        assert_eq!(bind().apply_effect(&mut victim), None);
        assert_eq!(victim.status.frozen_ticks, 8);
    }

    #[test]
    fn test_failure_tells_player_caster() {
        let caster = player(20);
        let mut events = Vec::new();
        bind().on_failure(&caster, &mut events);
        assert_eq!(
            events,
            vec![WorldEvent::Message {
                entity: caster.id,
                text: "Your spell failed to take hold.".to_string(),
            }]
        );

        let silent = SpellDescriptor {
            failure_message: None,
            ..bind()
        };
        let mut events = Vec::new();
        silent.on_failure(&caster, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn test_drain_only_when_full() {
        let spell = SpellDescriptor {
            effect: SpellEffect::Drain {
                skill: Skill::Attack,
                percent: 0.05,
            },
            ..bind()
        };
        let mut victim = Entity::new_player(
            PlayerState::new("victim"),
            Position::default(),
            Skills::with_levels(&[(Skill::Attack, 99)]),
        );
        spell.apply_effect(&mut victim);
        assert_eq!(victim.skills.level(Skill::Attack), 95);
        spell.apply_effect(&mut victim);
        assert_eq!(victim.skills.level(Skill::Attack), 95);
    }

    #[test]
    fn test_weaken_stacks_on_npc() {
        let spell = SpellDescriptor {
            effect: SpellEffect::WeakenDefence,
            ..bind()
        };
        let definition: NpcDefinition =
            toml::from_str("id = 1\nname = \"Man\"\nhitpoints = 7\nmax_hit = 1").unwrap();
        let mut npc = Entity::new_npc(definition, Position::default());
        spell.apply_effect(&mut npc);
        spell.apply_effect(&mut npc);
        assert_eq!(npc.npc().map(|n| n.weakened), Some(2));
    }

    #[test]
    fn test_require_unknown_spell() {
        let registry = SpellRegistry::new();
        assert_eq!(registry.require(9).unwrap_err(), CombatError::UnknownSpell(9));
    }

    #[test]
    fn test_effect_serialization() {
        let json = serde_json::to_string(&SpellEffect::Freeze { ticks: 8 }).unwrap();
        assert_eq!(json, r#"{"type":"freeze","ticks":8}"#);
    }
}
