//! Combat constants configuration

use super::ConfigError;
use crate::combat::armour::ArmourSet;
use crate::types::CombatType;
use serde::{Deserialize, Serialize};

/// Tunable combat constants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatConfig {
    #[serde(default)]
    pub timing: TimingConstants,
    #[serde(default)]
    pub range: RangeConstants,
    #[serde(default)]
    pub effects: EffectConstants,
    #[serde(default)]
    pub formulas: FormulaConstants,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConstants {
    /// Wall-clock length of one tick in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Ticks between a melee round and its damage
    #[serde(default = "default_melee_hit_delay")]
    pub melee_hit_delay: u32,
    #[serde(default = "default_ranged_hit_delay")]
    pub ranged_hit_delay: u32,
    #[serde(default = "default_magic_hit_delay")]
    pub magic_hit_delay: u32,
    /// Extra ticks before the 3rd and 4th hit of a round land
    #[serde(default = "default_stagger_delay")]
    pub stagger_delay: u32,
    /// Cooldown entered when the victim is mid-teleport
    #[serde(default = "default_teleport_cooldown")]
    pub teleport_cooldown: i32,
    /// Ticks between dying and the death sequence finishing
    #[serde(default = "default_death_delay")]
    pub death_delay: u32,
    /// How long after the last hit an entity still counts as under attack
    #[serde(default = "default_combat_timeout_ms")]
    pub combat_timeout_ms: u64,
    /// Damage older than this is ignored when picking the killer
    #[serde(default = "default_attribution_window_ms")]
    pub attribution_window_ms: u64,
}

impl Default for TimingConstants {
    fn default() -> Self {
        TimingConstants {
            tick_ms: 600,
            melee_hit_delay: 1,
            ranged_hit_delay: 2,
            magic_hit_delay: 3,
            stagger_delay: 1,
            teleport_cooldown: 10,
            death_delay: 4,
            combat_timeout_ms: 5_000,
            attribution_window_ms: 60_000,
        }
    }
}

fn default_tick_ms() -> u64 {
    600
}
fn default_melee_hit_delay() -> u32 {
    1
}
fn default_ranged_hit_delay() -> u32 {
    2
}
fn default_magic_hit_delay() -> u32 {
    3
}
fn default_stagger_delay() -> u32 {
    1
}
fn default_teleport_cooldown() -> i32 {
    10
}
fn default_death_delay() -> u32 {
    4
}
fn default_combat_timeout_ms() -> u64 {
    5_000
}
fn default_attribution_window_ms() -> u64 {
    60_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeConstants {
    /// Sessions end once the target is further than this
    #[serde(default = "default_view_distance")]
    pub view_distance: i32,
    /// NPCs further than this from their spawn walk home
    #[serde(default = "default_retreat_radius")]
    pub npc_retreat_radius: i32,
    /// Extra attack distance while the attacker is moving
    #[serde(default = "default_moving_bonus")]
    pub moving_bonus: i32,
    /// Further extra attack distance while the attacker is running
    #[serde(default = "default_running_bonus")]
    pub running_bonus: i32,
}

impl Default for RangeConstants {
    fn default() -> Self {
        RangeConstants {
            view_distance: 15,
            npc_retreat_radius: 8,
            moving_bonus: 1,
            running_bonus: 2,
        }
    }
}

fn default_view_distance() -> i32 {
    15
}
fn default_retreat_radius() -> i32 {
    8
}
fn default_moving_bonus() -> i32 {
    1
}
fn default_running_bonus() -> i32 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectConstants {
    /// Chance a barrows set effect fires on an accurate round
    #[serde(default = "default_armour_proc_chance")]
    pub armour_proc_chance: f64,
    /// Chance a ranged round drops its ammunition under the victim
    #[serde(default = "default_ammo_drop_chance")]
    pub ammo_drop_chance: f64,
    /// Fraction of player damage a matching protection prayer removes
    #[serde(default = "default_protection_reduction")]
    pub protection_reduction: f64,
    /// Ticks between poison hits
    #[serde(default = "default_poison_interval")]
    pub poison_interval: u32,
    /// Poison hits before the damage drops by one
    #[serde(default = "default_poison_decay_hits")]
    pub poison_decay_hits: u32,
    /// Ticks between special energy restores
    #[serde(default = "default_special_restore_interval")]
    pub special_restore_interval: u32,
    #[serde(default = "default_special_restore_amount")]
    pub special_restore_amount: i32,
    /// Redemption fires below this fraction of maximum hitpoints
    #[serde(default = "default_redemption_threshold")]
    pub redemption_threshold: f64,
    /// Fraction of the prayer level Redemption heals
    #[serde(default = "default_redemption_heal")]
    pub redemption_heal: f64,
    /// Fraction of the prayer level Retribution can hit
    #[serde(default = "default_retribution_max")]
    pub retribution_max: f64,
    /// Damage per prayer point Smite drains
    #[serde(default = "default_smite_divisor")]
    pub smite_divisor: i32,
    #[serde(default = "default_dragonfire_chance")]
    pub dragonfire_chance: f64,
    #[serde(default = "default_dragonfire_max")]
    pub dragonfire_max: i32,
    /// Dragonfire cap while wielding an anti-dragon shield
    #[serde(default = "default_dragonfire_shielded_max")]
    pub dragonfire_shielded_max: i32,
}

impl Default for EffectConstants {
    fn default() -> Self {
        EffectConstants {
            armour_proc_chance: 0.25,
            ammo_drop_chance: 0.5,
            protection_reduction: 0.4,
            poison_interval: 30,
            poison_decay_hits: 4,
            special_restore_interval: 50,
            special_restore_amount: 10,
            redemption_threshold: 0.1,
            redemption_heal: 0.25,
            retribution_max: 0.25,
            smite_divisor: 4,
            dragonfire_chance: 0.25,
            dragonfire_max: 50,
            dragonfire_shielded_max: 10,
        }
    }
}

fn default_armour_proc_chance() -> f64 {
    0.25
}
fn default_ammo_drop_chance() -> f64 {
    0.5
}
fn default_protection_reduction() -> f64 {
    0.4
}
fn default_poison_interval() -> u32 {
    30
}
fn default_poison_decay_hits() -> u32 {
    4
}
fn default_special_restore_interval() -> u32 {
    50
}
fn default_special_restore_amount() -> i32 {
    10
}
fn default_redemption_threshold() -> f64 {
    0.1
}
fn default_redemption_heal() -> f64 {
    0.25
}
fn default_retribution_max() -> f64 {
    0.25
}
fn default_smite_divisor() -> i32 {
    4
}
fn default_dragonfire_chance() -> f64 {
    0.25
}
fn default_dragonfire_max() -> i32 {
    50
}
fn default_dragonfire_shielded_max() -> i32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaConstants {
    /// NPC ids whose defence roll is cut by `defence_reduction`
    #[serde(default)]
    pub weak_defence_npcs: Vec<u16>,
    /// Worn sets that cut a player's defence roll by `defence_reduction`
    #[serde(default)]
    pub weak_defence_sets: Vec<ArmourSet>,
    /// Fraction of the defence roll removed for weak-defence NPCs and sets
    #[serde(default = "default_defence_reduction")]
    pub defence_reduction: f64,
    /// Multiplier on every experience drop
    #[serde(default = "default_experience_rate")]
    pub experience_rate: f64,
}

impl Default for FormulaConstants {
    fn default() -> Self {
        FormulaConstants {
            weak_defence_npcs: Vec::new(),
            weak_defence_sets: Vec::new(),
            defence_reduction: 0.75,
            experience_rate: 1.0,
        }
    }
}

fn default_defence_reduction() -> f64 {
    0.75
}
fn default_experience_rate() -> f64 {
    1.0
}

impl CombatConfig {
    /// Hit-task delay for a round of the given style
    pub fn hit_delay(&self, combat_type: CombatType) -> u32 {
        match combat_type {
            CombatType::Melee => self.timing.melee_hit_delay,
            CombatType::Ranged => self.timing.ranged_hit_delay,
            CombatType::Magic => self.timing.magic_hit_delay,
        }
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chances = [
            ("armour_proc_chance", self.effects.armour_proc_chance),
            ("ammo_drop_chance", self.effects.ammo_drop_chance),
            ("protection_reduction", self.effects.protection_reduction),
            ("dragonfire_chance", self.effects.dragonfire_chance),
            ("defence_reduction", self.formulas.defence_reduction),
        ];
        for (name, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be within 0..=1, got {value}"
                )));
            }
        }
        if self.timing.tick_ms == 0 {
            return Err(ConfigError::ValidationError(
                "tick_ms must be positive".to_string(),
            ));
        }
        if self.effects.smite_divisor <= 0 {
            return Err(ConfigError::ValidationError(
                "smite_divisor must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
