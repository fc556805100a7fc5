//! Player-only combat state

use super::equipment::Equipment;
use super::prayer::PrayerBook;
use crate::types::{EquipmentSlot, FightType};
use serde::{Deserialize, Serialize};

/// Maximum special attack energy and run energy
pub const MAX_ENERGY: i32 = 100;

/// How the wielded weapon attacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WeaponKind {
    Melee,
    /// Fires ammunition from the arrow slot
    Bow { distance: i32 },
    /// Throws the wielded item itself
    Thrown { distance: i32 },
}

/// Attack speed and animation of the wielded weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponInterface {
    /// Ticks between rounds
    pub attack_speed: i32,
    pub animation: u16,
    pub kind: WeaponKind,
}

impl Default for WeaponInterface {
    fn default() -> Self {
        WeaponInterface::unarmed()
    }
}

impl WeaponInterface {
    pub fn unarmed() -> Self {
        WeaponInterface {
            attack_speed: 4,
            animation: 422,
            kind: WeaponKind::Melee,
        }
    }

    pub fn melee(attack_speed: i32, animation: u16) -> Self {
        WeaponInterface {
            attack_speed,
            animation,
            kind: WeaponKind::Melee,
        }
    }

    pub fn bow(attack_speed: i32, distance: i32) -> Self {
        WeaponInterface {
            attack_speed,
            animation: 426,
            kind: WeaponKind::Bow { distance },
        }
    }

    pub fn thrown(attack_speed: i32, distance: i32) -> Self {
        WeaponInterface {
            attack_speed,
            animation: 806,
            kind: WeaponKind::Thrown { distance },
        }
    }

    pub fn is_ranged(&self) -> bool {
        !matches!(self.kind, WeaponKind::Melee)
    }

    /// Slot ammunition is taken from, if the weapon uses any
    pub fn ammo_slot(&self) -> Option<EquipmentSlot> {
        match self.kind {
            WeaponKind::Melee => None,
            WeaponKind::Bow { .. } => Some(EquipmentSlot::Arrows),
            WeaponKind::Thrown { .. } => Some(EquipmentSlot::Weapon),
        }
    }

    /// Attack distance of a ranged weapon
    pub fn ranged_distance(&self) -> Option<i32> {
        match self.kind {
            WeaponKind::Melee => None,
            WeaponKind::Bow { distance } | WeaponKind::Thrown { distance } => Some(distance),
        }
    }
}

/// Special attack bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialAttackState {
    pub energy: i32,
    /// Set when the player toggles the bar; consumed by the next round
    pub activated: bool,
}

impl Default for SpecialAttackState {
    fn default() -> Self {
        SpecialAttackState {
            energy: MAX_ENERGY,
            activated: false,
        }
    }
}

impl SpecialAttackState {
    /// Take `cost` energy. Returns `false` (and takes nothing) if there is not enough.
    pub fn drain(&mut self, cost: i32) -> bool {
        if self.energy < cost {
            return false;
        }
        self.energy -= cost;
        true
    }

    pub fn restore(&mut self, amount: i32) {
        self.energy = (self.energy + amount).min(MAX_ENERGY);
    }
}

/// State only players carry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub username: String,
    pub equipment: Equipment,
    pub weapon: WeaponInterface,
    pub fight_type: FightType,
    pub prayers: PrayerBook,
    /// Spell cast every round until cleared
    pub autocast_spell: Option<u16>,
    /// Spell queued for a single cast
    pub cast_spell: Option<u16>,
    pub special: SpecialAttackState,
    pub run_energy: i32,
    pub auto_retaliate: bool,
}

impl PlayerState {
    pub fn new(username: impl Into<String>) -> Self {
        PlayerState {
            username: username.into(),
            equipment: Equipment::new(),
            weapon: WeaponInterface::unarmed(),
            fight_type: FightType::default(),
            prayers: PrayerBook::new(),
            autocast_spell: None,
            cast_spell: None,
            special: SpecialAttackState::default(),
            run_energy: MAX_ENERGY,
            auto_retaliate: true,
        }
    }

    /// Spell the next round will cast, single casts taking priority
    pub fn current_spell(&self) -> Option<u16> {
        self.cast_spell.or(self.autocast_spell)
    }

    pub fn drain_run_energy(&mut self, amount: i32) {
        self.run_energy = (self.run_energy - amount).max(0);
    }
}
