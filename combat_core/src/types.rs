//! Core types shared by the scheduler, the entity model and combat

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a player or NPC combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A tile on the game map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub z: i32,
}

impl Position {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Position { x, y, z }
    }

    /// Chebyshev distance between two tiles on the same plane.
    ///
    /// Tiles on different planes are treated as infinitely far apart.
    pub fn distance(&self, other: &Position) -> i32 {
        if self.z != other.z {
            return i32::MAX;
        }
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Check whether `other` is within `distance` tiles
    pub fn within_distance(&self, other: &Position, distance: i32) -> bool {
        self.distance(other) <= distance
    }

    /// One straight-line step toward `target` (diagonals allowed)
    pub fn step_towards(&self, target: &Position) -> Position {
        Position {
            x: self.x + (target.x - self.x).signum(),
            y: self.y + (target.y - self.y).signum(),
            z: self.z,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Combat style of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatType {
    Melee,
    Ranged,
    Magic,
}

/// Trainable skills that combat reads or rewards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Attack,
    Defence,
    Strength,
    Hitpoints,
    Ranged,
    Prayer,
    Magic,
    Agility,
}

impl Skill {
    pub const COUNT: usize = 8;

    /// Get all skills in index order
    pub fn all() -> &'static [Skill] {
        &[
            Skill::Attack,
            Skill::Defence,
            Skill::Strength,
            Skill::Hitpoints,
            Skill::Ranged,
            Skill::Prayer,
            Skill::Magic,
            Skill::Agility,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Equipment slot for worn items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Head,
    Cape,
    Amulet,
    Weapon,
    Body,
    Shield,
    Legs,
    Hands,
    Feet,
    Ring,
    Arrows,
}

/// Index into the equipment bonus array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bonus {
    StabAttack,
    SlashAttack,
    CrushAttack,
    MagicAttack,
    RangedAttack,
    StabDefence,
    SlashDefence,
    CrushDefence,
    MagicDefence,
    RangedDefence,
    Strength,
    RangedStrength,
    Prayer,
}

impl Bonus {
    pub const COUNT: usize = 13;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// The attack bonus a fight type rolls against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackBonusType {
    Stab,
    Slash,
    Crush,
    Ranged,
    Magic,
}

impl AttackBonusType {
    pub fn attack_bonus(self) -> Bonus {
        match self {
            AttackBonusType::Stab => Bonus::StabAttack,
            AttackBonusType::Slash => Bonus::SlashAttack,
            AttackBonusType::Crush => Bonus::CrushAttack,
            AttackBonusType::Ranged => Bonus::RangedAttack,
            AttackBonusType::Magic => Bonus::MagicAttack,
        }
    }

    pub fn defence_bonus(self) -> Bonus {
        match self {
            AttackBonusType::Stab => Bonus::StabDefence,
            AttackBonusType::Slash => Bonus::SlashDefence,
            AttackBonusType::Crush => Bonus::CrushDefence,
            AttackBonusType::Ranged => Bonus::RangedDefence,
            AttackBonusType::Magic => Bonus::MagicDefence,
        }
    }

    /// Bonus type used for a round of the given style when no fight type applies
    pub fn for_combat_type(combat_type: CombatType, melee: AttackBonusType) -> Self {
        match combat_type {
            CombatType::Melee => melee,
            CombatType::Ranged => AttackBonusType::Ranged,
            CombatType::Magic => AttackBonusType::Magic,
        }
    }
}

/// Selected attack style on the weapon interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FightStyle {
    Accurate,
    Aggressive,
    Defensive,
    Controlled,
    Rapid,
    LongRange,
}

impl FightStyle {
    /// Invisible accuracy bonus
    pub fn accuracy_bonus(self) -> i32 {
        match self {
            FightStyle::Accurate => 3,
            FightStyle::Controlled => 1,
            _ => 0,
        }
    }

    /// Invisible strength (or ranged strength) bonus
    pub fn strength_bonus(self, combat_type: CombatType) -> i32 {
        match (combat_type, self) {
            (CombatType::Melee, FightStyle::Aggressive) => 3,
            (CombatType::Melee, FightStyle::Controlled) => 1,
            (CombatType::Ranged, FightStyle::Accurate) => 3,
            _ => 0,
        }
    }

    /// Invisible defence bonus
    pub fn defence_bonus(self) -> i32 {
        match self {
            FightStyle::Defensive | FightStyle::LongRange => 3,
            FightStyle::Controlled => 1,
            _ => 0,
        }
    }

    /// Skills that share the experience of a round
    pub fn trained_skills(self, combat_type: CombatType) -> &'static [Skill] {
        match (combat_type, self) {
            (CombatType::Magic, _) => &[Skill::Magic],
            (CombatType::Ranged, FightStyle::LongRange | FightStyle::Defensive) => {
                &[Skill::Ranged, Skill::Defence]
            }
            (CombatType::Ranged, _) => &[Skill::Ranged],
            (CombatType::Melee, FightStyle::Accurate) => &[Skill::Attack],
            (CombatType::Melee, FightStyle::Aggressive) => &[Skill::Strength],
            (CombatType::Melee, FightStyle::Defensive) => &[Skill::Defence],
            (CombatType::Melee, FightStyle::Controlled) => {
                &[Skill::Attack, Skill::Strength, Skill::Defence]
            }
            (CombatType::Melee, _) => &[Skill::Attack],
        }
    }
}

/// A fight type: the style plus the bonus it rolls against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightType {
    pub style: FightStyle,
    pub bonus: AttackBonusType,
}

impl Default for FightType {
    fn default() -> Self {
        FightType {
            style: FightStyle::Accurate,
            bonus: AttackBonusType::Crush,
        }
    }
}
