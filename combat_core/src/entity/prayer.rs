//! Prayers - the active prayer set and the multipliers it contributes

use crate::types::CombatType;
use serde::{Deserialize, Serialize};

/// A prayer from the standard prayer book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prayer {
    ThickSkin,
    BurstOfStrength,
    ClarityOfThought,
    SharpEye,
    MysticWill,
    RockSkin,
    SuperhumanStrength,
    ImprovedReflexes,
    HawkEye,
    MysticLore,
    SteelSkin,
    UltimateStrength,
    IncredibleReflexes,
    EagleEye,
    MysticMight,
    ProtectFromMagic,
    ProtectFromMissiles,
    ProtectFromMelee,
    Retribution,
    Redemption,
    Smite,
}

/// Prayers in the same group cannot be active together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrayerGroup {
    Defence,
    Strength,
    Attack,
    Ranged,
    Magic,
    Overhead,
}

impl Prayer {
    fn group(self) -> PrayerGroup {
        use Prayer::*;
        match self {
            ThickSkin | RockSkin | SteelSkin => PrayerGroup::Defence,
            BurstOfStrength | SuperhumanStrength | UltimateStrength => PrayerGroup::Strength,
            ClarityOfThought | ImprovedReflexes | IncredibleReflexes => PrayerGroup::Attack,
            SharpEye | HawkEye | EagleEye => PrayerGroup::Ranged,
            MysticWill | MysticLore | MysticMight => PrayerGroup::Magic,
            ProtectFromMagic | ProtectFromMissiles | ProtectFromMelee | Retribution
            | Redemption | Smite => PrayerGroup::Overhead,
        }
    }

    /// Multiplier tier of a boosting prayer: 1, 2 or 3 (0 for non-boosting)
    fn tier(self) -> u8 {
        use Prayer::*;
        match self {
            ThickSkin | BurstOfStrength | ClarityOfThought | SharpEye | MysticWill => 1,
            RockSkin | SuperhumanStrength | ImprovedReflexes | HawkEye | MysticLore => 2,
            SteelSkin | UltimateStrength | IncredibleReflexes | EagleEye | MysticMight => 3,
            _ => 0,
        }
    }

    /// Combat style this prayer protects from, if it is a protection prayer
    pub fn protects_from(self) -> Option<CombatType> {
        match self {
            Prayer::ProtectFromMelee => Some(CombatType::Melee),
            Prayer::ProtectFromMissiles => Some(CombatType::Ranged),
            Prayer::ProtectFromMagic => Some(CombatType::Magic),
            _ => None,
        }
    }
}

/// Multiplier for a boosting prayer tier (5/10/15%)
fn tier_multiplier(tier: u8) -> f64 {
    match tier {
        1 => 1.05,
        2 => 1.10,
        3 => 1.15,
        _ => 1.0,
    }
}

/// Currently active prayers of one player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrayerBook {
    active: Vec<Prayer>,
}

impl PrayerBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate a prayer, switching off any conflicting one
    pub fn activate(&mut self, prayer: Prayer) {
        let group = prayer.group();
        self.active.retain(|p| p.group() != group);
        self.active.push(prayer);
    }

    pub fn deactivate(&mut self, prayer: Prayer) {
        self.active.retain(|p| *p != prayer);
    }

    pub fn is_active(&self, prayer: Prayer) -> bool {
        self.active.contains(&prayer)
    }

    /// Switch every prayer off (prayer points ran out, death)
    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn active(&self) -> &[Prayer] {
        &self.active
    }

    fn group_multiplier(&self, group: PrayerGroup) -> f64 {
        self.active
            .iter()
            .find(|p| p.group() == group)
            .map(|p| tier_multiplier(p.tier()))
            .unwrap_or(1.0)
    }

    pub fn attack_multiplier(&self) -> f64 {
        self.group_multiplier(PrayerGroup::Attack)
    }

    pub fn strength_multiplier(&self) -> f64 {
        self.group_multiplier(PrayerGroup::Strength)
    }

    pub fn defence_multiplier(&self) -> f64 {
        self.group_multiplier(PrayerGroup::Defence)
    }

    pub fn ranged_multiplier(&self) -> f64 {
        self.group_multiplier(PrayerGroup::Ranged)
    }

    pub fn magic_multiplier(&self) -> f64 {
        self.group_multiplier(PrayerGroup::Magic)
    }

    /// Style the active protection prayer covers
    pub fn protection(&self) -> Option<CombatType> {
        self.active.iter().find_map(|p| p.protects_from())
    }

    /// Whether the active protection prayer covers `combat_type`
    pub fn protects_from(&self, combat_type: CombatType) -> bool {
        self.protection() == Some(combat_type)
    }
}
