//! Barrows armour sets and their on-hit effects

use crate::entity::{Entity, Equipment};
use crate::types::{CombatType, EquipmentSlot, Skill};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A full barrows set: helm, weapon, body and legs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmourSet {
    Ahrim,
    Dharok,
    Guthan,
    Karil,
    Torag,
    Verac,
}

impl ArmourSet {
    pub fn all() -> &'static [ArmourSet] {
        &[
            ArmourSet::Ahrim,
            ArmourSet::Dharok,
            ArmourSet::Guthan,
            ArmourSet::Karil,
            ArmourSet::Torag,
            ArmourSet::Verac,
        ]
    }

    /// Item ids in head, weapon, body, legs order
    pub fn pieces(self) -> [u16; 4] {
        match self {
            ArmourSet::Ahrim => [4708, 4710, 4712, 4714],
            ArmourSet::Dharok => [4716, 4718, 4720, 4722],
            ArmourSet::Guthan => [4724, 4726, 4728, 4730],
            ArmourSet::Karil => [4732, 4734, 4736, 4738],
            ArmourSet::Torag => [4745, 4747, 4749, 4751],
            ArmourSet::Verac => [4753, 4755, 4757, 4759],
        }
    }

    /// Graphic played on the victim when the effect fires
    pub fn graphic(self) -> Option<u16> {
        match self {
            ArmourSet::Guthan => Some(398),
            ArmourSet::Torag => Some(399),
            ArmourSet::Ahrim => Some(400),
            ArmourSet::Karil => Some(401),
            ArmourSet::Verac => Some(1041),
            ArmourSet::Dharok => None,
        }
    }

    /// Style a round must be for the on-hit effect to apply
    fn effect_style(self) -> Option<CombatType> {
        match self {
            ArmourSet::Guthan | ArmourSet::Torag => Some(CombatType::Melee),
            ArmourSet::Ahrim => Some(CombatType::Magic),
            ArmourSet::Karil => Some(CombatType::Ranged),
            ArmourSet::Dharok | ArmourSet::Verac => None,
        }
    }
}

pub(crate) const SET_SLOTS: [EquipmentSlot; 4] = [
    EquipmentSlot::Head,
    EquipmentSlot::Weapon,
    EquipmentSlot::Body,
    EquipmentSlot::Legs,
];

/// Whether every piece of `set` is worn in its slot
pub fn wearing_set(equipment: &Equipment, set: ArmourSet) -> bool {
    SET_SLOTS
        .iter()
        .zip(set.pieces())
        .all(|(slot, id)| equipment.item_id(*slot) == Some(id))
}

/// The full set an equipment loadout wears, if any
pub fn worn_set(equipment: &Equipment) -> Option<ArmourSet> {
    ArmourSet::all()
        .iter()
        .copied()
        .find(|set| wearing_set(equipment, *set))
}

/// Run energy Torag's effect drains
const TORAG_RUN_DRAIN: i32 = 20;

/// Roll the attacker's set effect for an accurate round that dealt `damage`.
///
/// Returns the set whose effect fired.
pub fn apply_set_effect<R: Rng + ?Sized>(
    attacker: &mut Entity,
    victim: &mut Entity,
    combat_type: CombatType,
    damage: i32,
    chance: f64,
    rng: &mut R,
) -> Option<ArmourSet> {
    let set = worn_set(&attacker.player()?.equipment)?;
    if set.effect_style() != Some(combat_type) {
        return None;
    }

    // Stat drains only fire against a full stat.
    let drained = match set {
        ArmourSet::Ahrim => Some(Skill::Strength),
        ArmourSet::Karil => Some(Skill::Agility),
        _ => None,
    };
    if let Some(skill) = drained {
        if !victim.skills.get(skill).is_full() {
            return None;
        }
    }

    if !rng.gen_bool(chance) {
        return None;
    }

    match set {
        ArmourSet::Guthan => attacker.heal(damage),
        ArmourSet::Torag => {
            if let Some(player) = victim.player_mut() {
                player.drain_run_energy(TORAG_RUN_DRAIN);
            }
        }
        ArmourSet::Ahrim | ArmourSet::Karil => {
            if let Some(skill) = drained {
                let amount = rng.gen_range(1..=10);
                victim.skills.drain(skill, amount);
            }
        }
        ArmourSet::Dharok | ArmourSet::Verac => return None,
    }
    Some(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Item, PlayerState, Skills};
    use crate::types::Position;
    use rand::rngs::mock::StepRng;

    fn wearing(set: Option<ArmourSet>) -> Entity {
        let mut state = PlayerState::new("barrows");
        if let Some(set) = set {
            for (slot, id) in SET_SLOTS.iter().zip(set.pieces()) {
                state.equipment.equip(*slot, Item::single(id));
            }
        }
        Entity::new_player(
            state,
            Position::default(),
            Skills::with_levels(&[(Skill::Hitpoints, 99), (Skill::Strength, 99)]),
        )
    }

    #[test]
    fn test_worn_set_detection() {
        assert_eq!(worn_set(&wearing(Some(ArmourSet::Karil)).player().unwrap().equipment), Some(ArmourSet::Karil));
        assert_eq!(worn_set(&wearing(None).player().unwrap().equipment), None);
    }

    #[test]
    fn test_partial_set_does_not_count() {
        let mut entity = wearing(Some(ArmourSet::Dharok));
        entity.player_mut().unwrap().equipment.unequip(EquipmentSlot::Legs);
        assert!(!wearing_set(&entity.player().unwrap().equipment, ArmourSet::Dharok));
    }

    #[test]
    fn test_guthan_heals_attacker() {
        let mut attacker = wearing(Some(ArmourSet::Guthan));
        attacker.skills.set_level(Skill::Hitpoints, 50);
        let mut victim = wearing(None);
        let mut rng = StepRng::new(0, 0);

        let fired = apply_set_effect(&mut attacker, &mut victim, CombatType::Melee, 20, 0.25, &mut rng);
        assert_eq!(fired, Some(ArmourSet::Guthan));
        assert_eq!(attacker.hitpoints(), 70);
    }

    #[test]
    fn test_effect_needs_matching_style() {
        let mut attacker = wearing(Some(ArmourSet::Guthan));
        let mut victim = wearing(None);
        let mut rng = StepRng::new(0, 0);
        assert_eq!(
            apply_set_effect(&mut attacker, &mut victim, CombatType::Ranged, 20, 0.25, &mut rng),
            None
        );
    }

    #[test]
    fn test_ahrim_needs_full_strength() {
        let mut attacker = wearing(Some(ArmourSet::Ahrim));
        let mut victim = wearing(None);
        let mut rng = StepRng::new(0, 0);

        let fired = apply_set_effect(&mut attacker, &mut victim, CombatType::Magic, 5, 1.0, &mut rng);
        assert_eq!(fired, Some(ArmourSet::Ahrim));
        // StepRng(0) picks the low end of 1..=10
        assert_eq!(victim.skills.level(Skill::Strength), 98);

        let again = apply_set_effect(&mut attacker, &mut victim, CombatType::Magic, 5, 1.0, &mut rng);
        assert_eq!(again, None);
    }

    #[test]
    fn test_torag_drains_run_energy() {
        let mut attacker = wearing(Some(ArmourSet::Torag));
        let mut victim = wearing(None);
        let mut rng = StepRng::new(0, 0);
        apply_set_effect(&mut attacker, &mut victim, CombatType::Melee, 5, 1.0, &mut rng);
        assert_eq!(victim.player().unwrap().run_energy, 80);
    }

    #[test]
    fn test_zero_chance_never_fires() {
        let mut attacker = wearing(Some(ArmourSet::Guthan));
        let mut victim = wearing(None);
        let mut rng = StepRng::new(0, 0);
        assert_eq!(
            apply_set_effect(&mut attacker, &mut victim, CombatType::Melee, 5, 0.0, &mut rng),
            None
        );
    }
}
