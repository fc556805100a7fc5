//! Combat formulas - accuracy rolls, hit chance and maximum hits
//!
//! Everything here is a pure function of the combatants' current stats; the
//! only side effect is drawing from the supplied RNG in the `roll_*` helpers.

use super::armour::{self, ArmourSet};
use crate::config::CombatConfig;
use crate::entity::{Entity, EntityKind};
use crate::types::{AttackBonusType, Bonus, CombatType, Skill};
use rand::Rng;

/// Lowest hit chance any roll can produce
pub const MIN_HIT_CHANCE: f64 = 0.01;

/// Highest hit chance any roll can produce
pub const MAX_HIT_CHANCE: f64 = 0.99;

/// Per-round multipliers from special attacks and set effects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollModifiers {
    pub accuracy: f64,
    pub damage: f64,
    /// Treat the victim's defence roll as zero
    pub ignore_defence: bool,
}

impl Default for RollModifiers {
    fn default() -> Self {
        RollModifiers {
            accuracy: 1.0,
            damage: 1.0,
            ignore_defence: false,
        }
    }
}

/// Bonus type a round by `attacker` rolls against
pub fn attack_bonus_type(attacker: &Entity, combat_type: CombatType) -> AttackBonusType {
    let melee = match &attacker.kind {
        EntityKind::Player(player) => player.fight_type.bonus,
        EntityKind::Npc(_) => AttackBonusType::Slash,
    };
    AttackBonusType::for_combat_type(combat_type, melee)
}

/// Effective attack roll: `floor(bonus + level) * prayer + style`, times the
/// special attack multiplier
pub fn attack_roll(attacker: &Entity, combat_type: CombatType, special: f64) -> f64 {
    let (level, bonus, prayer, style) = match &attacker.kind {
        EntityKind::Player(player) => {
            let bonus_type = attack_bonus_type(attacker, combat_type);
            let bonus = player.equipment.bonus(bonus_type.attack_bonus());
            let style = player.fight_type.style.accuracy_bonus();
            match combat_type {
                CombatType::Melee => (
                    attacker.skills.level(Skill::Attack),
                    bonus,
                    player.prayers.attack_multiplier(),
                    style,
                ),
                CombatType::Ranged => (
                    attacker.skills.level(Skill::Ranged),
                    bonus,
                    player.prayers.ranged_multiplier(),
                    style,
                ),
                CombatType::Magic => (
                    attacker.skills.level(Skill::Magic),
                    bonus,
                    player.prayers.magic_multiplier(),
                    0,
                ),
            }
        }
        EntityKind::Npc(npc) => {
            let skill = match combat_type {
                CombatType::Melee => Skill::Attack,
                CombatType::Ranged => Skill::Ranged,
                CombatType::Magic => Skill::Magic,
            };
            (attacker.skills.level(skill), npc.definition.attack_bonus, 1.0, 0)
        }
    };
    let base = ((bonus + level) as f64).floor() * prayer + style as f64;
    (base * special).max(0.0)
}

/// Effective defence roll of `victim` against a round of `combat_type`
/// rolling against `bonus_type`
pub fn defence_roll(
    victim: &Entity,
    combat_type: CombatType,
    bonus_type: AttackBonusType,
    config: &CombatConfig,
) -> f64 {
    let defence = victim.skills.level(Skill::Defence);
    let level = match combat_type {
        CombatType::Magic => {
            let magic = victim.skills.level(Skill::Magic);
            (defence as f64 * 0.3 + magic as f64 * 0.7).floor() as i32
        }
        _ => defence,
    };

    let roll = match &victim.kind {
        EntityKind::Player(player) => {
            let bonus = player.equipment.bonus(bonus_type.defence_bonus());
            let style = player.fight_type.style.defence_bonus();
            let mut roll =
                ((bonus + level) as f64).floor() * player.prayers.defence_multiplier() + style as f64;
            let weak_set = armour::worn_set(&player.equipment)
                .is_some_and(|set| config.formulas.weak_defence_sets.contains(&set));
            if weak_set {
                roll *= 1.0 - config.formulas.defence_reduction;
            }
            roll
        }
        EntityKind::Npc(npc) => {
            let bonus = npc.definition.defence_against(bonus_type);
            let mut roll = (bonus + level) as f64;
            if config.formulas.weak_defence_npcs.contains(&npc.definition.id) {
                roll *= 1.0 - config.formulas.defence_reduction;
            }
            roll
        }
    };
    roll.max(0.0)
}

/// Chance of an accurate round, clamped into `[0.01, 0.99]`
pub fn hit_chance(attack: f64, defence: f64) -> f64 {
    let chance = if attack < defence {
        (attack - 1.0) / (2.0 * defence)
    } else {
        1.0 - (defence + 1.0) / (2.0 * attack)
    };
    if chance.is_nan() {
        return MIN_HIT_CHANCE;
    }
    chance.clamp(MIN_HIT_CHANCE, MAX_HIT_CHANCE)
}

/// Hit chance of `attacker` against `victim` for one round
pub fn accuracy(
    attacker: &Entity,
    victim: &Entity,
    combat_type: CombatType,
    modifiers: RollModifiers,
    config: &CombatConfig,
) -> f64 {
    let attack = attack_roll(attacker, combat_type, modifiers.accuracy);
    let defence = if modifiers.ignore_defence {
        0.0
    } else {
        let bonus_type = attack_bonus_type(attacker, combat_type);
        defence_roll(victim, combat_type, bonus_type, config)
    };
    hit_chance(attack, defence)
}

/// Roll one accuracy check: succeeds iff `uniform(0, 1) <= chance`
pub fn roll_accuracy<R: Rng + ?Sized>(
    attacker: &Entity,
    victim: &Entity,
    combat_type: CombatType,
    modifiers: RollModifiers,
    config: &CombatConfig,
    rng: &mut R,
) -> bool {
    let chance = accuracy(attacker, victim, combat_type, modifiers, config);
    rng.gen::<f64>() <= chance
}

/// `1.3 + eff/10 + bonus/80 + eff*bonus/640`
fn strength_formula(effective: f64, bonus: i32) -> f64 {
    let bonus = bonus as f64;
    1.3 + effective / 10.0 + bonus / 80.0 + effective * bonus / 640.0
}

/// Melee maximum hit
pub fn melee_max_hit(attacker: &Entity, victim: Option<&Entity>, special: f64) -> i32 {
    let player = match &attacker.kind {
        EntityKind::Player(player) => player,
        EntityKind::Npc(npc) => return npc.definition.max_hit,
    };

    let strength = attacker.skills.level(Skill::Strength) as f64;
    let effective = (strength * player.prayers.strength_multiplier()).floor()
        + player.fight_type.style.strength_bonus(CombatType::Melee) as f64;
    let mut max = strength_formula(effective, player.equipment.bonus(Bonus::Strength)) * special;

    if armour::wearing_set(&player.equipment, ArmourSet::Dharok) {
        let maximum = attacker.max_hitpoints() as f64;
        let missing = (maximum - attacker.hitpoints() as f64).max(0.0);
        max *= 1.0 + (missing / 100.0) * (maximum / 100.0);
    }

    if let Some(stacks) = victim.and_then(|v| v.npc()).map(|npc| npc.weakened) {
        max *= 1.0 + 0.1 * stacks as f64;
    }

    max.floor() as i32
}

/// Ranged maximum hit
pub fn ranged_max_hit(attacker: &Entity, special: f64) -> i32 {
    let player = match &attacker.kind {
        EntityKind::Player(player) => player,
        EntityKind::Npc(npc) => return npc.definition.max_hit,
    };

    let ranged = attacker.skills.level(Skill::Ranged) as f64;
    let effective = (ranged * player.prayers.ranged_multiplier()).floor()
        + player.fight_type.style.strength_bonus(CombatType::Ranged) as f64;
    let max = strength_formula(effective, player.equipment.bonus(Bonus::RangedStrength)) * special;
    max.floor() as i32
}

/// Magic maximum hit: fixed by the spell for players, by the definition for NPCs
pub fn magic_max_hit(attacker: &Entity, spell_max_hit: i32) -> i32 {
    match &attacker.kind {
        EntityKind::Player(_) => spell_max_hit,
        EntityKind::Npc(npc) => npc.definition.max_hit,
    }
}

/// Damage of one accurate hit, uniform in `0..=max`
pub fn roll_damage<R: Rng + ?Sized>(max_hit: i32, rng: &mut R) -> i32 {
    if max_hit <= 0 {
        return 0;
    }
    rng.gen_range(0..=max_hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Equipment, Item, NpcDefinition, PlayerState, Prayer, Skills};
    use crate::types::{EquipmentSlot, FightStyle, FightType, Position};
    use proptest::prelude::*;

    fn maxed(state: PlayerState) -> Entity {
        Entity::new_player(
            state,
            Position::default(),
            Skills::with_levels(&[
                (Skill::Attack, 99),
                (Skill::Strength, 99),
                (Skill::Defence, 99),
                (Skill::Ranged, 99),
                (Skill::Magic, 99),
                (Skill::Hitpoints, 99),
            ]),
        )
    }

    fn whip_player() -> Entity {
        let mut state = PlayerState::new("whip");
        state.equipment = Equipment::new()
            .with_bonus(Bonus::SlashAttack, 82)
            .with_bonus(Bonus::Strength, 82);
        state.equipment.equip(EquipmentSlot::Weapon, Item::single(4151));
        state.fight_type = FightType {
            style: FightStyle::Aggressive,
            bonus: AttackBonusType::Slash,
        };
        maxed(state)
    }

    #[test]
    fn test_hit_chance_branches() {
        // attack < defence
        assert!((hit_chance(51.0, 100.0) - 0.25).abs() < 1e-9);
        // attack >= defence
        assert!((hit_chance(100.0, 49.0) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_hit_chance_extremes_are_clamped() {
        assert!((hit_chance(1.0, 1000.0) - MIN_HIT_CHANCE).abs() < f64::EPSILON);
        assert!((hit_chance(1000.0, 0.0) - MAX_HIT_CHANCE).abs() < f64::EPSILON);
        assert!((hit_chance(0.0, 0.0) - MIN_HIT_CHANCE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_attack_roll_shape() {
        let player = whip_player();
        // floor(82 + 99) * 1.0 + 0 (aggressive has no accuracy bonus)
        assert!((attack_roll(&player, CombatType::Melee, 1.0) - 181.0).abs() < f64::EPSILON);
        assert!((attack_roll(&player, CombatType::Melee, 1.1) - 199.1).abs() < 1e-9);
    }

    #[test]
    fn test_attack_roll_prayer_multiplier() {
        let mut player = whip_player();
        if let Some(state) = player.player_mut() {
            state.prayers.activate(Prayer::IncredibleReflexes);
        }
        assert!((attack_roll(&player, CombatType::Melee, 1.0) - 181.0 * 1.15).abs() < 1e-9);
    }

    #[test]
    fn test_melee_max_hit_with_whip() {
        // effective strength 99 + 3, bonus 82 -> 25.59375
        assert_eq!(melee_max_hit(&whip_player(), None, 1.0), 25);
    }

    #[test]
    fn test_dharok_scales_with_missing_hitpoints() {
        let mut player = whip_player();
        if let Some(state) = player.player_mut() {
            for (slot, id) in [
                (EquipmentSlot::Head, 4716),
                (EquipmentSlot::Weapon, 4718),
                (EquipmentSlot::Body, 4720),
                (EquipmentSlot::Legs, 4722),
            ] {
                state.equipment.equip(slot, Item::single(id));
            }
        }
        let full = melee_max_hit(&player, None, 1.0);
        player.skills.set_level(Skill::Hitpoints, 1);
        let low = melee_max_hit(&player, None, 1.0);
        // 25.59375 * (1 + 0.98 * 0.99) = 50.42...
        assert_eq!(full, 25);
        assert_eq!(low, 50);
    }

    #[test]
    fn test_weaken_stacks_boost_melee() {
        let definition: NpcDefinition =
            toml::from_str("id = 1\nname = \"Man\"\nhitpoints = 7\nmax_hit = 1").unwrap();
        let mut npc = Entity::new_npc(definition, Position::default());
        if let Some(state) = npc.npc_mut() {
            state.weakened = 3;
        }
        // 25.59375 * 1.3 = 33.27
        assert_eq!(melee_max_hit(&whip_player(), Some(&npc), 1.0), 33);
    }

    #[test]
    fn test_npc_max_hit_from_definition() {
        let definition: NpcDefinition =
            toml::from_str("id = 1\nname = \"Man\"\nhitpoints = 7\nmax_hit = 3").unwrap();
        let npc = Entity::new_npc(definition, Position::default());
        assert_eq!(melee_max_hit(&npc, None, 1.0), 3);
        assert_eq!(ranged_max_hit(&npc, 1.0), 3);
        assert_eq!(magic_max_hit(&npc, 20), 3);
    }

    #[test]
    fn test_weak_defence_npc() {
        let definition: NpcDefinition = toml::from_str(
            "id = 2883\nname = \"Rex\"\nhitpoints = 255\nmax_hit = 26\n[levels]\ndefence = 100",
        )
        .unwrap();
        let npc = Entity::new_npc(definition, Position::default());
        let mut config = CombatConfig::default();
        let full = defence_roll(&npc, CombatType::Melee, AttackBonusType::Slash, &config);
        config.formulas.weak_defence_npcs.push(2883);
        let weak = defence_roll(&npc, CombatType::Melee, AttackBonusType::Slash, &config);
        assert!((full - 100.0).abs() < f64::EPSILON);
        assert!((weak - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weak_defence_set() {
        let mut state = PlayerState::new("dharok");
        for (slot, id) in armour::SET_SLOTS.iter().zip(ArmourSet::Dharok.pieces()) {
            state.equipment.equip(*slot, Item::single(id));
        }
        let victim = Entity::new_player(
            state,
            Position::default(),
            Skills::with_levels(&[(Skill::Defence, 99)]),
        );
        let mut config = CombatConfig::default();
        let full = defence_roll(&victim, CombatType::Melee, AttackBonusType::Crush, &config);
        config.formulas.weak_defence_sets.push(ArmourSet::Verac);
        let other_set = defence_roll(&victim, CombatType::Melee, AttackBonusType::Crush, &config);
        config.formulas.weak_defence_sets.push(ArmourSet::Dharok);
        let weak = defence_roll(&victim, CombatType::Melee, AttackBonusType::Crush, &config);
        assert!((full - 99.0).abs() < f64::EPSILON);
        assert!((other_set - 99.0).abs() < f64::EPSILON);
        assert!((weak - 24.75).abs() < 1e-9);
    }

    #[test]
    fn test_magic_defence_blends_levels() {
        let victim = Entity::new_player(
            PlayerState::new("mage"),
            Position::default(),
            Skills::with_levels(&[(Skill::Defence, 10), (Skill::Magic, 90)]),
        );
        let config = CombatConfig::default();
        // floor(10 * 0.3 + 90 * 0.7) = 66, Accurate style has no defence bonus
        let roll = defence_roll(&victim, CombatType::Magic, AttackBonusType::Magic, &config);
        assert!((roll - 66.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roll_damage_zero_max() {
        let mut rng = rand::rngs::mock::StepRng::new(0, 0);
        assert_eq!(roll_damage(0, &mut rng), 0);
        assert_eq!(roll_damage(-4, &mut rng), 0);
    }

    proptest! {
        #[test]
        fn prop_hit_chance_always_clamped(attack in -1_000.0f64..100_000.0, defence in -1_000.0f64..100_000.0) {
            let chance = hit_chance(attack, defence);
            prop_assert!(chance >= MIN_HIT_CHANCE);
            prop_assert!(chance <= MAX_HIT_CHANCE);
        }

        #[test]
        fn prop_roll_damage_within_max(max in 0i32..200, seed in any::<u64>()) {
            use rand::SeedableRng;
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
            let damage = roll_damage(max, &mut rng);
            prop_assert!((0..=max).contains(&damage));
        }
    }
}
