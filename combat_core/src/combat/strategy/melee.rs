use super::{CombatStrategy, StrategyContext};
use crate::combat::armour::{self, ArmourSet};
use crate::combat::formulas::{self, RollModifiers};
use crate::combat::{CombatContainer, CombatError, RoundParams};
use crate::entity::{Entity, EntityKind};
use crate::types::{CombatType, EquipmentSlot};
use rand::Rng;

/// Poisoned weapons and the poison damage they start at
const POISONED_WEAPONS: [(u16, i32); 3] = [(1231, 4), (5680, 5), (5698, 6)];

/// Hand-to-hand combat
#[derive(Debug, Clone, Copy, Default)]
pub struct MeleeStrategy;

/// Poison a melee round by `attacker` carries
pub(crate) fn melee_poison(attacker: &Entity) -> Option<i32> {
    match &attacker.kind {
        EntityKind::Player(player) => {
            let weapon = player.equipment.item_id(EquipmentSlot::Weapon)?;
            POISONED_WEAPONS
                .iter()
                .find(|(id, _)| *id == weapon)
                .map(|(_, damage)| *damage)
        }
        EntityKind::Npc(npc) => npc
            .definition
            .poisonous
            .then_some(npc.definition.max_hit.max(1)),
    }
}

pub(crate) fn attack_animation(attacker: &Entity) -> u16 {
    match &attacker.kind {
        EntityKind::Player(player) => player.weapon.animation,
        EntityKind::Npc(npc) => npc.definition.attack_animation,
    }
}

impl CombatStrategy for MeleeStrategy {
    fn can_attack(&self, _attacker: &Entity, _victim: &Entity, _ctx: &mut StrategyContext<'_>) -> bool {
        true
    }

    fn attack(
        &self,
        attacker: &mut Entity,
        victim: &mut Entity,
        ctx: &mut StrategyContext<'_>,
    ) -> Result<Option<CombatContainer>, CombatError> {
        ctx.animate(attacker.id, attack_animation(attacker));

        // Verac's: the round ignores defence and protection prayers.
        let verac = attacker
            .player()
            .is_some_and(|p| armour::wearing_set(&p.equipment, ArmourSet::Verac))
            && ctx.rng.gen_bool(ctx.config.effects.armour_proc_chance);

        let modifiers = RollModifiers {
            ignore_defence: verac,
            ..RollModifiers::default()
        };
        let max_hit = formulas::melee_max_hit(attacker, Some(&*victim), 1.0);
        let params = RoundParams::new(CombatType::Melee, 1, max_hit).with_modifiers(modifiers);
        let mut container = CombatContainer::roll(attacker, victim, params, ctx.config, &mut *ctx.rng)?;

        if verac {
            container = container.ignoring_protection();
            if let Some(graphic) = ArmourSet::Verac.graphic() {
                ctx.graphic(victim.id, graphic);
            }
        }
        if let Some(poison) = melee_poison(attacker) {
            container = container.with_poison(poison);
        }
        Ok(Some(container))
    }

    fn attack_delay(&self, attacker: &Entity) -> i32 {
        match &attacker.kind {
            EntityKind::Player(player) => player.weapon.attack_speed,
            EntityKind::Npc(npc) => npc.definition.attack_speed,
        }
    }

    fn attack_distance(&self, _attacker: &Entity) -> i32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::SpellRegistry;
    use crate::config::CombatConfig;
    use crate::entity::{Item, PlayerState, Skills};
    use crate::types::{Position, Skill};
    use rand::rngs::mock::StepRng;

    fn fighter(state: PlayerState) -> Entity {
        Entity::new_player(
            state,
            Position::default(),
            Skills::with_levels(&[(Skill::Hitpoints, 99), (Skill::Strength, 99)]),
        )
    }

    #[test]
    fn test_verac_round_ignores_protection() {
        let mut state = PlayerState::new("verac");
        for (slot, id) in [
            EquipmentSlot::Head,
            EquipmentSlot::Weapon,
            EquipmentSlot::Body,
            EquipmentSlot::Legs,
        ]
        .into_iter()
        .zip(ArmourSet::Verac.pieces())
        {
            state.equipment.equip(slot, Item::single(id));
        }
        let mut attacker = fighter(state);
        let mut victim = fighter(PlayerState::new("victim"));

        let config = CombatConfig::default();
        let spells = SpellRegistry::new();
        let mut rng = StepRng::new(0, 0);
        let mut events = Vec::new();
        let mut ctx = StrategyContext {
            config: &config,
            spells: &spells,
            rng: &mut rng,
            events: &mut events,
        };

        let container = MeleeStrategy
            .attack(&mut attacker, &mut victim, &mut ctx)
            .unwrap()
            .unwrap();
        assert!(container.ignores_protection);
        assert_eq!(container.hit_count(), 1);
    }

    #[test]
    fn test_poisoned_dagger_flags_poison() {
        let mut state = PlayerState::new("pker");
        state.equipment.equip(EquipmentSlot::Weapon, Item::single(5698));
        assert_eq!(melee_poison(&fighter(state)), Some(6));
        assert_eq!(melee_poison(&fighter(PlayerState::new("clean"))), None);
    }
}
