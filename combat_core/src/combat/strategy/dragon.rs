use super::melee::MeleeStrategy;
use super::{CombatStrategy, StrategyContext};
use crate::combat::{CombatContainer, CombatError, RoundParams};
use crate::entity::Entity;
use crate::types::{CombatType, EquipmentSlot};
use rand::Rng;

/// Anti-dragon shield item id
pub const ANTI_DRAGON_SHIELD: u16 = 1540;

const BREATH_ANIMATION: u16 = 81;
const BREATH_GRAPHIC: u16 = 1;

/// Dragons: melee when adjacent, with a chance of breathing fire instead
#[derive(Debug, Clone, Copy, Default)]
pub struct DragonStrategy;

fn shielded(victim: &Entity) -> bool {
    victim
        .player()
        .is_some_and(|p| p.equipment.item_id(EquipmentSlot::Shield) == Some(ANTI_DRAGON_SHIELD))
}

impl CombatStrategy for DragonStrategy {
    fn can_attack(&self, attacker: &Entity, victim: &Entity, ctx: &mut StrategyContext<'_>) -> bool {
        MeleeStrategy.can_attack(attacker, victim, ctx)
    }

    fn attack(
        &self,
        attacker: &mut Entity,
        victim: &mut Entity,
        ctx: &mut StrategyContext<'_>,
    ) -> Result<Option<CombatContainer>, CombatError> {
        if !ctx.rng.gen_bool(ctx.config.effects.dragonfire_chance) {
            return MeleeStrategy.attack(attacker, victim, ctx);
        }

        ctx.animate(attacker.id, BREATH_ANIMATION);
        ctx.graphic(attacker.id, BREATH_GRAPHIC);

        let max_hit = if shielded(victim) {
            ctx.message(victim, "Your shield absorbs most of the dragon fire!");
            ctx.config.effects.dragonfire_shielded_max
        } else {
            ctx.message(victim, "You are horribly burnt by the dragon fire!");
            ctx.config.effects.dragonfire_max
        };

        // Dragonfire always lands; only the damage is rolled.
        let params = RoundParams::new(CombatType::Magic, 1, max_hit).always_accurate();
        let container = CombatContainer::roll(attacker, victim, params, ctx.config, &mut *ctx.rng)?;
        Ok(Some(container))
    }

    fn attack_delay(&self, attacker: &Entity) -> i32 {
        MeleeStrategy.attack_delay(attacker)
    }

    fn attack_distance(&self, attacker: &Entity) -> i32 {
        MeleeStrategy.attack_distance(attacker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::SpellRegistry;
    use crate::config::{default_npc_definitions, CombatConfig};
    use crate::entity::{Item, PlayerState, Skills};
    use crate::types::{Position, Skill};
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_shield_caps_dragonfire() {
        let definitions = default_npc_definitions();
        let mut dragon = Entity::new_npc(definitions.get(53).unwrap().clone(), Position::default());
        let mut state = PlayerState::new("knight");
        state.equipment.equip(EquipmentSlot::Shield, Item::single(ANTI_DRAGON_SHIELD));
        let mut victim = Entity::new_player(
            state,
            Position::default(),
            Skills::with_levels(&[(Skill::Hitpoints, 99)]),
        );

        let config = CombatConfig::default();
        let spells = SpellRegistry::new();
        // A zero draw passes every chance roll, so the dragon breathes.
        let mut rng = StepRng::new(0, 0);
        let mut events = Vec::new();
        let mut ctx = StrategyContext {
            config: &config,
            spells: &spells,
            rng: &mut rng,
            events: &mut events,
        };

        let container = DragonStrategy
            .attack(&mut dragon, &mut victim, &mut ctx)
            .unwrap()
            .unwrap();
        assert_eq!(container.combat_type(), CombatType::Magic);
        assert!(container.is_accurate());
        assert!(container.total_damage() <= config.effects.dragonfire_shielded_max);
    }
}
