use super::{CombatStrategy, StrategyContext};
use crate::combat::formulas;
use crate::combat::{CombatContainer, CombatError, RoundParams};
use crate::entity::{Entity, EntityKind};
use crate::types::{CombatType, FightStyle};
use crate::world::WorldEvent;

/// Projectile drawn for player ammunition
const AMMO_PROJECTILE: u16 = 10;

/// Longest distance any ranged attack reaches
const MAX_RANGED_DISTANCE: i32 = 10;

/// Bows and thrown weapons
#[derive(Debug, Clone, Copy, Default)]
pub struct RangedStrategy;

impl CombatStrategy for RangedStrategy {
    fn can_attack(&self, attacker: &Entity, _victim: &Entity, ctx: &mut StrategyContext<'_>) -> bool {
        let Some(player) = attacker.player() else {
            return true;
        };
        let has_ammo = player
            .weapon
            .ammo_slot()
            .is_some_and(|slot| player.equipment.item(slot).is_some_and(|item| item.amount > 0));
        if !has_ammo {
            ctx.message(attacker, "There is no ammo left in your quiver.");
        }
        has_ammo
    }

    fn attack(
        &self,
        attacker: &mut Entity,
        victim: &mut Entity,
        ctx: &mut StrategyContext<'_>,
    ) -> Result<Option<CombatContainer>, CombatError> {
        let (animation, projectile, ammo) = match &mut attacker.kind {
            EntityKind::Player(player) => {
                let slot = player.weapon.ammo_slot();
                let ammo = slot.and_then(|slot| player.equipment.consume(slot, 1));
                if ammo.is_none() {
                    return Ok(None);
                }
                (player.weapon.animation, Some(AMMO_PROJECTILE), ammo)
            }
            EntityKind::Npc(npc) => (npc.definition.attack_animation, npc.definition.projectile, None),
        };

        ctx.animate(attacker.id, animation);
        if let Some(id) = projectile {
            ctx.emit(WorldEvent::Projectile {
                from: attacker.id,
                to: victim.id,
                id,
            });
        }

        let max_hit = formulas::ranged_max_hit(attacker, 1.0);
        let params = RoundParams::new(CombatType::Ranged, 1, max_hit);
        let mut container = CombatContainer::roll(attacker, victim, params, ctx.config, &mut *ctx.rng)?;
        if let Some(ammo) = ammo {
            container = container.with_ammo(ammo);
        }
        Ok(Some(container))
    }

    fn attack_delay(&self, attacker: &Entity) -> i32 {
        match &attacker.kind {
            EntityKind::Player(player) => {
                let rapid = player.fight_type.style == FightStyle::Rapid;
                player.weapon.attack_speed - i32::from(rapid)
            }
            EntityKind::Npc(npc) => npc.definition.attack_speed,
        }
    }

    fn attack_distance(&self, attacker: &Entity) -> i32 {
        match &attacker.kind {
            EntityKind::Player(player) => {
                let base = player.weapon.ranged_distance().unwrap_or(7);
                let long_range = player.fight_type.style == FightStyle::LongRange;
                (base + if long_range { 2 } else { 0 }).min(MAX_RANGED_DISTANCE)
            }
            EntityKind::Npc(npc) => npc.definition.attack_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::SpellRegistry;
    use crate::config::CombatConfig;
    use crate::entity::{Item, PlayerState, Skills, WeaponInterface};
    use crate::types::{EquipmentSlot, FightType, Position};
    use rand::rngs::mock::StepRng;

    fn archer(arrows: u32) -> Entity {
        let mut state = PlayerState::new("archer");
        state.weapon = WeaponInterface::bow(4, 7);
        state.equipment.equip(EquipmentSlot::Weapon, Item::single(861));
        if arrows > 0 {
            state.equipment.equip(EquipmentSlot::Arrows, Item::new(882, arrows));
        }
        Entity::new_player(state, Position::default(), Skills::new())
    }

    #[test]
    fn test_round_consumes_one_arrow() {
        let mut attacker = archer(2);
        let mut victim = archer(0);
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

        assert!(RangedStrategy.can_attack(&attacker, &victim, &mut ctx));
        let container = RangedStrategy
            .attack(&mut attacker, &mut victim, &mut ctx)
            .unwrap()
            .unwrap();
        assert_eq!(container.ammo, Some(882));
        let left = attacker.player().unwrap().equipment.item(EquipmentSlot::Arrows).map(|i| i.amount);
        assert_eq!(left, Some(1));
    }

    #[test]
    fn test_empty_quiver_cannot_attack() {
        let attacker = archer(0);
        let victim = archer(0);
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
        assert!(!RangedStrategy.can_attack(&attacker, &victim, &mut ctx));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_style_adjusts_speed_and_distance() {
        let mut attacker = archer(1);
        let player = attacker.player_mut().unwrap();
        player.fight_type = FightType {
            style: FightStyle::Rapid,
            ..player.fight_type
        };
        assert_eq!(RangedStrategy.attack_delay(&attacker), 3);

        let player = attacker.player_mut().unwrap();
        player.fight_type.style = FightStyle::LongRange;
        assert_eq!(RangedStrategy.attack_distance(&attacker), 9);
    }
}
