use super::{CombatStrategy, StrategyContext};
use crate::combat::formulas;
use crate::combat::{CombatContainer, CombatError, RoundParams};
use crate::entity::{Entity, EntityKind};
use crate::types::CombatType;
use crate::world::WorldEvent;
use tracing::debug;

/// Ticks between player casts
const CAST_SPEED: i32 = 5;

/// Tiles a player can cast from
const CAST_DISTANCE: i32 = 10;

/// Combat spells, autocast or single cast
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicStrategy;

impl CombatStrategy for MagicStrategy {
    fn can_attack(&self, attacker: &Entity, _victim: &Entity, ctx: &mut StrategyContext<'_>) -> bool {
        match &attacker.kind {
            EntityKind::Player(player) => player
                .current_spell()
                .is_some_and(|id| ctx.spells.get(id).is_some()),
            EntityKind::Npc(_) => true,
        }
    }

    fn attack(
        &self,
        attacker: &mut Entity,
        victim: &mut Entity,
        ctx: &mut StrategyContext<'_>,
    ) -> Result<Option<CombatContainer>, CombatError> {
        let npc = match &attacker.kind {
            EntityKind::Npc(npc) => Some((
                npc.definition.attack_animation,
                npc.definition.projectile,
                npc.definition.max_hit,
            )),
            EntityKind::Player(_) => None,
        };

        if let Some((animation, projectile, max_hit)) = npc {
            ctx.animate(attacker.id, animation);
            if let Some(id) = projectile {
                ctx.emit(WorldEvent::Projectile {
                    from: attacker.id,
                    to: victim.id,
                    id,
                });
            }
            let params = RoundParams::new(CombatType::Magic, 1, max_hit);
            let container = CombatContainer::roll(attacker, victim, params, ctx.config, &mut *ctx.rng)?;
            return Ok(Some(container));
        }

        let Some(spell_id) = attacker.player().and_then(|p| p.current_spell()) else {
            return Ok(None);
        };
        let spells = ctx.spells;
        let spell = spells.require(spell_id)?;
        if !spell.can_cast(attacker) {
            debug!(attacker = %attacker.id, spell = %spell.name, "magic level too low");
            ctx.message(
                attacker,
                format!("You need a Magic level of {} to cast this spell.", spell.level),
            );
            return Ok(None);
        }

        ctx.animate(attacker.id, spell.animation);
        if let Some(graphic) = spell.start_graphic {
            ctx.graphic(attacker.id, graphic);
        }
        if let Some(id) = spell.projectile {
            ctx.emit(WorldEvent::Projectile {
                from: attacker.id,
                to: victim.id,
                id,
            });
        }

        // Binding spells deal no damage but still roll accuracy.
        let hits = i32::from(spell.max_hit > 0);
        let max_hit = formulas::magic_max_hit(attacker, spell.max_hit);
        let params = RoundParams::new(CombatType::Magic, hits, max_hit);
        let container = CombatContainer::roll(attacker, victim, params, ctx.config, &mut *ctx.rng)?;
        Ok(Some(container.with_spell(spell_id)))
    }

    fn attack_delay(&self, attacker: &Entity) -> i32 {
        match &attacker.kind {
            EntityKind::Player(_) => CAST_SPEED,
            EntityKind::Npc(npc) => npc.definition.attack_speed,
        }
    }

    fn attack_distance(&self, attacker: &Entity) -> i32 {
        match &attacker.kind {
            EntityKind::Player(_) => CAST_DISTANCE,
            EntityKind::Npc(npc) => npc.definition.attack_distance,
        }
    }
}
