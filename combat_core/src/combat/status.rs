//! Per-entity status timers

use crate::config::CombatConfig;
use crate::task::{Scheduler, Task, TaskHandle};
use crate::types::EntityId;
use crate::world::World;

/// Counts down freeze and poison immunity every tick and restores special
/// attack energy on its interval. Lives as long as the entity.
pub fn status_task(id: EntityId, config: &CombatConfig) -> Task<World> {
    let restore_interval = config.effects.special_restore_interval.max(1);
    let restore_amount = config.effects.special_restore_amount;
    let mut ticks: u32 = 0;

    Task::periodic(
        "status",
        1,
        move |world: &mut World, _scheduler: &mut Scheduler<World>, handle: &TaskHandle| {
            let Some(entity) = world.entities.get_mut(id) else {
                handle.cancel();
                return Ok(());
            };
            entity.status.frozen_ticks = entity.status.frozen_ticks.saturating_sub(1);
            entity.status.poison_immunity = entity.status.poison_immunity.saturating_sub(1);

            ticks += 1;
            if ticks % restore_interval == 0 {
                if let Some(player) = entity.player_mut() {
                    player.special.restore(restore_amount);
                }
            }
            Ok(())
        },
    )
    .owned_by(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_combat_config, default_npc_definitions, default_spells};
    use crate::entity::{Entity, PlayerState, Skills};
    use crate::types::Position;

    #[test]
    fn test_timers_count_down_and_energy_restores() {
        let mut world = World::new(
            default_combat_config(),
            default_spells(),
            default_npc_definitions(),
            1,
        );
        let mut scheduler = Scheduler::new();
        let mut state = PlayerState::new("frozen");
        state.special.energy = 45;
        let id = world.entities.insert(Entity::new_player(state, Position::default(), Skills::new()));
        world.entity_mut(id).unwrap().freeze(5);
        scheduler.submit(status_task(id, &world.config));

        for _ in 0..5 {
            scheduler.tick(&mut world);
        }
        assert!(!world.entity(id).unwrap().is_frozen());

        for _ in 0..44 {
            scheduler.tick(&mut world);
        }
        assert_eq!(world.entity(id).unwrap().player().unwrap().special.energy, 45);
        scheduler.tick(&mut world);
        assert_eq!(world.entity(id).unwrap().player().unwrap().special.energy, 55);
    }
}
