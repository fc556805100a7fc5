//! Poison - a periodic task dealing decaying poison hits

use super::{death, Hit, HitKind};
use crate::entity::Entity;
use crate::task::{Scheduler, Task, TaskHandle};
use crate::types::EntityId;
use crate::world::{World, WorldEvent};
use tracing::debug;

/// Poison `target` starting at `damage`.
///
/// Does nothing if the target is already poisoned, immune, or gone.
/// Returns whether poison was applied.
pub fn apply_poison(
    world: &mut World,
    scheduler: &mut Scheduler<World>,
    target: EntityId,
    damage: i32,
) -> bool {
    let interval = world.config.effects.poison_interval;
    let Some(entity) = world.entities.get_mut(target) else {
        return false;
    };
    if damage <= 0
        || !entity.is_valid()
        || entity.status.is_poisoned()
        || entity.status.poison_immunity > 0
    {
        return false;
    }

    entity.status.poison_damage = damage;
    entity.status.poison_hits = 0;
    if entity.is_player() {
        world.events.push(WorldEvent::Message {
            entity: target,
            text: "You have been poisoned!".to_string(),
        });
    }
    debug!(entity = %target, damage, "poisoned");

    let handle = scheduler.submit(poison_task(target, interval));
    entity.status.poison_task = Some(handle);
    true
}

/// Cure poison and block new poison for `immunity_ticks`
pub fn cure(entity: &mut Entity, immunity_ticks: u32) {
    entity.status.cure_poison();
    entity.status.poison_immunity = immunity_ticks;
}

fn poison_task(target: EntityId, interval: u32) -> Task<World> {
    Task::periodic(
        "poison",
        interval,
        move |world: &mut World, scheduler: &mut Scheduler<World>, handle: &TaskHandle| {
            let decay_hits = world.config.effects.poison_decay_hits.max(1);
            let Some(entity) = world.entities.get_mut(target) else {
                handle.cancel();
                return Ok(());
            };
            if !entity.is_valid() || !entity.status.is_poisoned() {
                handle.cancel();
                return Ok(());
            }

            let damage = entity.status.poison_damage;
            let applied = entity.apply_hit(Hit::new(damage, HitKind::Poison));
            entity.status.poison_hits += 1;
            if entity.status.poison_hits >= decay_hits {
                entity.status.poison_damage -= 1;
                entity.status.poison_hits = 0;
            }
            if !entity.status.is_poisoned() {
                debug!(entity = %target, "poison wore off");
                entity.status.cure_poison();
                handle.cancel();
            }

            world.events.push(WorldEvent::Hitsplat {
                entity: target,
                hit: applied.hit,
                source: None,
            });
            if applied.killed {
                death::start_death(world, scheduler, target);
            }
            Ok(())
        },
    )
    .owned_by(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_combat_config, default_npc_definitions, default_spells};
    use crate::entity::{PlayerState, Skills};
    use crate::types::{Position, Skill};

    fn setup() -> (World, Scheduler<World>, EntityId) {
        let mut world = World::new(
            default_combat_config(),
            default_spells(),
            default_npc_definitions(),
            1,
        );
        let id = world.entities.insert(Entity::new_player(
            PlayerState::new("victim"),
            Position::default(),
            Skills::with_levels(&[(Skill::Hitpoints, 99)]),
        ));
        (world, Scheduler::new(), id)
    }

    fn poison_splats(world: &World) -> Vec<i32> {
        world
            .events
            .iter()
            .filter_map(|e| match e {
                WorldEvent::Hitsplat { hit, .. } if hit.kind() == HitKind::Poison => Some(hit.damage()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_poison_hits_every_interval_and_decays() {
        let (mut world, mut scheduler, id) = setup();
        assert!(apply_poison(&mut world, &mut scheduler, id, 2));

        for _ in 0..(30 * 9) {
            scheduler.tick(&mut world);
        }
        // Four hits at 2, four at 1, then cured.
        assert_eq!(poison_splats(&world), vec![2, 2, 2, 2, 1, 1, 1, 1]);
        let entity = world.entity(id).unwrap();
        assert!(!entity.status.is_poisoned());
        assert_eq!(entity.hitpoints(), 99 - 12);
        assert_eq!(scheduler.count_named("poison"), 0);
    }

    #[test]
    fn test_no_double_poison() {
        let (mut world, mut scheduler, id) = setup();
        assert!(apply_poison(&mut world, &mut scheduler, id, 6));
        assert!(!apply_poison(&mut world, &mut scheduler, id, 8));
        assert_eq!(world.entity(id).unwrap().status.poison_damage, 6);
        assert_eq!(scheduler.count_named("poison"), 1);
    }

    #[test]
    fn test_immunity_blocks_poison() {
        let (mut world, mut scheduler, id) = setup();
        cure(world.entity_mut(id).unwrap(), 100);
        assert!(!apply_poison(&mut world, &mut scheduler, id, 6));
    }
}
