//! GameEngine - the tick loop tying the world to its scheduler
//!
//! One call to [`GameEngine::tick`] is one game tick: entities step toward
//! their movement goals, every live task is advanced once, then entities
//! marked unregistered are removed from the world.

use crate::combat::{self, status::status_task, CombatError};
use crate::entity::{movement, Entity};
use crate::task::Scheduler;
use crate::types::{EntityId, Position};
use crate::world::World;
use tracing::{debug, info};

/// The world plus the scheduler that drives it
#[derive(Debug)]
pub struct GameEngine {
    pub world: World,
    pub scheduler: Scheduler<World>,
}

impl GameEngine {
    pub fn new(world: World) -> Self {
        GameEngine {
            world,
            scheduler: Scheduler::new(),
        }
    }

    /// Register an entity and start its status timers
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = self.world.entities.insert(entity);
        self.scheduler.submit(status_task(id, &self.world.config));
        debug!(entity = %id, "spawned");
        id
    }

    /// Spawn an NPC from its definition
    pub fn spawn_npc(&mut self, npc_id: u16, position: Position) -> Result<EntityId, CombatError> {
        let npc = self.world.create_npc(npc_id, position)?;
        Ok(self.spawn(npc))
    }

    /// Start or retarget `attacker`'s session against `target`
    pub fn attack(&mut self, attacker: EntityId, target: EntityId) {
        combat::attack(&mut self.world, &mut self.scheduler, attacker, target);
    }

    /// Interrupt `id`'s session (teleport, logout, movement lock)
    pub fn reset_combat(&mut self, id: EntityId) {
        if let Some(entity) = self.world.entity_mut(id) {
            combat::reset_session(entity);
        }
    }

    pub fn current_tick(&self) -> u64 {
        self.scheduler.current_tick()
    }

    /// Advance the world by one tick
    pub fn tick(&mut self) {
        self.step_movement();
        self.scheduler.tick(&mut self.world);
        self.sweep();
    }

    /// Run `ticks` ticks
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    fn step_movement(&mut self) {
        let entities = &self.world.entities;
        let mut goals = Vec::new();
        let mut lost = Vec::new();
        for entity in entities.iter() {
            if !entity.is_valid() || entity.is_frozen() {
                continue;
            }
            let movement = &entity.movement;
            if let Some(destination) = movement.destination {
                goals.push((entity.id, destination, 0));
            } else if let Some(target) = movement.following {
                match entities.get(target).filter(|t| t.is_valid()) {
                    Some(target) => goals.push((entity.id, target.position, movement.follow_distance)),
                    None => lost.push(entity.id),
                }
            }
        }

        for entity in self.world.entities.iter_mut() {
            entity.movement.moved = false;
        }
        for id in lost {
            if let Some(entity) = self.world.entity_mut(id) {
                entity.movement.stop_following();
            }
        }
        for (id, goal, stop_at) in goals {
            let Some(entity) = self.world.entity_mut(id) else {
                continue;
            };
            let next = movement::step_towards(entity.position, goal, stop_at, entity.movement.speed());
            entity.movement.moved = next != entity.position;
            entity.position = next;
            if entity.movement.destination == Some(next) {
                entity.movement.destination = None;
            }
        }
    }

    fn sweep(&mut self) {
        let gone: Vec<EntityId> = self
            .world
            .entities
            .iter()
            .filter(|e| e.is_unregistered())
            .map(|e| e.id)
            .collect();
        for id in gone {
            if let Some(entity) = self.world.entities.remove(id) {
                info!(entity = %id, name = entity.name(), "removed from world");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_combat_config, default_npc_definitions, default_spells};
    use crate::entity::{PlayerState, Skills};
    use crate::types::Skill;
    use crate::world::WorldEvent;
    use rand::rngs::mock::StepRng;

    fn engine() -> GameEngine {
        let world = World::new(
            default_combat_config(),
            default_spells(),
            default_npc_definitions(),
            11,
        )
        .with_rng(StepRng::new(0, 0));
        GameEngine::new(world)
    }

    fn player(name: &str, position: Position) -> Entity {
        Entity::new_player(
            PlayerState::new(name),
            position,
            Skills::with_levels(&[(Skill::Hitpoints, 99)]),
        )
    }

    #[test]
    fn test_follower_stops_adjacent() {
        let mut engine = engine();
        let leader = engine.spawn(player("leader", Position::new(10, 0, 0)));
        let follower = engine.spawn(player("follower", Position::new(0, 0, 0)));
        engine
            .world
            .entity_mut(follower)
            .unwrap()
            .movement
            .follow(leader, 1);

        engine.run(20);
        let follower = engine.world.entity(follower).unwrap();
        assert_eq!(follower.position, Position::new(9, 0, 0));
        assert!(!follower.movement.moved);
    }

    #[test]
    fn test_frozen_entity_does_not_move() {
        let mut engine = engine();
        let id = engine.spawn(player("stuck", Position::new(0, 0, 0)));
        let entity = engine.world.entity_mut(id).unwrap();
        entity.freeze(3);
        entity.movement.walk_to(Position::new(5, 0, 0));

        engine.tick();
        assert_eq!(engine.world.entity(id).unwrap().position, Position::new(0, 0, 0));
    }

    #[test]
    fn test_walk_to_clears_destination() {
        let mut engine = engine();
        let id = engine.spawn(player("walker", Position::new(0, 0, 0)));
        engine
            .world
            .entity_mut(id)
            .unwrap()
            .movement
            .walk_to(Position::new(2, 2, 0));

        engine.run(2);
        let entity = engine.world.entity(id).unwrap();
        assert_eq!(entity.position, Position::new(2, 2, 0));
        assert!(entity.movement.destination.is_none());
    }

    #[test]
    fn test_unregistered_entities_swept() {
        let mut engine = engine();
        let id = engine.spawn(player("leaving", Position::default()));
        engine.world.entity_mut(id).unwrap().status.unregistered = true;
        engine.tick();
        assert!(engine.world.entity(id).is_none());
        assert_eq!(engine.scheduler.count_named("status"), 0);
    }

    #[test]
    fn test_melee_round_lands_one_tick_after_swing() {
        let mut engine = engine();
        let a = engine.spawn(player("a", Position::new(0, 0, 0)));
        let b = engine.spawn(player("b", Position::new(1, 0, 0)));
        engine.attack(a, b);

        engine.run(2);
        assert!(engine.world.entity(a).unwrap().combat.hook_running());
        assert!(engine
            .world
            .events
            .iter()
            .any(|e| matches!(e, WorldEvent::Animation { entity, .. } if *entity == a)));
        assert!(!engine
            .world
            .events
            .iter()
            .any(|e| matches!(e, WorldEvent::Hitsplat { entity, .. } if *entity == b)));

        engine.tick();
        assert!(engine
            .world
            .events
            .iter()
            .any(|e| matches!(e, WorldEvent::Hitsplat { entity, .. } if *entity == b)));
    }

    #[test]
    fn test_spawn_unknown_npc_fails() {
        let mut engine = engine();
        assert_eq!(
            engine.spawn_npc(65_000, Position::default()),
            Err(CombatError::UnknownNpc(65_000))
        );
    }
}
