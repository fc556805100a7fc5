//! Death sequence

use super::builder::reset_session;
use crate::entity::{SpecialAttackState, Status};
use crate::task::{Scheduler, Task, TaskError, TaskHandle};
use crate::types::{EntityId, Position};
use crate::world::{World, WorldEvent};
use tracing::info;

/// Where players respawn
pub const HOME: Position = Position { x: 3222, y: 3218, z: 0 };

pub const PLAYER_DEATH_ANIMATION: u16 = 836;

/// Begin dying: stop every session and effect, play the death animation and
/// schedule the rest of the sequence
pub(crate) fn start_death(world: &mut World, scheduler: &mut Scheduler<World>, id: EntityId) {
    let delay = world.config.timing.death_delay;
    let Some(entity) = world.entities.get_mut(id) else {
        return;
    };

    entity.status.dead = true;
    reset_session(entity);
    entity.movement.clear();
    entity.status.cure_poison();

    let animation = entity
        .npc()
        .map_or(PLAYER_DEATH_ANIMATION, |npc| npc.definition.death_animation);
    world.events.push(WorldEvent::Animation { entity: id, id: animation });

    scheduler.submit(
        Task::one_shot(
            "death",
            delay,
            move |world: &mut World, _scheduler: &mut Scheduler<World>, _handle: &TaskHandle| {
                finish_death(world, id)
            },
        )
        .owned_by(id),
    );
}

fn finish_death(world: &mut World, id: EntityId) -> Result<(), TaskError> {
    let now = world.now_ms();
    let window = world.config.timing.attribution_window_ms;
    let entity = world.entities.get_mut(id).ok_or(TaskError::MissingEntity(id))?;

    let killer = entity.combat.get_killer(true, now, window);
    info!(entity = %id, name = entity.name(), killer = ?killer, "died");

    reset_session(entity);
    if let Some(player) = entity.player_mut() {
        player.prayers.clear();
        player.special = SpecialAttackState::default();
        player.cast_spell = None;
        entity.skills.restore_all();
        entity.position = HOME;
        entity.status = Status::default();
    } else {
        entity.status.unregistered = true;
    }

    world.events.push(WorldEvent::Death { entity: id, killer });
    Ok(())
}
