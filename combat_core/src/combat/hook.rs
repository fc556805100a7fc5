//! The combat hook - a per-session task run every tick
//!
//! Each invocation is one pass of the session state machine:
//! cooldown countdown, prerequisite gating, then (once the attack timer has
//! run down) building a round and scheduling its hit task.

use super::builder::{outside_retreat, reset_session, walk_home};
use super::strategy::StrategyContext;
use super::{hit_task, prayers, special};
use crate::entity::Entity;
use crate::task::{Scheduler, Task, TaskError, TaskHandle};
use crate::types::EntityId;
use crate::world::{World, WorldEvent};
use std::rc::Rc;
use tracing::{debug, trace, warn};

pub(crate) fn hook_task(attacker: EntityId) -> Task<World> {
    Task::periodic(
        "combat-hook",
        1,
        move |world: &mut World, scheduler: &mut Scheduler<World>, handle: &TaskHandle| {
            run(world, scheduler, handle, attacker)
        },
    )
    .owned_by(attacker)
}

/// Tear the session down and stop this hook
fn end(entity: &mut Entity, handle: &TaskHandle) {
    reset_session(entity);
    handle.cancel();
}

fn message(events: &mut Vec<WorldEvent>, entity: &Entity, text: &str) {
    if entity.is_player() {
        events.push(WorldEvent::Message {
            entity: entity.id,
            text: text.to_string(),
        });
    }
}

fn run(
    world: &mut World,
    scheduler: &mut Scheduler<World>,
    handle: &TaskHandle,
    attacker_id: EntityId,
) -> Result<(), TaskError> {
    let now = world.now_ms();
    let timing = world.config.timing.clone();
    let range = world.config.range.clone();

    let Some(attacker) = world.entities.get_mut(attacker_id) else {
        handle.cancel();
        return Ok(());
    };

    // === Cooldown ===
    if attacker.combat.cooldown > 0 {
        attacker.combat.cooldown -= 1;
        attacker.combat.attack_timer -= 1;
        if attacker.combat.cooldown == 0 {
            debug!(attacker = %attacker_id, "cooldown expired, ending session");
            end(attacker, handle);
        }
        return Ok(());
    }

    let Some(victim_id) = attacker.combat.victim() else {
        end(attacker, handle);
        return Ok(());
    };

    let Some((attacker, victim)) = world.entities.pair_mut(attacker_id, victim_id) else {
        if let Some(attacker) = world.entities.get_mut(attacker_id) {
            end(attacker, handle);
        }
        return Ok(());
    };

    // === Gating ===
    if !attacker.is_valid() || !victim.is_valid() {
        trace!(attacker = %attacker_id, victim = %victim_id, "participant gone");
        end(attacker, handle);
        return Ok(());
    }

    if victim.is_teleporting() {
        debug!(attacker = %attacker_id, victim = %victim_id, "victim teleporting, cooling down");
        attacker.combat.cooldown = timing.teleport_cooldown;
        return Ok(());
    }

    if !world.zones.in_multi_combat(&attacker.position)
        && attacker.combat.is_being_attacked(now, timing.combat_timeout_ms)
        && attacker.combat.last_attacker() != Some(victim_id)
    {
        message(&mut world.events, attacker, "You are already under attack!");
        end(attacker, handle);
        return Ok(());
    }

    if !world.zones.in_multi_combat(&victim.position)
        && victim.combat.is_being_attacked(now, timing.combat_timeout_ms)
        && victim.combat.last_attacker() != Some(attacker_id)
    {
        message(&mut world.events, attacker, "Someone else is fighting that.");
        end(attacker, handle);
        return Ok(());
    }

    if !world.zones.can_hit(attacker, victim) {
        trace!(attacker = %attacker_id, victim = %victim_id, "zone denies hit");
        return Ok(());
    }

    if outside_retreat(attacker, range.npc_retreat_radius) {
        debug!(attacker = %attacker_id, "left retreat radius, walking home");
        walk_home(attacker);
        handle.cancel();
        return Ok(());
    }

    let strategy = match attacker.combat.strategy() {
        Some(strategy) if attacker.is_npc() => Rc::clone(strategy),
        _ => world.strategies.determine(attacker),
    };
    attacker.combat.set_strategy(Rc::clone(&strategy));

    attacker.combat.attack_timer -= 1;
    if attacker.combat.attack_timer >= 1 {
        return Ok(());
    }

    // === Attacking ===
    let mut distance = strategy.attack_distance(attacker);
    if attacker.movement.moved {
        distance += range.moving_bonus;
        if attacker.movement.running {
            distance += range.running_bonus;
        }
    }
    if !attacker.position.within_distance(&victim.position, distance) {
        trace!(attacker = %attacker_id, victim = %victim_id, distance, "out of range");
        return Ok(());
    }

    let mut ctx = StrategyContext {
        config: &world.config,
        spells: &world.spells,
        rng: &mut *world.rng,
        events: &mut world.events,
    };

    if !strategy.can_attack(attacker, victim, &mut ctx) {
        debug!(attacker = %attacker_id, "cannot attack, ending session");
        end(attacker, handle);
        return Ok(());
    }

    let round = match special::special_round(attacker, victim, &mut ctx) {
        Ok(Some(container)) => Ok(Some(container)),
        Ok(None) => strategy.attack(attacker, victim, &mut ctx),
        Err(err) => Err(err),
    };
    let round = match round {
        Ok(round) => round,
        Err(err) => {
            warn!(attacker = %attacker_id, victim = %victim_id, error = %err, "strategy failed, ending session");
            end(attacker, handle);
            return Err(err.into());
        }
    };

    attacker.combat.attack_timer = strategy.attack_delay(attacker);
    let Some(mut container) = round else {
        trace!(attacker = %attacker_id, "round produced nothing");
        return Ok(());
    };

    prayers::apply_protection(
        &mut container,
        attacker,
        victim,
        world.config.effects.protection_reduction,
    );

    let delay = world.config.hit_delay(container.combat_type());
    debug!(
        attacker = %attacker_id,
        victim = %victim_id,
        combat_type = ?container.combat_type(),
        hits = container.hit_count(),
        damage = container.total_damage(),
        delay,
        "round scheduled"
    );
    attacker.combat.cooldown = 0;
    attacker.face(victim_id);
    scheduler.submit(hit_task(container, delay));
    Ok(())
}
