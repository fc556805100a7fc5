//! CombatBuilder - one entity's combat session
//!
//! The builder records who the entity is fighting, its round timers, the
//! strategy in use and the hook task driving the session. It also keeps the
//! damage-attribution cache that decides kill credit.

use super::hook;
use super::strategy::CombatStrategy;
use crate::entity::Entity;
use crate::task::{Scheduler, Task, TaskError, TaskHandle};
use crate::types::EntityId;
use crate::world::World;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, trace};

/// Damage one attacker has dealt and when it last did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRecord {
    pub amount: i32,
    pub last_update_ms: u64,
}

/// Per-entity combat session
#[derive(Debug, Clone, Default)]
pub struct CombatBuilder {
    victim: Option<EntityId>,
    last_attacker: Option<EntityId>,
    last_hit_ms: Option<u64>,

    // === Round timing ===
    /// Ticks until the next round; a round starts once it drops below 1
    pub(crate) attack_timer: i32,
    /// While positive no round starts; the session ends when it reaches 0
    pub(crate) cooldown: i32,

    strategy: Option<Rc<dyn CombatStrategy>>,
    hook: Option<TaskHandle>,
    /// Conditional task walking into range
    pending: Option<TaskHandle>,

    damage: BTreeMap<EntityId, DamageRecord>,
}

impl CombatBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn victim(&self) -> Option<EntityId> {
        self.victim
    }

    pub fn last_attacker(&self) -> Option<EntityId> {
        self.last_attacker
    }

    pub fn attack_timer(&self) -> i32 {
        self.attack_timer
    }

    pub fn cooldown(&self) -> i32 {
        self.cooldown
    }

    pub fn strategy(&self) -> Option<&Rc<dyn CombatStrategy>> {
        self.strategy.as_ref()
    }

    pub(crate) fn set_strategy(&mut self, strategy: Rc<dyn CombatStrategy>) {
        self.strategy = Some(strategy);
    }

    pub(crate) fn set_victim(&mut self, victim: EntityId) {
        self.victim = Some(victim);
    }

    /// Whether the hook task of this session is live
    pub fn hook_running(&self) -> bool {
        self.hook.as_ref().is_some_and(TaskHandle::is_running)
    }

    pub(crate) fn set_hook(&mut self, hook: TaskHandle) {
        self.hook = Some(hook);
    }

    /// Whether a range wait is pending
    pub fn is_waiting(&self) -> bool {
        self.pending.as_ref().is_some_and(TaskHandle::is_running)
    }

    /// Has a victim and a live hook
    pub fn is_attacking(&self) -> bool {
        self.victim.is_some() && self.hook_running()
    }

    /// Was hit within the last `timeout_ms`
    pub fn is_being_attacked(&self, now_ms: u64, timeout_ms: u64) -> bool {
        self.last_attacker.is_some()
            && self
                .last_hit_ms
                .is_some_and(|hit| now_ms.saturating_sub(hit) < timeout_ms)
    }

    /// Remember who hit this entity last
    pub fn record_hit(&mut self, attacker: EntityId, now_ms: u64) {
        self.last_attacker = Some(attacker);
        self.last_hit_ms = Some(now_ms);
    }

    // === Attribution ===

    /// Credit `amount` damage to `attacker`
    pub fn add_damage(&mut self, attacker: EntityId, amount: i32, now_ms: u64) {
        if amount <= 0 {
            return;
        }
        let record = self.damage.entry(attacker).or_insert(DamageRecord {
            amount: 0,
            last_update_ms: now_ms,
        });
        record.amount += amount;
        record.last_update_ms = now_ms;
    }

    pub fn damage_records(&self) -> &BTreeMap<EntityId, DamageRecord> {
        &self.damage
    }

    /// Top damage contributor within the attribution window.
    ///
    /// Entries last updated `window_ms` or more ago are skipped but kept.
    /// Ties go to the lowest id. `clear` empties the cache afterwards.
    pub fn get_killer(&mut self, clear: bool, now_ms: u64, window_ms: u64) -> Option<EntityId> {
        let mut killer: Option<(EntityId, i32)> = None;
        for (id, record) in &self.damage {
            if now_ms.saturating_sub(record.last_update_ms) >= window_ms {
                continue;
            }
            if killer.map_or(true, |(_, best)| record.amount > best) {
                killer = Some((*id, record.amount));
            }
        }
        if clear {
            self.damage.clear();
        }
        killer.map(|(id, _)| id)
    }

    // === Teardown ===

    /// End the session: cancels the hook and any pending range wait. The
    /// last attacker and the attribution cache survive.
    pub fn reset(&mut self) {
        if let Some(hook) = self.hook.take() {
            hook.cancel();
        }
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
        self.victim = None;
        self.attack_timer = 0;
        self.cooldown = 0;
        self.strategy = None;
    }
}

/// Tear down `entity`'s session and stop it chasing its target
pub fn reset_session(entity: &mut Entity) {
    entity.combat.reset();
    entity.movement.stop_following();
    entity.facing = None;
}

/// NPCs that must walk home once this far from their spawn
pub(crate) fn outside_retreat(entity: &Entity, radius: i32) -> bool {
    entity.npc().is_some_and(|npc| {
        npc.definition.retreats && npc.spawn.distance(&entity.position) > radius
    })
}

pub(crate) fn walk_home(entity: &mut Entity) {
    if let Some(spawn) = entity.npc().map(|npc| npc.spawn) {
        reset_session(entity);
        entity.movement.walk_to(spawn);
    }
}

/// Start (or retarget) `attacker`'s session against `target`.
///
/// A live session is retargeted in place. Otherwise the attacker follows the
/// target and a conditional task waits until it is within the strategy's
/// distance, then submits the hook task.
pub fn attack(world: &mut World, scheduler: &mut Scheduler<World>, attacker: EntityId, target: EntityId) {
    if attacker == target {
        return;
    }
    let Some((entity, victim)) = world.entities.pair_mut(attacker, target) else {
        return;
    };
    if !entity.is_valid() || !victim.is_valid() {
        return;
    }

    let strategy = world.strategies.determine(entity);
    entity.movement.follow(target, strategy.attack_distance(entity));
    entity.face(target);
    entity.combat.set_strategy(strategy);

    if entity.combat.hook_running() {
        debug!(%attacker, %target, "retargeting live session");
        entity.combat.set_victim(target);
        entity.combat.cooldown = 0;
        return;
    }

    if let Some(pending) = entity.combat.pending.take() {
        pending.cancel();
    }
    let wait = range_wait(attacker, target);
    entity.combat.pending = Some(scheduler.submit(wait));
}

fn range_wait(attacker: EntityId, target: EntityId) -> Task<World> {
    Task::conditional(
        "combat-wait",
        move |world: &mut World, handle: &TaskHandle| {
            let view = world.config.range.view_distance;
            let retreat = world.config.range.npc_retreat_radius;
            let Some((entity, victim)) = world.entities.pair_mut(attacker, target) else {
                handle.cancel();
                return true;
            };

            let strategy = world.strategies.determine(entity);
            entity.combat.set_strategy(Rc::clone(&strategy));

            if entity.combat.cooldown > 0
                || !entity.is_valid()
                || !victim.is_valid()
                || !entity.position.within_distance(&victim.position, view)
            {
                trace!(%attacker, %target, "range wait abandoned");
                reset_session(entity);
                handle.cancel();
                return true;
            }
            if outside_retreat(entity, retreat) {
                walk_home(entity);
                handle.cancel();
                return true;
            }

            let distance = strategy.attack_distance(entity);
            entity.movement.follow_distance = distance.max(1);
            !entity.position.within_distance(&victim.position, distance)
        },
        move |world: &mut World, scheduler: &mut Scheduler<World>, _handle: &TaskHandle| {
            let entity = world
                .entity_mut(attacker)
                .ok_or(TaskError::MissingEntity(attacker))?;
            entity.movement.stop();
            entity.combat.set_victim(target);
            entity.combat.pending = None;
            if !entity.combat.hook_running() {
                debug!(%attacker, %target, "in range, starting hook");
                entity.combat.set_hook(scheduler.submit(hook::hook_task(attacker)));
            }
            Ok(())
        },
    )
    .owned_by(attacker)
}
