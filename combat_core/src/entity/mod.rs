//! Entity model - the players and NPCs combat reads and mutates
//!
//! Behaviour that genuinely differs between players and NPCs forks on
//! [`EntityKind`]; everything else (position, skills, status, the combat
//! session) lives on [`Entity`] itself.

mod equipment;
mod list;
pub mod movement;
mod npc;
mod player;
mod prayer;
pub mod skills;

pub use equipment::{Equipment, Item};
pub use list::EntityList;
pub use movement::Movement;
pub use npc::{
    NpcDefenceBonuses, NpcDefinition, NpcDefinitions, NpcLevels, NpcState, NpcStrategy,
    MAX_WEAKEN_STACKS,
};
pub use player::{PlayerState, SpecialAttackState, WeaponInterface, WeaponKind, MAX_ENERGY};
pub use prayer::{Prayer, PrayerBook};
pub use skills::{SkillLevel, Skills};

use crate::combat::{CombatBuilder, Hit};
use crate::task::TaskHandle;
use crate::types::{CombatType, EntityId, Position, Skill};

/// Player or NPC specific state
#[derive(Debug, Clone)]
pub enum EntityKind {
    Player(Box<PlayerState>),
    Npc(Box<NpcState>),
}

/// Transient status flags and timers
#[derive(Debug, Clone, Default)]
pub struct Status {
    /// Hitpoints reached zero; cleared when the death sequence finishes
    pub dead: bool,
    /// Removed from the world; every task it owns gets cancelled
    pub unregistered: bool,
    pub teleporting: bool,
    /// Ticks until the entity may move again
    pub frozen_ticks: u32,

    // === Poison ===
    /// Damage of the next poison hit, 0 when not poisoned
    pub poison_damage: i32,
    /// Poison hits dealt at the current damage
    pub poison_hits: u32,
    /// Ticks of immunity to new poison
    pub poison_immunity: u32,
    pub poison_task: Option<TaskHandle>,
}

impl Status {
    pub fn is_poisoned(&self) -> bool {
        self.poison_damage > 0
    }

    pub fn cure_poison(&mut self) {
        self.poison_damage = 0;
        self.poison_hits = 0;
        if let Some(task) = self.poison_task.take() {
            task.cancel();
        }
    }
}

/// Damage actually taken from one hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedHit {
    pub hit: Hit,
    /// This hit took the entity from alive to dead
    pub killed: bool,
}

/// A combatant in the world
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Position,
    pub skills: Skills,
    pub movement: Movement,
    pub combat: CombatBuilder,
    pub status: Status,
    /// Entity this one is turned toward
    pub facing: Option<EntityId>,
}

impl Entity {
    fn new(kind: EntityKind, position: Position, skills: Skills) -> Self {
        Entity {
            id: EntityId(0),
            kind,
            position,
            skills,
            movement: Movement::new(),
            combat: CombatBuilder::new(),
            status: Status::default(),
            facing: None,
        }
    }

    /// A player; its id is assigned when inserted into an [`EntityList`]
    pub fn new_player(state: PlayerState, position: Position, skills: Skills) -> Self {
        Entity::new(EntityKind::Player(Box::new(state)), position, skills)
    }

    /// An NPC at its spawn position with the definition's levels
    pub fn new_npc(definition: NpcDefinition, spawn: Position) -> Self {
        let skills = definition.skills();
        Entity::new(
            EntityKind::Npc(Box::new(NpcState::new(definition, spawn))),
            spawn,
            skills,
        )
    }

    // === Kind queries ===

    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    pub fn is_npc(&self) -> bool {
        matches!(self.kind, EntityKind::Npc(_))
    }

    pub fn player(&self) -> Option<&PlayerState> {
        match &self.kind {
            EntityKind::Player(player) => Some(player),
            EntityKind::Npc(_) => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.kind {
            EntityKind::Player(player) => Some(player),
            EntityKind::Npc(_) => None,
        }
    }

    pub fn npc(&self) -> Option<&NpcState> {
        match &self.kind {
            EntityKind::Npc(npc) => Some(npc),
            EntityKind::Player(_) => None,
        }
    }

    pub fn npc_mut(&mut self) -> Option<&mut NpcState> {
        match &mut self.kind {
            EntityKind::Npc(npc) => Some(npc),
            EntityKind::Player(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            EntityKind::Player(player) => &player.username,
            EntityKind::Npc(npc) => &npc.definition.name,
        }
    }

    // === Status queries ===

    pub fn is_dead(&self) -> bool {
        self.status.dead
    }

    pub fn is_unregistered(&self) -> bool {
        self.status.unregistered
    }

    /// Alive and still in the world
    pub fn is_valid(&self) -> bool {
        !self.status.dead && !self.status.unregistered
    }

    pub fn is_frozen(&self) -> bool {
        self.status.frozen_ticks > 0
    }

    pub fn is_teleporting(&self) -> bool {
        self.status.teleporting
    }

    pub fn hitpoints(&self) -> i32 {
        self.skills.level(Skill::Hitpoints)
    }

    pub fn max_hitpoints(&self) -> i32 {
        self.skills.max_level(Skill::Hitpoints)
    }

    /// Whether the entity auto-retaliates when hit
    pub fn auto_retaliates(&self) -> bool {
        match &self.kind {
            EntityKind::Player(player) => player.auto_retaliate,
            EntityKind::Npc(_) => true,
        }
    }

    /// Whether the NPC definition lists `combat_type` as harmless
    pub fn is_immune_to(&self, combat_type: CombatType) -> bool {
        self.npc()
            .is_some_and(|npc| npc.definition.is_immune_to(combat_type))
    }

    // === Mutators ===

    /// Deal one hit, never taking more than the remaining hitpoints
    pub fn apply_hit(&mut self, hit: Hit) -> AppliedHit {
        let current = self.hitpoints();
        let hit = hit.capped(current);
        self.skills.drain(Skill::Hitpoints, hit.damage());

        let killed = !self.status.dead && current > 0 && self.hitpoints() == 0;
        if killed {
            self.status.dead = true;
        }
        AppliedHit { hit, killed }
    }

    /// Heal up to the maximum
    pub fn heal(&mut self, amount: i32) {
        self.skills.restore(Skill::Hitpoints, amount);
    }

    /// Freeze for `ticks` unless already frozen
    pub fn freeze(&mut self, ticks: u32) -> bool {
        if self.is_frozen() {
            return false;
        }
        self.status.frozen_ticks = ticks;
        self.movement.stop();
        true
    }

    pub fn face(&mut self, target: EntityId) {
        self.facing = Some(target);
    }
}
