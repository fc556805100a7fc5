//! World - the context every task runs against
//!
//! Holds the entity list, the registries loaded at startup, the zone policy,
//! the wall clock, the seeded RNG and the outbound event queue. The
//! [`Scheduler`](crate::task::Scheduler) is generic over [`TaskContext`] and
//! [`World`] is the one context the combat core uses.

use crate::combat::{CombatContainer, CombatError, Hit, SpellRegistry, StrategyContext, StrategyRegistry};
use crate::config::CombatConfig;
use crate::entity::{Entity, EntityList, Item, NpcDefinitions};
use crate::task::TaskContext;
use crate::types::{EntityId, Position, Skill};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

// === Clock ===

/// Wall-clock milliseconds, used by the attribution cache and the
/// under-attack timeout
pub trait Clock: fmt::Debug {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// Clock moved by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        ManualClock {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// === Zones ===

/// Where multi-way combat is allowed and whether a hit is permitted at all
pub trait ZonePolicy: fmt::Debug {
    fn in_multi_combat(&self, position: &Position) -> bool;

    /// Minigame or area restriction on a single hit
    fn can_hit(&self, _attacker: &Entity, _victim: &Entity) -> bool {
        true
    }
}

/// Single-way combat everywhere
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleCombatZones;

impl ZonePolicy for SingleCombatZones {
    fn in_multi_combat(&self, _position: &Position) -> bool {
        false
    }
}

/// Rectangular area on one plane, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub min: Position,
    pub max: Position,
}

impl Area {
    pub fn new(min: Position, max: Position) -> Self {
        Area { min, max }
    }

    pub fn contains(&self, position: &Position) -> bool {
        position.z == self.min.z
            && (self.min.x..=self.max.x).contains(&position.x)
            && (self.min.y..=self.max.y).contains(&position.y)
    }
}

/// Multi-way combat inside any of a list of areas
#[derive(Debug, Clone, Default)]
pub struct MultiCombatAreas {
    areas: Vec<Area>,
}

impl MultiCombatAreas {
    pub fn new(areas: Vec<Area>) -> Self {
        MultiCombatAreas { areas }
    }
}

impl ZonePolicy for MultiCombatAreas {
    fn in_multi_combat(&self, position: &Position) -> bool {
        self.areas.iter().any(|area| area.contains(position))
    }
}

// === Events ===

/// Outbound, fire-and-forget notifications for whoever renders the world
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    Animation { entity: EntityId, id: u16 },
    Graphic { entity: EntityId, id: u16 },
    Projectile { from: EntityId, to: EntityId, id: u16 },
    Hitsplat { entity: EntityId, hit: Hit, source: Option<EntityId> },
    Message { entity: EntityId, text: String },
    LevelUp { entity: EntityId, skill: Skill, level: i32 },
    GroundItem { item: Item, position: Position, owner: Option<EntityId> },
    Death { entity: EntityId, killer: Option<EntityId> },
}

// === Hit modifiers ===

/// Last-moment transform of a container, run by the hit task before any
/// damage is applied
pub trait HitModifier: fmt::Debug {
    fn modify(&self, container: &mut CombatContainer, attacker: &Entity, victim: &Entity);
}

/// Zeroes every hit against an NPC immune to the round's style
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmunityModifier;

impl HitModifier for ImmunityModifier {
    fn modify(&self, container: &mut CombatContainer, _attacker: &Entity, victim: &Entity) {
        if victim.is_immune_to(container.combat_type()) {
            container.map_hits(|hit| hit.capped(0));
        }
    }
}

// === World ===

/// Everything the tick thread mutates
pub struct World {
    pub entities: EntityList,
    pub config: CombatConfig,
    pub spells: SpellRegistry,
    pub npc_definitions: NpcDefinitions,
    pub strategies: StrategyRegistry,
    pub zones: Box<dyn ZonePolicy>,
    pub clock: Box<dyn Clock>,
    pub rng: Box<dyn RngCore>,
    pub events: Vec<WorldEvent>,
    pub hit_modifiers: Vec<Box<dyn HitModifier>>,
}

impl World {
    /// A single-combat world seeded with `seed`
    pub fn new(
        config: CombatConfig,
        spells: SpellRegistry,
        npc_definitions: NpcDefinitions,
        seed: u64,
    ) -> Self {
        World {
            entities: EntityList::new(),
            config,
            spells,
            npc_definitions,
            strategies: StrategyRegistry::new(),
            zones: Box::new(SingleCombatZones),
            clock: Box::new(SystemClock),
            rng: Box::new(ChaCha8Rng::seed_from_u64(seed)),
            events: Vec::new(),
            hit_modifiers: vec![Box::new(ImmunityModifier)],
        }
    }

    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_zones(mut self, zones: impl ZonePolicy + 'static) -> Self {
        self.zones = Box::new(zones);
        self
    }

    pub fn with_hit_modifier(mut self, modifier: impl HitModifier + 'static) -> Self {
        self.hit_modifiers.push(Box::new(modifier));
        self
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn emit(&mut self, event: WorldEvent) {
        self.events.push(event);
    }

    /// Take every queued event
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Look up an entity that must exist
    pub fn require(&self, id: EntityId) -> Result<&Entity, CombatError> {
        self.entities.get(id).ok_or(CombatError::MissingEntity(id))
    }

    /// A fresh NPC built from its definition; not yet registered
    pub fn create_npc(&self, npc_id: u16, spawn: Position) -> Result<Entity, CombatError> {
        let definition = self
            .npc_definitions
            .get(npc_id)
            .ok_or(CombatError::UnknownNpc(npc_id))?;
        Ok(Entity::new_npc(definition.clone(), spawn))
    }

    /// Whether `id` stands in a multi-combat area
    pub fn in_multi(&self, id: EntityId) -> bool {
        self.entities
            .get(id)
            .is_some_and(|e| self.zones.in_multi_combat(&e.position))
    }

    /// Borrow the attacker and victim together with a strategy context over
    /// the remaining world fields
    pub fn round_parts(
        &mut self,
        attacker: EntityId,
        victim: EntityId,
    ) -> Option<(&mut Entity, &mut Entity, StrategyContext<'_>)> {
        let (a, v) = self.entities.pair_mut(attacker, victim)?;
        let ctx = StrategyContext {
            config: &self.config,
            spells: &self.spells,
            rng: &mut *self.rng,
            events: &mut self.events,
        };
        Some((a, v, ctx))
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("zones", &self.zones)
            .field("clock", &self.clock)
            .field("events", &self.events.len())
            .finish()
    }
}

impl TaskContext for World {
    type Owner = EntityId;

    fn is_owner_valid(&self, owner: EntityId) -> bool {
        self.entities.get(owner).is_some_and(|e| !e.is_unregistered())
    }
}
