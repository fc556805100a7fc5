//! Combat strategies - how a combatant attacks
//!
//! A strategy decides whether a round may start, produces the round's
//! [`CombatContainer`] and reports the timing and distance the session uses.
//! Strategies are stateless values looked up per round in the
//! [`StrategyRegistry`]; overrides can be registered by NPC id or weapon id.

mod dragon;
mod magic;
mod melee;
mod ranged;

pub use dragon::DragonStrategy;
pub use magic::MagicStrategy;
pub use melee::MeleeStrategy;
pub use ranged::RangedStrategy;

pub(crate) use melee::melee_poison;

use super::{CombatContainer, CombatError, SpellRegistry};
use crate::config::CombatConfig;
use crate::entity::{Entity, EntityKind, NpcStrategy};
use crate::types::{CombatType, EntityId, EquipmentSlot};
use crate::world::WorldEvent;
use rand::RngCore;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// World state a strategy may read or write while building a round
pub struct StrategyContext<'a> {
    pub config: &'a CombatConfig,
    pub spells: &'a SpellRegistry,
    pub rng: &'a mut dyn RngCore,
    pub events: &'a mut Vec<WorldEvent>,
}

impl StrategyContext<'_> {
    pub fn emit(&mut self, event: WorldEvent) {
        self.events.push(event);
    }

    /// Send a chat line to `entity`; only players ever see it
    pub fn message(&mut self, entity: &Entity, text: impl Into<String>) {
        if entity.is_player() {
            self.events.push(WorldEvent::Message {
                entity: entity.id,
                text: text.into(),
            });
        }
    }

    pub fn animate(&mut self, entity: EntityId, id: u16) {
        self.events.push(WorldEvent::Animation { entity, id });
    }

    pub fn graphic(&mut self, entity: EntityId, id: u16) {
        self.events.push(WorldEvent::Graphic { entity, id });
    }
}

/// How a combatant attacks
pub trait CombatStrategy: fmt::Debug {
    /// Prerequisites for a round (ammunition, runes, a selected spell).
    /// `false` ends the session.
    fn can_attack(&self, attacker: &Entity, victim: &Entity, ctx: &mut StrategyContext<'_>) -> bool;

    /// Build this round. `Ok(None)` is a round that does nothing; the
    /// session keeps going.
    fn attack(
        &self,
        attacker: &mut Entity,
        victim: &mut Entity,
        ctx: &mut StrategyContext<'_>,
    ) -> Result<Option<CombatContainer>, CombatError>;

    /// Ticks until the next round
    fn attack_delay(&self, attacker: &Entity) -> i32;

    /// Tiles from which a round can start
    fn attack_distance(&self, attacker: &Entity) -> i32;
}

/// Strategies by style, with per-NPC and per-weapon overrides
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    melee: Rc<dyn CombatStrategy>,
    ranged: Rc<dyn CombatStrategy>,
    magic: Rc<dyn CombatStrategy>,
    dragon: Rc<dyn CombatStrategy>,
    npc_overrides: HashMap<u16, Rc<dyn CombatStrategy>>,
    weapon_overrides: HashMap<u16, Rc<dyn CombatStrategy>>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        StrategyRegistry {
            melee: Rc::new(MeleeStrategy),
            ranged: Rc::new(RangedStrategy),
            magic: Rc::new(MagicStrategy),
            dragon: Rc::new(DragonStrategy),
            npc_overrides: HashMap::new(),
            weapon_overrides: HashMap::new(),
        }
    }
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `strategy` for every NPC with definition id `npc_id`
    pub fn register_npc(&mut self, npc_id: u16, strategy: Rc<dyn CombatStrategy>) {
        self.npc_overrides.insert(npc_id, strategy);
    }

    /// Use `strategy` for players wielding item `weapon_id`
    pub fn register_weapon(&mut self, weapon_id: u16, strategy: Rc<dyn CombatStrategy>) {
        self.weapon_overrides.insert(weapon_id, strategy);
    }

    /// Default strategy for a style
    pub fn for_type(&self, combat_type: CombatType) -> Rc<dyn CombatStrategy> {
        match combat_type {
            CombatType::Melee => Rc::clone(&self.melee),
            CombatType::Ranged => Rc::clone(&self.ranged),
            CombatType::Magic => Rc::clone(&self.magic),
        }
    }

    /// The strategy `entity` attacks with right now
    pub fn determine(&self, entity: &Entity) -> Rc<dyn CombatStrategy> {
        match &entity.kind {
            EntityKind::Npc(npc) => {
                let definition = &npc.definition;
                if let Some(strategy) = self.npc_overrides.get(&definition.id) {
                    return Rc::clone(strategy);
                }
                match definition.strategy {
                    NpcStrategy::Dragon => Rc::clone(&self.dragon),
                    NpcStrategy::Standard => self.for_type(definition.combat_type),
                }
            }
            EntityKind::Player(player) => {
                if player.current_spell().is_some() {
                    return Rc::clone(&self.magic);
                }
                let weapon = player.equipment.item_id(EquipmentSlot::Weapon);
                if let Some(strategy) = weapon.and_then(|id| self.weapon_overrides.get(&id)) {
                    return Rc::clone(strategy);
                }
                if player.weapon.is_ranged() {
                    Rc::clone(&self.ranged)
                } else {
                    Rc::clone(&self.melee)
                }
            }
        }
    }
}
