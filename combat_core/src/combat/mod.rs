//! Combat - sessions, rounds and everything a round can trigger
//!
//! A session starts with [`attack`], which waits (as a conditional task) for
//! the attacker to get within range and then submits the per-tick hook task.
//! The hook gates every round and asks the attacker's [`CombatStrategy`] for a
//! [`CombatContainer`]; the container is applied by a delayed hit task.

pub mod armour;
mod builder;
mod container;
pub mod death;
pub mod formulas;
mod hit;
mod hit_task;
mod hook;
pub mod poison;
pub mod prayers;
pub mod special;
mod spell;
pub mod status;
pub mod strategy;

pub use builder::{attack, reset_session, CombatBuilder, DamageRecord};
pub use container::{CombatContainer, RoundHit, RoundParams, MAX_HITS};
pub use formulas::RollModifiers;
pub use hit::{Hit, HitKind};
pub use special::SpecialAttack;
pub use spell::{SpellDescriptor, SpellEffect, SpellRegistry, SPLASH_GRAPHIC};
pub use strategy::{CombatStrategy, StrategyContext, StrategyRegistry};

pub(crate) use hit_task::hit_task;

use crate::types::EntityId;
use thiserror::Error;

/// Caller errors raised while building or resolving a round
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CombatError {
    #[error("a round carries 0 to 4 hits, got {0}")]
    InvalidHitCount(i32),
    #[error("entity {0} is not registered")]
    MissingEntity(EntityId),
    #[error("unknown spell {0}")]
    UnknownSpell(u16),
    #[error("unknown npc definition {0}")]
    UnknownNpc(u16),
}
