//! Prelude module for convenient imports
//!
//! ```rust
//! use combat_core::prelude::*;
//! ```

// Core types
pub use crate::types::{CombatType, EntityId, EquipmentSlot, FightStyle, FightType, Position, Skill};

// Scheduler
pub use crate::task::{Scheduler, Task, TaskError, TaskHandle};

// Entities
pub use crate::entity::{Entity, Item, PlayerState, Prayer, Skills, WeaponInterface};

// Combat
pub use crate::combat::{
    attack, reset_session, CombatContainer, CombatError, CombatStrategy, Hit, HitKind, RoundHit,
    StrategyContext, StrategyRegistry,
};

// World
pub use crate::engine::GameEngine;
pub use crate::world::{Area, ManualClock, MultiCombatAreas, World, WorldEvent};

// Config
pub use crate::config::{default_combat_config, default_npc_definitions, default_spells};
