//! combat_core - Tick scheduler and combat resolution for a game server
//!
//! This library provides:
//! - Scheduler: single-threaded, tick-driven task runner (one-shot, periodic
//!   and conditional tasks)
//! - CombatBuilder: per-entity combat session and damage attribution
//! - CombatStrategy: melee, ranged, magic and dragon rounds
//! - CombatContainer: the hits of one round, applied by a delayed hit task
//! - GameEngine: movement stepping plus the scheduler, one call per tick

pub mod combat;
pub mod config;
pub mod engine;
pub mod entity;
pub mod prelude;
pub mod task;
pub mod types;
pub mod world;

// Re-export core types for convenience
pub use combat::{
    attack, reset_session, CombatBuilder, CombatContainer, CombatError, CombatStrategy, Hit,
    HitKind, StrategyRegistry,
};
pub use config::{default_combat_config, default_npc_definitions, default_spells, CombatConfig, ConfigError};
pub use engine::GameEngine;
pub use entity::{Entity, EntityList, PlayerState, Skills};
pub use task::{Scheduler, Task, TaskError, TaskHandle};
pub use types::{CombatType, EntityId, Position, Skill};
pub use world::{World, WorldEvent};
