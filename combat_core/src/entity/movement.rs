//! Straight-line movement state
//!
//! There is no pathfinding: every step moves one tile directly toward the
//! goal (two when running), diagonals allowed.

use crate::types::{EntityId, Position};
use serde::{Deserialize, Serialize};

/// Where an entity is heading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// Entity being followed
    pub following: Option<EntityId>,
    /// Distance kept from the followed entity
    pub follow_distance: i32,
    /// Fixed tile being walked to; takes priority over following
    pub destination: Option<Position>,
    pub running: bool,
    /// Whether the entity changed tile during the current tick
    pub moved: bool,
}

impl Movement {
    pub fn new() -> Self {
        Movement {
            follow_distance: 1,
            ..Default::default()
        }
    }

    /// Follow `target`, stopping once within `distance` tiles
    pub fn follow(&mut self, target: EntityId, distance: i32) {
        self.following = Some(target);
        self.follow_distance = distance.max(1);
    }

    pub fn stop_following(&mut self) {
        self.following = None;
    }

    pub fn walk_to(&mut self, destination: Position) {
        self.following = None;
        self.destination = Some(destination);
    }

    /// Drop the queued destination; following is kept
    pub fn stop(&mut self) {
        self.destination = None;
    }

    /// Drop everything, including following
    pub fn clear(&mut self) {
        self.following = None;
        self.destination = None;
        self.moved = false;
    }

    /// Tiles covered per tick
    pub fn speed(&self) -> i32 {
        if self.running {
            2
        } else {
            1
        }
    }
}

/// Walk from `from` toward `goal` for `steps` tiles, stopping once within
/// `stop_at` tiles of it
pub fn step_towards(from: Position, goal: Position, stop_at: i32, steps: i32) -> Position {
    let mut current = from;
    for _ in 0..steps {
        if current.z != goal.z || current.distance(&goal) <= stop_at {
            break;
        }
        current = current.step_towards(&goal);
    }
    current
}
