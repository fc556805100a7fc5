//! Skills - current levels, maximum levels and experience

use crate::types::Skill;
use serde::{Deserialize, Serialize};

/// Highest level reachable through experience
pub const MAX_LEVEL: i32 = 99;

/// Experience cap per skill
pub const MAX_EXPERIENCE: f64 = 200_000_000.0;

/// One skill's state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillLevel {
    /// Current (possibly boosted or drained) level
    pub level: i32,
    /// Level the skill restores to
    pub max: i32,
    pub experience: f64,
}

impl SkillLevel {
    fn at(level: i32) -> Self {
        SkillLevel {
            level,
            max: level,
            experience: experience_for_level(level.min(MAX_LEVEL)),
        }
    }

    /// Whether the skill is at (or above) its maximum
    pub fn is_full(&self) -> bool {
        self.level >= self.max
    }
}

/// All combat-relevant skills of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    levels: [SkillLevel; Skill::COUNT],
}

impl Default for Skills {
    fn default() -> Self {
        let mut levels = [SkillLevel::at(1); Skill::COUNT];
        levels[Skill::Hitpoints.index()] = SkillLevel::at(10);
        Skills { levels }
    }
}

impl Skills {
    /// Level 1 everywhere except 10 Hitpoints
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the defaults and set the given levels (current = max)
    pub fn with_levels(levels: &[(Skill, i32)]) -> Self {
        let mut skills = Self::new();
        for &(skill, level) in levels {
            skills.levels[skill.index()] = SkillLevel::at(level.max(1));
        }
        skills
    }

    pub fn get(&self, skill: Skill) -> &SkillLevel {
        &self.levels[skill.index()]
    }

    /// Current level
    pub fn level(&self, skill: Skill) -> i32 {
        self.levels[skill.index()].level
    }

    /// Level the skill restores to
    pub fn max_level(&self, skill: Skill) -> i32 {
        self.levels[skill.index()].max
    }

    pub fn experience(&self, skill: Skill) -> f64 {
        self.levels[skill.index()].experience
    }

    /// Set the current level, clamped at zero
    pub fn set_level(&mut self, skill: Skill, level: i32) {
        self.levels[skill.index()].level = level.max(0);
    }

    /// Lower the current level by `amount`, never below zero
    pub fn drain(&mut self, skill: Skill, amount: i32) {
        let entry = &mut self.levels[skill.index()];
        entry.level = (entry.level - amount).max(0);
    }

    /// Raise the current level by `amount`, capped at the maximum
    pub fn restore(&mut self, skill: Skill, amount: i32) {
        let entry = &mut self.levels[skill.index()];
        entry.level = (entry.level + amount).min(entry.max);
    }

    /// Restore every skill to its maximum
    pub fn restore_all(&mut self) {
        for entry in &mut self.levels {
            entry.level = entry.max;
        }
    }

    /// Add experience. Returns the number of levels gained.
    ///
    /// Levels gained also raise the current level so boosts and drains are
    /// preserved relative to the new maximum.
    pub fn add_experience(&mut self, skill: Skill, amount: f64) -> i32 {
        if amount <= 0.0 {
            return 0;
        }
        let entry = &mut self.levels[skill.index()];
        entry.experience = (entry.experience + amount).min(MAX_EXPERIENCE);

        let new_max = level_for_experience(entry.experience);
        if new_max > entry.max {
            let gained = new_max - entry.max;
            entry.max = new_max;
            entry.level += gained;
            gained
        } else {
            0
        }
    }
}

/// Experience required to reach `level`
pub fn experience_for_level(level: i32) -> f64 {
    let mut points = 0.0;
    for lvl in 1..level {
        let lvl = lvl as f64;
        points += (lvl + 300.0 * 2f64.powf(lvl / 7.0)).floor();
    }
    (points / 4.0).floor()
}

/// Level corresponding to an experience total (1..=99)
pub fn level_for_experience(experience: f64) -> i32 {
    let mut points = 0.0;
    for lvl in 1..MAX_LEVEL {
        let l = lvl as f64;
        points += (l + 300.0 * 2f64.powf(l / 7.0)).floor();
        if (points / 4.0).floor() > experience {
            return lvl;
        }
    }
    MAX_LEVEL
}
