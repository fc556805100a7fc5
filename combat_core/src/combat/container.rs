//! CombatContainer - the hits one round produces

use super::formulas::{self, RollModifiers};
use super::hit::Hit;
use super::CombatError;
use crate::config::CombatConfig;
use crate::entity::Entity;
use crate::types::{CombatType, EntityId};
use rand::Rng;

/// Most hits a single round can carry
pub const MAX_HITS: i32 = 4;

/// One hit of a round and whether its accuracy roll succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundHit {
    pub hit: Hit,
    pub accurate: bool,
}

impl RoundHit {
    pub fn accurate(damage: i32) -> Self {
        RoundHit {
            hit: Hit::normal(damage),
            accurate: true,
        }
    }

    pub fn missed() -> Self {
        RoundHit {
            hit: Hit::blocked(),
            accurate: false,
        }
    }
}

/// What a strategy asks the container to roll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundParams {
    pub hit_count: i32,
    pub combat_type: CombatType,
    pub check_accuracy: bool,
    /// Maximum damage of one accurate hit, modifiers already applied
    pub max_hit: i32,
    pub modifiers: RollModifiers,
}

impl RoundParams {
    pub fn new(combat_type: CombatType, hit_count: i32, max_hit: i32) -> Self {
        RoundParams {
            hit_count,
            combat_type,
            check_accuracy: true,
            max_hit,
            modifiers: RollModifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: RollModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Every hit lands; nothing is rolled for accuracy
    pub fn always_accurate(mut self) -> Self {
        self.check_accuracy = false;
        self
    }
}

/// The outcome of one combat round, applied later by the hit task
#[derive(Debug, Clone, PartialEq)]
pub struct CombatContainer {
    attacker: EntityId,
    victim: EntityId,
    hits: Vec<RoundHit>,
    combat_type: CombatType,
    check_accuracy: bool,
    accurate: bool,

    // === Round extras ===
    /// Spell cast this round
    pub spell: Option<u16>,
    /// Poison damage to start on an accurate round
    pub poison: Option<i32>,
    /// Protection prayers do not reduce this round
    pub ignores_protection: bool,
    /// Ammunition consumed by a ranged round
    pub ammo: Option<u16>,
}

fn check_hit_count(count: i32) -> Result<(), CombatError> {
    if !(0..=MAX_HITS).contains(&count) {
        return Err(CombatError::InvalidHitCount(count));
    }
    Ok(())
}

impl CombatContainer {
    /// Roll a round of `params.hit_count` hits.
    ///
    /// Each hit rolls its own accuracy; an accurate hit rolls damage in
    /// `0..=max_hit`. A round with no hits still rolls accuracy once so the
    /// caller can branch on it.
    pub fn roll<R: Rng + ?Sized>(
        attacker: &Entity,
        victim: &Entity,
        params: RoundParams,
        config: &CombatConfig,
        rng: &mut R,
    ) -> Result<Self, CombatError> {
        check_hit_count(params.hit_count)?;

        let roll_once = |rng: &mut R| {
            !params.check_accuracy
                || formulas::roll_accuracy(
                    attacker,
                    victim,
                    params.combat_type,
                    params.modifiers,
                    config,
                    rng,
                )
        };

        let mut hits = Vec::with_capacity(params.hit_count as usize);
        for _ in 0..params.hit_count {
            if roll_once(&mut *rng) {
                let damage = formulas::roll_damage(params.max_hit, rng);
                hits.push(RoundHit::accurate(damage));
            } else {
                hits.push(RoundHit::missed());
            }
        }

        let accurate = if hits.is_empty() {
            roll_once(&mut *rng)
        } else {
            hits.iter().any(|h| h.accurate)
        };

        Ok(CombatContainer {
            attacker: attacker.id,
            victim: victim.id,
            hits,
            combat_type: params.combat_type,
            check_accuracy: params.check_accuracy,
            accurate,
            spell: None,
            poison: None,
            ignores_protection: false,
            ammo: None,
        })
    }

    /// A round with predetermined hits
    pub fn with_hits(
        attacker: EntityId,
        victim: EntityId,
        combat_type: CombatType,
        hits: Vec<RoundHit>,
    ) -> Result<Self, CombatError> {
        check_hit_count(hits.len() as i32)?;
        let accurate = hits.iter().any(|h| h.accurate);
        Ok(CombatContainer {
            attacker,
            victim,
            hits,
            combat_type,
            check_accuracy: true,
            accurate,
            spell: None,
            poison: None,
            ignores_protection: false,
            ammo: None,
        })
    }

    pub fn attacker(&self) -> EntityId {
        self.attacker
    }

    pub fn victim(&self) -> EntityId {
        self.victim
    }

    pub fn hits(&self) -> &[RoundHit] {
        &self.hits
    }

    pub fn hit_count(&self) -> usize {
        self.hits.len()
    }

    pub fn combat_type(&self) -> CombatType {
        self.combat_type
    }

    pub fn checks_accuracy(&self) -> bool {
        self.check_accuracy
    }

    /// At least one hit was accurate, or accuracy was never checked
    pub fn is_accurate(&self) -> bool {
        !self.check_accuracy || self.accurate
    }

    /// Sum of every hit's damage
    pub fn total_damage(&self) -> i32 {
        self.hits.iter().map(|h| h.hit.damage()).sum()
    }

    /// Rewrite every hit's damage
    pub fn map_hits(&mut self, mut f: impl FnMut(Hit) -> Hit) {
        for round_hit in &mut self.hits {
            round_hit.hit = f(round_hit.hit);
        }
    }

    /// Hits landing immediately and hits landing after the stagger delay
    pub fn staggered(&self) -> (Vec<Hit>, Vec<Hit>) {
        let split = self.hits.len().min(2);
        let first = self.hits[..split].iter().map(|h| h.hit).collect();
        let rest = self.hits[split..].iter().map(|h| h.hit).collect();
        (first, rest)
    }

    pub fn with_spell(mut self, spell: u16) -> Self {
        self.spell = Some(spell);
        self
    }

    pub fn with_poison(mut self, damage: i32) -> Self {
        self.poison = Some(damage);
        self
    }

    pub fn with_ammo(mut self, ammo: u16) -> Self {
        self.ammo = Some(ammo);
        self
    }

    pub fn ignoring_protection(mut self) -> Self {
        self.ignores_protection = true;
        self
    }
}
