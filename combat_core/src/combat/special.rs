//! Weapon special attacks

use super::formulas::{self, RollModifiers};
use super::strategy::melee_poison;
use super::strategy::StrategyContext;
use super::{CombatContainer, CombatError, RoundParams};
use crate::entity::Entity;
use crate::types::{CombatType, EquipmentSlot};
use tracing::debug;

/// A weapon's special attack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecialAttack {
    pub name: &'static str,
    /// Weapons (including poisoned variants) that carry this special
    pub weapons: &'static [u16],
    /// Special energy consumed per use
    pub drain: i32,
    pub accuracy: f64,
    pub damage: f64,
    pub hits: i32,
    pub combat_type: CombatType,
    pub animation: u16,
    pub graphic: Option<u16>,
}

static SPECIALS: [SpecialAttack; 7] = [
    SpecialAttack {
        name: "Puncture",
        weapons: &[1215, 1231, 5680, 5698],
        drain: 25,
        accuracy: 1.15,
        damage: 1.15,
        hits: 2,
        combat_type: CombatType::Melee,
        animation: 1062,
        graphic: Some(252),
    },
    SpecialAttack {
        name: "Cleave",
        weapons: &[1305],
        drain: 25,
        accuracy: 1.0,
        damage: 1.25,
        hits: 1,
        combat_type: CombatType::Melee,
        animation: 1058,
        graphic: Some(248),
    },
    SpecialAttack {
        name: "Shatter",
        weapons: &[1434],
        drain: 25,
        accuracy: 1.25,
        damage: 1.5,
        hits: 1,
        combat_type: CombatType::Melee,
        animation: 1060,
        graphic: Some(251),
    },
    SpecialAttack {
        name: "Energy Drain",
        weapons: &[4151],
        drain: 50,
        accuracy: 1.25,
        damage: 1.0,
        hits: 1,
        combat_type: CombatType::Melee,
        animation: 1658,
        graphic: Some(341),
    },
    SpecialAttack {
        name: "Quick Smash",
        weapons: &[4153],
        drain: 50,
        accuracy: 1.0,
        damage: 1.0,
        hits: 1,
        combat_type: CombatType::Melee,
        animation: 1667,
        graphic: Some(340),
    },
    SpecialAttack {
        name: "Snapshot",
        weapons: &[861],
        drain: 55,
        accuracy: 1.1,
        damage: 1.0,
        hits: 2,
        combat_type: CombatType::Ranged,
        animation: 1074,
        graphic: Some(256),
    },
    SpecialAttack {
        name: "Sever",
        weapons: &[4587],
        drain: 55,
        accuracy: 1.25,
        damage: 1.0,
        hits: 1,
        combat_type: CombatType::Melee,
        animation: 1872,
        graphic: Some(347),
    },
];

impl SpecialAttack {
    /// Special attack of the weapon with item id `weapon`
    pub fn for_weapon(weapon: u16) -> Option<&'static SpecialAttack> {
        SPECIALS.iter().find(|special| special.weapons.contains(&weapon))
    }

    pub fn all() -> &'static [SpecialAttack] {
        &SPECIALS
    }
}

/// Build the round of an activated special attack.
///
/// Returns `None` when the bar is not activated, the weapon has no special,
/// or the player lacks the energy or ammunition. Activation is consumed
/// whatever the outcome; energy only when the round is built.
pub(crate) fn special_round(
    attacker: &mut Entity,
    victim: &Entity,
    ctx: &mut StrategyContext<'_>,
) -> Result<Option<CombatContainer>, CombatError> {
    let (special, energy) = {
        let Some(player) = attacker.player_mut() else {
            return Ok(None);
        };
        if !player.special.activated || player.current_spell().is_some() {
            return Ok(None);
        }
        player.special.activated = false;
        let weapon = player.equipment.item_id(EquipmentSlot::Weapon);
        match weapon.and_then(SpecialAttack::for_weapon) {
            Some(special) => (special, player.special.energy),
            None => return Ok(None),
        }
    };

    if energy < special.drain {
        ctx.message(attacker, "You do not have enough special attack energy left.");
        return Ok(None);
    }

    let mut ammo = None;
    if special.combat_type == CombatType::Ranged {
        let Some(player) = attacker.player_mut() else {
            return Ok(None);
        };
        ammo = player
            .weapon
            .ammo_slot()
            .and_then(|slot| player.equipment.consume(slot, special.hits as u32));
        if ammo.is_none() {
            ctx.message(attacker, "You do not have enough ammo left.");
            return Ok(None);
        }
    }

    let max_hit = match special.combat_type {
        CombatType::Melee => formulas::melee_max_hit(attacker, Some(victim), special.damage),
        CombatType::Ranged => formulas::ranged_max_hit(attacker, special.damage),
        CombatType::Magic => 0,
    };
    let modifiers = RollModifiers {
        accuracy: special.accuracy,
        damage: special.damage,
        ignore_defence: false,
    };
    let params = RoundParams::new(special.combat_type, special.hits, max_hit).with_modifiers(modifiers);
    let mut container = CombatContainer::roll(attacker, victim, params, ctx.config, &mut *ctx.rng)?;

    if let Some(ammo) = ammo {
        container = container.with_ammo(ammo);
    }
    if special.combat_type == CombatType::Melee {
        if let Some(poison) = melee_poison(attacker) {
            container = container.with_poison(poison);
        }
    }
    if let Some(player) = attacker.player_mut() {
        player.special.drain(special.drain);
    }

    debug!(attacker = %attacker.id, special = special.name, "special attack");
    ctx.animate(attacker.id, special.animation);
    if let Some(graphic) = special.graphic {
        ctx.graphic(attacker.id, graphic);
    }
    Ok(Some(container))
}
