//! Prayer effects on combat rounds

use super::{death, CombatContainer, Hit};
use crate::config::EffectConstants;
use crate::entity::{Entity, Prayer};
use crate::task::Scheduler;
use crate::types::{EntityId, Skill};
use crate::world::{World, WorldEvent};
use rand::Rng;
use tracing::debug;

pub const REDEMPTION_GRAPHIC: u16 = 436;
pub const RETRIBUTION_GRAPHIC: u16 = 437;

/// Reduce a round against a victim praying against its style.
///
/// NPC hits are blocked outright, player hits lose `reduction` of their
/// damage. Returns whether the prayer applied.
pub fn apply_protection(
    container: &mut CombatContainer,
    attacker: &Entity,
    victim: &Entity,
    reduction: f64,
) -> bool {
    if container.ignores_protection {
        return false;
    }
    let protected = victim
        .player()
        .is_some_and(|p| p.prayers.protects_from(container.combat_type()));
    if !protected {
        return false;
    }
    if attacker.is_npc() {
        container.map_hits(|hit| hit.capped(0));
    } else {
        container.map_hits(|hit| hit.scaled(1.0 - reduction));
    }
    true
}

/// Redemption: a victim dropping to a tenth of its hitpoints spends all of
/// its prayer to heal. Returns the amount healed.
pub fn redemption(victim: &mut Entity, effects: &EffectConstants, events: &mut Vec<WorldEvent>) -> i32 {
    let active = victim
        .player()
        .is_some_and(|p| p.prayers.is_active(Prayer::Redemption));
    let hitpoints = victim.hitpoints();
    let threshold = (victim.max_hitpoints() as f64 * effects.redemption_threshold).floor() as i32;
    if !active || hitpoints <= 0 || hitpoints > threshold {
        return 0;
    }

    let heal = (victim.skills.max_level(Skill::Prayer) as f64 * effects.redemption_heal).floor() as i32;
    victim.heal(heal);
    victim.skills.set_level(Skill::Prayer, 0);
    if let Some(player) = victim.player_mut() {
        player.prayers.clear();
    }
    events.push(WorldEvent::Graphic {
        entity: victim.id,
        id: REDEMPTION_GRAPHIC,
    });
    debug!(entity = %victim.id, heal, "redemption");
    heal
}

/// Smite: drain the victim's prayer by a share of the damage rolled against it.
/// Returns the points drained.
pub fn smite(victim: &mut Entity, damage: i32, divisor: i32) -> i32 {
    let active = victim
        .player()
        .is_some_and(|p| p.prayers.is_active(Prayer::Smite));
    if !active || damage <= 0 || divisor <= 0 {
        return 0;
    }
    let drain = (damage / divisor).min(victim.skills.level(Skill::Prayer));
    victim.skills.drain(Skill::Prayer, drain);
    drain
}

/// Retribution: a dying victim hits everything adjacent to it (only its
/// attacker outside multi-combat) for up to a quarter of its prayer level.
pub(crate) fn retribution(
    world: &mut World,
    scheduler: &mut Scheduler<World>,
    victim: EntityId,
    attacker: EntityId,
) {
    let Some(dying) = world.entities.get(victim) else {
        return;
    };
    let active = dying
        .player()
        .is_some_and(|p| p.prayers.is_active(Prayer::Retribution));
    if !active {
        return;
    }

    let position = dying.position;
    let max_hit =
        (dying.skills.max_level(Skill::Prayer) as f64 * world.config.effects.retribution_max).floor() as i32;
    let multi = world.zones.in_multi_combat(&position);
    let targets: Vec<EntityId> = world
        .entities
        .iter()
        .filter(|e| e.id != victim && e.is_valid() && e.position.within_distance(&position, 1))
        .filter(|e| multi || e.id == attacker)
        .map(|e| e.id)
        .collect();

    world.emit(WorldEvent::Graphic {
        entity: victim,
        id: RETRIBUTION_GRAPHIC,
    });

    for target in targets {
        let damage = if max_hit > 0 {
            world.rng.gen_range(0..=max_hit)
        } else {
            0
        };
        let Some(entity) = world.entities.get_mut(target) else {
            continue;
        };
        let applied = entity.apply_hit(Hit::normal(damage));
        world.events.push(WorldEvent::Hitsplat {
            entity: target,
            hit: applied.hit,
            source: Some(victim),
        });
        if applied.killed {
            death::start_death(world, scheduler, target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::RoundHit;
    use crate::config::{default_npc_definitions, CombatConfig};
    use crate::entity::{PlayerState, Skills};
    use crate::types::{CombatType, Position};

    fn praying(prayer: Prayer, hitpoints: i32) -> Entity {
        let mut state = PlayerState::new("monk");
        state.prayers.activate(prayer);
        let mut entity = Entity::new_player(
            state,
            Position::default(),
            Skills::with_levels(&[(Skill::Hitpoints, 99), (Skill::Prayer, 99)]),
        );
        entity.id = EntityId(2);
        entity.skills.set_level(Skill::Hitpoints, hitpoints);
        entity
    }

    fn man() -> Entity {
        let definitions = default_npc_definitions();
        Entity::new_npc(definitions.get(1).unwrap().clone(), Position::default())
    }

    fn round(combat_type: CombatType, damage: i32) -> CombatContainer {
        CombatContainer::with_hits(EntityId(1), EntityId(2), combat_type, vec![RoundHit::accurate(damage)])
            .unwrap()
    }

    #[test]
    fn test_protection_blocks_npcs_and_reduces_players() {
        let victim = praying(Prayer::ProtectFromMelee, 99);
        let npc = man();
        let player = Entity::new_player(PlayerState::new("p"), Position::default(), Skills::new());

        let mut from_npc = round(CombatType::Melee, 20);
        assert!(apply_protection(&mut from_npc, &npc, &victim, 0.4));
        assert_eq!(from_npc.total_damage(), 0);

        let mut from_player = round(CombatType::Melee, 20);
        assert!(apply_protection(&mut from_player, &player, &victim, 0.4));
        assert_eq!(from_player.total_damage(), 12);

        let mut other_style = round(CombatType::Ranged, 20);
        assert!(!apply_protection(&mut other_style, &npc, &victim, 0.4));
        assert_eq!(other_style.total_damage(), 20);
    }

    #[test]
    fn test_protection_bypassed() {
        let victim = praying(Prayer::ProtectFromMelee, 99);
        let npc = man();
        let mut container = round(CombatType::Melee, 20).ignoring_protection();
        assert!(!apply_protection(&mut container, &npc, &victim, 0.4));
        assert_eq!(container.total_damage(), 20);
    }

    #[test]
    fn test_smite_drains_quarter() {
        let mut victim = praying(Prayer::Smite, 99);
        assert_eq!(smite(&mut victim, 40, 4), 10);
        assert_eq!(victim.skills.level(Skill::Prayer), 89);
    }

    #[test]
    fn test_redemption_triggers_below_tenth() {
        let effects = CombatConfig::default().effects;
        let mut events = Vec::new();

        let mut healthy = praying(Prayer::Redemption, 50);
        assert_eq!(redemption(&mut healthy, &effects, &mut events), 0);

        let mut low = praying(Prayer::Redemption, 9);
        assert_eq!(redemption(&mut low, &effects, &mut events), 24);
        assert_eq!(low.hitpoints(), 33);
        assert_eq!(low.skills.level(Skill::Prayer), 0);
        assert!(low.player().unwrap().prayers.active().is_empty());
        assert_eq!(events.len(), 1);
    }
}
