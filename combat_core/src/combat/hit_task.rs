//! The hit task - applies a scheduled round once its delay has elapsed

use super::builder::{self, reset_session};
use super::{armour, death, poison, prayers, CombatContainer, Hit, SpellRegistry, SPLASH_GRAPHIC};
use crate::entity::{Entity, Item};
use crate::task::{Scheduler, Task, TaskError, TaskHandle};
use crate::types::{CombatType, EntityId, Skill};
use crate::world::{World, WorldEvent};
use rand::Rng;
use tracing::{debug, trace};

pub(crate) fn hit_task(container: CombatContainer, delay: u32) -> Task<World> {
    let attacker = container.attacker();
    let mut round = Some(container);
    Task::one_shot(
        "combat-hit",
        delay,
        move |world: &mut World, scheduler: &mut Scheduler<World>, _handle: &TaskHandle| match round.take() {
            Some(container) => apply_round(world, scheduler, container),
            None => Ok(()),
        },
    )
    .owned_by(attacker)
}

/// What the round left for the follow-up steps that need the whole world
struct Outcome {
    killed: bool,
    retaliate: bool,
    poison: Option<i32>,
    staggered: Vec<Hit>,
}

fn apply_round(
    world: &mut World,
    scheduler: &mut Scheduler<World>,
    mut container: CombatContainer,
) -> Result<(), TaskError> {
    let attacker_id = container.attacker();
    let victim_id = container.victim();
    let now = world.now_ms();

    let Some((attacker, victim)) = world.entities.pair_mut(attacker_id, victim_id) else {
        trace!(attacker = %attacker_id, victim = %victim_id, "participant missing, dropping round");
        return Ok(());
    };
    if !attacker.is_valid() || !victim.is_valid() {
        trace!(attacker = %attacker_id, victim = %victim_id, "participant gone, dropping round");
        return Ok(());
    }

    for modifier in &world.hit_modifiers {
        modifier.modify(&mut container, attacker, victim);
    }

    let combat_type = container.combat_type();
    let (first, staggered) = container.staggered();

    // === Damage ===
    let rolled: i32 = first.iter().map(Hit::damage).sum();
    let mut killed = false;
    let mut dealt = 0;
    for hit in first {
        let applied = victim.apply_hit(hit);
        dealt += applied.hit.damage();
        killed |= applied.killed;
        world.events.push(WorldEvent::Hitsplat {
            entity: victim_id,
            hit: applied.hit,
            source: Some(attacker_id),
        });
    }
    if attacker.is_player() {
        victim.combat.add_damage(attacker_id, dealt, now);
    }
    if !killed {
        if let Some(npc) = victim.npc() {
            world.events.push(WorldEvent::Animation {
                entity: victim_id,
                id: npc.definition.defence_animation,
            });
        }
    }

    award_experience(
        attacker,
        &container,
        &world.spells,
        world.config.formulas.experience_rate,
        &mut world.events,
    );

    // === Effects ===
    let effects = &world.config.effects;
    let mut pending_poison = None;
    if !container.is_accurate() {
        if combat_type == CombatType::Magic {
            world.events.push(WorldEvent::Graphic {
                entity: victim_id,
                id: SPLASH_GRAPHIC,
            });
            if let Some(spell) = container.spell.and_then(|id| world.spells.get(id)) {
                spell.on_failure(attacker, &mut world.events);
            }
        }
    } else {
        let set = armour::apply_set_effect(
            attacker,
            victim,
            combat_type,
            dealt,
            effects.armour_proc_chance,
            &mut *world.rng,
        );
        if let Some(graphic) = set.and_then(|set| set.graphic()) {
            world.events.push(WorldEvent::Graphic {
                entity: victim_id,
                id: graphic,
            });
        }

        prayers::redemption(victim, effects, &mut world.events);
        // Smite works off the rolled damage, not what the victim had left.
        if attacker.is_player() {
            prayers::smite(victim, rolled, effects.smite_divisor);
        }

        pending_poison = container.poison;
        if let Some(spell) = container.spell.and_then(|id| world.spells.get(id)) {
            if let Some(graphic) = spell.end_graphic {
                world.events.push(WorldEvent::Graphic {
                    entity: victim_id,
                    id: graphic,
                });
            }
            if let Some(damage) = spell.apply_effect(victim) {
                pending_poison = Some(damage);
            }
        }

        if combat_type == CombatType::Ranged {
            if let Some(ammo) = container.ammo {
                if world.rng.gen_bool(effects.ammo_drop_chance) {
                    world.events.push(WorldEvent::GroundItem {
                        item: Item::single(ammo),
                        position: victim.position,
                        owner: attacker.is_player().then_some(attacker_id),
                    });
                }
            }
        }
    }

    victim.combat.record_hit(attacker_id, now);
    let outcome = Outcome {
        killed,
        retaliate: !killed
            && victim.auto_retaliates()
            && !victim.combat.is_attacking()
            && !victim.combat.is_waiting(),
        poison: pending_poison,
        staggered,
    };

    if combat_type == CombatType::Magic {
        let single_cast = attacker
            .player()
            .is_some_and(|player| player.autocast_spell.is_none());
        if single_cast {
            reset_session(attacker);
            if let Some(player) = attacker.player_mut() {
                player.cast_spell = None;
            }
        }
    }

    debug!(
        attacker = %attacker_id,
        victim = %victim_id,
        dealt,
        killed,
        accurate = container.is_accurate(),
        "round applied"
    );
    follow_up(world, scheduler, attacker_id, victim_id, outcome);
    Ok(())
}

fn follow_up(
    world: &mut World,
    scheduler: &mut Scheduler<World>,
    attacker: EntityId,
    victim: EntityId,
    outcome: Outcome,
) {
    if !outcome.killed && !outcome.staggered.is_empty() {
        let delay = world.config.timing.stagger_delay;
        scheduler.submit(stagger_task(attacker, victim, outcome.staggered, delay));
    }
    if let Some(damage) = outcome.poison {
        poison::apply_poison(world, scheduler, victim, damage);
    }
    if outcome.retaliate {
        builder::attack(world, scheduler, victim, attacker);
    }
    if outcome.killed {
        prayers::retribution(world, scheduler, victim, attacker);
        death::start_death(world, scheduler, victim);
    }
}

/// Third and fourth hits of a round, one stagger later
fn stagger_task(attacker: EntityId, victim: EntityId, hits: Vec<Hit>, delay: u32) -> Task<World> {
    Task::one_shot(
        "combat-hit-stagger",
        delay,
        move |world: &mut World, scheduler: &mut Scheduler<World>, _handle: &TaskHandle| {
            let now = world.now_ms();
            let credit = world.entities.get(attacker).is_some_and(Entity::is_player);
            let Some(entity) = world.entities.get_mut(victim) else {
                return Ok(());
            };
            if !entity.is_valid() {
                return Ok(());
            }

            let mut killed = false;
            let mut dealt = 0;
            for hit in &hits {
                let applied = entity.apply_hit(*hit);
                dealt += applied.hit.damage();
                killed |= applied.killed;
                world.events.push(WorldEvent::Hitsplat {
                    entity: victim,
                    hit: applied.hit,
                    source: Some(attacker),
                });
            }
            if credit {
                entity.combat.add_damage(attacker, dealt, now);
            }
            if killed {
                prayers::retribution(world, scheduler, victim, attacker);
                death::start_death(world, scheduler, victim);
            }
            Ok(())
        },
    )
    .owned_by(victim)
}

/// Experience for a player's round.
///
/// Each trained skill gets `damage * 4` split between them and Hitpoints a
/// third of one share. Magic is never split: an accurate cast grants
/// `damage * 4` plus the spell's base experience as is.
fn award_experience(
    attacker: &mut Entity,
    container: &CombatContainer,
    spells: &SpellRegistry,
    rate: f64,
    events: &mut Vec<WorldEvent>,
) {
    let Some(style) = attacker.player().map(|player| player.fight_type.style) else {
        return;
    };
    let combat_type = container.combat_type();
    let base = if combat_type == CombatType::Magic {
        if !container.is_accurate() {
            return;
        }
        container
            .spell
            .and_then(|id| spells.get(id))
            .map_or(0.0, |spell| spell.base_experience)
    } else {
        0.0
    };

    let total = f64::from(container.total_damage() * 4) + base;
    let trained = style.trained_skills(combat_type);
    if total <= 0.0 || trained.is_empty() {
        return;
    }
    let share = if combat_type == CombatType::Magic {
        total
    } else {
        (total / trained.len() as f64).floor()
    };
    let hitpoints = (share / 3.0).floor();

    let grants = trained
        .iter()
        .map(|skill| (*skill, share))
        .chain(std::iter::once((Skill::Hitpoints, hitpoints)));
    for (skill, amount) in grants {
        if attacker.skills.add_experience(skill, amount * rate) > 0 {
            let level = attacker.skills.max_level(skill);
            events.push(WorldEvent::LevelUp {
                entity: attacker.id,
                skill,
                level,
            });
            events.push(WorldEvent::Message {
                entity: attacker.id,
                text: format!("Congratulations, you just advanced a {skill:?} level."),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::RoundHit;
    use crate::config::{default_combat_config, default_npc_definitions, default_spells};
    use crate::entity::{PlayerState, Prayer, Skills};
    use crate::types::{FightStyle, Position};
    use rand::rngs::mock::StepRng;

    fn setup() -> (World, Scheduler<World>, EntityId, EntityId) {
        let mut world = World::new(
            default_combat_config(),
            default_spells(),
            default_npc_definitions(),
            1,
        )
        .with_rng(StepRng::new(0, 0));
        let attacker = world.entities.insert(Entity::new_player(
            PlayerState::new("attacker"),
            Position::new(0, 0, 0),
            Skills::new(),
        ));
        let mut state = PlayerState::new("victim");
        state.auto_retaliate = false;
        let victim = world.entities.insert(Entity::new_player(
            state,
            Position::new(1, 0, 0),
            Skills::with_levels(&[(Skill::Hitpoints, 99)]),
        ));
        (world, Scheduler::new(), attacker, victim)
    }

    fn splats(world: &World, victim: EntityId) -> Vec<i32> {
        world
            .events
            .iter()
            .filter_map(|e| match e {
                WorldEvent::Hitsplat { entity, hit, .. } if *entity == victim => Some(hit.damage()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_third_and_fourth_hits_land_a_tick_later() {
        let (mut world, mut scheduler, attacker, victim) = setup();
        let hits = vec![
            RoundHit::accurate(1),
            RoundHit::accurate(2),
            RoundHit::accurate(3),
            RoundHit::accurate(4),
        ];
        let container = CombatContainer::with_hits(attacker, victim, CombatType::Melee, hits).unwrap();
        scheduler.submit(hit_task(container, 1));

        scheduler.tick(&mut world);
        assert_eq!(splats(&world, victim), vec![1, 2]);
        scheduler.tick(&mut world);
        assert_eq!(splats(&world, victim), vec![1, 2, 3, 4]);

        let record = world.entity(victim).unwrap().combat.damage_records()[&attacker];
        assert_eq!(record.amount, 10);
    }

    #[test]
    fn test_melee_experience_split() {
        let (mut world, mut scheduler, attacker, victim) = setup();
        let container =
            CombatContainer::with_hits(attacker, victim, CombatType::Melee, vec![RoundHit::accurate(10)])
                .unwrap();
        let hitpoints_before = world.entity(attacker).unwrap().skills.experience(Skill::Hitpoints);
        scheduler.submit(hit_task(container, 1));
        scheduler.tick(&mut world);

        let skills = &world.entity(attacker).unwrap().skills;
        assert_eq!(skills.experience(Skill::Attack), 40.0);
        assert_eq!(skills.experience(Skill::Hitpoints), hitpoints_before + 13.0);
    }

    #[test]
    fn test_magic_experience_is_not_split() {
        let (mut world, mut scheduler, attacker, victim) = setup();
        let player = world.entity_mut(attacker).unwrap().player_mut().unwrap();
        player.fight_type.style = FightStyle::Defensive;
        let hitpoints_before = world.entity(attacker).unwrap().skills.experience(Skill::Hitpoints);
        let container =
            CombatContainer::with_hits(attacker, victim, CombatType::Magic, vec![RoundHit::accurate(10)])
                .unwrap()
                .with_spell(1152);
        scheduler.submit(hit_task(container, 1));
        scheduler.tick(&mut world);

        let skills = &world.entity(attacker).unwrap().skills;
        // 10 * 4 + Wind Strike's 5.5
        assert_eq!(skills.experience(Skill::Magic), 45.5);
        assert_eq!(skills.experience(Skill::Defence), 0.0);
        assert_eq!(skills.experience(Skill::Hitpoints), hitpoints_before + 15.0);
    }

    #[test]
    fn test_inaccurate_magic_splashes() {
        let (mut world, mut scheduler, attacker, victim) = setup();
        let container =
            CombatContainer::with_hits(attacker, victim, CombatType::Magic, vec![RoundHit::missed()])
                .unwrap()
                .with_spell(1152);
        scheduler.submit(hit_task(container, 1));
        scheduler.tick(&mut world);

        assert!(world.events.contains(&WorldEvent::Graphic {
            entity: victim,
            id: SPLASH_GRAPHIC,
        }));
        assert_eq!(world.entity(attacker).unwrap().skills.experience(Skill::Magic), 0.0);
    }

    #[test]
    fn test_splashed_bind_tells_caster() {
        let (mut world, mut scheduler, attacker, victim) = setup();
        let container =
            CombatContainer::with_hits(attacker, victim, CombatType::Magic, vec![RoundHit::missed()])
                .unwrap()
                .with_spell(1572);
        scheduler.submit(hit_task(container, 1));
        scheduler.tick(&mut world);

        assert!(world.events.contains(&WorldEvent::Message {
            entity: attacker,
            text: "Your spell failed to take hold.".to_string(),
        }));
        assert!(!world.entity(victim).unwrap().is_frozen());
    }

    #[test]
    fn test_smite_drains_from_rolled_damage() {
        let (mut world, mut scheduler, attacker, victim) = setup();
        let target = world.entity_mut(victim).unwrap();
        target.skills.set_level(Skill::Hitpoints, 30);
        target.skills.set_level(Skill::Prayer, 50);
        target.player_mut().unwrap().prayers.activate(Prayer::Smite);
        let container =
            CombatContainer::with_hits(attacker, victim, CombatType::Melee, vec![RoundHit::accurate(40)])
                .unwrap();
        scheduler.submit(hit_task(container, 1));
        scheduler.tick(&mut world);

        assert_eq!(splats(&world, victim), vec![30]);
        assert_eq!(world.entity(victim).unwrap().skills.level(Skill::Prayer), 40);
    }

    #[test]
    fn test_round_dropped_when_victim_gone() {
        let (mut world, mut scheduler, attacker, victim) = setup();
        let container =
            CombatContainer::with_hits(attacker, victim, CombatType::Melee, vec![RoundHit::accurate(10)])
                .unwrap();
        scheduler.submit(hit_task(container, 1));
        world.entity_mut(victim).unwrap().status.unregistered = true;
        scheduler.tick(&mut world);
        assert!(splats(&world, victim).is_empty());
    }

    #[test]
    fn test_killing_blow_starts_death() {
        let (mut world, mut scheduler, attacker, victim) = setup();
        world.entity_mut(victim).unwrap().skills.set_level(Skill::Hitpoints, 5);
        let container =
            CombatContainer::with_hits(attacker, victim, CombatType::Melee, vec![RoundHit::accurate(20)])
                .unwrap();
        scheduler.submit(hit_task(container, 1));
        scheduler.tick(&mut world);

        assert_eq!(splats(&world, victim), vec![5]);
        assert!(world.entity(victim).unwrap().is_dead());
        assert_eq!(scheduler.count_named("death"), 1);
    }
}
