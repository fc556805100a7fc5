//! Duel simulation - scripted matchups run through the engine

use combat_core::combat::CombatError;
use combat_core::config::ConfigError;
use combat_core::entity::{Entity, Item, PlayerState, Skills, WeaponInterface};
use combat_core::types::{AttackBonusType, Bonus, EquipmentSlot, FightStyle, FightType, Position, Skill};
use combat_core::world::ManualClock;
use combat_core::{EntityId, GameEngine, World, WorldEvent};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Simulator setup error
#[derive(Error, Debug)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("combat error: {0}")]
    Combat(#[from] CombatError),
}

/// Totals for one fighter across every life it had
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FighterStats {
    pub damage_dealt: i32,
    pub hits: u32,
    pub rounds: u32,
    pub kills: u32,
    pub deaths: u32,
}

/// Outcome of a simulation run
#[derive(Debug, Clone, Default)]
pub struct DuelReport {
    pub ticks: u64,
    pub fighters: BTreeMap<String, FighterStats>,
}

impl fmt::Display for DuelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Duel after {} ticks", self.ticks)?;
        writeln!(
            f,
            "{:<20} {:>8} {:>6} {:>7} {:>6} {:>7}",
            "fighter", "dealt", "hits", "rounds", "kills", "deaths"
        )?;
        for (name, stats) in &self.fighters {
            writeln!(
                f,
                "{:<20} {:>8} {:>6} {:>7} {:>6} {:>7}",
                name, stats.damage_dealt, stats.hits, stats.rounds, stats.kills, stats.deaths
            )?;
        }
        Ok(())
    }
}

/// A player farming one kind of NPC
#[derive(Debug, Clone)]
struct Matchup {
    player: EntityId,
    npc_id: u16,
    spawn: Position,
    npc: Option<EntityId>,
}

/// Who an entity id belongs to in the report
#[derive(Debug, Clone)]
struct Fighter {
    label: String,
    attack_animation: u16,
}

/// Players fighting NPCs that respawn as soon as they are removed.
///
/// The world clock advances one tick length per tick, so under-attack
/// timeouts and attribution windows follow simulated time.
#[derive(Debug)]
pub struct Duel {
    engine: GameEngine,
    clock: ManualClock,
    matchups: Vec<Matchup>,
    fighters: HashMap<EntityId, Fighter>,
    report: DuelReport,
}

impl Duel {
    pub fn new(world: World) -> Self {
        let clock = ManualClock::new(0);
        Duel {
            engine: GameEngine::new(world.with_clock(clock.clone())),
            clock,
            matchups: Vec::new(),
            fighters: HashMap::new(),
            report: DuelReport::default(),
        }
    }

    /// A melee fighter against a Hill Giant and an archer against a Dark wizard
    pub fn standard(world: World) -> Result<Self, SimError> {
        let mut duel = Duel::new(world);

        let mut knight = PlayerState::new("knight");
        knight.weapon = WeaponInterface::melee(4, 1658);
        knight.fight_type = FightType {
            style: FightStyle::Aggressive,
            bonus: AttackBonusType::Slash,
        };
        knight.equipment.equip(EquipmentSlot::Weapon, Item::single(4151));
        knight.equipment.set_bonus(Bonus::SlashAttack, 82);
        knight.equipment.set_bonus(Bonus::Strength, 82);
        let knight = duel.add_player(
            knight,
            Position::new(3200, 3200, 0),
            &[
                (Skill::Attack, 70),
                (Skill::Strength, 70),
                (Skill::Defence, 60),
                (Skill::Hitpoints, 70),
            ],
        );
        duel.add_matchup(knight, 117, Position::new(3201, 3200, 0))?;

        let mut archer = PlayerState::new("archer");
        archer.weapon = WeaponInterface::bow(4, 7);
        archer.equipment.equip(EquipmentSlot::Weapon, Item::single(861));
        archer.equipment.equip(EquipmentSlot::Arrows, Item::new(882, 500));
        archer.equipment.set_bonus(Bonus::RangedAttack, 69);
        let archer = duel.add_player(
            archer,
            Position::new(3300, 3300, 0),
            &[(Skill::Ranged, 70), (Skill::Defence, 40), (Skill::Hitpoints, 60)],
        );
        duel.add_matchup(archer, 174, Position::new(3305, 3300, 0))?;

        Ok(duel)
    }

    pub fn add_player(&mut self, state: PlayerState, position: Position, levels: &[(Skill, i32)]) -> EntityId {
        let fighter = Fighter {
            label: state.username.clone(),
            attack_animation: state.weapon.animation,
        };
        let id = self
            .engine
            .spawn(Entity::new_player(state, position, Skills::with_levels(levels)));
        self.fighters.insert(id, fighter);
        id
    }

    /// Have `player` fight NPC `npc_id` spawned at `spawn`, forever
    pub fn add_matchup(&mut self, player: EntityId, npc_id: u16, spawn: Position) -> Result<(), SimError> {
        let mut matchup = Matchup {
            player,
            npc_id,
            spawn,
            npc: None,
        };
        self.respawn(&mut matchup)?;
        self.matchups.push(matchup);
        Ok(())
    }

    fn respawn(&mut self, matchup: &mut Matchup) -> Result<(), SimError> {
        let npc = self.engine.spawn_npc(matchup.npc_id, matchup.spawn)?;
        if let Some(entity) = self.engine.world.entity(npc) {
            let definition = entity.npc().map(|n| &n.definition);
            self.fighters.insert(
                npc,
                Fighter {
                    label: entity.name().to_string(),
                    attack_animation: definition.map_or(0, |d| d.attack_animation),
                },
            );
        }
        debug!(npc = %npc, id = matchup.npc_id, "npc spawned");
        matchup.npc = Some(npc);
        Ok(())
    }

    /// Re-engage idle players and replace removed NPCs
    fn refresh(&mut self) -> Result<(), SimError> {
        let view = self.engine.world.config.range.view_distance;
        let mut matchups = std::mem::take(&mut self.matchups);
        let mut result = Ok(());
        for matchup in &mut matchups {
            let present = matchup.npc.is_some_and(|id| self.engine.world.entity(id).is_some());
            if !present {
                if let Err(err) = self.respawn(matchup) {
                    result = Err(err);
                    continue;
                }
            }
            let Some(npc) = matchup.npc else {
                continue;
            };

            let world = &mut self.engine.world;
            let Some((player, target)) = world.entities.pair_mut(matchup.player, npc) else {
                continue;
            };
            if !player.is_valid() || !target.is_valid() {
                continue;
            }
            if player.combat.is_attacking() || player.combat.is_waiting() {
                continue;
            }
            if !player.position.within_distance(&target.position, view) {
                player.position = Position::new(target.position.x - 1, target.position.y, target.position.z);
            }
            self.engine.attack(matchup.player, npc);
            self.engine.attack(npc, matchup.player);
        }
        self.matchups = matchups;
        result
    }

    fn record(&mut self, events: Vec<WorldEvent>) {
        for event in events {
            match event {
                WorldEvent::Hitsplat {
                    hit,
                    source: Some(source),
                    ..
                } => {
                    if let Some(stats) = self.stats_for(source) {
                        stats.damage_dealt += hit.damage();
                        stats.hits += 1;
                    }
                }
                WorldEvent::Animation { entity, id } => {
                    let attacking = self
                        .fighters
                        .get(&entity)
                        .is_some_and(|f| f.attack_animation == id);
                    if attacking {
                        if let Some(stats) = self.stats_for(entity) {
                            stats.rounds += 1;
                        }
                    }
                }
                WorldEvent::Death { entity, killer } => {
                    if let Some(stats) = self.stats_for(entity) {
                        stats.deaths += 1;
                    }
                    if let Some(stats) = killer.and_then(|k| self.stats_for(k)) {
                        stats.kills += 1;
                    }
                }
                _ => {}
            }
        }
    }

    fn stats_for(&mut self, id: EntityId) -> Option<&mut FighterStats> {
        let label = self.fighters.get(&id)?.label.clone();
        Some(self.report.fighters.entry(label).or_default())
    }

    /// Advance `ticks` ticks and return the running totals
    pub fn run(&mut self, ticks: u64) -> &DuelReport {
        let tick_ms = self.engine.world.config.timing.tick_ms;
        for _ in 0..ticks {
            self.clock.advance(tick_ms);
            if let Err(err) = self.refresh() {
                warn!(error = %err, "matchup refresh failed");
            }
            self.engine.tick();
            let events = self.engine.world.drain_events();
            self.record(events);
            self.report.ticks += 1;
        }
        &self.report
    }
}
