use crate::simulation::achievements::GameStats;
use crate::simulation::boids::{self, Boid, SpatialGrid};
use crate::simulation::catalog::Catalog;
use crate::simulation::config::SimulationConfig;
use crate::simulation::economy::{Economy, ParticleKind};
use crate::simulation::events::{DeathCause, SimEvent};
use crate::simulation::fish::{Disease, FishAction, FishAgent, Personality, VitalsContext};
use crate::simulation::water::WaterParams;
use noise::Perlin;
use rand::prelude::*;
use std::collections::HashSet;

const GRID_CELL: f32 = 100.0;

/// Tank-wide inputs for one agent pass.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    pub catalog: &'a Catalog,
    pub config: &'a SimulationConfig,
    pub dt_secs: f32,
    /// `dt_secs` expressed in reference frames
    pub frames: f32,
    pub elapsed_secs: f32,
    pub metabolism: f32,
    pub health_resistance: f32,
    pub happiness_bonus: f32,
    /// Multiplier applied to a species' base value when a fish eats
    pub coin_multiplier: f64,
}

/// Mutable world state the pass writes into.
pub struct PassTargets<'a> {
    pub economy: &'a mut Economy,
    pub water: &'a mut WaterParams,
    pub stats: &'a mut GameStats,
    pub events: &'a mut Vec<SimEvent>,
}

// ─── Ecosystem ───

/// Runs the per-tick agent pass: vitals, schooling, predation, fleeing,
/// feeding, wandering and integration. Removals are marked during the pass and
/// compacted once at the end.
pub struct Ecosystem {
    pub perlin: Perlin,
    grid: SpatialGrid,
    warned_species: HashSet<String>,
}

impl Ecosystem {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            perlin: Perlin::new(42),
            grid: SpatialGrid::new(config.tank_width, config.tank_height, GRID_CELL),
            warned_species: HashSet::new(),
        }
    }

    pub fn update(
        &mut self,
        agents: &mut Vec<FishAgent>,
        ctx: &PassContext,
        out: &mut PassTargets,
        rng: &mut impl Rng,
    ) {
        let config = ctx.config;
        let snapshot: Vec<Boid> = agents.iter().map(|a| Boid { x: a.x, y: a.y, vx: a.vx, vy: a.vy }).collect();
        self.grid.rebuild(&snapshot);

        let mut removed: HashSet<u32> = HashSet::new();
        let mut eaten_food: HashSet<u32> = HashSet::new();

        for i in 0..agents.len() {
            if removed.contains(&agents[i].id) {
                continue;
            }
            let species = match ctx.catalog.species(&agents[i].species_id) {
                Some(s) => s,
                None => {
                    if self.warned_species.insert(agents[i].species_id.clone()) {
                        log::warn!(
                            "Fish #{} has unknown species '{}', skipping it",
                            agents[i].id,
                            agents[i].species_id
                        );
                    }
                    continue;
                }
            };

            // ─── Vitals ───
            let vitals = VitalsContext {
                water: &*out.water,
                metabolism: ctx.metabolism,
                health_resistance: ctx.health_resistance,
                happiness_bonus: ctx.happiness_bonus,
            };
            agents[i].update_vitals(species, &vitals, config, ctx.dt_secs, ctx.frames);
            if agents[i].is_dead() {
                let me = &agents[i];
                let cause = if me.is_sick() { DeathCause::Sickness } else { DeathCause::PoorWater };
                log::info!("{} #{} died ({})", me.species_id, me.id, cause.as_str());
                removed.insert(me.id);
                out.events.push(SimEvent::Death { fish_id: me.id, species_id: me.species_id.clone(), cause });
                continue;
            }

            let pos = (snapshot[i].x, snapshot[i].y);
            let mut accel = (0.0_f32, 0.0_f32);
            let mut action = FishAction::Idle;

            // ─── Schooling ───
            if species.schooling_factor > 0.0 {
                let reach = species.schooling_distance;
                let mates: Vec<Boid> = self
                    .grid
                    .neighbors(pos.0, pos.1, reach)
                    .into_iter()
                    .filter(|&j| j != i && !removed.contains(&agents[j].id))
                    .filter(|&j| agents[j].species_id == species.id)
                    .filter(|&j| distance(pos, (snapshot[j].x, snapshot[j].y)) < reach)
                    .map(|j| snapshot[j])
                    .collect();
                let factor = species.schooling_factor * agents[i].personality.schooling_multiplier();
                let force = boids::schooling_force(&snapshot[i], &mates, factor, config);
                accel.0 += force.0;
                accel.1 += force.1;
            }

            // ─── Predation ───
            if species.is_predator() && agents[i].hunger < config.hunt_hunger_threshold {
                let target = self.nearest_agent(&snapshot, agents, &removed, i, config.hunt_range, |other| {
                    species.preys_on(&other.species_id)
                });
                if let Some((j, dist)) = target {
                    action = FishAction::Hunting;
                    let prey_pos = (snapshot[j].x, snapshot[j].y);
                    let pull = boids::steer_toward(pos, prey_pos, config.hunt_accel);
                    accel.0 += pull.0;
                    accel.1 += pull.1;

                    if dist < config.eat_radius {
                        let prey_id = agents[j].id;
                        let prey_species = agents[j].species_id.clone();
                        removed.insert(prey_id);
                        agents[i].hunger = 100.0;
                        out.economy.spawn_particles(ParticleKind::Bone, prey_pos.0, prey_pos.1, 3, rng);
                        out.economy.spawn_particles(ParticleKind::Sparkle, prey_pos.0, prey_pos.1, 2, rng);
                        out.stats.predations += 1;
                        log::info!("{} #{} ate {} #{}", species.id, agents[i].id, prey_species, prey_id);
                        out.events.push(SimEvent::Predation { predator_id: agents[i].id, prey_id });
                        out.events.push(SimEvent::Death {
                            fish_id: prey_id,
                            species_id: prey_species,
                            cause: DeathCause::Predation,
                        });
                    }
                }
            }

            // ─── Fleeing ───
            if action != FishAction::Hunting {
                let my_species = species.id.as_str();
                let catalog = ctx.catalog;
                let threat = self.nearest_agent(&snapshot, agents, &removed, i, config.fear_radius, |other| {
                    catalog.species(&other.species_id).is_some_and(|s| s.is_predator() && s.preys_on(my_species))
                });
                if let Some((j, _)) = threat {
                    action = FishAction::Fleeing;
                    accel = boids::steer_away(pos, (snapshot[j].x, snapshot[j].y), config.flee_accel);
                }
            }

            // ─── Food ───
            if action == FishAction::Idle && agents[i].hunger < config.food_hunger_threshold {
                let nearest = out
                    .economy
                    .food
                    .iter()
                    .filter(|f| !eaten_food.contains(&f.id))
                    .map(|f| (f.id, f.x, f.y, f.nutrition, distance(pos, (f.x, f.y))))
                    .min_by(|a, b| a.4.total_cmp(&b.4));

                if let Some((food_id, fx, fy, nutrition, dist)) = nearest {
                    action = FishAction::SeekingFood;
                    let pull = boids::steer_toward(pos, (fx, fy), config.seek_accel);
                    accel.0 += pull.0;
                    accel.1 += pull.1;

                    if dist < config.eat_radius {
                        eaten_food.insert(food_id);
                        agents[i].feed(nutrition);
                        out.water.add_ammonia(config.feeding_ammonia);
                        let value = (species.base_value * ctx.coin_multiplier).ceil();
                        out.economy.spawn_coin(pos.0, pos.1, value, config, rng);
                        out.economy.spawn_particles(ParticleKind::Bubble, pos.0, pos.1, 1, rng);
                        out.economy.spawn_particles(ParticleKind::Sparkle, pos.0, pos.1, 1, rng);
                        out.stats.fish_fed_count += 1;
                        log::debug!("{} #{} ate food #{} and dropped {}", species.id, agents[i].id, food_id, value);
                    }
                }
            }

            // ─── Idle wander ───
            if action == FishAction::Idle {
                let w = boids::wander(&self.perlin, agents[i].wander_seed, ctx.elapsed_secs, config.wander_strength);
                accel.0 += (rng.gen::<f32>() - 0.5) * config.wander_jitter + w.0;
                accel.1 += (rng.gen::<f32>() - 0.5) * config.wander_jitter + w.1;
                accel.1 += (config.tank_height / 2.0 - pos.1) * config.centering;
            }

            // ─── Personality ───
            let personality = agents[i].personality;
            accel.0 *= personality.accel_multiplier();
            accel.1 *= personality.accel_multiplier();
            if personality == Personality::Shy {
                accel.0 += (pos.0 - config.tank_width / 2.0) * config.shy_repulsion;
                accel.1 += (pos.1 - config.tank_height / 2.0) * config.shy_repulsion;
            }

            let walls = boids::wall_avoidance(pos.0, pos.1, config);
            accel.0 += walls.0;
            accel.1 += walls.1;

            // ─── Integration ───
            let me = &mut agents[i];
            me.action = action;
            let max_speed = species.speed * action.speed_multiplier(config) * personality.speed_multiplier();
            let (vx, vy) = boids::limit_speed(me.vx + accel.0 * ctx.frames, me.vy + accel.1 * ctx.frames, max_speed);
            me.vx = vx;
            me.vy = vy;
            me.x = (me.x + vx * ctx.frames).clamp(0.0, config.tank_width);
            me.y = (me.y + vy * ctx.frames).clamp(0.0, config.tank_height);
        }

        // ─── Compaction ───
        if !removed.is_empty() {
            agents.retain(|a| !removed.contains(&a.id));
        }
        if !eaten_food.is_empty() {
            out.economy.food.retain(|f| !eaten_food.contains(&f.id));
        }
    }

    /// Nearest live agent other than `me` within `radius` (tick-start positions) that passes `filter`.
    fn nearest_agent(
        &self,
        snapshot: &[Boid],
        agents: &[FishAgent],
        removed: &HashSet<u32>,
        me: usize,
        radius: f32,
        filter: impl Fn(&FishAgent) -> bool,
    ) -> Option<(usize, f32)> {
        let origin = (snapshot[me].x, snapshot[me].y);
        self.grid
            .neighbors(origin.0, origin.1, radius)
            .into_iter()
            .filter(|&j| j != me && !removed.contains(&agents[j].id))
            .map(|j| (j, distance(origin, (snapshot[j].x, snapshot[j].y))))
            .filter(|&(j, d)| d < radius && filter(&agents[j]))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

// ─── Disease ───

/// Roll for new infections after a water step. Fish only get sick once ammonia
/// passes `disease_ammonia_threshold`; hardy species and the HardyFish skill lower the odds.
pub fn roll_infections(
    agents: &mut [FishAgent],
    water: &WaterParams,
    catalog: &Catalog,
    config: &SimulationConfig,
    health_resistance: f32,
    rng: &mut impl Rng,
) -> Vec<SimEvent> {
    let mut events = Vec::new();
    if water.ammonia <= config.disease_ammonia_threshold {
        return events;
    }
    let excess = water.ammonia - config.disease_ammonia_threshold + 1.0;
    for agent in agents.iter_mut().filter(|a| !a.is_sick()) {
        let hardiness = match catalog.species(&agent.species_id) {
            Some(s) => s.preferred_water.hardiness.clamp(0.0, 1.0),
            None => continue,
        };
        let chance = config.infection_chance * excess * (1.0 - hardiness) / health_resistance.max(f32::EPSILON);
        if rng.gen::<f32>() < chance.clamp(0.0, 1.0) {
            let disease = Disease::random(rng);
            agent.disease = Some(disease);
            log::info!("{} #{} caught {}", agent.species_id, agent.id, disease.as_str());
            events.push(SimEvent::SicknessOnset { fish_id: agent.id, disease });
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::economy::Economy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    struct World {
        catalog: Catalog,
        config: SimulationConfig,
        economy: Economy,
        water: WaterParams,
        stats: GameStats,
        events: Vec<SimEvent>,
        eco: Ecosystem,
    }

    impl World {
        fn new() -> Self {
            let config = SimulationConfig::default();
            Self {
                catalog: Catalog::default(),
                eco: Ecosystem::new(&config),
                config,
                economy: Economy::new(),
                water: WaterParams::default(),
                stats: GameStats::default(),
                events: Vec::new(),
            }
        }

        fn fish(&self, id: u32, species: &str, x: f32, y: f32, rng: &mut StdRng) -> FishAgent {
            let s = self.catalog.species(species).expect("stock species");
            let mut f = FishAgent::new(id, s, s.base_genes, x, y, rng);
            f.vx = 0.0;
            f.vy = 0.0;
            f.personality = Personality::Shy;
            f
        }

        fn tick(&mut self, agents: &mut Vec<FishAgent>, rng: &mut StdRng) {
            let ctx = PassContext {
                catalog: &self.catalog,
                config: &self.config,
                dt_secs: 1.0 / 60.0,
                frames: 1.0,
                elapsed_secs: 0.0,
                metabolism: 1.0,
                health_resistance: 1.0,
                happiness_bonus: 0.0,
                coin_multiplier: 1.0,
            };
            let mut out = PassTargets {
                economy: &mut self.economy,
                water: &mut self.water,
                stats: &mut self.stats,
                events: &mut self.events,
            };
            self.eco.update(agents, &ctx, &mut out, rng);
        }
    }

    #[test]
    fn shark_eats_adjacent_goldfish() {
        let mut rng = seeded_rng();
        let mut w = World::new();
        let mut goldie = w.fish(1, "goldfish", 600.0, 400.0, &mut rng);
        goldie.hunger = 100.0;
        let mut shark = w.fish(2, "shark", 600.0, 400.0, &mut rng);
        shark.hunger = 30.0;
        let mut agents = vec![goldie, shark];

        w.tick(&mut agents, &mut rng);

        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].id, 2);
        assert_eq!(agents[0].hunger, 100.0);
        assert!(w.economy.coins.is_empty(), "predation pays nothing");
        assert!(w.economy.particles.iter().any(|p| p.kind == ParticleKind::Bone));
        assert_eq!(w.stats.predations, 1);
        assert!(w.events.contains(&SimEvent::Predation { predator_id: 2, prey_id: 1 }));
        assert!(w.events.contains(&SimEvent::Death {
            fish_id: 1,
            species_id: "goldfish".into(),
            cause: DeathCause::Predation,
        }));
    }

    #[test]
    fn sated_shark_leaves_prey_alone() {
        let mut rng = seeded_rng();
        let mut w = World::new();
        let goldie = w.fish(1, "goldfish", 600.0, 400.0, &mut rng);
        let mut shark = w.fish(2, "shark", 600.0, 400.0, &mut rng);
        shark.hunger = 90.0;
        let mut agents = vec![goldie, shark];

        w.tick(&mut agents, &mut rng);
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].action, FishAction::Fleeing);
    }

    #[test]
    fn prey_flees_from_nearby_predator() {
        let mut rng = seeded_rng();
        let mut w = World::new();
        let mut goldie = w.fish(1, "goldfish", 600.0, 400.0, &mut rng);
        goldie.hunger = 100.0;
        let mut shark = w.fish(2, "shark", 700.0, 400.0, &mut rng);
        shark.hunger = 100.0;
        let mut agents = vec![goldie, shark];

        w.tick(&mut agents, &mut rng);
        assert_eq!(agents[0].action, FishAction::Fleeing);
        assert!(agents[0].vx < 0.0, "goldfish swims away from the shark");
        assert_eq!(agents[1].action, FishAction::Idle);
    }

    #[test]
    fn hungry_fish_eats_food_and_drops_a_coin() {
        let mut rng = seeded_rng();
        let mut w = World::new();
        let mut goldie = w.fish(1, "goldfish", 600.0, 400.0, &mut rng);
        goldie.hunger = 50.0;
        let mut agents = vec![goldie];
        w.economy.drop_food(600.0, 400.0, 20.0, &w.config, &mut rng);

        w.tick(&mut agents, &mut rng);

        assert!(w.economy.food.is_empty());
        assert!((agents[0].hunger - (50.0 - w.config.hunger_decay + 20.0)).abs() < 1e-4);
        assert_eq!(w.economy.coins.len(), 1);
        assert_eq!(w.economy.coins[0].value, 10.0);
        assert!((w.water.ammonia - w.config.feeding_ammonia).abs() < 1e-6);
        assert_eq!(w.stats.fish_fed_count, 1);
    }

    #[test]
    fn full_fish_ignore_food() {
        let mut rng = seeded_rng();
        let mut w = World::new();
        let mut goldie = w.fish(1, "goldfish", 600.0, 400.0, &mut rng);
        goldie.hunger = 95.0;
        let mut agents = vec![goldie];
        w.economy.drop_food(600.0, 400.0, 20.0, &w.config, &mut rng);

        w.tick(&mut agents, &mut rng);
        assert_eq!(w.economy.food.len(), 1);
        assert_eq!(agents[0].action, FishAction::Idle);
    }

    #[test]
    fn one_pellet_feeds_one_fish() {
        let mut rng = seeded_rng();
        let mut w = World::new();
        let mut a = w.fish(1, "goldfish", 600.0, 400.0, &mut rng);
        let mut b = w.fish(2, "goldfish", 605.0, 400.0, &mut rng);
        a.hunger = 40.0;
        b.hunger = 40.0;
        let mut agents = vec![a, b];
        w.economy.drop_food(602.0, 400.0, 20.0, &w.config, &mut rng);

        w.tick(&mut agents, &mut rng);
        assert_eq!(w.stats.fish_fed_count, 1);
        assert_eq!(w.economy.coins.len(), 1);
    }

    #[test]
    fn dying_fish_are_removed_with_cause() {
        let mut rng = seeded_rng();
        let mut w = World::new();
        let mut sick = w.fish(1, "guppy", 300.0, 300.0, &mut rng);
        sick.health = 0.001;
        sick.disease = Some(Disease::Parasite);
        let healthy = w.fish(2, "guppy", 900.0, 300.0, &mut rng);
        let mut agents = vec![sick, healthy];

        w.tick(&mut agents, &mut rng);
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].id, 2);
        assert!(w.events.iter().any(|e| matches!(
            e,
            SimEvent::Death { fish_id: 1, cause: DeathCause::Sickness, .. }
        )));
    }

    #[test]
    fn unknown_species_is_skipped() {
        let mut rng = seeded_rng();
        let mut w = World::new();
        let mut ghost = w.fish(1, "goldfish", 300.0, 300.0, &mut rng);
        ghost.species_id = "coelacanth".into();
        ghost.vx = 1.0;
        let mut agents = vec![ghost];

        w.tick(&mut agents, &mut rng);
        w.tick(&mut agents, &mut rng);
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].x, 300.0);
    }

    #[test]
    fn agents_stay_inside_tank() {
        let mut rng = seeded_rng();
        let mut w = World::new();
        let mut agents: Vec<FishAgent> = (0..20)
            .map(|i| {
                let species = if i % 5 == 0 { "shark" } else { "guppy" };
                let mut f = w.fish(i, species, (i as f32 * 61.0) % 1200.0, (i as f32 * 37.0) % 800.0, &mut rng);
                f.personality = Personality::random(&mut rng);
                f.vx = 5.0;
                f.vy = -5.0;
                f
            })
            .collect();

        for _ in 0..600 {
            w.tick(&mut agents, &mut rng);
            for a in &agents {
                assert!((0.0..=w.config.tank_width).contains(&a.x));
                assert!((0.0..=w.config.tank_height).contains(&a.y));
                assert!((0.0..=100.0).contains(&a.health));
                assert!((0.0..=100.0).contains(&a.hunger));
            }
        }
    }

    #[test]
    fn dirty_water_spreads_disease() {
        let mut rng = seeded_rng();
        let w = World::new();
        let mut agents: Vec<FishAgent> = (0..50).map(|i| w.fish(i, "tropical", 100.0, 100.0, &mut rng)).collect();

        let clean = WaterParams { ammonia: 1.0, ..WaterParams::default() };
        let events = roll_infections(&mut agents, &clean, &w.catalog, &w.config, 1.0, &mut rng);
        assert!(events.is_empty());

        let toxic = WaterParams { ammonia: 10.0, ..WaterParams::default() };
        let mut infected = 0;
        for _ in 0..20 {
            infected += roll_infections(&mut agents, &toxic, &w.catalog, &w.config, 1.0, &mut rng).len();
        }
        assert!(infected > 0);
        assert_eq!(infected, agents.iter().filter(|a| a.is_sick()).count());
    }
}
