pub mod achievements;
pub mod boids;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod decorations;
pub mod economy;
pub mod ecosystem;
pub mod error;
pub mod events;
pub mod fish;
pub mod genome;
pub mod persistence;
pub mod progression;
pub mod quests;
pub mod water;

use achievements::{check_achievements, default_achievements, Achievement, GameStats};
use catalog::Catalog;
use clock::{DayPhase, SimClock};
use config::SimulationConfig;
use decorations::{combined_effects, grow_plants, DecorationInstance};
use economy::{Economy, ParticleKind};
use ecosystem::{roll_infections, Ecosystem, PassContext, PassTargets};
use error::ActionError;
use events::SimEvent;
use fish::FishAgent;
use progression::{Multipliers, Progression, SkillId, UpgradeId};
use quests::QuestBoard;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use water::{WaterInputs, WaterParams};

/// Frame payload published after every tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameUpdate {
    pub tick: u64,
    pub fish: Vec<FishState>,
    pub food: Vec<FoodState>,
    pub coins: Vec<CoinState>,
    pub particles: Vec<ParticleState>,
    pub decorations: Vec<DecorationState>,
    pub events: Vec<SimEvent>,
    pub money: f64,
    pub gems: u32,
    pub time_of_day: f32,
    pub phase: DayPhase,
    /// Present only when the debounce interval elapsed or the tank was cleaned
    pub water: Option<WaterParams>,
    pub population: u32,
    pub capacity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FishState {
    pub id: u32,
    pub species_id: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub scale: f32,
    pub hunger: f32,
    pub health: f32,
    pub action: String,
    pub personality: String,
    pub disease: Option<String>,
    pub generation: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodState {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinState {
    pub x: f32,
    pub y: f32,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleState {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub life: f32,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecorationState {
    pub id: u32,
    pub item_id: String,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub growth: f32,
}

/// What a tap on the glass did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClickOutcome {
    Collected(f64),
    Sold { fish_id: u32, payout: f64 },
    Fed { food_id: u32 },
    Nothing,
}

/// Everything that survives a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankSnapshot {
    pub money: f64,
    pub gems: u32,
    pub progression: Progression,
    pub agents: Vec<FishAgent>,
    pub economy: Economy,
    pub decorations: Vec<DecorationInstance>,
    pub water: WaterParams,
    pub clock: SimClock,
    pub stats: GameStats,
    pub achievements: Vec<Achievement>,
    pub quests: QuestBoard,
    pub inventory: HashMap<String, u32>,
    pub biome_id: String,
    pub tick: u64,
    pub next_fish_id: u32,
    pub next_decoration_id: u32,
    pub prestige_baseline: f64,
}

/// The whole tank: fish, water, economy and the player's wallet.
pub struct Tank {
    pub config: SimulationConfig,
    pub catalog: Catalog,
    pub money: f64,
    pub gems: u32,
    pub progression: Progression,
    pub agents: Vec<FishAgent>,
    pub economy: Economy,
    pub decorations: Vec<DecorationInstance>,
    pub water: WaterParams,
    pub clock: SimClock,
    pub stats: GameStats,
    pub achievements: Vec<Achievement>,
    pub quests: QuestBoard,
    pub inventory: HashMap<String, u32>,
    pub biome_id: String,
    pub sell_mode: bool,
    pub tick: u64,
    next_fish_id: u32,
    next_decoration_id: u32,
    prestige_baseline: f64,
    force_water_publish: bool,
    ecosystem: Ecosystem,
    rng: StdRng,
    pending_events: Vec<SimEvent>,
}

impl Tank {
    pub fn new(config: SimulationConfig, catalog: Catalog) -> Self {
        Self::build(config, catalog, StdRng::from_entropy())
    }

    pub fn with_seed(config: SimulationConfig, catalog: Catalog, seed: u64) -> Self {
        Self::build(config, catalog, StdRng::seed_from_u64(seed))
    }

    fn build(config: SimulationConfig, catalog: Catalog, rng: StdRng) -> Self {
        let mut tank = Self {
            money: config.starting_money,
            gems: 0,
            progression: Progression::default(),
            agents: Vec::new(),
            economy: Economy::new(),
            decorations: Vec::new(),
            water: WaterParams::default(),
            clock: SimClock::new(&config),
            stats: GameStats::default(),
            achievements: default_achievements(),
            quests: QuestBoard::new(),
            inventory: HashMap::new(),
            biome_id: catalog.default_biome.clone(),
            sell_mode: false,
            tick: 0,
            next_fish_id: 1,
            next_decoration_id: 1,
            prestige_baseline: 0.0,
            force_water_publish: true,
            ecosystem: Ecosystem::new(&config),
            rng,
            pending_events: Vec::new(),
            config,
            catalog,
        };
        tank.seed_starting_fish();
        tank.refresh_quests();
        tank
    }

    pub fn from_snapshot(snapshot: TankSnapshot, config: SimulationConfig, catalog: Catalog) -> Self {
        let biome_id = if catalog.biome(&snapshot.biome_id).is_some() {
            snapshot.biome_id
        } else {
            log::warn!("Saved biome '{}' no longer exists, using default", snapshot.biome_id);
            catalog.default_biome.clone()
        };
        Self {
            money: snapshot.money,
            gems: snapshot.gems,
            progression: snapshot.progression,
            agents: snapshot.agents,
            economy: snapshot.economy,
            decorations: snapshot.decorations,
            water: snapshot.water,
            clock: snapshot.clock,
            stats: snapshot.stats,
            achievements: snapshot.achievements,
            quests: snapshot.quests,
            inventory: snapshot.inventory,
            biome_id,
            sell_mode: false,
            tick: snapshot.tick,
            next_fish_id: snapshot.next_fish_id,
            next_decoration_id: snapshot.next_decoration_id,
            prestige_baseline: snapshot.prestige_baseline,
            force_water_publish: true,
            ecosystem: Ecosystem::new(&config),
            rng: StdRng::from_entropy(),
            pending_events: Vec::new(),
            config,
            catalog,
        }
    }

    pub fn snapshot(&self) -> TankSnapshot {
        TankSnapshot {
            money: self.money,
            gems: self.gems,
            progression: self.progression.clone(),
            agents: self.agents.clone(),
            economy: self.economy.clone(),
            decorations: self.decorations.clone(),
            water: self.water,
            clock: self.clock.clone(),
            stats: self.stats,
            achievements: self.achievements.clone(),
            quests: self.quests.clone(),
            inventory: self.inventory.clone(),
            biome_id: self.biome_id.clone(),
            tick: self.tick,
            next_fish_id: self.next_fish_id,
            next_decoration_id: self.next_decoration_id,
            prestige_baseline: self.prestige_baseline,
        }
    }

    pub fn multipliers(&self) -> Multipliers {
        self.progression.multipliers(self.config.prestige_coin_bonus)
    }

    pub fn capacity(&self) -> usize {
        self.multipliers().capacity
    }

    pub fn fish(&self, id: u32) -> Option<&FishAgent> {
        self.agents.iter().find(|f| f.id == id)
    }

    fn alloc_fish_id(&mut self) -> u32 {
        let id = self.next_fish_id;
        self.next_fish_id = self.next_fish_id.wrapping_add(1);
        id
    }

    fn discounted(&self, cost: f64) -> f64 {
        (cost * self.progression.shop_discount()).floor()
    }

    fn spend(&mut self, cost: f64) -> Result<(), ActionError> {
        if self.money < cost {
            return Err(ActionError::InsufficientFunds { needed: cost, available: self.money });
        }
        self.money -= cost;
        Ok(())
    }

    fn credit_coins(&mut self, values: &[f64]) -> f64 {
        let prestige = self.multipliers().prestige;
        let total: f64 = values.iter().map(|v| v * prestige).sum();
        self.money += total;
        self.stats.total_coins_earned += total;
        total
    }

    fn random_position(&mut self) -> (f32, f32) {
        let pad = self.config.wall_padding;
        let x = self.rng.gen_range(pad..self.config.tank_width - pad);
        let y = self.rng.gen_range(pad..self.config.tank_height - pad);
        (x, y)
    }

    fn seed_starting_fish(&mut self) {
        let species = match self.catalog.species(&self.config.starting_species) {
            Some(s) => s.clone(),
            None => {
                log::warn!("Starting species '{}' is not in the catalog", self.config.starting_species);
                return;
            }
        };
        for _ in 0..self.config.starting_fish {
            let (x, y) = self.random_position();
            let genes = genome::random_genes(&species, &mut self.rng);
            let id = self.alloc_fish_id();
            let agent = FishAgent::new(id, &species, genes, x, y, &mut self.rng);
            self.agents.push(agent);
        }
    }

    // ─── Commands ───

    pub fn buy_fish(&mut self, species_id: &str) -> Result<u32, ActionError> {
        let species = self
            .catalog
            .species(species_id)
            .cloned()
            .ok_or_else(|| ActionError::UnknownSpecies(species_id.to_string()))?;
        let capacity = self.capacity();
        if self.agents.len() >= capacity {
            return Err(ActionError::TankFull { capacity });
        }
        let cost = self.discounted(species.cost);
        self.spend(cost)?;

        let (x, y) = self.random_position();
        let genes = genome::random_genes(&species, &mut self.rng);
        let id = self.alloc_fish_id();
        let agent = FishAgent::new(id, &species, genes, x, y, &mut self.rng);
        self.agents.push(agent);

        log::info!("Bought {} #{} for {}", species.id, id, cost);
        self.pending_events.push(SimEvent::FishBought { fish_id: id, species_id: species.id, cost });
        Ok(id)
    }

    pub fn sell_fish(&mut self, fish_id: u32) -> Result<f64, ActionError> {
        let idx = self
            .agents
            .iter()
            .position(|f| f.id == fish_id)
            .ok_or(ActionError::UnknownFish(fish_id))?;
        let fish = self.agents.remove(idx);
        let payout = match self.catalog.species(&fish.species_id) {
            Some(species) => (species.cost * self.config.sell_fraction).floor(),
            None => {
                log::warn!("Selling #{} of unknown species '{}' for nothing", fish.id, fish.species_id);
                0.0
            }
        };
        self.money += payout;
        self.stats.fish_sold += 1;
        log::info!("Sold {} #{} for {}", fish.species_id, fish.id, payout);
        self.pending_events.push(SimEvent::FishSold { fish_id, species_id: fish.species_id, payout });
        Ok(payout)
    }

    pub fn breed_fish(&mut self, parent_a: u32, parent_b: u32) -> Result<u32, ActionError> {
        if parent_a == parent_b {
            return Err(ActionError::SameFish);
        }
        let a = self.fish(parent_a).cloned().ok_or(ActionError::UnknownFish(parent_a))?;
        let b = self.fish(parent_b).cloned().ok_or(ActionError::UnknownFish(parent_b))?;
        if a.species_id != b.species_id {
            return Err(ActionError::IncompatibleSpecies(a.species_id.clone(), b.species_id.clone()));
        }
        let species = self
            .catalog
            .species(&a.species_id)
            .cloned()
            .ok_or_else(|| ActionError::UnknownSpecies(a.species_id.clone()))?;

        let capacity = self.capacity();
        if self.agents.len() >= capacity {
            return Err(ActionError::TankFull { capacity });
        }

        let now = self.clock.elapsed_ms;
        let cooldown = (self.config.breed_cooldown_ms as f64 * self.multipliers().breed_cooldown) as u64;
        for parent in [&a, &b] {
            let remaining_ms = parent.remaining_cooldown(now, cooldown);
            if remaining_ms > 0 {
                return Err(ActionError::OnCooldown { fish_id: parent.id, remaining_ms });
            }
        }

        let fee = self.config.breed_fee;
        self.spend(fee)?;

        let genes = genome::offspring_genes(&a.genes, &b.genes, &mut self.rng);
        let generation = a.generation.max(b.generation) + 1;
        let (ax, ay) = (a.x, a.y);

        let spread = self.config.breed_spawn_spread;
        let x = (ax + self.rng.gen_range(-spread..=spread)).clamp(0.0, self.config.tank_width);
        let y = (ay + self.rng.gen_range(-spread..=spread)).clamp(0.0, self.config.tank_height);
        let child_id = self.alloc_fish_id();
        let mut child = FishAgent::new(child_id, &species, genes, x, y, &mut self.rng);
        child.generation = generation;
        child.parents = Some((parent_a, parent_b));
        self.agents.push(child);

        for f in self.agents.iter_mut().filter(|f| f.id == parent_a || f.id == parent_b) {
            f.last_breed_ms = Some(now);
        }
        self.stats.fish_bred += 1;
        log::info!("#{} and #{} bred #{} (generation {})", parent_a, parent_b, child_id, generation);
        self.pending_events.push(SimEvent::Bred { child_id, parent_a, parent_b, generation });
        Ok(child_id)
    }

    pub fn drop_food_at(&mut self, x: f32, y: f32) -> u32 {
        let nutrition = self.config.base_food_nutrition * self.multipliers().nutrition;
        self.economy.drop_food(x, y, nutrition, &self.config, &mut self.rng)
    }

    /// Collect coins near the point. Returns coins credited after the prestige bonus.
    pub fn collect_at(&mut self, x: f32, y: f32) -> f64 {
        let values = self.economy.collect_at(x, y, self.config.collect_radius, &mut self.rng);
        self.credit_coins(&values)
    }

    pub fn click_at(&mut self, x: f32, y: f32) -> ClickOutcome {
        self.stats.clicks += 1;

        let collected = self.collect_at(x, y);
        if collected > 0.0 {
            return ClickOutcome::Collected(collected);
        }

        if self.sell_mode {
            let radius = self.config.collect_radius;
            let target = self
                .agents
                .iter()
                .map(|f| (f.id, (f.x - x).hypot(f.y - y)))
                .filter(|&(_, d)| d < radius)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((fish_id, _)) = target {
                if let Ok(payout) = self.sell_fish(fish_id) {
                    return ClickOutcome::Sold { fish_id, payout };
                }
            }
            return ClickOutcome::Nothing;
        }

        let food_id = self.drop_food_at(x, y);
        let radius = self.config.startle_radius;
        let impulse = self.config.startle_impulse;
        let mut startled = Vec::new();
        for f in &mut self.agents {
            let dx = f.x - x;
            let dy = f.y - y;
            if (dx * dx + dy * dy).sqrt() < radius {
                f.vx += dx * impulse;
                f.vy += dy * impulse;
                startled.push((f.x, f.y));
            }
        }
        for (fx, fy) in startled {
            self.economy.spawn_particles(ParticleKind::Bubble, fx, fy, 1, &mut self.rng);
        }
        ClickOutcome::Fed { food_id }
    }

    pub fn buy_medicine(&mut self, medicine_id: &str) -> Result<u32, ActionError> {
        let cost = match self.catalog.medicine(medicine_id) {
            Some(m) => self.discounted(m.cost),
            None => return Err(ActionError::UnknownItem(medicine_id.to_string())),
        };
        self.spend(cost)?;
        let count = self.inventory.entry(medicine_id.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    pub fn treat_disease(&mut self, fish_id: u32, medicine_id: &str) -> Result<(), ActionError> {
        let fish = self.fish(fish_id).ok_or(ActionError::UnknownFish(fish_id))?;
        let disease = fish.disease.ok_or(ActionError::NotSick(fish_id))?;
        let medicine = self
            .catalog
            .medicine(medicine_id)
            .ok_or_else(|| ActionError::UnknownItem(medicine_id.to_string()))?;
        if self.inventory.get(medicine_id).copied().unwrap_or(0) == 0 {
            return Err(ActionError::OutOfStock(medicine.name.clone()));
        }
        if !medicine.cures(disease) {
            return Err(ActionError::IneffectiveMedicine { medicine: medicine.name.clone(), disease: disease.as_str() });
        }
        let medicine_name = medicine.name.clone();

        if let Some(count) = self.inventory.get_mut(medicine_id) {
            *count -= 1;
        }
        if let Some(f) = self.agents.iter_mut().find(|f| f.id == fish_id) {
            f.disease = None;
        }
        log::info!("Cured #{} of {} with {}", fish_id, disease.as_str(), medicine_name);
        self.pending_events.push(SimEvent::Cured { fish_id, disease, medicine: medicine_name });
        Ok(())
    }

    pub fn clean_tank(&mut self) {
        self.water.clean();
        self.stats.tanks_cleaned += 1;
        self.force_water_publish = true;
        self.pending_events.push(SimEvent::TankCleaned);
    }

    pub fn buy_upgrade(&mut self, id: UpgradeId) -> Result<u32, ActionError> {
        let cost = self.progression.upgrade_cost(id).ok_or(ActionError::MaxLevel(id.as_str()))?;
        self.spend(cost)?;
        let level = self.progression.upgrades.entry(id).or_insert(0);
        *level += 1;
        log::info!("Upgraded {} to level {}", id.as_str(), level);
        Ok(*level)
    }

    pub fn buy_skill(&mut self, id: SkillId) -> Result<u32, ActionError> {
        let cost = self.progression.skill_cost(id).ok_or(ActionError::MaxLevel(id.as_str()))?;
        if self.gems < cost {
            return Err(ActionError::InsufficientGems { needed: cost, available: self.gems });
        }
        self.gems -= cost;
        let level = self.progression.skills.entry(id).or_insert(0);
        *level += 1;
        log::info!("Learned {} level {}", id.as_str(), level);
        Ok(*level)
    }

    pub fn place_decoration(&mut self, item_id: &str, x: f32, y: f32) -> Result<u32, ActionError> {
        let cost = match self.catalog.decoration(item_id) {
            Some(item) => self.discounted(item.cost),
            None => return Err(ActionError::UnknownItem(item_id.to_string())),
        };
        self.spend(cost)?;
        let id = self.next_decoration_id;
        self.next_decoration_id += 1;
        self.decorations.push(DecorationInstance {
            id,
            item_id: item_id.to_string(),
            x: x.clamp(0.0, self.config.tank_width),
            y: y.clamp(0.0, self.config.tank_height),
            scale: self.rng.gen_range(0.8..1.2),
            growth: 0.0,
        });
        Ok(id)
    }

    pub fn remove_decoration(&mut self, decoration_id: u32) -> Result<(), ActionError> {
        let idx = self
            .decorations
            .iter()
            .position(|d| d.id == decoration_id)
            .ok_or_else(|| ActionError::UnknownItem(format!("decoration #{decoration_id}")))?;
        self.decorations.remove(idx);
        Ok(())
    }

    pub fn set_biome(&mut self, biome_id: &str) -> Result<(), ActionError> {
        if self.catalog.biome(biome_id).is_none() {
            return Err(ActionError::UnknownItem(biome_id.to_string()));
        }
        self.biome_id = biome_id.to_string();
        Ok(())
    }

    pub fn set_sell_mode(&mut self, enabled: bool) {
        self.sell_mode = enabled;
    }

    pub fn refresh_quests(&mut self) {
        let mut species_ids: Vec<String> = self.catalog.species.keys().cloned().collect();
        species_ids.sort();
        self.quests.refresh(&self.stats, &species_ids, &mut self.rng);
    }

    /// Start over with a permanent coin bonus. Gems and skills are kept.
    pub fn prestige(&mut self) -> u32 {
        let earned = (self.stats.total_coins_earned - self.prestige_baseline).max(0.0);
        let gems_awarded = (earned / self.config.prestige_gem_divisor).floor() as u32;

        self.gems += gems_awarded;
        self.prestige_baseline = self.stats.total_coins_earned;
        self.progression.reset_for_prestige();
        self.money = self.config.starting_money;
        self.agents.clear();
        self.economy = Economy::new();
        self.decorations.clear();
        self.water = WaterParams::default();
        self.force_water_publish = true;
        self.seed_starting_fish();

        let level = self.progression.prestige;
        log::info!("Prestige {} reached, awarded {} gems", level, gems_awarded);
        self.pending_events.push(SimEvent::Prestiged { level, gems_awarded });
        gems_awarded
    }

    // ─── Tick ───

    pub fn step(&mut self, dt_secs: f32) -> FrameUpdate {
        let dt = if dt_secs.is_finite() { dt_secs.clamp(0.0, self.config.max_frame_delta_secs) } else { 0.0 };
        let frames = dt * self.config.reference_fps;
        self.tick += 1;

        let mult = self.multipliers();
        let decor = combined_effects(&self.decorations, &self.catalog);

        // Clock, water chemistry and timers
        let ticks = self.clock.advance(dt, mult.auto_feed_interval, &self.config);
        for _ in 0..ticks.water_steps {
            let inputs = WaterInputs {
                fish_count: self.agents.len(),
                decoration_mitigation: decor.ammonia_reduction,
                upgrade_mitigation: mult.filter_reduction,
                heater_resistance: mult.heater_resistance,
                target_temperature: self.clock.target_temperature(&self.config),
                daytime: self.clock.is_daytime(),
            };
            self.water = self.water.advanced(self.config.water_update_interval_secs, &inputs, &self.config);
            let sick = roll_infections(
                &mut self.agents,
                &self.water,
                &self.catalog,
                &self.config,
                mult.health_resistance,
                &mut self.rng,
            );
            self.pending_events.extend(sick);
        }
        for _ in 0..ticks.auto_feeds {
            let x = self.rng.gen_range(0.0..self.config.tank_width);
            self.drop_food_at(x, self.config.food_drop_height);
        }
        if self.clock.is_daytime() {
            let growth = self.config.plant_growth_per_sec * mult.plant_growth * dt;
            grow_plants(&mut self.decorations, &self.catalog, growth);
        }

        // Agent pass
        let ctx = PassContext {
            catalog: &self.catalog,
            config: &self.config,
            dt_secs: dt,
            frames,
            elapsed_secs: self.clock.elapsed_secs(),
            metabolism: mult.metabolism,
            health_resistance: mult.health_resistance,
            happiness_bonus: decor.happiness,
            coin_multiplier: mult.coin_value * decor.coin_multiplier,
        };
        let mut out = PassTargets {
            economy: &mut self.economy,
            water: &mut self.water,
            stats: &mut self.stats,
            events: &mut self.pending_events,
        };
        self.ecosystem.update(&mut self.agents, &ctx, &mut out, &mut self.rng);

        // Economy entities
        let ambient = self.catalog.biome(&self.biome_id).map_or(ParticleKind::Bubble, |b| b.ambient);
        let auto_collected = self.economy.advance(
            dt,
            frames,
            self.clock.elapsed_secs(),
            mult.magnet_level,
            ambient,
            &self.config,
            &mut self.rng,
        );
        if !auto_collected.is_empty() {
            self.credit_coins(&auto_collected);
        }

        self.evaluate_goals();

        let publish = ticks.publish_water || self.force_water_publish;
        self.force_water_publish = false;
        let events = std::mem::take(&mut self.pending_events);
        self.build_frame(events, publish)
    }

    fn evaluate_goals(&mut self) {
        let now = self.clock.elapsed_ms;
        for a in check_achievements(&mut self.achievements, &self.stats, now) {
            self.gems += a.reward_gems;
            log::info!("Achievement unlocked: {}", a.name);
            self.pending_events.push(SimEvent::AchievementUnlocked {
                id: a.id,
                name: a.name,
                reward_gems: a.reward_gems,
            });
        }

        let agents = &self.agents;
        let completed = self
            .quests
            .check(&self.stats, |species_id| agents.iter().filter(|f| f.species_id == species_id).count());
        if completed.is_empty() {
            return;
        }
        for q in completed {
            self.gems += q.reward_gems;
            log::info!("Quest complete: {}", q.description);
            self.pending_events.push(SimEvent::QuestCompleted {
                id: q.id,
                description: q.description,
                reward_gems: q.reward_gems,
            });
        }
        let mut species_ids: Vec<String> = self.catalog.species.keys().cloned().collect();
        species_ids.sort();
        self.quests.top_up(&self.stats, &species_ids, &mut self.rng);
    }

    pub fn build_frame(&self, events: Vec<SimEvent>, publish_water: bool) -> FrameUpdate {
        FrameUpdate {
            tick: self.tick,
            fish: self
                .agents
                .iter()
                .map(|f| FishState {
                    id: f.id,
                    species_id: f.species_id.clone(),
                    x: f.x,
                    y: f.y,
                    vx: f.vx,
                    vy: f.vy,
                    scale: f.scale,
                    hunger: f.hunger,
                    health: f.health,
                    action: f.action.as_str().to_string(),
                    personality: f.personality.as_str().to_string(),
                    disease: f.disease.map(|d| d.as_str().to_string()),
                    generation: f.generation,
                })
                .collect(),
            food: self.economy.food.iter().map(|f| FoodState { x: f.x, y: f.y }).collect(),
            coins: self.economy.coins.iter().map(|c| CoinState { x: c.x, y: c.y, value: c.value }).collect(),
            particles: self
                .economy
                .particles
                .iter()
                .map(|p| ParticleState { x: p.x, y: p.y, size: p.size, life: p.life, kind: p.kind.as_str().to_string() })
                .collect(),
            decorations: self
                .decorations
                .iter()
                .map(|d| DecorationState {
                    id: d.id,
                    item_id: d.item_id.clone(),
                    x: d.x,
                    y: d.y,
                    scale: d.scale,
                    growth: d.growth,
                })
                .collect(),
            events,
            money: self.money,
            gems: self.gems,
            time_of_day: self.clock.time_of_day,
            phase: self.clock.phase(),
            water: publish_water.then_some(self.water),
            population: self.agents.len() as u32,
            capacity: self.capacity() as u32,
        }
    }
}
