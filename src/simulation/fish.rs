use crate::simulation::catalog::FishSpecies;
use crate::simulation::config::SimulationConfig;
use crate::simulation::genome::FishGenes;
use crate::simulation::water::WaterParams;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// What a fish is doing this tick. Recomputed every tick by the agent pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FishAction {
    Idle,
    SeekingFood,
    Fleeing,
    Hunting,
}

impl FishAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SeekingFood => "seeking_food",
            Self::Fleeing => "fleeing",
            Self::Hunting => "hunting",
        }
    }

    pub fn speed_multiplier(&self, config: &SimulationConfig) -> f32 {
        match self {
            Self::Idle => 1.0,
            Self::SeekingFood => config.seeking_speed_mult,
            Self::Hunting => config.hunting_speed_mult,
            Self::Fleeing => config.fleeing_speed_mult,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Personality {
    Relaxed,
    Hyper,
    Shy,
    Social,
    Aggressive,
}

impl Personality {
    pub const ALL: [Personality; 5] = [
        Personality::Relaxed,
        Personality::Hyper,
        Personality::Shy,
        Personality::Social,
        Personality::Aggressive,
    ];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relaxed => "relaxed",
            Self::Hyper => "hyper",
            Self::Shy => "shy",
            Self::Social => "social",
            Self::Aggressive => "aggressive",
        }
    }

    pub fn accel_multiplier(&self) -> f32 {
        match self {
            Self::Relaxed => 0.8,
            Self::Hyper => 1.5,
            Self::Aggressive => 1.2,
            Self::Shy | Self::Social => 1.0,
        }
    }

    pub fn speed_multiplier(&self) -> f32 {
        match self {
            Self::Relaxed => 0.8,
            Self::Hyper => 1.3,
            Self::Aggressive => 1.1,
            Self::Shy | Self::Social => 1.0,
        }
    }

    pub fn schooling_multiplier(&self) -> f32 {
        match self {
            Self::Social => 1.5,
            _ => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disease {
    Ich,
    Fungus,
    Parasite,
}

impl Disease {
    pub const ALL: [Disease; 3] = [Disease::Ich, Disease::Fungus, Disease::Parasite];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ich => "ich",
            Self::Fungus => "fungus",
            Self::Parasite => "parasite",
        }
    }

    /// Health lost per frame while infected.
    pub fn health_drain(&self) -> f32 {
        match self {
            Self::Ich => 0.02,
            Self::Fungus => 0.015,
            Self::Parasite => 0.025,
        }
    }
}

/// Tank-wide modifiers that feed into every fish's vitals.
#[derive(Debug, Clone, Copy)]
pub struct VitalsContext<'a> {
    pub water: &'a WaterParams,
    pub metabolism: f32,
    pub health_resistance: f32,
    pub happiness_bonus: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FishAgent {
    pub id: u32,
    pub species_id: String,
    pub generation: u32,
    pub parents: Option<(u32, u32)>,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub scale: f32,
    pub age_secs: f32,
    pub hunger: f32,
    pub health: f32,
    pub disease: Option<Disease>,
    /// Simulated clock time of the last successful breeding
    pub last_breed_ms: Option<u64>,
    pub action: FishAction,
    pub personality: Personality,
    pub genes: FishGenes,
    pub wander_seed: f32,
}

impl FishAgent {
    pub fn new(id: u32, species: &FishSpecies, genes: FishGenes, x: f32, y: f32, rng: &mut impl Rng) -> Self {
        Self {
            id,
            species_id: species.id.clone(),
            generation: 0,
            parents: None,
            x,
            y,
            vx: (rng.gen::<f32>() - 0.5) * species.speed,
            vy: (rng.gen::<f32>() - 0.5) * species.speed,
            scale: genes.size * 0.6,
            age_secs: 0.0,
            hunger: rng.gen_range(50.0..100.0),
            health: 100.0,
            disease: None,
            last_breed_ms: None,
            action: FishAction::Idle,
            personality: Personality::random(rng),
            genes,
            wander_seed: rng.gen::<f32>() * 1000.0,
        }
    }

    pub fn is_sick(&self) -> bool {
        self.disease.is_some()
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Health change per frame before frame scaling.
    pub fn health_delta(&self, species: &FishSpecies, ctx: &VitalsContext, config: &SimulationConfig) -> f32 {
        let pref = &species.preferred_water;
        let tolerance = 1.0 - pref.hardiness.clamp(0.0, 1.0) / 2.0;

        let mut delta = config.health_regen + ctx.happiness_bonus;
        if !pref.temp_ok(ctx.water.temperature) {
            delta -= config.temperature_penalty * tolerance;
        }
        if !pref.ph_ok(ctx.water.ph) {
            delta -= config.ph_penalty * tolerance;
        }
        if ctx.water.ammonia > config.ammonia_safe {
            delta -= (ctx.water.ammonia - config.ammonia_safe) * config.ammonia_penalty;
        }
        if let Some(disease) = self.disease {
            delta -= disease.health_drain();
        }

        if delta < 0.0 {
            delta / ctx.health_resistance.max(f32::EPSILON)
        } else {
            delta
        }
    }

    /// Advance health, hunger, age and growth by one frame of `frames` reference frames.
    pub fn update_vitals(
        &mut self,
        species: &FishSpecies,
        ctx: &VitalsContext,
        config: &SimulationConfig,
        dt_secs: f32,
        frames: f32,
    ) {
        let delta = self.health_delta(species, ctx, config);
        self.health = (self.health + delta * frames).clamp(0.0, 100.0);
        self.hunger = (self.hunger - config.hunger_decay * ctx.metabolism * frames).clamp(0.0, 100.0);

        self.age_secs += dt_secs;
        let maturity = (self.age_secs / config.grow_secs).min(1.0);
        self.scale = self.genes.size * (0.6 + 0.4 * maturity);
    }

    pub fn feed(&mut self, nutrition: f32) {
        self.hunger = (self.hunger + nutrition).clamp(0.0, 100.0);
    }

    pub fn remaining_cooldown(&self, now_ms: u64, cooldown_ms: u64) -> u64 {
        self.last_breed_ms
            .map(|t| (t + cooldown_ms).saturating_sub(now_ms))
            .unwrap_or(0)
    }
}
