use crate::simulation::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Every tunable constant of the tank simulation.
///
/// Rates marked "per frame" are expressed at `reference_fps` and scaled by the
/// measured frame delta, so the tank behaves the same at 30Hz and 144Hz.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // Frame pacing
    pub reference_fps: f32,
    pub max_frame_delta_secs: f32,

    // Tank
    pub tank_width: f32,
    pub tank_height: f32,
    pub starting_money: f64,
    pub starting_species: String,
    pub starting_fish: u32,

    // Vitals (per frame)
    pub hunger_decay: f32,
    pub health_regen: f32,
    pub temperature_penalty: f32,
    pub ph_penalty: f32,
    pub ammonia_safe: f32,
    pub ammonia_penalty: f32,
    pub grow_secs: f32,

    // Steering (per frame)
    pub eat_radius: f32,
    pub seek_accel: f32,
    pub hunt_accel: f32,
    pub flee_accel: f32,
    pub wander_jitter: f32,
    pub wander_strength: f32,
    pub centering: f32,
    pub shy_repulsion: f32,
    pub wall_padding: f32,
    pub wall_push: f32,
    pub separation_radius: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub food_hunger_threshold: f32,
    pub hunt_hunger_threshold: f32,
    pub hunt_range: f32,
    pub fear_radius: f32,
    pub seeking_speed_mult: f32,
    pub hunting_speed_mult: f32,
    pub fleeing_speed_mult: f32,
    pub startle_radius: f32,
    pub startle_impulse: f32,

    // Water
    pub water_update_interval_secs: f32,
    pub water_publish_interval_secs: f32,
    pub ammonia_per_fish: f32,
    pub feeding_ammonia: f32,
    pub algae_threshold: f32,
    pub algae_growth: f32,
    pub temperature_drift: f32,
    pub day_temperature: f32,
    pub night_temperature: f32,
    pub neutral_ph: f32,
    pub ph_ammonia_shift: f32,
    pub ph_drift: f32,

    // Disease
    pub disease_ammonia_threshold: f32,
    pub infection_chance: f32,

    // Clock
    pub day_length_secs: f32,
    pub start_hour: f32,
    pub plant_growth_per_sec: f32,

    // Economy (per frame unless noted)
    pub base_food_nutrition: f32,
    pub food_sink_speed: f32,
    pub food_wobble: f32,
    pub food_drop_height: f32,
    pub gravity: f32,
    pub water_drag: f32,
    pub coin_pop_speed: f32,
    pub coin_drift: f32,
    pub coin_floor_margin: f32,
    pub coin_lifetime_secs: f32,
    pub magnet_pull: f32,
    pub collect_radius: f32,
    pub particle_fade: f32,
    pub ambient_particle_chance: f32,

    // Breeding & trade
    pub breed_cooldown_ms: u64,
    pub breed_fee: f64,
    pub breed_spawn_spread: f32,
    pub sell_fraction: f64,
    pub prestige_coin_bonus: f64,
    pub prestige_gem_divisor: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            reference_fps: 60.0,
            max_frame_delta_secs: 0.1,

            tank_width: 1200.0,
            tank_height: 800.0,
            starting_money: 500.0,
            starting_species: "goldfish".to_string(),
            starting_fish: 2,

            hunger_decay: 0.05,
            health_regen: 0.01,
            temperature_penalty: 0.03,
            ph_penalty: 0.03,
            ammonia_safe: 1.0,
            ammonia_penalty: 0.01,
            grow_secs: 120.0,

            eat_radius: 30.0,
            seek_accel: 0.2,
            hunt_accel: 0.25,
            flee_accel: 0.3,
            wander_jitter: 0.1,
            wander_strength: 0.02,
            centering: 0.0001,
            shy_repulsion: 0.00005,
            wall_padding: 50.0,
            wall_push: 0.05,
            separation_radius: 20.0,
            separation_weight: 1.0,
            alignment_weight: 1.0,
            cohesion_weight: 0.01,
            food_hunger_threshold: 80.0,
            hunt_hunger_threshold: 60.0,
            hunt_range: 300.0,
            fear_radius: 150.0,
            seeking_speed_mult: 2.0,
            hunting_speed_mult: 2.2,
            fleeing_speed_mult: 2.5,
            startle_radius: 50.0,
            startle_impulse: 0.1,

            water_update_interval_secs: 1.0,
            water_publish_interval_secs: 1.0,
            ammonia_per_fish: 0.002,
            feeding_ammonia: 0.05,
            algae_threshold: 2.0,
            algae_growth: 0.05,
            temperature_drift: 0.05,
            day_temperature: 26.0,
            night_temperature: 22.0,
            neutral_ph: 7.0,
            ph_ammonia_shift: 0.15,
            ph_drift: 0.01,

            disease_ammonia_threshold: 4.0,
            infection_chance: 0.01,

            day_length_secs: 600.0,
            start_hour: 8.0,
            plant_growth_per_sec: 0.002,

            base_food_nutrition: 20.0,
            food_sink_speed: 1.5,
            food_wobble: 0.5,
            food_drop_height: 20.0,
            gravity: 0.05,
            water_drag: 0.98,
            coin_pop_speed: 2.0,
            coin_drift: 1.0,
            coin_floor_margin: 20.0,
            coin_lifetime_secs: 30.0,
            magnet_pull: 0.05,
            collect_radius: 40.0,
            particle_fade: 0.01,
            ambient_particle_chance: 0.05,

            breed_cooldown_ms: 300_000,
            breed_fee: 50.0,
            breed_spawn_spread: 20.0,
            sell_fraction: 0.5,
            prestige_coin_bonus: 0.1,
            prestige_gem_divisor: 10_000.0,
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the tick cannot run with. Each check names the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("reference_fps", self.reference_fps)?;
        check_positive("max_frame_delta_secs", self.max_frame_delta_secs)?;
        check_positive("tank_width", self.tank_width)?;
        check_positive("tank_height", self.tank_height)?;
        check_positive("water_update_interval_secs", self.water_update_interval_secs)?;
        check_positive("water_publish_interval_secs", self.water_publish_interval_secs)?;
        check_positive("day_length_secs", self.day_length_secs)?;
        check_positive("eat_radius", self.eat_radius)?;
        if self.wall_padding * 2.0 >= self.tank_width.min(self.tank_height) {
            return Err(ConfigError::Invalid {
                field: "wall_padding",
                reason: "must be less than half the smaller tank dimension".to_string(),
            });
        }
        if !(0.0..24.0).contains(&self.start_hour) {
            return Err(ConfigError::Invalid {
                field: "start_hour",
                reason: format!("must be in [0, 24), got {}", self.start_hour),
            });
        }
        if !(0.0..=1.0).contains(&self.sell_fraction) {
            return Err(ConfigError::Invalid {
                field: "sell_fraction",
                reason: format!("must be in [0, 1], got {}", self.sell_fraction),
            });
        }
        if !(0.0..1.0).contains(&self.water_drag) || self.water_drag == 0.0 {
            return Err(ConfigError::Invalid {
                field: "water_drag",
                reason: format!("must be in (0, 1), got {}", self.water_drag),
            });
        }
        Ok(())
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: format!("must be positive, got {value}") })
    }
}
