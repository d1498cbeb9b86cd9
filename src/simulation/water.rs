use crate::simulation::config::SimulationConfig;
use serde::{Deserialize, Serialize};

pub const MAX_AMMONIA: f32 = 10.0;
pub const MAX_ALGAE: f32 = 100.0;

/// Tank water chemistry.
///
/// Ammonia builds up with the fish load and every feeding, plants and the filter
/// take it back out. High ammonia sours the pH, feeds algae during the day and,
/// past the disease threshold, makes fish sick. Nitrites and nitrates are carried
/// for display and stay at zero until a nitrogen cycle is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterParams {
    pub ph: f32,
    pub temperature: f32,
    pub ammonia: f32,
    pub nitrites: f32,
    pub nitrates: f32,
    pub algae: f32,
}

impl Default for WaterParams {
    fn default() -> Self {
        Self { ph: 7.0, temperature: 25.0, ammonia: 0.0, nitrites: 0.0, nitrates: 0.0, algae: 0.0 }
    }
}

/// Everything outside the water that shapes one chemistry step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterInputs {
    pub fish_count: usize,
    /// Ammonia removed per second by plants
    pub decoration_mitigation: f32,
    /// Ammonia removed per second by the filter
    pub upgrade_mitigation: f32,
    /// 0..1, slows cooling
    pub heater_resistance: f32,
    pub target_temperature: f32,
    pub daytime: bool,
}

impl WaterParams {
    pub fn advanced(&self, delta_secs: f32, inputs: &WaterInputs, config: &SimulationConfig) -> WaterParams {
        let mut next = *self;

        // ─── Ammonia ───
        let produced = inputs.fish_count as f32 * config.ammonia_per_fish * delta_secs;
        let removed = (inputs.decoration_mitigation + inputs.upgrade_mitigation) * delta_secs;
        next.ammonia = (self.ammonia + produced - removed).clamp(0.0, MAX_AMMONIA);

        // ─── Temperature ───
        let gap = inputs.target_temperature - self.temperature;
        let mut rate = config.temperature_drift * delta_secs;
        if gap < 0.0 {
            rate *= (1.0 - inputs.heater_resistance).clamp(0.0, 1.0);
        }
        next.temperature = self.temperature + gap.clamp(-rate, rate);

        // ─── pH ───
        let ph_target = config.neutral_ph - next.ammonia * config.ph_ammonia_shift;
        let ph_step = config.ph_drift * delta_secs;
        next.ph = (self.ph + (ph_target - self.ph).clamp(-ph_step, ph_step)).clamp(0.0, 14.0);

        // ─── Algae ───
        if inputs.daytime && next.ammonia > config.algae_threshold {
            let growth = config.algae_growth * (next.ammonia - config.algae_threshold) * delta_secs;
            next.algae = (self.algae + growth).clamp(0.0, MAX_ALGAE);
        }

        next.nitrites = self.nitrites.max(0.0);
        next.nitrates = self.nitrates.max(0.0);
        next
    }

    pub fn clean(&mut self) {
        self.ammonia = 0.0;
        self.algae = 0.0;
    }

    pub fn add_ammonia(&mut self, amount: f32) {
        self.ammonia = (self.ammonia + amount).clamp(0.0, MAX_AMMONIA);
    }

    /// 0 (toxic) .. 1 (pristine), for quick display.
    pub fn quality(&self) -> f32 {
        let ammonia = 1.0 - self.ammonia / MAX_AMMONIA;
        let algae = 1.0 - self.algae / MAX_ALGAE;
        (ammonia * 0.7 + algae * 0.3).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(fish_count: usize) -> WaterInputs {
        WaterInputs {
            fish_count,
            decoration_mitigation: 0.0,
            upgrade_mitigation: 0.0,
            heater_resistance: 0.0,
            target_temperature: 25.0,
            daytime: true,
        }
    }

    #[test]
    fn fish_load_raises_ammonia() {
        let config = SimulationConfig::default();
        let w = WaterParams::default().advanced(1.0, &inputs(10), &config);
        assert!((w.ammonia - 10.0 * config.ammonia_per_fish).abs() < 1e-6);
    }

    #[test]
    fn mitigation_never_goes_negative() {
        let config = SimulationConfig::default();
        let mut i = inputs(1);
        i.upgrade_mitigation = 0.05;
        i.decoration_mitigation = 0.05;
        let w = WaterParams::default().advanced(1.0, &i, &config);
        assert_eq!(w.ammonia, 0.0);
    }

    #[test]
    fn ammonia_is_capped() {
        let config = SimulationConfig::default();
        let w = WaterParams { ammonia: 9.99, ..WaterParams::default() };
        let w = w.advanced(10.0, &inputs(1_000), &config);
        assert_eq!(w.ammonia, MAX_AMMONIA);
    }

    #[test]
    fn temperature_approaches_target_without_overshoot() {
        let config = SimulationConfig::default();
        let mut i = inputs(0);
        i.target_temperature = 25.02;
        let w = WaterParams::default().advanced(1.0, &i, &config);
        assert!((w.temperature - 25.02).abs() < 1e-5);

        i.target_temperature = 30.0;
        let w = WaterParams::default().advanced(1.0, &i, &config);
        assert!((w.temperature - (25.0 + config.temperature_drift)).abs() < 1e-5);
    }

    #[test]
    fn heater_slows_cooling() {
        let config = SimulationConfig::default();
        let mut i = inputs(0);
        i.target_temperature = 20.0;
        let bare = WaterParams::default().advanced(1.0, &i, &config);
        i.heater_resistance = 0.8;
        let heated = WaterParams::default().advanced(1.0, &i, &config);
        assert!(heated.temperature > bare.temperature);
        assert!(heated.temperature < 25.0);
    }

    #[test]
    fn ammonia_sours_ph() {
        let config = SimulationConfig::default();
        let mut w = WaterParams { ammonia: 5.0, ..WaterParams::default() };
        for _ in 0..100 {
            w = w.advanced(1.0, &inputs(0), &config);
        }
        assert!(w.ph < config.neutral_ph);
    }

    #[test]
    fn algae_rate_is_per_second() {
        let config = SimulationConfig::default();
        let dirty = WaterParams { ammonia: 5.0, ..WaterParams::default() };

        let one_step = dirty.advanced(1.0, &inputs(0), &config);
        let half = dirty.advanced(0.5, &inputs(0), &config);
        let two_steps = half.advanced(0.5, &inputs(0), &config);
        assert!((one_step.algae - two_steps.algae).abs() < 1e-5);
        assert!((one_step.algae - config.algae_growth * 3.0).abs() < 1e-5);
    }

    #[test]
    fn algae_needs_daylight_and_ammonia() {
        let config = SimulationConfig::default();
        let dirty = WaterParams { ammonia: 5.0, ..WaterParams::default() };

        let day = dirty.advanced(1.0, &inputs(0), &config);
        assert!(day.algae > 0.0);

        let mut night_inputs = inputs(0);
        night_inputs.daytime = false;
        let night = dirty.advanced(1.0, &night_inputs, &config);
        assert_eq!(night.algae, 0.0);

        let clean = WaterParams::default().advanced(1.0, &inputs(0), &config);
        assert_eq!(clean.algae, 0.0);
    }

    #[test]
    fn clean_resets_ammonia_and_algae() {
        let mut w = WaterParams { ammonia: 6.0, algae: 40.0, temperature: 27.0, ..WaterParams::default() };
        w.clean();
        assert_eq!(w.ammonia, 0.0);
        assert_eq!(w.algae, 0.0);
        assert_eq!(w.temperature, 27.0);
    }

    #[test]
    fn quality_drops_with_ammonia() {
        let fresh = WaterParams::default();
        let dirty = WaterParams { ammonia: 8.0, ..fresh };
        assert_eq!(fresh.quality(), 1.0);
        assert!(dirty.quality() < 0.5);
    }
}
