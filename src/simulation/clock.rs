use crate::simulation::config::SimulationConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPhase {
    Night,
    Dawn,
    Day,
    Dusk,
}

impl DayPhase {
    pub fn from_hour(hour: f32) -> Self {
        match hour {
            h if (5.0..7.0).contains(&h) => Self::Dawn,
            h if (7.0..18.0).contains(&h) => Self::Day,
            h if (18.0..20.0).contains(&h) => Self::Dusk,
            _ => Self::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Night => "night",
            Self::Dawn => "dawn",
            Self::Day => "day",
            Self::Dusk => "dusk",
        }
    }

    pub fn is_daytime(&self) -> bool {
        !matches!(self, Self::Night)
    }
}

/// What fell due during one clock advance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClockTicks {
    pub water_steps: u32,
    pub auto_feeds: u32,
    pub publish_water: bool,
}

/// Simulated time: elapsed milliseconds, hour of day and the fixed-interval
/// accumulators driving water, the auto-feeder and water publishing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    pub time_of_day: f32,
    pub elapsed_ms: u64,
    /// Sub-millisecond remainder carried into the next advance
    #[serde(default)]
    ms_remainder: f64,
    water_accumulator: f32,
    feed_accumulator: f32,
    publish_accumulator: f32,
}

impl SimClock {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            time_of_day: config.start_hour,
            elapsed_ms: 0,
            ms_remainder: 0.0,
            water_accumulator: 0.0,
            feed_accumulator: 0.0,
            // Publish on the very first tick
            publish_accumulator: config.water_publish_interval_secs,
        }
    }

    pub fn phase(&self) -> DayPhase {
        DayPhase::from_hour(self.time_of_day)
    }

    pub fn is_daytime(&self) -> bool {
        self.phase().is_daytime()
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_ms as f32 / 1000.0
    }

    pub fn target_temperature(&self, config: &SimulationConfig) -> f32 {
        if self.is_daytime() {
            config.day_temperature
        } else {
            config.night_temperature
        }
    }

    pub fn advance(&mut self, dt_secs: f32, auto_feed_interval: Option<f32>, config: &SimulationConfig) -> ClockTicks {
        let mut ticks = ClockTicks::default();

        let total_ms = self.ms_remainder + dt_secs as f64 * 1000.0;
        let whole_ms = total_ms.floor();
        self.elapsed_ms += whole_ms as u64;
        self.ms_remainder = total_ms - whole_ms;
        self.time_of_day = (self.time_of_day + dt_secs * 24.0 / config.day_length_secs).rem_euclid(24.0);

        self.water_accumulator += dt_secs;
        while self.water_accumulator >= config.water_update_interval_secs {
            self.water_accumulator -= config.water_update_interval_secs;
            ticks.water_steps += 1;
        }

        match auto_feed_interval {
            Some(interval) => {
                self.feed_accumulator += dt_secs;
                while self.feed_accumulator >= interval {
                    self.feed_accumulator -= interval;
                    ticks.auto_feeds += 1;
                }
            }
            None => self.feed_accumulator = 0.0,
        }

        self.publish_accumulator += dt_secs;
        if self.publish_accumulator >= config.water_publish_interval_secs {
            self.publish_accumulator = 0.0;
            ticks.publish_water = true;
        }

        ticks
    }
}
