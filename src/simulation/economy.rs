use crate::simulation::config::SimulationConfig;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Bubble,
    Sparkle,
    Leaf,
    Bone,
    Rain,
    Glow,
}

impl ParticleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bubble => "bubble",
            Self::Sparkle => "sparkle",
            Self::Leaf => "leaf",
            Self::Bone => "bone",
            Self::Rain => "rain",
            Self::Glow => "glow",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub nutrition: f32,
    /// Wobble phase offset
    pub phase: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub value: f64,
    pub age_secs: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// 1.0 at spawn, removed at 0
    pub life: f32,
    pub size: f32,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn spawn(kind: ParticleKind, x: f32, y: f32, rng: &mut impl Rng) -> Self {
        let (vx, vy, size) = match kind {
            ParticleKind::Bubble => (
                (rng.gen::<f32>() - 0.5) * 0.5,
                -0.5 - rng.gen::<f32>(),
                rng.gen_range(2.0..6.0),
            ),
            ParticleKind::Sparkle => (
                (rng.gen::<f32>() - 0.5) * 0.5,
                -0.5 + rng.gen::<f32>(),
                rng.gen_range(5.0..10.0),
            ),
            ParticleKind::Leaf => (
                (rng.gen::<f32>() - 0.5) * 1.0,
                rng.gen_range(0.3..0.8),
                rng.gen_range(4.0..8.0),
            ),
            ParticleKind::Bone => (
                (rng.gen::<f32>() - 0.5) * 1.0,
                rng.gen_range(0.5..1.0),
                rng.gen_range(3.0..6.0),
            ),
            ParticleKind::Rain => (0.0, rng.gen_range(3.0..5.0), rng.gen_range(1.0..2.0)),
            ParticleKind::Glow => (
                (rng.gen::<f32>() - 0.5) * 0.4,
                (rng.gen::<f32>() - 0.5) * 0.4,
                rng.gen_range(2.0..5.0),
            ),
        };
        Self { x, y, vx, vy, life: 1.0, size, kind }
    }
}

/// Short-lived entities floating in the tank: food pellets, dropped coins and
/// cosmetic particles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Economy {
    pub food: Vec<FoodItem>,
    pub coins: Vec<Coin>,
    pub particles: Vec<Particle>,
    next_id: u32,
}

impl Economy {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> u32 {
        self.next_id = self.next_id.wrapping_add(1);
        self.next_id
    }

    pub fn drop_food(&mut self, x: f32, y: f32, nutrition: f32, config: &SimulationConfig, rng: &mut impl Rng) -> u32 {
        let id = self.alloc_id();
        self.food.push(FoodItem {
            id,
            x: x.clamp(0.0, config.tank_width),
            y: y.clamp(0.0, config.tank_height),
            vy: config.food_sink_speed,
            nutrition,
            phase: rng.gen_range(0.0..std::f32::consts::TAU),
        });
        id
    }

    pub fn spawn_coin(&mut self, x: f32, y: f32, value: f64, config: &SimulationConfig, rng: &mut impl Rng) -> u32 {
        let id = self.alloc_id();
        self.coins.push(Coin {
            id,
            x,
            y,
            vx: (rng.gen::<f32>() - 0.5) * 2.0 * config.coin_drift,
            vy: -config.coin_pop_speed,
            value,
            age_secs: 0.0,
        });
        id
    }

    pub fn spawn_particles(&mut self, kind: ParticleKind, x: f32, y: f32, count: usize, rng: &mut impl Rng) {
        for _ in 0..count {
            self.particles.push(Particle::spawn(kind, x, y, rng));
        }
    }

    /// Collect every coin within `radius` of the point. Returns the collected face values.
    pub fn collect_at(&mut self, x: f32, y: f32, radius: f32, rng: &mut impl Rng) -> Vec<f64> {
        let mut collected = Vec::new();
        let mut sparkles = Vec::new();
        self.coins.retain(|c| {
            let dx = c.x - x;
            let dy = c.y - y;
            if dx * dx + dy * dy < radius * radius {
                collected.push(c.value);
                sparkles.push((c.x, c.y));
                false
            } else {
                true
            }
        });
        for (sx, sy) in sparkles {
            self.spawn_particles(ParticleKind::Sparkle, sx, sy, 1, rng);
        }
        collected
    }

    /// Move food, coins and particles forward. Returns coins auto-collected by the magnet.
    pub fn advance(
        &mut self,
        dt_secs: f32,
        frames: f32,
        elapsed_secs: f32,
        magnet_level: u32,
        ambient: ParticleKind,
        config: &SimulationConfig,
        rng: &mut impl Rng,
    ) -> Vec<f64> {
        let width = config.tank_width;
        let height = config.tank_height;

        // ─── Food ───
        for f in &mut self.food {
            f.y += f.vy * frames;
            f.x = (f.x + (f.phase + elapsed_secs * 5.0).sin() * config.food_wobble * frames).clamp(0.0, width);
        }
        self.food.retain(|f| f.y < height);

        // ─── Coins ───
        let drag = config.water_drag.powf(frames);
        let floor = height - config.coin_floor_margin;
        let mut collected = Vec::new();
        let mut sparkles = Vec::new();
        for c in &mut self.coins {
            if magnet_level > 0 {
                c.vy -= config.magnet_pull * magnet_level as f32 * frames;
            } else {
                c.vy += config.gravity * 0.5 * frames;
            }
            c.vy *= drag;
            c.x = (c.x + c.vx * frames).clamp(0.0, width);
            c.y += c.vy * frames;
            c.age_secs += dt_secs;

            if c.y > floor {
                c.y = floor;
                c.vy *= -0.5;
            }
        }
        self.coins.retain(|c| {
            if magnet_level > 0 && c.y < 0.0 {
                collected.push(c.value);
                sparkles.push((c.x, 0.0));
                return false;
            }
            if c.age_secs >= config.coin_lifetime_secs {
                log::debug!("Coin #{} worth {} expired uncollected", c.id, c.value);
                return false;
            }
            true
        });
        for (sx, sy) in sparkles {
            self.spawn_particles(ParticleKind::Sparkle, sx, sy, 1, rng);
        }

        // ─── Particles ───
        for p in &mut self.particles {
            p.x += p.vx * frames;
            p.y += p.vy * frames;
            p.life -= config.particle_fade * frames;
        }
        self.particles.retain(|p| p.life > 0.0);

        if rng.gen::<f32>() < (config.ambient_particle_chance * frames).min(1.0) {
            let x = rng.gen_range(0.0..width);
            let y = match ambient {
                ParticleKind::Bubble => height + 10.0,
                ParticleKind::Rain | ParticleKind::Leaf => -10.0,
                _ => rng.gen_range(0.0..height),
            };
            self.spawn_particles(ambient, x, y, 1, rng);
        }

        collected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn step(eco: &mut Economy, magnet: u32, config: &SimulationConfig, rng: &mut StdRng) -> Vec<f64> {
        eco.advance(1.0 / 60.0, 1.0, 0.0, magnet, ParticleKind::Bubble, config, rng)
    }

    #[test]
    fn food_sinks_and_leaves_at_floor() {
        let config = SimulationConfig::default();
        let mut rng = seeded_rng();
        let mut eco = Economy::new();
        eco.drop_food(600.0, 20.0, 20.0, &config, &mut rng);

        step(&mut eco, 0, &config, &mut rng);
        assert!((eco.food[0].y - (20.0 + config.food_sink_speed)).abs() < 1e-4);

        for _ in 0..1_000 {
            step(&mut eco, 0, &config, &mut rng);
        }
        assert!(eco.food.is_empty());
    }

    #[test]
    fn coins_pop_up_then_settle_on_floor() {
        let config = SimulationConfig::default();
        let mut rng = seeded_rng();
        let mut eco = Economy::new();
        eco.spawn_coin(600.0, 700.0, 10.0, &config, &mut rng);

        step(&mut eco, 0, &config, &mut rng);
        assert!(eco.coins[0].y < 700.0);

        for _ in 0..1_000 {
            step(&mut eco, 0, &config, &mut rng);
        }
        let floor = config.tank_height - config.coin_floor_margin;
        assert!(eco.coins[0].y <= floor);
        assert!(eco.coins[0].y > floor - 5.0);
    }

    #[test]
    fn uncollected_coins_expire() {
        let config = SimulationConfig::default();
        let mut rng = seeded_rng();
        let mut eco = Economy::new();
        eco.spawn_coin(600.0, 400.0, 10.0, &config, &mut rng);

        let frames = (config.coin_lifetime_secs * 60.0) as usize + 2;
        for _ in 0..frames {
            step(&mut eco, 0, &config, &mut rng);
        }
        assert!(eco.coins.is_empty());
    }

    #[test]
    fn magnet_collects_coins_at_the_surface() {
        let config = SimulationConfig::default();
        let mut rng = seeded_rng();
        let mut eco = Economy::new();
        eco.spawn_coin(600.0, 100.0, 25.0, &config, &mut rng);

        let mut total = 0.0;
        for _ in 0..600 {
            total += step(&mut eco, 3, &config, &mut rng).iter().sum::<f64>();
        }
        assert!(eco.coins.is_empty());
        assert_eq!(total, 25.0);
    }

    #[test]
    fn collect_at_respects_radius() {
        let config = SimulationConfig::default();
        let mut rng = seeded_rng();
        let mut eco = Economy::new();
        eco.spawn_coin(100.0, 100.0, 10.0, &config, &mut rng);
        eco.spawn_coin(500.0, 500.0, 99.0, &config, &mut rng);

        let got = eco.collect_at(110.0, 105.0, config.collect_radius, &mut rng);
        assert_eq!(got, vec![10.0]);
        assert_eq!(eco.coins.len(), 1);
        assert!(eco.particles.iter().any(|p| p.kind == ParticleKind::Sparkle));
    }

    #[test]
    fn particles_fade_out() {
        let config = SimulationConfig { ambient_particle_chance: 0.0, ..SimulationConfig::default() };
        let mut rng = seeded_rng();
        let mut eco = Economy::new();
        eco.spawn_particles(ParticleKind::Bone, 300.0, 300.0, 5, &mut rng);
        assert_eq!(eco.particles.len(), 5);

        for _ in 0..101 {
            step(&mut eco, 0, &config, &mut rng);
        }
        assert!(eco.particles.is_empty());
    }

    #[test]
    fn bubbles_rise_and_bones_sink() {
        let mut rng = seeded_rng();
        for _ in 0..100 {
            assert!(Particle::spawn(ParticleKind::Bubble, 0.0, 0.0, &mut rng).vy < 0.0);
            assert!(Particle::spawn(ParticleKind::Bone, 0.0, 0.0, &mut rng).vy > 0.0);
            assert!(Particle::spawn(ParticleKind::Rain, 0.0, 0.0, &mut rng).vy > 0.0);
        }
    }
}
