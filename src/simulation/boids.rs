use crate::simulation::config::SimulationConfig;
use noise::{NoiseFn, Perlin};

/// Read-only copy of an agent's kinematics taken at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

pub struct SpatialGrid {
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<usize>>, // cell index -> list of boid indices
}

impl SpatialGrid {
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        let cell_size = cell_size.max(1.0);
        let cols = (width / cell_size).ceil() as usize + 1;
        let rows = (height / cell_size).ceil() as usize + 1;
        Self { cell_size, cols, rows, cells: vec![Vec::new(); cols * rows] }
    }

    pub fn rebuild(&mut self, boids: &[Boid]) {
        for cell in &mut self.cells {
            cell.clear();
        }
        for (i, b) in boids.iter().enumerate() {
            let col = ((b.x.max(0.0) / self.cell_size) as usize).min(self.cols - 1);
            let row = ((b.y.max(0.0) / self.cell_size) as usize).min(self.rows - 1);
            self.cells[row * self.cols + col].push(i);
        }
    }

    /// Candidate indices whose cell overlaps the square around (x, y). Callers filter by distance.
    pub fn neighbors(&self, x: f32, y: f32, radius: f32) -> Vec<usize> {
        let mut result = Vec::new();
        let min_col = ((x - radius) / self.cell_size).floor().max(0.0) as usize;
        let max_col = ((x + radius) / self.cell_size).ceil().max(0.0) as usize;
        let min_row = ((y - radius) / self.cell_size).floor().max(0.0) as usize;
        let max_row = ((y + radius) / self.cell_size).ceil().max(0.0) as usize;

        for row in min_row.min(self.rows - 1)..=max_row.min(self.rows - 1) {
            for col in min_col.min(self.cols - 1)..=max_col.min(self.cols - 1) {
                result.extend_from_slice(&self.cells[row * self.cols + col]);
            }
        }
        result
    }
}

fn length(x: f32, y: f32) -> f32 {
    (x * x + y * y).sqrt()
}

/// Acceleration of magnitude `accel` from `from` toward `to`.
pub fn steer_toward(from: (f32, f32), to: (f32, f32), accel: f32) -> (f32, f32) {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let dist = length(dx, dy);
    if dist < 0.001 {
        return (0.0, 0.0);
    }
    (dx / dist * accel, dy / dist * accel)
}

pub fn steer_away(from: (f32, f32), threat: (f32, f32), accel: f32) -> (f32, f32) {
    let (fx, fy) = steer_toward(from, threat, accel);
    (-fx, -fy)
}

/// Separation, alignment and cohesion against same-species schoolmates.
pub fn schooling_force(me: &Boid, mates: &[Boid], factor: f32, config: &SimulationConfig) -> (f32, f32) {
    if mates.is_empty() || factor <= 0.0 {
        return (0.0, 0.0);
    }

    let mut sep_x = 0.0_f32;
    let mut sep_y = 0.0_f32;
    let mut avg_vx = 0.0_f32;
    let mut avg_vy = 0.0_f32;
    let mut center_x = 0.0_f32;
    let mut center_y = 0.0_f32;

    for other in mates {
        let dx = me.x - other.x;
        let dy = me.y - other.y;
        let dist = length(dx, dy);
        if dist > 0.001 && dist < config.separation_radius {
            sep_x += dx / dist;
            sep_y += dy / dist;
        }
        avg_vx += other.vx;
        avg_vy += other.vy;
        center_x += other.x;
        center_y += other.y;
    }

    let n = mates.len() as f32;
    let align_x = (avg_vx / n - me.vx) * 0.05;
    let align_y = (avg_vy / n - me.vy) * 0.05;
    let coh_x = (center_x / n - me.x) * 0.01;
    let coh_y = (center_y / n - me.y) * 0.01;

    let fx = sep_x * 0.05 * config.separation_weight + align_x * config.alignment_weight + coh_x * config.cohesion_weight;
    let fy = sep_y * 0.05 * config.separation_weight + align_y * config.alignment_weight + coh_y * config.cohesion_weight;
    (fx * factor, fy * factor)
}

pub fn wall_avoidance(x: f32, y: f32, config: &SimulationConfig) -> (f32, f32) {
    let pad = config.wall_padding;
    let mut ax = 0.0;
    let mut ay = 0.0;
    if x < pad {
        ax += config.wall_push;
    }
    if x > config.tank_width - pad {
        ax -= config.wall_push;
    }
    if y < pad {
        ay += config.wall_push;
    }
    if y > config.tank_height - pad {
        ay -= config.wall_push;
    }
    (ax, ay)
}

/// Smooth per-fish drift sampled from Perlin noise.
pub fn wander(perlin: &Perlin, seed: f32, elapsed_secs: f32, strength: f32) -> (f32, f32) {
    let noise_val = perlin.get([seed as f64, elapsed_secs as f64 * 0.5]) as f32;
    let angle = noise_val * std::f32::consts::TAU;
    (angle.cos() * strength, angle.sin() * strength)
}

pub fn limit_speed(vx: f32, vy: f32, max_speed: f32) -> (f32, f32) {
    let speed = length(vx, vy);
    if speed > max_speed && speed > 0.0 {
        let scale = max_speed / speed;
        (vx * scale, vy * scale)
    } else {
        (vx, vy)
    }
}
