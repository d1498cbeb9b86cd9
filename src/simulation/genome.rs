use crate::simulation::catalog::FishSpecies;
use rand::prelude::*;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_SIZE: f32 = 0.5;
pub const MAX_SIZE: f32 = 4.5;

const MUTATION_RATE: f64 = 0.1;
const BLEND_RATE: f64 = 0.2;
const COLOR_SHIFT: i16 = 20;
const SIZE_JITTER: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Component-wise average, rounded.
    pub fn blend(self, other: Rgb) -> Rgb {
        let avg = |a: u8, b: u8| ((a as u16 + b as u16 + 1) / 2) as u8;
        Rgb::new(avg(self.r, other.r), avg(self.g, other.g), avg(self.b, other.b))
    }

    /// Shift every channel by an independent amount in [-COLOR_SHIFT, COLOR_SHIFT].
    pub fn jitter(self, rng: &mut impl Rng) -> Rgb {
        let mut shift =
            |c: u8| (c as i16 + rng.gen_range(-COLOR_SHIFT..=COLOR_SHIFT)).clamp(0, 255) as u8;
        Rgb::new(shift(self.r), shift(self.g), shift(self.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    Solid,
    Striped,
    Spotted,
}

impl Pattern {
    pub const ALL: [Pattern; 3] = [Pattern::Solid, Pattern::Striped, Pattern::Spotted];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinShape {
    Triangle,
    Round,
    Forked,
}

impl FinShape {
    pub const ALL: [FinShape; 3] = [FinShape::Triangle, FinShape::Round, FinShape::Forked];
}

/// Inheritable visual traits. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FishGenes {
    pub body_color: Rgb,
    pub fin_color: Rgb,
    pub pattern: Pattern,
    pub pattern_color: Rgb,
    pub size: f32,
    pub fin_shape: FinShape,
}

impl Default for FishGenes {
    fn default() -> Self {
        Self {
            body_color: Rgb::from_hex(0xF59E0B),
            fin_color: Rgb::from_hex(0xFCD34D),
            pattern: Pattern::Solid,
            pattern_color: Rgb::from_hex(0x000000),
            size: 1.0,
            fin_shape: FinShape::Triangle,
        }
    }
}

/// Genes for a shop-bought fish: the species template with a perturbed body
/// colour and ±10% size variance.
pub fn random_genes(species: &FishSpecies, rng: &mut impl Rng) -> FishGenes {
    let base = species.base_genes;
    FishGenes {
        body_color: base.body_color.jitter(rng),
        size: (base.size * rng.gen_range(0.9..1.1)).clamp(MIN_SIZE, MAX_SIZE),
        ..base
    }
}

pub fn offspring_genes(a: &FishGenes, b: &FishGenes, rng: &mut impl Rng) -> FishGenes {
    FishGenes {
        body_color: inherit_color(a.body_color, b.body_color, rng),
        fin_color: inherit_color(a.fin_color, b.fin_color, rng),
        pattern: inherit_categorical(a.pattern, b.pattern, &Pattern::ALL, rng),
        pattern_color: inherit_color(a.pattern_color, b.pattern_color, rng),
        size: inherit_size(a.size, b.size, rng),
        fin_shape: inherit_categorical(a.fin_shape, b.fin_shape, &FinShape::ALL, rng),
    }
}

fn inherit_color(a: Rgb, b: Rgb, rng: &mut impl Rng) -> Rgb {
    let mut color = if rng.gen_bool(0.5) { a } else { b };
    if rng.gen_bool(BLEND_RATE) {
        color = a.blend(b);
    }
    if rng.gen_bool(MUTATION_RATE) {
        color = color.jitter(rng);
    }
    color
}

fn inherit_categorical<T: Copy>(a: T, b: T, all: &[T], rng: &mut impl Rng) -> T {
    let inherited = if rng.gen_bool(0.5) { a } else { b };
    if rng.gen_bool(MUTATION_RATE) {
        all[rng.gen_range(0..all.len())]
    } else {
        inherited
    }
}

fn inherit_size(a: f32, b: f32, rng: &mut impl Rng) -> f32 {
    let mean = (a + b) / 2.0;
    let mut size = if rng.gen_bool(0.5) { a } else { b };
    if rng.gen_bool(BLEND_RATE) {
        size = mean;
    }
    if rng.gen_bool(MUTATION_RATE) {
        // Bounded jitter around the parents' mean
        size = match Normal::new(0.0_f32, SIZE_JITTER / 2.0) {
            Ok(normal) => mean + normal.sample(rng).clamp(-SIZE_JITTER, SIZE_JITTER),
            Err(_) => mean,
        };
    }
    size.clamp(MIN_SIZE, MAX_SIZE)
}
