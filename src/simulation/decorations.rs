use crate::simulation::catalog::{Catalog, DecorationEffect, DecorationKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecorationInstance {
    pub id: u32,
    pub item_id: String,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    /// 0..1, plants only. Scales their ammonia reduction.
    pub growth: f32,
}

/// Combined effect of everything placed in the tank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorationEffects {
    /// Ammonia removed per second
    pub ammonia_reduction: f32,
    pub coin_multiplier: f64,
    /// Extra health regen per frame
    pub happiness: f32,
}

impl Default for DecorationEffects {
    fn default() -> Self {
        Self { ammonia_reduction: 0.0, coin_multiplier: 1.0, happiness: 0.0 }
    }
}

pub fn combined_effects(decorations: &[DecorationInstance], catalog: &Catalog) -> DecorationEffects {
    let mut effects = DecorationEffects::default();
    for d in decorations {
        let item = match catalog.decoration(&d.item_id) {
            Some(item) => item,
            None => continue,
        };
        match item.effect {
            Some(DecorationEffect::AmmoniaReduction(rate)) => effects.ammonia_reduction += rate * d.growth,
            Some(DecorationEffect::CoinMultiplier(mult)) => effects.coin_multiplier *= mult,
            Some(DecorationEffect::Happiness(bonus)) => effects.happiness += bonus,
            None => {}
        }
    }
    effects
}

/// Grow every plant by `amount`, capped at full size.
pub fn grow_plants(decorations: &mut [DecorationInstance], catalog: &Catalog, amount: f32) {
    for d in decorations.iter_mut() {
        let is_plant = catalog.decoration(&d.item_id).is_some_and(|item| item.kind == DecorationKind::Plant);
        if is_plant {
            d.growth = (d.growth + amount).min(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(id: u32, item_id: &str, growth: f32) -> DecorationInstance {
        DecorationInstance { id, item_id: item_id.into(), x: 0.0, y: 0.0, scale: 1.0, growth }
    }

    #[test]
    fn plant_filtering_scales_with_growth() {
        let catalog = Catalog::default();
        let decor = vec![place(1, "amazon_sword", 0.5), place(2, "java_fern", 1.0), place(3, "rock", 1.0)];
        let fx = combined_effects(&decor, &catalog);
        assert!((fx.ammonia_reduction - (0.015 * 0.5 + 0.005)).abs() < 1e-6);
        assert_eq!(fx.coin_multiplier, 1.0);
    }

    #[test]
    fn statues_stack() {
        let catalog = Catalog::default();
        let decor = vec![place(1, "treasure_chest", 0.0), place(2, "treasure_chest", 0.0), place(3, "castle", 0.0)];
        let fx = combined_effects(&decor, &catalog);
        assert!((fx.coin_multiplier - 1.21).abs() < 1e-9);
        assert!(fx.happiness > 0.0);
    }

    #[test]
    fn only_plants_grow() {
        let catalog = Catalog::default();
        let mut decor = vec![place(1, "java_fern", 0.9), place(2, "castle", 0.0), place(3, "unknown", 0.0)];
        grow_plants(&mut decor, &catalog, 0.5);
        assert_eq!(decor[0].growth, 1.0);
        assert_eq!(decor[1].growth, 0.0);
        assert_eq!(decor[2].growth, 0.0);
    }
}
