use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shop upgrades bought with coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeId {
    FoodQuality,
    AutoFeeder,
    Magnet,
    TankSize,
    Metabolism,
    Heater,
    Filter,
    GrowLights,
}

impl UpgradeId {
    pub const ALL: [UpgradeId; 8] = [
        UpgradeId::FoodQuality,
        UpgradeId::AutoFeeder,
        UpgradeId::Magnet,
        UpgradeId::TankSize,
        UpgradeId::Metabolism,
        UpgradeId::Heater,
        UpgradeId::Filter,
        UpgradeId::GrowLights,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FoodQuality => "food_quality",
            Self::AutoFeeder => "auto_feeder",
            Self::Magnet => "magnet",
            Self::TankSize => "tank_size",
            Self::Metabolism => "metabolism",
            Self::Heater => "heater",
            Self::Filter => "filter",
            Self::GrowLights => "grow_lights",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.as_str() == s)
    }

    /// (base cost, cost multiplier, max level)
    fn pricing(&self) -> (f64, f64, u32) {
        match self {
            Self::FoodQuality => (200.0, 2.5, 10),
            Self::AutoFeeder => (1000.0, 2.0, 5),
            Self::Magnet => (5000.0, 3.0, 3),
            Self::TankSize => (500.0, 2.0, 10),
            Self::Metabolism => (750.0, 1.5, 5),
            Self::Heater => (1200.0, 2.0, 4),
            Self::Filter => (800.0, 2.0, 5),
            Self::GrowLights => (600.0, 2.5, 3),
        }
    }

    pub fn max_level(&self) -> u32 {
        self.pricing().2
    }

    /// Price of the next level, before the shop discount.
    pub fn base_cost(&self, level: u32) -> f64 {
        let (base, mult, _) = self.pricing();
        base * mult.powi(level as i32)
    }
}

/// Skill tree nodes bought with gems. Survive prestige.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillId {
    BetterBreeding,
    GoldenScales,
    HardyFish,
    DiscountShop,
}

impl SkillId {
    pub const ALL: [SkillId; 4] =
        [SkillId::BetterBreeding, SkillId::GoldenScales, SkillId::HardyFish, SkillId::DiscountShop];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BetterBreeding => "better_breeding",
            Self::GoldenScales => "golden_scales",
            Self::HardyFish => "hardy_fish",
            Self::DiscountShop => "discount_shop",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    pub fn max_level(&self) -> u32 {
        match self {
            Self::BetterBreeding => 5,
            Self::GoldenScales => 10,
            Self::HardyFish => 4,
            Self::DiscountShop => 10,
        }
    }

    pub fn cost(&self, level: u32) -> u32 {
        (level + 1) * 5
    }
}

/// Effective values of every upgrade and skill at the current levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multipliers {
    pub coin_value: f64,
    pub nutrition: f32,
    pub metabolism: f32,
    pub capacity: usize,
    /// Seconds between automatic drops, `None` when no feeder is installed
    pub auto_feed_interval: Option<f32>,
    pub magnet_level: u32,
    pub heater_resistance: f32,
    pub filter_reduction: f32,
    pub plant_growth: f32,
    pub breed_cooldown: f64,
    pub health_resistance: f32,
    pub shop_discount: f64,
    pub prestige: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Progression {
    pub upgrades: HashMap<UpgradeId, u32>,
    pub skills: HashMap<SkillId, u32>,
    pub prestige: u32,
}

impl Progression {
    pub fn upgrade_level(&self, id: UpgradeId) -> u32 {
        self.upgrades.get(&id).copied().unwrap_or(0)
    }

    pub fn skill_level(&self, id: SkillId) -> u32 {
        self.skills.get(&id).copied().unwrap_or(0)
    }

    pub fn shop_discount(&self) -> f64 {
        (1.0 - 0.05 * self.skill_level(SkillId::DiscountShop) as f64).max(0.5)
    }

    /// Next-level price of an upgrade, or `None` at max level.
    pub fn upgrade_cost(&self, id: UpgradeId) -> Option<f64> {
        let level = self.upgrade_level(id);
        if level >= id.max_level() {
            return None;
        }
        Some((id.base_cost(level) * self.shop_discount()).floor())
    }

    pub fn skill_cost(&self, id: SkillId) -> Option<u32> {
        let level = self.skill_level(id);
        if level >= id.max_level() {
            return None;
        }
        Some(id.cost(level))
    }

    pub fn multipliers(&self, prestige_coin_bonus: f64) -> Multipliers {
        let up = |id| self.upgrade_level(id);
        let sk = |id| self.skill_level(id);

        let food = up(UpgradeId::FoodQuality) as f32;
        let golden = 1.0 + 0.1 * sk(SkillId::GoldenScales) as f64;
        let feeder = up(UpgradeId::AutoFeeder);

        Multipliers {
            coin_value: (1.0 + 0.2 * food as f64) * golden,
            nutrition: 1.0 + 0.2 * food,
            metabolism: 1.0 + 0.25 * up(UpgradeId::Metabolism) as f32,
            capacity: 5 + 2 * up(UpgradeId::TankSize) as usize,
            auto_feed_interval: (feeder > 0).then(|| (6.0 - feeder as f32).max(1.0)),
            magnet_level: up(UpgradeId::Magnet),
            heater_resistance: 0.2 * up(UpgradeId::Heater) as f32,
            filter_reduction: 0.01 * up(UpgradeId::Filter) as f32,
            plant_growth: 1.0 + 0.5 * up(UpgradeId::GrowLights) as f32,
            breed_cooldown: (1.0 - 0.1 * sk(SkillId::BetterBreeding) as f64).max(0.5),
            health_resistance: 1.0 + 0.25 * sk(SkillId::HardyFish) as f32,
            shop_discount: self.shop_discount(),
            prestige: 1.0 + prestige_coin_bonus * self.prestige as f64,
        }
    }

    /// Wipe the coin-bought upgrades and advance the prestige counter. Skills are kept.
    pub fn reset_for_prestige(&mut self) {
        self.upgrades.clear();
        self.prestige += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_progression_multipliers() {
        let m = Progression::default().multipliers(0.1);
        assert_eq!(m.coin_value, 1.0);
        assert_eq!(m.capacity, 5);
        assert_eq!(m.auto_feed_interval, None);
        assert_eq!(m.magnet_level, 0);
        assert_eq!(m.breed_cooldown, 1.0);
        assert_eq!(m.prestige, 1.0);
    }

    #[test]
    fn upgrade_effects_follow_levels() {
        let mut p = Progression::default();
        p.upgrades.insert(UpgradeId::TankSize, 3);
        p.upgrades.insert(UpgradeId::AutoFeeder, 5);
        p.upgrades.insert(UpgradeId::FoodQuality, 2);
        p.upgrades.insert(UpgradeId::Heater, 4);
        let m = p.multipliers(0.1);
        assert_eq!(m.capacity, 11);
        assert_eq!(m.auto_feed_interval, Some(1.0));
        assert!((m.coin_value - 1.4).abs() < 1e-9);
        assert!((m.heater_resistance - 0.8).abs() < 1e-6);
    }

    #[test]
    fn skills_floor_at_half() {
        let mut p = Progression::default();
        p.skills.insert(SkillId::BetterBreeding, 5);
        p.skills.insert(SkillId::DiscountShop, 10);
        let m = p.multipliers(0.1);
        assert_eq!(m.breed_cooldown, 0.5);
        assert_eq!(m.shop_discount, 0.5);
    }

    #[test]
    fn upgrade_cost_grows_and_discounts() {
        let mut p = Progression::default();
        assert_eq!(p.upgrade_cost(UpgradeId::FoodQuality), Some(200.0));
        p.upgrades.insert(UpgradeId::FoodQuality, 2);
        assert_eq!(p.upgrade_cost(UpgradeId::FoodQuality), Some(1250.0));
        p.skills.insert(SkillId::DiscountShop, 2);
        assert_eq!(p.upgrade_cost(UpgradeId::FoodQuality), Some(1125.0));
    }

    #[test]
    fn max_level_has_no_price() {
        let mut p = Progression::default();
        p.upgrades.insert(UpgradeId::Magnet, 3);
        assert_eq!(p.upgrade_cost(UpgradeId::Magnet), None);
        p.skills.insert(SkillId::HardyFish, 4);
        assert_eq!(p.skill_cost(SkillId::HardyFish), None);
    }

    #[test]
    fn skill_cost_is_linear() {
        let mut p = Progression::default();
        assert_eq!(p.skill_cost(SkillId::GoldenScales), Some(5));
        p.skills.insert(SkillId::GoldenScales, 3);
        assert_eq!(p.skill_cost(SkillId::GoldenScales), Some(20));
    }

    #[test]
    fn prestige_keeps_skills() {
        let mut p = Progression::default();
        p.upgrades.insert(UpgradeId::TankSize, 4);
        p.skills.insert(SkillId::GoldenScales, 2);
        p.reset_for_prestige();
        assert_eq!(p.upgrade_level(UpgradeId::TankSize), 0);
        assert_eq!(p.skill_level(SkillId::GoldenScales), 2);
        assert_eq!(p.prestige, 1);
        assert!((p.multipliers(0.1).prestige - 1.1).abs() < 1e-9);
    }

    #[test]
    fn ids_parse_from_their_names() {
        for id in UpgradeId::ALL {
            assert_eq!(UpgradeId::from_str(id.as_str()), Some(id));
        }
        assert_eq!(SkillId::from_str("hardy_fish"), Some(SkillId::HardyFish));
        assert_eq!(SkillId::from_str("nope"), None);
    }
}
