use crate::simulation::economy::ParticleKind;
use crate::simulation::error::ConfigError;
use crate::simulation::fish::Disease;
use crate::simulation::genome::{FinShape, FishGenes, Pattern, Rgb};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diet {
    Herbivore,
    Carnivore,
    Omnivore,
}

/// Water a species is comfortable in. Outside either range the fish loses health.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterPreference {
    pub temp_range: (f32, f32),
    pub ph_range: (f32, f32),
    /// 0..1, halves the out-of-range penalties at 1.0
    pub hardiness: f32,
}

impl Default for WaterPreference {
    fn default() -> Self {
        Self { temp_range: (22.0, 28.0), ph_range: (6.5, 8.0), hardiness: 0.5 }
    }
}

impl WaterPreference {
    pub fn temp_ok(&self, temperature: f32) -> bool {
        temperature >= self.temp_range.0 && temperature <= self.temp_range.1
    }

    pub fn ph_ok(&self, ph: f32) -> bool {
        ph >= self.ph_range.0 && ph <= self.ph_range.1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FishSpecies {
    pub id: String,
    pub name: String,
    pub cost: f64,
    pub rarity: Rarity,
    /// Coins dropped per meal before multipliers
    pub base_value: f64,
    pub speed: f32,
    #[serde(default = "default_diet")]
    pub diet: Diet,
    #[serde(default)]
    pub prey: Vec<String>,
    #[serde(default)]
    pub preferred_water: WaterPreference,
    #[serde(default = "default_schooling_distance")]
    pub schooling_distance: f32,
    #[serde(default)]
    pub schooling_factor: f32,
    #[serde(default)]
    pub base_genes: FishGenes,
}

fn default_diet() -> Diet {
    Diet::Omnivore
}

fn default_schooling_distance() -> f32 {
    50.0
}

impl FishSpecies {
    pub fn is_predator(&self) -> bool {
        self.diet == Diet::Carnivore && !self.prey.is_empty()
    }

    pub fn preys_on(&self, species_id: &str) -> bool {
        self.prey.iter().any(|p| p == species_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecorationKind {
    Plant,
    Statue,
    Rock,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DecorationEffect {
    /// Ammonia removed per second at full growth
    AmmoniaReduction(f32),
    /// Multiplier applied to coin values, stacks multiplicatively
    CoinMultiplier(f64),
    /// Extra health regen per frame
    Happiness(f32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecorationItem {
    pub id: String,
    pub name: String,
    pub kind: DecorationKind,
    pub cost: f64,
    #[serde(default)]
    pub effect: Option<DecorationEffect>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineItem {
    pub id: String,
    pub name: String,
    pub cost: f64,
    pub cures: Vec<Disease>,
}

impl MedicineItem {
    pub fn cures(&self, disease: Disease) -> bool {
        self.cures.contains(&disease)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomeDef {
    pub id: String,
    pub name: String,
    pub ambient: ParticleKind,
}

/// Static content consumed by the tank: species, shop items and biomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub species: HashMap<String, FishSpecies>,
    pub decorations: HashMap<String, DecorationItem>,
    pub medicines: HashMap<String, MedicineItem>,
    pub biomes: HashMap<String, BiomeDef>,
    pub default_biome: String,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.biomes.contains_key(&self.default_biome) {
            return Err(ConfigError::Invalid {
                field: "default_biome",
                reason: format!("'{}' is not a known biome", self.default_biome),
            });
        }
        for species in self.species.values() {
            if species.speed <= 0.0 {
                return Err(ConfigError::Invalid {
                    field: "species.speed",
                    reason: format!("'{}' must swim at a positive speed", species.id),
                });
            }
            if let Some(unknown) = species.prey.iter().find(|p| !self.species.contains_key(*p)) {
                log::warn!("Species '{}' lists unknown prey '{}'", species.id, unknown);
            }
        }
        Ok(())
    }

    pub fn species(&self, id: &str) -> Option<&FishSpecies> {
        self.species.get(id)
    }

    pub fn decoration(&self, id: &str) -> Option<&DecorationItem> {
        self.decorations.get(id)
    }

    pub fn medicine(&self, id: &str) -> Option<&MedicineItem> {
        self.medicines.get(id)
    }

    pub fn biome(&self, id: &str) -> Option<&BiomeDef> {
        self.biomes.get(id)
    }
}

struct SpeciesRow {
    id: &'static str,
    name: &'static str,
    cost: f64,
    rarity: Rarity,
    base_value: f64,
    speed: f32,
    water: ((f32, f32), (f32, f32), f32),
    schooling: (f32, f32),
    genes: (u32, u32, Pattern, u32, f32, FinShape),
}

const STOCK_SPECIES: &[SpeciesRow] = &[
    SpeciesRow {
        id: "goldfish",
        name: "Goldie",
        cost: 100.0,
        rarity: Rarity::Common,
        base_value: 10.0,
        speed: 1.0,
        water: ((18.0, 26.0), (6.5, 8.0), 0.8),
        schooling: (50.0, 0.3),
        genes: (0xF59E0B, 0xFCD34D, Pattern::Solid, 0x000000, 1.0, FinShape::Triangle),
    },
    SpeciesRow {
        id: "guppy",
        name: "Guppy",
        cost: 250.0,
        rarity: Rarity::Common,
        base_value: 25.0,
        speed: 1.5,
        water: ((22.0, 28.0), (6.8, 7.8), 0.6),
        schooling: (40.0, 0.8),
        genes: (0x3B82F6, 0x93C5FD, Pattern::Solid, 0x000000, 0.8, FinShape::Round),
    },
    SpeciesRow {
        id: "tropical",
        name: "Tropical",
        cost: 600.0,
        rarity: Rarity::Rare,
        base_value: 60.0,
        speed: 1.2,
        water: ((24.0, 29.0), (6.5, 7.5), 0.4),
        schooling: (45.0, 0.6),
        genes: (0xEC4899, 0xFBCFE8, Pattern::Striped, 0xFFFFFF, 1.0, FinShape::Triangle),
    },
    SpeciesRow {
        id: "puffer",
        name: "Puffer",
        cost: 1500.0,
        rarity: Rarity::Rare,
        base_value: 150.0,
        speed: 0.8,
        water: ((23.0, 28.0), (7.0, 8.2), 0.5),
        schooling: (60.0, 0.0),
        genes: (0x10B981, 0x6EE7B7, Pattern::Spotted, 0x065F46, 1.5, FinShape::Round),
    },
    SpeciesRow {
        id: "squid",
        name: "Squiddy",
        cost: 4000.0,
        rarity: Rarity::Epic,
        base_value: 400.0,
        speed: 2.0,
        water: ((18.0, 25.0), (7.5, 8.5), 0.5),
        schooling: (70.0, 0.2),
        genes: (0x8B5CF6, 0xC4B5FD, Pattern::Spotted, 0xEDE9FE, 1.8, FinShape::Round),
    },
    SpeciesRow {
        id: "shark",
        name: "Jaws",
        cost: 10_000.0,
        rarity: Rarity::Legendary,
        base_value: 1500.0,
        speed: 2.5,
        water: ((22.0, 28.0), (7.0, 8.5), 0.9),
        schooling: (100.0, 0.0),
        genes: (0x64748B, 0x94A3B8, Pattern::Solid, 0x000000, 2.5, FinShape::Forked),
    },
    SpeciesRow {
        id: "whale",
        name: "Wailer",
        cost: 50_000.0,
        rarity: Rarity::Legendary,
        base_value: 5000.0,
        speed: 0.5,
        water: ((10.0, 26.0), (7.0, 8.5), 1.0),
        schooling: (150.0, 0.1),
        genes: (0x334155, 0x475569, Pattern::Solid, 0x000000, 4.0, FinShape::Forked),
    },
];

impl SpeciesRow {
    fn build(&self) -> FishSpecies {
        let (temp_range, ph_range, hardiness) = self.water;
        let (body, fin, pattern, pattern_color, size, fin_shape) = self.genes;
        let (diet, prey) = match self.id {
            "shark" => (
                Diet::Carnivore,
                vec!["goldfish".to_string(), "guppy".to_string(), "tropical".to_string()],
            ),
            "whale" => (Diet::Herbivore, Vec::new()),
            _ => (Diet::Omnivore, Vec::new()),
        };
        FishSpecies {
            id: self.id.to_string(),
            name: self.name.to_string(),
            cost: self.cost,
            rarity: self.rarity,
            base_value: self.base_value,
            speed: self.speed,
            diet,
            prey,
            preferred_water: WaterPreference { temp_range, ph_range, hardiness },
            schooling_distance: self.schooling.0,
            schooling_factor: self.schooling.1,
            base_genes: FishGenes {
                body_color: Rgb::from_hex(body),
                fin_color: Rgb::from_hex(fin),
                pattern,
                pattern_color: Rgb::from_hex(pattern_color),
                size,
                fin_shape,
            },
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let species = STOCK_SPECIES.iter().map(|row| (row.id.to_string(), row.build())).collect();

        let decorations = [
            ("java_fern", "Java Fern", DecorationKind::Plant, 300.0, Some(DecorationEffect::AmmoniaReduction(0.005))),
            ("amazon_sword", "Amazon Sword", DecorationKind::Plant, 800.0, Some(DecorationEffect::AmmoniaReduction(0.015))),
            ("treasure_chest", "Treasure Chest", DecorationKind::Statue, 2000.0, Some(DecorationEffect::CoinMultiplier(1.1))),
            ("castle", "Sunken Castle", DecorationKind::Statue, 1500.0, Some(DecorationEffect::Happiness(0.005))),
            ("rock", "River Rock", DecorationKind::Rock, 100.0, None),
        ]
        .into_iter()
        .map(|(id, name, kind, cost, effect)| {
            (id.to_string(), DecorationItem { id: id.to_string(), name: name.to_string(), kind, cost, effect })
        })
        .collect();

        let medicines = [
            ("general_cure", "General Cure", 50.0, vec![Disease::Ich, Disease::Fungus, Disease::Parasite]),
            ("ich_treatment", "Ich Treatment", 25.0, vec![Disease::Ich]),
            ("antifungal", "Antifungal Drops", 25.0, vec![Disease::Fungus]),
            ("dewormer", "Dewormer", 30.0, vec![Disease::Parasite]),
        ]
        .into_iter()
        .map(|(id, name, cost, cures)| {
            (id.to_string(), MedicineItem { id: id.to_string(), name: name.to_string(), cost, cures })
        })
        .collect();

        let biomes = [
            ("freshwater", "Freshwater", ParticleKind::Bubble),
            ("coral_reef", "Coral Reef", ParticleKind::Sparkle),
            ("amazon", "Amazon River", ParticleKind::Leaf),
            ("monsoon", "Monsoon", ParticleKind::Rain),
            ("abyss", "The Abyss", ParticleKind::Glow),
        ]
        .into_iter()
        .map(|(id, name, ambient)| {
            (id.to_string(), BiomeDef { id: id.to_string(), name: name.to_string(), ambient })
        })
        .collect();

        Self { species, decorations, medicines, biomes, default_biome: "freshwater".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_catalog_is_valid() {
        let catalog = Catalog::default();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.species.len(), 7);
        assert!(catalog.biome(&catalog.default_biome).is_some());
    }

    #[test]
    fn shark_is_the_only_stock_predator() {
        let catalog = Catalog::default();
        let predators: Vec<&str> = catalog
            .species
            .values()
            .filter(|s| s.is_predator())
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(predators, vec!["shark"]);

        let shark = catalog.species("shark").expect("shark");
        assert!(shark.preys_on("goldfish"));
        assert!(!shark.preys_on("whale"));
    }

    #[test]
    fn general_cure_treats_everything() {
        let catalog = Catalog::default();
        let cure = catalog.medicine("general_cure").expect("general cure");
        assert!(cure.cures(Disease::Ich));
        assert!(cure.cures(Disease::Fungus));
        assert!(cure.cures(Disease::Parasite));

        let ich = catalog.medicine("ich_treatment").expect("ich treatment");
        assert!(!ich.cures(Disease::Parasite));
    }

    #[test]
    fn water_preference_ranges_are_inclusive() {
        let pref = WaterPreference { temp_range: (22.0, 28.0), ph_range: (6.5, 8.0), hardiness: 0.5 };
        assert!(pref.temp_ok(22.0));
        assert!(pref.temp_ok(28.0));
        assert!(!pref.temp_ok(28.1));
        assert!(pref.ph_ok(7.0));
        assert!(!pref.ph_ok(6.4));
    }

    #[test]
    fn catalog_json_roundtrip() {
        let catalog = Catalog::default();
        let json = serde_json::to_string(&catalog).expect("serialize");
        let parsed = Catalog::from_json(&json).expect("parse");
        assert_eq!(parsed.species.len(), catalog.species.len());
        let guppy = parsed.species("guppy").expect("guppy");
        assert_eq!(guppy.base_genes.fin_shape, FinShape::Round);
    }

    #[test]
    fn rejects_unknown_default_biome() {
        let catalog = Catalog { default_biome: "lava".to_string(), ..Catalog::default() };
        let err = catalog.validate().unwrap_err();
        assert!(err.to_string().contains("default_biome"));
    }

    #[test]
    fn minimal_species_json_uses_defaults() {
        let json = r#"{
            "species": { "minnow": { "id": "minnow", "name": "Minnow", "cost": 10.0,
                                     "rarity": "Common", "base_value": 1.0, "speed": 1.0 } },
            "decorations": {}, "medicines": {},
            "biomes": { "pond": { "id": "pond", "name": "Pond", "ambient": "Bubble" } },
            "default_biome": "pond"
        }"#;
        let catalog = Catalog::from_json(json).expect("parse");
        let minnow = catalog.species("minnow").expect("minnow");
        assert_eq!(minnow.diet, Diet::Omnivore);
        assert!(minnow.prey.is_empty());
        assert_eq!(minnow.base_genes, FishGenes::default());
    }
}
