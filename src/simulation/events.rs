use crate::simulation::fish::Disease;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Sickness,
    PoorWater,
    Predation,
}

impl DeathCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sickness => "sickness",
            Self::PoorWater => "poor_water",
            Self::Predation => "predation",
        }
    }
}

/// Something the player should hear about. Drained into every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    FishBought { fish_id: u32, species_id: String, cost: f64 },
    FishSold { fish_id: u32, species_id: String, payout: f64 },
    Bred { child_id: u32, parent_a: u32, parent_b: u32, generation: u32 },
    Death { fish_id: u32, species_id: String, cause: DeathCause },
    SicknessOnset { fish_id: u32, disease: Disease },
    Predation { predator_id: u32, prey_id: u32 },
    Cured { fish_id: u32, disease: Disease, medicine: String },
    TankCleaned,
    AchievementUnlocked { id: String, name: String, reward_gems: u32 },
    QuestCompleted { id: u32, description: String, reward_gems: u32 },
    Prestiged { level: u32, gems_awarded: u32 },
}

impl SimEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FishBought { .. } => "fish_bought",
            Self::FishSold { .. } => "fish_sold",
            Self::Bred { .. } => "bred",
            Self::Death { .. } => "death",
            Self::SicknessOnset { .. } => "sickness_onset",
            Self::Predation { .. } => "predation",
            Self::Cured { .. } => "cured",
            Self::TankCleaned => "tank_cleaned",
            Self::AchievementUnlocked { .. } => "achievement_unlocked",
            Self::QuestCompleted { .. } => "quest_completed",
            Self::Prestiged { .. } => "prestiged",
        }
    }

    /// The fish this event is mainly about, if any.
    pub fn subject_fish(&self) -> Option<u32> {
        match self {
            Self::FishBought { fish_id, .. }
            | Self::FishSold { fish_id, .. }
            | Self::Death { fish_id, .. }
            | Self::SicknessOnset { fish_id, .. }
            | Self::Cured { fish_id, .. } => Some(*fish_id),
            Self::Bred { child_id, .. } => Some(*child_id),
            Self::Predation { predator_id, .. } => Some(*predator_id),
            _ => None,
        }
    }

    /// One-line human readable text for the event log.
    pub fn description(&self) -> String {
        match self {
            Self::FishBought { fish_id, species_id, cost } => {
                format!("Bought a {species_id} (#{fish_id}) for {cost:.0} coins")
            }
            Self::FishSold { fish_id, species_id, payout } => {
                format!("Sold {species_id} #{fish_id} for {payout:.0} coins")
            }
            Self::Bred { child_id, parent_a, parent_b, generation } => {
                format!("#{parent_a} and #{parent_b} had a baby: #{child_id} (generation {generation})")
            }
            Self::Death { fish_id, species_id, cause } => match cause {
                DeathCause::Sickness => format!("{species_id} #{fish_id} succumbed to disease"),
                DeathCause::PoorWater => format!("{species_id} #{fish_id} died from poor water quality"),
                DeathCause::Predation => format!("{species_id} #{fish_id} was eaten"),
            },
            Self::SicknessOnset { fish_id, disease } => {
                format!("Fish #{fish_id} caught {}", disease.as_str())
            }
            Self::Predation { predator_id, prey_id } => format!("#{predator_id} ate #{prey_id}"),
            Self::Cured { fish_id, disease, medicine } => {
                format!("Cured #{fish_id} of {} with {medicine}", disease.as_str())
            }
            Self::TankCleaned => "Tank cleaned".to_string(),
            Self::AchievementUnlocked { name, reward_gems, .. } => {
                format!("Achievement unlocked: {name} (+{reward_gems} gems)")
            }
            Self::QuestCompleted { description, reward_gems, .. } => {
                format!("Quest complete: {description} (+{reward_gems} gems)")
            }
            Self::Prestiged { level, gems_awarded } => {
                format!("Prestige {level}! Earned {gems_awarded} gems")
            }
        }
    }
}
