use crate::simulation::achievements::GameStats;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

pub const BOARD_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuestKind {
    BreedFish,
    EarnCoins,
    CleanTank,
    HaveFish { species_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub id: u32,
    pub kind: QuestKind,
    pub description: String,
    pub target: f64,
    pub progress: f64,
    pub reward_gems: u32,
    pub completed: bool,
    /// Counter value when the quest was handed out
    baseline: f64,
}

impl Quest {
    fn counter(kind: &QuestKind, stats: &GameStats) -> f64 {
        match kind {
            QuestKind::BreedFish => stats.fish_bred as f64,
            QuestKind::EarnCoins => stats.total_coins_earned,
            QuestKind::CleanTank => stats.tanks_cleaned as f64,
            QuestKind::HaveFish { .. } => 0.0,
        }
    }

    pub fn new(id: u32, kind: QuestKind, target: f64, reward_gems: u32, stats: &GameStats) -> Self {
        let description = match &kind {
            QuestKind::BreedFish => format!("Breed {target:.0} fish"),
            QuestKind::EarnCoins => format!("Earn {target:.0} coins"),
            QuestKind::CleanTank => format!("Clean the tank {target:.0} times"),
            QuestKind::HaveFish { species_id } => format!("Own {target:.0} {species_id}"),
        };
        let baseline = Self::counter(&kind, stats);
        Self { id, kind, description, target, progress: 0.0, reward_gems, completed: false, baseline }
    }

    /// Refresh progress. Returns true the moment the quest completes.
    pub fn update(&mut self, stats: &GameStats, species_count: impl Fn(&str) -> usize) -> bool {
        if self.completed {
            return false;
        }
        self.progress = match &self.kind {
            QuestKind::HaveFish { species_id } => species_count(species_id) as f64,
            kind => (Self::counter(kind, stats) - self.baseline).max(0.0),
        }
        .min(self.target);
        if self.progress >= self.target {
            self.completed = true;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestBoard {
    pub quests: Vec<Quest>,
    next_id: u32,
}

impl QuestBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate(&mut self, stats: &GameStats, species_ids: &[String], rng: &mut impl Rng) -> Quest {
        self.next_id += 1;
        let id = self.next_id;
        match rng.gen_range(0..4) {
            0 => Quest::new(id, QuestKind::BreedFish, rng.gen_range(1..=3) as f64, 5, stats),
            1 => {
                let target = (rng.gen_range(5..=20) * 100) as f64;
                Quest::new(id, QuestKind::EarnCoins, target, 3, stats)
            }
            2 => Quest::new(id, QuestKind::CleanTank, 1.0, 2, stats),
            _ => match species_ids.choose(rng) {
                Some(species_id) => {
                    let kind = QuestKind::HaveFish { species_id: species_id.clone() };
                    Quest::new(id, kind, rng.gen_range(2..=4) as f64, 4, stats)
                }
                None => Quest::new(id, QuestKind::CleanTank, 1.0, 2, stats),
            },
        }
    }

    /// Fill every free slot on the board with a fresh quest.
    pub fn top_up(&mut self, stats: &GameStats, species_ids: &[String], rng: &mut impl Rng) {
        self.quests.retain(|q| !q.completed);
        while self.quests.len() < BOARD_SIZE {
            let quest = self.generate(stats, species_ids, rng);
            self.quests.push(quest);
        }
    }

    /// Replace the whole board.
    pub fn refresh(&mut self, stats: &GameStats, species_ids: &[String], rng: &mut impl Rng) {
        self.quests.clear();
        self.top_up(stats, species_ids, rng);
    }

    /// Update progress on every quest. Returns the quests completed by this check.
    pub fn check(&mut self, stats: &GameStats, species_count: impl Fn(&str) -> usize) -> Vec<Quest> {
        let mut completed = Vec::new();
        for q in &mut self.quests {
            if q.update(stats, &species_count) {
                completed.push(q.clone());
            }
        }
        completed
    }
}
