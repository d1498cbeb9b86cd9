use serde::{Deserialize, Serialize};

/// Lifetime counters that achievements and quests are measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub total_coins_earned: f64,
    pub fish_fed_count: u64,
    pub clicks: u64,
    pub fish_bred: u64,
    pub fish_sold: u64,
    pub predations: u64,
    pub tanks_cleaned: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub reward_gems: u32,
    pub unlocked_at_ms: Option<u64>,
}

impl Achievement {
    fn new(id: &str, name: &str, description: &str, reward_gems: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            reward_gems,
            unlocked_at_ms: None,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at_ms.is_some()
    }

    fn condition_met(&self, stats: &GameStats) -> bool {
        match self.id.as_str() {
            "fed_100" => stats.fish_fed_count >= 100,
            "rich_10k" => stats.total_coins_earned >= 10_000.0,
            "click_500" => stats.clicks >= 500,
            "breed_10" => stats.fish_bred >= 10,
            "first_predation" => stats.predations >= 1,
            _ => false,
        }
    }
}

pub fn default_achievements() -> Vec<Achievement> {
    vec![
        Achievement::new("fed_100", "Fish Mom", "Feed fish 100 times", 5),
        Achievement::new("rich_10k", "Tycoon", "Earn 10,000 coins total", 10),
        Achievement::new("click_500", "Tapper", "Click 500 times", 5),
        Achievement::new("breed_10", "Matchmaker", "Breed 10 fish", 10),
        Achievement::new("first_predation", "Circle of Life", "Witness a predation event", 3),
    ]
}

/// Unlock every achievement whose condition now holds. Returns the newly unlocked ones.
pub fn check_achievements(achievements: &mut [Achievement], stats: &GameStats, now_ms: u64) -> Vec<Achievement> {
    let mut newly_unlocked = Vec::new();
    for a in achievements.iter_mut() {
        if a.is_unlocked() {
            continue;
        }
        if a.condition_met(stats) {
            a.unlocked_at_ms = Some(now_ms);
            newly_unlocked.push(a.clone());
        }
    }
    newly_unlocked
}
