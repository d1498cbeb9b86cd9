use thiserror::Error;

/// Why a player command was refused. The tank is left untouched whenever one of
/// these is returned; the `Display` text is what the player gets to read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("unknown species '{0}'")]
    UnknownSpecies(String),

    #[error("no fish with id #{0} in the tank")]
    UnknownFish(u32),

    #[error("unknown item '{0}'")]
    UnknownItem(String),

    #[error("not enough coins: need {needed:.0}, have {available:.0}")]
    InsufficientFunds { needed: f64, available: f64 },

    #[error("not enough gems: need {needed}, have {available}")]
    InsufficientGems { needed: u32, available: u32 },

    #[error("your tank is full ({capacity} fish)! Sell some fish or upgrade your tank size")]
    TankFull { capacity: usize },

    #[error("fish #{fish_id} is on breeding cooldown for another {remaining_ms} ms")]
    OnCooldown { fish_id: u32, remaining_ms: u64 },

    #[error("please select two different fish to breed")]
    SameFish,

    #[error("a {0} and a {1} cannot breed")]
    IncompatibleSpecies(String, String),

    #[error("fish #{0} is not sick")]
    NotSick(u32),

    #[error("{medicine} does not cure {disease}")]
    IneffectiveMedicine { medicine: String, disease: &'static str },

    #[error("no {0} left in the inventory")]
    OutOfStock(String),

    #[error("{0} is already at max level")]
    MaxLevel(&'static str),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}
