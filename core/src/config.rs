//! Game constants and catalogs, loaded from a data directory laid out as:
//!
//! ```text
//! data/
//!   game/game_config.json       money, goal, turns, event odds, step
//!   assets/asset_catalog.json   investable assets and return profiles
//!   events/event_catalog.json   life events and their choices
//!   goals/goals.json            selectable savings goals
//! ```
//!
//! `SimConfig::default_test()` mirrors the shipped files for tests.

use crate::{
    asset_catalog::{Asset, AssetCatalog, ReturnProfile, RiskLevel},
    error::{ConfigError, SimResult},
    event_catalog::{Choice, EventCatalog, EventCategory, LifeEvent},
    types::{GoalKey, Money, Turn},
};
use serde::{Deserialize, Serialize};

// ── Game constants ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    pub starting_money:    Money,
    pub goal_amount:       Money,
    pub max_turns:         Turn,
    /// Chance that a life event interrupts a turn.
    pub event_probability: f64,
    /// Allocations move in multiples of this many units.
    pub allocation_step:   Money,
    pub leaderboard_max:   usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_money:    100,
            goal_amount:       500,
            max_turns:         10,
            event_probability: 0.6,
            allocation_step:   10,
            leaderboard_max:   20,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| ConfigError::InvalidSetting {
            field,
            reason: reason.to_string(),
        };
        if self.starting_money < 0 {
            return Err(invalid("starting_money", "must be >= 0"));
        }
        if self.goal_amount <= 0 {
            return Err(invalid("goal_amount", "must be > 0"));
        }
        if self.max_turns == 0 {
            return Err(invalid("max_turns", "must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.event_probability) {
            return Err(invalid("event_probability", "must lie in [0, 1]"));
        }
        if self.allocation_step <= 0 {
            return Err(invalid("allocation_step", "must be > 0"));
        }
        if self.leaderboard_max == 0 {
            return Err(invalid("leaderboard_max", "must be >= 1"));
        }
        Ok(())
    }
}

// ── Goals ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalConfig {
    pub key:  GoalKey,
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GoalsFile {
    goals: Vec<GoalConfig>,
}

// ── Full simulation config ─────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub game:   GameConfig,
    pub assets: AssetCatalog,
    pub events: EventCatalog,
    pub goals:  Vec<GoalConfig>,
}

impl SimConfig {
    /// Load from the data/ directory and validate.
    /// In tests, use SimConfig::default_test().
    pub fn load(data_dir: &str) -> SimResult<Self> {
        let game: GameConfig = read_json(&format!("{data_dir}/game/game_config.json"))?;
        let assets: AssetCatalog = read_json(&format!("{data_dir}/assets/asset_catalog.json"))?;
        let events: EventCatalog = read_json(&format!("{data_dir}/events/event_catalog.json"))?;
        let goals_file: GoalsFile = read_json(&format!("{data_dir}/goals/goals.json"))?;

        let config = Self { game, assets, events, goals: goals_file.goals };
        config.validate()?;
        log::info!(
            "Loaded config from {data_dir}: {} assets, {} events, {} goals",
            config.assets.len(),
            config.events.len(),
            config.goals.len()
        );
        Ok(config)
    }

    /// Fail fast on anything that would corrupt the probability contract.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game.validate()?;
        self.assets.validate()?;
        self.events.validate()?;
        if self.events.is_empty() && self.game.event_probability > 0.0 {
            return Err(ConfigError::EmptyEventCatalog { p: self.game.event_probability });
        }
        if self.goals.is_empty() {
            return Err(ConfigError::EmptyGoalCatalog);
        }
        Ok(())
    }

    pub fn goal(&self, key: &str) -> Option<&GoalConfig> {
        self.goals.iter().find(|g| g.key == key)
    }

    /// Config with hardcoded defaults for use in unit tests.
    /// Mirrors the shipped data/ catalog.
    pub fn default_test() -> Self {
        Self {
            game:   GameConfig::default(),
            assets: AssetCatalog::new(default_assets()),
            events: EventCatalog::new(default_events()),
            goals:  vec![
                goal("bike", "New Bike", "🚲"),
                goal("gaming", "Gaming Setup", "🎮"),
                goal("pet", "Pet Supplies", "🐕"),
                goal("trip", "Theme Park Trip", "🎢"),
            ],
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> SimResult<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    Ok(serde_json::from_str(&content)?)
}

fn goal(key: &str, name: &str, icon: &str) -> GoalConfig {
    GoalConfig { key: key.into(), name: name.into(), icon: icon.into() }
}

fn default_assets() -> Vec<Asset> {
    let asset = |key: &str, name: &str, icon: &str, description: &str, risk, returns| Asset {
        key: key.into(),
        name: name.into(),
        icon: icon.into(),
        description: description.into(),
        why_value: String::new(),
        risk,
        returns,
    };
    vec![
        asset(
            "shelly", "Shelly the Turtle", "🐢", "Slow and steady wins the race!",
            RiskLevel::Safe,
            ReturnProfile { min: 0.02, max: 0.03, weights: [0.3, 0.4, 0.3] },
        ),
        asset(
            "goldie", "Goldie the Goose", "🪿", "Lays golden eggs... usually!",
            RiskLevel::Moderate,
            ReturnProfile { min: -0.10, max: 0.15, weights: [0.15, 0.55, 0.30] },
        ),
        asset(
            "rocket", "Rocket Rabbit", "🐰", "To the moon! ...or the ground.",
            RiskLevel::Risky,
            ReturnProfile { min: -0.80, max: 2.00, weights: [0.60, 0.25, 0.15] },
        ),
        asset(
            "mystery", "Mystery Box", "📦", "Exciting! Sparkly! Usually empty!",
            RiskLevel::Dangerous,
            ReturnProfile { min: -0.90, max: 0.50, weights: [0.75, 0.20, 0.05] },
        ),
    ]
}

fn default_events() -> Vec<LifeEvent> {
    let event = |id: &str, title: &str, description: &str, category, choices| LifeEvent {
        id: id.into(),
        icon: String::new(),
        title: title.into(),
        description: description.into(),
        category,
        choices,
    };
    vec![
        event("found_money", "Lucky Find!", "You found $5 on the sidewalk!",
            EventCategory::Windfall, vec![Choice::fixed("Sweet!", 5)]),
        event("gift_grandma", "Grandma's Gift", "Grandma sent you $20.",
            EventCategory::Windfall, vec![Choice::fixed("Thanks, Grandma!", 20)]),
        event("dog_walking", "Job Opportunity!", "Your neighbor offers $15 to walk their dog.",
            EventCategory::Opportunity, vec![
                Choice::fixed("Walk the dog", 15),
                Choice::fixed("No thanks", 0),
            ]),
        event("lemonade_stand", "Business Idea!", "Supplies cost $10, you might make $25.",
            EventCategory::Opportunity, vec![
                Choice::gamble("Try it", 10, 25, 0.6),
                Choice::fixed("Too risky for me", 0),
            ]),
        event("birthday_money", "Birthday Money!", "You got $30 in birthday cards!",
            EventCategory::Windfall, vec![Choice::fixed("Happy birthday to me!", 30)]),
        event("recycling", "Recycling Reward", "Your cans and bottles are worth $8.",
            EventCategory::Windfall, vec![Choice::fixed("Nice!", 8)]),
        event("phone_crack", "Cracked Screen!", "Repairing your phone screen costs $30.",
            EventCategory::Expense, vec![
                Choice::fixed("Pay for the repair", -30),
                Choice::fixed("Live with the crack", 0),
            ]),
        event("friend_birthday", "Friend's Birthday", "A good gift for your best friend is $15.",
            EventCategory::Social, vec![
                Choice::fixed("Buy a nice gift", -15),
                Choice::fixed("Make a homemade card", 0),
            ]),
        event("new_game", "New Game Alert!", "Everyone's playing the new $25 game.",
            EventCategory::Fomo, vec![
                Choice::fixed("Buy it now", -25),
                Choice::fixed("Wait for a sale", 0),
            ]),
        event("school_supplies", "School Project", "Project supplies cost $12.",
            EventCategory::Expense, vec![Choice::fixed("Pay for supplies", -12)]),
        event("bike_repair", "Flat Tire!", "A repair kit costs $8.",
            EventCategory::Expense, vec![
                Choice::fixed("Fix it", -8),
                Choice::fixed("Walk for now", 0),
            ]),
        event("trendy_clothes", "Fashion FOMO", "Everyone has the new $35 hoodie.",
            EventCategory::Fomo, vec![
                Choice::fixed("I need it", -35),
                Choice::fixed("My clothes are fine", 0),
            ]),
        event("pet_food", "Pet Emergency", "Your pet is out of food: $18.",
            EventCategory::Expense, vec![Choice::fixed("Buy pet food", -18)]),
        event("savings_tip", "Money Tip!", "Writing goals down makes you likelier to reach them.",
            EventCategory::Tip, vec![Choice::fixed("Good to know!", 0)]),
        event("compound_interest", "Did You Know?", "$100 at 7% a year doubles in about 10 years.",
            EventCategory::Tip, vec![Choice::fixed("Math is cool!", 0)]),
        event("crypto_bro", "Hot Tip from a 'Friend'", "MoonCoin is going to 10x! Get in NOW!",
            EventCategory::Temptation, vec![
                Choice::gamble("Put in $20", 20, 60, 0.1),
                Choice::fixed("That sounds like a scam", 0),
            ]),
        event("mystery_box_deal", "AMAZING DEAL!!!", "Mystery Box Bundle, only $15!",
            EventCategory::Temptation, vec![
                Choice::gamble("Ooh, sparkly!", 15, 30, 0.15),
                Choice::fixed("I know this trick", 0),
            ]),
    ]
}
