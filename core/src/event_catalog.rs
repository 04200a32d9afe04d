//! Event catalog: the life events that may interrupt a turn.
//!
//! Every event carries one or more choices. An event with a single
//! choice is auto-resolving (a windfall or a mandatory expense).

use crate::{
    error::ConfigError,
    types::{EventId, Money},
};
use serde::{Deserialize, Serialize};

/// Category tag. Drives which behaviour counters a choice moves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Windfall,
    Opportunity,
    Expense,
    Social,
    /// Social-pressure spending ("everyone has one").
    Fomo,
    /// Scam-like offers and loot-box gambles.
    Temptation,
    /// Informational, no money involved.
    Tip,
}

/// What picking a choice does to the player's money.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChoiceEffect {
    /// Signed amount applied as-is.
    Fixed { amount: Money },
    /// Pay `cost` up front; win `reward` with probability `win_probability`.
    Gamble {
        cost:            Money,
        reward:          Money,
        win_probability: f64,
    },
}

impl ChoiceEffect {
    pub fn is_gamble(&self) -> bool {
        matches!(self, Self::Gamble { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub label:  String,
    pub effect: ChoiceEffect,
}

impl Choice {
    pub fn fixed(label: impl Into<String>, amount: Money) -> Self {
        Self { label: label.into(), effect: ChoiceEffect::Fixed { amount } }
    }

    pub fn gamble(label: impl Into<String>, cost: Money, reward: Money, win_probability: f64) -> Self {
        Self {
            label:  label.into(),
            effect: ChoiceEffect::Gamble { cost, reward, win_probability },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifeEvent {
    pub id:          EventId,
    #[serde(default)]
    pub icon:        String,
    pub title:       String,
    pub description: String,
    pub category:    EventCategory,
    pub choices:     Vec<Choice>,
}

impl LifeEvent {
    /// Single-choice events resolve without a player decision.
    pub fn is_automatic(&self) -> bool {
        self.choices.len() == 1
    }

    pub fn choice(&self, index: usize) -> Option<&Choice> {
        self.choices.get(index)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.choices.is_empty() {
            return Err(ConfigError::EmptyChoices { id: self.id.clone() });
        }
        for (index, choice) in self.choices.iter().enumerate() {
            if let ChoiceEffect::Gamble { cost, reward, win_probability } = choice.effect {
                if !(0.0..=1.0).contains(&win_probability) {
                    return Err(ConfigError::InvalidWinProbability {
                        id: self.id.clone(),
                        index,
                        p: win_probability,
                    });
                }
                if cost < 0 || reward < 0 {
                    return Err(ConfigError::NegativeGambleAmount { id: self.id.clone(), index });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventCatalog {
    pub events: Vec<LifeEvent>,
}

impl EventCatalog {
    pub fn new(events: Vec<LifeEvent>) -> Self {
        Self { events }
    }

    pub fn get(&self, id: &str) -> Option<&LifeEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.events.iter().position(|e| e.id == id)
    }

    pub fn by_index(&self, index: usize) -> Option<&LifeEvent> {
        self.events.get(index)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, event) in self.events.iter().enumerate() {
            if self.events[..i].iter().any(|e| e.id == event.id) {
                return Err(ConfigError::DuplicateEvent { id: event.id.clone() });
            }
            event.validate()?;
        }
        Ok(())
    }
}
