//! Event resolution: what a chosen option does to money and behaviour stats.
//!
//! Behaviour tagging rules:
//!   - Fomo, fixed effect:       amount < 0 => gave in, otherwise resisted.
//!   - Temptation, fixed effect: amount < 0 => fell for it, otherwise avoided.
//!   - Temptation, gamble:       always fell for it, win or lose.
//!   - Any gamble:               counts as taken, and as won on success.
//! Other categories move no behaviour counters.

use crate::{
    error::{SimError, SimResult},
    event_catalog::{ChoiceEffect, EventCategory, LifeEvent},
    rng::RandomSource,
    types::Money,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorSignal {
    FomoResisted,
    FomoGaveIn,
    ScamAvoided,
    ScamFellFor,
    GambleTaken,
    GambleWon,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GambleOutcome {
    pub cost:   Money,
    pub reward: Money,
    pub won:    bool,
    pub draw:   f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChoiceOutcome {
    pub choice_index: usize,
    /// Net signed effect on money.
    pub effect:       Money,
    pub gamble:       Option<GambleOutcome>,
    pub signals:      Vec<BehaviorSignal>,
}

/// Resolve choice `choice_index` of `event`.
///
/// Fixed effects consume no randomness; gambles consume exactly one draw.
pub fn resolve_choice(
    event: &LifeEvent,
    choice_index: usize,
    rng: &mut dyn RandomSource,
) -> SimResult<ChoiceOutcome> {
    let choice = event.choice(choice_index).ok_or_else(|| SimError::UnknownChoice {
        event_id: event.id.clone(),
        index:    choice_index,
    })?;

    let mut signals = Vec::new();
    let outcome = match choice.effect {
        ChoiceEffect::Fixed { amount } => {
            match event.category {
                EventCategory::Fomo if amount < 0 => signals.push(BehaviorSignal::FomoGaveIn),
                EventCategory::Fomo => signals.push(BehaviorSignal::FomoResisted),
                EventCategory::Temptation if amount < 0 => signals.push(BehaviorSignal::ScamFellFor),
                EventCategory::Temptation => signals.push(BehaviorSignal::ScamAvoided),
                _ => {}
            }
            ChoiceOutcome { choice_index, effect: amount, gamble: None, signals }
        }
        ChoiceEffect::Gamble { cost, reward, win_probability } => {
            let draw = rng.next_f64();
            let won = draw < win_probability;
            let effect = if won { reward - cost } else { -cost };

            signals.push(BehaviorSignal::GambleTaken);
            if won {
                signals.push(BehaviorSignal::GambleWon);
            }
            if event.category == EventCategory::Temptation {
                signals.push(BehaviorSignal::ScamFellFor);
            }
            ChoiceOutcome {
                choice_index,
                effect,
                gamble: Some(GambleOutcome { cost, reward, won, draw }),
                signals,
            }
        }
    };

    log::debug!(
        "event {}: choice={} effect={} signals={:?}",
        event.id,
        choice_index,
        outcome.effect,
        outcome.signals
    );
    Ok(outcome)
}
