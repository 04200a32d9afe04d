//! Return engine: turns an allocation into a randomized monetary change.
//!
//! Two-stage draw per non-zero allocation:
//!   1. tier selector against the cumulative tier weights,
//!   2. position inside the tier's slice of the [min, max] interval.
//!
//! Zero allocations consume no randomness. Monetary change is rounded
//! half away from zero (`f64::round`).

use crate::{
    asset_catalog::{Asset, ReturnProfile},
    rng::RandomSource,
    types::{AssetKey, Money},
};
use serde::{Deserialize, Serialize};

/// Start of the mid tier, as a fraction of the rate range.
pub const MID_TIER_START: f64 = 0.33;
/// Start of the high tier, as a fraction of the rate range.
pub const HIGH_TIER_START: f64 = 0.67;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Low,
    Mid,
    High,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Low, Tier::Mid, Tier::High];

    /// Select a tier from a uniform draw `u` and the profile weights.
    pub fn select(u: f64, weights: &[f64; 3]) -> Tier {
        if u < weights[0] {
            Tier::Low
        } else if u < weights[0] + weights[1] {
            Tier::Mid
        } else {
            Tier::High
        }
    }

    /// Rate sub-interval `[lower, lower + width)` owned by this tier.
    pub fn bounds(&self, profile: &ReturnProfile) -> (f64, f64) {
        let range = profile.range();
        let (start, end) = match self {
            Tier::Low  => (0.0, MID_TIER_START),
            Tier::Mid  => (MID_TIER_START, HIGH_TIER_START),
            Tier::High => (HIGH_TIER_START, 1.0),
        };
        (profile.min + range * start, range * (end - start))
    }

    pub fn index(&self) -> usize {
        match self {
            Tier::Low  => 0,
            Tier::Mid  => 1,
            Tier::High => 2,
        }
    }
}

/// Outcome of one asset's allocation for one turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvestmentReturn {
    pub asset:    AssetKey,
    pub invested: Money,
    /// None when nothing was invested.
    pub tier:     Option<Tier>,
    pub rate:     f64,
    pub change:   Money,
}

impl InvestmentReturn {
    pub fn idle(asset: &str) -> Self {
        Self {
            asset:    asset.to_string(),
            invested: 0,
            tier:     None,
            rate:     0.0,
            change:   0,
        }
    }

    /// Value of the position after the turn.
    pub fn new_amount(&self) -> Money {
        self.invested + self.change
    }
}

/// Draw a rate for `profile`. Always lies in `[min, max]`.
pub fn draw_rate(profile: &ReturnProfile, rng: &mut dyn RandomSource) -> (Tier, f64) {
    let tier = Tier::select(rng.next_f64(), &profile.weights);
    let (lower, width) = tier.bounds(profile);
    let rate = (lower + rng.next_f64() * width).clamp(profile.min, profile.max);
    (tier, rate)
}

/// Round half away from zero to whole money units.
pub fn round_money(value: f64) -> Money {
    value.round() as Money
}

/// Compute the randomized change for `invested` units placed in `asset`.
pub fn compute_return(asset: &Asset, invested: Money, rng: &mut dyn RandomSource) -> InvestmentReturn {
    if invested <= 0 {
        return InvestmentReturn::idle(&asset.key);
    }
    let (tier, rate) = draw_rate(&asset.returns, rng);
    let change = round_money(invested as f64 * rate);
    log::debug!(
        "return: asset={} invested={invested} tier={tier:?} rate={rate:.4} change={change}",
        asset.key
    );
    InvestmentReturn {
        asset: asset.key.clone(),
        invested,
        tier: Some(tier),
        rate,
        change,
    }
}
