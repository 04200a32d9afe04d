//! Shared primitive types used across the entire simulation.

/// A whole-unit amount of in-game money. Signed so that deltas and
/// effects share the type with balances; balances are clamped at 0.
pub type Money = i64;

/// A simulation turn. One turn = one in-game month, 1-based.
pub type Turn = u32;

/// Stable key of an asset in the asset catalog (e.g. "shelly").
pub type AssetKey = String;

/// Stable identifier of a life event in the event catalog.
pub type EventId = String;

/// Stable key of a savings goal (e.g. "bike").
pub type GoalKey = String;

/// The canonical run identifier.
pub type RunId = String;
