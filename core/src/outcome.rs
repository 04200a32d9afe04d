//! Outcome analyzer: end-of-game summary, best asset, and lessons.
//!
//! Lessons come from an ordered rule table evaluated against the final
//! stats. Matches accumulate in table order, the list is capped at
//! MAX_LESSONS, and `Patience` is the fallback when nothing matched.
//! Assets are referenced by risk level (first of each level in catalog
//! order), so the table does not depend on catalog keys.

use crate::{
    asset_catalog::{Asset, AssetCatalog, RiskLevel},
    state::{AssetStats, GameOutcome, SimulationState, Stats},
    types::{AssetKey, GoalKey, Money, Turn},
};
use serde::{Deserialize, Serialize};

pub const MAX_LESSONS: usize = 3;

/// Risky-asset gain (as a fraction of invested) that counts as a windfall.
pub const WINDFALL_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LessonId {
    SafeGrowth,
    SafeIgnored,
    RiskyLoss,
    RiskyWindfall,
    DangerousLoss,
    DangerousAvoided,
    FomoSpending,
    FomoResisted,
    ScamsFallenFor,
    ScamsAvoided,
    Patience,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
    pub id:   LessonId,
    pub text: String,
}

/// What lesson predicates get to look at.
pub struct LessonContext<'a> {
    pub stats:   &'a Stats,
    pub catalog: &'a AssetCatalog,
}

impl<'a> LessonContext<'a> {
    pub fn new(stats: &'a Stats, catalog: &'a AssetCatalog) -> Self {
        Self { stats, catalog }
    }

    fn asset(&self, risk: RiskLevel) -> Option<(&'a Asset, AssetStats)> {
        self.catalog
            .first_with_risk(risk)
            .map(|a| (a, self.stats.asset(&a.key)))
    }

    fn asset_matches(&self, risk: RiskLevel, pred: impl Fn(AssetStats) -> bool) -> bool {
        self.asset(risk).is_some_and(|(_, s)| pred(s))
    }

    fn name_of(&self, risk: RiskLevel, fallback: &str) -> String {
        self.asset(risk)
            .map_or_else(|| fallback.to_string(), |(a, _)| a.name.clone())
    }
}

type LessonRule = (LessonId, fn(&LessonContext) -> bool);

/// Priority-ordered rule table.
pub const LESSON_RULES: &[LessonRule] = &[
    (LessonId::SafeGrowth,       safe_growth),
    (LessonId::SafeIgnored,      safe_ignored),
    (LessonId::RiskyLoss,        risky_loss),
    (LessonId::RiskyWindfall,    risky_windfall),
    (LessonId::DangerousLoss,    dangerous_loss),
    (LessonId::DangerousAvoided, dangerous_avoided),
    (LessonId::FomoSpending,     fomo_spending),
    (LessonId::FomoResisted,     fomo_resisted),
    (LessonId::ScamsFallenFor,   scams_fallen_for),
    (LessonId::ScamsAvoided,     scams_avoided),
];

fn safe_growth(c: &LessonContext) -> bool {
    c.asset_matches(RiskLevel::Safe, |s| s.invested > 0 && s.returns > 0)
}

fn safe_ignored(c: &LessonContext) -> bool {
    c.asset_matches(RiskLevel::Safe, |s| s.invested == 0)
}

fn risky_loss(c: &LessonContext) -> bool {
    c.asset_matches(RiskLevel::Risky, |s| s.invested > 0 && s.returns < 0)
}

fn risky_windfall(c: &LessonContext) -> bool {
    c.asset_matches(RiskLevel::Risky, |s| {
        s.invested > 0 && s.returns as f64 > s.invested as f64 * WINDFALL_THRESHOLD
    })
}

fn dangerous_loss(c: &LessonContext) -> bool {
    c.asset_matches(RiskLevel::Dangerous, |s| s.invested > 0 && s.returns < 0)
}

fn dangerous_avoided(c: &LessonContext) -> bool {
    c.asset_matches(RiskLevel::Dangerous, |s| s.invested == 0)
}

fn fomo_spending(c: &LessonContext) -> bool {
    c.stats.fomo_gave_in > 0
}

fn fomo_resisted(c: &LessonContext) -> bool {
    c.stats.fomo_gave_in == 0 && c.stats.fomo_resisted > 0
}

fn scams_fallen_for(c: &LessonContext) -> bool {
    c.stats.scams_fell_for > 0
}

fn scams_avoided(c: &LessonContext) -> bool {
    c.stats.scams_fell_for == 0 && c.stats.scams_avoided > 0
}

impl LessonId {
    pub fn render(&self, ctx: &LessonContext) -> String {
        let safe = || ctx.name_of(RiskLevel::Safe, "The safe option");
        let risky = || ctx.name_of(RiskLevel::Risky, "The risky option");
        let dangerous = || ctx.name_of(RiskLevel::Dangerous, "The mystery option");
        match self {
            Self::SafeGrowth => format!(
                "{} helped your money grow slowly but surely. Boring can be beautiful!",
                safe()
            ),
            Self::SafeIgnored => format!(
                "You didn't use {} much. Safe investments seem boring, but they add up!",
                safe()
            ),
            Self::RiskyLoss => format!(
                "{} was exciting, but you lost money. Big risks often mean big losses.",
                risky()
            ),
            Self::RiskyWindfall => format!(
                "You got lucky with {}! That doesn't happen often, so don't count on it next time.",
                risky()
            ),
            Self::DangerousLoss => format!(
                "{} took your money. Flashy packaging is there to hide bad odds.",
                dangerous()
            ),
            Self::DangerousAvoided => format!(
                "Smart move staying away from {}! The excitement hides the bad odds.",
                dangerous()
            ),
            Self::FomoSpending => "You bought things because everyone else had them. That's FOMO, \
                 and it's a powerful trick!"
                .to_string(),
            Self::FomoResisted => "You didn't buy things just because everyone else had them. \
                 That takes real strength!"
                .to_string(),
            Self::ScamsFallenFor => "You took a 'can't miss' deal. If it sounds too good to be \
                 true, it usually is."
                .to_string(),
            Self::ScamsAvoided => "You spotted the too-good-to-be-true deals and walked away. \
                 Scammers hate that!"
                .to_string(),
            Self::Patience => "You waited patiently and let your investments grow. Time is \
                 the secret ingredient!"
                .to_string(),
        }
    }
}

/// Evaluate the rule table. Deterministic for a given stats snapshot.
pub fn derive_lessons(ctx: &LessonContext) -> Vec<Lesson> {
    let mut ids: Vec<LessonId> = LESSON_RULES
        .iter()
        .filter(|(_, applies)| applies(ctx))
        .map(|(id, _)| *id)
        .take(MAX_LESSONS)
        .collect();
    if ids.is_empty() {
        ids.push(LessonId::Patience);
    }
    ids.into_iter()
        .map(|id| Lesson { id, text: id.render(ctx) })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BestAsset {
    pub key:  AssetKey,
    pub name: String,
    pub roi:  f64,
}

/// Highest ROI among invested assets. Ties keep the first in catalog order.
pub fn best_asset(stats: &Stats, catalog: &AssetCatalog) -> Option<BestAsset> {
    let mut best: Option<BestAsset> = None;
    for asset in catalog.iter() {
        let Some(roi) = stats.asset(&asset.key).roi() else { continue };
        if best.as_ref().map_or(true, |b| roi > b.roi) {
            best = Some(BestAsset {
                key:  asset.key.clone(),
                name: asset.display_name(),
                roi,
            });
        }
    }
    best
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSummary {
    pub outcome:     GameOutcome,
    pub final_money: Money,
    pub goal:        Money,
    pub goal_key:    GoalKey,
    pub turn:        Turn,
    pub best_asset:  Option<BestAsset>,
    pub lessons:     Vec<Lesson>,
    pub stats:       Stats,
    /// Leaderboard position, when the entry was recorded and made the cut.
    pub rank:        Option<usize>,
}

pub fn summarize(state: &SimulationState, catalog: &AssetCatalog, outcome: GameOutcome) -> GameSummary {
    let ctx = LessonContext::new(&state.stats, catalog);
    GameSummary {
        outcome,
        final_money: state.money,
        goal: state.goal,
        goal_key: state.goal_key.clone(),
        turn: state.turn(),
        best_asset: best_asset(&state.stats, catalog),
        lessons: derive_lessons(&ctx),
        stats: state.stats.clone(),
        rank: None,
    }
}
