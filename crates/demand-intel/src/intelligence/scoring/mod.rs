//! Rules-based household demand scoring.
//!
//! Each service category maps to a fixed rule table. Rules only ever add
//! points; the final score is clamped to `[0, 100]`.

mod rules;

use serde::{Deserialize, Serialize};

use super::domain::{Household, ServiceCategory};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Attribute that contributed to a demand score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Ownership,
    LotSize,
    PropertyType,
    PropertySize,
    Income,
}

/// Discrete contribution to a score, kept for audits and report drill-downs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: f64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub category: ServiceCategory,
    pub base: f64,
    pub components: Vec<ScoreComponent>,
    pub raw_total: f64,
    pub score: f64,
}

/// Demand score for `household` in `category`, in `[0, 100]`.
pub fn score(household: &Household, category: ServiceCategory) -> f64 {
    let tally = rules::rule_for(category)(household);
    clamp_score(tally.raw_total())
}

/// Same as [`score`] but keeps every component that fired.
pub fn breakdown(household: &Household, category: ServiceCategory) -> ScoreBreakdown {
    let tally = rules::rule_for(category)(household);
    let raw_total = tally.raw_total();

    ScoreBreakdown {
        category,
        base: tally.base,
        components: tally.components,
        raw_total,
        score: clamp_score(raw_total),
    }
}

pub fn clamp_score(value: f64) -> f64 {
    value.clamp(MIN_SCORE, MAX_SCORE)
}

/// Mean score across `households`, or 0.0 when empty.
pub fn average_score(households: &[Household], category: ServiceCategory) -> f64 {
    if households.is_empty() {
        return 0.0;
    }

    let total: f64 = households
        .iter()
        .map(|household| score(household, category))
        .sum();
    total / households.len() as f64
}
