//! Per-ZIP demand aggregation, demographic boosts, and ranked rationale.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{ClientId, DemandSignal, Household, ServiceCategory, ZipCode, ZipCodeId};
use super::profile::percentage;
use super::scoring::{self, clamp_score};
use super::store::{HouseholdQuery, IntelligenceStore, StoreError, ZipLookup};

const HIGH_DEMAND_THRESHOLD: f64 = 70.0;
const MODERATE_DEMAND_THRESHOLD: f64 = 50.0;
const LARGE_POPULATION: u64 = 20_000;
const MODERATE_POPULATION: u64 = 10_000;
const HOMEOWNER_SHARE_PCT: f64 = 60.0;
const LARGE_LOT_SQFT: u32 = 5_000;
const LARGE_LOT_SHARE_PCT: f64 = 30.0;

/// Ranked ZIP entry with the human-readable reasoning behind its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZipRanking {
    pub zip_code: String,
    pub score: f64,
    pub rationale: String,
    pub population: Option<u64>,
    pub household_count: Option<u64>,
    pub median_income: Option<u64>,
}

/// Additive boost from demographic income signals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct DemographicBoost {
    pub points: f64,
    /// At least one income signal cleared a threshold.
    pub income_signal: bool,
}

/// Income signals over $75k add 5 points and over $50k add 2. Each
/// qualifying signal counts, so several signals compound.
pub(crate) fn demographic_boost<'a, I>(signals: I) -> DemographicBoost
where
    I: IntoIterator<Item = &'a DemandSignal>,
{
    let mut boost = DemographicBoost::default();
    for signal in signals {
        if !signal.is_income_signal() {
            continue;
        }
        match signal.value {
            Some(value) if value > 75_000.0 => {
                boost.points += 5.0;
                boost.income_signal = true;
            }
            Some(value) if value > 50_000.0 => {
                boost.points += 2.0;
                boost.income_signal = true;
            }
            _ => {}
        }
    }
    boost
}

pub(crate) fn round_score(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

struct ZipEvaluation {
    zip: ZipCode,
    households: Vec<Household>,
    boost: DemographicBoost,
    score: f64,
}

impl ZipEvaluation {
    fn owner_share_pct(&self) -> f64 {
        let owners = self
            .households
            .iter()
            .filter(|household| household.is_owner())
            .count();
        percentage(owners, self.households.len())
    }

    fn large_lot_share_pct(&self) -> f64 {
        let large = self
            .households
            .iter()
            .filter(|household| {
                household
                    .known_lot_size()
                    .map(|lot| lot > LARGE_LOT_SQFT)
                    .unwrap_or(false)
            })
            .count();
        percentage(large, self.households.len())
    }
}

fn evaluate_zips<S>(
    store: &S,
    client_id: &ClientId,
    zip_code_ids: &[ZipCodeId],
    category: ServiceCategory,
) -> Result<Vec<ZipEvaluation>, StoreError>
where
    S: IntelligenceStore + ?Sized,
{
    let mut seen = HashSet::new();
    let requested: Vec<ZipCodeId> = zip_code_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    let signals = store.fetch_demographic_signals(client_id, &requested)?;
    let mut evaluations = Vec::with_capacity(requested.len());

    for zip_id in requested {
        let Some(zip) = store.fetch_zip_code(ZipLookup::Id(zip_id))? else {
            debug!(zip_code_id = zip_id.0, "requested ZIP not found; skipping");
            continue;
        };

        let households = store.fetch_households(client_id, &HouseholdQuery::in_zip(zip_id))?;
        let (boost, score) = if households.is_empty() {
            (DemographicBoost::default(), 0.0)
        } else {
            let mean = scoring::average_score(&households, category);
            let boost = demographic_boost(
                signals
                    .iter()
                    .filter(|signal| signal.zip_code_id == Some(zip_id)),
            );
            (boost, round_score(clamp_score(mean + boost.points)))
        };

        debug!(
            zip = %zip.zip_code,
            households = households.len(),
            boost = boost.points,
            score,
            "scored ZIP"
        );

        evaluations.push(ZipEvaluation {
            zip,
            households,
            boost,
            score,
        });
    }

    Ok(evaluations)
}

/// Adjusted demand score per requested ZIP code. ZIPs without households
/// score 0.0; ids unknown to the store are left out.
pub fn zip_scores<S>(
    store: &S,
    client_id: &ClientId,
    zip_code_ids: &[ZipCodeId],
    category: ServiceCategory,
) -> Result<BTreeMap<String, f64>, StoreError>
where
    S: IntelligenceStore + ?Sized,
{
    Ok(evaluate_zips(store, client_id, zip_code_ids, category)?
        .into_iter()
        .map(|evaluation| (evaluation.zip.zip_code, evaluation.score))
        .collect())
}

/// Top `top_n` ZIPs by adjusted score, ties keeping request order.
pub fn rank_zips<S>(
    store: &S,
    client_id: &ClientId,
    zip_code_ids: &[ZipCodeId],
    category: ServiceCategory,
    top_n: usize,
) -> Result<Vec<ZipRanking>, StoreError>
where
    S: IntelligenceStore + ?Sized,
{
    let mut evaluations = evaluate_zips(store, client_id, zip_code_ids, category)?;
    evaluations.sort_by(|a, b| b.score.total_cmp(&a.score));

    Ok(evaluations
        .into_iter()
        .take(top_n)
        .map(|evaluation| {
            let rationale = rationale(&evaluation, category);
            ZipRanking {
                zip_code: evaluation.zip.zip_code,
                score: evaluation.score,
                rationale,
                population: evaluation.zip.population,
                household_count: evaluation.zip.household_count,
                median_income: evaluation.zip.median_income,
            }
        })
        .collect())
}

fn rationale(evaluation: &ZipEvaluation, category: ServiceCategory) -> String {
    let mut sentences = Vec::new();

    if evaluation.score >= HIGH_DEMAND_THRESHOLD {
        sentences.push(format!(
            "High demand score ({:.1}) for {} services",
            evaluation.score,
            category.label()
        ));
    } else if evaluation.score >= MODERATE_DEMAND_THRESHOLD {
        sentences.push(format!(
            "Moderate to high demand score ({:.1})",
            evaluation.score
        ));
    } else {
        sentences.push("Lower demand but still viable".to_string());
    }

    if evaluation.boost.income_signal {
        sentences.push("Demographic data indicates higher household incomes".to_string());
    }

    match evaluation.zip.population {
        Some(population) if population > LARGE_POPULATION => {
            sentences.push(format!("Large population base ({population} residents)"));
        }
        Some(population) if population > MODERATE_POPULATION => {
            sentences.push(format!("Moderate population base ({population} residents)"));
        }
        _ => {}
    }

    if !evaluation.households.is_empty() {
        let owner_share = evaluation.owner_share_pct();
        if owner_share > HOMEOWNER_SHARE_PCT {
            sentences.push(format!(
                "High percentage of homeowners ({owner_share:.0}%)"
            ));
        }

        let large_lot_share = evaluation.large_lot_share_pct();
        if large_lot_share > LARGE_LOT_SHARE_PCT {
            sentences.push(format!(
                "Many properties with large lots ({large_lot_share:.0}% over {LARGE_LOT_SQFT} sqft)"
            ));
        }
    }

    if sentences.is_empty() {
        return "Meets baseline criteria for targeted outreach".to_string();
    }

    sentences.join(". ")
}
