use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;

use super::domain::{ClientId, GeographyId, Household, ServiceCategory, ZipCodeId};
use super::profile::{build_profile, BuyerProfile};
use super::recommendations::{
    channel_recommendations, timing_recommendations, ChannelRecommendation, TimingRecommendation,
};
use super::scoring::{self, MAX_SCORE, MIN_SCORE};
use super::store::{HouseholdQuery, IntelligenceStore, ZipLookup};
use super::zips::{self, demographic_boost, ZipRanking};
use super::IntelligenceError;

const DEFAULT_REPORT_LIMIT: usize = 50;
const MAX_REPORT_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("rpt-{id:06}"))
}

/// Inbound request for a persisted intelligence report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub geography_id: GeographyId,
    /// Comma-separated ZIP strings.
    pub zip_codes: String,
    pub service_category: String,
    #[serde(default)]
    pub report_name: Option<String>,
}

/// Ad-hoc buyer profile request; nothing is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub geography_id: Option<GeographyId>,
    #[serde(default)]
    pub zip_codes: Option<String>,
    #[serde(default = "default_category")]
    pub service_category: String,
    #[serde(default)]
    pub min_demand_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZipRankingRequest {
    pub zip_codes: String,
    #[serde(default = "default_category")]
    pub service_category: String,
    #[serde(default)]
    pub top_n: Option<usize>,
}

fn default_category() -> String {
    ServiceCategory::General.as_str().to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFilter {
    #[serde(default)]
    pub geography_id: Option<GeographyId>,
    #[serde(default)]
    pub service_category: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

impl ReportFilter {
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_REPORT_LIMIT)
            .min(MAX_REPORT_LIMIT)
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    /// Parsed category filter, accepting the same spellings as requests.
    pub fn category(&self) -> Result<Option<ServiceCategory>, IntelligenceError> {
        self.service_category
            .as_deref()
            .map(str::parse::<ServiceCategory>)
            .transpose()
    }

    pub fn matches(&self, report: &IntelligenceReport) -> bool {
        let geography_ok = self
            .geography_id
            .map(|id| report.geography_id == id)
            .unwrap_or(true);
        let category_ok = match self.category() {
            Ok(Some(category)) => report.service_category == category,
            Ok(None) => true,
            Err(_) => false,
        };
        geography_ok && category_ok
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelligenceReport {
    pub id: ReportId,
    pub client_id: ClientId,
    pub geography_id: GeographyId,
    pub zip_codes: String,
    pub service_category: ServiceCategory,
    pub report_name: String,
    pub generated_at: DateTime<Utc>,
    pub total_households: usize,
    pub target_households: usize,
    pub average_demand_score: f64,
    pub buyer_profile: BuyerProfile,
    pub zip_demand_scores: BTreeMap<String, f64>,
    pub top_zip_codes: Vec<ZipRanking>,
    pub channel_recommendations: Vec<ChannelRecommendation>,
    pub timing_recommendations: Vec<TimingRecommendation>,
}

/// Application-facing facade over the store and the scoring functions.
pub struct IntelligenceService<S> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S> IntelligenceService<S>
where
    S: IntelligenceStore + 'static,
{
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Households of a tenant whose signal-boosted score reaches
    /// `min_demand_score`. The boost is not clamped here, and only signals
    /// carrying the same geography as the request count toward it (a request
    /// without a geography only sees signals without one).
    pub fn select_households(
        &self,
        client_id: &ClientId,
        geography_id: Option<GeographyId>,
        zip_code_ids: Option<Vec<ZipCodeId>>,
        category: ServiceCategory,
        min_demand_score: f64,
    ) -> Result<Vec<Household>, IntelligenceError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&min_demand_score) {
            return Err(IntelligenceError::InvalidScoreThreshold(min_demand_score));
        }

        let query = HouseholdQuery {
            geography_id,
            zip_code_ids,
        };
        let households = self.store.fetch_households(client_id, &query)?;

        let mut zip_ids: Vec<ZipCodeId> = households
            .iter()
            .filter_map(|household| household.zip_code_id)
            .collect();
        zip_ids.sort();
        zip_ids.dedup();
        let mut signals = self.store.fetch_demographic_signals(client_id, &zip_ids)?;
        signals.retain(|signal| signal.geography_id == geography_id);

        let selected: Vec<Household> = households
            .into_iter()
            .filter(|household| {
                let boost = match household.zip_code_id {
                    Some(zip_id) => {
                        demographic_boost(
                            signals
                                .iter()
                                .filter(|signal| signal.zip_code_id == Some(zip_id)),
                        )
                        .points
                    }
                    None => 0.0,
                };
                scoring::score(household, category) + boost >= min_demand_score
            })
            .collect();

        debug!(
            client = %client_id,
            category = %category,
            selected = selected.len(),
            min_demand_score,
            "selected households"
        );
        Ok(selected)
    }

    pub fn buyer_profile(
        &self,
        client_id: &ClientId,
        request: &ProfileRequest,
    ) -> Result<BuyerProfile, IntelligenceError> {
        let category: ServiceCategory = request.service_category.parse()?;
        let zip_code_ids = match request.zip_codes.as_deref() {
            Some(raw) => Some(self.resolve_zip_codes(raw)?),
            None => None,
        };

        let households = self.select_households(
            client_id,
            request.geography_id,
            zip_code_ids,
            category,
            request.min_demand_score,
        )?;
        Ok(build_profile(&households, category))
    }

    pub fn zip_scores(
        &self,
        client_id: &ClientId,
        zip_code_ids: &[ZipCodeId],
        category: ServiceCategory,
    ) -> Result<BTreeMap<String, f64>, IntelligenceError> {
        Ok(zips::zip_scores(
            self.store.as_ref(),
            client_id,
            zip_code_ids,
            category,
        )?)
    }

    pub fn rank_zips(
        &self,
        client_id: &ClientId,
        zip_code_ids: &[ZipCodeId],
        category: ServiceCategory,
        top_n: usize,
    ) -> Result<Vec<ZipRanking>, IntelligenceError> {
        Ok(zips::rank_zips(
            self.store.as_ref(),
            client_id,
            zip_code_ids,
            category,
            top_n,
        )?)
    }

    pub fn rank_zip_codes(
        &self,
        client_id: &ClientId,
        request: &ZipRankingRequest,
    ) -> Result<Vec<ZipRanking>, IntelligenceError> {
        let category: ServiceCategory = request.service_category.parse()?;
        let zip_code_ids = self.resolve_zip_codes(&request.zip_codes)?;
        let top_n = request.top_n.unwrap_or(self.config.top_zips);
        self.rank_zips(client_id, &zip_code_ids, category, top_n)
    }

    /// Assemble and persist a full report for one of the tenant's geographies.
    pub fn generate_report(
        &self,
        client_id: &ClientId,
        request: ReportRequest,
    ) -> Result<IntelligenceReport, IntelligenceError> {
        self.store
            .fetch_geography(client_id, request.geography_id)?
            .ok_or(IntelligenceError::GeographyNotFound(request.geography_id))?;

        let zip_code_ids = self.resolve_zip_codes(&request.zip_codes)?;
        let category: ServiceCategory = request.service_category.parse()?;

        let households = self.select_households(
            client_id,
            Some(request.geography_id),
            Some(zip_code_ids.clone()),
            category,
            MIN_SCORE,
        )?;

        let buyer_profile = build_profile(&households, category);
        let zip_demand_scores = self.zip_scores(client_id, &zip_code_ids, category)?;
        let top_zip_codes =
            self.rank_zips(client_id, &zip_code_ids, category, self.config.top_zips)?;
        let average_demand_score = scoring::average_score(&households, category);

        let channels = self
            .store
            .fetch_channels(client_id, Some(request.geography_id))?;
        let channel_recommendations = channel_recommendations(&buyer_profile, category, &channels);
        let timing_recommendations = timing_recommendations(category, average_demand_score);

        let report = IntelligenceReport {
            id: next_report_id(),
            client_id: client_id.clone(),
            geography_id: request.geography_id,
            zip_codes: request.zip_codes,
            service_category: category,
            report_name: request
                .report_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| format!("{} Report", category.as_str())),
            generated_at: Utc::now(),
            total_households: buyer_profile.total_households,
            target_households: buyer_profile.target_households,
            average_demand_score,
            buyer_profile,
            zip_demand_scores,
            top_zip_codes,
            channel_recommendations,
            timing_recommendations,
        };

        let stored = self.store.insert_report(report)?;
        info!(
            client = %client_id,
            report = %stored.id.0,
            category = %category,
            households = stored.total_households,
            "intelligence report generated"
        );
        Ok(stored)
    }

    pub fn get_report(
        &self,
        client_id: &ClientId,
        id: &ReportId,
    ) -> Result<IntelligenceReport, IntelligenceError> {
        self.store
            .fetch_report(client_id, id)?
            .ok_or(IntelligenceError::ReportNotFound)
    }

    pub fn list_reports(
        &self,
        client_id: &ClientId,
        filter: &ReportFilter,
    ) -> Result<Vec<IntelligenceReport>, IntelligenceError> {
        filter.category()?;
        Ok(self.store.list_reports(client_id, filter)?)
    }

    /// Resolve comma-separated ZIP strings to ids, dropping unknown ZIPs.
    pub fn resolve_zip_codes(&self, raw: &str) -> Result<Vec<ZipCodeId>, IntelligenceError> {
        let mut ids = Vec::new();
        for code in raw.split(',').map(str::trim).filter(|code| !code.is_empty()) {
            match self.store.fetch_zip_code(ZipLookup::Code(code))? {
                Some(zip) => ids.push(zip.id),
                None => debug!(zip = code, "unknown ZIP code dropped from request"),
            }
        }
        Ok(ids)
    }
}
