//! Demand scoring, buyer profiles, ZIP ranking and report assembly.

pub mod domain;
pub mod memory;
pub mod profile;
pub mod recommendations;
pub mod report;
pub mod router;
pub mod scoring;
pub mod store;
pub mod zips;

#[cfg(test)]
mod tests;

pub use domain::{
    Channel, ChannelType, ClientId, DemandSignal, Geography, GeographyId, Household, HouseholdId,
    NeighborhoodId, OwnershipType, PropertyType, ServiceCategory, SignalType, ZipCode, ZipCodeId,
};
pub use memory::InMemoryStore;
pub use profile::{build_profile, BuyerProfile, IncomeDistribution};
pub use recommendations::{ChannelRecommendation, TimingRecommendation};
pub use report::{
    IntelligenceReport, IntelligenceService, ProfileRequest, ReportFilter, ReportId,
    ReportRequest, ZipRankingRequest,
};
pub use router::{intelligence_router, CLIENT_ID_HEADER};
pub use scoring::{breakdown, score, ScoreBreakdown, ScoreComponent, ScoreFactor};
pub use store::{HouseholdQuery, IntelligenceStore, StoreError, ZipLookup};
pub use zips::{rank_zips, zip_scores, ZipRanking};

/// Failures surfaced by the intelligence service.
#[derive(Debug, thiserror::Error)]
pub enum IntelligenceError {
    #[error("invalid service category '{0}'")]
    InvalidCategory(String),
    #[error("geography {0} not found")]
    GeographyNotFound(GeographyId),
    #[error("report not found")]
    ReportNotFound,
    #[error("min_demand_score must be between 0 and 100 (got {0})")]
    InvalidScoreThreshold(f64),
    #[error(transparent)]
    Store(#[from] StoreError),
}
