use super::domain::{
    Channel, ClientId, DemandSignal, Geography, GeographyId, Household, ZipCode, ZipCodeId,
};
use super::report::{IntelligenceReport, ReportFilter, ReportId};

/// Filters applied when loading a tenant's households.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HouseholdQuery {
    pub geography_id: Option<GeographyId>,
    /// `None` or an empty list means "any ZIP".
    pub zip_code_ids: Option<Vec<ZipCodeId>>,
}

impl HouseholdQuery {
    pub fn in_zip(zip_code_id: ZipCodeId) -> Self {
        Self {
            geography_id: None,
            zip_code_ids: Some(vec![zip_code_id]),
        }
    }

    pub fn matches(&self, household: &Household) -> bool {
        if let Some(geography_id) = self.geography_id {
            if household.geography_id != Some(geography_id) {
                return false;
            }
        }

        match self.zip_code_ids.as_deref() {
            Some(ids) if !ids.is_empty() => household
                .zip_code_id
                .map(|zip| ids.contains(&zip))
                .unwrap_or(false),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZipLookup<'a> {
    Id(ZipCodeId),
    Code(&'a str),
}

/// Read access to the relational data the engine works on, plus report
/// persistence. Every tenant-owned read takes the client id.
pub trait IntelligenceStore: Send + Sync {
    fn fetch_households(
        &self,
        client_id: &ClientId,
        query: &HouseholdQuery,
    ) -> Result<Vec<Household>, StoreError>;

    fn fetch_zip_code(&self, lookup: ZipLookup<'_>) -> Result<Option<ZipCode>, StoreError>;

    /// Demographic signals only.
    fn fetch_demographic_signals(
        &self,
        client_id: &ClientId,
        zip_code_ids: &[ZipCodeId],
    ) -> Result<Vec<DemandSignal>, StoreError>;

    fn fetch_geography(
        &self,
        client_id: &ClientId,
        geography_id: GeographyId,
    ) -> Result<Option<Geography>, StoreError>;

    fn fetch_channels(
        &self,
        client_id: &ClientId,
        geography_id: Option<GeographyId>,
    ) -> Result<Vec<Channel>, StoreError>;

    fn insert_report(&self, report: IntelligenceReport) -> Result<IntelligenceReport, StoreError>;

    fn fetch_report(
        &self,
        client_id: &ClientId,
        id: &ReportId,
    ) -> Result<Option<IntelligenceReport>, StoreError>;

    fn list_reports(
        &self,
        client_id: &ClientId,
        filter: &ReportFilter,
    ) -> Result<Vec<IntelligenceReport>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
