use std::sync::{Arc, Mutex};

use crate::ingest::Dataset;

use super::domain::{
    Channel, ClientId, DemandSignal, Geography, GeographyId, Household, SignalType, ZipCode,
    ZipCodeId,
};
use super::report::{IntelligenceReport, ReportFilter, ReportId};
use super::store::{HouseholdQuery, IntelligenceStore, StoreError, ZipLookup};

/// Store backed by the rows of a loaded [`Dataset`]. Reference data is
/// immutable once built; only reports are appended at runtime.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    dataset: Arc<Dataset>,
    reports: Arc<Mutex<Vec<IntelligenceReport>>>,
}

impl InMemoryStore {
    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
            reports: Arc::default(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn report_count(&self) -> usize {
        self.reports.lock().expect("report mutex poisoned").len()
    }
}

impl IntelligenceStore for InMemoryStore {
    fn fetch_households(
        &self,
        client_id: &ClientId,
        query: &HouseholdQuery,
    ) -> Result<Vec<Household>, StoreError> {
        Ok(self
            .dataset
            .households
            .iter()
            .filter(|household| &household.client_id == client_id && query.matches(household))
            .cloned()
            .collect())
    }

    fn fetch_zip_code(&self, lookup: ZipLookup<'_>) -> Result<Option<ZipCode>, StoreError> {
        let found = self.dataset.zip_codes.iter().find(|zip| match lookup {
            ZipLookup::Id(id) => zip.id == id,
            ZipLookup::Code(code) => zip.zip_code == code.trim(),
        });
        Ok(found.cloned())
    }

    fn fetch_demographic_signals(
        &self,
        client_id: &ClientId,
        zip_code_ids: &[ZipCodeId],
    ) -> Result<Vec<DemandSignal>, StoreError> {
        Ok(self
            .dataset
            .signals
            .iter()
            .filter(|signal| {
                &signal.client_id == client_id
                    && signal.signal_type == SignalType::Demographic
                    && signal
                        .zip_code_id
                        .map(|zip| zip_code_ids.contains(&zip))
                        .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    fn fetch_geography(
        &self,
        client_id: &ClientId,
        geography_id: GeographyId,
    ) -> Result<Option<Geography>, StoreError> {
        Ok(self
            .dataset
            .geographies
            .iter()
            .find(|geography| geography.id == geography_id && &geography.client_id == client_id)
            .cloned())
    }

    fn fetch_channels(
        &self,
        client_id: &ClientId,
        geography_id: Option<GeographyId>,
    ) -> Result<Vec<Channel>, StoreError> {
        Ok(self
            .dataset
            .channels
            .iter()
            .filter(|channel| &channel.client_id == client_id && channel.geography_id == geography_id)
            .cloned()
            .collect())
    }

    fn insert_report(&self, report: IntelligenceReport) -> Result<IntelligenceReport, StoreError> {
        let mut guard = self.reports.lock().expect("report mutex poisoned");
        if guard.iter().any(|existing| existing.id == report.id) {
            return Err(StoreError::Conflict);
        }
        guard.push(report.clone());
        Ok(report)
    }

    fn fetch_report(
        &self,
        client_id: &ClientId,
        id: &ReportId,
    ) -> Result<Option<IntelligenceReport>, StoreError> {
        let guard = self.reports.lock().expect("report mutex poisoned");
        Ok(guard
            .iter()
            .find(|report| &report.id == id && &report.client_id == client_id)
            .cloned())
    }

    fn list_reports(
        &self,
        client_id: &ClientId,
        filter: &ReportFilter,
    ) -> Result<Vec<IntelligenceReport>, StoreError> {
        let guard = self.reports.lock().expect("report mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .filter(|report| &report.client_id == client_id && filter.matches(report))
            .skip(filter.offset())
            .take(filter.limit())
            .cloned()
            .collect())
    }
}
