use std::sync::Arc;

use axum::response::Response;
use axum::Router;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::ingest::Dataset;
use crate::intelligence::domain::{
    Channel, ChannelType, ClientId, DemandSignal, Geography, GeographyId, Household, HouseholdId,
    OwnershipType, PropertyType, ServiceCategory, SignalType, ZipCode, ZipCodeId,
};
use crate::intelligence::report::{IntelligenceReport, ReportFilter, ReportId};
use crate::intelligence::store::{HouseholdQuery, IntelligenceStore, StoreError, ZipLookup};
use crate::intelligence::{intelligence_router, InMemoryStore, IntelligenceService};

pub(super) const ACME: &str = "acme";
pub(super) const RIVAL: &str = "rival";

pub(super) fn acme() -> ClientId {
    ClientId::new(ACME)
}

pub(super) fn rival() -> ClientId {
    ClientId::new(RIVAL)
}

/// Household with every optional attribute unknown.
pub(super) fn blank_household(id: u64) -> Household {
    Household {
        id: HouseholdId(id),
        client_id: acme(),
        ownership_type: OwnershipType::Unknown,
        property_type: PropertyType::Unknown,
        lot_size_sqft: None,
        property_sqft_min: None,
        property_sqft_max: None,
        income_band_min: None,
        income_band_max: None,
        property_age_years: None,
        last_sale_year: None,
        geography_id: None,
        zip_code_id: None,
        neighborhood_id: None,
    }
}

/// Owner of a single-family home on an 8,000 sqft lot earning $80k-$100k.
/// Scores 90 for lawn care and general, 85 for security.
pub(super) fn owner_household(id: u64, zip: u32) -> Household {
    Household {
        ownership_type: OwnershipType::Owner,
        property_type: PropertyType::SingleFamily,
        lot_size_sqft: Some(8_000),
        property_sqft_min: Some(1_800),
        property_sqft_max: Some(2_400),
        income_band_min: Some(80_000),
        income_band_max: Some(100_000),
        property_age_years: Some(20),
        last_sale_year: Some(2016),
        geography_id: Some(GeographyId(1)),
        zip_code_id: Some(ZipCodeId(zip)),
        ..blank_household(id)
    }
}

/// Apartment renter earning $30k-$40k. Scores 10 for lawn care, 50 for general.
pub(super) fn renter_household(id: u64, zip: u32) -> Household {
    Household {
        ownership_type: OwnershipType::Renter,
        property_type: PropertyType::Apartment,
        income_band_min: Some(30_000),
        income_band_max: Some(40_000),
        property_age_years: Some(45),
        geography_id: Some(GeographyId(1)),
        zip_code_id: Some(ZipCodeId(zip)),
        ..blank_household(id)
    }
}

pub(super) fn zip(id: u32, code: &str, population: Option<u64>) -> ZipCode {
    ZipCode {
        id: ZipCodeId(id),
        zip_code: code.to_string(),
        geography_id: Some(GeographyId(1)),
        population,
        household_count: population.map(|people| people / 2),
        median_income: Some(72_000),
        median_age: Some(36.4),
    }
}

pub(super) fn income_signal(id: u64, zip: u32, value: f64) -> DemandSignal {
    DemandSignal {
        id,
        client_id: acme(),
        signal_type: SignalType::Demographic,
        service_category: ServiceCategory::General,
        title: Some("Median household income".to_string()),
        value: Some(value),
        metadata: Some("census median income".to_string()),
        geography_id: Some(GeographyId(1)),
        zip_code_id: Some(ZipCodeId(zip)),
    }
}

/// Acme owns geography 1 with three ZIPs:
/// - 50309: three owners, one renter and a $90k income signal (lawn care 75.0)
/// - 50310: one owner, two renters (lawn care 36.67)
/// - 50311: no households (0.0)
///
/// Rival owns geography 2 and a household in 50309 that acme must never see.
pub(super) fn seeded_dataset() -> Dataset {
    let rival_household = Household {
        client_id: rival(),
        geography_id: Some(GeographyId(2)),
        ..renter_household(100, 1)
    };

    Dataset {
        geographies: vec![
            Geography {
                id: GeographyId(1),
                client_id: acme(),
                name: "Des Moines Metro".to_string(),
                geo_type: "metro".to_string(),
                state_code: "IA".to_string(),
            },
            Geography {
                id: GeographyId(2),
                client_id: rival(),
                name: "Ames".to_string(),
                geo_type: "city".to_string(),
                state_code: "IA".to_string(),
            },
        ],
        zip_codes: vec![
            zip(1, "50309", Some(25_000)),
            zip(2, "50310", Some(12_000)),
            zip(3, "50311", Some(5_000)),
        ],
        households: vec![
            owner_household(1, 1),
            owner_household(2, 1),
            owner_household(3, 1),
            renter_household(4, 1),
            owner_household(5, 2),
            renter_household(6, 2),
            renter_household(7, 2),
            rival_household,
        ],
        signals: vec![income_signal(1, 1, 90_000.0)],
        channels: vec![Channel {
            client_id: rival(),
            geography_id: Some(GeographyId(2)),
            channel_type: ChannelType::School,
            name: "Ames High PTA".to_string(),
            estimated_reach: Some(900),
            website: None,
            source_url: None,
        }],
    }
}

pub(super) fn build_service() -> Arc<IntelligenceService<InMemoryStore>> {
    build_service_with(seeded_dataset())
}

pub(super) fn build_service_with(dataset: Dataset) -> Arc<IntelligenceService<InMemoryStore>> {
    Arc::new(IntelligenceService::new(
        Arc::new(InMemoryStore::from_dataset(dataset)),
        EngineConfig::default(),
    ))
}

pub(super) fn router_with_service<S>(service: Arc<IntelligenceService<S>>) -> Router
where
    S: IntelligenceStore + 'static,
{
    intelligence_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose every call fails, for exercising 500 paths.
pub(super) struct UnavailableStore;

impl IntelligenceStore for UnavailableStore {
    fn fetch_households(
        &self,
        _client_id: &ClientId,
        _query: &HouseholdQuery,
    ) -> Result<Vec<Household>, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }

    fn fetch_zip_code(&self, _lookup: ZipLookup<'_>) -> Result<Option<ZipCode>, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }

    fn fetch_demographic_signals(
        &self,
        _client_id: &ClientId,
        _zip_code_ids: &[ZipCodeId],
    ) -> Result<Vec<DemandSignal>, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }

    fn fetch_geography(
        &self,
        _client_id: &ClientId,
        _geography_id: GeographyId,
    ) -> Result<Option<Geography>, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }

    fn fetch_channels(
        &self,
        _client_id: &ClientId,
        _geography_id: Option<GeographyId>,
    ) -> Result<Vec<Channel>, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }

    fn insert_report(&self, _report: IntelligenceReport) -> Result<IntelligenceReport, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }

    fn fetch_report(
        &self,
        _client_id: &ClientId,
        _id: &ReportId,
    ) -> Result<Option<IntelligenceReport>, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }

    fn list_reports(
        &self,
        _client_id: &ClientId,
        _filter: &ReportFilter,
    ) -> Result<Vec<IntelligenceReport>, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }
}
