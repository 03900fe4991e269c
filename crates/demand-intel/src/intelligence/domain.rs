use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::IntelligenceError;

/// Tenant identifier; every household, signal and report is scoped to one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeographyId(pub u32);

impl fmt::Display for GeographyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZipCodeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeighborhoodId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HouseholdId(pub u64);

/// Service verticals a report can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    LawnCare,
    Security,
    ItServices,
    Fireworks,
    HomeImprovement,
    Cleaning,
    PestControl,
    Hvac,
    Plumbing,
    Electrical,
    General,
}

impl ServiceCategory {
    pub const fn ordered() -> [Self; 11] {
        [
            Self::LawnCare,
            Self::Security,
            Self::ItServices,
            Self::Fireworks,
            Self::HomeImprovement,
            Self::Cleaning,
            Self::PestControl,
            Self::Hvac,
            Self::Plumbing,
            Self::Electrical,
            Self::General,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LawnCare => "lawn_care",
            Self::Security => "security",
            Self::ItServices => "it_services",
            Self::Fireworks => "fireworks",
            Self::HomeImprovement => "home_improvement",
            Self::Cleaning => "cleaning",
            Self::PestControl => "pest_control",
            Self::Hvac => "hvac",
            Self::Plumbing => "plumbing",
            Self::Electrical => "electrical",
            Self::General => "general",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LawnCare => "Lawn Care",
            Self::Security => "Security",
            Self::ItServices => "IT Services",
            Self::Fireworks => "Fireworks",
            Self::HomeImprovement => "Home Improvement",
            Self::Cleaning => "Cleaning",
            Self::PestControl => "Pest Control",
            Self::Hvac => "HVAC",
            Self::Plumbing => "Plumbing",
            Self::Electrical => "Electrical",
            Self::General => "General",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceCategory {
    type Err = IntelligenceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| IntelligenceError::InvalidCategory(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipType {
    Owner,
    Renter,
    #[default]
    Unknown,
}

impl OwnershipType {
    /// Lenient parse used by imports: `OWNER_OCCUPIED` is an owner, anything
    /// unrecognized is `Unknown`.
    pub fn parse_lenient(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        if normalized.contains("owner") {
            Self::Owner
        } else if normalized.contains("renter") {
            Self::Renter
        } else {
            Self::Unknown
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Renter => "renter",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    SingleFamily,
    MultiFamily,
    Condo,
    Apartment,
    MobileHome,
    Commercial,
    #[default]
    Unknown,
}

impl PropertyType {
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "single_family" => Self::SingleFamily,
            "multi_family" => Self::MultiFamily,
            "condo" => Self::Condo,
            "apartment" => Self::Apartment,
            "mobile_home" => Self::MobileHome,
            "commercial" => Self::Commercial,
            _ => Self::Unknown,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleFamily => "single_family",
            Self::MultiFamily => "multi_family",
            Self::Condo => "condo",
            Self::Apartment => "apartment",
            Self::MobileHome => "mobile_home",
            Self::Commercial => "commercial",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    Event,
    Permit,
    Seasonal,
    Turnover,
    Weather,
    Census,
    Demographic,
    Custom,
}

impl SignalType {
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "event" => Self::Event,
            "permit" => Self::Permit,
            "seasonal" => Self::Seasonal,
            "turnover" => Self::Turnover,
            "weather" => Self::Weather,
            "census" => Self::Census,
            "demographic" => Self::Demographic,
            _ => Self::Custom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelType {
    Hoa,
    PropertyManager,
    School,
    Church,
    Venue,
    Media,
    CommunityNewsletter,
    Other,
}

impl ChannelType {
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "HOA" => Self::Hoa,
            "PROPERTY_MANAGER" => Self::PropertyManager,
            "SCHOOL" => Self::School,
            "CHURCH" => Self::Church,
            "VENUE" => Self::Venue,
            "MEDIA" => Self::Media,
            "COMMUNITY_NEWSLETTER" => Self::CommunityNewsletter,
            _ => Self::Other,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hoa => "HOA",
            Self::PropertyManager => "PROPERTY_MANAGER",
            Self::School => "SCHOOL",
            Self::Church => "CHURCH",
            Self::Venue => "VENUE",
            Self::Media => "MEDIA",
            Self::CommunityNewsletter => "COMMUNITY_NEWSLETTER",
            Self::Other => "OTHER",
        }
    }
}

/// Non-PII household record derived from public property data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub id: HouseholdId,
    pub client_id: ClientId,
    #[serde(default)]
    pub ownership_type: OwnershipType,
    #[serde(default)]
    pub property_type: PropertyType,
    pub lot_size_sqft: Option<u32>,
    pub property_sqft_min: Option<u32>,
    pub property_sqft_max: Option<u32>,
    pub income_band_min: Option<u32>,
    pub income_band_max: Option<u32>,
    pub property_age_years: Option<u32>,
    pub last_sale_year: Option<i32>,
    pub geography_id: Option<GeographyId>,
    pub zip_code_id: Option<ZipCodeId>,
    pub neighborhood_id: Option<NeighborhoodId>,
}

impl Household {
    /// Midpoint of the income band. Both bounds must be present and non-zero.
    pub fn average_income(&self) -> Option<f64> {
        match (self.income_band_min, self.income_band_max) {
            (Some(min), Some(max)) if min > 0 && max > 0 => {
                Some((f64::from(min) + f64::from(max)) / 2.0)
            }
            _ => None,
        }
    }

    /// Lot size, treating zero as unknown.
    pub fn known_lot_size(&self) -> Option<u32> {
        self.lot_size_sqft.filter(|size| *size > 0)
    }

    pub fn known_property_age(&self) -> Option<u32> {
        self.property_age_years.filter(|age| *age > 0)
    }

    pub fn is_owner(&self) -> bool {
        self.ownership_type == OwnershipType::Owner
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geography {
    pub id: GeographyId,
    pub client_id: ClientId,
    pub name: String,
    pub geo_type: String,
    pub state_code: String,
}

/// Census-derived aggregates for a ZIP code. Shared across tenants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZipCode {
    pub id: ZipCodeId,
    pub zip_code: String,
    pub geography_id: Option<GeographyId>,
    pub population: Option<u64>,
    pub household_count: Option<u64>,
    pub median_income: Option<u64>,
    pub median_age: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSignal {
    pub id: u64,
    pub client_id: ClientId,
    pub signal_type: SignalType,
    pub service_category: ServiceCategory,
    pub title: Option<String>,
    pub value: Option<f64>,
    /// Free-text metadata. Income signals are recognized by the substring
    /// "income" in here, so keep that word in demographic income rows.
    pub metadata: Option<String>,
    pub geography_id: Option<GeographyId>,
    pub zip_code_id: Option<ZipCodeId>,
}

impl DemandSignal {
    pub fn is_income_signal(&self) -> bool {
        self.metadata
            .as_deref()
            .map(|text| text.to_lowercase().contains("income"))
            .unwrap_or(false)
    }
}

/// Institutional outreach channel (HOA, school, venue, ...). No personal contacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub client_id: ClientId,
    pub geography_id: Option<GeographyId>,
    pub channel_type: ChannelType,
    pub name: String,
    pub estimated_reach: Option<u64>,
    pub website: Option<String>,
    pub source_url: Option<String>,
}
