//! CSV import of the reference data the intelligence engine reads.

mod parser;
mod pii;

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::intelligence::domain::{
    Channel, ChannelType, ClientId, DemandSignal, Geography, GeographyId, Household, HouseholdId,
    NeighborhoodId, OwnershipType, PropertyType, ServiceCategory, SignalType, ZipCode, ZipCodeId,
};

use parser::{
    parse_number, parse_rows, ChannelRow, GeographyRow, HouseholdRow, SignalRow, ZipCodeRow,
};

pub const GEOGRAPHIES_FILE: &str = "geographies.csv";
pub const ZIP_CODES_FILE: &str = "zip_codes.csv";
pub const HOUSEHOLDS_FILE: &str = "households.csv";
pub const SIGNALS_FILE: &str = "demand_signals.csv";
pub const CHANNELS_FILE: &str = "channels.csv";

/// All reference rows the engine reads from.
#[derive(Debug, Default, Clone)]
pub struct Dataset {
    pub geographies: Vec<Geography>,
    pub zip_codes: Vec<ZipCode>,
    pub households: Vec<Household>,
    pub signals: Vec<DemandSignal>,
    pub channels: Vec<Channel>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {file}: {source}")]
    Csv {
        file: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("{file} line {line}: missing required field '{field}'")]
    MissingField {
        file: &'static str,
        line: usize,
        field: &'static str,
    },
    #[error("{file} contains disallowed personal data column '{column}'")]
    PiiColumn { file: &'static str, column: String },
}

/// Builds a [`Dataset`] file by file. ZIP codes must be loaded before
/// households and signals so their `zip_code` cells can be resolved.
#[derive(Debug, Default)]
pub struct DatasetImporter {
    dataset: Dataset,
    zip_index: HashMap<String, ZipCodeId>,
}

impl DatasetImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every known file present in `dir`. Missing files are skipped,
    /// but the directory itself must exist.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Dataset, ImportError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ImportError::Io {
                path: dir.to_path_buf(),
                source: std::io::ErrorKind::NotFound.into(),
            });
        }
        let mut importer = Self::new();

        if let Some(file) = open_optional(dir, GEOGRAPHIES_FILE)? {
            importer.load_geographies(file)?;
        }
        if let Some(file) = open_optional(dir, ZIP_CODES_FILE)? {
            importer.load_zip_codes(file)?;
        }
        if let Some(file) = open_optional(dir, HOUSEHOLDS_FILE)? {
            importer.load_households(file)?;
        }
        if let Some(file) = open_optional(dir, SIGNALS_FILE)? {
            importer.load_signals(file)?;
        }
        if let Some(file) = open_optional(dir, CHANNELS_FILE)? {
            importer.load_channels(file)?;
        }

        let dataset = importer.finish();
        info!(
            dir = %dir.display(),
            geographies = dataset.geographies.len(),
            zip_codes = dataset.zip_codes.len(),
            households = dataset.households.len(),
            signals = dataset.signals.len(),
            channels = dataset.channels.len(),
            "dataset imported"
        );
        Ok(dataset)
    }

    pub fn load_geographies<R: Read>(&mut self, reader: R) -> Result<usize, ImportError> {
        let parsed = parse_rows::<GeographyRow, _>(reader).map_err(csv_error(GEOGRAPHIES_FILE))?;
        for (line, row) in parsed.rows {
            let client_id = required(row.client_id, GEOGRAPHIES_FILE, line, "client_id")?;
            self.dataset.geographies.push(Geography {
                id: GeographyId(row.id),
                client_id: ClientId::new(client_id),
                name: row.name.unwrap_or_default(),
                geo_type: row.geo_type.unwrap_or_else(|| "custom".to_string()),
                state_code: row.state_code.unwrap_or_default(),
            });
        }
        Ok(self.dataset.geographies.len())
    }

    pub fn load_zip_codes<R: Read>(&mut self, reader: R) -> Result<usize, ImportError> {
        let parsed = parse_rows::<ZipCodeRow, _>(reader).map_err(csv_error(ZIP_CODES_FILE))?;
        for (line, row) in parsed.rows {
            let code = required(row.zip_code, ZIP_CODES_FILE, line, "zip_code")?;
            let id = ZipCodeId(row.id);
            self.zip_index.insert(code.clone(), id);
            self.dataset.zip_codes.push(ZipCode {
                id,
                zip_code: code,
                geography_id: parse_number(row.geography_id.as_deref()).map(GeographyId),
                population: parse_number(row.population.as_deref()),
                household_count: parse_number(row.household_count.as_deref()),
                median_income: parse_number(row.median_income.as_deref()),
                median_age: parse_number(row.median_age.as_deref()),
            });
        }
        Ok(self.dataset.zip_codes.len())
    }

    /// Rejects the whole file when any header names a personal identifier.
    pub fn load_households<R: Read>(&mut self, reader: R) -> Result<usize, ImportError> {
        let parsed = parse_rows::<HouseholdRow, _>(reader).map_err(csv_error(HOUSEHOLDS_FILE))?;
        if let Some(column) = pii::first_disallowed(parsed.headers.iter().map(String::as_str)) {
            return Err(ImportError::PiiColumn {
                file: HOUSEHOLDS_FILE,
                column,
            });
        }

        let explicit: Vec<Option<u64>> = parsed
            .rows
            .iter()
            .map(|(_, row)| parse_number(row.household_id.as_deref()))
            .collect();
        let mut ids = FallbackIds::above(
            self.dataset
                .households
                .iter()
                .map(|household| household.id.0)
                .chain(explicit.iter().flatten().copied()),
        );
        for ((line, row), explicit_id) in parsed.rows.into_iter().zip(explicit) {
            let client_id = required(row.client_id, HOUSEHOLDS_FILE, line, "client_id")?;
            let id = explicit_id.unwrap_or_else(|| ids.next_id());
            let zip_code_id = self.resolve_zip(row.zip_code.as_deref(), HOUSEHOLDS_FILE, line);
            self.dataset.households.push(Household {
                id: HouseholdId(id),
                client_id: ClientId::new(client_id),
                ownership_type: row
                    .ownership_type
                    .as_deref()
                    .map(OwnershipType::parse_lenient)
                    .unwrap_or_default(),
                property_type: row
                    .property_type
                    .as_deref()
                    .map(PropertyType::parse_lenient)
                    .unwrap_or_default(),
                lot_size_sqft: parse_number(row.lot_size_sqft.as_deref()),
                property_sqft_min: parse_number(row.property_sqft_min.as_deref()),
                property_sqft_max: parse_number(row.property_sqft_max.as_deref()),
                income_band_min: parse_number(row.income_band_min.as_deref()),
                income_band_max: parse_number(row.income_band_max.as_deref()),
                property_age_years: parse_number(row.property_age_years.as_deref()),
                last_sale_year: parse_number(row.last_sale_year.as_deref()),
                geography_id: parse_number(row.geography_id.as_deref()).map(GeographyId),
                zip_code_id,
                neighborhood_id: parse_number(row.neighborhood_id.as_deref()).map(NeighborhoodId),
            });
        }
        Ok(self.dataset.households.len())
    }

    /// Unknown categories on stored signals fall back to `general`.
    pub fn load_signals<R: Read>(&mut self, reader: R) -> Result<usize, ImportError> {
        let parsed = parse_rows::<SignalRow, _>(reader).map_err(csv_error(SIGNALS_FILE))?;
        let explicit: Vec<Option<u64>> = parsed
            .rows
            .iter()
            .map(|(_, row)| parse_number(row.id.as_deref()))
            .collect();
        let mut ids = FallbackIds::above(
            self.dataset
                .signals
                .iter()
                .map(|signal| signal.id)
                .chain(explicit.iter().flatten().copied()),
        );
        for ((line, row), explicit_id) in parsed.rows.into_iter().zip(explicit) {
            let client_id = required(row.client_id, SIGNALS_FILE, line, "client_id")?;
            let zip_code_id = self.resolve_zip(row.zip_code.as_deref(), SIGNALS_FILE, line);
            self.dataset.signals.push(DemandSignal {
                id: explicit_id.unwrap_or_else(|| ids.next_id()),
                client_id: ClientId::new(client_id),
                signal_type: row
                    .signal_type
                    .as_deref()
                    .map(SignalType::parse_lenient)
                    .unwrap_or(SignalType::Custom),
                service_category: row
                    .service_category
                    .as_deref()
                    .and_then(|value| value.parse::<ServiceCategory>().ok())
                    .unwrap_or(ServiceCategory::General),
                title: row.title,
                value: parse_number(row.value.as_deref()),
                metadata: row.metadata,
                geography_id: parse_number(row.geography_id.as_deref()).map(GeographyId),
                zip_code_id,
            });
        }
        Ok(self.dataset.signals.len())
    }

    pub fn load_channels<R: Read>(&mut self, reader: R) -> Result<usize, ImportError> {
        let parsed = parse_rows::<ChannelRow, _>(reader).map_err(csv_error(CHANNELS_FILE))?;
        for (line, row) in parsed.rows {
            let client_id = required(row.client_id, CHANNELS_FILE, line, "client_id")?;
            let name = required(row.name, CHANNELS_FILE, line, "name")?;
            self.dataset.channels.push(Channel {
                client_id: ClientId::new(client_id),
                geography_id: parse_number(row.geography_id.as_deref()).map(GeographyId),
                channel_type: row
                    .channel_type
                    .as_deref()
                    .map(ChannelType::parse_lenient)
                    .unwrap_or(ChannelType::Other),
                name,
                estimated_reach: parse_number(row.estimated_reach.as_deref()),
                website: row.website,
                source_url: row.source_url,
            });
        }
        Ok(self.dataset.channels.len())
    }

    pub fn finish(self) -> Dataset {
        self.dataset
    }

    fn resolve_zip(&self, code: Option<&str>, file: &'static str, line: usize) -> Option<ZipCodeId> {
        let code = code?;
        let resolved = self.zip_index.get(code).copied();
        if resolved.is_none() {
            debug!(file, line, zip_code = code, "zip code not in zip_codes table");
        }
        resolved
    }
}

/// Ids handed to rows without one, numbered past every id already taken.
struct FallbackIds {
    next: u64,
}

impl FallbackIds {
    fn above(taken: impl Iterator<Item = u64>) -> Self {
        Self {
            next: taken.max().map_or(1, |max| max.saturating_add(1)),
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }
}

fn open_optional(dir: &Path, name: &str) -> Result<Option<File>, ImportError> {
    let path = dir.join(name);
    if !path.exists() {
        debug!(path = %path.display(), "optional dataset file absent");
        return Ok(None);
    }
    File::open(&path)
        .map(Some)
        .map_err(|source| ImportError::Io { path, source })
}

fn csv_error(file: &'static str) -> impl Fn(csv::Error) -> ImportError {
    move |source| ImportError::Csv { file, source }
}

fn required(
    value: Option<String>,
    file: &'static str,
    line: usize,
    field: &'static str,
) -> Result<String, ImportError> {
    value.ok_or(ImportError::MissingField { file, line, field })
}
