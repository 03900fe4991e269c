use std::io::Read;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

pub(crate) struct ParsedFile<T> {
    pub headers: Vec<String>,
    /// Rows paired with their 1-based data line number.
    pub rows: Vec<(usize, T)>,
}

pub(crate) fn parse_rows<T, R>(reader: R) -> Result<ParsedFile<T>, csv::Error>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (index, record) in csv_reader.deserialize::<T>().enumerate() {
        rows.push((index + 1, record?));
    }

    Ok(ParsedFile { headers, rows })
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeographyRow {
    pub id: u32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub client_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub name: Option<String>,
    #[serde(
        rename = "type",
        alias = "geo_type",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub geo_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub state_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ZipCodeRow {
    pub id: u32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub zip_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub geography_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub population: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub household_count: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub median_income: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub median_age: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HouseholdRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub household_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub client_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub geography_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub zip_code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub neighborhood_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub property_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub ownership_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub lot_size_sqft: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub property_sqft_min: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub property_sqft_max: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub income_band_min: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub income_band_max: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub property_age_years: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub last_sale_year: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SignalRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub client_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub signal_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub service_category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub metadata: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub geography_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub zip_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChannelRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub client_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub geography_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub channel_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub estimated_reach: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub source_url: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Numeric cells that fail to parse are treated as missing, like empty ones.
pub(crate) fn parse_number<T: FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|raw| raw.trim().replace(',', "").parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_garbage_numbers_become_none() {
        assert_eq!(parse_number::<u32>(Some("12,000")), Some(12_000));
        assert_eq!(parse_number::<u32>(Some("n/a")), None);
        assert_eq!(parse_number::<u32>(None), None);
        assert_eq!(parse_number::<f64>(Some(" 81250.5 ")), Some(81_250.5));
    }

    #[test]
    fn rows_keep_line_numbers_and_drop_blank_cells() {
        let csv = "household_id,client_id,zip_code,lot_size_sqft\n1,acme,50309,\n2,acme, ,6000\n";
        let parsed = parse_rows::<HouseholdRow, _>(csv.as_bytes()).expect("parses");
        assert_eq!(parsed.headers.len(), 4);
        assert_eq!(parsed.rows.len(), 2);
        let (line, first) = &parsed.rows[0];
        assert_eq!(*line, 1);
        assert!(first.lot_size_sqft.is_none());
        let (_, second) = &parsed.rows[1];
        assert!(second.zip_code.is_none());
        assert_eq!(second.lot_size_sqft.as_deref(), Some("6000"));
    }
}
