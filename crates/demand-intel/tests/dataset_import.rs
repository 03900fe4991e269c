use std::path::PathBuf;
use std::sync::Arc;

use demand_intel::config::EngineConfig;
use demand_intel::ingest::{DatasetImporter, ImportError};
use demand_intel::intelligence::{
    ClientId, GeographyId, HouseholdId, InMemoryStore, IntelligenceService, OwnershipType,
    ReportRequest, ZipCodeId,
};

fn sample_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/sample")
}

#[test]
fn sample_dataset_imports_every_file() {
    let dataset = DatasetImporter::from_dir(sample_dir()).expect("sample imports");

    assert_eq!(dataset.geographies.len(), 2);
    assert_eq!(dataset.zip_codes.len(), 4);
    assert_eq!(dataset.households.len(), 10);
    assert_eq!(dataset.signals.len(), 4);
    assert_eq!(dataset.channels.len(), 2);

    let lowercase_owner = dataset
        .households
        .iter()
        .find(|household| household.id == HouseholdId(8))
        .expect("household 8 present");
    assert_eq!(lowercase_owner.ownership_type, OwnershipType::Owner);
    assert_eq!(lowercase_owner.zip_code_id, Some(ZipCodeId(3)));
    assert_eq!(lowercase_owner.known_lot_size(), None);
    assert_eq!(lowercase_owner.average_income(), None);
}

#[test]
fn missing_directory_is_an_error() {
    let missing = sample_dir().join("does-not-exist");
    let err = DatasetImporter::from_dir(&missing).expect_err("directory must exist");
    assert!(err.to_string().contains("does-not-exist"));

    match err {
        ImportError::Io { ref path, ref source } => {
            assert_eq!(path, &missing);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn directory_with_only_some_files_still_imports() {
    let dir = std::env::temp_dir().join(format!("demand-intel-partial-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    std::fs::write(
        dir.join("zip_codes.csv"),
        "id,zip_code,population\n1,50309,25000\n",
    )
    .expect("zip file written");

    let dataset = DatasetImporter::from_dir(&dir).expect("partial dataset imports");
    std::fs::remove_dir_all(&dir).expect("temp dir removed");

    assert_eq!(dataset.zip_codes.len(), 1);
    assert!(dataset.households.is_empty());
}

#[test]
fn households_with_contact_columns_are_refused() {
    let csv = "household_id,client_id,zip_code,Email Address\n1,acme,50309,someone@example.com\n";
    let mut importer = DatasetImporter::new();

    let err = importer
        .load_households(csv.as_bytes())
        .expect_err("pii column");

    assert!(matches!(err, ImportError::PiiColumn { ref column, .. } if column == "Email Address"));
    assert!(err.to_string().contains("households.csv"));
}

#[test]
fn imported_dataset_drives_a_full_report() {
    let dataset = DatasetImporter::from_dir(sample_dir()).expect("sample imports");
    let service = IntelligenceService::new(
        Arc::new(InMemoryStore::from_dataset(dataset)),
        EngineConfig::default(),
    );

    let report = service
        .generate_report(
            &ClientId::new("acme"),
            ReportRequest {
                geography_id: GeographyId(1),
                zip_codes: "50309,50310,50312".to_string(),
                service_category: "lawn_care".to_string(),
                report_name: None,
            },
        )
        .expect("report generated");

    assert_eq!(report.total_households, 8);
    assert_eq!(report.zip_demand_scores["50309"], 46.67);
    assert_eq!(report.zip_demand_scores["50310"], 78.33);
    assert_eq!(report.zip_demand_scores["50312"], 80.0);

    let order: Vec<&str> = report
        .top_zip_codes
        .iter()
        .map(|ranking| ranking.zip_code.as_str())
        .collect();
    assert_eq!(order, vec!["50312", "50310", "50309"]);

    assert_eq!(report.channel_recommendations.len(), 2);
    assert_eq!(report.channel_recommendations[0].channel_type, "HOA");
}
