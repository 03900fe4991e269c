use demand_intel::config::EngineConfig;
use demand_intel::error::AppError;
use demand_intel::ingest::DatasetImporter;
use demand_intel::intelligence::{InMemoryStore, IntelligenceService, ServiceCategory};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

use crate::demo::synthetic_dataset;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Store hydrated from a CSV dataset directory, or the synthetic demo
/// dataset when none is configured.
pub(crate) fn load_store(dataset_dir: Option<&Path>) -> Result<InMemoryStore, AppError> {
    match dataset_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "loading dataset");
            let dataset = DatasetImporter::from_dir(dir)?;
            Ok(InMemoryStore::from_dataset(dataset))
        }
        None => {
            warn!("no dataset configured; serving synthetic demo data");
            Ok(InMemoryStore::from_dataset(synthetic_dataset()))
        }
    }
}

pub(crate) fn build_service(
    dataset_dir: Option<&Path>,
    engine: EngineConfig,
) -> Result<Arc<IntelligenceService<InMemoryStore>>, AppError> {
    let store = Arc::new(load_store(dataset_dir)?);
    Ok(Arc::new(IntelligenceService::new(store, engine)))
}

pub(crate) fn parse_category(raw: &str) -> Result<ServiceCategory, String> {
    raw.parse::<ServiceCategory>().map_err(|err| {
        let known: Vec<&str> = ServiceCategory::ordered()
            .iter()
            .map(|category| category.as_str())
            .collect();
        format!("{err}; expected one of {}", known.join(", "))
    })
}

/// ZIP counts share the `INTEL_TOP_ZIPS` lower bound of one.
pub(crate) fn parse_top(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err("top must be at least 1".to_string()),
        Ok(value) => Ok(value),
        Err(err) => Err(format!("invalid top value '{raw}': {err}")),
    }
}
