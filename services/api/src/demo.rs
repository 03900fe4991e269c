use crate::infra::{build_service, parse_category, parse_top};
use chrono::SecondsFormat;
use clap::Args;
use demand_intel::config::{AppConfig, EngineConfig};
use demand_intel::error::AppError;
use demand_intel::ingest::Dataset;
use demand_intel::intelligence::{
    breakdown, Channel, ChannelType, ClientId, DemandSignal, Geography, GeographyId, Household,
    HouseholdId, IntelligenceReport, OwnershipType, PropertyType, ReportRequest, ServiceCategory,
    SignalType, ZipCode, ZipCodeId, ZipRanking, ZipRankingRequest,
};
use std::path::PathBuf;

pub(crate) const DEMO_CLIENT: &str = "demo";
const DEMO_GEOGRAPHY: u32 = 1;
const DEMO_ZIPS: [&str; 5] = ["64108", "64111", "64113", "64114", "64131"];
const DEMO_HOUSEHOLDS: u64 = 60;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Service category to score the synthetic market for
    #[arg(long, value_parser = parse_category, default_value = "lawn_care")]
    pub(crate) category: ServiceCategory,
    /// Number of ZIP codes to explain
    #[arg(long, value_parser = parse_top)]
    pub(crate) top: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Directory of CSV files (falls back to INTEL_DATASET_DIR, then synthetic data)
    #[arg(long)]
    pub(crate) dataset: Option<PathBuf>,
    /// Tenant the report is generated for
    #[arg(long, default_value = DEMO_CLIENT)]
    pub(crate) client: String,
    /// Geography id owned by the tenant
    #[arg(long)]
    pub(crate) geography: u32,
    /// Comma-separated ZIP codes
    #[arg(long)]
    pub(crate) zip_codes: String,
    #[arg(long, value_parser = parse_category)]
    pub(crate) category: ServiceCategory,
    /// Optional report name
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ZipsArgs {
    /// Directory of CSV files (falls back to INTEL_DATASET_DIR, then synthetic data)
    #[arg(long)]
    pub(crate) dataset: Option<PathBuf>,
    #[arg(long, default_value = DEMO_CLIENT)]
    pub(crate) client: String,
    /// Comma-separated ZIP codes
    #[arg(long)]
    pub(crate) zip_codes: String,
    #[arg(long, value_parser = parse_category, default_value = "general")]
    pub(crate) category: ServiceCategory,
    /// How many ZIP codes to print (defaults to INTEL_TOP_ZIPS)
    #[arg(long, value_parser = parse_top)]
    pub(crate) top: Option<usize>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        dataset,
        client,
        geography,
        zip_codes,
        category,
        name,
        json,
    } = args;

    let config = AppConfig::load()?;
    let dataset = dataset.or(config.engine.dataset_dir.clone());
    let service = build_service(dataset.as_deref(), config.engine)?;

    let report = service.generate_report(
        &ClientId::new(client),
        ReportRequest {
            geography_id: GeographyId(geography),
            zip_codes,
            service_category: category.as_str().to_string(),
            report_name: name,
        },
    )?;

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(body) => println!("{body}"),
            Err(err) => println!("Report payload unavailable: {err}"),
        }
    } else {
        render_report(&report);
    }
    Ok(())
}

pub(crate) fn run_zip_rankings(args: ZipsArgs) -> Result<(), AppError> {
    let ZipsArgs {
        dataset,
        client,
        zip_codes,
        category,
        top,
    } = args;

    let config = AppConfig::load()?;
    let dataset = dataset.or(config.engine.dataset_dir.clone());
    let service = build_service(dataset.as_deref(), config.engine)?;

    let rankings = service.rank_zip_codes(
        &ClientId::new(client),
        &ZipRankingRequest {
            zip_codes,
            service_category: category.as_str().to_string(),
            top_n: top,
        },
    )?;

    println!("ZIP rankings for {} services", category.label());
    render_rankings(&rankings);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { category, top } = args;

    let mut engine = EngineConfig::default();
    if let Some(top) = top {
        engine.top_zips = top;
    }
    let service = build_service(None, engine)?;
    let client = ClientId::new(DEMO_CLIENT);

    println!("Demand intelligence demo ({} services)", category.label());
    println!(
        "Synthetic market: {} households across {} ZIP codes",
        DEMO_HOUSEHOLDS,
        DEMO_ZIPS.len()
    );

    let report = service.generate_report(
        &client,
        ReportRequest {
            geography_id: GeographyId(DEMO_GEOGRAPHY),
            zip_codes: DEMO_ZIPS.join(","),
            service_category: category.as_str().to_string(),
            report_name: Some(format!("{} demo", category.label())),
        },
    )?;
    render_report(&report);

    if let Some(household) = service.store().dataset().households.first() {
        let detail = breakdown(household, category);
        println!(
            "\nSample household score breakdown (household {})",
            household.id.0
        );
        println!("- Base: {:.0}", detail.base);
        for component in &detail.components {
            println!(
                "- {:?}: +{:.0} ({})",
                component.factor, component.points, component.notes
            );
        }
        println!("- Final score: {:.1}", detail.score);
    }

    Ok(())
}

pub(crate) fn render_report(report: &IntelligenceReport) {
    println!("\n{} [{}]", report.report_name, report.id.0);
    println!(
        "Generated {} for geography {} ({})",
        report
            .generated_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        report.geography_id,
        report.service_category.label()
    );
    println!(
        "Households: {} | Average demand score: {:.1}",
        report.total_households, report.average_demand_score
    );

    let profile = &report.buyer_profile;
    println!("\nBuyer profile");
    println!(
        "- Homeowners {:.0}% | Renters {:.0}%",
        profile.homeowner_percentage, profile.renter_percentage
    );
    println!(
        "- Income bands: {} low / {} medium / {} high",
        profile.income_distribution.low,
        profile.income_distribution.medium,
        profile.income_distribution.high
    );
    println!(
        "- Average lot {:.0} sqft | Average property age {:.0} years",
        profile.average_lot_size, profile.average_property_age
    );
    if !profile.property_types.is_empty() {
        let mix: Vec<String> = profile
            .property_types
            .iter()
            .map(|(kind, count)| format!("{kind} {count}"))
            .collect();
        println!("- Property mix: {}", mix.join(", "));
    }

    if report.zip_demand_scores.is_empty() {
        println!("\nZIP demand scores: none");
    } else {
        println!("\nZIP demand scores");
        for (zip, score) in &report.zip_demand_scores {
            println!("- {zip}: {score:.2}");
        }
    }

    println!("\nTop ZIP codes");
    render_rankings(&report.top_zip_codes);

    if report.channel_recommendations.is_empty() {
        println!("\nChannel recommendations: none");
    } else {
        println!("\nChannel recommendations");
        for channel in &report.channel_recommendations {
            let reach = channel
                .estimated_reach
                .map(|reach| format!(" | reach {reach}"))
                .unwrap_or_default();
            let cost = channel
                .estimated_cost_range
                .as_deref()
                .map(|cost| format!(" | {cost}"))
                .unwrap_or_default();
            println!(
                "- {}: {}{}{}",
                channel.channel_type, channel.rationale, reach, cost
            );
        }
    }

    println!("\nTiming");
    for timing in &report.timing_recommendations {
        println!(
            "- {} (score {:.1}): {}",
            timing.time_period, timing.demand_score, timing.rationale
        );
        for action in &timing.recommended_actions {
            println!("  - {action}");
        }
    }
}

fn render_rankings(rankings: &[ZipRanking]) {
    if rankings.is_empty() {
        println!("- none");
        return;
    }
    for (position, ranking) in rankings.iter().enumerate() {
        println!(
            "{}. {} ({:.2}) {}",
            position + 1,
            ranking.zip_code,
            ranking.score,
            ranking.rationale
        );
    }
}

/// Deterministic market used by `demo` and by the server when no dataset
/// directory is configured.
pub(crate) fn synthetic_dataset() -> Dataset {
    let client = ClientId::new(DEMO_CLIENT);
    let geography_id = GeographyId(DEMO_GEOGRAPHY);

    let zip_codes: Vec<ZipCode> = DEMO_ZIPS
        .iter()
        .enumerate()
        .map(|(index, code)| {
            let step = index as u64;
            ZipCode {
                id: ZipCodeId(index as u32 + 1),
                zip_code: code.to_string(),
                geography_id: Some(geography_id),
                population: Some(8_000 + step * 6_500),
                household_count: Some(3_200 + step * 2_400),
                median_income: Some(48_000 + step * 14_000),
                median_age: Some(31.5 + step as f64 * 2.0),
            }
        })
        .collect();

    let households = (0..DEMO_HOUSEHOLDS)
        .map(|index| synthetic_household(index, &client, geography_id, zip_codes.len() as u64))
        .collect();

    let signals = zip_codes
        .iter()
        .enumerate()
        .filter_map(|(index, zip)| {
            zip.median_income.map(|income| DemandSignal {
                id: index as u64 + 1,
                client_id: client.clone(),
                signal_type: SignalType::Demographic,
                service_category: ServiceCategory::General,
                title: Some(format!("Median household income {}", zip.zip_code)),
                value: Some(income as f64),
                metadata: Some("census median household income".to_string()),
                geography_id: Some(geography_id),
                zip_code_id: Some(zip.id),
            })
        })
        .collect();

    Dataset {
        geographies: vec![Geography {
            id: geography_id,
            client_id: client.clone(),
            name: "Kansas City South".to_string(),
            geo_type: "metro".to_string(),
            state_code: "MO".to_string(),
        }],
        zip_codes,
        households,
        signals,
        channels: vec![
            Channel {
                client_id: client.clone(),
                geography_id: Some(geography_id),
                channel_type: ChannelType::Hoa,
                name: "Waldo Homes Association".to_string(),
                estimated_reach: Some(2_400),
                website: None,
                source_url: None,
            },
            Channel {
                client_id: client,
                geography_id: Some(geography_id),
                channel_type: ChannelType::School,
                name: "Brookside Elementary PTA".to_string(),
                estimated_reach: Some(650),
                website: None,
                source_url: None,
            },
        ],
    }
}

fn synthetic_household(
    index: u64,
    client: &ClientId,
    geography_id: GeographyId,
    zip_count: u64,
) -> Household {
    let zip_slot = index % zip_count;
    let ownership_type = match index % 5 {
        0 | 3 => OwnershipType::Renter,
        4 if index % 2 == 0 => OwnershipType::Unknown,
        _ => OwnershipType::Owner,
    };
    let property_type = match index % 6 {
        0 | 1 | 2 => PropertyType::SingleFamily,
        3 => PropertyType::Condo,
        4 => PropertyType::Apartment,
        _ => PropertyType::MultiFamily,
    };
    let income_floor = 30_000 + ((index * 7_919) % 12) as u32 * 10_000;
    let lot = 1_500 + ((index * 2_731) % 11_000) as u32;

    Household {
        id: HouseholdId(index + 1),
        client_id: client.clone(),
        ownership_type,
        property_type,
        lot_size_sqft: (property_type != PropertyType::Apartment).then_some(lot),
        property_sqft_min: Some(900 + (zip_slot as u32) * 350),
        property_sqft_max: Some(1_300 + (zip_slot as u32) * 450),
        income_band_min: Some(income_floor),
        income_band_max: Some(income_floor + 20_000),
        property_age_years: Some(5 + ((index * 13) % 70) as u32),
        last_sale_year: Some(1995 + (index % 29) as i32),
        geography_id: Some(geography_id),
        zip_code_id: Some(ZipCodeId(zip_slot as u32 + 1)),
        neighborhood_id: None,
    }
}
