use super::common::*;

use crate::intelligence::domain::{
    Channel, ChannelType, DemandSignal, GeographyId, ServiceCategory, ZipCodeId,
};
use crate::intelligence::report::{
    ProfileRequest, ReportFilter, ReportRequest, ZipRankingRequest,
};
use crate::intelligence::IntelligenceError;

fn report_request(zip_codes: &str, category: &str) -> ReportRequest {
    ReportRequest {
        geography_id: GeographyId(1),
        zip_codes: zip_codes.to_string(),
        service_category: category.to_string(),
        report_name: None,
    }
}

fn profile_request(min_demand_score: f64) -> ProfileRequest {
    ProfileRequest {
        geography_id: None,
        zip_codes: None,
        service_category: "lawn_care".to_string(),
        min_demand_score,
    }
}

#[test]
fn generate_report_assembles_every_section() {
    let service = build_service();

    let report = service
        .generate_report(&acme(), report_request("50309, 50310,50311", "lawn_care"))
        .expect("report generated");

    assert!(report.id.0.starts_with("rpt-"));
    assert_eq!(report.client_id, acme());
    assert_eq!(report.service_category, ServiceCategory::LawnCare);
    assert_eq!(report.report_name, "lawn_care Report");
    assert_eq!(report.total_households, 7);
    assert_eq!(report.target_households, 7);
    assert!((report.average_demand_score - 390.0 / 7.0).abs() < 1e-9);

    assert_eq!(report.zip_demand_scores.len(), 3);
    assert_eq!(report.zip_demand_scores["50309"], 75.0);
    assert_eq!(report.top_zip_codes.len(), 3);
    assert_eq!(report.top_zip_codes[0].zip_code, "50309");

    let channel_types: Vec<&str> = report
        .channel_recommendations
        .iter()
        .map(|rec| rec.channel_type.as_str())
        .collect();
    assert_eq!(channel_types, vec!["digital_ads", "door_hangers"]);
    assert_eq!(report.channel_recommendations[0].estimated_reach, Some(21));

    assert_eq!(report.timing_recommendations.len(), 2);
    assert_eq!(report.timing_recommendations[0].time_period, "Spring (March-May)");
    assert!(
        (report.timing_recommendations[0].demand_score - 390.0 / 7.0 * 1.3).abs() < 1e-9
    );

    assert_eq!(service.store().report_count(), 1);
}

#[test]
fn generate_report_prefers_stored_channels() {
    let mut dataset = seeded_dataset();
    dataset.channels.push(Channel {
        client_id: acme(),
        geography_id: Some(GeographyId(1)),
        channel_type: ChannelType::Hoa,
        name: "Sherman Hill HOA".to_string(),
        estimated_reach: Some(450),
        website: Some("https://shermanhill.example".to_string()),
        source_url: None,
    });
    let service = build_service_with(dataset);

    let report = service
        .generate_report(&acme(), report_request("50309", "security"))
        .expect("report generated");

    assert_eq!(report.channel_recommendations.len(), 1);
    let channel = &report.channel_recommendations[0];
    assert_eq!(channel.channel_type, "HOA");
    assert_eq!(channel.name.as_deref(), Some("Sherman Hill HOA"));
    assert_eq!(channel.rationale, "Institutional channel: Sherman Hill HOA");
    assert_eq!(report.timing_recommendations[0].time_period, "Year-round");
}

#[test]
fn generate_report_keeps_custom_name_and_drops_unknown_zips() {
    let service = build_service();
    let mut request = report_request("50309,99999", "fireworks");
    request.report_name = Some("July push".to_string());

    let report = service
        .generate_report(&acme(), request)
        .expect("report generated");

    assert_eq!(report.report_name, "July push");
    assert_eq!(report.zip_codes, "50309,99999");
    assert_eq!(report.total_households, 4);
    assert_eq!(
        report.zip_demand_scores.keys().collect::<Vec<_>>(),
        vec!["50309"]
    );
}

#[test]
fn generate_report_with_no_resolvable_zips_covers_the_geography() {
    let service = build_service();

    let report = service
        .generate_report(&acme(), report_request("", "general"))
        .expect("report generated");

    assert_eq!(report.total_households, 7);
    assert!(report.zip_demand_scores.is_empty());
    assert!(report.top_zip_codes.is_empty());
}

#[test]
fn generate_report_rejects_foreign_geography() {
    let service = build_service();
    let mut request = report_request("50309", "lawn_care");
    request.geography_id = GeographyId(2);

    let err = service
        .generate_report(&acme(), request)
        .expect_err("geography belongs to rival");

    assert!(matches!(err, IntelligenceError::GeographyNotFound(GeographyId(2))));
    assert_eq!(service.store().report_count(), 0);
}

#[test]
fn generate_report_rejects_unknown_category() {
    let service = build_service();

    let err = service
        .generate_report(&acme(), report_request("50309", "snow_removal"))
        .expect_err("invalid category");

    assert!(matches!(err, IntelligenceError::InvalidCategory(value) if value == "snow_removal"));
    assert_eq!(service.store().report_count(), 0);
}

#[test]
fn buyer_profile_filters_by_minimum_score() {
    let service = build_service();

    let profile = service
        .buyer_profile(&acme(), &profile_request(50.0))
        .expect("profile");

    assert_eq!(profile.total_households, 4);
    assert_eq!(profile.homeowner_percentage, 100.0);
}

#[test]
fn buyer_profile_counts_signal_boost_toward_threshold() {
    let service = build_service();
    let request = ProfileRequest {
        geography_id: Some(GeographyId(1)),
        ..profile_request(15.0)
    };

    // The 50309 renter scores 10 but gains 5 from the income signal.
    let profile = service.buyer_profile(&acme(), &request).expect("profile");

    assert_eq!(profile.total_households, 5);
    assert_eq!(profile.renter_percentage, 20.0);
}

#[test]
fn signal_boost_requires_matching_geography_scope() {
    let service = build_service();

    // The seeded income signal belongs to geography 1, so a request without
    // a geography leaves the 50309 renter at 10.
    let unscoped = service
        .buyer_profile(&acme(), &profile_request(15.0))
        .expect("profile");
    assert_eq!(unscoped.total_households, 4);
    assert_eq!(unscoped.renter_percentage, 0.0);

    let mut dataset = seeded_dataset();
    dataset.signals.push(DemandSignal {
        geography_id: None,
        ..income_signal(2, 1, 90_000.0)
    });
    let service = build_service_with(dataset);
    let boosted = service
        .buyer_profile(&acme(), &profile_request(15.0))
        .expect("profile");
    assert_eq!(boosted.total_households, 5);
}

#[test]
fn buyer_profile_scopes_to_requested_zips() {
    let service = build_service();
    let request = ProfileRequest {
        zip_codes: Some("50310".to_string()),
        ..profile_request(0.0)
    };

    let profile = service.buyer_profile(&acme(), &request).expect("profile");

    assert_eq!(profile.total_households, 3);
    assert_eq!(profile.income_distribution.high, 1);
    assert_eq!(profile.income_distribution.low, 2);
}

#[test]
fn buyer_profile_rejects_out_of_range_threshold() {
    let service = build_service();

    for threshold in [-1.0, 100.5] {
        let err = service
            .buyer_profile(&acme(), &profile_request(threshold))
            .expect_err("threshold out of range");
        assert!(matches!(err, IntelligenceError::InvalidScoreThreshold(value) if value == threshold));
    }
}

#[test]
fn buyer_profile_for_unknown_tenant_is_empty() {
    let service = build_service();

    let profile = service
        .buyer_profile(&crate::intelligence::ClientId::new("nobody"), &profile_request(0.0))
        .expect("profile");

    assert_eq!(profile.total_households, 0);
    assert_eq!(profile.homeowner_percentage, 0.0);
}

#[test]
fn reports_are_listed_newest_first_and_scoped_to_tenant() {
    let service = build_service();
    let first = service
        .generate_report(&acme(), report_request("50309", "lawn_care"))
        .expect("first");
    let second = service
        .generate_report(&acme(), report_request("50310", "security"))
        .expect("second");

    let all = service
        .list_reports(&acme(), &ReportFilter::default())
        .expect("list");
    assert_eq!(
        all.iter().map(|report| report.id.clone()).collect::<Vec<_>>(),
        vec![second.id.clone(), first.id.clone()]
    );

    let security_only = service
        .list_reports(
            &acme(),
            &ReportFilter {
                service_category: Some("security".to_string()),
                ..ReportFilter::default()
            },
        )
        .expect("filtered");
    assert_eq!(security_only.len(), 1);
    assert_eq!(security_only[0].id, second.id);

    let mixed_case = service
        .list_reports(
            &acme(),
            &ReportFilter {
                service_category: Some(" LAWN_CARE ".to_string()),
                ..ReportFilter::default()
            },
        )
        .expect("case-insensitive filter");
    assert_eq!(mixed_case.len(), 1);
    assert_eq!(mixed_case[0].id, first.id);

    let paged = service
        .list_reports(
            &acme(),
            &ReportFilter {
                limit: Some(1),
                offset: Some(1),
                ..ReportFilter::default()
            },
        )
        .expect("paged");
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].id, first.id);

    assert!(service
        .list_reports(&rival(), &ReportFilter::default())
        .expect("rival list")
        .is_empty());
}

#[test]
fn get_report_hides_other_tenants_reports() {
    let service = build_service();
    let report = service
        .generate_report(&acme(), report_request("50309", "lawn_care"))
        .expect("report");

    let fetched = service.get_report(&acme(), &report.id).expect("own report");
    assert_eq!(fetched, report);

    let err = service
        .get_report(&rival(), &report.id)
        .expect_err("foreign report");
    assert!(matches!(err, IntelligenceError::ReportNotFound));
}

#[test]
fn report_filter_limits_are_capped() {
    let filter = ReportFilter {
        limit: Some(500),
        ..ReportFilter::default()
    };
    assert_eq!(filter.limit(), 100);
    assert_eq!(ReportFilter::default().limit(), 50);
    assert_eq!(ReportFilter::default().offset(), 0);
}

#[test]
fn rank_zip_codes_uses_configured_default() {
    let service = build_service();
    let request = ZipRankingRequest {
        zip_codes: "50311,50310,50309".to_string(),
        service_category: "lawn_care".to_string(),
        top_n: None,
    };

    let rankings = service.rank_zip_codes(&acme(), &request).expect("rankings");
    assert_eq!(rankings.len(), 3);
    assert_eq!(rankings[0].zip_code, "50309");

    let narrowed = service
        .rank_zip_codes(
            &acme(),
            &ZipRankingRequest {
                top_n: Some(1),
                ..request
            },
        )
        .expect("rankings");
    assert_eq!(narrowed.len(), 1);
}

#[test]
fn resolve_zip_codes_trims_and_skips_blanks() {
    let service = build_service();
    let ids = service
        .resolve_zip_codes(" 50309 , ,50310,00000")
        .expect("resolved");
    assert_eq!(ids, vec![ZipCodeId(1), ZipCodeId(2)]);
}

#[test]
fn list_reports_rejects_unknown_category_filter() {
    let service = build_service();
    service
        .generate_report(&acme(), report_request("50309", "lawn_care"))
        .expect("report");

    let err = service
        .list_reports(
            &acme(),
            &ReportFilter {
                service_category: Some("snow_removal".to_string()),
                ..ReportFilter::default()
            },
        )
        .expect_err("unknown category");

    assert!(matches!(err, IntelligenceError::InvalidCategory(ref raw) if raw == "snow_removal"));
}
