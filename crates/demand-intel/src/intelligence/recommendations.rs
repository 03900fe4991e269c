use serde::{Deserialize, Serialize};

use super::domain::{Channel, ServiceCategory};
use super::profile::BuyerProfile;
use super::scoring::clamp_score;

/// Outreach channel suggestion attached to a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecommendation {
    pub channel_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_reach: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingRecommendation {
    pub time_period: String,
    pub rationale: String,
    pub demand_score: f64,
    pub recommended_actions: Vec<String>,
}

/// Stored institutional channels win; generic suggestions derived from the
/// profile are only offered when the geography has none on file.
pub fn channel_recommendations(
    profile: &BuyerProfile,
    category: ServiceCategory,
    channels: &[Channel],
) -> Vec<ChannelRecommendation> {
    if !channels.is_empty() {
        return channels
            .iter()
            .map(|channel| ChannelRecommendation {
                channel_type: channel.channel_type.as_str().to_string(),
                name: Some(channel.name.clone()),
                rationale: format!("Institutional channel: {}", channel.name),
                estimated_reach: channel.estimated_reach,
                estimated_cost_range: None,
                website: channel.website.clone(),
                source_url: channel.source_url.clone(),
            })
            .collect();
    }

    let target = profile.target_households as u64;
    let mut recommendations = Vec::new();

    if profile.homeowner_percentage > 60.0 {
        recommendations.push(generic(
            "direct_mail",
            "High percentage of homeowners who respond well to direct mail",
            target,
            "$0.50-$1.00 per household",
        ));
    }

    let income = &profile.income_distribution;
    if income.high > income.low {
        recommendations.push(generic(
            "digital_ads",
            "Higher income demographic active online",
            target * 3,
            "$2-$5 per 1000 impressions",
        ));
    }

    if matches!(
        category,
        ServiceCategory::LawnCare | ServiceCategory::Security
    ) {
        recommendations.push(generic(
            "door_hangers",
            "Effective for local service providers in residential areas",
            target,
            "$0.15-$0.30 per household",
        ));
    }

    recommendations
}

fn generic(channel_type: &str, rationale: &str, reach: u64, cost: &str) -> ChannelRecommendation {
    ChannelRecommendation {
        channel_type: channel_type.to_string(),
        name: None,
        rationale: rationale.to_string(),
        estimated_reach: Some(reach),
        estimated_cost_range: Some(cost.to_string()),
        website: None,
        source_url: None,
    }
}

pub fn timing_recommendations(
    category: ServiceCategory,
    demand_score: f64,
) -> Vec<TimingRecommendation> {
    match category {
        ServiceCategory::LawnCare => vec![
            timing(
                "Spring (March-May)",
                "Peak season for lawn care services as grass begins growing",
                clamp_score(demand_score * 1.3),
                &[
                    "Launch campaigns in early March",
                    "Focus on fertilization and aeration services",
                    "Target new homeowners",
                ],
            ),
            timing(
                "Summer (June-August)",
                "Ongoing maintenance season with high demand",
                demand_score,
                &[
                    "Maintain consistent messaging",
                    "Offer seasonal packages",
                    "Target properties with larger lots",
                ],
            ),
        ],
        ServiceCategory::Fireworks => vec![timing(
            "Late June - Early July",
            "Fourth of July holiday peak demand",
            clamp_score(demand_score * 1.5),
            &[
                "Begin marketing 2-3 weeks before holiday",
                "Focus on neighborhoods with larger lots",
                "Highlight safety and compliance",
            ],
        )],
        _ => vec![timing(
            "Year-round",
            "Consistent demand throughout the year",
            demand_score,
            &[
                "Maintain consistent presence",
                "Adjust messaging seasonally",
                "Focus on property turnover events",
            ],
        )],
    }
}

fn timing(
    period: &str,
    rationale: &str,
    demand_score: f64,
    actions: &[&str],
) -> TimingRecommendation {
    TimingRecommendation {
        time_period: period.to_string(),
        rationale: rationale.to_string(),
        demand_score,
        recommended_actions: actions.iter().map(|action| action.to_string()).collect(),
    }
}
