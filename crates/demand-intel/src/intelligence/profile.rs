use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Household, OwnershipType, ServiceCategory};

/// Household counts per income band. Only households with both income bounds
/// are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl IncomeDistribution {
    fn record(&mut self, average_income: f64) {
        if average_income > 75_000.0 {
            self.high += 1;
        } else if average_income > 50_000.0 {
            self.medium += 1;
        } else {
            self.low += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }
}

/// Aggregate summary of a household cohort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuyerProfile {
    pub total_households: usize,
    pub target_households: usize,
    pub homeowner_percentage: f64,
    pub renter_percentage: f64,
    pub property_types: BTreeMap<String, usize>,
    pub income_distribution: IncomeDistribution,
    pub average_property_age: f64,
    pub average_lot_size: f64,
}

pub fn build_profile(households: &[Household], _category: ServiceCategory) -> BuyerProfile {
    if households.is_empty() {
        return BuyerProfile::default();
    }

    let total = households.len();
    let mut owners = 0usize;
    let mut renters = 0usize;
    let mut property_types: BTreeMap<String, usize> = BTreeMap::new();
    let mut income_distribution = IncomeDistribution::default();
    let mut ages = RunningMean::default();
    let mut lots = RunningMean::default();

    for household in households {
        match household.ownership_type {
            OwnershipType::Owner => owners += 1,
            OwnershipType::Renter => renters += 1,
            OwnershipType::Unknown => {}
        }

        *property_types
            .entry(household.property_type.as_str().to_string())
            .or_default() += 1;

        if let Some(income) = household.average_income() {
            income_distribution.record(income);
        }
        if let Some(age) = household.known_property_age() {
            ages.push(f64::from(age));
        }
        if let Some(lot) = household.known_lot_size() {
            lots.push(f64::from(lot));
        }
    }

    BuyerProfile {
        total_households: total,
        // Score-based filtering happens when the household set is selected.
        target_households: total,
        homeowner_percentage: percentage(owners, total),
        renter_percentage: percentage(renters, total),
        property_types,
        income_distribution,
        average_property_age: ages.mean(),
        average_lot_size: lots.mean(),
    }
}

pub(crate) fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

#[derive(Default)]
struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}
