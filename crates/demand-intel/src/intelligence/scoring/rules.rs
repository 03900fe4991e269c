use super::super::domain::{Household, OwnershipType, PropertyType, ServiceCategory};
use super::{ScoreComponent, ScoreFactor};

pub(crate) type CategoryRule = fn(&Household) -> RuleTally;

/// Base score plus every contribution that fired, before clamping.
pub(crate) struct RuleTally {
    pub base: f64,
    pub components: Vec<ScoreComponent>,
}

impl RuleTally {
    fn starting_at(base: f64) -> Self {
        Self {
            base,
            components: Vec::new(),
        }
    }

    fn add(&mut self, factor: ScoreFactor, points: f64, notes: impl Into<String>) {
        self.components.push(ScoreComponent {
            factor,
            points,
            notes: notes.into(),
        });
    }

    pub(crate) fn raw_total(&self) -> f64 {
        self.base
            + self
                .components
                .iter()
                .map(|component| component.points)
                .sum::<f64>()
    }
}

pub(crate) fn rule_for(category: ServiceCategory) -> CategoryRule {
    match category {
        ServiceCategory::LawnCare => lawn_care,
        ServiceCategory::Security => security,
        ServiceCategory::ItServices => it_services,
        ServiceCategory::Fireworks => fireworks,
        ServiceCategory::HomeImprovement
        | ServiceCategory::Cleaning
        | ServiceCategory::PestControl
        | ServiceCategory::Hvac
        | ServiceCategory::Plumbing
        | ServiceCategory::Electrical
        | ServiceCategory::General => general,
    }
}

fn lawn_care(household: &Household) -> RuleTally {
    let mut tally = RuleTally::starting_at(0.0);

    match household.ownership_type {
        OwnershipType::Owner => tally.add(ScoreFactor::Ownership, 40.0, "owner-occupied"),
        OwnershipType::Renter => tally.add(ScoreFactor::Ownership, 10.0, "renter-occupied"),
        OwnershipType::Unknown => {}
    }

    if let Some(lot) = household.known_lot_size() {
        let points = if lot > 10_000 {
            30.0
        } else if lot > 5_000 {
            20.0
        } else if lot > 2_500 {
            10.0
        } else {
            0.0
        };
        if points > 0.0 {
            tally.add(ScoreFactor::LotSize, points, format!("lot of {lot} sqft"));
        }
    }

    match household.property_type {
        PropertyType::SingleFamily => {
            tally.add(ScoreFactor::PropertyType, 20.0, "single-family home")
        }
        PropertyType::MultiFamily => tally.add(ScoreFactor::PropertyType, 10.0, "multi-family home"),
        _ => {}
    }

    if let Some(income) = household.average_income() {
        if income > 75_000.0 {
            tally.add(ScoreFactor::Income, 10.0, income_note(income));
        } else if income > 50_000.0 {
            tally.add(ScoreFactor::Income, 5.0, income_note(income));
        }
    }

    tally
}

fn security(household: &Household) -> RuleTally {
    let mut tally = RuleTally::starting_at(0.0);

    match household.ownership_type {
        OwnershipType::Owner => tally.add(ScoreFactor::Ownership, 50.0, "owner-occupied"),
        OwnershipType::Renter => tally.add(ScoreFactor::Ownership, 5.0, "renter-occupied"),
        OwnershipType::Unknown => {}
    }

    if let Some(income) = household.average_income() {
        if income > 100_000.0 {
            tally.add(ScoreFactor::Income, 30.0, income_note(income));
        } else if income > 50_000.0 {
            tally.add(ScoreFactor::Income, 15.0, income_note(income));
        }
    }

    if household.property_type == PropertyType::SingleFamily {
        tally.add(ScoreFactor::PropertyType, 20.0, "single-family home");
    }

    tally
}

fn it_services(household: &Household) -> RuleTally {
    let mut tally = RuleTally::starting_at(0.0);

    if let Some(income) = household.average_income() {
        let points = if income > 75_000.0 {
            50.0
        } else if income > 50_000.0 {
            30.0
        } else {
            10.0
        };
        tally.add(ScoreFactor::Income, points, income_note(income));
    }

    if household.property_type == PropertyType::SingleFamily {
        tally.add(ScoreFactor::PropertyType, 30.0, "single-family home office potential");
    }

    if let Some(sqft) = household.property_sqft_min.filter(|sqft| *sqft > 2_000) {
        tally.add(
            ScoreFactor::PropertySize,
            20.0,
            format!("at least {sqft} sqft of living space"),
        );
    }

    tally
}

fn fireworks(household: &Household) -> RuleTally {
    let mut tally = RuleTally::starting_at(0.0);

    if household.is_owner() {
        tally.add(ScoreFactor::Ownership, 40.0, "owner-occupied");
    }

    if let Some(lot) = household.known_lot_size().filter(|lot| *lot > 5_000) {
        tally.add(ScoreFactor::LotSize, 30.0, format!("lot of {lot} sqft"));
    }

    if let Some(income) = household.average_income().filter(|income| *income > 50_000.0) {
        tally.add(ScoreFactor::Income, 30.0, income_note(income));
    }

    tally
}

fn general(household: &Household) -> RuleTally {
    let mut tally = RuleTally::starting_at(50.0);

    if household.is_owner() {
        tally.add(ScoreFactor::Ownership, 20.0, "owner-occupied");
    }

    if let Some(income) = household.average_income() {
        if income > 75_000.0 {
            tally.add(ScoreFactor::Income, 20.0, income_note(income));
        } else if income > 50_000.0 {
            tally.add(ScoreFactor::Income, 10.0, income_note(income));
        }
    }

    tally
}

fn income_note(income: f64) -> String {
    format!("average income ${income:.0}")
}
