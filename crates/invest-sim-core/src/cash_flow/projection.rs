use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::financing::loan::AmortizationSchedule;
use crate::property::input::PropertyInput;
use crate::tables::EngineTables;
use crate::types::Money;
use crate::valuation::appraisal::{appraise_building, blend_valuation};
use crate::InvestSimResult;

/// Projection horizon in years.
pub const PROJECTION_YEARS: u32 = 35;

/// Years in which rent steps down by one further notch.
pub const RENT_STEP_YEARS: [u32; 6] = [10, 15, 20, 25, 30, 35];

/// Rent retained at each step.
pub const RENT_STEP_FACTOR: Decimal = dec!(0.99);

/// Spacing of summary milestones after year one.
const MILESTONE_INTERVAL: u32 = 5;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One year of the long-term projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub year: u32,
    pub rent: Money,
    /// Held at the year-one level
    pub expenses: Money,
    /// Zero once the loan is repaid
    pub debt_service: Money,
    /// Rent − expenses − debt service
    pub cash_flow: Money,
    /// Balance at the end of the year; zero once the term has elapsed
    pub loan_balance: Money,
    pub building_value: Money,
    pub collateral_value: Money,
    /// Running sum of cash flow through this year
    pub cumulative_cash_flow: Money,
}

/// Year-one figures the projection carries forward.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionBasis<'a> {
    pub schedule: &'a AmortizationSchedule,
    pub land_value: Money,
    pub expenses: Money,
    /// Year-one NOI, reused for the income approach every year
    pub noi: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Rent collected in `year`: the base rent reduced 1% at each step year reached.
pub fn rent_in_year(base_rent: Money, year: u32) -> Money {
    let steps = RENT_STEP_YEARS.iter().filter(|y| **y <= year).count();
    base_rent * RENT_STEP_FACTOR.powi(steps as i64)
}

/// Project cash flow, loan balance and collateral over [`PROJECTION_YEARS`].
///
/// The building keeps depreciating from its purchase age; land value is held
/// constant. Collateral reapplies the bank blend to each year's cost basis.
pub fn project(
    input: &PropertyInput,
    tables: &EngineTables,
    basis: &ProjectionBasis<'_>,
) -> InvestSimResult<Vec<ProjectionPoint>> {
    let land_cap_rate = tables.region(input.region)?.land_cap_rate;
    let building_cap_rate = tables.structure(input.structure)?.building_cap_rate;

    let mut points = Vec::with_capacity(PROJECTION_YEARS as usize);
    let mut cumulative = Decimal::ZERO;

    for year in 1..=PROJECTION_YEARS {
        let rent = rent_in_year(input.annual_rent, year);
        let debt_service = basis.schedule.debt_service_in_year(year);
        let cash_flow = rent - basis.expenses - debt_service;
        cumulative += cash_flow;

        let building = appraise_building(input, tables, input.age_in_year(year))?;
        let bank = blend_valuation(
            basis.land_value,
            building.value,
            basis.noi,
            land_cap_rate,
            building_cap_rate,
        );

        points.push(ProjectionPoint {
            year,
            rent,
            expenses: basis.expenses,
            debt_service,
            cash_flow,
            loan_balance: basis.schedule.balance_after_year(year),
            building_value: building.value,
            collateral_value: bank.collateral_value,
            cumulative_cash_flow: cumulative,
        });
    }

    Ok(points)
}

/// Year one and every fifth year, for summary tables.
pub fn milestones(points: &[ProjectionPoint]) -> Vec<&ProjectionPoint> {
    points
        .iter()
        .filter(|p| p.year == 1 || p.year % MILESTONE_INTERVAL == 0)
        .collect()
}
