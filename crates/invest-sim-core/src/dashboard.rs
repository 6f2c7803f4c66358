use rust_decimal::Decimal;
use serde::Serialize;

use crate::cash_flow::expenses::ExpenseBreakdown;
use crate::cash_flow::projection::ProjectionPoint;
use crate::credit::rank::Rank;
use crate::financing::acquisition::FundingPlan;
use crate::simulation::SimulationReport;

// ---------------------------------------------------------------------------
// Dashboard view
// ---------------------------------------------------------------------------

/// Flat, rounded view of a [`SimulationReport`] in the shape the results
/// dashboard reads.
///
/// Amounts are whole 万円 and ratios carry two decimals. Every figure is a
/// JSON number so the dashboard can do arithmetic on it directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardResult {
    #[serde(with = "rust_decimal::serde::float")]
    pub market_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost_approach_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub income_approach_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub bank_appraisal_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub collateral_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub surface_yield: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_yield: Decimal,
    /// Year-one cash flow
    #[serde(with = "rust_decimal::serde::float")]
    pub cash_flow: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub dscr: Decimal,
    /// `null` when there is no collateral
    #[serde(with = "rust_decimal::serde::float_option")]
    pub ltv: Option<Decimal>,
    pub score: u32,
    pub rank: Rank,
    pub long_term_projection: Vec<DashboardYear>,
    pub year1_expenses: DashboardExpenses,
    #[serde(with = "rust_decimal::serde::float")]
    pub yearly_revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub yearly_loan_payment: Decimal,
    /// Zero without rent
    #[serde(with = "rust_decimal::serde::float")]
    pub break_even_occupancy: Decimal,
    /// Zero when the loan covers the whole acquisition
    #[serde(with = "rust_decimal::serde::float")]
    pub cash_on_cash_return: Decimal,
    /// `null` without a loan
    #[serde(with = "rust_decimal::serde::float_option")]
    pub collateral_coverage_ratio: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub unsecured_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated_loan_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub required_equity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub user_loan_amount: Decimal,
    pub cost_approach_breakdown: CostApproachBreakdown,
    pub funding_plan: DashboardFundingPlan,
    pub land_price_source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardYear {
    pub year: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub cash_flow: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub loan_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub collateral_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cumulative_cash_flow: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardExpenses {
    #[serde(with = "rust_decimal::serde::float")]
    pub repair_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub property_tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub fire_insurance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub management_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub capital_expenditure: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub utilities: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub elevator_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub water_tank_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostApproachBreakdown {
    #[serde(with = "rust_decimal::serde::float")]
    pub land: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub building: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardFundingPlan {
    #[serde(with = "rust_decimal::serde::float")]
    pub building_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub land_cost: Decimal,
    pub other_costs_details: OtherCostsDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherCostsDetails {
    #[serde(with = "rust_decimal::serde::float")]
    pub brokerage_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub stamp_duty: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub registration_tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub property_acquisition_tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Whole 万円. Midpoints round to even.
fn money(v: Decimal) -> Decimal {
    v.round_dp(0)
}

fn ratio(v: Decimal) -> Decimal {
    v.round_dp(2)
}

impl From<&ExpenseBreakdown> for DashboardExpenses {
    fn from(e: &ExpenseBreakdown) -> Self {
        Self {
            repair_cost: ratio(e.repair_cost),
            property_tax: ratio(e.property_tax),
            fire_insurance: ratio(e.fire_insurance),
            management_fee: ratio(e.management_fee),
            capital_expenditure: ratio(e.capital_expenditure),
            utilities: ratio(e.utilities),
            elevator_cost: ratio(e.elevator_maintenance),
            water_tank_cost: ratio(e.water_tank_cleaning),
            total: ratio(e.total),
        }
    }
}

impl From<&ProjectionPoint> for DashboardYear {
    fn from(p: &ProjectionPoint) -> Self {
        Self {
            year: p.year,
            cash_flow: money(p.cash_flow),
            loan_balance: money(p.loan_balance),
            collateral_value: money(p.collateral_value),
            cumulative_cash_flow: money(p.cumulative_cash_flow),
        }
    }
}

impl From<&FundingPlan> for DashboardFundingPlan {
    fn from(plan: &FundingPlan) -> Self {
        let costs = &plan.acquisition_costs;
        Self {
            building_cost: money(plan.building_cost),
            land_cost: money(plan.land_cost),
            other_costs_details: OtherCostsDetails {
                brokerage_fee: ratio(costs.brokerage_fee),
                stamp_duty: ratio(costs.stamp_duty),
                registration_tax: ratio(costs.registration_tax),
                property_acquisition_tax: ratio(costs.property_acquisition_tax),
                total: money(costs.total),
            },
        }
    }
}

impl From<&SimulationReport> for DashboardResult {
    fn from(r: &SimulationReport) -> Self {
        let bank = &r.valuation.bank;
        Self {
            market_price: money(r.funding_plan.building_cost + r.funding_plan.land_cost),
            cost_approach_value: money(bank.cost_approach_value),
            income_approach_value: money(bank.income_approach_value),
            bank_appraisal_value: money(r.bank_appraisal_value),
            collateral_value: money(r.collateral_value),
            surface_yield: ratio(r.surface_yield),
            net_yield: ratio(r.net_yield),
            cash_flow: money(r.cash_flow_year1),
            dscr: ratio(r.risk.dscr),
            ltv: r.risk.ltv.map(ratio),
            score: r.risk.score,
            rank: r.risk.rank,
            long_term_projection: r.long_term_projection.iter().map(DashboardYear::from).collect(),
            year1_expenses: DashboardExpenses::from(&r.expenses),
            yearly_revenue: ratio(r.yearly_revenue),
            yearly_loan_payment: ratio(r.annual_debt_service),
            break_even_occupancy: r.break_even_occupancy.map(ratio).unwrap_or(Decimal::ZERO),
            cash_on_cash_return: r.cash_on_cash_return.map(ratio).unwrap_or(Decimal::ZERO),
            collateral_coverage_ratio: r.risk.collateral_coverage_ratio.map(ratio),
            unsecured_amount: money(r.risk.unsecured_amount),
            estimated_loan_amount: money(r.estimated_loan_amount),
            required_equity: money(r.required_equity),
            user_loan_amount: r.user_loan_amount,
            cost_approach_breakdown: CostApproachBreakdown {
                land: money(bank.land_value),
                building: money(bank.cost_approach_value - bank.land_value),
            },
            funding_plan: DashboardFundingPlan::from(&r.funding_plan),
            land_price_source: r.land_price_source.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::input::{ElevatorFlag, SimulationRequest};
    use crate::Simulator;
    use rust_decimal_macros::dec;

    fn report() -> SimulationReport {
        let request = SimulationRequest {
            address: Some("沖縄市泡瀬4丁目".into()),
            region: None,
            rent: Some(dec!(2304)),
            rooms: Some(dec!(24)),
            building_cost: Some(dec!(25650)),
            land_cost: Some(dec!(8000)),
            loan_amount: Some(dec!(30000)),
            loan_term: Some(dec!(35)),
            interest_rate: Some(dec!(2.3)),
            structure: Some("RC".into()),
            building_age: Some(dec!(0)),
            building_area: Some(dec!(1080)),
            land_area: Some(dec!(600)),
            has_elevator: Some(ElevatorFlag::Text("yes".into())),
        };
        Simulator::default()
            .simulate_request(&request)
            .unwrap()
            .result
    }

    #[test]
    fn test_dashboard_keys_are_numbers() {
        let json = serde_json::to_value(DashboardResult::from(&report())).unwrap();

        for key in [
            "market_price",
            "cash_flow",
            "yearly_loan_payment",
            "cost_approach_value",
            "income_approach_value",
            "estimated_loan_amount",
            "required_equity",
            "dscr",
            "ltv",
        ] {
            assert!(json[key].is_number(), "{key} is {}", json[key]);
        }
        assert!(json["year1_expenses"]["elevator_cost"].is_number());
        assert!(json["year1_expenses"]["water_tank_cost"].is_number());
        assert!(json["cost_approach_breakdown"]["land"].is_number());
        assert!(json["cost_approach_breakdown"]["building"].is_number());
        assert!(json["funding_plan"]["other_costs_details"]["brokerage_fee"].is_number());
        assert!(json["funding_plan"]["other_costs_details"]["total"].is_number());
        assert_eq!(json["rank"], "B");
        assert_eq!(json["market_price"].as_f64(), Some(33650.0));
        assert_eq!(json["long_term_projection"].as_array().map(Vec::len), Some(35));
        assert!(json.get("result").is_none());
    }

    #[test]
    fn test_dashboard_rounding() {
        let r = report();
        let d = DashboardResult::from(&r);
        assert_eq!(d.estimated_loan_amount, r.estimated_loan_amount.round_dp(0));
        assert_eq!(d.dscr, r.risk.dscr.round_dp(2));
        assert_eq!(d.year1_expenses.property_tax, r.expenses.property_tax.round_dp(2));
        assert_eq!(d.long_term_projection[0].cash_flow.scale(), 0);
        assert_eq!(
            d.cost_approach_breakdown.building,
            (r.valuation.bank.cost_approach_value - r.valuation.bank.land_value).round_dp(0)
        );
    }

    #[test]
    fn test_missing_figures_fall_back_like_the_form_expects() {
        let mut r = report();
        r.break_even_occupancy = None;
        r.cash_on_cash_return = None;
        r.risk.collateral_coverage_ratio = None;
        let json = serde_json::to_value(DashboardResult::from(&r)).unwrap();
        assert_eq!(json["break_even_occupancy"].as_f64(), Some(0.0));
        assert_eq!(json["cash_on_cash_return"].as_f64(), Some(0.0));
        assert!(json["collateral_coverage_ratio"].is_null());
    }
}
