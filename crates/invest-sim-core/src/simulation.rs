use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::cash_flow::expenses::{year_one_expenses, ExpenseBreakdown};
use crate::cash_flow::projection::{project, ProjectionBasis, ProjectionPoint};
use crate::credit::rank::{score_risk, RiskMetrics};
use crate::financing::acquisition::{funding_plan, FundingPlan};
use crate::financing::funding::{solve_max_loan, FundingOutcome, FundingProblem, FundingSolution};
use crate::financing::loan::{amortize, annual_payment_factor, LoanTerms};
use crate::property::input::{PropertyInput, SimulationRequest};
use crate::property::region::Region;
use crate::tables::EngineTables;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::valuation::appraisal::{appraise_building, value_property, ValuationResult};
use crate::valuation::land::appraise_land;
use crate::InvestSimResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything the dashboard shows for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub region: Region,
    /// Desired loan amount, echoed
    pub user_loan_amount: Money,
    /// Risk of the desired loan: DSCR, LTV, coverage, unsecured amount, score, rank
    #[serde(flatten)]
    pub risk: RiskMetrics,
    pub cash_flow_year1: Money,
    /// (expenses + debt service) / rent × 100; `None` without rent
    pub break_even_occupancy: Option<Percent>,
    pub rooms_needed: Option<u32>,
    /// Largest rank-A loan (or best-available fallback)
    pub estimated_loan_amount: Money,
    pub required_equity: Money,
    pub funding: FundingSolution,
    pub bank_appraisal_value: Money,
    pub collateral_value: Money,
    pub land_price_source: String,
    pub valuation: ValuationResult,
    pub yearly_revenue: Money,
    pub expenses: ExpenseBreakdown,
    pub noi: Money,
    pub annual_debt_service: Money,
    pub monthly_payment: Money,
    /// Rent / market price × 100
    pub surface_yield: Percent,
    /// (rent − expenses) / market price × 100
    pub net_yield: Percent,
    /// Year-one cash flow / equity × 100; `None` when the loan covers everything
    pub cash_on_cash_return: Option<Percent>,
    pub funding_plan: FundingPlan,
    pub long_term_projection: Vec<ProjectionPoint>,
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// Investment simulation engine bound to one set of reference tables.
///
/// Holds no per-request state; a single instance can serve any number of
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct Simulator {
    tables: EngineTables,
}

impl Default for Simulator {
    fn default() -> Self {
        Self {
            tables: EngineTables::default(),
        }
    }
}

impl Simulator {
    /// Build an engine over `tables`, rejecting tables it cannot evaluate.
    pub fn new(tables: EngineTables) -> InvestSimResult<Self> {
        tables.validate()?;
        Ok(Self { tables })
    }

    pub fn tables(&self) -> &EngineTables {
        &self.tables
    }

    /// Validate a wire request and simulate it.
    pub fn simulate_request(
        &self,
        request: &SimulationRequest,
    ) -> InvestSimResult<ComputationOutput<SimulationReport>> {
        let input = PropertyInput::from_request(request)?;
        self.simulate(&input)
    }

    /// Run the full valuation, risk, funding and projection pipeline.
    pub fn simulate(
        &self,
        input: &PropertyInput,
    ) -> InvestSimResult<ComputationOutput<SimulationReport>> {
        input.validate()?;
        tracing::debug!(
            address = %input.address,
            region = %input.region,
            structure = %input.structure,
            "simulating property"
        );

        let tables = &self.tables;
        let mut warnings: Vec<String> = Vec::new();
        let market_price = input.market_price();

        // -- Valuation and operating figures
        let land = appraise_land(input, tables)?;
        let land_price_source = land.source_label.clone();
        let land_value = land.value;
        let building = appraise_building(input, tables, input.age_in_year(1))?;
        if building.value.is_zero() {
            warnings.push(format!(
                "Building is fully depreciated (age {} vs useful life {}); collateral rests on land",
                building.age_years, building.useful_life_years
            ));
        }
        let expenses = year_one_expenses(input, tables, &building);
        let noi = input.annual_rent - expenses.total;
        let valuation = value_property(input, tables, land, building, noi)?;
        let collateral_value = valuation.bank.collateral_value;

        // -- Desired loan
        let schedule = amortize(&LoanTerms {
            principal: input.loan_amount,
            annual_rate: input.interest_rate(),
            term_years: input.loan_term_years,
        })?;
        let annual_debt_service = schedule.annual_debt_service;
        let risk = score_risk(noi, annual_debt_service, input.loan_amount, collateral_value);
        let cash_flow_year1 = input.annual_rent - expenses.total - annual_debt_service;

        if cash_flow_year1 < Decimal::ZERO {
            warnings.push(format!("Year-one cash flow is negative ({cash_flow_year1})"));
        }
        if risk.dscr < Decimal::ONE {
            warnings.push(format!(
                "DSCR {} is below 1.0: NOI does not cover debt service",
                risk.dscr.round_dp(2)
            ));
        }
        if input.loan_amount > market_price {
            warnings.push("Desired loan exceeds the market price".into());
        }

        let (break_even_occupancy, rooms_needed) =
            break_even(input, expenses.total, annual_debt_service);
        if break_even_occupancy.is_none() {
            warnings.push("No rent: break-even occupancy is undefined".into());
        }

        // -- Funding
        let plan = funding_plan(input, &tables.acquisition, input.loan_amount);
        let problem = FundingProblem {
            noi,
            payment_factor: annual_payment_factor(input.interest_rate(), input.loan_term_years)?,
            collateral_value,
            loan_ceiling: market_price,
            total_acquisition_cost: plan.total_acquisition_cost,
        };
        let funding = solve_max_loan(&problem, &tables.solver)?;
        if funding.outcome == FundingOutcome::BestAvailable {
            warnings.push(format!(
                "No loan up to the market price reaches rank A; best available rank is {}",
                funding.achieved_rank
            ));
        }

        let equity = plan.total_acquisition_cost - input.loan_amount;
        let cash_on_cash_return = if equity > Decimal::ZERO {
            Some(cash_flow_year1 / equity * dec!(100))
        } else {
            None
        };

        // -- Projection
        let long_term_projection = project(
            input,
            tables,
            &ProjectionBasis {
                schedule: &schedule,
                land_value,
                expenses: expenses.total,
                noi,
            },
        )?;

        let report = SimulationReport {
            region: input.region,
            user_loan_amount: input.loan_amount,
            cash_flow_year1,
            break_even_occupancy,
            rooms_needed,
            estimated_loan_amount: funding.estimated_loan_amount,
            required_equity: funding.required_equity,
            bank_appraisal_value: valuation.bank.bank_appraisal_value,
            collateral_value,
            land_price_source,
            yearly_revenue: input.annual_rent,
            noi,
            annual_debt_service,
            monthly_payment: schedule.monthly_payment,
            surface_yield: input.annual_rent / market_price * dec!(100),
            net_yield: noi / market_price * dec!(100),
            cash_on_cash_return,
            funding_plan: plan,
            long_term_projection,
            risk,
            funding,
            valuation,
            expenses,
        };

        tracing::debug!(
            rank = %report.risk.rank,
            dscr = %report.risk.dscr,
            ltv = ?report.risk.ltv,
            estimated_loan = %report.estimated_loan_amount,
            "simulation complete"
        );

        let assumptions = serde_json::json!({
            "region": input.region,
            "structure": input.structure,
            "market_price": market_price.to_string(),
            "interest_rate_pct": input.interest_rate_pct.to_string(),
            "loan_term_years": input.loan_term_years,
            "cost_approach_weight": "0.7",
            "income_approach_weight": "0.3",
            "collateral_ratio": "0.8",
            "projection_years": report.long_term_projection.len(),
        });

        Ok(with_metadata(
            "Bank-style investment simulation: cost/income blended appraisal, DSCR x LTV rank matrix, rank-A funding bisection, 35-year projection",
            &assumptions,
            warnings,
            report,
        ))
    }
}

/// Occupancy at which rent covers expenses and debt service, and the rooms
/// that must be let to reach it.
fn break_even(
    input: &PropertyInput,
    expenses: Money,
    debt_service: Money,
) -> (Option<Percent>, Option<u32>) {
    if input.annual_rent <= Decimal::ZERO {
        return (None, None);
    }
    let occupancy = (expenses + debt_service) / input.annual_rent * dec!(100);
    let rooms = (Decimal::from(input.rooms) * occupancy / dec!(100))
        .ceil()
        .to_u32();
    (Some(occupancy), rooms)
}
