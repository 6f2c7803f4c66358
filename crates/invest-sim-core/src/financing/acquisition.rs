use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::property::input::PropertyInput;
use crate::tables::AcquisitionRates;
use crate::types::Money;

/// One-off costs of closing the purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionCosts {
    /// Zero for new construction bought from the builder
    pub brokerage_fee: Money,
    pub stamp_duty: Money,
    /// Title registration plus mortgage registration and scrivener fees
    pub registration_tax: Money,
    pub property_acquisition_tax: Money,
    pub total: Money,
}

/// Uses of funds for the purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingPlan {
    pub building_cost: Money,
    pub land_cost: Money,
    #[serde(flatten)]
    pub acquisition_costs: AcquisitionCosts,
    /// Market price plus acquisition costs
    pub total_acquisition_cost: Money,
}

/// Acquisition costs for buying `input` with a mortgage of `loan_amount`.
pub fn acquisition_costs(
    input: &PropertyInput,
    rates: &AcquisitionRates,
    loan_amount: Money,
) -> AcquisitionCosts {
    let market_price = input.market_price();

    let brokerage_fee = if input.building_age_years > 0 {
        market_price * rates.brokerage_rate + rates.brokerage_flat
    } else {
        Decimal::ZERO
    };
    let stamp_duty = rates.stamp_duty;
    let registration_tax = market_price * rates.registration_property_rate
        + loan_amount * rates.registration_loan_rate
        + rates.registration_flat;
    let property_acquisition_tax = market_price * rates.acquisition_tax_rate;

    AcquisitionCosts {
        brokerage_fee,
        stamp_duty,
        registration_tax,
        property_acquisition_tax,
        total: brokerage_fee + stamp_duty + registration_tax + property_acquisition_tax,
    }
}

/// Funding plan: the purchase price split into its parts plus closing costs.
pub fn funding_plan(
    input: &PropertyInput,
    rates: &AcquisitionRates,
    loan_amount: Money,
) -> FundingPlan {
    let acquisition_costs = acquisition_costs(input, rates, loan_amount);
    let total_acquisition_cost = input.market_price() + acquisition_costs.total;
    FundingPlan {
        building_cost: input.building_cost,
        land_cost: input.land_cost,
        acquisition_costs,
        total_acquisition_cost,
    }
}
