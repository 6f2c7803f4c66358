use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::property::input::PropertyInput;
use crate::tables::EngineTables;
use crate::types::Money;
use crate::valuation::appraisal::BuildingAppraisal;

/// Year-one operating expenses by line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseBreakdown {
    pub management_fee: Money,
    pub property_tax: Money,
    pub repair_cost: Money,
    pub capital_expenditure: Money,
    pub fire_insurance: Money,
    pub utilities: Money,
    /// Zero for buildings without an elevator
    pub elevator_maintenance: Money,
    pub water_tank_cleaning: Money,
    /// Exact sum of the line items above
    pub total: Money,
}

impl ExpenseBreakdown {
    /// Line items in display order, without the total.
    pub fn items(&self) -> [(&'static str, Money); 8] {
        [
            ("management_fee", self.management_fee),
            ("property_tax", self.property_tax),
            ("repair_cost", self.repair_cost),
            ("capital_expenditure", self.capital_expenditure),
            ("fire_insurance", self.fire_insurance),
            ("utilities", self.utilities),
            ("elevator_maintenance", self.elevator_maintenance),
            ("water_tank_cleaning", self.water_tank_cleaning),
        ]
    }
}

/// Derive year-one expenses.
///
/// `building` is the building struck at its year-one age; its replacement cost
/// sizes the repair budget and its depreciated value drives tax and insurance.
pub fn year_one_expenses(
    input: &PropertyInput,
    tables: &EngineTables,
    building: &BuildingAppraisal,
) -> ExpenseBreakdown {
    let rates = &tables.expenses;

    let repair_rate = if building.age_years <= rates.young_building_max_age {
        rates.repair_rate_young
    } else {
        rates.repair_rate_aged
    };
    let repair_budget = building.replacement_cost * repair_rate;
    let repair_cost = repair_budget * rates.repair_share;
    let capital_expenditure = repair_budget * (Decimal::ONE - rates.repair_share);

    let land_tax_base = input.land_cost / rates.land_tax_base_divisor;
    let building_tax_base = building.value / rates.building_tax_base_divisor;
    let property_tax =
        land_tax_base * rates.property_tax_rate + building_tax_base * rates.property_tax_rate;

    let management_fee = input.annual_rent * rates.management_fee_rate;
    let fire_insurance = building.value * rates.fire_insurance_rate;
    let utilities = rates.utilities_per_room * Decimal::from(input.rooms);
    let elevator_maintenance = if input.has_elevator {
        rates.elevator_maintenance
    } else {
        Decimal::ZERO
    };
    let water_tank_cleaning = rates.water_tank_cleaning;

    let total = management_fee
        + property_tax
        + repair_cost
        + capital_expenditure
        + fire_insurance
        + utilities
        + elevator_maintenance
        + water_tank_cleaning;

    ExpenseBreakdown {
        management_fee,
        property_tax,
        repair_cost,
        capital_expenditure,
        fire_insurance,
        utilities,
        elevator_maintenance,
        water_tank_cleaning,
        total,
    }
}
