use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::property::input::PropertyInput;
use crate::tables::EngineTables;
use crate::types::{Money, Rate};
use crate::valuation::land::LandAppraisal;
use crate::error::InvestSimError;
use crate::InvestSimResult;

/// Weight of the cost approach in the bank appraisal.
pub const COST_APPROACH_WEIGHT: Decimal = dec!(0.7);

/// Weight of the income approach in the bank appraisal.
pub const INCOME_APPROACH_WEIGHT: Decimal = dec!(0.3);

/// Share of the bank appraisal a lender will take as collateral.
pub const COLLATERAL_RATIO: Decimal = dec!(0.8);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Cost-approach building component for a given building age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingAppraisal {
    /// Replacement cost new (万円)
    pub replacement_cost: Money,
    pub useful_life_years: u32,
    /// Age the value was struck at
    pub age_years: u32,
    /// Straight-line depreciated value, floored at zero
    pub value: Money,
}

/// Blended bank valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankValuation {
    pub land_value: Money,
    pub building_value: Money,
    /// Land + depreciated building
    pub cost_approach_value: Money,
    /// Land share of NOI / land cap rate + building share of NOI / building cap rate
    pub income_approach_value: Money,
    /// 0.7 × cost approach + 0.3 × income approach
    pub bank_appraisal_value: Money,
    /// 0.8 × bank appraisal
    pub collateral_value: Money,
}

/// Year-one valuation result with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub land: LandAppraisal,
    pub building: BuildingAppraisal,
    #[serde(flatten)]
    pub bank: BankValuation,
}

// ---------------------------------------------------------------------------
// Cost approach
// ---------------------------------------------------------------------------

/// Depreciated building value when the building is `age_years` old.
///
/// Straight-line over the structure's useful life; a building at or past its
/// life is worth nothing on the cost approach.
pub fn appraise_building(
    input: &PropertyInput,
    tables: &EngineTables,
    age_years: u32,
) -> InvestSimResult<BuildingAppraisal> {
    let rates = tables.structure(input.structure)?;
    let replacement_cost = rates
        .replacement_cost_per_sqm
        .checked_mul(input.building_area_sqm)
        .ok_or_else(|| InvestSimError::InvalidInput {
            field: "buildingArea".into(),
            reason: "Replacement cost is out of range".into(),
        })?;
    let life = rates.useful_life_years;

    let value = if life == 0 || age_years >= life {
        Decimal::ZERO
    } else {
        replacement_cost * Decimal::from(life - age_years) / Decimal::from(life)
    };

    Ok(BuildingAppraisal {
        replacement_cost,
        useful_life_years: life,
        age_years,
        value,
    })
}

// ---------------------------------------------------------------------------
// Blend
// ---------------------------------------------------------------------------

/// Blend cost and income approaches into the bank appraisal and collateral value.
///
/// NOI is split between land and building in proportion to their cost-approach
/// values and each share is capitalised at its own rate. A negative NOI gives
/// no income-approach value.
pub fn blend_valuation(
    land_value: Money,
    building_value: Money,
    noi: Money,
    land_cap_rate: Rate,
    building_cap_rate: Rate,
) -> BankValuation {
    let cost_approach_value = land_value + building_value;

    let income_approach_value = if cost_approach_value <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        let noi_land = noi * land_value / cost_approach_value;
        let noi_building = noi * building_value / cost_approach_value;
        let land_part = if land_cap_rate > Decimal::ZERO {
            noi_land / land_cap_rate
        } else {
            Decimal::ZERO
        };
        let building_part = if building_cap_rate > Decimal::ZERO {
            noi_building / building_cap_rate
        } else {
            Decimal::ZERO
        };
        (land_part + building_part).max(Decimal::ZERO)
    };

    let bank_appraisal_value =
        COST_APPROACH_WEIGHT * cost_approach_value + INCOME_APPROACH_WEIGHT * income_approach_value;
    let collateral_value = COLLATERAL_RATIO * bank_appraisal_value;

    BankValuation {
        land_value,
        building_value,
        cost_approach_value,
        income_approach_value,
        bank_appraisal_value,
        collateral_value,
    }
}

/// Full valuation for a property given its land and building components and NOI.
pub fn value_property(
    input: &PropertyInput,
    tables: &EngineTables,
    land: LandAppraisal,
    building: BuildingAppraisal,
    noi: Money,
) -> InvestSimResult<ValuationResult> {
    let land_cap_rate = tables.region(input.region)?.land_cap_rate;
    let building_cap_rate = tables.structure(input.structure)?.building_cap_rate;
    let bank = blend_valuation(
        land.value,
        building.value,
        noi,
        land_cap_rate,
        building_cap_rate,
    );
    Ok(ValuationResult {
        land,
        building,
        bank,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::input::Structure;
    use crate::property::region::Region;

    fn sample_input() -> PropertyInput {
        PropertyInput {
            address: "沖縄市泡瀬4丁目".into(),
            region: Region::Chunanbu,
            annual_rent: dec!(2304),
            rooms: 24,
            building_cost: dec!(25650),
            land_cost: dec!(8000),
            loan_amount: dec!(30000),
            loan_term_years: 35,
            interest_rate_pct: dec!(2.3),
            structure: Structure::ReinforcedConcrete,
            building_age_years: 0,
            building_area_sqm: dec!(1080),
            land_area_sqm: dec!(600),
            has_elevator: true,
        }
    }

    #[test]
    fn test_building_straight_line() {
        let tables = EngineTables::default();
        let b = appraise_building(&sample_input(), &tables, 1).unwrap();
        // RC: 20 万円/㎡ × 1080 ㎡ = 21,600; 46/47 of that remains after one year
        assert_eq!(b.replacement_cost, dec!(21600));
        assert_eq!(b.useful_life_years, 47);
        assert_eq!(b.value, dec!(21600) * dec!(46) / dec!(47));
    }

    #[test]
    fn test_building_floor_at_zero() {
        let tables = EngineTables::default();
        let mut input = sample_input();
        input.structure = Structure::Wood;
        let at_life = appraise_building(&input, &tables, 22).unwrap();
        let past_life = appraise_building(&input, &tables, 40).unwrap();
        assert_eq!(at_life.value, Decimal::ZERO);
        assert_eq!(past_life.value, Decimal::ZERO);
    }

    #[test]
    fn test_replacement_cost_overflow_is_an_error() {
        let mut input = sample_input();
        input.building_area_sqm = Decimal::MAX / dec!(2);
        let err = appraise_building(&input, &EngineTables::default(), 1).unwrap_err();
        assert_eq!(err.field(), Some("buildingArea"));
    }

    #[test]
    fn test_blend_identities() {
        let v = blend_valuation(dec!(6000), dec!(20000), dec!(1500), dec!(0.034), dec!(0.055));
        assert_eq!(v.cost_approach_value, dec!(26000));
        assert_eq!(
            v.bank_appraisal_value,
            dec!(0.7) * v.cost_approach_value + dec!(0.3) * v.income_approach_value
        );
        assert_eq!(v.collateral_value, dec!(0.8) * v.bank_appraisal_value);
        assert!(v.collateral_value <= v.bank_appraisal_value);
    }

    #[test]
    fn test_income_split_by_component() {
        // All value in land: NOI capitalised entirely at the land rate.
        let v = blend_valuation(dec!(1000), Decimal::ZERO, dec!(34), dec!(0.034), dec!(0.055));
        assert_eq!(v.income_approach_value, dec!(1000));
    }

    #[test]
    fn test_negative_noi_gives_no_income_value() {
        let v = blend_valuation(dec!(6000), dec!(20000), dec!(-300), dec!(0.034), dec!(0.055));
        assert_eq!(v.income_approach_value, Decimal::ZERO);
        assert_eq!(v.bank_appraisal_value, dec!(0.7) * dec!(26000));
    }

    #[test]
    fn test_zero_cost_basis() {
        let v = blend_valuation(Decimal::ZERO, Decimal::ZERO, dec!(500), dec!(0.034), dec!(0.055));
        assert_eq!(v.bank_appraisal_value, Decimal::ZERO);
        assert_eq!(v.collateral_value, Decimal::ZERO);
    }
}
