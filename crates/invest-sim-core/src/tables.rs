use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::InvestSimError;
use crate::property::input::Structure;
use crate::property::region::Region;
use crate::types::{Money, Rate};
use crate::InvestSimResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Land figures for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRates {
    /// Standard land unit price in yen per ㎡, used when no local reference point matches
    pub land_price_per_sqm: Decimal,
    /// Capitalisation rate applied to the land share of NOI
    pub land_cap_rate: Rate,
}

/// Construction figures for one structure type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureRates {
    /// Replacement cost per ㎡ of floor area (万円)
    pub replacement_cost_per_sqm: Money,
    /// Statutory useful life in years
    pub useful_life_years: u32,
    /// Capitalisation rate applied to the building share of NOI
    pub building_cap_rate: Rate,
}

/// A published land price for a locality (e.g. a prefectural benchmark site).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandReferencePoint {
    /// Locality text matched against the property address
    pub locality: String,
    /// Yen per ㎡
    pub price_per_sqm: Decimal,
}

/// Operating expense assumptions for year one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRates {
    /// Management fee as a share of rent
    pub management_fee_rate: Rate,
    /// Fixed-asset and city-planning tax rate on the assessed base
    pub property_tax_rate: Rate,
    /// Land assessed base = land cost / divisor (residential land relief)
    pub land_tax_base_divisor: Decimal,
    /// Building assessed base = building value / divisor
    pub building_tax_base_divisor: Decimal,
    /// Annual repair budget as a share of replacement cost while the building is young
    pub repair_rate_young: Rate,
    /// Annual repair budget as a share of replacement cost once the building has aged
    pub repair_rate_aged: Rate,
    /// Oldest age (in year one) still budgeted at the young rate
    pub young_building_max_age: u32,
    /// Share of the repair budget expensed as repairs; the remainder is capex reserve
    pub repair_share: Rate,
    /// Fire insurance premium as a share of building value
    pub fire_insurance_rate: Rate,
    /// Common-area utilities per room (万円)
    pub utilities_per_room: Money,
    /// Annual elevator maintenance contract (万円)
    pub elevator_maintenance: Money,
    /// Annual water-tank cleaning (万円)
    pub water_tank_cleaning: Money,
}

/// One-off acquisition cost assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionRates {
    /// Brokerage fee rate on market price (existing buildings only)
    pub brokerage_rate: Rate,
    /// Flat brokerage add-on (万円)
    pub brokerage_flat: Money,
    /// Stamp duty on the sale contract (万円)
    pub stamp_duty: Money,
    /// Registration licence tax on market price
    pub registration_property_rate: Rate,
    /// Mortgage registration tax on the loan amount
    pub registration_loan_rate: Rate,
    /// Scrivener fees (万円)
    pub registration_flat: Money,
    /// Real property acquisition tax on market price
    pub acquisition_tax_rate: Rate,
}

/// Funding solver bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Loan amounts are searched to this granularity (万円)
    pub loan_step: Money,
    pub max_iterations: u32,
}

/// Immutable reference tables the engine is constructed with.
///
/// `Default` carries the reference figures of the Okinawa deployment; a
/// deployment with its own tables loads them from JSON or YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineTables {
    pub regions: BTreeMap<Region, RegionRates>,
    pub structures: BTreeMap<Structure, StructureRates>,
    #[serde(default)]
    pub land_reference_points: Vec<LandReferencePoint>,
    pub expenses: ExpenseRates,
    pub acquisition: AcquisitionRates,
    #[serde(default)]
    pub solver: SolverSettings,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            loan_step: Decimal::ONE,
            max_iterations: 128,
        }
    }
}

impl Default for ExpenseRates {
    fn default() -> Self {
        Self {
            management_fee_rate: dec!(0.05),
            property_tax_rate: dec!(0.014),
            land_tax_base_divisor: dec!(6),
            building_tax_base_divisor: dec!(2),
            repair_rate_young: dec!(0.007),
            repair_rate_aged: dec!(0.010),
            young_building_max_age: 10,
            repair_share: dec!(0.3),
            fire_insurance_rate: dec!(0.001),
            utilities_per_room: dec!(2.3),
            elevator_maintenance: dec!(40),
            water_tank_cleaning: dec!(5),
        }
    }
}

impl Default for AcquisitionRates {
    fn default() -> Self {
        Self {
            brokerage_rate: dec!(0.03),
            brokerage_flat: dec!(6),
            stamp_duty: dec!(6),
            registration_property_rate: dec!(0.015),
            registration_loan_rate: dec!(0.004),
            registration_flat: dec!(10),
            acquisition_tax_rate: dec!(0.03),
        }
    }
}

impl Default for EngineTables {
    fn default() -> Self {
        let regions = BTreeMap::from([
            (
                Region::Naha,
                RegionRates {
                    land_price_per_sqm: dec!(250000),
                    land_cap_rate: dec!(0.032),
                },
            ),
            (
                Region::Chunanbu,
                RegionRates {
                    land_price_per_sqm: dec!(100000),
                    land_cap_rate: dec!(0.034),
                },
            ),
            (
                Region::Hokubu,
                RegionRates {
                    land_price_per_sqm: dec!(45000),
                    land_cap_rate: dec!(0.035),
                },
            ),
        ]);

        let building_cap_rate = dec!(0.055);
        let structures = BTreeMap::from([
            (
                Structure::ReinforcedConcrete,
                StructureRates {
                    replacement_cost_per_sqm: dec!(20),
                    useful_life_years: 47,
                    building_cap_rate,
                },
            ),
            (
                Structure::Steel,
                StructureRates {
                    replacement_cost_per_sqm: dec!(18.6),
                    useful_life_years: 34,
                    building_cap_rate,
                },
            ),
            (
                Structure::Wood,
                StructureRates {
                    replacement_cost_per_sqm: dec!(17.8),
                    useful_life_years: 22,
                    building_cap_rate,
                },
            ),
            (
                Structure::ReinforcedConcreteBlock,
                StructureRates {
                    replacement_cost_per_sqm: dec!(18),
                    useful_life_years: 38,
                    building_cap_rate,
                },
            ),
        ]);

        Self {
            regions,
            structures,
            land_reference_points: Vec::new(),
            expenses: ExpenseRates::default(),
            acquisition: AcquisitionRates::default(),
            solver: SolverSettings::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl EngineTables {
    /// Parse and validate tables from JSON text.
    pub fn from_json_str(json: &str) -> InvestSimResult<Self> {
        let tables: EngineTables = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Reject tables the engine cannot evaluate: missing rows, non-positive
    /// useful lives or cap rates, negative prices or rates.
    pub fn validate(&self) -> InvestSimResult<()> {
        for region in Region::ALL {
            let rates = self.regions.get(&region).ok_or_else(|| {
                InvestSimError::InvalidTables(format!("no land figures for region {region}"))
            })?;
            if rates.land_price_per_sqm < Decimal::ZERO {
                return Err(InvestSimError::InvalidTables(format!(
                    "land price for {region} is negative"
                )));
            }
            if rates.land_cap_rate <= Decimal::ZERO {
                return Err(InvestSimError::InvalidTables(format!(
                    "land cap rate for {region} must be positive"
                )));
            }
        }

        for structure in Structure::ALL {
            let rates = self.structures.get(&structure).ok_or_else(|| {
                InvestSimError::InvalidTables(format!("no figures for structure {structure}"))
            })?;
            if rates.useful_life_years == 0 {
                return Err(InvestSimError::InvalidTables(format!(
                    "useful life for {structure} must be positive"
                )));
            }
            if rates.building_cap_rate <= Decimal::ZERO {
                return Err(InvestSimError::InvalidTables(format!(
                    "building cap rate for {structure} must be positive"
                )));
            }
            if rates.replacement_cost_per_sqm < Decimal::ZERO {
                return Err(InvestSimError::InvalidTables(format!(
                    "replacement cost for {structure} is negative"
                )));
            }
        }

        if let Some(point) = self
            .land_reference_points
            .iter()
            .find(|p| p.locality.trim().is_empty() || p.price_per_sqm < Decimal::ZERO)
        {
            return Err(InvestSimError::InvalidTables(format!(
                "land reference point '{}' needs a locality and a non-negative price",
                point.locality
            )));
        }

        let e = &self.expenses;
        if e.land_tax_base_divisor <= Decimal::ZERO || e.building_tax_base_divisor <= Decimal::ZERO
        {
            return Err(InvestSimError::InvalidTables(
                "tax base divisors must be positive".into(),
            ));
        }
        if e.repair_share < Decimal::ZERO || e.repair_share > Decimal::ONE {
            return Err(InvestSimError::InvalidTables(
                "repair share must lie between 0 and 1".into(),
            ));
        }
        let expense_figures = [
            e.management_fee_rate,
            e.property_tax_rate,
            e.repair_rate_young,
            e.repair_rate_aged,
            e.fire_insurance_rate,
            e.utilities_per_room,
            e.elevator_maintenance,
            e.water_tank_cleaning,
        ];
        let a = &self.acquisition;
        let acquisition_figures = [
            a.brokerage_rate,
            a.brokerage_flat,
            a.stamp_duty,
            a.registration_property_rate,
            a.registration_loan_rate,
            a.registration_flat,
            a.acquisition_tax_rate,
        ];
        if expense_figures
            .iter()
            .chain(acquisition_figures.iter())
            .any(|v| *v < Decimal::ZERO)
        {
            return Err(InvestSimError::InvalidTables(
                "expense and acquisition figures must be non-negative".into(),
            ));
        }

        if self.solver.loan_step <= Decimal::ZERO || self.solver.max_iterations == 0 {
            return Err(InvestSimError::InvalidTables(
                "solver loan step and iteration cap must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Land figures for a region. Tables are validated at engine construction,
    /// so a miss here means the caller bypassed validation.
    pub fn region(&self, region: Region) -> InvestSimResult<&RegionRates> {
        self.regions.get(&region).ok_or_else(|| {
            InvestSimError::InvalidTables(format!("no land figures for region {region}"))
        })
    }

    pub fn structure(&self, structure: Structure) -> InvestSimResult<&StructureRates> {
        self.structures.get(&structure).ok_or_else(|| {
            InvestSimError::InvalidTables(format!("no figures for structure {structure}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_validate() {
        EngineTables::default().validate().unwrap();
    }

    #[test]
    fn test_json_round_trip_keeps_tables() {
        let tables = EngineTables::default();
        let json = serde_json::to_string(&tables).unwrap();
        let parsed = EngineTables::from_json_str(&json).unwrap();
        assert_eq!(parsed, tables);
    }

    #[test]
    fn test_missing_region_rejected() {
        let mut tables = EngineTables::default();
        tables.regions.remove(&Region::Hokubu);
        assert!(matches!(
            tables.validate(),
            Err(InvestSimError::InvalidTables(_))
        ));
    }

    #[test]
    fn test_zero_useful_life_rejected() {
        let mut tables = EngineTables::default();
        tables
            .structures
            .get_mut(&Structure::Wood)
            .unwrap()
            .useful_life_years = 0;
        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_blank_reference_locality_rejected() {
        let mut tables = EngineTables::default();
        tables.land_reference_points.push(LandReferencePoint {
            locality: "  ".into(),
            price_per_sqm: dec!(100000),
        });
        assert!(tables.validate().is_err());
    }
}
