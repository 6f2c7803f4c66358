use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InvestSimError;
use crate::property::region::{classify_region, Region};
use crate::types::{Money, Rate};
use crate::InvestSimResult;

/// Longest loan term the engine will amortise, and the projection horizon.
pub const MAX_LOAN_TERM_YEARS: u32 = 35;

/// Highest annual interest rate accepted, in percent.
pub const MAX_INTEREST_RATE_PCT: Decimal = dec!(100);

/// Oldest building accepted, in years.
pub const MAX_BUILDING_AGE_YEARS: u32 = 200;

/// Largest rent, cost or loan amount accepted (万円).
pub const MAX_AMOUNT: Money = dec!(1000000000000);

/// Largest building or land area accepted (㎡).
pub const MAX_AREA_SQM: Decimal = dec!(100000000);

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

/// Building structure. Drives replacement cost, useful life and building cap rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Structure {
    #[serde(rename = "RC")]
    ReinforcedConcrete,
    Wood,
    #[serde(rename = "RC_Block")]
    ReinforcedConcreteBlock,
    Steel,
}

impl Structure {
    pub const ALL: [Structure; 4] = [
        Structure::ReinforcedConcrete,
        Structure::Wood,
        Structure::ReinforcedConcreteBlock,
        Structure::Steel,
    ];

    /// Wire code used by the request form.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ReinforcedConcrete => "RC",
            Self::Wood => "Wood",
            Self::ReinforcedConcreteBlock => "RC_Block",
            Self::Steel => "Steel",
        }
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Structure {
    type Err = InvestSimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "RC" | "ReinforcedConcrete" => Ok(Self::ReinforcedConcrete),
            "Wood" => Ok(Self::Wood),
            "RC_Block" | "ReinforcedConcreteBlock" => Ok(Self::ReinforcedConcreteBlock),
            "Steel" => Ok(Self::Steel),
            other => Err(InvestSimError::InvalidInput {
                field: "structure".into(),
                reason: format!("'{other}' is not one of RC, Wood, RC_Block, Steel"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Request (wire shape)
// ---------------------------------------------------------------------------

/// Elevator flag as submitted: the form sends "yes"/"no", other clients send booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElevatorFlag {
    Bool(bool),
    Text(String),
}

/// Flat request object as submitted by the front end.
///
/// Every field is optional so that a missing value is reported against its
/// field name instead of failing deserialisation wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Annual rent (万円)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_amount: Option<Decimal>,
    /// Years
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_term: Option<Decimal>,
    /// Annual interest rate in percent (2.3 = 2.3%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_age: Option<Decimal>,
    /// Floor area (㎡)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_area: Option<Decimal>,
    /// Land area (㎡)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_area: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_elevator: Option<ElevatorFlag>,
}

// ---------------------------------------------------------------------------
// Validated input
// ---------------------------------------------------------------------------

/// Validated, immutable property and loan parameters for one simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInput {
    pub address: String,
    pub region: Region,
    /// Annual rent at full occupancy
    pub annual_rent: Money,
    pub rooms: u32,
    pub building_cost: Money,
    pub land_cost: Money,
    /// Desired loan amount
    pub loan_amount: Money,
    pub loan_term_years: u32,
    /// Annual interest rate in percent
    pub interest_rate_pct: Decimal,
    pub structure: Structure,
    pub building_age_years: u32,
    pub building_area_sqm: Decimal,
    pub land_area_sqm: Decimal,
    pub has_elevator: bool,
}

impl PropertyInput {
    /// Validate a wire request, resolving the region from the address when it
    /// was not supplied. The first offending field is reported.
    pub fn from_request(request: &SimulationRequest) -> InvestSimResult<Self> {
        let address = request
            .address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| InvestSimError::MissingField("address".into()))?
            .to_string();

        let region = match request.region.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => r.parse::<Region>()?,
            _ => classify_region(&address).ok_or_else(|| InvestSimError::UnknownRegion {
                address: address.clone(),
            })?,
        };

        let structure = request
            .structure
            .as_deref()
            .ok_or_else(|| InvestSimError::MissingField("structure".into()))?
            .parse::<Structure>()?;

        let has_elevator = match &request.has_elevator {
            None => return Err(InvestSimError::MissingField("hasElevator".into())),
            Some(ElevatorFlag::Bool(b)) => *b,
            Some(ElevatorFlag::Text(t)) => match t.trim() {
                "yes" | "true" => true,
                "no" | "false" => false,
                other => {
                    return Err(InvestSimError::InvalidInput {
                        field: "hasElevator".into(),
                        reason: format!("'{other}' must be 'yes' or 'no'"),
                    })
                }
            },
        };

        let input = PropertyInput {
            address,
            region,
            annual_rent: required(request.rent, "rent")?,
            rooms: whole_number(request.rooms, "rooms")?,
            building_cost: required(request.building_cost, "buildingCost")?,
            land_cost: required(request.land_cost, "landCost")?,
            loan_amount: required(request.loan_amount, "loanAmount")?,
            loan_term_years: whole_number(request.loan_term, "loanTerm")?,
            interest_rate_pct: required(request.interest_rate, "interestRate")?,
            structure,
            building_age_years: whole_number(request.building_age, "buildingAge")?,
            building_area_sqm: required(request.building_area, "buildingArea")?,
            land_area_sqm: required(request.land_area, "landArea")?,
            has_elevator,
        };

        input.validate()?;
        Ok(input)
    }

    /// Range checks shared by the request path and direct construction.
    pub fn validate(&self) -> InvestSimResult<()> {
        let non_negative = [
            ("rent", self.annual_rent),
            ("buildingCost", self.building_cost),
            ("landCost", self.land_cost),
            ("loanAmount", self.loan_amount),
            ("interestRate", self.interest_rate_pct),
            ("buildingArea", self.building_area_sqm),
            ("landArea", self.land_area_sqm),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(InvestSimError::InvalidInput {
                    field: field.into(),
                    reason: "Must be zero or greater".into(),
                });
            }
        }

        let upper_bounds = [
            ("rent", self.annual_rent, MAX_AMOUNT),
            ("buildingCost", self.building_cost, MAX_AMOUNT),
            ("landCost", self.land_cost, MAX_AMOUNT),
            ("loanAmount", self.loan_amount, MAX_AMOUNT),
            ("interestRate", self.interest_rate_pct, MAX_INTEREST_RATE_PCT),
            ("buildingArea", self.building_area_sqm, MAX_AREA_SQM),
            ("landArea", self.land_area_sqm, MAX_AREA_SQM),
        ];
        for (field, value, max) in upper_bounds {
            if value > max {
                return Err(InvestSimError::InvalidInput {
                    field: field.into(),
                    reason: format!("Must not exceed {max}"),
                });
            }
        }

        if self.building_age_years > MAX_BUILDING_AGE_YEARS {
            return Err(InvestSimError::InvalidInput {
                field: "buildingAge".into(),
                reason: format!("Must not exceed {MAX_BUILDING_AGE_YEARS} years"),
            });
        }

        if self.rooms < 1 {
            return Err(InvestSimError::InvalidInput {
                field: "rooms".into(),
                reason: "At least one room is required".into(),
            });
        }

        if self.loan_term_years < 1 || self.loan_term_years > MAX_LOAN_TERM_YEARS {
            return Err(InvestSimError::InvalidInput {
                field: "loanTerm".into(),
                reason: format!("Loan term must be between 1 and {MAX_LOAN_TERM_YEARS} years"),
            });
        }

        if self.market_price() <= Decimal::ZERO {
            return Err(InvestSimError::InvalidInput {
                field: "buildingCost".into(),
                reason: "Building cost plus land cost must be positive".into(),
            });
        }

        if self.building_area_sqm.is_zero() && self.land_area_sqm.is_zero() {
            return Err(InvestSimError::InvalidInput {
                field: "buildingArea".into(),
                reason: "Building area and land area cannot both be zero".into(),
            });
        }

        Ok(())
    }

    /// Base transaction price before acquisition costs.
    pub fn market_price(&self) -> Money {
        self.building_cost + self.land_cost
    }

    /// Interest rate as a decimal (2.3% → 0.023).
    pub fn interest_rate(&self) -> Rate {
        self.interest_rate_pct / dec!(100)
    }

    /// Building age during projection year `year` (year 1 = first year of ownership).
    pub fn age_in_year(&self, year: u32) -> u32 {
        self.building_age_years.saturating_add(year)
    }
}

fn required(value: Option<Decimal>, field: &str) -> InvestSimResult<Decimal> {
    value.ok_or_else(|| InvestSimError::MissingField(field.into()))
}

fn whole_number(value: Option<Decimal>, field: &str) -> InvestSimResult<u32> {
    let v = required(value, field)?;
    if v < Decimal::ZERO {
        return Err(InvestSimError::InvalidInput {
            field: field.into(),
            reason: "Must be zero or greater".into(),
        });
    }
    if v.fract() != Decimal::ZERO {
        return Err(InvestSimError::InvalidInput {
            field: field.into(),
            reason: "Must be a whole number".into(),
        });
    }
    v.to_u32().ok_or_else(|| InvestSimError::InvalidInput {
        field: field.into(),
        reason: "Value is out of range".into(),
    })
}
