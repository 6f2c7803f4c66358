use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::InvestSimError;
use crate::property::input::PropertyInput;
use crate::tables::{EngineTables, LandReferencePoint};
use crate::types::Money;
use crate::InvestSimResult;

/// Yen per 万円 (land prices are quoted in yen, the engine works in 万円).
const YEN_PER_MAN: Decimal = dec!(10000);

/// ㎡ → 坪 price conversion factor (1 坪 ≈ 3.3058 ㎡).
const SQM_PER_TSUBO_FACTOR: Decimal = dec!(0.3025);

/// Where the land unit price came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LandPriceSource {
    /// A reference point whose locality appears in the address
    ReferencePoint { locality: String },
    /// The region's standard unit price
    RegionDefault,
}

/// Cost-approach land component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandAppraisal {
    /// Yen per ㎡
    pub price_per_sqm: Decimal,
    /// Land area × unit price (万円)
    pub value: Money,
    pub source: LandPriceSource,
    /// Human-readable source label surfaced to the caller
    pub source_label: String,
}

/// Appraise the land: the longest reference locality contained in the address
/// wins; otherwise the region's standard price applies.
pub fn appraise_land(
    input: &PropertyInput,
    tables: &EngineTables,
) -> InvestSimResult<LandAppraisal> {
    let nearest = tables
        .land_reference_points
        .iter()
        .filter(|p| input.address.contains(p.locality.trim()))
        .fold(None, |best: Option<&LandReferencePoint>, p| match best {
            Some(b) if b.locality.trim().chars().count() >= p.locality.trim().chars().count() => {
                Some(b)
            }
            _ => Some(p),
        });

    let (price_per_sqm, source, source_label) = match nearest {
        Some(point) => (
            point.price_per_sqm,
            LandPriceSource::ReferencePoint {
                locality: point.locality.clone(),
            },
            format!(
                "近傍基準地: {} ({}万円/坪)",
                point.locality,
                man_yen_per_tsubo(point.price_per_sqm)
            ),
        ),
        None => {
            let price = tables.region(input.region)?.land_price_per_sqm;
            if tables.land_reference_points.is_empty() {
                tracing::debug!(region = %input.region, "using regional standard land price");
            } else {
                tracing::warn!(
                    region = %input.region,
                    address = %input.address,
                    "no land reference point matched; falling back to regional standard price"
                );
            }
            (
                price,
                LandPriceSource::RegionDefault,
                format!(
                    "エリア標準単価: {} ({}万円/坪)",
                    input.region,
                    man_yen_per_tsubo(price)
                ),
            )
        }
    };

    let value = input
        .land_area_sqm
        .checked_mul(price_per_sqm)
        .ok_or_else(|| InvestSimError::InvalidInput {
            field: "landArea".into(),
            reason: "Land value is out of range".into(),
        })?
        / YEN_PER_MAN;

    Ok(LandAppraisal {
        price_per_sqm,
        value,
        source,
        source_label,
    })
}

/// Whole 万円 per 坪, truncated, for labels.
fn man_yen_per_tsubo(price_per_sqm: Decimal) -> i64 {
    (price_per_sqm / SQM_PER_TSUBO_FACTOR / YEN_PER_MAN)
        .trunc()
        .to_i64()
        .unwrap_or(0)
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
    fn test_region_default_price() {
        let land = appraise_land(&sample_input(), &EngineTables::default()).unwrap();
        // 600 ㎡ × 100,000 yen / 10,000 = 6,000 万円
        assert_eq!(land.value, dec!(6000));
        assert_eq!(land.source, LandPriceSource::RegionDefault);
        // 100,000 / 0.3025 / 10,000 = 33.05… → 33
        assert_eq!(land.source_label, "エリア標準単価: Chunanbu (33万円/坪)");
    }

    #[test]
    fn test_longest_reference_locality_wins() {
        let mut tables = EngineTables::default();
        tables.land_reference_points = vec![
            LandReferencePoint {
                locality: "沖縄市".into(),
                price_per_sqm: dec!(80000),
            },
            LandReferencePoint {
                locality: "沖縄市泡瀬".into(),
                price_per_sqm: dec!(121000),
            },
        ];
        let land = appraise_land(&sample_input(), &tables).unwrap();
        assert_eq!(land.price_per_sqm, dec!(121000));
        assert_eq!(land.value, dec!(7260));
        assert_eq!(land.source_label, "近傍基準地: 沖縄市泡瀬 (40万円/坪)");
    }

    #[test]
    fn test_zero_land_area() {
        let mut input = sample_input();
        input.land_area_sqm = Decimal::ZERO;
        let land = appraise_land(&input, &EngineTables::default()).unwrap();
        assert_eq!(land.value, Decimal::ZERO);
    }

    #[test]
    fn test_land_value_overflow_is_an_error() {
        let mut input = sample_input();
        input.land_area_sqm = Decimal::MAX / dec!(2);
        let err = appraise_land(&input, &EngineTables::default()).unwrap_err();
        assert_eq!(err.field(), Some("landArea"));
    }
}
