use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Multiple, Percent};

/// DSCR reported when there is no debt service to cover.
pub const DSCR_CAP: Decimal = dec!(999);

/// Lower bounds of the DSCR buckets, safest first. Anything below the last
/// bound falls in the final bucket.
pub const DSCR_BUCKET_FLOORS: [Decimal; 7] = [
    dec!(1.4),
    dec!(1.3),
    dec!(1.2),
    dec!(1.1),
    dec!(1.0),
    dec!(0.9),
    dec!(0.8),
];

/// Upper bounds (inclusive, percent) of the LTV buckets, lowest leverage first.
/// Anything above the last bound, or an undefined LTV, falls in the final bucket.
pub const LTV_BUCKET_CEILINGS: [Decimal; 4] = [dec!(60), dec!(80), dec!(100), dec!(120)];

pub const DSCR_BUCKETS: usize = DSCR_BUCKET_FLOORS.len() + 1;
pub const LTV_BUCKETS: usize = LTV_BUCKET_CEILINGS.len() + 1;

/// Lending rank, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    A,
    B,
    C,
    D,
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        };
        write!(f, "{}", s)
    }
}

use Rank::{A, B, C, D};

/// Rank by DSCR bucket (rows) and LTV bucket (columns).
#[rustfmt::skip]
pub const RANK_MATRIX: [[Rank; LTV_BUCKETS]; DSCR_BUCKETS] = [
    //  ≤60 ≤80 ≤100 ≤120 >120
    [A, A, A, A, B], // ≥1.4
    [A, A, A, A, B], // ≥1.3
    [A, A, B, B, B], // ≥1.2
    [A, B, B, B, C], // ≥1.1
    [B, B, B, B, C], // ≥1.0
    [B, B, B, C, C], // ≥0.9
    [B, B, C, C, C], // ≥0.8
    [B, C, C, C, D], // <0.8
];

/// Bank score (0–100) by the same buckets. Rank bands: A ≥ 80, B ≥ 60, C ≥ 40.
#[rustfmt::skip]
pub const SCORE_MATRIX: [[u32; LTV_BUCKETS]; DSCR_BUCKETS] = [
    [100, 95, 90, 85, 75],
    [ 95, 90, 85, 80, 70],
    [ 85, 80, 75, 70, 60],
    [ 80, 75, 70, 65, 55],
    [ 75, 70, 65, 60, 50],
    [ 70, 65, 60, 55, 45],
    [ 65, 60, 55, 50, 40],
    [ 60, 55, 50, 45, 35],
];

// ---------------------------------------------------------------------------
// Bucketing
// ---------------------------------------------------------------------------

pub fn dscr_bucket(dscr: Multiple) -> usize {
    DSCR_BUCKET_FLOORS
        .iter()
        .position(|floor| dscr >= *floor)
        .unwrap_or(DSCR_BUCKETS - 1)
}

/// `None` (collateral of zero) is treated as unbounded leverage.
pub fn ltv_bucket(ltv: Option<Percent>) -> usize {
    match ltv {
        Some(ltv) => LTV_BUCKET_CEILINGS
            .iter()
            .position(|ceiling| ltv <= *ceiling)
            .unwrap_or(LTV_BUCKETS - 1),
        None => LTV_BUCKETS - 1,
    }
}

/// Rank for a DSCR / LTV pair.
pub fn classify(dscr: Multiple, ltv: Option<Percent>) -> Rank {
    RANK_MATRIX[dscr_bucket(dscr)][ltv_bucket(ltv)]
}

/// Rank band a bank score falls in.
pub fn rank_for_score(score: u32) -> Rank {
    match score {
        s if s >= 80 => A,
        s if s >= 60 => B,
        s if s >= 40 => C,
        _ => D,
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Lending risk metrics for one loan amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// NOI / annual debt service, capped at 999 (also when there is no debt service)
    pub dscr: Multiple,
    /// Loan / collateral × 100; `None` when collateral is zero
    pub ltv: Option<Percent>,
    /// Collateral / loan × 100; `None` when there is no loan
    pub collateral_coverage_ratio: Option<Percent>,
    /// Loan not covered by collateral
    pub unsecured_amount: Money,
    pub dscr_bucket: usize,
    pub ltv_bucket: usize,
    pub score: u32,
    pub rank: Rank,
}

/// Score a loan against the property's NOI and collateral value.
pub fn score_risk(
    noi: Money,
    annual_debt_service: Money,
    loan_amount: Money,
    collateral_value: Money,
) -> RiskMetrics {
    let dscr = if annual_debt_service > Decimal::ZERO {
        (noi / annual_debt_service).min(DSCR_CAP)
    } else {
        DSCR_CAP
    };

    let ltv = if collateral_value > Decimal::ZERO {
        Some(loan_amount / collateral_value * dec!(100))
    } else {
        None
    };

    let collateral_coverage_ratio = if loan_amount > Decimal::ZERO {
        Some(collateral_value / loan_amount * dec!(100))
    } else {
        None
    };

    let unsecured_amount = (loan_amount - collateral_value).max(Decimal::ZERO);

    let dscr_bucket = dscr_bucket(dscr);
    let ltv_bucket = ltv_bucket(ltv);

    RiskMetrics {
        dscr,
        ltv,
        collateral_coverage_ratio,
        unsecured_amount,
        dscr_bucket,
        ltv_bucket,
        score: SCORE_MATRIX[dscr_bucket][ltv_bucket],
        rank: RANK_MATRIX[dscr_bucket][ltv_bucket],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries_inclusive() {
        assert_eq!(dscr_bucket(dec!(1.4)), 0);
        assert_eq!(dscr_bucket(dec!(1.39999)), 1);
        assert_eq!(dscr_bucket(dec!(0.8)), 6);
        assert_eq!(dscr_bucket(dec!(0.79)), 7);
        assert_eq!(dscr_bucket(dec!(-5)), 7);

        assert_eq!(ltv_bucket(Some(dec!(60))), 0);
        assert_eq!(ltv_bucket(Some(dec!(60.01))), 1);
        assert_eq!(ltv_bucket(Some(dec!(120))), 3);
        assert_eq!(ltv_bucket(Some(dec!(120.01))), 4);
        assert_eq!(ltv_bucket(None), 4);
    }

    #[test]
    fn test_matrix_corners() {
        assert_eq!(classify(dec!(2.0), Some(dec!(50))), Rank::A);
        assert_eq!(classify(dec!(2.0), Some(dec!(150))), Rank::B);
        assert_eq!(classify(dec!(0.5), Some(dec!(50))), Rank::B);
        assert_eq!(classify(dec!(0.5), Some(dec!(150))), Rank::D);
    }

    #[test]
    fn test_score_matrix_agrees_with_rank_matrix() {
        for row in 0..DSCR_BUCKETS {
            for col in 0..LTV_BUCKETS {
                assert_eq!(
                    rank_for_score(SCORE_MATRIX[row][col]),
                    RANK_MATRIX[row][col],
                    "cell ({row}, {col})"
                );
            }
        }
    }

    #[test]
    fn test_zero_debt_service_is_capped() {
        let m = score_risk(dec!(1000), Decimal::ZERO, Decimal::ZERO, dec!(20000));
        assert_eq!(m.dscr, DSCR_CAP);
        assert_eq!(m.ltv, Some(Decimal::ZERO));
        assert_eq!(m.collateral_coverage_ratio, None);
        assert_eq!(m.rank, Rank::A);
    }

    #[test]
    fn test_zero_collateral_is_unbounded_ltv() {
        let m = score_risk(dec!(1000), dec!(500), dec!(10000), Decimal::ZERO);
        assert_eq!(m.ltv, None);
        assert_eq!(m.ltv_bucket, LTV_BUCKETS - 1);
        assert_eq!(m.unsecured_amount, dec!(10000));
        assert_eq!(m.collateral_coverage_ratio, Some(Decimal::ZERO));
    }

    #[test]
    fn test_metrics_derivations() {
        let m = score_risk(dec!(1300), dec!(1000), dec!(24000), dec!(20000));
        assert_eq!(m.dscr, dec!(1.3));
        assert_eq!(m.ltv, Some(dec!(120)));
        assert_eq!(m.unsecured_amount, dec!(4000));
        assert_eq!(m.rank, Rank::A);
        assert_eq!(m.score, 80);
    }
}
