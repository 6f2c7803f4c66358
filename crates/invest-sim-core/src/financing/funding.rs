use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::credit::rank::{score_risk, Rank, RiskMetrics};
use crate::error::InvestSimError;
use crate::tables::SolverSettings;
use crate::types::Money;
use crate::InvestSimResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What the lender's risk model is evaluated against while the loan varies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingProblem {
    /// Year-one NOI
    pub noi: Money,
    /// Annual debt service per unit of principal
    pub payment_factor: Decimal,
    pub collateral_value: Money,
    /// Largest loan considered (the market price)
    pub loan_ceiling: Money,
    /// Market price plus acquisition costs; sizes the equity requirement
    pub total_acquisition_cost: Money,
}

/// Whether the solved loan reaches rank A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingOutcome {
    RankA,
    /// No loan in range is rank A; the loan maximises the best rank reachable
    BestAvailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingSolution {
    pub estimated_loan_amount: Money,
    /// Total acquisition cost not covered by the estimated loan
    pub required_equity: Money,
    pub outcome: FundingOutcome,
    pub achieved_rank: Rank,
    /// Risk metrics at the estimated loan
    pub metrics: RiskMetrics,
    pub iterations: u32,
}

impl FundingProblem {
    /// Risk metrics if `loan` were drawn.
    pub fn metrics_at(&self, loan: Money) -> RiskMetrics {
        score_risk(
            self.noi,
            loan * self.payment_factor,
            loan,
            self.collateral_value,
        )
    }

    fn rank_at(&self, loan: Money) -> Rank {
        self.metrics_at(loan).rank
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Largest loan, in whole `loan_step` units up to the ceiling, that still earns
/// rank A.
///
/// Rank only worsens as the loan grows (DSCR falls, LTV rises), so the loans
/// holding a given rank form a prefix of the range and bisection applies.
/// When even a zero loan misses rank A, the target becomes the rank of a zero
/// loan and the outcome is [`FundingOutcome::BestAvailable`]. The boundary is
/// re-checked after the search; a non-monotone model surfaces as
/// [`InvestSimError::ConvergenceFailure`].
pub fn solve_max_loan(
    problem: &FundingProblem,
    settings: &SolverSettings,
) -> InvestSimResult<FundingSolution> {
    if problem.loan_ceiling < Decimal::ZERO {
        return Err(InvestSimError::InvalidInput {
            field: "loan_ceiling".into(),
            reason: "Loan ceiling cannot be negative".into(),
        });
    }
    if settings.loan_step <= Decimal::ZERO {
        return Err(InvestSimError::InvalidTables(
            "solver loan step must be positive".into(),
        ));
    }

    let step = settings.loan_step;
    let target = problem.rank_at(Decimal::ZERO);
    let outcome = if target == Rank::A {
        FundingOutcome::RankA
    } else {
        FundingOutcome::BestAvailable
    };

    // Search over step counts: `lo` always holds the target, `hi` never does.
    let max_steps = (problem.loan_ceiling / step).floor();
    let mut iterations = 0u32;
    let mut lo = Decimal::ZERO;

    if problem.rank_at(max_steps * step) <= target {
        lo = max_steps;
    } else {
        let mut hi = max_steps;
        while hi - lo > Decimal::ONE {
            if iterations >= settings.max_iterations {
                return Err(InvestSimError::ConvergenceFailure {
                    function: "funding bisection".into(),
                    iterations,
                    last_delta: (hi - lo) * step,
                });
            }
            iterations += 1;
            let mid = ((lo + hi) / Decimal::TWO).floor();
            if problem.rank_at(mid * step) <= target {
                lo = mid;
            } else {
                hi = mid;
            }
        }
    }

    let loan = lo * step;
    let metrics = problem.metrics_at(loan);
    let next_holds = lo < max_steps && problem.rank_at(loan + step) == target;
    if metrics.rank != target || next_holds {
        return Err(InvestSimError::ConvergenceFailure {
            function: "funding bisection (rank not monotone in loan amount)".into(),
            iterations,
            last_delta: step,
        });
    }

    if outcome == FundingOutcome::BestAvailable {
        tracing::warn!(
            best_rank = %target,
            loan = %loan,
            "no loan in range reaches rank A; solving for the best available rank"
        );
    }
    tracing::debug!(iterations, loan = %loan, rank = %metrics.rank, "funding solver finished");

    Ok(FundingSolution {
        estimated_loan_amount: loan,
        required_equity: problem.total_acquisition_cost - loan,
        outcome,
        achieved_rank: metrics.rank,
        metrics,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::financing::loan::annual_payment_factor;
    use rust_decimal_macros::dec;

    fn problem(noi: Money, collateral: Money, ceiling: Money) -> FundingProblem {
        FundingProblem {
            noi,
            payment_factor: annual_payment_factor(dec!(0.023), 35).unwrap(),
            collateral_value: collateral,
            loan_ceiling: ceiling,
            total_acquisition_cost: ceiling + dec!(1000),
        }
    }

    #[test]
    fn test_ltv_bound_solution() {
        // Strong NOI: LTV ≤ 120% binds first, at 1.2 × collateral.
        let p = problem(dec!(5000), dec!(20000), dec!(40000));
        let s = solve_max_loan(&p, &SolverSettings::default()).unwrap();
        assert_eq!(s.outcome, FundingOutcome::RankA);
        assert_eq!(s.achieved_rank, Rank::A);
        assert_eq!(s.estimated_loan_amount, dec!(24000));
        assert_eq!(p.metrics_at(dec!(24001)).rank, Rank::B);
        assert_eq!(s.required_equity, dec!(41000) - dec!(24000));
    }

    #[test]
    fn test_whole_range_rank_a() {
        let p = problem(dec!(5000), dec!(100000), dec!(30000));
        let s = solve_max_loan(&p, &SolverSettings::default()).unwrap();
        assert_eq!(s.estimated_loan_amount, dec!(30000));
        assert_eq!(s.iterations, 0);
    }

    #[test]
    fn test_fallback_when_rank_a_unreachable() {
        // No collateral: even a zero loan sits in the open LTV bucket.
        let p = problem(dec!(1000), Decimal::ZERO, dec!(30000));
        let s = solve_max_loan(&p, &SolverSettings::default()).unwrap();
        assert_eq!(s.outcome, FundingOutcome::BestAvailable);
        assert_eq!(s.achieved_rank, Rank::B);
        assert!(s.estimated_loan_amount > Decimal::ZERO);
        assert_eq!(p.metrics_at(s.estimated_loan_amount).rank, Rank::B);
    }

    #[test]
    fn test_higher_ceiling_never_lowers_loan() {
        let settings = SolverSettings::default();
        let low = solve_max_loan(&problem(dec!(1500), dec!(25000), dec!(20000)), &settings).unwrap();
        let high = solve_max_loan(&problem(dec!(1500), dec!(25000), dec!(60000)), &settings).unwrap();
        assert!(high.estimated_loan_amount >= low.estimated_loan_amount);
    }

    #[test]
    fn test_iteration_cap_reported() {
        let p = problem(dec!(5000), dec!(20000), dec!(40000));
        let settings = SolverSettings {
            loan_step: Decimal::ONE,
            max_iterations: 3,
        };
        assert!(matches!(
            solve_max_loan(&p, &settings),
            Err(InvestSimError::ConvergenceFailure { .. })
        ));
    }
}
