use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::InvestSimError;
use crate::types::{Money, Rate};
use crate::InvestSimResult;

/// Level payment that fully amortises `principal` over `nper` periods at
/// `rate` per period. Returned as a positive outflow.
///
/// A zero rate degenerates to straight principal repayment.
pub fn level_payment(rate: Rate, nper: u32, principal: Money) -> InvestSimResult<Money> {
    if nper == 0 {
        return Err(InvestSimError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    if rate < Decimal::ZERO {
        return Err(InvestSimError::InvalidInput {
            field: "rate".into(),
            reason: "Periodic rate cannot be negative".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = compound_growth(rate, nper)?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(InvestSimError::DivisionByZero {
            context: "level payment annuity factor".into(),
        });
    }

    Ok(principal * rate * factor / denominator)
}

/// Balance outstanding after `k` level payments of `payment`.
pub fn remaining_balance(
    rate: Rate,
    k: u32,
    principal: Money,
    payment: Money,
) -> InvestSimResult<Money> {
    if rate.is_zero() {
        return Ok((principal - payment * Decimal::from(k)).max(Decimal::ZERO));
    }
    let growth = compound_growth(rate, k)?;
    let accrued = principal
        .checked_mul(growth)
        .ok_or_else(|| overflow("outstanding balance"))?;
    Ok((accrued - payment * (growth - Decimal::ONE) / rate).max(Decimal::ZERO))
}

/// `(1 + rate)^n`, reported as an input error when it leaves Decimal range.
fn compound_growth(rate: Rate, n: u32) -> InvestSimResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powi(i64::from(n))
        .ok_or_else(|| overflow("compound growth factor"))
}

fn overflow(what: &str) -> InvestSimError {
    InvestSimError::InvalidInput {
        field: "interestRate".into(),
        reason: format!("Interest rate is too high: {what} overflows"),
    }
}
