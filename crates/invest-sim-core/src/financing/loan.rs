use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InvestSimError;
use crate::property::input::MAX_LOAN_TERM_YEARS;
use crate::time_value::{level_payment, remaining_balance};
use crate::types::{Money, Rate};
use crate::InvestSimResult;

/// Installments per year (bank convention: level monthly payments).
pub const PAYMENTS_PER_YEAR: u32 = 12;

/// Fixed-rate amortising loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Annual rate as a decimal (0.023 = 2.3%)
    pub annual_rate: Rate,
    pub term_years: u32,
}

/// One year of the amortisation schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub opening_balance: Money,
    pub interest: Money,
    pub principal: Money,
    pub debt_service: Money,
    pub closing_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub monthly_payment: Money,
    /// Twelve monthly payments; constant for every year of the term
    pub annual_debt_service: Money,
    pub years: Vec<AmortizationYear>,
    pub total_interest: Money,
}

impl AmortizationSchedule {
    /// Balance outstanding at the end of `year`; the full principal at
    /// year 0 and zero once the term has elapsed.
    pub fn balance_after_year(&self, year: u32) -> Money {
        if year == 0 {
            return self
                .years
                .first()
                .map(|y| y.opening_balance)
                .unwrap_or(Decimal::ZERO);
        }
        self.years
            .get(year as usize - 1)
            .map(|y| y.closing_balance)
            .unwrap_or(Decimal::ZERO)
    }

    /// Debt service due in `year`; zero after the term.
    pub fn debt_service_in_year(&self, year: u32) -> Money {
        if year >= 1 && (year as usize) <= self.years.len() {
            self.annual_debt_service
        } else {
            Decimal::ZERO
        }
    }
}

fn validate_terms(terms: &LoanTerms) -> InvestSimResult<()> {
    if terms.principal < Decimal::ZERO {
        return Err(InvestSimError::InvalidInput {
            field: "loanAmount".into(),
            reason: "Loan amount cannot be negative".into(),
        });
    }
    if terms.annual_rate < Decimal::ZERO {
        return Err(InvestSimError::InvalidInput {
            field: "interestRate".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }
    if terms.term_years == 0 || terms.term_years > MAX_LOAN_TERM_YEARS {
        return Err(InvestSimError::InvalidInput {
            field: "loanTerm".into(),
            reason: format!("Loan term must be between 1 and {MAX_LOAN_TERM_YEARS} years"),
        });
    }
    Ok(())
}

/// Annual debt service per unit of principal. Debt service is linear in the
/// principal, so the funding solver scales this instead of re-amortising.
pub fn annual_payment_factor(annual_rate: Rate, term_years: u32) -> InvestSimResult<Decimal> {
    if term_years == 0 {
        return Err(InvestSimError::InvalidInput {
            field: "loanTerm".into(),
            reason: "Loan term must be at least 1 year".into(),
        });
    }
    if annual_rate.is_zero() {
        return Ok(Decimal::ONE / Decimal::from(term_years));
    }
    let monthly_rate = annual_rate / Decimal::from(PAYMENTS_PER_YEAR);
    let months = term_years * PAYMENTS_PER_YEAR;
    Ok(level_payment(monthly_rate, months, Decimal::ONE)? * Decimal::from(PAYMENTS_PER_YEAR))
}

/// Constant annual debt service for the loan.
pub fn annual_debt_service(terms: &LoanTerms) -> InvestSimResult<Money> {
    validate_terms(terms)?;
    Ok(terms.principal * annual_payment_factor(terms.annual_rate, terms.term_years)?)
}

/// Year-by-year schedule; the balance is non-increasing and exactly zero after
/// the final year.
pub fn amortize(terms: &LoanTerms) -> InvestSimResult<AmortizationSchedule> {
    validate_terms(terms)?;

    let monthly_rate = terms.annual_rate / Decimal::from(PAYMENTS_PER_YEAR);
    let annual_debt_service =
        terms.principal * annual_payment_factor(terms.annual_rate, terms.term_years)?;
    let monthly_payment = annual_debt_service / Decimal::from(PAYMENTS_PER_YEAR);

    let mut years = Vec::with_capacity(terms.term_years as usize);
    let mut opening = terms.principal;
    let mut total_interest = Decimal::ZERO;

    for year in 1..=terms.term_years {
        let closing = if year == terms.term_years {
            Decimal::ZERO
        } else {
            remaining_balance(
                monthly_rate,
                year * PAYMENTS_PER_YEAR,
                terms.principal,
                monthly_payment,
            )?
            .min(opening)
        };
        let principal = opening - closing;
        let interest = (annual_debt_service - principal).max(Decimal::ZERO);
        total_interest += interest;

        years.push(AmortizationYear {
            year,
            opening_balance: opening,
            interest,
            principal,
            debt_service: interest + principal,
            closing_balance: closing,
        });
        opening = closing;
    }

    Ok(AmortizationSchedule {
        monthly_payment,
        annual_debt_service,
        years,
        total_interest,
    })
}
