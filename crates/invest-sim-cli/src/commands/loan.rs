use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use invest_sim_core::financing::loan::{amortize, LoanTerms};
use invest_sim_core::with_metadata;

/// Arguments for a loan amortisation schedule
#[derive(Args)]
pub struct AmortizeArgs {
    /// Principal (万円)
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Decimal,

    /// Term in years (1-35)
    #[arg(long)]
    pub term: u32,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = LoanTerms {
        principal: args.principal,
        annual_rate: args.rate / Decimal::ONE_HUNDRED,
        term_years: args.term,
    };
    let schedule = amortize(&terms)?;
    let output = with_metadata(
        "Level monthly payment amortisation, reported by year",
        &terms,
        Vec::new(),
        schedule,
    );
    Ok(serde_json::to_value(output)?)
}
