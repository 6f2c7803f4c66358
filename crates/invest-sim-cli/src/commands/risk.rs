use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use invest_sim_core::credit::rank::{dscr_bucket, ltv_bucket, RANK_MATRIX, SCORE_MATRIX};

/// Arguments for a rank matrix lookup
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RankArgs {
    /// Debt service coverage ratio (e.g. 1.25)
    #[arg(long)]
    pub dscr: Decimal,

    /// Loan-to-value in percent; omit when there is no collateral
    #[arg(long)]
    pub ltv: Option<Decimal>,
}

pub fn run_rank(args: RankArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let row = dscr_bucket(args.dscr);
    let col = ltv_bucket(args.ltv);
    Ok(json!({
        "dscr": args.dscr.to_string(),
        "ltv": args.ltv.map(|l| l.to_string()),
        "dscr_bucket": row,
        "ltv_bucket": col,
        "rank": RANK_MATRIX[row][col],
        "score": SCORE_MATRIX[row][col],
    }))
}
