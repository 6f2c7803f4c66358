use clap::Args;
use serde_json::{json, Value};

use invest_sim_core::property::region::{cities_for, classify_region};

/// Arguments for region classification
#[derive(Args)]
pub struct RegionArgs {
    /// Free-text address
    #[arg(long)]
    pub address: String,
}

pub fn run_region(args: RegionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let region = classify_region(&args.address);
    if region.is_none() {
        tracing::warn!(address = %args.address, "address matches no region");
    }
    Ok(json!({
        "address": args.address,
        "region": region,
        "matched": region.is_some(),
        "cities": region.map(cities_for).unwrap_or_default(),
    }))
}
