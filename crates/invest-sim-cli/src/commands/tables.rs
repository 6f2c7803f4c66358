use clap::Args;
use serde_json::Value;

use invest_sim_core::EngineTables;

/// Arguments for printing the reference tables
#[derive(Args)]
pub struct TablesArgs {
    /// Write YAML instead of going through --output
    #[arg(long)]
    pub yaml: bool,
}

/// Default tables, as a starting point for a deployment's own `--tables` file.
///
/// With `--yaml` the tables are printed here and `None` is returned.
pub fn run_tables(args: TablesArgs) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let tables = EngineTables::default();
    if args.yaml {
        print!("{}", serde_yaml::to_string(&tables)?);
        return Ok(None);
    }
    Ok(Some(serde_json::to_value(tables)?))
}
