use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use invest_sim_core::property::input::{ElevatorFlag, SimulationRequest};
use invest_sim_core::{DashboardResult, EngineTables, Simulator};

use crate::input;

/// Arguments for a full property simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to JSON request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Reference tables file (JSON or YAML); defaults to the built-in tables
    #[arg(long)]
    pub tables: Option<String>,

    /// Print the rounded dashboard figures instead of the full report
    #[arg(long)]
    pub dashboard: bool,

    /// Property address; the region is derived from it unless --region is given
    #[arg(long)]
    pub address: Option<String>,

    /// Region (Naha, Chunanbu, Hokubu)
    #[arg(long)]
    pub region: Option<String>,

    /// Annual rent at full occupancy (万円)
    #[arg(long)]
    pub rent: Option<Decimal>,

    /// Number of rooms
    #[arg(long)]
    pub rooms: Option<Decimal>,

    /// Building price (万円)
    #[arg(long)]
    pub building_cost: Option<Decimal>,

    /// Land price (万円)
    #[arg(long)]
    pub land_cost: Option<Decimal>,

    /// Desired loan amount (万円)
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Loan term in years (1-35)
    #[arg(long)]
    pub loan_term: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Structure (RC, Wood, RC_Block, Steel)
    #[arg(long)]
    pub structure: Option<String>,

    /// Building age in years
    #[arg(long)]
    pub building_age: Option<Decimal>,

    /// Floor area (㎡)
    #[arg(long)]
    pub building_area: Option<Decimal>,

    /// Land area (㎡)
    #[arg(long)]
    pub land_area: Option<Decimal>,

    /// Elevator present: yes or no
    #[arg(long)]
    pub has_elevator: Option<String>,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let tables = match args.tables {
        Some(ref path) => input::file::read_tables(path)?,
        None => EngineTables::default(),
    };
    let simulator = Simulator::new(tables)?;

    let request: SimulationRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(request) = input::stdin::read_stdin()? {
        request
    } else {
        SimulationRequest {
            address: args.address,
            region: args.region,
            rent: args.rent,
            rooms: args.rooms,
            building_cost: args.building_cost,
            land_cost: args.land_cost,
            loan_amount: args.loan_amount,
            loan_term: args.loan_term,
            interest_rate: args.interest_rate,
            structure: args.structure,
            building_age: args.building_age,
            building_area: args.building_area,
            land_area: args.land_area,
            has_elevator: args.has_elevator.map(ElevatorFlag::Text),
        }
    };

    let output = simulator.simulate_request(&request)?;
    if args.dashboard {
        return Ok(serde_json::to_value(DashboardResult::from(&output.result))?);
    }
    Ok(serde_json::to_value(output)?)
}
