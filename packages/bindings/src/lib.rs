use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use invest_sim_core::credit::rank::{dscr_bucket, ltv_bucket, Rank, RANK_MATRIX, SCORE_MATRIX};
use invest_sim_core::financing::loan::{amortize as amortize_loan, LoanTerms};
use invest_sim_core::property::input::SimulationRequest;
use invest_sim_core::property::region::classify_region as classify;
use invest_sim_core::{with_metadata, DashboardResult, EngineTables, Simulator};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Engine over the built-in tables, shared by every call.
fn default_simulator() -> &'static Simulator {
    static SIMULATOR: OnceLock<Simulator> = OnceLock::new();
    SIMULATOR.get_or_init(Simulator::default)
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Simulate the form's request object with the built-in tables and return
/// the flat, rounded figures the results dashboard reads.
#[napi]
pub fn simulate(input_json: String) -> NapiResult<String> {
    dashboard_json(default_simulator(), &input_json)
}

/// Dashboard figures computed with a deployment's own reference tables.
#[napi]
pub fn simulate_with_tables(input_json: String, tables_json: String) -> NapiResult<String> {
    let simulator = simulator_for(&tables_json)?;
    dashboard_json(&simulator, &input_json)
}

/// Full report in its envelope (exact decimals as strings, provenance,
/// warnings). Uses the built-in tables unless `tables_json` is given.
#[napi]
pub fn simulate_report(input_json: String, tables_json: Option<String>) -> NapiResult<String> {
    let request: SimulationRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = match tables_json {
        Some(t) => simulator_for(&t)?.simulate_request(&request),
        None => default_simulator().simulate_request(&request),
    }
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

fn simulator_for(tables_json: &str) -> NapiResult<Simulator> {
    let tables = EngineTables::from_json_str(tables_json).map_err(to_napi_error)?;
    Simulator::new(tables).map_err(to_napi_error)
}

fn dashboard_json(simulator: &Simulator, input_json: &str) -> NapiResult<String> {
    let request: SimulationRequest = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = simulator
        .simulate_request(&request)
        .map_err(to_napi_error)?;
    serde_json::to_string(&DashboardResult::from(&output.result)).map_err(to_napi_error)
}

#[napi]
pub fn default_tables() -> NapiResult<String> {
    serde_json::to_string(&EngineTables::default()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// Region for an address, or `null` when no city name matches.
#[napi]
pub fn classify_region(address: String) -> Option<String> {
    classify(&address).map(|r| r.to_string())
}

#[napi]
pub fn amortize(input_json: String) -> NapiResult<String> {
    let terms: LoanTerms = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let schedule = amortize_loan(&terms).map_err(to_napi_error)?;
    let output = with_metadata(
        "Level monthly payment amortisation, reported by year",
        &terms,
        Vec::new(),
        schedule,
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct RankQuery {
    dscr: Decimal,
    #[serde(default)]
    ltv: Option<Decimal>,
}

#[derive(Serialize)]
struct RankAnswer {
    rank: Rank,
    score: u32,
}

/// Rank matrix lookup for `{ "dscr": "1.25", "ltv": "85" }`.
#[napi]
pub fn lookup_rank(input_json: String) -> NapiResult<String> {
    let query: RankQuery = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let (row, col) = (dscr_bucket(query.dscr), ltv_bucket(query.ltv));
    let answer = RankAnswer {
        rank: RANK_MATRIX[row][col],
        score: SCORE_MATRIX[row][col],
    };
    serde_json::to_string(&answer).map_err(to_napi_error)
}
