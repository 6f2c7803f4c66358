pub mod cash_flow;
pub mod credit;
pub mod dashboard;
pub mod error;
pub mod financing;
pub mod property;
pub mod simulation;
pub mod tables;
pub mod time_value;
pub mod types;
pub mod valuation;

pub use dashboard::DashboardResult;
pub use error::InvestSimError;
pub use simulation::{SimulationReport, Simulator};
pub use tables::EngineTables;
pub use types::*;

/// Standard result type for all invest-sim operations
pub type InvestSimResult<T> = Result<T, InvestSimError>;
