pub mod loan;
pub mod region;
pub mod risk;
pub mod simulate;
pub mod tables;
