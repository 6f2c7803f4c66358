pub mod acquisition;
pub mod funding;
pub mod loan;
