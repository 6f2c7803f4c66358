pub mod input;
pub mod region;
