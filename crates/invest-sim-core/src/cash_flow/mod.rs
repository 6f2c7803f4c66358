pub mod expenses;
pub mod projection;
