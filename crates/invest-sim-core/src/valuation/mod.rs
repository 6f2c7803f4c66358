pub mod appraisal;
pub mod land;
