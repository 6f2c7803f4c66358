use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvestSimError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Unknown region: no region matches address '{address}'")]
    UnknownRegion { address: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Invalid rate tables: {0}")]
    InvalidTables(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl InvestSimError {
    /// Name of the offending request field, when the error points at one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidInput { field, .. } => Some(field),
            Self::MissingField(field) => Some(field),
            Self::UnknownRegion { .. } => Some("region"),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for InvestSimError {
    fn from(e: serde_json::Error) -> Self {
        InvestSimError::SerializationError(e.to_string())
    }
}
