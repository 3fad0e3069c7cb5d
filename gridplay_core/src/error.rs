use thiserror::Error;

/// Structural failures: these stop a single render cycle and go to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("no lap data to build a telemetry series from")]
    EmptySeries,

    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl CoreError {
    /// Stable machine-readable name, used as the `kind` field in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::EmptySeries => "empty_series",
            CoreError::MalformedInput(_) => "malformed_input",
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        CoreError::MalformedInput(msg.into())
    }
}

/// Data-quality warning. Never returned as an `Err`; the offending probability
/// has already been replaced with 0.0 when this is produced.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize)]
#[error("invalid win probability for {driver_code}: {raw}")]
pub struct InvalidProbability {
    pub driver_code: String,
    pub raw: String, // original value as text, e.g. "1.4", "NaN", "\"high\""
}

pub type CoreResult<T> = Result<T, CoreError>;
