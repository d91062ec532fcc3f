use rust_decimal::Decimal;
use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Non-recoverable engine errors.
///
/// A fatal violation means a SELL reached the filling stage without legal
/// backing on a non-shortable venue. The validator guarantees this cannot
/// happen, so observing it signals an engine bug; the current cycle is
/// aborted rather than risking silent ledger corruption.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error(
        "fatal invariant violation: SELL without backing inventory on non-shortable venue \
         (market {market_id}, outcome {outcome_id}, held {held}, requested {requested})"
    )]
    FatalViolation {
        market_id: String,
        outcome_id: String,
        held: Decimal,
        requested: Decimal,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
