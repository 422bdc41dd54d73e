use thiserror::Error;

pub type RefolioResult<T> = Result<T, RefolioError>;

#[derive(Debug, Error)]
pub enum RefolioError {
    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Io(#[from] IoError),
}

/// Errors related to the simulation environment configuration and execution loop.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The action vector does not match the environment's asset count.
    ///
    /// A training loop must see this; it is never masked by sanitation.
    #[error("Invalid action shape: expected {expected} weights, got {got}")]
    InvalidActionShape { expected: usize, got: usize },

    #[error("Invalid environment state: {0}")]
    InvalidState(String),

    #[error("Invalid environment configuration: {0}")]
    InvalidConfig(String),
}

/// Errors related to price tables, holdings, and tabular ingestion.
#[derive(Debug, Error)]
pub enum DataError {
    /// A requested asset is absent from the price table. Indicates a
    /// configuration error, distinct from a live data gap.
    #[error("Missing price data for asset '{0}'")]
    MissingAssetData(String),

    #[error("Price table has no assets")]
    EmptyPriceTable,

    #[error("Empty price series for asset '{0}'")]
    EmptyPriceSeries(String),

    #[error("Duplicate asset symbol: '{0}'")]
    DuplicateSymbol(String),

    #[error("Price series length mismatch for '{symbol}': expected {expected}, got {got}")]
    SeriesLengthMismatch {
        symbol: String,
        expected: usize,
        got: usize,
    },

    #[error("Invalid share count for '{symbol}': {shares}")]
    InvalidShareCount { symbol: String, shares: f64 },

    #[error("Unrecognized portfolio format: {0}")]
    UnknownPortfolioFormat(String),

    #[error("Data frame error: {0}")]
    DataFrame(String),
}

/// Errors returned by a [`PriceFeed`](crate::provider::PriceFeed).
///
/// Fetch failures are typed and surfaced to the caller; the sentinel
/// substitution policy is applied explicitly by the consumer, never hidden
/// inside the feed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No quote available for '{0}'")]
    Unavailable(String),

    #[error("Feed transport failure for '{symbol}': {msg}")]
    Transport { symbol: String, msg: String },
}

/// Errors related to file I/O.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("IO operation failed")]
    Io(#[from] std::io::Error),

    #[error("File system error: {0}")]
    FileSystem(String),
}
