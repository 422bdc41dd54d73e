use std::path::Path;

use itertools::izip;
use polars::prelude::{DataFrame, DataType};
use strum::Display;
use strum_macros::EnumString;

use crate::{
    data::{domain::Symbol, holdings::Holdings},
    error::{DataError, RefolioResult},
    loader::{polars_to_refolio_error, read_csv},
};

/// The holdings CSV shapes we accept, tagged explicitly.
///
/// Each variant has its own parser producing the one canonical [`Holdings`]
/// structure. An unrecognized shape is an error, never a silent guess at
/// which columns mean what.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PortfolioFormat {
    /// Broker export convention: `Symbol` / `Quantity` columns.
    BrokerExport,
    /// Generic holdings convention: `symbol` / `shares` columns.
    GenericHoldings,
}

impl PortfolioFormat {
    /// Detects the format from the frame's column names.
    pub fn detect(df: &DataFrame) -> RefolioResult<Self> {
        let has = |name: &str| df.get_column_names().iter().any(|c| c.as_str() == name);

        if has("Symbol") && has("Quantity") {
            Ok(Self::BrokerExport)
        } else if has("symbol") && has("shares") {
            Ok(Self::GenericHoldings)
        } else {
            let columns = df
                .get_column_names()
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Err(DataError::UnknownPortfolioFormat(columns).into())
        }
    }

    /// Parses the frame according to this format.
    pub fn parse(&self, df: &DataFrame) -> RefolioResult<Holdings> {
        match self {
            Self::BrokerExport => parse_columns(df, "Symbol", "Quantity"),
            Self::GenericHoldings => parse_columns(df, "symbol", "shares"),
        }
    }
}

/// Loads a holdings CSV, detecting its format first.
#[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_portfolio_csv(path: impl AsRef<Path>) -> RefolioResult<Holdings> {
    let df = read_csv(path.as_ref())?;
    let format = PortfolioFormat::detect(&df)?;
    tracing::info!(%format, rows = df.height(), "Parsing holdings file");
    format.parse(&df)
}

fn parse_columns(df: &DataFrame, symbol_col: &str, shares_col: &str) -> RefolioResult<Holdings> {
    let symbols = df
        .column(symbol_col)
        .map_err(polars_to_refolio_error)?
        .str()
        .map_err(polars_to_refolio_error)?
        .into_iter()
        .collect::<Vec<_>>();

    let shares = df
        .column(shares_col)
        .map_err(polars_to_refolio_error)?
        .cast(&DataType::Float64)
        .map_err(polars_to_refolio_error)?
        .f64()
        .map_err(polars_to_refolio_error)?
        .into_iter()
        .collect::<Vec<_>>();

    let pairs = izip!(symbols, shares).filter_map(|(symbol, count)| {
        let symbol = symbol?;
        Some((Symbol::new(symbol), count.unwrap_or(0.0)))
    });

    Holdings::try_from_pairs(pairs)
}
