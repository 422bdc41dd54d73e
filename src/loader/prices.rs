use std::path::Path;

use polars::prelude::{DataFrame, DataType};

use crate::{
    data::{domain::Symbol, table::PriceTable},
    error::RefolioResult,
    loader::{polars_to_refolio_error, read_csv},
};

/// Column-name convention marking a close-price series: `<SYMBOL>_Close`.
const CLOSE_SUFFIX: &str = "_Close";

/// Loads a wide close-price CSV into a [`PriceTable`].
///
/// Every column ending in `_Close` becomes an asset (suffix stripped); other
/// columns are ignored. Missing values are filled with 0.0 and left for the
/// simulation's price floor to guard, matching the training data
/// preprocessing convention.
#[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_price_csv(path: impl AsRef<Path>) -> RefolioResult<PriceTable> {
    let df = read_csv(path.as_ref())?;
    let table = price_table_from_df(&df)?;
    tracing::info!(
        assets = table.asset_count(),
        steps = table.step_count(),
        "Loaded price table"
    );
    Ok(table)
}

/// Extracts the price table from an already-loaded frame.
pub fn price_table_from_df(df: &DataFrame) -> RefolioResult<PriceTable> {
    let mut builder = PriceTable::builder();

    for name in df.get_column_names() {
        let Some(symbol) = name.as_str().strip_suffix(CLOSE_SUFFIX) else {
            continue;
        };
        let closes = df
            .column(name.as_str())
            .map_err(polars_to_refolio_error)?
            .cast(&DataType::Float64)
            .map_err(polars_to_refolio_error)?
            .f64()
            .map_err(polars_to_refolio_error)?
            .into_iter()
            .map(|value| value.unwrap_or(0.0))
            .collect::<Vec<_>>();
        builder = builder.with_series(Symbol::new(symbol), closes);
    }

    builder.build()
}
