use std::{fs::File, path::Path};

use polars::prelude::{CsvReadOptions, DataFrame, PolarsError, SerReader};

use crate::error::{DataError, IoError, RefolioError, RefolioResult};

pub mod portfolio;
pub mod prices;

pub(crate) fn read_csv(path: &Path) -> RefolioResult<DataFrame> {
    let file = File::open(path).map_err(IoError::from)?;
    CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(polars_to_refolio_error)
}

pub(crate) fn polars_to_refolio_error(e: PolarsError) -> RefolioError {
    DataError::DataFrame(e.to_string()).into()
}
