use crate::{
    db::{establish_connection, query::complete_transactions},
    error::AppError,
    model::record::{MeterUnit, RawTransaction},
    source::{FetchOutcome, normalize_rows},
};

/// Opens the store, runs the one query and closes the connection again.
pub fn load(database_url: &str, unit: MeterUnit) -> Result<FetchOutcome, AppError> {
    let mut conn = establish_connection(database_url)?;
    let rows = complete_transactions(&mut conn)?;
    Ok(normalize_rows(rows.into_iter().map(RawTransaction::from), unit))
}

pub async fn fetch(database_url: String, unit: MeterUnit) -> Result<FetchOutcome, AppError> {
    tokio::task::spawn_blocking(move || load(&database_url, unit)).await?
}
