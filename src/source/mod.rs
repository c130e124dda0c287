//! Data Source Adapter: loads completed sessions from the local store or
//! the remote OCPP backend and normalizes them into a [`TransactionTable`].

pub mod local;
pub mod remote;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::AppError,
    model::record::{MeterUnit, RawTransaction, Rejection, TransactionRecord, TransactionTable},
    state::AppState,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Local,
    Remote,
}

/// Rows fetched for one pipeline pass plus user-visible warnings.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub table: TransactionTable,
    pub warnings: Vec<String>,
}

impl FetchOutcome {
    pub fn degraded(warning: String) -> Self {
        Self {
            table: TransactionTable::empty(),
            warnings: vec![warning],
        }
    }
}

/// Converts raw rows to kWh records, dropping and reporting the ones that
/// cannot take part in aggregation.
pub fn normalize_rows<I>(rows: I, unit: MeterUnit) -> FetchOutcome
where
    I: IntoIterator<Item = RawTransaction>,
{
    let mut records = Vec::new();
    let mut incomplete = 0usize;
    let mut bad_start = 0usize;

    for raw in rows {
        match TransactionRecord::normalize(raw, unit) {
            Ok(record) => records.push(record),
            Err(Rejection::IncompleteMeter) => incomplete += 1,
            Err(Rejection::InvalidStartTime) => bad_start += 1,
        }
    }

    let mut warnings = Vec::new();
    if bad_start > 0 {
        warn!(skipped = bad_start, "Dropped rows with unreadable start_time");
        warnings.push(format!(
            "Skipped {bad_start} row(s) with a missing or unreadable start_time"
        ));
    }
    if incomplete > 0 {
        info!(skipped = incomplete, "Dropped sessions without both meter readings");
    }

    FetchOutcome {
        table: TransactionTable::new(records),
        warnings,
    }
}

pub async fn fetch(source: DataSource, state: &AppState) -> Result<FetchOutcome, AppError> {
    let outcome = match source {
        DataSource::Local => {
            local::fetch(state.config.database_url.clone(), state.config.local_meter_unit).await?
        }
        DataSource::Remote => state.remote.fetch(state.config.remote_meter_unit).await,
    };
    info!(source = ?source, rows = outcome.table.len(), "Fetched transactions");
    Ok(outcome)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_normalize_rows_reports_unreadable_start_times() {
        let rows = vec![
            RawTransaction {
                start_time: Some("2024-01-01T10:00".to_string()),
                meter_start: Some(1.0),
                meter_stop: Some(2.0),
                ..Default::default()
            },
            RawTransaction {
                start_time: Some("??".to_string()),
                meter_start: Some(1.0),
                meter_stop: Some(2.0),
                ..Default::default()
            },
            RawTransaction {
                start_time: Some("2024-01-01T10:00".to_string()),
                meter_start: Some(1.0),
                ..Default::default()
            },
        ];
        let outcome = normalize_rows(rows, MeterUnit::KilowattHour);
        assert_eq!(outcome.table.len(), 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("Skipped 1 row"));
    }
}
