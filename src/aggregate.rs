//! Reductions over a filtered transaction table. Every function is pure and
//! an empty table always yields an empty result.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::model::record::{TimeBucket, TransactionTable};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyEnergy {
    pub date: NaiveDate,
    pub total_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub transactions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketEnergy {
    pub bucket: TimeBucket,
    pub total_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargePointShare {
    pub cp_id: String,
    pub total_kwh: f64,
    /// Fraction of the filtered total, 0 when the total is 0.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEstimate {
    pub id: i64,
    pub transaction_id: i64,
    pub cp_id: String,
    pub id_tag: Option<String>,
    pub used_kwh: f64,
    pub start_time: NaiveDateTime,
    pub duration_minutes: f64,
    pub end_time: Option<NaiveDateTime>,
}

/// Mean estimated charging time, or the explicit absence of data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DurationSummary {
    NoData,
    Mean { minutes: f64, sessions: usize },
}

pub fn daily_energy(table: &TransactionTable) -> Vec<DailyEnergy> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in table.rows() {
        *totals.entry(record.date()).or_default() += record.used_energy();
    }
    totals
        .into_iter()
        .map(|(date, total_kwh)| DailyEnergy { date, total_kwh })
        .collect()
}

/// Distinct transaction ids per start date.
pub fn daily_transactions(table: &TransactionTable) -> Vec<DailyCount> {
    let mut ids: BTreeMap<NaiveDate, BTreeSet<i64>> = BTreeMap::new();
    for record in table.rows() {
        ids.entry(record.date())
            .or_default()
            .insert(record.transaction_id);
    }
    ids.into_iter()
        .map(|(date, ids)| DailyCount {
            date,
            transactions: ids.len(),
        })
        .collect()
}

/// Energy per demand period. A non-empty table reports all three buckets,
/// including those with no sessions.
pub fn bucket_energy(table: &TransactionTable) -> Vec<BucketEnergy> {
    if table.is_empty() {
        return Vec::new();
    }
    let mut totals: BTreeMap<TimeBucket, f64> =
        TimeBucket::ALL.into_iter().map(|b| (b, 0.0)).collect();
    for record in table.rows() {
        *totals.entry(record.time_bucket()).or_default() += record.used_energy();
    }
    totals
        .into_iter()
        .map(|(bucket, total_kwh)| BucketEnergy { bucket, total_kwh })
        .collect()
}

/// Energy per charge point over the table it is given, so shares follow
/// the active filter rather than the whole dataset.
pub fn charge_point_share(table: &TransactionTable) -> Vec<ChargePointShare> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in table.rows() {
        *totals.entry(record.cp_id.as_str()).or_default() += record.used_energy();
    }
    let grand_total: f64 = totals.values().sum();
    totals
        .into_iter()
        .map(|(cp_id, total_kwh)| ChargePointShare {
            cp_id: cp_id.to_string(),
            total_kwh,
            share: if grand_total == 0.0 {
                0.0
            } else {
                total_kwh / grand_total
            },
        })
        .collect()
}

pub fn session_estimates(table: &TransactionTable) -> Vec<SessionEstimate> {
    table
        .rows()
        .iter()
        .map(|record| SessionEstimate {
            id: record.id,
            transaction_id: record.transaction_id,
            cp_id: record.cp_id.clone(),
            id_tag: record.id_tag.clone(),
            used_kwh: record.used_energy(),
            start_time: record.start_time,
            duration_minutes: record.estimated_duration_minutes(),
            end_time: record.estimated_end_time(),
        })
        .collect()
}

pub fn mean_duration(table: &TransactionTable) -> DurationSummary {
    let sessions = table.len();
    if sessions == 0 {
        return DurationSummary::NoData;
    }
    let total: f64 = table
        .rows()
        .iter()
        .map(|record| record.estimated_duration_minutes())
        .sum();
    DurationSummary::Mean {
        minutes: total / sessions as f64,
        sessions,
    }
}
