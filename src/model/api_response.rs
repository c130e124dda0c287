use serde::Serialize;
use serde_json::Value;

use crate::{
    aggregate::{
        BucketEnergy, ChargePointShare, DailyCount, DailyEnergy, DurationSummary, SessionEstimate,
    },
    filter::{DateRange, charge_point_ids},
    model::{record::TransactionTable, remote::ChargePointListing},
};

/// Entry of the charge-point selector. Clients send `id` back unchanged and
/// only display `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargePointOption {
    pub id: String,
    pub label: String,
}

impl From<String> for ChargePointOption {
    fn from(id: String) -> Self {
        let label = format!("Charge point {id}");
        Self { id, label }
    }
}

pub fn charge_point_options(table: &TransactionTable) -> Vec<ChargePointOption> {
    charge_point_ids(table)
        .into_iter()
        .map(ChargePointOption::from)
        .collect()
}

#[derive(Debug, Serialize)]
pub struct TableView {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardView {
    NoCompleteData {
        message: String,
        warnings: Vec<String>,
    },
    Ready(Box<DashboardReport>),
}

#[derive(Debug, Serialize)]
pub struct DashboardReport {
    pub warnings: Vec<String>,
    pub charge_points: Vec<ChargePointOption>,
    pub date_bounds: DateRange,
    pub applied_range: DateRange,
    pub row_count: usize,
    pub daily_energy: Vec<DailyEnergy>,
    pub daily_transactions: Vec<DailyCount>,
    pub time_buckets: Vec<BucketEnergy>,
    pub charge_point_share: Vec<ChargePointShare>,
    pub sessions: Vec<SessionEstimate>,
    pub mean_duration: DurationSummary,
    pub table: TableView,
}

#[derive(Debug, Serialize)]
pub struct ChargePointsResponse {
    pub options: Vec<ChargePointOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_groups: Option<ChargePointListing>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub account: String,
    pub since: chrono::DateTime<chrono::Utc>,
}
