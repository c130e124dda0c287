use chrono::NaiveDateTime;

use crate::model::record::TimeBucket;

/// One row of an exported `filtered_data.csv`.
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ExportedRow {
    pub id: i64,
    pub cp_id: String,
    pub transaction_id: i64,
    pub id_tag: Option<String>,
    pub start_time: NaiveDateTime,
    pub stop_time: Option<NaiveDateTime>,
    pub meter_start: f64,
    pub meter_stop: f64,
    pub used_kwh: f64,
    pub time_bucket: TimeBucket,
    pub charge_duration_minutes: f64,
    pub end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub rate_type: Option<String>,
}
