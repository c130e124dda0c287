use serde_json::Value;

use crate::model::{
    decoder::format_timestamp,
    record::{OptionalColumn, TransactionRecord, TransactionTable},
};

/// A column of the transaction table as it is shown or exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    CpId,
    TransactionId,
    IdTag,
    StartTime,
    StopTime,
    MeterStart,
    MeterStop,
    UsedKwh,
    TimeBucket,
    ChargeDurationMinutes,
    EndTime,
    Optional(OptionalColumn),
}

/// Columns every table carries, in display order.
pub const BASE_COLUMNS: [Column; 9] = [
    Column::Id,
    Column::CpId,
    Column::TransactionId,
    Column::IdTag,
    Column::StartTime,
    Column::StopTime,
    Column::MeterStart,
    Column::MeterStop,
    Column::UsedKwh,
];

const DERIVED_COLUMNS: [Column; 3] = [
    Column::TimeBucket,
    Column::ChargeDurationMinutes,
    Column::EndTime,
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(i64),
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    pub fn to_text(&self) -> String {
        match self {
            Self::Integer(n) => n.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Empty => String::new(),
        }
    }
}

impl From<Cell> for Value {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Integer(n) => Value::from(n),
            Cell::Number(n) => Value::from(n),
            Cell::Text(s) => Value::from(s),
            Cell::Empty => Value::Null,
        }
    }
}

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::CpId => "cp_id",
            Self::TransactionId => "transaction_id",
            Self::IdTag => "id_tag",
            Self::StartTime => "start_time",
            Self::StopTime => "stop_time",
            Self::MeterStart => "meter_start",
            Self::MeterStop => "meter_stop",
            Self::UsedKwh => "used_kwh",
            Self::TimeBucket => "time_bucket",
            Self::ChargeDurationMinutes => "charge_duration_minutes",
            Self::EndTime => "end_time",
            Self::Optional(column) => column.name(),
        }
    }

    pub fn cell(self, record: &TransactionRecord) -> Cell {
        let text = |value: Option<&str>| value.map_or(Cell::Empty, |s| Cell::Text(s.to_string()));
        match self {
            Self::Id => Cell::Integer(record.id),
            Self::CpId => Cell::Text(record.cp_id.clone()),
            Self::TransactionId => Cell::Integer(record.transaction_id),
            Self::IdTag => text(record.id_tag.as_deref()),
            Self::StartTime => Cell::Text(format_timestamp(&record.start_time)),
            Self::StopTime => record
                .stop_time
                .as_ref()
                .map_or(Cell::Empty, |dt| Cell::Text(format_timestamp(dt))),
            Self::MeterStart => Cell::Number(record.meter_start),
            Self::MeterStop => Cell::Number(record.meter_stop),
            Self::UsedKwh => Cell::Number(record.used_energy()),
            Self::TimeBucket => Cell::Text(record.time_bucket().to_string()),
            Self::ChargeDurationMinutes => Cell::Number(record.estimated_duration_minutes()),
            Self::EndTime => record
                .estimated_end_time()
                .map_or(Cell::Empty, |dt| Cell::Text(format_timestamp(&dt))),
            Self::Optional(column) => text(record.extras.get(column)),
        }
    }
}

/// Base columns followed by the optional columns the table carries.
pub fn display_columns(table: &TransactionTable) -> Vec<Column> {
    BASE_COLUMNS
        .into_iter()
        .chain(table.optional_columns().map(Column::Optional))
        .collect()
}

/// Display columns with the derived time bucket and duration estimate
/// inserted before the optional columns.
pub fn export_columns(table: &TransactionTable) -> Vec<Column> {
    BASE_COLUMNS
        .into_iter()
        .chain(DERIVED_COLUMNS)
        .chain(table.optional_columns().map(Column::Optional))
        .collect()
}
