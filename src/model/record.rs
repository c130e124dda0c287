use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike as _};
use serde::{Deserialize, Serialize};

use crate::model::decoder::parse_timestamp;

/// Grouping key used for sessions whose charge point was never recorded.
pub const UNKNOWN_CHARGE_POINT: &str = "unknown";

/// Constant power draw assumed when estimating how long a session charged.
pub const ASSUMED_POWER_KW: f64 = 7.2;

/// Unit a backend reports meter readings in. Everything downstream of the
/// adapters is kWh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeterUnit {
    #[serde(rename = "kwh")]
    KilowattHour,
    #[serde(rename = "wh")]
    WattHour,
}

impl MeterUnit {
    pub fn to_kwh(self, reading: f64) -> f64 {
        match self {
            Self::KilowattHour => reading,
            Self::WattHour => reading / 1000.0,
        }
    }
}

impl FromStr for MeterUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kwh" => Ok(Self::KilowattHour),
            "wh" => Ok(Self::WattHour),
            other => Err(format!("unknown meter unit {other:?}, expected kwh or wh")),
        }
    }
}

/// Demand period a session started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeBucket {
    Peak,
    Mid,
    OffPeak,
}

impl TimeBucket {
    pub const ALL: [Self; 3] = [Self::Peak, Self::Mid, Self::OffPeak];

    /// 17:00-21:59 is peak, 10:00-16:59 is mid, every other hour is off-peak.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            17..=21 => Self::Peak,
            10..=16 => Self::Mid,
            _ => Self::OffPeak,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Peak => "peak",
            Self::Mid => "mid",
            Self::OffPeak => "off-peak",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns some backends attach to a transaction and others never send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalColumn {
    Remark,
    Status,
    RateType,
}

impl OptionalColumn {
    pub const ALL: [Self; 3] = [Self::Remark, Self::Status, Self::RateType];

    pub fn name(self) -> &'static str {
        match self {
            Self::Remark => "remark",
            Self::Status => "status",
            Self::RateType => "rate_type",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalFields {
    pub remark: Option<String>,
    pub status: Option<String>,
    pub rate_type: Option<String>,
}

impl OptionalFields {
    pub fn get(&self, column: OptionalColumn) -> Option<&str> {
        match column {
            OptionalColumn::Remark => self.remark.as_deref(),
            OptionalColumn::Status => self.status.as_deref(),
            OptionalColumn::RateType => self.rate_type.as_deref(),
        }
    }
}

/// A transaction as read from either backend, before any validation.
/// Meter readings are still in the backend's own unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTransaction {
    pub id: Option<i64>,
    pub cp_id: Option<String>,
    pub transaction_id: Option<i64>,
    pub id_tag: Option<String>,
    pub start_time: Option<String>,
    pub stop_time: Option<String>,
    pub meter_start: Option<f64>,
    pub meter_stop: Option<f64>,
    pub extras: OptionalFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    IncompleteMeter,
    InvalidStartTime,
}

/// One completed charging session. Meter readings are in kWh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub id: i64,
    pub cp_id: String,
    pub transaction_id: i64,
    pub id_tag: Option<String>,
    pub start_time: NaiveDateTime,
    pub stop_time: Option<NaiveDateTime>,
    pub meter_start: f64,
    pub meter_stop: f64,
    #[serde(flatten)]
    pub extras: OptionalFields,
}

impl TransactionRecord {
    /// Validates a raw row and converts its readings to kWh. Missing
    /// identifiers default to 0 and a missing charge point becomes
    /// [`UNKNOWN_CHARGE_POINT`].
    pub fn normalize(raw: RawTransaction, unit: MeterUnit) -> Result<Self, Rejection> {
        let (Some(meter_start), Some(meter_stop)) = (raw.meter_start, raw.meter_stop) else {
            return Err(Rejection::IncompleteMeter);
        };
        let start_time = raw
            .start_time
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or(Rejection::InvalidStartTime)?;

        let cp_id = raw
            .cp_id
            .filter(|cp| !cp.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_CHARGE_POINT.to_string());

        Ok(Self {
            id: raw.id.unwrap_or_default(),
            cp_id,
            transaction_id: raw.transaction_id.unwrap_or_default(),
            id_tag: raw.id_tag,
            start_time,
            stop_time: raw.stop_time.as_deref().and_then(parse_timestamp),
            meter_start: unit.to_kwh(meter_start),
            meter_stop: unit.to_kwh(meter_stop),
            extras: raw.extras,
        })
    }

    pub fn used_energy(&self) -> f64 {
        self.meter_stop - self.meter_start
    }

    pub fn date(&self) -> NaiveDate {
        self.start_time.date()
    }

    pub fn time_bucket(&self) -> TimeBucket {
        TimeBucket::from_hour(self.start_time.hour())
    }

    /// Charging time implied by the energy delivered at [`ASSUMED_POWER_KW`].
    /// This is an estimate, not a measurement.
    pub fn estimated_duration_minutes(&self) -> f64 {
        self.used_energy() / ASSUMED_POWER_KW * 60.0
    }

    /// `None` when the estimate does not land on a representable datetime.
    pub fn estimated_end_time(&self) -> Option<NaiveDateTime> {
        let millis = (self.estimated_duration_minutes() * 60_000.0).round();
        if !millis.is_finite() {
            return None;
        }
        let offset = TimeDelta::try_milliseconds(millis as i64)?;
        self.start_time.checked_add_signed(offset)
    }
}

/// An immutable, ordered set of transactions plus the optional columns the
/// source actually supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionTable {
    rows: Vec<TransactionRecord>,
    optional_columns: BTreeSet<OptionalColumn>,
}

impl TransactionTable {
    /// Optional columns are inferred: a column is present when at least one
    /// row carries a value for it.
    pub fn new(rows: Vec<TransactionRecord>) -> Self {
        let optional_columns = OptionalColumn::ALL
            .into_iter()
            .filter(|column| rows.iter().any(|row| row.extras.get(*column).is_some()))
            .collect();
        Self {
            rows,
            optional_columns,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[TransactionRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: OptionalColumn) -> bool {
        self.optional_columns.contains(&column)
    }

    pub fn optional_columns(&self) -> impl Iterator<Item = OptionalColumn> + '_ {
        self.optional_columns.iter().copied()
    }

    /// Builds a new table keeping the rows matching `keep`. The column set is
    /// carried over so a narrowed view still reports the source's columns.
    pub fn retain<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&TransactionRecord) -> bool,
    {
        Self {
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
            optional_columns: self.optional_columns.clone(),
        }
    }

    /// Earliest and latest start date in the table.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(TransactionRecord::date).min()?;
        let max = self.rows.iter().map(TransactionRecord::date).max()?;
        Some((min, max))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    fn raw(meter_start: Option<f64>, meter_stop: Option<f64>) -> RawTransaction {
        RawTransaction {
            id: Some(1),
            cp_id: Some("CP-1".to_string()),
            transaction_id: Some(10),
            id_tag: Some("user1".to_string()),
            start_time: Some("2024-01-01T18:30:00".to_string()),
            stop_time: Some("2024-01-01T19:30:00".to_string()),
            meter_start,
            meter_stop,
            extras: OptionalFields::default(),
        }
    }

    #[test_case(MeterUnit::KilowattHour, 1500.0 ; "kwh passes through")]
    #[test_case(MeterUnit::WattHour, 1.5 ; "wh divided by 1000")]
    fn test_normalize_converts_units(unit: MeterUnit, expected_used: f64) {
        let record = TransactionRecord::normalize(raw(Some(500.0), Some(2000.0)), unit).unwrap();
        assert_eq!(record.used_energy(), expected_used);
    }

    #[test]
    fn test_normalize_rejects_incomplete_rows() {
        assert_eq!(
            TransactionRecord::normalize(raw(Some(1.0), None), MeterUnit::KilowattHour),
            Err(Rejection::IncompleteMeter)
        );

        let mut bad_time = raw(Some(1.0), Some(2.0));
        bad_time.start_time = Some("not a time".to_string());
        assert_eq!(
            TransactionRecord::normalize(bad_time, MeterUnit::KilowattHour),
            Err(Rejection::InvalidStartTime)
        );
    }

    #[test]
    fn test_normalize_fills_unknown_charge_point() {
        let mut missing = raw(Some(0.0), Some(1.0));
        missing.cp_id = None;
        missing.stop_time = Some("garbage".to_string());
        let record = TransactionRecord::normalize(missing, MeterUnit::KilowattHour).unwrap();
        assert_eq!(record.cp_id, UNKNOWN_CHARGE_POINT);
        assert_eq!(record.stop_time, None);

        let mut blank = raw(Some(0.0), Some(1.0));
        blank.cp_id = Some("  ".to_string());
        let record = TransactionRecord::normalize(blank, MeterUnit::KilowattHour).unwrap();
        assert_eq!(record.cp_id, UNKNOWN_CHARGE_POINT);
    }

    #[test]
    fn test_duration_estimate() {
        let record =
            TransactionRecord::normalize(raw(Some(0.0), Some(7.2)), MeterUnit::KilowattHour)
                .unwrap();
        assert!((record.estimated_duration_minutes() - 60.0).abs() < 1e-9);
        assert_eq!(
            record.estimated_end_time().map(|t| t.to_string()).as_deref(),
            Some("2024-01-01 19:30:00")
        );
        assert_eq!(record.time_bucket(), TimeBucket::Peak);
    }

    #[test_case(0.0, 1e14 ; "far past the datetime range")]
    #[test_case(1e14, 0.0 ; "far before the datetime range")]
    #[test_case(0.0, f64::INFINITY ; "infinite reading")]
    fn test_end_time_out_of_range_is_absent(meter_start: f64, meter_stop: f64) {
        let record = TransactionRecord::normalize(
            raw(Some(meter_start), Some(meter_stop)),
            MeterUnit::WattHour,
        )
        .unwrap();
        assert_eq!(record.estimated_end_time(), None);
    }

    #[test]
    fn test_optional_columns_inferred_from_values() {
        let mut with_status =
            TransactionRecord::normalize(raw(Some(0.0), Some(1.0)), MeterUnit::KilowattHour)
                .unwrap();
        let plain = with_status.clone();
        with_status.extras.status = Some("Finished".to_string());

        let table = TransactionTable::new(vec![plain, with_status]);
        assert!(table.has_column(OptionalColumn::Status));
        assert!(!table.has_column(OptionalColumn::Remark));

        let narrowed = table.retain(|row| row.extras.status.is_none());
        assert_eq!(narrowed.len(), 1);
        assert!(narrowed.has_column(OptionalColumn::Status));
        assert_eq!(table.len(), 2);
    }
}
