use diesel::{Insertable, Queryable, Selectable};

use crate::model::record::{OptionalFields, RawTransaction};

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionRow {
    pub id: Option<i64>,
    pub cp_id: Option<String>,
    pub transaction_id: Option<i64>,
    pub id_tag: Option<String>,
    pub start_time: Option<String>,
    pub stop_time: Option<String>,
    pub meter_start: Option<f64>,
    pub meter_stop: Option<f64>,
}

impl From<TransactionRow> for RawTransaction {
    fn from(row: TransactionRow) -> Self {
        Self {
            id: row.id,
            cp_id: row.cp_id,
            transaction_id: row.transaction_id,
            id_tag: row.id_tag,
            start_time: row.start_time,
            stop_time: row.stop_time,
            meter_start: row.meter_start,
            meter_stop: row.meter_stop,
            extras: OptionalFields::default(),
        }
    }
}

/// A session as written by the charging-session recorder.
#[derive(Insertable, Debug, Default)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewTransaction<'a> {
    pub cp_id: Option<&'a str>,
    pub transaction_id: Option<i64>,
    pub id_tag: Option<&'a str>,
    pub start_time: Option<&'a str>,
    pub stop_time: Option<&'a str>,
    pub meter_start: Option<f64>,
    pub meter_stop: Option<f64>,
}
