use diesel::{prelude::*, sqlite::SqliteConnection};

use crate::{
    model::database::{NewTransaction, TransactionRow},
    schema::transactions,
};

/// Sessions with both meter readings recorded, newest first.
pub fn complete_transactions(conn: &mut SqliteConnection) -> QueryResult<Vec<TransactionRow>> {
    transactions::table
        .filter(transactions::meter_start.is_not_null())
        .filter(transactions::meter_stop.is_not_null())
        .order(transactions::id.desc())
        .select(TransactionRow::as_select())
        .load(conn)
}

pub fn insert_transactions(
    conn: &mut SqliteConnection,
    rows: &[NewTransaction<'_>],
) -> QueryResult<usize> {
    diesel::insert_into(transactions::table)
        .values(rows)
        .execute(conn)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db::run_migrations;

    fn memory_db() -> SqliteConnection {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        run_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_complete_transactions_skips_open_sessions() {
        let mut conn = memory_db();
        insert_transactions(
            &mut conn,
            &[
                NewTransaction {
                    cp_id: Some("CP-1"),
                    transaction_id: Some(1),
                    start_time: Some("2024-01-01T08:00:00"),
                    meter_start: Some(100.0),
                    meter_stop: Some(120.0),
                    ..Default::default()
                },
                NewTransaction {
                    cp_id: Some("CP-1"),
                    transaction_id: Some(2),
                    start_time: Some("2024-01-01T09:00:00"),
                    meter_start: Some(120.0),
                    ..Default::default()
                },
                NewTransaction {
                    transaction_id: Some(3),
                    start_time: Some("2024-01-02T09:00:00"),
                    meter_start: Some(0.0),
                    meter_stop: Some(5.0),
                    ..Default::default()
                },
            ],
        )
        .unwrap();

        let rows = complete_transactions(&mut conn).unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.transaction_id).collect();
        assert_eq!(ids, vec![Some(3), Some(1)]);
        assert_eq!(rows[0].cp_id, None);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let mut conn = memory_db();
        run_migrations(&mut conn).unwrap();
        diesel::sql_query(
            "INSERT INTO boot_notifications (cp_id, model, vendor) VALUES ('CP-1', 'M', 'V')",
        )
        .execute(&mut conn)
        .unwrap();
    }
}
