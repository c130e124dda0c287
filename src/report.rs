//! One pipeline pass: fetched table → filter → aggregates and table view.

use serde_json::Value;

use crate::{
    aggregate,
    filter::{self, DateRange, PredicateSet},
    model::{
        api_request::DashboardQuery,
        api_response::{DashboardReport, DashboardView, TableView, charge_point_options},
        column::display_columns,
        record::TransactionTable,
    },
    source::FetchOutcome,
};

pub const NO_COMPLETE_DATA: &str =
    "No complete transaction data (both meter_start and meter_stop) is available";

pub fn filtered_table(table: &TransactionTable, query: &DashboardQuery) -> TransactionTable {
    filter::apply(table, &PredicateSet::from_query(query, table))
}

pub fn table_view(table: &TransactionTable) -> TableView {
    let columns = display_columns(table);
    TableView {
        columns: columns.iter().map(|c| c.header()).collect(),
        rows: table
            .rows()
            .iter()
            .map(|record| columns.iter().map(|c| Value::from(c.cell(record))).collect())
            .collect(),
    }
}

pub fn build(outcome: FetchOutcome, query: &DashboardQuery) -> DashboardView {
    let FetchOutcome { table, warnings } = outcome;
    let Some((min, max)) = table.date_bounds() else {
        return DashboardView::NoCompleteData {
            message: NO_COMPLETE_DATA.to_string(),
            warnings,
        };
    };

    let predicates = PredicateSet::from_query(query, &table);
    let filtered = filter::apply(&table, &predicates);

    DashboardView::Ready(Box::new(DashboardReport {
        warnings,
        charge_points: charge_point_options(&table),
        date_bounds: DateRange {
            start: min,
            end: max,
        },
        applied_range: predicates.date_range.unwrap_or(DateRange {
            start: min,
            end: max,
        }),
        row_count: filtered.len(),
        daily_energy: aggregate::daily_energy(&filtered),
        daily_transactions: aggregate::daily_transactions(&filtered),
        time_buckets: aggregate::bucket_energy(&filtered),
        charge_point_share: aggregate::charge_point_share(&filtered),
        sessions: aggregate::session_estimates(&filtered),
        mean_duration: aggregate::mean_duration(&filtered),
        table: table_view(&filtered),
    }))
}
