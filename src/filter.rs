use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{
    api_request::DashboardQuery,
    record::{TransactionRecord, TransactionTable},
};

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Predicates selected by the user. Every `None` predicate is disabled and
/// the enabled ones are combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateSet {
    pub charge_point: Option<String>,
    pub date_range: Option<DateRange>,
    pub tag: Option<String>,
}

impl PredicateSet {
    /// Resolves a request against the unfiltered table: a missing bound
    /// defaults to the earliest or latest observed start date, and empty
    /// strings disable their predicate.
    pub fn from_query(query: &DashboardQuery, table: &TransactionTable) -> Self {
        let date_range = table.date_bounds().map(|(min, max)| DateRange {
            start: query.start_date.unwrap_or(min),
            end: query.end_date.unwrap_or(max),
        });
        Self {
            charge_point: query.cp_id.clone().filter(|cp| !cp.is_empty()),
            date_range,
            tag: query.tag.clone().filter(|tag| !tag.is_empty()),
        }
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        let in_range = self
            .date_range
            .is_none_or(|range| range.contains(record.date()));
        let on_charge_point = self
            .charge_point
            .as_deref()
            .is_none_or(|cp| record.cp_id == cp);
        let tag_matches = self.tag.as_deref().is_none_or(|needle| {
            record
                .id_tag
                .as_deref()
                .is_some_and(|tag| tag.to_lowercase().contains(&needle.to_lowercase()))
        });
        in_range && on_charge_point && tag_matches
    }
}

/// Returns a new table holding the rows every enabled predicate accepts.
pub fn apply(table: &TransactionTable, predicates: &PredicateSet) -> TransactionTable {
    if table.is_empty() {
        return table.clone();
    }
    table.retain(|record| predicates.matches(record))
}

/// Distinct charge point ids in the table, sorted.
pub fn charge_point_ids(table: &TransactionTable) -> Vec<String> {
    table
        .rows()
        .iter()
        .map(|record| record.cp_id.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
