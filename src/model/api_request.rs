use chrono::NaiveDate;
use serde::Deserialize;

use crate::{error::AppError, source::DataSource};

/// Filter selection sent with every dashboard and export request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardQuery {
    pub source: DataSource,
    pub cp_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct SourceQuery {
    pub source: DataSource,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub account: String,
    pub password: String,
}

impl DashboardQuery {
    pub fn validate(&self) -> Result<(), AppError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start > end => Err(AppError::BadRequest(format!(
                "start_date {start} is after end_date {end}"
            ))),
            _ => Ok(()),
        }
    }
}
