use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    error::AppError,
    model::{
        record::{MeterUnit, RawTransaction},
        remote::{ChargePointListing, RemoteTransaction},
    },
    source::{FetchOutcome, normalize_rows},
};

const TRANSACTIONS_PATH: &str = "/api/transactions";
const CHARGE_POINTS_PATHS: [&str; 2] = ["/api/charge_points", "/api/charge-points"];

/// Client for the OCPP backend's read-only REST API.
#[derive(Debug, Clone)]
pub struct RemoteApi {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, reqwest::Error> {
        let url = self.url(path);
        debug!(url, "GET");
        self.client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    pub async fn transactions(&self) -> Result<Vec<RemoteTransaction>, reqwest::Error> {
        self.get_json(TRANSACTIONS_PATH).await
    }

    /// Tries the underscore route first and falls back to the dashed one.
    pub async fn charge_point_groups(&self) -> Result<ChargePointListing, reqwest::Error> {
        let [primary, fallback] = CHARGE_POINTS_PATHS;
        match self.get_json(primary).await {
            Ok(listing) => Ok(listing),
            Err(e) => {
                debug!(error = %e, path = primary, "Falling back to alternate charge point route");
                self.get_json(fallback).await
            }
        }
    }

    /// Fetches all transactions. Any failure degrades to an empty table and a
    /// warning so the dashboard still renders.
    pub async fn fetch(&self, unit: MeterUnit) -> FetchOutcome {
        match self.transactions().await {
            Ok(rows) => normalize_rows(rows.into_iter().map(RawTransaction::from), unit),
            Err(e) => {
                warn!(error = %e, "Remote transaction query failed");
                FetchOutcome::degraded(format!(
                    "Unable to query {}: {e}",
                    self.url(TRANSACTIONS_PATH)
                ))
            }
        }
    }

    pub async fn fetch_charge_point_groups(&self) -> (ChargePointListing, Option<String>) {
        match self.charge_point_groups().await {
            Ok(listing) => (listing, None),
            Err(e) => {
                warn!(error = %e, "Remote charge point query failed");
                (
                    ChargePointListing::default(),
                    Some(format!("Unable to query charge points: {e}")),
                )
            }
        }
    }
}

#[cfg(test)]
mod test {
    use axum::{Json, Router, http::StatusCode, routing::get};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;
    use crate::model::{record::OptionalColumn, remote::ChargePointEntry};

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn api(base_url: &str) -> RemoteApi {
        RemoteApi::new(base_url, Duration::from_secs(2)).unwrap()
    }

    async fn transactions_body() -> Json<Value> {
        Json(json!([
            {"id": 2, "cp_id": "CP-9", "transaction_id": 5, "id_tag": "XYZ99",
             "start_time": "2024-01-01T18:00:00", "meter_start": 1000, "meter_stop": 11000,
             "rate_type": "peak"},
            {"id": 1, "cp_id": "CP-9", "transaction_id": 4, "id_tag": "abc",
             "start_time": "2024-01-01T08:00:00", "meter_start": 500, "meter_stop": null}
        ]))
    }

    #[tokio::test]
    async fn test_fetch_converts_watt_hours() {
        let base = serve(Router::new().route("/api/transactions", get(transactions_body))).await;
        let outcome = api(&base).fetch(MeterUnit::WattHour).await;

        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.table.len(), 1);
        assert_eq!(outcome.table.rows()[0].used_energy(), 10.0);
        assert!(outcome.table.has_column(OptionalColumn::RateType));
        assert!(!outcome.table.has_column(OptionalColumn::Remark));
    }

    #[tokio::test]
    async fn test_fetch_degrades_on_error_status() {
        let base = serve(Router::new().route(
            "/api/transactions",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        ))
        .await;
        let outcome = api(&base).fetch(MeterUnit::WattHour).await;

        assert!(outcome.table.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("/api/transactions"));
    }

    #[tokio::test]
    async fn test_fetch_degrades_when_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let outcome = api(&format!("http://{addr}")).fetch(MeterUnit::WattHour).await;
        assert!(outcome.table.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_charge_point_groups_falls_back_to_dashed_route() {
        let base = serve(Router::new().route(
            "/api/charge-points",
            get(|| async { Json(json!({"with_data": ["CP-1"], "registered_only": []})) }),
        ))
        .await;
        let (listing, warning) = api(&base).fetch_charge_point_groups().await;

        assert_eq!(warning, None);
        assert_eq!(
            listing,
            ChargePointListing::Grouped {
                with_data: vec![ChargePointEntry::Id("CP-1".to_string())],
                registered_only: Vec::new(),
            }
        );
    }

    #[tokio::test]
    async fn test_charge_point_groups_default_on_failure() {
        let base = serve(Router::new()).await;
        let (listing, warning) = api(&base).fetch_charge_point_groups().await;
        assert_eq!(listing, ChargePointListing::default());
        assert!(warning.is_some());
    }
}
