use std::{collections::HashMap, env, net::SocketAddr, str::FromStr, time::Duration};

use crate::{error::AppError, model::record::MeterUnit};

const DEFAULT_DATABASE_URL: &str = "energy_ocpp.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_BACKEND_API_URL: &str = "https://your-ocpp-backend.onrender.com";
const DEFAULT_USERS: &str = "admin:admin";

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub backend_api_url: String,
    pub backend_api_timeout: Duration,
    pub request_timeout: Duration,
    pub users: HashMap<String, String>,
    pub session_ttl: Duration,
    pub local_meter_unit: MeterUnit,
    pub remote_meter_unit: MeterUnit,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            database_url: get("DATABASE_URL", DEFAULT_DATABASE_URL),
            bind_addr: parse_value("BIND_ADDR", &get("BIND_ADDR", DEFAULT_BIND_ADDR))?,
            backend_api_url: get("BACKEND_API_URL", DEFAULT_BACKEND_API_URL)
                .trim_end_matches('/')
                .to_string(),
            backend_api_timeout: Duration::from_secs(parse_value(
                "BACKEND_API_TIMEOUT_SECS",
                &get("BACKEND_API_TIMEOUT_SECS", "5"),
            )?),
            request_timeout: Duration::from_secs(parse_value(
                "REQUEST_TIMEOUT_SECS",
                &get("REQUEST_TIMEOUT_SECS", "30"),
            )?),
            users: parse_users(&get("DASHBOARD_USERS", DEFAULT_USERS))?,
            session_ttl: Duration::from_secs(parse_value(
                "SESSION_TTL_SECS",
                &get("SESSION_TTL_SECS", "28800"),
            )?),
            local_meter_unit: parse_value("LOCAL_METER_UNIT", &get("LOCAL_METER_UNIT", "kwh"))?,
            remote_meter_unit: parse_value("REMOTE_METER_UNIT", &get("REMOTE_METER_UNIT", "wh"))?,
        })
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{key}={raw:?}: {e}")))
}

/// Parses `account:password` pairs separated by commas.
fn parse_users(raw: &str) -> Result<HashMap<String, String>, AppError> {
    let users = raw
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            pair.split_once(':')
                .filter(|(account, _)| !account.is_empty())
                .map(|(account, password)| (account.to_string(), password.to_string()))
                .ok_or_else(|| AppError::Config(format!("DASHBOARD_USERS entry {pair:?}")))
        })
        .collect::<Result<HashMap<_, _>, _>>()?;

    if users.is_empty() {
        return Err(AppError::Config("DASHBOARD_USERS is empty".to_string()));
    }
    Ok(users)
}

#[cfg(test)]
mod test {
    use super::*;
    use serial_test::serial;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.database_url, "energy_ocpp.db");
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.backend_api_timeout, Duration::from_secs(5));
        assert_eq!(config.session_ttl, Duration::from_secs(8 * 60 * 60));
        assert_eq!(config.local_meter_unit, MeterUnit::KilowattHour);
        assert_eq!(config.remote_meter_unit, MeterUnit::WattHour);
        assert_eq!(config.users.get("admin").map(String::as_str), Some("admin"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("BACKEND_API_URL", "http://localhost:9000/"),
            ("DASHBOARD_USERS", "alice:secret, bob:hunter2"),
            ("REMOTE_METER_UNIT", "kWh"),
            ("SESSION_TTL_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(config.backend_api_url, "http://localhost:9000");
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.users["bob"], "hunter2");
        assert_eq!(config.remote_meter_unit, MeterUnit::KilowattHour);
        assert_eq!(config.session_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_rejects_malformed_values() {
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("BIND_ADDR", "not-an-addr")])),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("DASHBOARD_USERS", "nopassword")])),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("DASHBOARD_USERS", " , ")])),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("LOCAL_METER_UNIT", "joules")])),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    #[serial]
    fn test_reads_process_environment() {
        // SAFETY: serialised with the other environment-mutating tests.
        unsafe { env::set_var("DATABASE_URL", "/tmp/dashboard-test.db") };
        let config = Config::from_env();
        unsafe { env::remove_var("DATABASE_URL") };

        assert_eq!(config.unwrap().database_url, "/tmp/dashboard-test.db");
    }
}
