pub mod api_request;
pub mod api_response;
pub mod column;
pub mod csv;
pub mod database;
pub mod record;
pub mod remote;

pub(crate) mod decoder {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{Deserialize as _, Deserializer, de::Error};
    use serde_json::Value;

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    /// Parses the timestamp shapes the charging backends emit. Offsets are
    /// dropped after conversion, keeping the wall-clock time of the source.
    pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_local());
        }
        DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    }

    pub fn format_timestamp(dt: &NaiveDateTime) -> String {
        dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }

    fn number_from_value<E: Error>(value: Value) -> Result<Option<f64>, E> {
        match value {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(n.as_f64()),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => s
                .trim()
                .replace(',', "")
                .parse::<f64>()
                .map(Some)
                .map_err(|err| E::custom(format!("Unable to parse number {s:?}: {err}"))),
            other => Err(E::custom(format!("Expected a number, found {other}"))),
        }
    }

    /// Accepts a JSON number, a numeric string, or null.
    pub fn deserialize_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        number_from_value(Value::deserialize(deserializer)?)
    }

    pub fn deserialize_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let number = number_from_value::<D::Error>(Value::deserialize(deserializer)?)?;
        match number {
            Some(n) if n.fract() == 0.0 => Ok(Some(n as i64)),
            Some(n) => Err(D::Error::custom(format!("Expected an integer, found {n}"))),
            None => Ok(None),
        }
    }

    /// Any scalar is kept as text; identifiers are sometimes sent as numbers.
    pub fn deserialize_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            other => Err(D::Error::custom(format!("Expected a scalar, found {other}"))),
        }
    }

    #[cfg(test)]
    mod test {
        use chrono::NaiveDate;
        use test_case::test_case;

        use super::parse_timestamp;

        #[test_case("2024-01-01T18:00" ; "minutes only")]
        #[test_case("2024-01-01T18:00:00" ; "iso seconds")]
        #[test_case("2024-01-01 18:00:00" ; "space separated")]
        #[test_case("2024-01-01 18:00" ; "space separated minutes")]
        #[test_case("2024-01-01T18:00:00+08:00" ; "rfc3339 offset")]
        #[test_case("2024-01-01T18:00:00Z" ; "rfc3339 utc")]
        fn test_parse_timestamp_keeps_wall_clock(raw: &str) {
            let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap();
            assert_eq!(parse_timestamp(raw), Some(expected));
        }

        #[test]
        fn test_parse_timestamp_fractional_and_date_only() {
            let dt = parse_timestamp("2024-03-05 07:08:09.250").unwrap();
            assert_eq!(dt.and_utc().timestamp_subsec_millis(), 250);

            let midnight = parse_timestamp("2024-03-05").unwrap();
            assert_eq!(midnight.to_string(), "2024-03-05 00:00:00");
        }

        #[test_case("" ; "empty")]
        #[test_case("yesterday" ; "words")]
        #[test_case("2024-13-01T00:00:00" ; "bad month")]
        fn test_parse_timestamp_rejects(raw: &str) {
            assert_eq!(parse_timestamp(raw), None);
        }
    }
}
