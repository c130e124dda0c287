use serde::{Deserialize, Serialize};

use crate::model::{
    decoder::{deserialize_opt_f64, deserialize_opt_i64, deserialize_opt_string},
    record::{OptionalFields, RawTransaction},
};

/// Transaction object served by `GET /api/transactions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RemoteTransaction {
    #[serde(deserialize_with = "deserialize_opt_i64")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "deserialize_opt_string")]
    pub cp_id: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_i64")]
    pub transaction_id: Option<i64>,
    #[serde(deserialize_with = "deserialize_opt_string")]
    pub id_tag: Option<String>,
    pub start_time: Option<String>,
    pub stop_time: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_f64")]
    pub meter_start: Option<f64>,
    #[serde(deserialize_with = "deserialize_opt_f64")]
    pub meter_stop: Option<f64>,
    #[serde(deserialize_with = "deserialize_opt_string")]
    pub remark: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_string")]
    pub rate_type: Option<String>,
}

impl From<RemoteTransaction> for RawTransaction {
    fn from(remote: RemoteTransaction) -> Self {
        Self {
            id: remote.id,
            cp_id: remote.cp_id,
            transaction_id: remote.transaction_id,
            id_tag: remote.id_tag,
            start_time: remote.start_time,
            stop_time: remote.stop_time,
            meter_start: remote.meter_start,
            meter_stop: remote.meter_stop,
            extras: OptionalFields {
                remark: remote.remark,
                status: remote.status,
                rate_type: remote.rate_type,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChargePointEntry {
    Id(String),
    Detailed {
        id: String,
        #[serde(default)]
        status: Option<String>,
    },
}

/// Body of `GET /api/charge_points`. Older backends answer with a flat list,
/// newer ones split charge points by whether they have recorded sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChargePointListing {
    Flat(Vec<ChargePointEntry>),
    Grouped {
        #[serde(default)]
        with_data: Vec<ChargePointEntry>,
        #[serde(default)]
        registered_only: Vec<ChargePointEntry>,
    },
}

impl Default for ChargePointListing {
    fn default() -> Self {
        Self::Grouped {
            with_data: Vec::new(),
            registered_only: Vec::new(),
        }
    }
}
