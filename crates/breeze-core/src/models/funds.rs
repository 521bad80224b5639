use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de;

/// Account funds as returned by `GET /funds`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Funds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bank_balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocated_equity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocated_fno: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_by_trade_equity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unallocated_balance: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for Funds {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            bank_account: de::take_string(&mut map, "bank_account"),
            total_bank_balance: de::take_f64(&mut map, "total_bank_balance"),
            allocated_equity: de::take_f64(&mut map, "allocated_equity"),
            allocated_fno: de::take_f64(&mut map, "allocated_fno"),
            block_by_trade_equity: de::take_f64(&mut map, "block_by_trade_equity"),
            unallocated_balance: de::take_f64(&mut map, "unallocated_balance"),
            extra: map,
        }
    }
}

impl Funds {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
