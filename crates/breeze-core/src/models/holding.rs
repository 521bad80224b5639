use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de;

/// A demat holding from `GET /dematholdings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Holding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_isin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_market_price: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for Holding {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            stock_code: de::take_string(&mut map, "stock_code"),
            stock_isin: de::take_string(&mut map, "stock_isin"),
            quantity: de::take_f64(&mut map, "quantity"),
            average_price: de::take_f64(&mut map, "average_price"),
            current_market_price: de::take_f64(&mut map, "current_market_price"),
            extra: map,
        }
    }
}

impl Holding {
    /// Quantity times current market price, when both are known
    pub fn market_value(&self) -> Option<f64> {
        Some(self.quantity? * self.current_market_price?)
    }
}
