use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
    /// Any status string not listed above, kept verbatim
    Other(String),
}

impl OrderStatus {
    /// Orders still working in the market
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Open | OrderStatus::PartiallyFilled
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Open => "OPEN",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PENDING" => OrderStatus::Pending,
            "OPEN" => OrderStatus::Open,
            "PARTIALLY_FILLED" => OrderStatus::PartiallyFilled,
            "FILLED" => OrderStatus::Filled,
            "CANCELLED" => OrderStatus::Cancelled,
            "REJECTED" => OrderStatus::Rejected,
            _ => OrderStatus::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order book entry from `GET /orders`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Order {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Only set for string statuses; anything else stays in `extra`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_datetime: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for Order {
    fn from(mut map: Map<String, Value>) -> Self {
        let status = match map.get("status") {
            Some(Value::String(_)) => match map.remove("status") {
                Some(Value::String(s)) => Some(OrderStatus::from(s)),
                _ => None,
            },
            _ => None,
        };

        Self {
            order_id: de::take_string(&mut map, "order_id"),
            stock_code: de::take_string(&mut map, "stock_code"),
            exchange_code: de::take_string(&mut map, "exchange_code"),
            action: de::take_string(&mut map, "action"),
            quantity: de::take_f64(&mut map, "quantity"),
            price: de::take_f64(&mut map, "price"),
            status,
            order_datetime: de::take_string(&mut map, "order_datetime"),
            extra: map,
        }
    }
}

impl Order {
    pub fn is_open(&self) -> bool {
        self.status.as_ref().map(|s| s.is_open()).unwrap_or(false)
    }
}
