//! API client for the Breeze trading endpoints.
//!
//! Every call follows the same shape: check the session, serialize the
//! payload, sign exactly that payload, send it, then unwrap the response
//! envelope.

use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Map;
use tracing::{debug, warn};

use crate::auth::{AuthError, SessionEstablished, SessionManager};
use crate::config::Config;
use crate::models::{Envelope, Funds, Holding, Order};

use super::{ApiError, ApiResult};

// ============================================================================
// Endpoints
// ============================================================================

const FUNDS_PATH: &str = "/funds";
const HOLDINGS_PATH: &str = "/dematholdings";
const ORDERS_PATH: &str = "/orders";

/// Read operations against the Breeze API for one session.
pub struct TradingApiClient {
    http: Client,
    base_url: String,
    session: SessionManager,
    orders_enabled: bool,
}

impl TradingApiClient {
    /// Create a client from configuration. Requires the API key and secret.
    pub fn new(config: &Config) -> ApiResult<Self> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        let session = SessionManager::from_config(http.clone(), config)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            session,
            orders_enabled: config.orders_enabled,
        })
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn orders_enabled(&self) -> bool {
        self.orders_enabled
    }

    pub async fn generate_session(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<SessionEstablished, AuthError> {
        self.session.generate_session(user_id, password).await
    }

    pub async fn resume_session(&self, token: &str) -> Result<SessionEstablished, AuthError> {
        self.session.resume_session(token).await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.validate_session().await
    }

    pub async fn logout(&self) -> bool {
        self.session.logout().await
    }

    async fn require_session(&self) -> ApiResult<()> {
        if self.session.validate_session().await {
            Ok(())
        } else {
            Err(AuthError::NoSession.into())
        }
    }

    async fn get<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        self.require_session().await?;

        let payload = serde_json::to_string(body)?;
        let headers = self
            .session
            .build_auth_headers(&payload)
            .await?
            .to_header_map()?;

        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Sending GET request");

        let response = self
            .http
            .get(&url)
            .headers(headers)
            .body(payload)
            .send()
            .await?;

        Self::read_envelope(path, response).await
    }

    /// Map an HTTP response onto the envelope contract:
    /// non-200 HTTP, non-200 envelope status, or the success payload
    /// (defaulted when absent).
    async fn read_envelope<T>(path: &str, response: Response) -> ApiResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(path, status = status.as_u16(), "HTTP error");
            return Err(ApiError::from_status(status, &body));
        }

        let text = response.text().await?;
        let envelope: Envelope = serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e))
        })?;

        if !envelope.is_ok() {
            let message = envelope.error_message();
            warn!(path, status = envelope.status, error = %message, "Request rejected");
            return Err(ApiError::Remote(message));
        }

        match envelope.into_success() {
            Some(value) => serde_json::from_value(value).map_err(|e| {
                ApiError::InvalidResponse(format!("Unexpected payload from {}: {}", path, e))
            }),
            None => Ok(T::default()),
        }
    }

    // ===== Data Fetching Methods =====

    /// Fetch account funds and allocations
    pub async fn get_account_balance(&self) -> ApiResult<Funds> {
        self.get(FUNDS_PATH, &Map::new()).await
    }

    /// Fetch demat holdings
    pub async fn get_portfolio(&self) -> ApiResult<Vec<Holding>> {
        let holdings: Vec<Holding> = self.get(HOLDINGS_PATH, &Map::new()).await?;
        debug!(count = holdings.len(), "Fetched holdings");
        Ok(holdings)
    }

    /// Fetch orders still working in the market (pending, open, partially filled)
    pub async fn get_open_orders(&self) -> ApiResult<Vec<Order>> {
        self.require_session().await?;
        if !self.orders_enabled {
            warn!("Orders endpoint disabled, returning no open orders");
            return Ok(Vec::new());
        }

        let orders: Vec<Order> = self.get(ORDERS_PATH, &Map::new()).await?;
        let total = orders.len();
        let open: Vec<Order> = orders.into_iter().filter(Order::is_open).collect();
        debug!(total, open = open.len(), "Filtered open orders");
        Ok(open)
    }

    /// Fetch the order book.
    ///
    /// `days` is recorded but not applied: the endpoint takes no date range
    /// and no client-side filtering is done.
    pub async fn get_order_history(&self, days: u32) -> ApiResult<Vec<Order>> {
        self.require_session().await?;
        if !self.orders_enabled {
            warn!(days, "Orders endpoint disabled, returning no order history");
            return Ok(Vec::new());
        }

        let orders: Vec<Order> = self.get(ORDERS_PATH, &Map::new()).await?;
        debug!(days, count = orders.len(), "Fetched order history");
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::compute_checksum;
    use crate::models::OrderStatus;
    use mockito::{Matcher, Server};

    fn config(base_url: &str, orders_enabled: bool) -> Config {
        let base_url = base_url.to_string();
        let orders = if orders_enabled { "true" } else { "false" };
        Config::from_lookup(move |key| match key {
            "BREEZE_API_KEY" => Some("app-key".to_string()),
            "BREEZE_SECRET_KEY" => Some("app-secret".to_string()),
            "BREEZE_ACCOUNT_ID" => Some("ACC1".to_string()),
            "BREEZE_BASE_URL" => Some(base_url.clone()),
            "BREEZE_ORDERS_ENABLED" => Some(orders.to_string()),
            _ => None,
        })
        .unwrap()
    }

    async fn authenticated_client(base_url: &str, orders_enabled: bool) -> TradingApiClient {
        let client = TradingApiClient::new(&config(base_url, orders_enabled)).unwrap();
        client.resume_session("tok").await.unwrap();
        client
    }

    #[test]
    fn test_new_requires_keys() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert!(matches!(
            TradingApiClient::new(&config),
            Err(ApiError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_balance_request_is_signed() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/funds")
            .match_header("content-type", "application/json")
            .match_header("x-appkey", "app-key")
            .match_header("x-sessiontoken", "tok")
            .match_header(
                "x-checksum",
                Matcher::Regex(r"^token [0-9a-f]{64}$".to_string()),
            )
            .match_header(
                "x-timestamp",
                Matcher::Regex(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.000Z$".to_string()),
            )
            .match_body("{}")
            .match_request(|req| {
                let header = |name: &'static str| {
                    req.header(name)
                        .first()
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string)
                };
                match (header("x-timestamp"), header("x-checksum")) {
                    (Some(timestamp), Some(checksum)) => {
                        checksum == format!("token {}", compute_checksum(&timestamp, "{}", "app-secret"))
                    }
                    _ => false,
                }
            })
            .with_status(200)
            .with_body(r#"{"Status":200,"Success":{"total_bank_balance":2500.75,"allocated_equity":"1000"},"Error":null}"#)
            .create_async()
            .await;

        let client = authenticated_client(&server.url(), true).await;
        let funds = client.get_account_balance().await.unwrap();

        assert_eq!(funds.total_bank_balance, Some(2500.75));
        assert_eq!(funds.allocated_equity, Some(1000.0));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_balance_defaults_when_success_absent() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/funds")
            .with_status(200)
            .with_body(r#"{"Status":200,"Success":null,"Error":null}"#)
            .create_async()
            .await;

        let client = authenticated_client(&server.url(), true).await;
        let funds = client.get_account_balance().await.unwrap();
        assert!(funds.is_empty());
    }

    #[tokio::test]
    async fn test_envelope_error_maps_to_remote() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/funds")
            .with_status(200)
            .with_body(r#"{"Status":500,"Error":"x"}"#)
            .create_async()
            .await;

        let client = authenticated_client(&server.url(), true).await;
        match client.get_account_balance().await {
            Err(ApiError::Remote(msg)) => assert_eq!(msg, "x"),
            other => panic!("Expected Remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_status_maps_to_http_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/dematholdings")
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let client = authenticated_client(&server.url(), true).await;
        let err = client.get_portfolio().await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 503, .. }));
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/dematholdings")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let client = authenticated_client(&server.url(), true).await;
        assert!(matches!(
            client.get_portfolio().await,
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_portfolio_success_and_empty() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/dematholdings")
            .with_status(200)
            .with_body(r#"{"Status":200,"Success":[{"stock_code":"INFY","quantity":"10"},{"stock_code":"TCS","quantity":2}]}"#)
            .create_async()
            .await;

        let client = authenticated_client(&server.url(), true).await;
        let holdings = client.get_portfolio().await.unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].stock_code.as_deref(), Some("INFY"));
        assert_eq!(holdings[1].quantity, Some(2.0));

        let mut empty_server = Server::new_async().await;
        empty_server
            .mock("GET", "/dematholdings")
            .with_status(200)
            .with_body(r#"{"Status":200}"#)
            .create_async()
            .await;

        let client = authenticated_client(&empty_server.url(), true).await;
        assert!(client.get_portfolio().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_portfolio_tolerates_unreadable_fields() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/dematholdings")
            .with_status(200)
            .with_body(r#"{"Status":200,"Success":[{"stock_code":"INFY","quantity":"10"},{"stock_code":"TCS","average_price":"N/A"}]}"#)
            .create_async()
            .await;

        let client = authenticated_client(&server.url(), true).await;
        let holdings = client.get_portfolio().await.unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].quantity, Some(10.0));
        assert_eq!(holdings[1].stock_code.as_deref(), Some("TCS"));
        assert_eq!(holdings[1].average_price, None);
        assert_eq!(holdings[1].extra["average_price"], "N/A");
    }

    const MIXED_ORDERS: &str = r#"{"Status":200,"Success":[
        {"order_id":"1","status":"PENDING"},
        {"order_id":"2","status":"FILLED"},
        {"order_id":"3","status":"OPEN"},
        {"order_id":"4","status":"CANCELLED"},
        {"order_id":"5","status":"PARTIALLY_FILLED"}
    ]}"#;

    #[tokio::test]
    async fn test_open_orders_filters_and_keeps_order() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/orders")
            .with_status(200)
            .with_body(MIXED_ORDERS)
            .create_async()
            .await;

        let client = authenticated_client(&server.url(), true).await;
        let open = client.get_open_orders().await.unwrap();

        let ids: Vec<_> = open.iter().filter_map(|o| o.order_id.as_deref()).collect();
        assert_eq!(ids, vec!["1", "3", "5"]);
        assert_eq!(open[2].status, Some(OrderStatus::PartiallyFilled));
    }

    #[tokio::test]
    async fn test_open_orders_survive_odd_records() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/orders")
            .with_status(200)
            .with_body(r#"{"Status":200,"Success":[
                {"order_id":"1","status":"OPEN"},
                {"order_id":"2","status":3},
                {"order_id":"3","status":"open","price":"N/A"},
                {"order_id":"4","status":"PENDING","quantity":"5"}
            ]}"#)
            .create_async()
            .await;

        let client = authenticated_client(&server.url(), true).await;
        let open = client.get_open_orders().await.unwrap();

        // Lowercase "open" is not a recognised status
        let ids: Vec<_> = open.iter().filter_map(|o| o.order_id.as_deref()).collect();
        assert_eq!(ids, vec!["1", "4"]);
        assert_eq!(open[1].quantity, Some(5.0));

        let history = client.get_order_history(7).await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[1].extra["status"], 3);
        assert_eq!(history[2].status, Some(OrderStatus::Other("open".to_string())));
    }

    #[tokio::test]
    async fn test_order_history_returns_everything() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/orders")
            .with_status(200)
            .with_body(MIXED_ORDERS)
            .create_async()
            .await;

        let client = authenticated_client(&server.url(), true).await;
        let history = client.get_order_history(7).await.unwrap();
        assert_eq!(history.len(), 5);
    }

    #[tokio::test]
    async fn test_orders_disabled_skips_network() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/orders")
            .expect(0)
            .create_async()
            .await;

        let client = authenticated_client(&server.url(), false).await;
        assert!(!client.orders_enabled());
        assert!(client.get_open_orders().await.unwrap().is_empty());
        assert!(client.get_order_history(7).await.unwrap().is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_session_guard_makes_no_requests() {
        let mut server = Server::new_async().await;
        let mocks = vec![
            server.mock("GET", "/funds").expect(0).create_async().await,
            server.mock("GET", "/dematholdings").expect(0).create_async().await,
            server.mock("GET", "/orders").expect(0).create_async().await,
        ];

        for orders_enabled in [true, false] {
            let client = TradingApiClient::new(&config(&server.url(), orders_enabled)).unwrap();
            assert!(!client.is_authenticated().await);

            assert!(client.get_account_balance().await.unwrap_err().is_no_session());
            assert!(client.get_portfolio().await.unwrap_err().is_no_session());
            assert!(client.get_open_orders().await.unwrap_err().is_no_session());
            assert!(client.get_order_history(7).await.unwrap_err().is_no_session());
        }

        for mock in mocks {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let client = authenticated_client("http://127.0.0.1:1", true).await;
        assert!(matches!(
            client.get_account_balance().await,
            Err(ApiError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/authenticate")
            .with_status(200)
            .with_body(r#"{"Status":200,"Success":{"session_token":"fresh"}}"#)
            .create_async()
            .await;
        let funds = server
            .mock("GET", "/funds")
            .match_header("x-sessiontoken", "fresh")
            .with_status(200)
            .with_body(r#"{"Status":200,"Success":{}}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/logout")
            .with_status(200)
            .create_async()
            .await;

        let client = TradingApiClient::new(&config(&server.url(), true)).unwrap();
        assert!(!client.is_authenticated().await);

        client.generate_session("user1", "pw").await.unwrap();
        assert!(client.is_authenticated().await);
        assert!(client.get_account_balance().await.is_ok());

        assert!(client.logout().await);
        assert!(!client.is_authenticated().await);
        assert!(client.get_account_balance().await.unwrap_err().is_no_session());
        funds.assert_async().await;
    }
}
