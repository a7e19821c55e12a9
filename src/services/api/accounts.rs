use super::http::{ApiClientConfig, ApiError, AuthContext, HttpClient};
use crate::banking::Account;
use std::sync::Arc;

/// Read access to the `accounts` table of the account store (PostgREST
/// dialect: filters travel as `column=op.value` query pairs).
#[derive(Clone)]
pub struct AccountsClient {
    http: Arc<HttpClient>,
    auth: Option<AuthContext>,
}

impl AccountsClient {
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            http: Arc::new(HttpClient::new(config)?),
            auth: None,
        })
    }

    pub fn with_auth(mut self, auth: AuthContext) -> Self {
        self.auth = Some(auth);
        self
    }

    pub async fn list_accounts(&self, customer_id: i64) -> Result<Vec<Account>, ApiError> {
        let query = [
            ("select", "*".to_string()),
            ("customer_id", format!("eq.{customer_id}")),
        ];
        let response = self
            .http
            .get_json::<Vec<Account>>("accounts", &query, self.auth.as_ref())
            .await?;
        tracing::info!(
            customer_id,
            status = %response.status,
            accounts = response.data.len(),
            "fetched customer accounts"
        );
        Ok(response.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use tokio;

    #[tokio::test]
    async fn lists_accounts_for_customer() {
        let server = MockServer::start();
        let _mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/accounts")
                .query_param("select", "*")
                .query_param("customer_id", "eq.7");
            then.status(200).json_body(json!([
                { "id": 1, "customer_id": 7, "currency": "درهم اماراتي", "balance": 1000 },
                { "id": 2, "customer_id": 7, "currency": "دولار أمريكي", "balance": 100.5 }
            ]));
        });

        let config = ApiClientConfig::try_from_url(&server.url("/rest/v1")).unwrap();
        let client = AccountsClient::new(config).unwrap();
        let accounts = client.list_accounts(7).await.unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].balance, dec!(1000));
        assert_eq!(accounts[1].currency.as_deref(), Some("دولار أمريكي"));
    }

    #[tokio::test]
    async fn keeps_rows_with_missing_currency() {
        let server = MockServer::start();
        let _mock = server.mock(|when, then| {
            when.method(GET).path("/accounts");
            then.status(200).json_body(json!([
                { "id": 1, "customer_id": 4, "currency": "AED", "balance": 1000 },
                { "id": 2, "customer_id": 4, "currency": null, "balance": 5 }
            ]));
        });

        let config = ApiClientConfig::try_from_url(&server.url("/")).unwrap();
        let client = AccountsClient::new(config).unwrap();
        let accounts = client.list_accounts(4).await.unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[1].currency, None);
        assert_eq!(accounts[1].balance, dec!(5));
    }

    #[tokio::test]
    async fn sends_api_key_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/accounts")
                .header("apikey", "anon-key")
                .header("authorization", "Bearer anon-key");
            then.status(200).json_body(json!([]));
        });

        let config = ApiClientConfig::try_from_url(&server.url("/")).unwrap();
        let client = AccountsClient::new(config)
            .unwrap()
            .with_auth(AuthContext::api_key("anon-key"));
        let accounts = client.list_accounts(3).await.unwrap();

        mock.assert();
        assert!(accounts.is_empty());
    }

    #[tokio::test]
    async fn surfaces_http_errors() {
        let server = MockServer::start();
        let _mock = server.mock(|when, then| {
            when.method(GET).path("/accounts");
            then.status(503).body("store unavailable");
        });

        let config = ApiClientConfig::try_from_url(&server.url("/")).unwrap();
        let client = AccountsClient::new(config).unwrap();
        let err = client.list_accounts(1).await.unwrap_err();

        match err {
            ApiError::HttpStatus { status, body } => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "store unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn rejects_malformed_rows() {
        let server = MockServer::start();
        let _mock = server.mock(|when, then| {
            when.method(GET).path("/accounts");
            then.status(200).json_body(json!({ "message": "not a list" }));
        });

        let config = ApiClientConfig::try_from_url(&server.url("/")).unwrap();
        let client = AccountsClient::new(config).unwrap();
        let err = client.list_accounts(1).await.unwrap_err();
        assert!(matches!(err, ApiError::Deserialize { .. }));
    }
}
