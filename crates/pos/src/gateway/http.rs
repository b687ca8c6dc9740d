//! `reqwest` implementation of [`StoreGateway`].

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use tillpoint_parties::{Customer, CustomerRecord, NewCustomer};
use tillpoint_products::{CatalogProduct, CatalogProductRecord};
use tillpoint_sales::{OrderConfirmation, OrderRequest};

use super::{GatewayError, StoreGateway};
use crate::auth::{BearerToken, LoginRequest, LoginResponse};
use crate::config::PosConfig;

/// HTTP client for the remote store.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    api_url: String,
    token: Option<BearerToken>,
}

impl HttpGateway {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(api_url: impl Into<String>, token: BearerToken) -> Self {
        let mut gateway = Self::new(api_url);
        gateway.token = Some(token);
        gateway
    }

    pub fn from_config(config: &PosConfig) -> Self {
        let mut gateway = Self::new(config.api_url.clone());
        gateway.token = config.auth_token.clone();
        gateway
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn set_token(&mut self, token: BearerToken) {
        self.token = Some(token);
    }

    /// Exchange salesperson credentials for a bearer token.
    ///
    /// This is the only call that does not require a token.
    #[tracing::instrument(level = "debug", skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginRequest) -> Result<BearerToken, GatewayError> {
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .json(credentials)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if matches!(
            resp.status(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(GatewayError::InvalidCredentials);
        }

        let body: LoginResponse = Self::read_json(resp).await?;
        BearerToken::new(body.access_token)
            .ok_or_else(|| GatewayError::Decode("login returned an empty access_token".to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Attach the bearer token, failing before any network attempt without one.
    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, GatewayError> {
        let token = self.token.as_ref().ok_or(GatewayError::Unauthenticated)?;
        Ok(req.bearer_auth(token.as_str()))
    }

    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, GatewayError> {
        let req = self.authorized(req)?;
        let resp = req
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Self::read_json(resp).await
    }

    async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, GatewayError> {
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        resp.json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

/// Map a non-2xx response, preferring the JSON body's `message` field.
async fn api_error(resp: Response) -> GatewayError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "An error occurred".to_string()
            } else {
                body
            }
        });
    tracing::warn!(status, %message, "store API returned an error");
    GatewayError::Api { status, message }
}

#[async_trait]
impl StoreGateway for HttpGateway {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn suggest_customers(&self, query: &str) -> Result<Vec<Customer>, GatewayError> {
        let req = self
            .client
            .get(self.url("/customers/suggest"))
            .query(&[("q", query)]);
        let records: Vec<CustomerRecord> = self.execute(req).await?;
        Ok(records.into_iter().map(Customer::from).collect())
    }

    #[tracing::instrument(level = "debug", skip(self, customer), err)]
    async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer, GatewayError> {
        let req = self.client.post(self.url("/customers")).json(customer);
        let record: CustomerRecord = self.execute(req).await?;
        Ok(Customer::from(record))
    }

    #[tracing::instrument(
        level = "debug",
        skip(self, order),
        fields(customer_id = %order.customer_id, items = order.items.len()),
        err
    )]
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, GatewayError> {
        let req = self.client.post(self.url("/orders")).json(order);
        self.execute(req).await
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn list_products(&self, page: u32, limit: u32) -> Result<Vec<CatalogProduct>, GatewayError> {
        let req = self
            .client
            .get(self.url("/products"))
            .query(&[("page", page), ("limit", limit)]);
        let records: Vec<CatalogProductRecord> = self.execute(req).await?;
        records
            .into_iter()
            .map(|r| CatalogProduct::try_from(r).map_err(|e| GatewayError::Decode(e.to_string())))
            .collect()
    }
}
