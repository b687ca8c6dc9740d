//! Remote store gateway: the contract the till engine drives, and its HTTP
//! implementation.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use tillpoint_parties::{Customer, NewCustomer};
use tillpoint_products::CatalogProduct;
use tillpoint_sales::{OrderConfirmation, OrderRequest};

pub mod http;

#[cfg(test)]
pub(crate) mod scripted;

pub use http::HttpGateway;

/// Failure of a remote store call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// No bearer token is configured; raised before any network attempt.
    #[error("authentication required")]
    Unauthenticated,
    /// The login endpoint rejected the credentials.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Remote catalog/order store as consumed by the till.
///
/// Implementations must check for a credential before touching the network
/// and report its absence as [`GatewayError::Unauthenticated`].
#[async_trait]
pub trait StoreGateway: Send + Sync {
    /// Whether a bearer credential is available for the next call.
    fn is_authenticated(&self) -> bool;

    /// `GET /customers/suggest?q=<query>`
    async fn suggest_customers(&self, query: &str) -> Result<Vec<Customer>, GatewayError>;

    /// `POST /customers`; returns the persisted (non-pending) customer.
    async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer, GatewayError>;

    /// `POST /orders`
    async fn create_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, GatewayError>;

    /// `GET /products?page=<page>&limit=<limit>`
    async fn list_products(&self, page: u32, limit: u32) -> Result<Vec<CatalogProduct>, GatewayError>;
}

#[async_trait]
impl<G> StoreGateway for Arc<G>
where
    G: StoreGateway + ?Sized,
{
    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }

    async fn suggest_customers(&self, query: &str) -> Result<Vec<Customer>, GatewayError> {
        (**self).suggest_customers(query).await
    }

    async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer, GatewayError> {
        (**self).create_customer(customer).await
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, GatewayError> {
        (**self).create_order(order).await
    }

    async fn list_products(&self, page: u32, limit: u32) -> Result<Vec<CatalogProduct>, GatewayError> {
        (**self).list_products(page, limit).await
    }
}
