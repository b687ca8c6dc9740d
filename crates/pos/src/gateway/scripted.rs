//! Scripted in-memory gateway for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use tillpoint_parties::{Customer, NewCustomer};
use tillpoint_products::CatalogProduct;
use tillpoint_sales::{OrderConfirmation, OrderRequest};

use super::{GatewayError, StoreGateway};

/// A call observed by [`ScriptedGateway`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GatewayCall {
    Suggest(String),
    CreateCustomer(NewCustomer),
    CreateOrder(OrderRequest),
    ListProducts { page: u32, limit: u32 },
}

/// Gateway whose answers are queued up front.
///
/// Unscripted writes fail with an API error so a missing script shows up as a
/// test failure rather than a hang.
pub(crate) struct ScriptedGateway {
    authenticated: bool,
    calls: Mutex<Vec<GatewayCall>>,
    suggestions: Mutex<HashMap<String, Result<Vec<Customer>, GatewayError>>>,
    suggest_delays: Mutex<HashMap<String, Duration>>,
    customers: Mutex<VecDeque<Result<Customer, GatewayError>>>,
    orders: Mutex<VecDeque<Result<OrderConfirmation, GatewayError>>>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self {
            authenticated: true,
            calls: Mutex::new(Vec::new()),
            suggestions: Mutex::new(HashMap::new()),
            suggest_delays: Mutex::new(HashMap::new()),
            customers: Mutex::new(VecDeque::new()),
            orders: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            ..Self::new()
        }
    }

    pub(crate) fn suggest(self, query: &str, result: Result<Vec<Customer>, GatewayError>) -> Self {
        self.suggestions
            .lock()
            .unwrap()
            .insert(query.to_string(), result);
        self
    }

    /// Delay the answer to `query` (tokio time, so paused clocks apply).
    pub(crate) fn suggest_after(self, query: &str, delay: Duration) -> Self {
        self.suggest_delays
            .lock()
            .unwrap()
            .insert(query.to_string(), delay);
        self
    }

    pub(crate) fn create_customer_returns(self, result: Result<Customer, GatewayError>) -> Self {
        self.customers.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn create_order_returns(self, result: Result<OrderConfirmation, GatewayError>) -> Self {
        self.orders.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn unscripted<T>(what: &str) -> Result<T, GatewayError> {
        Err(GatewayError::Api {
            status: 599,
            message: format!("unscripted {what}"),
        })
    }
}

#[async_trait]
impl StoreGateway for ScriptedGateway {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    async fn suggest_customers(&self, query: &str) -> Result<Vec<Customer>, GatewayError> {
        self.record(GatewayCall::Suggest(query.to_string()));
        let delay = self.suggest_delays.lock().unwrap().get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.suggestions
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer, GatewayError> {
        self.record(GatewayCall::CreateCustomer(customer.clone()));
        self.customers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Self::unscripted("create_customer"))
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, GatewayError> {
        self.record(GatewayCall::CreateOrder(order.clone()));
        self.orders
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Self::unscripted("create_order"))
    }

    async fn list_products(&self, page: u32, limit: u32) -> Result<Vec<CatalogProduct>, GatewayError> {
        self.record(GatewayCall::ListProducts { page, limit });
        Ok(Vec::new())
    }
}
