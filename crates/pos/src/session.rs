//! The till session: one cart, one customer, the customer resolver and the
//! suggestion lookups currently on the wire.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use tokio::time::Instant;

use tillpoint_core::ProductId;
use tillpoint_parties::{Customer, derive_candidate};
use tillpoint_products::CatalogProduct;
use tillpoint_sales::Cart;

use crate::checkout::{self, CheckoutError, CheckoutReceipt};
use crate::config::PosConfig;
use crate::gateway::StoreGateway;
use crate::notification::Notification;
use crate::resolver::{CustomerResolver, LookupOutcome, LookupResponse};

/// Holder of the session customer.
///
/// Every [`CustomerSlot::clear`] is counted so the session can tell that the
/// customer went away through a clear, whoever performed it.
#[derive(Debug, Clone, Default)]
pub struct CustomerSlot {
    current: Option<Customer>,
    clears: u64,
}

impl CustomerSlot {
    pub fn get(&self) -> Option<&Customer> {
        self.current.as_ref()
    }

    /// Set the customer, replacing any previous one wholesale.
    pub fn replace(&mut self, customer: Customer) -> Option<Customer> {
        self.current.replace(customer)
    }

    pub fn clear(&mut self) -> Option<Customer> {
        self.clears += 1;
        self.current.take()
    }

    pub fn clears(&self) -> u64 {
        self.clears
    }

    /// Drop the customer if it is a pending candidate. Not counted as a clear.
    pub(crate) fn withdraw_pending(&mut self) -> bool {
        if self.current.as_ref().is_some_and(|c| c.pending) {
            self.current = None;
            true
        } else {
            false
        }
    }
}

enum Woke {
    Response(LookupResponse),
    Deadline,
    Idle,
}

pub struct PosSession {
    gateway: Arc<dyn StoreGateway>,
    cart: Cart,
    customer: CustomerSlot,
    resolver: CustomerResolver,
    lookups: FuturesUnordered<BoxFuture<'static, LookupResponse>>,
    notifications: Vec<Notification>,
    seen_clears: u64,
}

impl PosSession {
    pub fn new(gateway: Arc<dyn StoreGateway>, quiet_window: Duration) -> Self {
        Self {
            gateway,
            cart: Cart::new(),
            customer: CustomerSlot::default(),
            resolver: CustomerResolver::new(quiet_window),
            lookups: FuturesUnordered::new(),
            notifications: Vec::new(),
            seen_clears: 0,
        }
    }

    pub fn from_config(gateway: Arc<dyn StoreGateway>, config: &PosConfig) -> Self {
        Self::new(gateway, config.suggest_debounce)
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.get()
    }

    pub fn resolver(&self) -> &CustomerResolver {
        &self.resolver
    }

    pub fn suggestions(&self) -> &[Customer] {
        self.resolver.suggestions()
    }

    pub fn lookups_in_flight(&self) -> usize {
        self.lookups.len()
    }

    pub fn add_product(&mut self, product: &CatalogProduct) {
        self.cart.add_item(product);
    }

    pub fn remove_item(&mut self, id: &ProductId) {
        self.cart.remove_item(id);
    }

    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) {
        self.cart.set_quantity(id, quantity);
    }

    pub fn adjust_quantity(&mut self, id: &ProductId, delta: i64) {
        self.cart.adjust_quantity(id, delta);
    }

    /// Start over: empty cart and no customer.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.customer.clear();
        self.settle();
    }

    /// Explicitly drop the customer. The cart goes with it.
    pub fn clear_customer(&mut self) {
        self.clear_cart();
    }

    /// Associate `customer` with the session, replacing the current one.
    pub fn set_customer(&mut self, customer: Customer) {
        self.customer.replace(customer);
    }

    pub fn update_name_draft(&mut self, text: &str) {
        self.resolver.update_name_draft(text, Instant::now());
        self.sync_candidate();
    }

    pub fn update_phone_draft(&mut self, text: &str) {
        self.resolver.update_phone_draft(text);
        self.sync_candidate();
    }

    pub fn select_suggestion(&mut self, customer: Customer) {
        self.resolver.select_suggestion(&customer);
        tracing::debug!(customer_id = ?customer.id, "suggestion selected");
        self.customer.replace(customer);
    }

    /// Run a checkout attempt and report its outcome as a notification.
    pub async fn checkout(&mut self) -> Result<CheckoutReceipt, CheckoutError> {
        let result = checkout::checkout(self.gateway.as_ref(), &mut self.cart, &mut self.customer).await;
        self.settle();
        let notification = match &result {
            Ok(receipt) => receipt.notification(),
            Err(err) => err.notification(),
        };
        self.notifications.push(notification);
        result
    }

    /// When the pending debounce timer fires.
    pub fn next_lookup_deadline(&self) -> Option<Instant> {
        self.resolver.next_deadline()
    }

    /// Send every lookup whose quiet window has elapsed; returns how many.
    pub fn dispatch_due_lookups(&mut self) -> usize {
        let mut dispatched = 0;
        while let Some(request) = self.resolver.poll_due(Instant::now()) {
            let gateway = Arc::clone(&self.gateway);
            self.lookups.push(
                async move {
                    let result = gateway.suggest_customers(&request.query).await;
                    LookupResponse {
                        token: request.token,
                        query: request.query,
                        result,
                    }
                }
                .boxed(),
            );
            dispatched += 1;
        }
        dispatched
    }

    /// Wait for the next debounce deadline or lookup response and handle it.
    ///
    /// Returns `false` when there is nothing to wait for. Cancel-safe: dropping
    /// the future loses no response.
    pub async fn pump(&mut self) -> bool {
        self.dispatch_due_lookups();
        let deadline = self.resolver.next_deadline();
        if deadline.is_none() && self.lookups.is_empty() {
            return false;
        }

        let woke = tokio::select! {
            Some(response) = self.lookups.next(), if !self.lookups.is_empty() => Woke::Response(response),
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => Woke::Deadline,
            else => Woke::Idle,
        };

        match woke {
            Woke::Response(response) => self.apply_lookup(response),
            Woke::Deadline => {
                self.dispatch_due_lookups();
            }
            Woke::Idle => return false,
        }
        true
    }

    /// Pump until no timer is pending and no lookup is in flight.
    pub async fn run_until_idle(&mut self) {
        while self.pump().await {}
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn apply_lookup(&mut self, response: LookupResponse) {
        let query = response.query.clone();
        match self.resolver.complete(response) {
            LookupOutcome::Applied { count } => {
                tracing::debug!(%query, count, "suggestions updated");
            }
            LookupOutcome::Failed(err) => {
                tracing::warn!(%query, error = %err, "customer lookup failed");
                self.notifications
                    .push(Notification::error("Customer lookup failed", err.to_string()));
            }
            LookupOutcome::Discarded => {}
        }
    }

    /// Make the drafts' candidate the session customer, or withdraw the
    /// pending one once the drafts stop forming a candidate.
    fn sync_candidate(&mut self) {
        match derive_candidate(self.resolver.name_draft(), self.resolver.phone_draft()) {
            Some(candidate) => {
                let unchanged = self.customer.get().is_some_and(|current| {
                    current.name == candidate.name && current.phone == candidate.phone
                });
                if !unchanged {
                    tracing::debug!(name = %candidate.name, "pending customer derived");
                    self.customer.replace(candidate);
                }
            }
            None => {
                if self.customer.withdraw_pending() {
                    tracing::debug!("pending customer withdrawn");
                }
            }
        }
    }

    /// Reset the resolver whenever the customer was cleared since last time.
    fn settle(&mut self) {
        let clears = self.customer.clears();
        if clears != self.seen_clears {
            self.seen_clears = clears;
            self.resolver.reset();
            self.lookups = FuturesUnordered::new();
            tracing::debug!("customer cleared, resolver reset");
        }
    }
}
