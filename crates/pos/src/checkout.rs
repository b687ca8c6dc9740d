//! Checkout orchestration: materialise a pending customer, then submit the
//! order, against a store that offers no transaction spanning both calls.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use tillpoint_core::{CustomerId, Money};
use tillpoint_parties::{Customer, PhoneNumber};
use tillpoint_sales::{Cart, OrderConfirmation};

use crate::gateway::{GatewayError, StoreGateway};
use crate::notification::Notification;
use crate::session::CustomerSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutErrorKind {
    Validation,
    Authentication,
    Remote,
    PartialCompletion,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("the cart is empty")]
    EmptyCart,
    #[error("no customer selected")]
    NoCustomer,
    #[error("customer has neither an id nor a pending flag")]
    InvalidCustomer,
    #[error("invalid phone number: {0}")]
    MalformedPhone(String),
    #[error("authentication required")]
    Unauthenticated,
    #[error("failed to create customer: {0}")]
    CustomerCreation(#[source] GatewayError),
    #[error("failed to create order: {0}")]
    OrderSubmission(#[source] GatewayError),
    /// The customer was created remotely but the order was not. Nothing is
    /// rolled back.
    #[error("customer {customer_id} was created but the order failed: {source}")]
    PartiallyCompleted {
        customer: Customer,
        customer_id: CustomerId,
        #[source]
        source: GatewayError,
    },
}

impl CheckoutError {
    pub fn kind(&self) -> CheckoutErrorKind {
        match self {
            Self::EmptyCart | Self::NoCustomer | Self::InvalidCustomer | Self::MalformedPhone(_) => {
                CheckoutErrorKind::Validation
            }
            Self::Unauthenticated => CheckoutErrorKind::Authentication,
            Self::CustomerCreation(_) | Self::OrderSubmission(_) => CheckoutErrorKind::Remote,
            Self::PartiallyCompleted { .. } => CheckoutErrorKind::PartialCompletion,
        }
    }

    /// Operator-facing rendering of the failure.
    pub fn notification(&self) -> Notification {
        match self {
            Self::PartiallyCompleted {
                customer,
                customer_id,
                source,
            } => Notification::error(
                "Order failed",
                format!(
                    "Customer {} now exists (id {customer_id}) but the order was not placed: {source}. \
                     Checking out again will reuse this customer.",
                    customer.name
                ),
            ),
            other => {
                let title = match other.kind() {
                    CheckoutErrorKind::Validation => "Cannot check out",
                    CheckoutErrorKind::Authentication => "Sign-in required",
                    _ => "Checkout failed",
                };
                Notification::error(title, other.to_string())
            }
        }
    }
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub attempt_id: Uuid,
    pub order: OrderConfirmation,
    pub customer: Customer,
    /// Whether the customer was created during this attempt.
    pub created_customer: bool,
    pub total: Money,
    pub item_count: u64,
    pub completed_at: DateTime<Utc>,
}

impl CheckoutReceipt {
    pub fn notification(&self) -> Notification {
        let order = self
            .order
            .order_id()
            .map(|id| format!("Order {id}"))
            .unwrap_or_else(|| "Order".to_string());
        Notification::success(
            "Order placed",
            format!(
                "{order} for {} completed. Total charged: {}",
                self.customer.name, self.total
            ),
        )
    }
}

/// Run one checkout attempt.
///
/// On success the cart and the customer slot are cleared. On failure they are
/// left as they were, except that a customer created before the order failed
/// replaces the pending one in `slot`.
pub async fn checkout<G>(
    gateway: &G,
    cart: &mut Cart,
    slot: &mut CustomerSlot,
) -> Result<CheckoutReceipt, CheckoutError>
where
    G: StoreGateway + ?Sized,
{
    let attempt_id = Uuid::now_v7();
    let span = tracing::info_span!("checkout", %attempt_id);
    run(gateway, cart, slot, attempt_id).instrument(span).await
}

async fn run<G>(
    gateway: &G,
    cart: &mut Cart,
    slot: &mut CustomerSlot,
    attempt_id: Uuid,
) -> Result<CheckoutReceipt, CheckoutError>
where
    G: StoreGateway + ?Sized,
{
    let customer = check_preconditions(gateway, cart, slot)?;

    let (customer, created_customer) = if customer.pending {
        let created = gateway
            .create_customer(&customer.to_new_customer())
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "customer creation failed");
                CheckoutError::CustomerCreation(err)
            })?;
        if created.resolved_id().is_none() {
            return Err(CheckoutError::CustomerCreation(GatewayError::Decode(
                "created customer has no id".to_string(),
            )));
        }
        tracing::info!(customer_id = ?created.id, "customer created");
        slot.replace(created.clone());
        (created, true)
    } else {
        (customer, false)
    };

    let Some(customer_id) = customer.resolved_id().cloned() else {
        return Err(CheckoutError::InvalidCustomer);
    };

    let request = cart.to_order_request(customer_id.clone());
    let total = cart.total();
    let item_count = cart.item_count();

    let order = match gateway.create_order(&request).await {
        Ok(order) => order,
        Err(err) if created_customer => {
            tracing::warn!(error = %err, %customer_id, "order failed after customer creation");
            return Err(CheckoutError::PartiallyCompleted {
                customer,
                customer_id,
                source: err,
            });
        }
        Err(err) => {
            tracing::warn!(error = %err, "order submission failed");
            return Err(CheckoutError::OrderSubmission(err));
        }
    };

    cart.clear();
    slot.clear();
    tracing::info!(order_id = ?order.order_id(), %total, item_count, "checkout completed");

    Ok(CheckoutReceipt {
        attempt_id,
        order,
        customer,
        created_customer,
        total,
        item_count,
        completed_at: Utc::now(),
    })
}

fn check_preconditions<G>(gateway: &G, cart: &Cart, slot: &CustomerSlot) -> Result<Customer, CheckoutError>
where
    G: StoreGateway + ?Sized,
{
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let customer = slot.get().ok_or(CheckoutError::NoCustomer)?;
    if !customer.is_resolvable() {
        return Err(CheckoutError::InvalidCustomer);
    }
    if customer.pending && !PhoneNumber::is_valid(&customer.phone) {
        return Err(CheckoutError::MalformedPhone(customer.phone.clone()));
    }
    if !gateway.is_authenticated() {
        return Err(CheckoutError::Unauthenticated);
    }
    Ok(customer.clone())
}
