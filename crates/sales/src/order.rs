use serde::{Deserialize, Serialize};
use serde_json::Value;

use tillpoint_core::{CustomerId, ProductId};

/// Order line as submitted to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Write payload for the order endpoint.
///
/// Built fresh from the cart for every checkout attempt and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer_id: CustomerId,
    pub items: Vec<OrderItem>,
}

/// Order confirmation returned by the remote store.
///
/// The shape is owned by the store; only the `id` field is read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderConfirmation(pub Value);

impl OrderConfirmation {
    /// Order id, when the store returned one as a string or number.
    pub fn order_id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
