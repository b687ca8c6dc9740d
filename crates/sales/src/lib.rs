//! Sales domain for the till: the running cart and the order payload derived
//! from it.
//!
//! Everything here is deterministic, in-memory logic (no IO, no HTTP).

pub mod cart;
pub mod order;

pub use cart::{Cart, CartLine};
pub use order::{OrderConfirmation, OrderItem, OrderRequest};
