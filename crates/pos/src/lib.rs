//! `tillpoint-pos`
//!
//! **Responsibility:** Till-side order composition against the remote store.
//!
//! This crate provides:
//! - The store gateway contract and its HTTP client
//! - Debounced customer suggestions with a staleness guard
//! - Checkout orchestration (customer creation, then order submission)
//! - The session context tying cart, customer and resolver together
//!
//! The store remains the authority; nothing here is persisted locally.

pub mod auth;
pub mod checkout;
pub mod config;
pub mod gateway;
pub mod notification;
pub mod resolver;
pub mod session;

pub use auth::{BearerToken, LoginRequest};
pub use checkout::{CheckoutError, CheckoutErrorKind, CheckoutReceipt};
pub use config::{ConfigError, PosConfig};
pub use gateway::{GatewayError, HttpGateway, StoreGateway};
pub use notification::{Notification, NotificationLevel};
pub use resolver::{CustomerResolver, LookupOutcome, LookupPhase};
pub use session::{CustomerSlot, PosSession};
