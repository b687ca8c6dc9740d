//! `tillpoint-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the cart, the
//! customer model and the terminal engine (no IO, no HTTP).

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CustomerId, ProductId};
pub use money::Money;
pub use value_object::ValueObject;
