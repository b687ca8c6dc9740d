//! Catalog read model.
//!
//! The catalog is owned by the remote store; the terminal only lists products,
//! filters them for the operator and hands them to the cart.

pub mod product;

pub use product::{CatalogProduct, CatalogProductRecord, filter_by_name, parse_price};
