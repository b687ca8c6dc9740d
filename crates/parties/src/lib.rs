//! Customers as seen by the till.
//!
//! A customer is either resolved (persisted remotely, has an id) or pending
//! (typed in by the operator, not yet created). This crate holds the type, the
//! phone-number rules and the pure derivation of a pending candidate from the
//! operator's drafts.

pub mod customer;
pub mod phone;

pub use customer::{Customer, CustomerRecord, NewCustomer, derive_candidate};
pub use phone::PhoneNumber;
