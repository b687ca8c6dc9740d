use serde::{Deserialize, Serialize};

use tillpoint_core::CustomerId;

use crate::phone::PhoneNumber;

/// Customer associated with a till session.
///
/// - resolved: `id` set, `pending == false` (selected or created remotely)
/// - pending: no `id`, `pending == true` (only exists on this terminal)
///
/// Any other combination is a defect state that checkout refuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: Option<CustomerId>,
    pub name: String,
    pub phone: String,
    pub pending: bool,
}

impl Customer {
    pub fn resolved(id: CustomerId, name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            phone: phone.into(),
            pending: false,
        }
    }

    pub fn pending(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            phone: phone.into(),
            pending: true,
        }
    }

    /// Id of a resolved customer.
    pub fn resolved_id(&self) -> Option<&CustomerId> {
        if self.pending { None } else { self.id.as_ref() }
    }

    /// Whether checkout can do anything with this customer.
    pub fn is_resolvable(&self) -> bool {
        self.pending || self.id.is_some()
    }

    /// Payload to materialise a pending customer remotely.
    pub fn to_new_customer(&self) -> NewCustomer {
        NewCustomer {
            name: self.name.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Customer as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub name: String,
    pub phone: String,
}

impl From<CustomerRecord> for Customer {
    fn from(record: CustomerRecord) -> Self {
        Customer::resolved(record.id, record.name, record.phone)
    }
}

/// Payload for the customer-creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
}

/// Derive the pending checkout candidate from the operator's drafts.
///
/// Returns a pending customer as soon as the name is non-blank and the phone
/// is a valid mobile number; no explicit "create" action is involved. The
/// name is trimmed and the phone normalised.
pub fn derive_candidate(name_draft: &str, phone_draft: &str) -> Option<Customer> {
    let name = name_draft.trim();
    if name.is_empty() || phone_draft.trim().is_empty() {
        return None;
    }
    let phone = PhoneNumber::parse(phone_draft).ok()?;
    Some(Customer::pending(name, phone.as_str()))
}
