use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use tillpoint_core::{DomainError, DomainResult, Money, ProductId};

/// Product as listed by the remote catalog endpoint.
///
/// Prices travel as decimal strings in major units (e.g. `"29.99"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProductRecord {
    pub id: String,
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Sellable catalog product with a typed price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub image: Option<String>,
}

impl CatalogProduct {
    pub fn new(id: ProductId, name: impl Into<String>, unit_price: Money) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
            image: None,
        }
    }

    /// Case-insensitive name match used by the catalog search box.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty() || self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

impl TryFrom<CatalogProductRecord> for CatalogProduct {
    type Error = DomainError;

    fn try_from(record: CatalogProductRecord) -> Result<Self, Self::Error> {
        let id = record.id.parse::<ProductId>()?;
        let unit_price = parse_price(&record.price)?;
        Ok(Self {
            id,
            name: record.name,
            unit_price,
            image: record.image.filter(|s| !s.trim().is_empty()),
        })
    }
}

/// Parse a decimal price in major units into pesewas.
///
/// Sub-pesewa digits are rounded half away from zero.
pub fn parse_price(raw: &str) -> DomainResult<Money> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|e| DomainError::invalid_amount(format!("{raw:?}: {e}")))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::invalid_amount(format!("{raw:?}: negative price")));
    }

    let minor = (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or_else(|| DomainError::invalid_amount(format!("{raw:?}: out of range")))?;

    Ok(Money::from_minor(minor))
}

/// Keep the products whose name contains `query` (case-insensitive).
///
/// An empty or blank query keeps everything.
pub fn filter_by_name<'a>(products: &'a [CatalogProduct], query: &str) -> Vec<&'a CatalogProduct> {
    products.iter().filter(|p| p.matches(query)).collect()
}
