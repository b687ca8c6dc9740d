use tillpoint_core::{CustomerId, Entity, Money, ProductId};
use tillpoint_products::CatalogProduct;

use crate::order::{OrderItem, OrderRequest};

/// Cart line: one product, its unit price at the time it was added, and a
/// quantity that is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

impl Entity for CartLine {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Aggregate: the running cart of the current session.
///
/// Invariant: `total() == recomputed_total()` after every transition. The
/// mutators only ever apply deltas to the running total; the full
/// recomputation exists so callers and tests can check the invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
    total: Money,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.id == id)
    }

    /// Quantity of `id` in the cart, 0 when absent.
    pub fn quantity_of(&self, id: &ProductId) -> u32 {
        self.line(id).map(|l| l.quantity).unwrap_or(0)
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Full recomputation of `Σ unit_price * quantity`.
    pub fn recomputed_total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Add one unit of `product`, merging into an existing line.
    pub fn add_item(&mut self, product: &CatalogProduct) {
        match self.lines.iter_mut().find(|l| l.id == product.id) {
            Some(line) => {
                // A line already at the quantity ceiling stays as it is.
                let Some(quantity) = line.quantity.checked_add(1) else {
                    tracing::debug!(product_id = %line.id, "cart line at maximum quantity");
                    return;
                };
                line.quantity = quantity;
                self.total = self.total.saturating_add(line.unit_price);
                tracing::debug!(product_id = %line.id, quantity, "cart line incremented");
            }
            None => {
                self.lines.push(CartLine {
                    id: product.id.clone(),
                    name: product.name.clone(),
                    unit_price: product.unit_price,
                    quantity: 1,
                });
                self.total = self.total.saturating_add(product.unit_price);
                tracing::debug!(product_id = %product.id, "cart line added");
            }
        }
    }

    /// Remove the line for `id`. Absent ids are ignored.
    pub fn remove_item(&mut self, id: &ProductId) {
        let Some(idx) = self.lines.iter().position(|l| &l.id == id) else {
            return;
        };
        let line = self.lines.remove(idx);
        self.total = self.total.saturating_sub(line.subtotal());
        tracing::debug!(product_id = %id, "cart line removed");
    }

    /// Replace the quantity of `id`; `quantity < 1` removes the line and
    /// quantities above `u32::MAX` are clamped to it.
    ///
    /// Absent ids are ignored: a quantity can only be set on a line created by
    /// [`Cart::add_item`].
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) {
        if quantity < 1 {
            self.remove_item(id);
            return;
        }
        let new_quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        let Some(line) = self.lines.iter_mut().find(|l| &l.id == id) else {
            return;
        };
        let old_quantity = line.quantity;
        if new_quantity >= old_quantity {
            let delta = line.unit_price.times(new_quantity - old_quantity);
            self.total = self.total.saturating_add(delta);
        } else {
            let delta = line.unit_price.times(old_quantity - new_quantity);
            self.total = self.total.saturating_sub(delta);
        }
        line.quantity = new_quantity;
        tracing::debug!(product_id = %id, old_quantity, new_quantity, "cart quantity set");
    }

    /// Change the quantity of `id` by `delta` (the +/- buttons of a line).
    pub fn adjust_quantity(&mut self, id: &ProductId, delta: i64) {
        let Some(current) = self.line(id).map(|l| i64::from(l.quantity)) else {
            return;
        };
        self.set_quantity(id, current.saturating_add(delta));
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.total = Money::ZERO;
        tracing::debug!("cart cleared");
    }

    /// Build the order payload for `customer_id` from the current lines.
    pub fn to_order_request(&self, customer_id: CustomerId) -> OrderRequest {
        OrderRequest {
            customer_id,
            items: self
                .lines
                .iter()
                .map(|l| OrderItem {
                    product_id: l.id.clone(),
                    quantity: l.quantity,
                })
                .collect(),
        }
    }
}
