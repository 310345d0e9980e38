//! Order composer state.
//!
//! The form behind "new order" is one immutable [`OrderDraft`]; every edit
//! goes through [`OrderDraft::apply`], which returns the next snapshot with
//! line totals and the order total already recomputed.

use crate::allocator::{id_pool, Allocator, IdRange};
use crate::domain::{Amount, LineItem, Order, OrderStatus};
use crate::error::OrderError;
use crate::totals::{line_total, order_total};

/// Form-local handle for a draft line, stable across edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftKey(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct DraftItem {
    pub key: DraftKey,
    pub id: String,
    pub product_id: String,
    pub name: String,
    /// `None` while the field is blank.
    pub unit_price: Option<Amount>,
    pub quantity: Option<Amount>,
    pub total: Amount,
    pub image: Option<String>,
}

impl DraftItem {
    fn recompute(&mut self) {
        self.total = line_total(
            self.unit_price.unwrap_or(Amount::ZERO),
            self.quantity.unwrap_or(Amount::ZERO),
        );
    }

    fn to_line_item(&self) -> LineItem {
        LineItem {
            id: self.id.clone(),
            product_id: self.product_id.clone(),
            name: self.name.trim().to_string(),
            unit_price: self.unit_price.unwrap_or(Amount::ZERO),
            quantity: self.quantity.unwrap_or(Amount::ZERO),
            total: self.total,
            image: self.image.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DraftEdit {
    SelectUser(Option<String>),
    SetStatus(OrderStatus),
    AddItem,
    RemoveItem(DraftKey),
    Rename(DraftKey, String),
    /// Raw form input; see [`Amount::parse_lenient`].
    SetUnitPrice(DraftKey, String),
    SetQuantity(DraftKey, String),
    SetImage(DraftKey, Option<String>),
    #[cfg_attr(not(test), allow(dead_code))]
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderDraft {
    user_id: Option<String>,
    status: OrderStatus,
    items: Vec<DraftItem>,
    total_price: Amount,
    next_key: u64,
}

/// A draft that passed the required-field checks.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSubmission {
    pub user_id: String,
    pub status: OrderStatus,
    pub items: Vec<LineItem>,
    pub total_price: Amount,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self {
            total_price: Amount::ZERO.round_cents(),
            ..Self::default()
        }
    }

    /// Loads an existing order for editing. Stored line totals are kept as they are.
    pub fn from_order(order: &Order) -> Self {
        let items: Vec<DraftItem> = order
            .items
            .iter()
            .zip(0u64..)
            .map(|(item, key)| DraftItem {
                key: DraftKey(key),
                id: item.id.clone(),
                product_id: item.product_id.clone(),
                name: item.name.clone(),
                unit_price: Some(item.unit_price),
                quantity: Some(item.quantity),
                total: item.total,
                image: item.image.clone(),
            })
            .collect();

        let mut draft = Self {
            user_id: Some(order.user_id.clone()),
            status: order.status,
            next_key: items.len() as u64,
            items,
            total_price: Amount::ZERO,
        };
        draft.total_price = draft.compute_total();
        draft
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items(&self) -> &[DraftItem] {
        &self.items
    }

    pub fn total_price(&self) -> Amount {
        self.total_price
    }

    /// Key of the most recently added line.
    pub fn last_key(&self) -> Option<DraftKey> {
        self.items.last().map(|item| item.key)
    }

    /// Produces the next snapshot. Edits aimed at an unknown key change nothing.
    pub fn apply(&self, edit: DraftEdit, allocator: &Allocator) -> Self {
        let mut next = self.clone();
        match edit {
            DraftEdit::SelectUser(user_id) => {
                next.user_id = user_id.filter(|id| !id.trim().is_empty());
            }
            DraftEdit::SetStatus(status) => next.status = status,
            DraftEdit::AddItem => {
                let mut taken = next.line_id_pool();
                let id = allocator.allocate(&taken, IdRange::LINE_ITEMS);
                taken.insert(id);
                let product_id = allocator.allocate(&taken, IdRange::LINE_ITEMS);

                let key = DraftKey(next.next_key);
                next.next_key += 1;

                let mut item = DraftItem {
                    key,
                    id: id.to_string(),
                    product_id: product_id.to_string(),
                    name: String::new(),
                    unit_price: Some(Amount::ZERO),
                    quantity: Some(Amount::ONE),
                    total: Amount::ZERO,
                    image: None,
                };
                item.recompute();
                next.items.push(item);
            }
            DraftEdit::RemoveItem(key) => next.items.retain(|item| item.key != key),
            DraftEdit::Rename(key, name) => {
                if let Some(item) = next.item_mut(key) {
                    item.name = name;
                }
            }
            DraftEdit::SetUnitPrice(key, input) => {
                if let Some(item) = next.item_mut(key) {
                    item.unit_price = Amount::parse_lenient(&input);
                    item.recompute();
                }
            }
            DraftEdit::SetQuantity(key, input) => {
                if let Some(item) = next.item_mut(key) {
                    item.quantity = Amount::parse_lenient(&input);
                    item.recompute();
                }
            }
            DraftEdit::SetImage(key, image) => {
                if let Some(item) = next.item_mut(key) {
                    item.image = image.filter(|uri| !uri.is_empty());
                }
            }
            DraftEdit::Reset => return Self::new(),
        }
        next.total_price = next.compute_total();
        next
    }

    /// Checks required fields and freezes the draft for sending.
    ///
    /// # Errors
    /// [`OrderError::ValidationError`] when no user is selected, there are no
    /// items, or an item lacks a name, unit price or quantity.
    pub fn submission(&self) -> Result<OrderSubmission, OrderError> {
        let Some(user_id) = self.user_id.clone() else {
            return Err(OrderError::ValidationError("a user must be selected".into()));
        };
        if self.items.is_empty() {
            return Err(OrderError::ValidationError("at least one item is required".into()));
        }
        for (position, item) in self.items.iter().enumerate() {
            if item.name.trim().is_empty() || item.unit_price.is_none() || item.quantity.is_none() {
                return Err(OrderError::ValidationError(format!(
                    "item {} needs a name, a price and a quantity",
                    position + 1
                )));
            }
        }

        Ok(OrderSubmission {
            user_id,
            status: self.status,
            items: self.items.iter().map(DraftItem::to_line_item).collect(),
            total_price: self.total_price,
        })
    }

    fn item_mut(&mut self, key: DraftKey) -> Option<&mut DraftItem> {
        self.items.iter_mut().find(|item| item.key == key)
    }

    fn line_id_pool(&self) -> std::collections::HashSet<u64> {
        id_pool(
            self.items
                .iter()
                .flat_map(|item| [item.id.as_str(), item.product_id.as_str()]),
        )
    }

    fn compute_total(&self) -> Amount {
        order_total(self.items.iter().map(|item| item.total))
    }
}

/// Renders a human facing order number, e.g. `ORD-2025-0042`.
pub fn order_number(year: i16, serial: u64) -> String {
    format!("ORD-{year}-{serial:04}")
}
