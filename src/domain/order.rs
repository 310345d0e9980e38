use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::actor_framework::Resource;
use crate::allocator::IdRange;
use crate::domain::Amount;
use crate::error::OrderError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Completed,
    #[default]
    Pending,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Completed,
        OrderStatus::Pending,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Completed => "completed",
            OrderStatus::Pending => "pending",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Human readable label for listings.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Completed => "Completed",
            OrderStatus::Pending => "Pending",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| OrderError::ValidationError(format!("unknown order status: {s}")))
    }
}

/// One product line within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(deserialize_with = "super::id_format::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "super::id_format::deserialize")]
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "price", default)]
    pub unit_price: Amount,
    #[serde(default)]
    pub quantity: Amount,
    #[serde(default)]
    pub total: Amount,
    /// Product picture as a `data:` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// An order record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(deserialize_with = "super::id_format::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "super::id_format::deserialize")]
    pub user_id: String,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub status: OrderStatus,
    pub created_at: Timestamp,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub total_price: Amount,
}

/// Payload for creating or replacing an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub items: Vec<LineItem>,
    pub total_price: Amount,
}

impl Order {
    /// Creation date as seen from `tz`.
    pub fn created_on(&self, tz: &TimeZone) -> Date {
        self.created_at.to_zoned(tz.clone()).date()
    }
}

impl Resource for Order {
    type Payload = OrderCreate;

    const COLLECTION: &'static str = "orders";
    const ID_RANGE: IdRange = IdRange::ORDERS;

    fn id(&self) -> &str {
        &self.id
    }

    fn proposed_id(payload: &OrderCreate) -> Option<&str> {
        payload.id.as_deref()
    }

    fn with_proposed_id(mut payload: OrderCreate, id: String) -> OrderCreate {
        payload.id = Some(id);
        payload
    }

    fn from_payload(id: String, payload: OrderCreate) -> Self {
        Self {
            id,
            user_id: payload.user_id,
            order_number: payload.order_number,
            status: payload.status,
            created_at: payload.created_at,
            items: payload.items,
            total_price: payload.total_price,
        }
    }
}

/// Creation-date window for order listings. Both bounds are whole days and
/// inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

impl OrderFilter {
    pub fn between(from: Option<Date>, to: Option<Date>) -> Self {
        Self { from, to }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn matches(&self, order: &Order, tz: &TimeZone) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let day = order.created_on(tz);
        self.from.is_none_or(|from| day >= from) && self.to.is_none_or(|to| day <= to)
    }

    pub fn apply(&self, orders: Vec<Order>, tz: &TimeZone) -> Vec<Order> {
        orders
            .into_iter()
            .filter(|order| self.matches(order, tz))
            .collect()
    }
}
