use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Status an order is created with.
pub const STATUS_PLACED: &str = "placed";
/// The only status transition that carries a stock side effect.
pub const STATUS_CANCELLED: &str = "cancelled";

#[derive(Debug, Clone)]
pub struct LineItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct LineItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// A product/quantity pair handed to the inventory ledger. Reservations
/// decrement stock, releases increment it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAdjustment {
    pub product_id: Uuid,
    pub quantity: i32,
}

impl From<&LineItemInput> for StockAdjustment {
    fn from(item: &LineItemInput) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

impl From<&LineItemView> for StockAdjustment {
    fn from(item: &LineItemView) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewOrderInput {
    pub user_id: Uuid,
    pub status: Option<String>,
    pub items: Vec<LineItemInput>,
    pub total_price: BigDecimal,
    pub order_total: Value,
    pub shipping_address: Value,
    pub payment_method: String,
    pub coupon_code: Option<String>,
    pub tracking_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub total_price: BigDecimal,
    pub order_total: Value,
    pub shipping_address: Value,
    pub payment_method: String,
    pub coupon_code: Option<String>,
    pub tracking_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<LineItemView>,
}

/// Result of a status update: the order as persisted plus the status it
/// held before, so the workflow can tell a fresh cancellation from a
/// repeated one.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub previous_status: String,
    pub order: OrderView,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}
