use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Signed, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub price: BigDecimal,
}

/// A line of the shopping cart as submitted. `product` stays as raw text so
/// an unknown or malformed id can be echoed back to the caller.
#[derive(Debug, Clone)]
pub struct CartItemInput {
    pub product: String,
    pub amount: i32,
}

#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub items: Vec<CartItemInput>,
    pub tax: Option<BigDecimal>,
    pub shipping_fee: Option<BigDecimal>,
}

/// Snapshot of a product taken when the order was placed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub image: String,
    pub price: BigDecimal,
    pub amount: i32,
}

impl OrderItem {
    pub fn snapshot(product: &Product, amount: i32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.price.clone(),
            amount,
        }
    }

    pub fn line_total(&self) -> BigDecimal {
        &self.price * BigDecimal::from(self.amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            other => Err(DomainError::Internal(format!(
                "Unknown order status '{}'",
                other
            ))),
        }
    }
}

/// Fractional digits kept by every stored money column.
pub const MONEY_SCALE: i64 = 2;

/// Money amounts must stay strictly below this many units.
pub const MONEY_LIMIT: i64 = 1_000_000_000_000;

/// Rejects amounts the order columns cannot hold exactly: negative values,
/// more than [`MONEY_SCALE`] fractional digits, or [`MONEY_LIMIT`] and up.
pub fn check_money(label: &str, value: &BigDecimal) -> Result<(), DomainError> {
    if value.is_negative() {
        return Err(DomainError::InvalidInput(format!(
            "{} must not be negative",
            label
        )));
    }
    let (_, scale) = value.normalized().as_bigint_and_exponent();
    if scale > MONEY_SCALE {
        return Err(DomainError::InvalidInput(format!(
            "{} must have at most {} decimal places",
            label, MONEY_SCALE
        )));
    }
    if *value >= BigDecimal::from(MONEY_LIMIT) {
        return Err(DomainError::InvalidInput(format!(
            "{} must be less than {}",
            label, MONEY_LIMIT
        )));
    }
    Ok(())
}

/// Accumulates order items in cart order while keeping a running subtotal.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    items: Vec<OrderItem>,
    subtotal: BigDecimal,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            subtotal: BigDecimal::zero(),
        }
    }
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, product: &Product, amount: i32) {
        let item = OrderItem::snapshot(product, amount);
        self.subtotal += item.line_total();
        self.items.push(item);
    }

    pub fn subtotal(&self) -> &BigDecimal {
        &self.subtotal
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total(&self, tax: &BigDecimal, shipping_fee: &BigDecimal) -> BigDecimal {
        tax + shipping_fee + &self.subtotal
    }

    pub fn into_new_order(
        self,
        user_id: Uuid,
        tax: BigDecimal,
        shipping_fee: BigDecimal,
        client_secret: String,
    ) -> NewOrder {
        let total = self.total(&tax, &shipping_fee);
        NewOrder {
            user_id,
            items: self.items,
            subtotal: self.subtotal,
            tax,
            shipping_fee,
            total,
            client_secret,
        }
    }
}

/// Everything needed to persist a freshly priced order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub shipping_fee: BigDecimal,
    pub total: BigDecimal,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub shipping_fee: BigDecimal,
    pub total: BigDecimal,
    pub client_secret: String,
    pub status: OrderStatus,
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntent {
    pub client_secret: String,
    pub amount: BigDecimal,
}
