use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderItem, OrderStatus};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_items, order_outbox, orders};

use super::models::{NewOrderItemRow, NewOrderRow, NewOutboxEventRow, OrderItemRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Outbox ───────────────────────────────────────────────────────────────────

pub const ORDER_CREATED: &str = "OrderCreated";
pub const ORDER_PAID: &str = "OrderPaid";

/// Writes an event for the relay to pick up. Must run inside the same
/// transaction as the order change it describes.
fn insert_event(
    conn: &mut PgConnection,
    order_id: Uuid,
    event_type: &str,
    payload: Value,
) -> QueryResult<()> {
    diesel::insert_into(order_outbox::table)
        .values(&NewOutboxEventRow {
            id: Uuid::new_v4(),
            aggregate_type: "Order".to_string(),
            aggregate_id: order_id.to_string(),
            event_type: event_type.to_string(),
            payload,
        })
        .execute(conn)?;
    Ok(())
}

fn created_payload(order: &Order) -> Value {
    let items: Vec<Value> = order
        .items
        .iter()
        .map(|i| {
            json!({
                "product_id": i.product_id,
                "name": i.name,
                "price": i.price.to_string(),
                "amount": i.amount
            })
        })
        .collect();

    json!({
        "order_id": order.id,
        "user_id": order.user_id,
        "status": order.status.as_str(),
        "subtotal": order.subtotal.to_string(),
        "tax": order.tax.to_string(),
        "shipping_fee": order.shipping_fee.to_string(),
        "total": order.total.to_string(),
        "items": items
    })
}

fn paid_payload(order: &Order) -> Value {
    json!({
        "order_id": order.id,
        "user_id": order.user_id,
        "status": order.status.as_str(),
        "payment_intent_id": order.payment_intent_id,
        "total": order.total.to_string()
    })
}

// ── Loading ──────────────────────────────────────────────────────────────────

fn load_items(conn: &mut PgConnection, row: &OrderRow) -> QueryResult<Vec<OrderItem>> {
    let items = OrderItemRow::belonging_to(row)
        .select(OrderItemRow::as_select())
        .order(order_items::position.asc())
        .load(conn)?;
    Ok(items.into_iter().map(OrderItem::from).collect())
}

fn attach_items(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
    let items = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .order(order_items::position.asc())
        .load(conn)?;

    items
        .grouped_by(&rows)
        .into_iter()
        .zip(rows)
        .map(|(items, row)| row.into_order(items.into_iter().map(OrderItem::from).collect()))
        .collect()
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order
            let row = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: Uuid::new_v4(),
                    user_id: order.user_id,
                    subtotal: order.subtotal,
                    tax: order.tax,
                    shipping_fee: order.shipping_fee,
                    total: order.total,
                    client_secret: order.client_secret,
                    status: OrderStatus::Pending.as_str().to_string(),
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // 2. Insert the item snapshots, keeping cart order in `position`
            let new_items: Vec<NewOrderItemRow> = order
                .items
                .iter()
                .enumerate()
                .map(|(position, item)| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id: row.id,
                    product_id: item.product_id,
                    position: position as i32,
                    name: item.name.clone(),
                    image: item.image.clone(),
                    price: item.price.clone(),
                    amount: item.amount,
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&new_items)
                .execute(conn)?;

            let created = row.into_order(order.items)?;

            // 3. Outbox event in the same transaction
            insert_event(conn, created.id, ORDER_CREATED, created_payload(&created))?;

            Ok(created)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = load_items(&mut conn, &row)?;
        row.into_order(items).map(Some)
    }

    fn find_all(&self) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .select(OrderRow::as_select())
            .order(orders::created_at.asc())
            .load(&mut conn)?;

        attach_items(&mut conn, rows)
    }

    fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::user_id.eq(user_id))
            .select(OrderRow::as_select())
            .order(orders::created_at.asc())
            .load(&mut conn)?;

        attach_items(&mut conn, rows)
    }

    fn mark_paid(&self, id: Uuid, payment_intent_id: &str) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // Only status, intent and timestamp change; amounts stay as created.
            let row = diesel::update(orders::table.find(id))
                .set((
                    orders::status.eq(OrderStatus::Paid.as_str()),
                    orders::payment_intent_id.eq(payment_intent_id),
                    orders::updated_at.eq(chrono::Utc::now()),
                ))
                .returning(OrderRow::as_returning())
                .get_result(conn)
                .optional()?;

            let Some(row) = row else {
                return Ok(None);
            };

            let items = load_items(conn, &row)?;
            let paid = row.into_order(items)?;
            insert_event(conn, paid.id, ORDER_PAID, paid_payload(&paid))?;

            Ok(Some(paid))
        })
    }
}
