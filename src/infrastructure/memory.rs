//! In-memory adapters backing the service unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderStatus, Product};
use crate::domain::ports::{OrderRepository, ProductRepository};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Catalog kept in memory. Counts lookups so callers can assert how often
/// the catalog was consulted.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Mutex<HashMap<Uuid, Product>>,
    lookups: AtomicUsize,
}

impl InMemoryProductRepository {
    pub fn insert(&self, product: Product) {
        lock(&self.products).insert(product.id, product);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.products).get(&id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<Order>>,
}

impl InMemoryOrderRepository {
    pub fn len(&self) -> usize {
        lock(&self.orders).len()
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            items: order.items,
            subtotal: order.subtotal,
            tax: order.tax,
            shipping_fee: order.shipping_fee,
            total: order.total,
            client_secret: order.client_secret,
            status: OrderStatus::Pending,
            payment_intent_id: None,
            created_at: now,
            updated_at: now,
        };
        lock(&self.orders).push(order.clone());
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(lock(&self.orders).iter().find(|o| o.id == id).cloned())
    }

    fn find_all(&self) -> Result<Vec<Order>, DomainError> {
        Ok(lock(&self.orders).clone())
    }

    fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError> {
        Ok(lock(&self.orders)
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    fn mark_paid(&self, id: Uuid, payment_intent_id: &str) -> Result<Option<Order>, DomainError> {
        let mut orders = lock(&self.orders);
        let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        order.payment_intent_id = Some(payment_intent_id.to_string());
        order.status = OrderStatus::Paid;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;

    use super::*;

    fn new_order(user_id: Uuid) -> NewOrder {
        NewOrder {
            user_id,
            items: vec![],
            subtotal: BigDecimal::from(1),
            tax: BigDecimal::from(0),
            shipping_fee: BigDecimal::from(0),
            total: BigDecimal::from(1),
            client_secret: "s".to_string(),
        }
    }

    #[test]
    fn mark_paid_unknown_order_returns_none() {
        let repo = InMemoryOrderRepository::default();
        assert!(repo.mark_paid(Uuid::new_v4(), "pi").unwrap().is_none());
    }

    #[test]
    fn mark_paid_updates_status_and_intent() {
        let repo = InMemoryOrderRepository::default();
        let created = repo.create(new_order(Uuid::new_v4())).unwrap();

        let paid = repo.mark_paid(created.id, "pi_1").unwrap().unwrap();

        assert_eq!(paid.status, OrderStatus::Paid);
        assert_eq!(paid.payment_intent_id.as_deref(), Some("pi_1"));
        assert_eq!(
            repo.find_by_id(created.id).unwrap().unwrap().status,
            OrderStatus::Paid
        );
    }

    #[test]
    fn product_lookups_are_counted() {
        let repo = InMemoryProductRepository::default();
        assert!(repo.find_by_id(Uuid::new_v4()).unwrap().is_none());
        assert!(repo.find_by_id(Uuid::new_v4()).unwrap().is_none());
        assert_eq!(repo.lookups(), 2);
    }
}
