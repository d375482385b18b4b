//! Helpers shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use storefront_orders::domain::errors::DomainError;
use storefront_orders::domain::order::{NewOrder, Order, OrderStatus, Product};
use storefront_orders::domain::ports::{OrderRepository, ProductRepository};

pub fn free_port() -> u16 {
    // Bind to port 0 so the OS picks a free port, then release it.
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind failed")
        .local_addr()
        .expect("addr failed")
        .port()
}

#[derive(Default)]
pub struct MemoryCatalog {
    products: Mutex<HashMap<Uuid, Product>>,
    lookups: AtomicUsize,
}

impl MemoryCatalog {
    pub fn insert(&self, product: Product) {
        self.products.lock().unwrap().insert(product.id, product);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ProductRepository for MemoryCatalog {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.products.lock().unwrap().get(&id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryOrders {
    orders: Mutex<Vec<Order>>,
}

impl MemoryOrders {
    pub fn len(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderRepository for MemoryOrders {
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
        self.orders.lock().unwrap().push(order.clone());
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    fn find_all(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.orders.lock().unwrap().clone())
    }

    fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    fn mark_paid(&self, id: Uuid, payment_intent_id: &str) -> Result<Option<Order>, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        order.payment_intent_id = Some(payment_intent_id.to_string());
        order.status = OrderStatus::Paid;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }
}
