use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{NewOrder, Order, PaymentIntent, Product};

pub trait ProductRepository: Send + Sync + 'static {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn find_all(&self) -> Result<Vec<Order>, DomainError>;
    fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError>;
    /// Records the payment intent and moves the order to `paid`. Returns
    /// `None` when no order has that id.
    fn mark_paid(&self, id: Uuid, payment_intent_id: &str) -> Result<Option<Order>, DomainError>;
}

/// The payment processor handshake. Implementations hand back a client
/// secret the storefront uses to finish the payment.
pub trait PaymentGateway: Send + Sync + 'static {
    fn create_payment_intent(
        &self,
        amount: &BigDecimal,
        currency: &str,
    ) -> Result<PaymentIntent, DomainError>;
}
