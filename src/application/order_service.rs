use std::sync::Arc;

use uuid::Uuid;

use crate::domain::caller::{Caller, Role};
use crate::domain::errors::DomainError;
use crate::domain::order::{check_money, CreateOrderInput, Order, OrderDraft};
use crate::domain::ports::{OrderRepository, PaymentGateway, ProductRepository};

pub const DEFAULT_CURRENCY: &str = "usd";

#[derive(Clone)]
pub struct OrderService {
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
    payments: Arc<dyn PaymentGateway>,
    currency: String,
}

impl OrderService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            products,
            orders,
            payments,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Prices the cart against the catalog, opens a payment intent for the
    /// total and stores the order as `pending`.
    ///
    /// Nothing is written unless every cart item resolves to a product.
    pub fn create_order(
        &self,
        caller: &Caller,
        input: CreateOrderInput,
    ) -> Result<Order, DomainError> {
        if input.items.is_empty() {
            return Err(DomainError::InvalidInput(
                "No cart items provided".to_string(),
            ));
        }

        let (Some(tax), Some(shipping_fee)) = (input.tax, input.shipping_fee) else {
            return Err(DomainError::InvalidInput(
                "Please provide tax and shipping fee".to_string(),
            ));
        };
        check_money("Tax", &tax)?;
        check_money("Shipping fee", &shipping_fee)?;

        if let Some(item) = input.items.iter().find(|i| i.amount < 1) {
            return Err(DomainError::InvalidInput(format!(
                "Amount for product {} must be at least 1",
                item.product
            )));
        }

        let mut draft = OrderDraft::new();
        for item in &input.items {
            let product = Uuid::parse_str(&item.product)
                .ok()
                .map(|id| self.products.find_by_id(id))
                .transpose()?
                .flatten()
                .ok_or_else(|| {
                    DomainError::NotFound(format!("No product with id {}", item.product))
                })?;
            draft.add(&product, item.amount);
        }

        let total = draft.total(&tax, &shipping_fee);
        check_money("Order total", &total)?;
        let intent = self
            .payments
            .create_payment_intent(&total, &self.currency)?;

        let order = self.orders.create(draft.into_new_order(
            caller.user_id,
            tax,
            shipping_fee,
            intent.client_secret,
        ))?;

        log::info!(
            "Created order {} for user {} (total {} {})",
            order.id,
            order.user_id,
            order.total,
            self.currency
        );
        Ok(order)
    }

    pub fn get_all_orders(&self, caller: &Caller) -> Result<Vec<Order>, DomainError> {
        caller.require_role(Role::Admin).inspect_err(|_| {
            log::warn!("User {} denied listing all orders", caller.user_id);
        })?;
        self.orders.find_all()
    }

    pub fn get_single_order(&self, caller: &Caller, order_id: &str) -> Result<Order, DomainError> {
        let order = self.load_order(order_id)?;
        self.authorize(caller, &order)?;
        Ok(order)
    }

    pub fn get_current_user_orders(&self, caller: &Caller) -> Result<Vec<Order>, DomainError> {
        self.orders.find_by_user(caller.user_id)
    }

    /// Marks the order as paid with the given payment intent id. The intent
    /// is stored as given and is not verified against the payment gateway.
    pub fn update_order(
        &self,
        caller: &Caller,
        order_id: &str,
        payment_intent_id: Option<String>,
    ) -> Result<Order, DomainError> {
        let Some(payment_intent_id) = payment_intent_id else {
            return Err(DomainError::InvalidInput(
                "Please provide paymentIntentId".to_string(),
            ));
        };

        let order = self.load_order(order_id)?;
        self.authorize(caller, &order)?;

        let updated = self
            .orders
            .mark_paid(order.id, &payment_intent_id)?
            .ok_or_else(|| not_found_order(order_id))?;

        log::info!("Order {} marked paid", updated.id);
        Ok(updated)
    }

    fn load_order(&self, order_id: &str) -> Result<Order, DomainError> {
        let Ok(id) = Uuid::parse_str(order_id) else {
            return Err(not_found_order(order_id));
        };
        self.orders
            .find_by_id(id)?
            .ok_or_else(|| not_found_order(order_id))
    }

    fn authorize(&self, caller: &Caller, order: &Order) -> Result<(), DomainError> {
        caller.check_permissions(order.user_id).inspect_err(|_| {
            log::warn!(
                "User {} denied access to order {} owned by {}",
                caller.user_id,
                order.id,
                order.user_id
            );
        })
    }
}

fn not_found_order(order_id: &str) -> DomainError {
    DomainError::NotFound(format!("No order with id {}", order_id))
}
