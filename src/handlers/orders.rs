use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::domain::caller::Caller;
use crate::domain::order::{CartItemInput, CreateOrderInput, Order, OrderItem};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartItemRequest {
    /// Product id
    pub product: String,
    /// Quantity, at least 1
    pub amount: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Option<Vec<CartItemRequest>>,
    /// JSON number or decimal string, e.g. 4.99 or "4.99"
    #[serde(default, deserialize_with = "deserialize_money")]
    #[schema(value_type = Option<String>, example = "4.99")]
    pub tax: Option<BigDecimal>,
    #[serde(default, deserialize_with = "deserialize_money")]
    #[schema(value_type = Option<String>, example = "5.00")]
    pub shipping_fee: Option<BigDecimal>,
}

impl From<CreateOrderRequest> for CreateOrderInput {
    fn from(req: CreateOrderRequest) -> Self {
        CreateOrderInput {
            items: req
                .items
                .unwrap_or_default()
                .into_iter()
                .map(|i| CartItemInput {
                    product: i.product,
                    amount: i.amount,
                })
                .collect(),
            tax: req.tax,
            shipping_fee: req.shipping_fee,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub payment_intent_id: Option<String>,
}

/// Money arrives either as a JSON number or a decimal string. Numbers go
/// through their shortest textual form so `4.99` stays exactly `4.99`.
fn deserialize_money<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Money {
        Number(serde_json::Number),
        Text(String),
    }

    let Some(raw) = Option::<Money>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let text = match raw {
        Money::Number(n) => n.to_string(),
        Money::Text(s) => s,
    };
    BigDecimal::from_str(text.trim())
        .map(Some)
        .map_err(|e| de::Error::custom(format!("invalid amount '{}': {}", text, e)))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub amount: i32,
    pub name: String,
    pub price: String,
    pub image: String,
    pub product: Uuid,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        OrderItemResponse {
            amount: item.amount,
            name: item.name,
            price: item.price.to_string(),
            image: item.image,
            product: item.product_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_items: Vec<OrderItemResponse>,
    pub subtotal: String,
    pub tax: String,
    pub shipping_fee: String,
    pub total: String,
    pub client_secret: String,
    pub status: String,
    pub payment_intent_id: Option<String>,
    pub user: Uuid,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            order_items: o.items.into_iter().map(OrderItemResponse::from).collect(),
            subtotal: o.subtotal.to_string(),
            tax: o.tax.to_string(),
            shipping_fee: o.shipping_fee.to_string(),
            total: o.total.to_string(),
            client_secret: o.client_secret,
            status: o.status.to_string(),
            payment_intent_id: o.payment_intent_id,
            user: o.user_id,
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order: OrderResponse,
    pub client_secret: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SingleOrderResponse {
    pub order: OrderResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub count: usize,
}

impl From<Vec<Order>> for OrderListResponse {
    fn from(orders: Vec<Order>) -> Self {
        let orders: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
        OrderListResponse {
            count: orders.len(),
            orders,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Prices the cart against the catalog, opens a payment intent for the total
/// and stores the order as `pending` for the calling user.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("X-User-Role" = String, Header, description = "admin or user"),
    ),
    responses(
        (status = 201, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Empty cart, missing tax or shipping fee, or money the order cannot hold"),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Unknown product"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<OrderService>,
    caller: Caller,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let input = CreateOrderInput::from(body.into_inner());

    let order = web::block(move || service.create_order(&caller, input)).await??;

    let client_secret = order.client_secret.clone();
    Ok(HttpResponse::Created().json(CreateOrderResponse {
        order: order.into(),
        client_secret,
    }))
}

/// GET /orders
///
/// Every order in the store. Admins only.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("X-User-Role" = String, Header, description = "Must be admin"),
    ),
    responses(
        (status = 200, description = "All orders", body = OrderListResponse),
        (status = 401, description = "Missing caller identity"),
        (status = 403, description = "Caller is not an admin"),
    ),
    tag = "orders"
)]
pub async fn get_all_orders(
    service: web::Data<OrderService>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || service.get_all_orders(&caller)).await??;
    Ok(HttpResponse::Ok().json(OrderListResponse::from(orders)))
}

/// GET /orders/showAllMyOrders
#[utoipa::path(
    get,
    path = "/orders/showAllMyOrders",
    params(
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("X-User-Role" = String, Header, description = "admin or user"),
    ),
    responses(
        (status = 200, description = "Orders placed by the caller", body = OrderListResponse),
        (status = 401, description = "Missing caller identity"),
    ),
    tag = "orders"
)]
pub async fn get_current_user_orders(
    service: web::Data<OrderService>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || service.get_current_user_orders(&caller)).await??;
    Ok(HttpResponse::Ok().json(OrderListResponse::from(orders)))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = String, Path, description = "Order id"),
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("X-User-Role" = String, Header, description = "admin or user"),
    ),
    responses(
        (status = 200, description = "Order found", body = SingleOrderResponse),
        (status = 401, description = "Missing caller identity"),
        (status = 403, description = "Caller neither owns the order nor is an admin"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_single_order(
    service: web::Data<OrderService>,
    caller: Caller,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || service.get_single_order(&caller, &order_id)).await??;

    Ok(HttpResponse::Ok().json(SingleOrderResponse {
        order: order.into(),
    }))
}

/// PATCH /orders/{id}
///
/// Records the payment intent and marks the order as paid.
#[utoipa::path(
    patch,
    path = "/orders/{id}",
    request_body = UpdateOrderRequest,
    params(
        ("id" = String, Path, description = "Order id"),
        ("X-User-Id" = Uuid, Header, description = "Authenticated user id"),
        ("X-User-Role" = String, Header, description = "admin or user"),
    ),
    responses(
        (status = 200, description = "Order marked paid", body = SingleOrderResponse),
        (status = 400, description = "Missing paymentIntentId"),
        (status = 401, description = "Missing caller identity"),
        (status = 403, description = "Caller neither owns the order nor is an admin"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    service: web::Data<OrderService>,
    caller: Caller,
    path: web::Path<String>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let payment_intent_id = body.into_inner().payment_intent_id;

    let order = web::block(move || service.update_order(&caller, &order_id, payment_intent_id))
        .await??;

    Ok(HttpResponse::Ok().json(SingleOrderResponse {
        order: order.into(),
    }))
}
