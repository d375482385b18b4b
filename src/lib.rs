pub mod application;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::order_service::OrderService;
pub use config::AppConfig;
pub use db::{create_pool, DbPool};

use errors::AppError;
use handlers::orders;
use infrastructure::order_repo::DieselOrderRepository;
use infrastructure::payment::StubPaymentGateway;
use infrastructure::product_repo::DieselProductRepository;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::create_order,
        orders::get_all_orders,
        orders::get_current_user_orders,
        orders::get_single_order,
        orders::update_order,
    ),
    components(schemas(
        orders::CartItemRequest,
        orders::CreateOrderRequest,
        orders::UpdateOrderRequest,
        orders::OrderItemResponse,
        orders::OrderResponse,
        orders::CreateOrderResponse,
        orders::SingleOrderResponse,
        orders::OrderListResponse,
    )),
    tags((name = "orders", description = "Order placement, lookup and payment"))
)]
pub struct ApiDoc;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Order service backed by Postgres and the stub payment gateway.
pub fn postgres_service(pool: DbPool, currency: &str) -> OrderService {
    OrderService::new(
        Arc::new(DieselProductRepository::new(pool.clone())),
        Arc::new(DieselOrderRepository::new(pool)),
        Arc::new(StubPaymentGateway),
    )
    .with_currency(currency)
}

/// Registers the `/orders` routes. Expects `web::Data<OrderService>` in the
/// app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());

    cfg.service(
        web::scope("/orders")
            .app_data(json_config)
            .route("", web::post().to(orders::create_order))
            .route("", web::get().to(orders::get_all_orders))
            .route(
                "/showAllMyOrders",
                web::get().to(orders::get_current_user_orders),
            )
            .route("/{id}", web::get().to(orders::get_single_order))
            .route("/{id}", web::patch().to(orders::update_order)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: OrderService,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(service);
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
