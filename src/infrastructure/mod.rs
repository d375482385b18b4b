#[cfg(test)]
pub(crate) mod memory;
pub mod models;
pub mod order_repo;
pub mod payment;
pub mod product_repo;
