pub mod caller;
pub mod errors;
pub mod order;
pub mod ports;
