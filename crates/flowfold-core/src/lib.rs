pub mod models;
pub mod error;
pub mod load;
pub mod filter;
pub mod aggregate;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
