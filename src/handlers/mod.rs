/// API handlers module
pub mod catalog;
pub mod checkout;
pub mod common;

// Re-export route builders
pub use catalog::catalog_routes;
pub use checkout::checkout_routes;
