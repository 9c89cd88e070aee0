/// Business services module
pub mod catalog;
pub mod checkout;
pub mod flatfile;
pub mod payments;

// Re-export services for convenience
pub use catalog::{ContentSource, StoreCatalogService};
pub use checkout::{CheckoutService, PaymentResolution, SessionSnapshot};
pub use flatfile::FlatFileCatalog;
pub use payments::{PaymentGateway, PaymentOutcome, PaymentRequest, PayPalGateway};
