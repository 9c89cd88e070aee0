/// Storefront entities module
pub mod accordion_item;
pub mod category;
pub mod game;
pub mod service;
pub mod service_game;
pub mod service_price;
pub mod site_config;

// Re-export entities
pub use accordion_item::{Entity as AccordionItem, Model as AccordionItemModel};
pub use category::{Entity as Category, Model as CategoryModel};
pub use game::{Entity as Game, Model as GameModel};
pub use service::{Entity as Service, Model as ServiceModel};
pub use service_game::{Entity as ServiceGame, Model as ServiceGameModel};
pub use service_price::{Entity as ServicePrice, Model as ServicePriceModel};
pub use site_config::{Entity as SiteConfig, Model as SiteConfigModel};
