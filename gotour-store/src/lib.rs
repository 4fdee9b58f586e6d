pub mod app_config;
pub mod booking_repo;
pub mod catalog_repo;
pub mod client;
pub mod inventory_repo;
pub mod payment_repo;

pub use app_config::{BackendKind, Config};
pub use booking_repo::HttpBookingService;
pub use catalog_repo::HttpResourceCatalog;
pub use client::BackendClient;
pub use inventory_repo::HttpInventoryService;
pub use payment_repo::HttpPaymentService;
