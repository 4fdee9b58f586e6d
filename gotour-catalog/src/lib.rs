pub mod product;
pub mod pricing;
pub mod inventory;

pub use product::{ensure_bookable, load_resource, party_capacity, unit_rate, CatalogError, UnitRate};
pub use pricing::{compute_total, PriceBreakdown, PricingCalculator, PricingConfig};
pub use inventory::{AvailabilityChecker, AvailabilityVerdict};
