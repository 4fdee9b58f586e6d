use gotour_shared::{Money, ResourceType};
use serde::{Deserialize, Serialize};

/// Price of a booking, always derived from its inputs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub base_amount: Money,
    pub service_fee: Money,
    /// Savings from the discounted unit price, when one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<Money>,
    pub total: Money,
}

/// Total for `quantity` units (nights x rooms, or people).
///
/// The discounted unit price wins whenever it is present. The service fee is
/// `fee_ratio` of the base amount, rounded to the nearest dong; ratios
/// outside `[0, 1]` are clamped. A zero quantity prices to zero; refusing to
/// submit such a booking is the form's job.
pub fn compute_total(
    unit_price: Money,
    discounted_unit_price: Option<Money>,
    quantity: u32,
    fee_ratio: f64,
) -> PriceBreakdown {
    let effective = discounted_unit_price.unwrap_or(unit_price);
    let base_amount = effective.saturating_mul(quantity as Money);

    let ratio = if fee_ratio.is_nan() { 0.0 } else { fee_ratio.clamp(0.0, 1.0) };
    let service_fee = (base_amount as f64 * ratio).round() as Money;

    let discount_amount = discounted_unit_price
        .filter(|d| *d < unit_price)
        .map(|d| (unit_price - d).saturating_mul(quantity as Money))
        .filter(|saved| *saved > 0);

    PriceBreakdown {
        base_amount,
        service_fee,
        discount_amount,
        total: base_amount.saturating_add(service_fee),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Service fee added to hotel stays
    #[serde(default = "default_hotel_fee")]
    pub hotel_service_fee_ratio: f64,

    /// Tour prices are already per-person totals
    #[serde(default)]
    pub tour_service_fee_ratio: f64,
}

fn default_hotel_fee() -> f64 { 0.05 }

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            hotel_service_fee_ratio: default_hotel_fee(),
            tour_service_fee_ratio: 0.0,
        }
    }
}

/// Applies the configured fee policy per resource type.
#[derive(Debug, Clone, Default)]
pub struct PricingCalculator {
    config: PricingConfig,
}

impl PricingCalculator {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn fee_ratio(&self, resource_type: ResourceType) -> f64 {
        match resource_type {
            ResourceType::Hotel => self.config.hotel_service_fee_ratio,
            ResourceType::Tour => self.config.tour_service_fee_ratio,
        }
    }

    pub fn quote(
        &self,
        resource_type: ResourceType,
        unit_price: Money,
        discounted_unit_price: Option<Money>,
        quantity: u32,
    ) -> PriceBreakdown {
        compute_total(
            unit_price,
            discounted_unit_price,
            quantity,
            self.fee_ratio(resource_type),
        )
    }
}
