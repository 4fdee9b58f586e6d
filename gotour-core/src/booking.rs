use chrono::NaiveDate;
use gotour_shared::{Masked, Money, ResourceType};
use serde::{Deserialize, Serialize};

use crate::payment::PaymentMethod;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PartySize {
    pub adults: u32,
    pub children: u32,
}

impl PartySize {
    pub fn new(adults: u32, children: u32) -> Self {
        Self { adults, children }
    }

    pub fn total(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }
}

/// Check-in / check-out pair. Holds `check_out > check_in` once built through
/// [`StayDates::new`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StayDates {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayDates {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Option<Self> {
        (check_out > check_in).then_some(Self { check_in, check_out })
    }

    pub fn nights(&self) -> u32 {
        (self.check_out - self.check_in).num_days().max(0) as u32
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookingDates {
    Stay(StayDates),
    Day { start_date: NaiveDate },
}

impl BookingDates {
    pub fn start(&self) -> NaiveDate {
        match self {
            BookingDates::Stay(stay) => stay.check_in,
            BookingDates::Day { start_date } => *start_date,
        }
    }
}

/// Lifecycle of a booking record. Owned by the backend once created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub full_name: Masked<String>,
    pub email: Masked<String>,
    pub phone: Masked<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<Masked<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TourBookingPayload {
    pub tour_id: String,
    pub tour_date_id: String,
    pub start_date: NaiveDate,
    pub number_of_people: u32,
    pub adults: u32,
    pub children: u32,
    pub contact_info: ContactDetails,
    pub special_requests: String,
    pub total_price: Money,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HotelBookingPayload {
    pub hotel_id: String,
    pub room_type_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: u32,
    pub rooms: u32,
    pub guests: u32,
    pub adults: u32,
    pub children: u32,
    pub contact_info: ContactDetails,
    pub special_requests: String,
    pub total_price: Money,
    pub payment_method: PaymentMethod,
}

/// Body sent to the booking service. The two flows use different field sets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BookingPayload {
    Tour(TourBookingPayload),
    Hotel(HotelBookingPayload),
}

impl BookingPayload {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            BookingPayload::Tour(_) => ResourceType::Tour,
            BookingPayload::Hotel(_) => ResourceType::Hotel,
        }
    }

    pub fn resource_id(&self) -> &str {
        match self {
            BookingPayload::Tour(p) => &p.tour_id,
            BookingPayload::Hotel(p) => &p.hotel_id,
        }
    }

    pub fn total_price(&self) -> Money {
        match self {
            BookingPayload::Tour(p) => p.total_price,
            BookingPayload::Hotel(p) => p.total_price,
        }
    }

    pub fn payment_method(&self) -> PaymentMethod {
        match self {
            BookingPayload::Tour(p) => p.payment_method,
            BookingPayload::Hotel(p) => p.payment_method,
        }
    }
}

/// What the booking service hands back on success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreated {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub total_price: Option<Money>,
}
