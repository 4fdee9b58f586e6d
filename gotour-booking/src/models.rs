use chrono::NaiveDate;
use gotour_catalog::{PriceBreakdown, UnitRate};
use gotour_core::{
    AvailabilityQuery, BookingDates, BookingPayload, BookingStatus, ContactDetails,
    HotelBookingPayload, PartySize, PaymentMethod, TourBookingPayload,
};
use gotour_shared::{BookingType, Money, ResourceType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Screens of the booking flow, in order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Details,
    ContactInfo,
    Payment,
    Confirmation,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Details, Step::ContactInfo, Step::Payment, Step::Confirmation];

    /// Steps the user fills in; `Confirmation` is only reached by the workflow.
    pub const EDITABLE: [Step; 3] = [Step::Details, Step::ContactInfo, Step::Payment];

    pub const LAST_EDITABLE: Step = Step::Payment;

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Step> {
        Step::ALL.get(index).copied()
    }

    pub fn next(&self) -> Option<Step> {
        Step::from_index(self.index() + 1)
    }

    pub fn previous(&self) -> Option<Step> {
        self.index().checked_sub(1).and_then(Step::from_index)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Step::Details => "Details",
            Step::ContactInfo => "Contact information",
            Step::Payment => "Payment",
            Step::Confirmation => "Confirmation",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inputs of the booking form. Each belongs to exactly one step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    RoomType,
    CheckIn,
    CheckOut,
    Rooms,
    TourDate,
    StartDate,
    Adults,
    Children,
    FullName,
    Email,
    Phone,
    Identification,
    SpecialRequests,
    PaymentMethod,
}

impl Field {
    pub fn step(&self) -> Step {
        match self {
            Field::RoomType
            | Field::CheckIn
            | Field::CheckOut
            | Field::Rooms
            | Field::TourDate
            | Field::StartDate
            | Field::Adults
            | Field::Children => Step::Details,
            Field::FullName
            | Field::Email
            | Field::Phone
            | Field::Identification
            | Field::SpecialRequests => Step::ContactInfo,
            Field::PaymentMethod => Step::Payment,
        }
    }

    pub fn applies_to(&self, resource_type: ResourceType) -> bool {
        match self {
            Field::RoomType | Field::CheckIn | Field::CheckOut | Field::Rooms | Field::Identification => {
                resource_type == ResourceType::Hotel
            }
            Field::TourDate | Field::StartDate => resource_type == ResourceType::Tour,
            _ => true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Field::RoomType => "room_type",
            Field::CheckIn => "check_in",
            Field::CheckOut => "check_out",
            Field::Rooms => "rooms",
            Field::TourDate => "tour_date",
            Field::StartDate => "start_date",
            Field::Adults => "adults",
            Field::Children => "children",
            Field::FullName => "full_name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Identification => "identification",
            Field::SpecialRequests => "special_requests",
            Field::PaymentMethod => "payment_method",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type FieldErrors = BTreeMap<Field, String>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: FieldErrors,
}

impl ValidationReport {
    pub fn from_errors(errors: FieldErrors) -> Self {
        Self { valid: errors.is_empty(), errors }
    }

    /// Earliest step holding an error.
    pub fn first_failing_step(&self) -> Option<Step> {
        self.errors.keys().map(Field::step).min()
    }
}

/// A value the form changed on its own while applying an edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Adjustment {
    pub field: Field,
    pub value: String,
    pub reason: String,
}

/// Fully validated booking, ready to check and submit.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookingDraft {
    pub resource_type: ResourceType,
    pub resource_id: String,
    /// Room type id, or tour date id.
    pub sub_resource_id: String,
    pub dates: BookingDates,
    pub party_size: PartySize,
    pub rooms: Option<u32>,
    pub unit_rate: UnitRate,
    /// Room-nights for hotels, people for tours.
    pub quantity: u32,
    pub special_requests: String,
    pub contact: ContactDetails,
    pub payment_method: PaymentMethod,
    pub price: PriceBreakdown,
}

impl BookingDraft {
    pub fn availability_query(&self) -> AvailabilityQuery {
        AvailabilityQuery {
            resource_type: self.resource_type,
            resource_id: self.resource_id.clone(),
            sub_resource_id: self.sub_resource_id.clone(),
            dates: self.dates,
            party_size: self.party_size,
            quantity: self.rooms.unwrap_or_else(|| self.party_size.total()),
        }
    }

    pub fn payload(&self) -> BookingPayload {
        match self.dates {
            BookingDates::Stay(stay) => BookingPayload::Hotel(HotelBookingPayload {
                hotel_id: self.resource_id.clone(),
                room_type_id: self.sub_resource_id.clone(),
                check_in: stay.check_in,
                check_out: stay.check_out,
                nights: stay.nights(),
                rooms: self.rooms.unwrap_or(1),
                guests: self.party_size.total(),
                adults: self.party_size.adults,
                children: self.party_size.children,
                contact_info: self.contact.clone(),
                special_requests: self.special_requests.clone(),
                total_price: self.price.total,
                payment_method: self.payment_method,
            }),
            BookingDates::Day { start_date } => BookingPayload::Tour(TourBookingPayload {
                tour_id: self.resource_id.clone(),
                tour_date_id: self.sub_resource_id.clone(),
                start_date,
                number_of_people: self.party_size.total(),
                adults: self.party_size.adults,
                children: self.party_size.children,
                contact_info: self.contact.clone(),
                special_requests: self.special_requests.clone(),
                total_price: self.price.total,
                payment_method: self.payment_method,
            }),
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.dates.start()
    }
}

/// Read-only reference to a booking the backend created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    pub id: String,
    pub booking_type: BookingType,
    pub status: BookingStatus,
    pub total_price: Money,
    pub payment_method: PaymentMethod,
}
