use chrono::{Duration, NaiveDate};
use gotour_catalog::{party_capacity, unit_rate, PriceBreakdown, PricingCalculator};
use gotour_core::{
    BookingDates, ContactDetails, PartySize, PaymentMethod, Resource, StayDates, UserProfile,
};
use gotour_shared::{Masked, ResourceType};
use std::collections::BTreeMap;

use crate::models::{Adjustment, BookingDraft, Field, FieldErrors, Step, ValidationReport};

const DATE_FORMAT: &str = "%Y-%m-%d";
const MAX_SPECIAL_REQUESTS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Field {field} does not apply to {resource_type} bookings")]
    NotApplicable { field: Field, resource_type: ResourceType },
}

/// Accumulated input of the booking form for one resource.
///
/// Values are kept as entered; every rule is evaluated on demand so that
/// validation and pricing always reflect the current input.
#[derive(Debug, Clone)]
pub struct BookingFormState {
    resource: Resource,
    pricing: PricingCalculator,
    today: NaiveDate,
    values: BTreeMap<Field, String>,
    errors: FieldErrors,
}

impl BookingFormState {
    pub fn new(resource: Resource, pricing: PricingCalculator, today: NaiveDate) -> Self {
        let mut values = BTreeMap::new();
        values.insert(Field::Adults, "1".to_string());
        values.insert(Field::Children, "0".to_string());
        values.insert(Field::PaymentMethod, PaymentMethod::Sepay.as_str().to_string());

        if let Resource::Hotel(hotel) = &resource {
            values.insert(Field::Rooms, "1".to_string());
            if let [only] = hotel.room_types.as_slice() {
                values.insert(Field::RoomType, only.id.clone());
            }
        }

        Self {
            resource,
            pricing,
            today,
            values,
            errors: FieldErrors::new(),
        }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource.resource_type()
    }

    pub fn value(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn values(&self) -> &BTreeMap<Field, String> {
        &self.values
    }

    /// Errors recorded by the last validation, minus fields edited since.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Store a value and clear its recorded error. Returns the values the
    /// form corrected as a consequence (check-out bumped past check-in).
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Result<Vec<Adjustment>, FormError> {
        let resource_type = self.resource_type();
        if !field.applies_to(resource_type) {
            return Err(FormError::NotApplicable { field, resource_type });
        }

        let value = value.into();
        self.errors.remove(&field);

        let mut adjustments = Vec::new();
        match field {
            Field::CheckIn | Field::CheckOut => {
                self.values.insert(field, value.trim().to_string());
                adjustments.extend(self.keep_checkout_after_checkin(field));
            }
            Field::TourDate => {
                let linked = self.tour_start_for(value.trim());
                self.values.insert(Field::TourDate, value.trim().to_string());
                if let Some(start) = linked {
                    self.values.insert(Field::StartDate, start.format(DATE_FORMAT).to_string());
                    self.errors.remove(&Field::StartDate);
                }
            }
            Field::StartDate => {
                let linked = parse_date(&value).and_then(|d| self.tour_date_on(d));
                self.values.insert(Field::StartDate, value.trim().to_string());
                if let Some(date_id) = linked {
                    self.values.insert(Field::TourDate, date_id);
                    self.errors.remove(&Field::TourDate);
                }
            }
            _ => {
                self.values.insert(field, value);
            }
        }

        Ok(adjustments)
    }

    /// Fill empty contact fields from the signed-in user. Typed input wins.
    pub fn prefill_contact(&mut self, user: &UserProfile) {
        let candidates = [
            (Field::FullName, user.full_name.as_deref()),
            (Field::Email, user.email.as_deref()),
            (Field::Phone, user.phone.as_deref()),
        ];

        for (field, value) in candidates {
            let empty = self.value(field).map_or(true, |v| v.trim().is_empty());
            if let (true, Some(value)) = (empty, value) {
                self.values.insert(field, value.to_string());
            }
        }
    }

    /// Check one step. Only that step's fields are looked at; the step's
    /// previously recorded errors are replaced by the result.
    pub fn validate_step(&mut self, step: Step) -> ValidationReport {
        let errors = self.check_step(step);
        self.errors.retain(|field, _| field.step() != step);
        self.errors.extend(errors.clone());
        ValidationReport::from_errors(errors)
    }

    /// Union of every editable step.
    pub fn validate_all(&mut self) -> ValidationReport {
        let mut errors = FieldErrors::new();
        for step in Step::EDITABLE {
            errors.extend(self.validate_step(step).errors);
        }
        ValidationReport::from_errors(errors)
    }

    /// Stay length, once both dates are valid.
    pub fn nights(&self) -> Option<u32> {
        self.stay_dates().map(|s| s.nights())
    }

    /// Current price. Incomplete input prices as zero quantity.
    pub fn price(&self) -> PriceBreakdown {
        let sub_id = self.sub_resource_id();
        let Ok(rate) = unit_rate(&self.resource, sub_id.as_deref()) else {
            return PriceBreakdown::default();
        };

        self.pricing.quote(
            self.resource_type(),
            rate.price,
            rate.discounted_price,
            self.quantity(),
        )
    }

    /// Validated, typed draft for submission.
    pub fn to_draft(&mut self) -> Result<BookingDraft, ValidationReport> {
        let report = self.validate_all();
        if !report.valid {
            return Err(report);
        }
        self.build_draft().ok_or(report)
    }

    fn build_draft(&self) -> Option<BookingDraft> {
        let sub_resource_id = self.sub_resource_id()?;
        let rate = unit_rate(&self.resource, Some(&sub_resource_id)).ok()?;

        let dates = match &self.resource {
            Resource::Hotel(_) => BookingDates::Stay(self.stay_dates()?),
            Resource::Tour(_) => BookingDates::Day {
                start_date: self.selected_tour_start()?,
            },
        };

        let identification = match self.resource_type() {
            ResourceType::Hotel => Some(Masked(self.text(Field::Identification))),
            ResourceType::Tour => None,
        };

        Some(BookingDraft {
            resource_type: self.resource_type(),
            resource_id: self.resource.id().to_string(),
            sub_resource_id,
            dates,
            party_size: self.party_size()?,
            rooms: self.rooms(),
            unit_rate: rate,
            quantity: self.quantity(),
            special_requests: self.text(Field::SpecialRequests),
            contact: ContactDetails {
                full_name: Masked(self.text(Field::FullName)),
                email: Masked(self.text(Field::Email)),
                phone: Masked(self.text(Field::Phone)),
                identification,
            },
            payment_method: self.value(Field::PaymentMethod)?.parse().ok()?,
            price: self.price(),
        })
    }

    fn check_step(&self, step: Step) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match step {
            Step::Details => self.check_details(&mut errors),
            Step::ContactInfo => self.check_contact(&mut errors),
            Step::Payment => {
                if let Err(message) = self.parse_payment_method() {
                    errors.insert(Field::PaymentMethod, message);
                }
            }
            Step::Confirmation => {}
        }
        errors
    }

    fn check_details(&self, errors: &mut FieldErrors) {
        match &self.resource {
            Resource::Hotel(hotel) => {
                match self.value(Field::RoomType).filter(|v| !v.is_empty()) {
                    None => {
                        errors.insert(Field::RoomType, "Please select a room type".into());
                    }
                    Some(id) => {
                        if let Err(e) = unit_rate(&self.resource, Some(id)) {
                            errors.insert(Field::RoomType, e.to_string());
                        } else if let Err(e) = party_capacity(&self.resource, Some(id), 1) {
                            errors.insert(Field::RoomType, e.to_string());
                        }
                    }
                }

                match self.required_date(Field::CheckIn) {
                    Err(message) => {
                        errors.insert(Field::CheckIn, message);
                    }
                    Ok(check_in) if check_in < self.today => {
                        errors.insert(Field::CheckIn, "Check-in date cannot be in the past".into());
                    }
                    Ok(_) => {}
                }

                match (self.required_date(Field::CheckOut), self.date(Field::CheckIn)) {
                    (Err(message), _) => {
                        errors.insert(Field::CheckOut, message);
                    }
                    (Ok(check_out), Some(check_in)) if check_out - check_in < Duration::days(1) => {
                        errors.insert(
                            Field::CheckOut,
                            "Check-out must be at least one night after check-in".into(),
                        );
                    }
                    _ => {}
                }

                match parse_count(self.value(Field::Rooms)) {
                    Some(rooms) if rooms >= 1 => {
                        let limit = self
                            .sub_resource_id()
                            .and_then(|id| hotel.find_room_type(&id))
                            .and_then(|room| room.total_rooms);
                        if let Some(limit) = limit.filter(|limit| rooms > *limit) {
                            errors.insert(Field::Rooms, format!("Only {} rooms of this type exist", limit));
                        } else if self.nights().is_some_and(|nights| nights.checked_mul(rooms).is_none()) {
                            errors.insert(Field::Rooms, "Too many rooms for one booking".into());
                        }
                    }
                    _ => {
                        errors.insert(Field::Rooms, "Book at least one room".into());
                    }
                }
            }
            Resource::Tour(tour) => {
                match self.value(Field::TourDate).filter(|v| !v.is_empty()) {
                    None => {
                        errors.insert(Field::TourDate, "Please select a departure date".into());
                    }
                    Some(id) => match tour.find_date(id) {
                        None => {
                            errors.insert(Field::TourDate, "Unknown departure date".into());
                        }
                        Some(date) if date.start_date <= self.today => {
                            errors.insert(Field::TourDate, "This departure is no longer open for booking".into());
                        }
                        Some(_) => {}
                    },
                }

                if let Some(raw) = self.value(Field::StartDate).filter(|v| !v.is_empty()) {
                    match parse_date(raw) {
                        None => {
                            errors.insert(Field::StartDate, "Enter a valid date (YYYY-MM-DD)".into());
                        }
                        Some(start) if tour.date_starting_on(start).is_none() => {
                            errors.insert(Field::StartDate, "No departure on this date".into());
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        self.check_party(errors);
    }

    fn check_party(&self, errors: &mut FieldErrors) {
        let adults = parse_count(self.value(Field::Adults));
        let children = match self.value(Field::Children).filter(|v| !v.trim().is_empty()) {
            None => Some(0),
            Some(raw) => parse_count(Some(raw)),
        };

        let Some(children) = children else {
            errors.insert(Field::Children, "Enter a whole number of children".into());
            return;
        };

        match adults {
            Some(adults) if adults >= 1 => {
                let Some(total) = adults.checked_add(children) else {
                    errors.insert(Field::Adults, "Too many guests for one booking".into());
                    return;
                };
                let capacity = party_capacity(
                    &self.resource,
                    self.sub_resource_id().as_deref(),
                    self.rooms().unwrap_or(1),
                );
                if let Ok(capacity) = capacity {
                    if total > capacity {
                        errors.insert(
                            Field::Adults,
                            format!("At most {} guests for this selection, got {}", capacity, total),
                        );
                    }
                }
            }
            _ => {
                errors.insert(Field::Adults, "At least one adult is required".into());
            }
        }
    }

    fn check_contact(&self, errors: &mut FieldErrors) {
        if self.text(Field::FullName).is_empty() {
            errors.insert(Field::FullName, "Full name is required".into());
        }

        if !is_valid_email(&self.text(Field::Email)) {
            errors.insert(Field::Email, "Enter a valid email address".into());
        }

        if !is_digits(&self.text(Field::Phone), 10..=10) {
            errors.insert(Field::Phone, "Phone number must be exactly 10 digits".into());
        }

        if self.resource_type() == ResourceType::Hotel
            && !is_digits(&self.text(Field::Identification), 9..=12)
        {
            errors.insert(Field::Identification, "ID number must be 9 to 12 digits".into());
        }

        if self.text(Field::SpecialRequests).chars().count() > MAX_SPECIAL_REQUESTS {
            errors.insert(
                Field::SpecialRequests,
                format!("Special requests are limited to {} characters", MAX_SPECIAL_REQUESTS),
            );
        }
    }

    fn keep_checkout_after_checkin(&mut self, edited: Field) -> Option<Adjustment> {
        let check_in = self.date(Field::CheckIn)?;
        let check_out = self.date(Field::CheckOut);

        if check_out.is_some_and(|out| out > check_in) {
            return None;
        }
        // An unset check-out is only filled in when the user just moved check-in.
        if check_out.is_none() && edited != Field::CheckIn {
            return None;
        }

        let bumped = (check_in + Duration::days(1)).format(DATE_FORMAT).to_string();
        self.values.insert(Field::CheckOut, bumped.clone());
        self.errors.remove(&Field::CheckOut);
        tracing::debug!("Check-out moved to {} to keep a one-night stay", bumped);

        Some(Adjustment {
            field: Field::CheckOut,
            value: bumped,
            reason: "Check-out must be at least one night after check-in".into(),
        })
    }

    fn tour_start_for(&self, date_id: &str) -> Option<NaiveDate> {
        match &self.resource {
            Resource::Tour(tour) => tour.find_date(date_id).map(|d| d.start_date),
            Resource::Hotel(_) => None,
        }
    }

    fn tour_date_on(&self, start: NaiveDate) -> Option<String> {
        match &self.resource {
            Resource::Tour(tour) => tour.date_starting_on(start).map(|d| d.id.clone()),
            Resource::Hotel(_) => None,
        }
    }

    fn sub_resource_id(&self) -> Option<String> {
        let field = match self.resource_type() {
            ResourceType::Hotel => Field::RoomType,
            ResourceType::Tour => Field::TourDate,
        };
        self.value(field).filter(|v| !v.is_empty()).map(str::to_string)
    }

    fn selected_tour_start(&self) -> Option<NaiveDate> {
        self.tour_start_for(self.value(Field::TourDate)?)
    }

    fn stay_dates(&self) -> Option<StayDates> {
        StayDates::new(self.date(Field::CheckIn)?, self.date(Field::CheckOut)?)
    }

    fn rooms(&self) -> Option<u32> {
        match self.resource_type() {
            ResourceType::Hotel => parse_count(self.value(Field::Rooms)),
            ResourceType::Tour => None,
        }
    }

    fn party_size(&self) -> Option<PartySize> {
        let adults = parse_count(self.value(Field::Adults))?;
        let children = match self.value(Field::Children).filter(|v| !v.trim().is_empty()) {
            None => 0,
            Some(raw) => parse_count(Some(raw))?,
        };
        Some(PartySize::new(adults, children))
    }

    fn quantity(&self) -> u32 {
        match self.resource_type() {
            ResourceType::Hotel => match (self.nights(), self.rooms()) {
                (Some(nights), Some(rooms)) => nights.saturating_mul(rooms),
                _ => 0,
            },
            ResourceType::Tour => self.party_size().map(|p| p.total()).unwrap_or(0),
        }
    }

    fn parse_payment_method(&self) -> Result<PaymentMethod, String> {
        match self.value(Field::PaymentMethod).filter(|v| !v.trim().is_empty()) {
            None => Err("Please choose a payment method".into()),
            Some(raw) => raw.parse(),
        }
    }

    fn date(&self, field: Field) -> Option<NaiveDate> {
        self.value(field).and_then(parse_date)
    }

    fn required_date(&self, field: Field) -> Result<NaiveDate, String> {
        match self.value(field).filter(|v| !v.trim().is_empty()) {
            None => Err("Date is required".into()),
            Some(raw) => parse_date(raw).ok_or_else(|| "Enter a valid date (YYYY-MM-DD)".into()),
        }
    }

    fn text(&self, field: Field) -> String {
        self.value(field).unwrap_or_default().trim().to_string()
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn parse_count(raw: Option<&str>) -> Option<u32> {
    raw?.trim().parse().ok()
}

fn is_digits(value: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit())
}

/// `local@domain.tld`: one `@`, no whitespace, a dotted domain whose last
/// label is at least two letters.
fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return false;
    }

    labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gotour_core::{Hotel, RoomType, Tour, TourDate};
    use test_case::test_case;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn today() -> NaiveDate {
        day("2026-10-17")
    }

    fn hotel() -> Resource {
        Resource::Hotel(Hotel {
            id: "h1".into(),
            name: "Sea View".into(),
            room_types: vec![
                RoomType {
                    id: "deluxe".into(),
                    name: "Deluxe".into(),
                    price: Some(1_000_000),
                    discounted_price: None,
                    capacity: Some(2),
                    total_rooms: Some(4),
                },
                RoomType {
                    id: "family".into(),
                    name: "Family".into(),
                    price: Some(1_800_000),
                    discounted_price: Some(1_600_000),
                    capacity: Some(4),
                    total_rooms: None,
                },
            ],
        })
    }

    fn tour() -> Resource {
        Resource::Tour(Tour {
            id: "t1".into(),
            name: "Ha Long Bay".into(),
            price: Some(2_000_000),
            discounted_price: Some(1_500_000),
            max_group_size: Some(6),
            available_dates: vec![
                TourDate { id: "past".into(), start_date: day("2026-10-01"), end_date: None },
                TourDate { id: "dec".into(), start_date: day("2026-12-01"), end_date: None },
            ],
        })
    }

    fn hotel_form() -> BookingFormState {
        BookingFormState::new(hotel(), PricingCalculator::default(), today())
    }

    fn tour_form() -> BookingFormState {
        BookingFormState::new(tour(), PricingCalculator::default(), today())
    }

    fn fill_hotel_details(form: &mut BookingFormState) {
        form.set_field(Field::RoomType, "deluxe").unwrap();
        form.set_field(Field::CheckIn, "2026-11-10").unwrap();
        form.set_field(Field::CheckOut, "2026-11-13").unwrap();
        form.set_field(Field::Adults, "2").unwrap();
    }

    fn fill_contact(form: &mut BookingFormState) {
        form.set_field(Field::FullName, "Nguyen Van An").unwrap();
        form.set_field(Field::Email, "an.nguyen@example.vn").unwrap();
        form.set_field(Field::Phone, "0901234567").unwrap();
    }

    #[test]
    fn test_hotel_price_for_three_nights() {
        let mut form = hotel_form();
        fill_hotel_details(&mut form);

        assert_eq!(form.nights(), Some(3));
        let price = form.price();
        assert_eq!(price.base_amount, 3_000_000);
        assert_eq!(price.service_fee, 150_000);
        assert_eq!(price.total, 3_150_000);
    }

    #[test]
    fn test_tour_price_uses_discount_without_fee() {
        let mut form = tour_form();
        form.set_field(Field::TourDate, "dec").unwrap();
        form.set_field(Field::Adults, "3").unwrap();
        form.set_field(Field::Children, "1").unwrap();

        assert_eq!(form.price().total, 6_000_000);
    }

    #[test]
    fn test_incomplete_input_prices_to_zero() {
        let form = hotel_form();
        assert_eq!(form.price().total, 0);
    }

    #[test]
    fn test_checkout_equal_to_checkin_is_corrected() {
        let mut form = hotel_form();
        form.set_field(Field::CheckIn, "2026-11-10").unwrap();

        let adjustments = form.set_field(Field::CheckOut, "2026-11-10").unwrap();

        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].field, Field::CheckOut);
        assert_eq!(adjustments[0].value, "2026-11-11");
        assert_eq!(form.value(Field::CheckOut), Some("2026-11-11"));
        assert_eq!(form.nights(), Some(1));
    }

    #[test]
    fn test_moving_checkin_past_checkout_bumps_checkout() {
        let mut form = hotel_form();
        fill_hotel_details(&mut form);

        let adjustments = form.set_field(Field::CheckIn, "2026-11-20").unwrap();

        assert_eq!(adjustments[0].value, "2026-11-21");
        assert_eq!(form.nights(), Some(1));
        assert!(form.validate_step(Step::Details).valid);
    }

    #[test]
    fn test_moving_checkin_earlier_keeps_checkout() {
        let mut form = hotel_form();
        fill_hotel_details(&mut form);

        assert!(form.set_field(Field::CheckIn, "2026-11-08").unwrap().is_empty());
        assert_eq!(form.nights(), Some(5));
    }

    #[test]
    fn test_capacity_boundary() {
        let mut form = hotel_form();
        fill_hotel_details(&mut form);

        // Deluxe sleeps two per room
        form.set_field(Field::Adults, "2").unwrap();
        assert!(form.validate_step(Step::Details).valid);

        form.set_field(Field::Adults, "3").unwrap();
        let report = form.validate_step(Step::Details);
        assert!(!report.valid);
        assert!(report.errors.contains_key(&Field::Adults));
        assert_eq!(form.value(Field::Adults), Some("3"));

        // A second room raises the limit
        form.set_field(Field::Rooms, "2").unwrap();
        assert!(form.validate_step(Step::Details).valid);
    }

    #[test]
    fn test_tour_group_size_counts_children() {
        let mut form = tour_form();
        form.set_field(Field::TourDate, "dec").unwrap();
        form.set_field(Field::Adults, "4").unwrap();
        form.set_field(Field::Children, "2").unwrap();
        assert!(form.validate_step(Step::Details).valid);

        form.set_field(Field::Children, "3").unwrap();
        assert!(form.validate_step(Step::Details).errors.contains_key(&Field::Adults));
    }

    #[test]
    fn test_tour_date_must_be_published_and_future() {
        let mut form = tour_form();
        assert!(form.validate_step(Step::Details).errors.contains_key(&Field::TourDate));

        form.set_field(Field::TourDate, "past").unwrap();
        assert!(form.validate_step(Step::Details).errors.contains_key(&Field::TourDate));

        form.set_field(Field::TourDate, "nope").unwrap();
        assert!(form.validate_step(Step::Details).errors.contains_key(&Field::TourDate));

        form.set_field(Field::StartDate, "2026-12-01").unwrap();
        assert_eq!(form.value(Field::TourDate), Some("dec"));
        assert!(form.validate_step(Step::Details).valid);

        form.set_field(Field::StartDate, "2026-12-02").unwrap();
        assert!(form.validate_step(Step::Details).errors.contains_key(&Field::StartDate));
    }

    #[test]
    fn test_past_checkin_rejected() {
        let mut form = hotel_form();
        fill_hotel_details(&mut form);
        form.set_field(Field::CheckIn, "2026-10-16").unwrap();

        assert!(form.validate_step(Step::Details).errors.contains_key(&Field::CheckIn));
    }

    #[test]
    fn test_invalid_calendar_date() {
        let mut form = hotel_form();
        fill_hotel_details(&mut form);
        form.set_field(Field::CheckOut, "2026-02-30").unwrap();

        let report = form.validate_step(Step::Details);
        assert_eq!(
            report.errors.get(&Field::CheckOut).map(String::as_str),
            Some("Enter a valid date (YYYY-MM-DD)")
        );
    }

    #[test]
    fn test_details_do_not_require_later_steps() {
        let mut form = hotel_form();
        fill_hotel_details(&mut form);

        let report = form.validate_step(Step::Details);
        assert!(report.valid, "{:?}", report.errors);
        assert!(!form.validate_step(Step::ContactInfo).valid);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let mut form = hotel_form();
        form.set_field(Field::Email, "not-an-email").unwrap();

        let first = form.validate_all();
        let second = form.validate_all();
        assert_eq!(first, second);
        assert_eq!(form.validate_step(Step::ContactInfo), form.validate_step(Step::ContactInfo));
    }

    #[test]
    fn test_set_field_clears_recorded_error() {
        let mut form = hotel_form();
        form.validate_step(Step::ContactInfo);
        assert!(form.errors().contains_key(&Field::Email));
        assert!(form.errors().contains_key(&Field::Phone));

        form.set_field(Field::Email, "an@example.vn").unwrap();
        assert!(!form.errors().contains_key(&Field::Email));
        assert!(form.errors().contains_key(&Field::Phone));
    }

    #[test]
    fn test_hotel_only_fields_rejected_for_tours() {
        let mut form = tour_form();
        assert_eq!(
            form.set_field(Field::Identification, "012345678901"),
            Err(FormError::NotApplicable {
                field: Field::Identification,
                resource_type: ResourceType::Tour
            })
        );
    }

    #[test_case("", false ; "empty")]
    #[test_case("   ", false ; "blank")]
    #[test_case("An", true ; "short name")]
    fn test_full_name_rule(value: &str, valid: bool) {
        let mut form = tour_form();
        form.set_field(Field::FullName, value).unwrap();
        let report = form.validate_step(Step::ContactInfo);
        assert_eq!(!report.errors.contains_key(&Field::FullName), valid);
    }

    #[test_case("an@example.vn", true ; "plain")]
    #[test_case("an.nguyen+trip@mail.example.com", true ; "subdomain and plus")]
    #[test_case("an@example", false ; "no tld")]
    #[test_case("an@example.c", false ; "one letter tld")]
    #[test_case("@example.vn", false ; "no local part")]
    #[test_case("an@@example.vn", false ; "double at")]
    #[test_case("an nguyen@example.vn", false ; "whitespace")]
    #[test_case("an@.vn", false ; "empty label")]
    fn test_email_rule(value: &str, valid: bool) {
        assert_eq!(is_valid_email(value), valid);
    }

    #[test_case("0901234567", true ; "ten digits")]
    #[test_case("090123456", false ; "nine digits")]
    #[test_case("09012345678", false ; "eleven digits")]
    #[test_case("090-123-456", false ; "separators")]
    fn test_phone_rule(value: &str, valid: bool) {
        let mut form = tour_form();
        form.set_field(Field::Phone, value).unwrap();
        let report = form.validate_step(Step::ContactInfo);
        assert_eq!(!report.errors.contains_key(&Field::Phone), valid);
    }

    #[test_case("12345678", false ; "eight digits")]
    #[test_case("123456789", true ; "nine digits")]
    #[test_case("012345678901", true ; "twelve digits")]
    #[test_case("0123456789012", false ; "thirteen digits")]
    #[test_case("12345678A", false ; "letter")]
    fn test_identification_rule(value: &str, valid: bool) {
        let mut form = hotel_form();
        form.set_field(Field::Identification, value).unwrap();
        let report = form.validate_step(Step::ContactInfo);
        assert_eq!(!report.errors.contains_key(&Field::Identification), valid);
    }

    #[test]
    fn test_room_count_limited_by_inventory_size() {
        let mut form = hotel_form();
        fill_hotel_details(&mut form);
        form.set_field(Field::Rooms, "5").unwrap();
        assert!(form.validate_step(Step::Details).errors.contains_key(&Field::Rooms));

        form.set_field(Field::Rooms, "0").unwrap();
        assert!(form.validate_step(Step::Details).errors.contains_key(&Field::Rooms));
    }

    #[test]
    fn test_huge_party_is_a_validation_error() {
        let mut form = tour_form();
        form.set_field(Field::TourDate, "dec").unwrap();
        form.set_field(Field::Children, "1").unwrap();
        form.set_field(Field::Adults, &u32::MAX.to_string()).unwrap();

        assert!(form.price().total > 0);
        let report = form.validate_step(Step::Details);
        assert!(!report.valid);
        assert!(report.errors.contains_key(&Field::Adults));
    }

    #[test]
    fn test_huge_room_count_is_a_validation_error() {
        let mut form = hotel_form();
        form.set_field(Field::RoomType, "family").unwrap();
        form.set_field(Field::CheckIn, "2026-11-10").unwrap();
        form.set_field(Field::CheckOut, "2026-11-12").unwrap();
        form.set_field(Field::Rooms, &u32::MAX.to_string()).unwrap();

        assert_eq!(form.nights(), Some(2));
        assert!(form.price().total > 0);
        let report = form.validate_step(Step::Details);
        assert_eq!(
            report.errors.get(&Field::Rooms).map(String::as_str),
            Some("Too many rooms for one booking")
        );
    }

    #[test]
    fn test_prefill_keeps_typed_input() {
        let mut form = tour_form();
        form.set_field(Field::FullName, "Tran Thi Binh").unwrap();

        form.prefill_contact(&UserProfile {
            id: "u1".into(),
            full_name: Some("Account Name".into()),
            email: Some("binh@example.vn".into()),
            phone: None,
        });

        assert_eq!(form.value(Field::FullName), Some("Tran Thi Binh"));
        assert_eq!(form.value(Field::Email), Some("binh@example.vn"));
        assert_eq!(form.value(Field::Phone), None);
    }

    #[test]
    fn test_draft_for_hotel() {
        let mut form = hotel_form();
        fill_hotel_details(&mut form);
        fill_contact(&mut form);
        form.set_field(Field::Identification, "079123456789").unwrap();
        form.set_field(Field::SpecialRequests, "High floor").unwrap();

        let draft = form.to_draft().unwrap();

        assert_eq!(draft.sub_resource_id, "deluxe");
        assert_eq!(draft.quantity, 3);
        assert_eq!(draft.rooms, Some(1));
        assert_eq!(draft.price.total, 3_150_000);
        assert_eq!(draft.payment_method, PaymentMethod::Sepay);
        assert_eq!(draft.availability_query().quantity, 1);
        assert_eq!(draft.payload().total_price(), 3_150_000);
    }

    #[test]
    fn test_draft_refused_while_invalid() {
        let mut form = tour_form();
        let report = form.to_draft().unwrap_err();

        assert!(!report.valid);
        assert_eq!(report.first_failing_step(), Some(Step::Details));
    }

    #[test]
    fn test_single_room_type_preselected() {
        let Resource::Hotel(mut hotel) = hotel() else { unreachable!() };
        hotel.room_types.truncate(1);

        let form = BookingFormState::new(Resource::Hotel(hotel), PricingCalculator::default(), today());
        assert_eq!(form.value(Field::RoomType), Some("deluxe"));
    }
}
