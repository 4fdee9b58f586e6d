use async_trait::async_trait;
use chrono::NaiveDate;
use gotour_core::{
    AvailabilityQuery, AvailabilityResult, BookingDates, InventoryService, ServiceResult,
};
use gotour_shared::ResourceType;
use serde::{Deserialize, Serialize};

use crate::client::BackendClient;

/// Body of `POST /api/{hotels|tours}/{id}/check-availability`.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AvailabilityBody {
    #[serde(rename_all = "camelCase")]
    Hotel {
        room_type_id: String,
        check_in: NaiveDate,
        check_out: NaiveDate,
        rooms: u32,
        guests: u32,
    },
    #[serde(rename_all = "camelCase")]
    Tour {
        tour_date_id: String,
        start_date: NaiveDate,
        number_of_people: u32,
    },
}

impl From<&AvailabilityQuery> for AvailabilityBody {
    fn from(query: &AvailabilityQuery) -> Self {
        match query.dates {
            BookingDates::Stay(stay) => AvailabilityBody::Hotel {
                room_type_id: query.sub_resource_id.clone(),
                check_in: stay.check_in,
                check_out: stay.check_out,
                rooms: query.quantity,
                guests: query.party_size.total(),
            },
            BookingDates::Day { start_date } => AvailabilityBody::Tour {
                tour_date_id: query.sub_resource_id.clone(),
                start_date,
                number_of_people: query.party_size.total(),
            },
        }
    }
}

/// Older endpoints answer bare, newer ones inside the envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum AvailabilityAnswer {
    Wrapped { data: AvailabilityResult },
    Bare(AvailabilityResult),
}

pub struct HttpInventoryService {
    client: BackendClient,
}

impl HttpInventoryService {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InventoryService for HttpInventoryService {
    async fn check_availability(&self, query: &AvailabilityQuery) -> ServiceResult<AvailabilityResult> {
        let collection = match query.resource_type {
            ResourceType::Hotel => "hotels",
            ResourceType::Tour => "tours",
        };
        let path = format!("/api/{}/{}/check-availability", collection, query.resource_id);

        let answer: AvailabilityAnswer = self
            .client
            .post_bare(&path, &AvailabilityBody::from(query))
            .await?;

        Ok(match answer {
            AvailabilityAnswer::Wrapped { data } => data,
            AvailabilityAnswer::Bare(result) => result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gotour_core::{PartySize, StayDates};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_hotel_body_shape() {
        let query = AvailabilityQuery {
            resource_type: ResourceType::Hotel,
            resource_id: "h1".into(),
            sub_resource_id: "deluxe".into(),
            dates: BookingDates::Stay(StayDates::new(date("2026-11-10"), date("2026-11-13")).unwrap()),
            party_size: PartySize::new(2, 1),
            quantity: 2,
        };

        let value = serde_json::to_value(AvailabilityBody::from(&query)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "roomTypeId": "deluxe",
                "checkIn": "2026-11-10",
                "checkOut": "2026-11-13",
                "rooms": 2,
                "guests": 3
            })
        );
    }

    #[test]
    fn test_tour_body_shape() {
        let query = AvailabilityQuery {
            resource_type: ResourceType::Tour,
            resource_id: "t1".into(),
            sub_resource_id: "dec-01".into(),
            dates: BookingDates::Day { start_date: date("2026-12-01") },
            party_size: PartySize::new(3, 1),
            quantity: 4,
        };

        let value = serde_json::to_value(AvailabilityBody::from(&query)).unwrap();
        assert_eq!(value["tourDateId"], "dec-01");
        assert_eq!(value["numberOfPeople"], 4);
    }
}
