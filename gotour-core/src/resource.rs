use chrono::NaiveDate;
use gotour_shared::{Money, ResourceType};
use serde::{Deserialize, Serialize};

/// A departure of a tour that customers can pick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TourDate {
    #[serde(alias = "_id")]
    pub id: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Tour as published by the catalog. Prices and group size are optional on
/// the wire; the booking side refuses to guess them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub discounted_price: Option<Money>,
    #[serde(default, alias = "maxParticipants")]
    pub max_group_size: Option<u32>,
    #[serde(default)]
    pub available_dates: Vec<TourDate>,
}

impl Tour {
    pub fn find_date(&self, date_id: &str) -> Option<&TourDate> {
        self.available_dates.iter().find(|d| d.id == date_id)
    }

    pub fn date_starting_on(&self, start: NaiveDate) -> Option<&TourDate> {
        self.available_dates.iter().find(|d| d.start_date == start)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomType {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, alias = "pricePerNight")]
    pub price: Option<Money>,
    #[serde(default)]
    pub discounted_price: Option<Money>,
    /// Guests per room.
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub total_rooms: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub room_types: Vec<RoomType>,
}

impl Hotel {
    pub fn find_room_type(&self, room_type_id: &str) -> Option<&RoomType> {
        self.room_types.iter().find(|r| r.id == room_type_id)
    }
}

/// Catalog snapshot a booking workflow is opened against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resource {
    Tour(Tour),
    Hotel(Hotel),
}

impl Resource {
    pub fn id(&self) -> &str {
        match self {
            Resource::Tour(t) => &t.id,
            Resource::Hotel(h) => &h.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Resource::Tour(t) => &t.name,
            Resource::Hotel(h) => &h.name,
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        match self {
            Resource::Tour(_) => ResourceType::Tour,
            Resource::Hotel(_) => ResourceType::Hotel,
        }
    }
}
