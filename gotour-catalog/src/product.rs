use gotour_core::{Resource, ResourceCatalog, ServiceError};
use gotour_shared::{Money, ResourceType};
use serde::{Deserialize, Serialize};

/// Catalog data that cannot back a booking.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("No published price for {0}")]
    MissingPrice(String),

    #[error("No published capacity for {0}")]
    MissingCapacity(String),

    #[error("Unknown room type: {0}")]
    UnknownRoomType(String),

    #[error("Unknown tour date: {0}")]
    UnknownTourDate(String),

    #[error("Hotel {0} has no room types")]
    NoRoomTypes(String),

    #[error("Catalog unavailable: {0}")]
    Service(#[from] ServiceError),
}

/// Unit pricing for one bookable unit (a room-night, or a person on a tour).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnitRate {
    pub price: Money,
    pub discounted_price: Option<Money>,
}

/// Load the snapshot a workflow is opened against, rejecting resources that
/// could never be booked.
pub async fn load_resource(
    catalog: &dyn ResourceCatalog,
    resource_type: ResourceType,
    id: &str,
) -> Result<Resource, CatalogError> {
    let resource = match resource_type {
        ResourceType::Tour => Resource::Tour(catalog.tour(id).await?),
        ResourceType::Hotel => Resource::Hotel(catalog.hotel(id).await?),
    };

    ensure_bookable(&resource)?;
    tracing::info!("Loaded {} {} ({})", resource_type, id, resource.name());
    Ok(resource)
}

/// Tours must publish a price and a group size. Hotels must list at least
/// one room type; individual room types are checked when selected.
pub fn ensure_bookable(resource: &Resource) -> Result<(), CatalogError> {
    match resource {
        Resource::Tour(tour) => {
            if tour.price.is_none() {
                return Err(CatalogError::MissingPrice(format!("tour {}", tour.id)));
            }
            if tour.max_group_size.is_none() {
                return Err(CatalogError::MissingCapacity(format!("tour {}", tour.id)));
            }
            Ok(())
        }
        Resource::Hotel(hotel) if hotel.room_types.is_empty() => {
            Err(CatalogError::NoRoomTypes(hotel.id.clone()))
        }
        Resource::Hotel(_) => Ok(()),
    }
}

/// Unit rate of the resource, or of the selected room type for hotels.
pub fn unit_rate(resource: &Resource, sub_resource_id: Option<&str>) -> Result<UnitRate, CatalogError> {
    match resource {
        Resource::Tour(tour) => {
            let price = tour
                .price
                .ok_or_else(|| CatalogError::MissingPrice(format!("tour {}", tour.id)))?;
            Ok(UnitRate { price, discounted_price: tour.discounted_price })
        }
        Resource::Hotel(hotel) => {
            let id = sub_resource_id.unwrap_or_default();
            let room = hotel
                .find_room_type(id)
                .ok_or_else(|| CatalogError::UnknownRoomType(id.to_string()))?;
            let price = room
                .price
                .ok_or_else(|| CatalogError::MissingPrice(format!("room type {}", room.name)))?;
            Ok(UnitRate { price, discounted_price: room.discounted_price })
        }
    }
}

/// Largest party the selection can take: the tour's group size, or guests
/// per room times rooms for hotels.
pub fn party_capacity(
    resource: &Resource,
    sub_resource_id: Option<&str>,
    rooms: u32,
) -> Result<u32, CatalogError> {
    match resource {
        Resource::Tour(tour) => tour
            .max_group_size
            .ok_or_else(|| CatalogError::MissingCapacity(format!("tour {}", tour.id))),
        Resource::Hotel(hotel) => {
            let id = sub_resource_id.unwrap_or_default();
            let room = hotel
                .find_room_type(id)
                .ok_or_else(|| CatalogError::UnknownRoomType(id.to_string()))?;
            let per_room = room
                .capacity
                .ok_or_else(|| CatalogError::MissingCapacity(format!("room type {}", room.name)))?;
            Ok(per_room.saturating_mul(rooms.max(1)))
        }
    }
}
