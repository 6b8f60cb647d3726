use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::query::{Criteria, FilterBuilder};
use crate::validation::validate_not_blank;

/// Physical state of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Available,
    Occupied,
    Maintenance,
    Cleaning,
}

impl RoomStatus {
    pub const ALL: [RoomStatus; 4] = [
        RoomStatus::Available,
        RoomStatus::Occupied,
        RoomStatus::Maintenance,
        RoomStatus::Cleaning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "AVAILABLE",
            RoomStatus::Occupied => "OCCUPIED",
            RoomStatus::Maintenance => "MAINTENANCE",
            RoomStatus::Cleaning => "CLEANING",
        }
    }
}

impl Default for RoomStatus {
    fn default() -> Self {
        RoomStatus::Available
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RoomType {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub amenities: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Room {
    pub id: Uuid,
    pub property_id: Uuid,
    pub room_type_id: Uuid,
    pub number: String,
    pub floor: i32,
    pub status: RoomStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoomTypeRequest {
    pub property_id: Uuid,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub name: String,
    #[validate(range(min = 1, max = 20, message = "Capacity must be between 1 and 20"))]
    pub capacity: i32,
    pub amenities: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoomTypeRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 20, message = "Capacity must be between 1 and 20"))]
    pub capacity: Option<i32>,
    pub amenities: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoomRequest {
    pub property_id: Uuid,
    pub room_type_id: Uuid,
    #[validate(length(min = 1, max = 20), custom = "validate_not_blank")]
    pub number: String,
    #[validate(range(min = 0, max = 200))]
    pub floor: i32,
    #[serde(default)]
    pub status: RoomStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoomRequest {
    pub room_type_id: Option<Uuid>,
    #[validate(length(min = 1, max = 20), custom = "validate_not_blank")]
    pub number: Option<String>,
    #[validate(range(min = 0, max = 200))]
    pub floor: Option<i32>,
    pub status: Option<RoomStatus>,
    pub notes: Option<String>,
}

/// Query filters for `GET /api/room-types`
#[derive(Debug, Default, Deserialize)]
pub struct RoomTypeFilter {
    pub property_id: Option<Uuid>,
    pub search: Option<String>,
}

impl Criteria for RoomTypeFilter {
    fn apply<'a>(&'a self, filter: &mut FilterBuilder<'a>) {
        filter
            .eq("property_id", self.property_id)
            .search(&["name"], self.search.as_deref());
    }
}

/// Query filters for `GET /api/rooms`
#[derive(Debug, Default, Deserialize)]
pub struct RoomFilter {
    pub property_id: Option<Uuid>,
    pub room_type_id: Option<Uuid>,
    pub status: Option<RoomStatus>,
    pub floor: Option<i32>,
    pub search: Option<String>,
}

impl Criteria for RoomFilter {
    fn apply<'a>(&'a self, filter: &mut FilterBuilder<'a>) {
        filter
            .eq("property_id", self.property_id)
            .eq("room_type_id", self.room_type_id)
            .eq("status", self.status)
            .eq("floor", self.floor)
            .search(&["number", "notes"], self.search.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_status_wire_format() {
        assert_eq!(serde_json::to_string(&RoomStatus::Cleaning).unwrap(), "\"CLEANING\"");
        assert_eq!(RoomStatus::default(), RoomStatus::Available);
    }

    #[test]
    fn test_room_filter_builds_conditions() {
        let criteria = RoomFilter {
            status: Some(RoomStatus::Available),
            floor: Some(3),
            ..Default::default()
        };
        let mut filter = FilterBuilder::new("SELECT * FROM rooms");
        criteria.apply(&mut filter);
        assert_eq!(filter.sql(), "SELECT * FROM rooms WHERE status = $1 AND floor = $2");
    }

    #[test]
    fn test_room_type_capacity_bounds() {
        let request = CreateRoomTypeRequest {
            property_id: Uuid::new_v4(),
            name: "Deluxe Suite".into(),
            capacity: 0,
            amenities: None,
        };
        assert!(request.validate().is_err());
    }
}
