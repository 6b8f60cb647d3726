use tracing::{info, warn};
use uuid::Uuid;

use crate::db::count_references;
use crate::error::ApiError;
use crate::query::{Page, PageRequest};
use crate::rooms::{
    CreateRoomRequest, CreateRoomTypeRequest, Room, RoomFilter, RoomRepository, RoomType,
    RoomTypeFilter, UpdateRoomRequest, UpdateRoomTypeRequest,
};

/// Room inventory rules: per-property uniqueness and delete guards
#[derive(Clone)]
pub struct RoomService {
    repo: RoomRepository,
}

impl RoomService {
    pub fn new(repo: RoomRepository) -> Self {
        Self { repo }
    }

    pub async fn create_room_type(&self, request: CreateRoomTypeRequest) -> Result<RoomType, ApiError> {
        let room_type = self.repo.create_room_type(&request).await?;
        info!(room_type_id = %room_type.id, "Created room type {}", room_type.name);
        Ok(room_type)
    }

    pub async fn list_room_types(
        &self,
        filter: RoomTypeFilter,
        page: PageRequest,
    ) -> Result<Page<RoomType>, ApiError> {
        Ok(self.repo.list_room_types(&filter, page).await?)
    }

    pub async fn get_room_type(&self, id: Uuid) -> Result<RoomType, ApiError> {
        self.repo
            .find_room_type(id)
            .await?
            .ok_or_else(|| ApiError::not_found("RoomType", id))
    }

    pub async fn update_room_type(
        &self,
        id: Uuid,
        request: UpdateRoomTypeRequest,
    ) -> Result<RoomType, ApiError> {
        let room_type = self
            .repo
            .update_room_type(id, &request)
            .await?
            .ok_or_else(|| ApiError::not_found("RoomType", id))?;
        info!(room_type_id = %id, "Updated room type");
        Ok(room_type)
    }

    /// A room type cannot be deleted while rooms use it
    pub async fn delete_room_type(&self, id: Uuid) -> Result<(), ApiError> {
        self.get_room_type(id).await?;

        let rooms = count_references(self.repo.pool(), "rooms", "room_type_id", id).await?;
        if rooms > 0 {
            warn!(room_type_id = %id, rooms, "Refusing to delete room type in use");
            return Err(ApiError::conflict(format!(
                "Cannot delete room type with {} existing room(s)",
                rooms
            )));
        }

        self.repo.delete_room_type(id).await?;
        info!(room_type_id = %id, "Deleted room type");
        Ok(())
    }

    /// The room type must belong to the same property as the room
    pub async fn create_room(&self, request: CreateRoomRequest) -> Result<Room, ApiError> {
        let room_type = self.get_room_type(request.room_type_id).await?;
        if room_type.property_id != request.property_id {
            return Err(ApiError::invalid_field(
                "room_type_id",
                "property_mismatch",
                "Room type belongs to a different property",
            ));
        }

        let room = self.repo.create_room(&request).await?;
        info!(room_id = %room.id, "Created room {}", room.number);
        Ok(room)
    }

    pub async fn list_rooms(&self, filter: RoomFilter, page: PageRequest) -> Result<Page<Room>, ApiError> {
        Ok(self.repo.list_rooms(&filter, page).await?)
    }

    pub async fn get_room(&self, id: Uuid) -> Result<Room, ApiError> {
        self.repo
            .find_room(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Room", id))
    }

    pub async fn update_room(&self, id: Uuid, request: UpdateRoomRequest) -> Result<Room, ApiError> {
        let existing = self.get_room(id).await?;
        if let Some(room_type_id) = request.room_type_id {
            let room_type = self.get_room_type(room_type_id).await?;
            if room_type.property_id != existing.property_id {
                return Err(ApiError::invalid_field(
                    "room_type_id",
                    "property_mismatch",
                    "Room type belongs to a different property",
                ));
            }
        }

        let room = self
            .repo
            .update_room(id, &request)
            .await?
            .ok_or_else(|| ApiError::not_found("Room", id))?;
        info!(room_id = %id, status = %room.status, "Updated room");
        Ok(room)
    }

    /// A room cannot be deleted while reservations, stays or housekeeping
    /// tasks reference it
    pub async fn delete_room(&self, id: Uuid) -> Result<(), ApiError> {
        self.get_room(id).await?;

        let reservations = count_references(self.repo.pool(), "reservations", "room_id", id).await?;
        let stays = count_references(self.repo.pool(), "stays", "room_id", id).await?;
        let tasks = count_references(self.repo.pool(), "housekeeping_tasks", "room_id", id).await?;
        if reservations > 0 || stays > 0 || tasks > 0 {
            warn!(room_id = %id, reservations, stays, tasks, "Refusing to delete referenced room");
            return Err(ApiError::conflict(
                "Cannot delete room with existing reservations, stays or housekeeping tasks",
            ));
        }

        self.repo.delete_room(id).await?;
        info!(room_id = %id, "Deleted room");
        Ok(())
    }
}
