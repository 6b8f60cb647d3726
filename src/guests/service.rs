use tracing::{info, warn};
use uuid::Uuid;

use crate::db::count_references;
use crate::error::ApiError;
use crate::guests::{CreateGuestRequest, Guest, GuestFilter, GuestRepository, UpdateGuestRequest};
use crate::query::{Page, PageRequest};

#[derive(Clone)]
pub struct GuestService {
    repo: GuestRepository,
}

impl GuestService {
    pub fn new(repo: GuestRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, request: CreateGuestRequest) -> Result<Guest, ApiError> {
        let guest = self.repo.create(&request).await?;
        info!(guest_id = %guest.id, "Created guest profile");
        Ok(guest)
    }

    pub async fn list(&self, filter: GuestFilter, page: PageRequest) -> Result<Page<Guest>, ApiError> {
        Ok(self.repo.list(&filter, page).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Guest, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Guest", id))
    }

    pub async fn update(&self, id: Uuid, request: UpdateGuestRequest) -> Result<Guest, ApiError> {
        let guest = self
            .repo
            .update(id, &request)
            .await?
            .ok_or_else(|| ApiError::not_found("Guest", id))?;
        info!(guest_id = %id, "Updated guest profile");
        Ok(guest)
    }

    /// Guests with reservation history are kept
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.get(id).await?;

        let reservations = count_references(self.repo.pool(), "reservations", "guest_id", id).await?;
        if reservations > 0 {
            warn!(guest_id = %id, reservations, "Refusing to delete guest with reservations");
            return Err(ApiError::conflict(format!(
                "Cannot delete guest with {} existing reservation(s)",
                reservations
            )));
        }

        self.repo.delete(id).await?;
        info!(guest_id = %id, "Deleted guest profile");
        Ok(())
    }
}
