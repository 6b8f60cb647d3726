use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::query::{Criteria, FilterBuilder};
use crate::validation::validate_not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Guest {
    pub id: Uuid,
    pub property_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Guest {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGuestRequest {
    pub property_id: Uuid,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub first_name: String,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGuestRequest {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
}

/// Query filters for `GET /api/guests`
#[derive(Debug, Default, Deserialize)]
pub struct GuestFilter {
    pub property_id: Option<Uuid>,
    /// Matches first name, last name, email or phone
    pub search: Option<String>,
}

impl Criteria for GuestFilter {
    fn apply<'a>(&'a self, filter: &mut FilterBuilder<'a>) {
        filter.eq("property_id", self.property_id).search(
            &["first_name", "last_name", "email", "phone"],
            self.search.as_deref(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_search_spans_contact_columns() {
        let criteria = GuestFilter {
            property_id: None,
            search: Some("garcia".into()),
        };
        let mut filter = FilterBuilder::new("SELECT * FROM guests");
        criteria.apply(&mut filter);
        assert_eq!(
            filter.sql(),
            "SELECT * FROM guests WHERE (first_name ILIKE $1 OR last_name ILIKE $2 \
             OR email ILIKE $3 OR phone ILIKE $4)"
        );
    }

    #[test]
    fn test_invalid_email_rejected() {
        let request = CreateGuestRequest {
            property_id: Uuid::new_v4(),
            first_name: "Ana".into(),
            last_name: "Garcia".into(),
            email: Some("not-an-email".into()),
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            country: None,
            notes: None,
        };
        assert!(request.validate().is_err());
    }
}
