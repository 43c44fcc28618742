use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    /// Hard ceiling on registrations for events held here. Minimum 1.
    pub capacity: i32,
    pub location: String,
}

#[derive(Debug, Deserialize, validator::Validate)]
pub struct NewVenue {
    #[validate(length(min = 1, max = 100, message = "Venue name must not be blank"))]
    pub name: String,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: i32,
    #[validate(length(min = 1, max = 255, message = "Location must not be blank"))]
    pub location: String,
}
