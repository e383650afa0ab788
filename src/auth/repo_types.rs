use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,                   // unique user ID
    pub username: String,           // unique, case-sensitive
    pub password_hash: String,      // Argon2 PHC string
    pub points: i64,                // never negative
    pub created_at: OffsetDateTime, // creation timestamp
}
