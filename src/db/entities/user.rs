//! User entity. Only used to check login credentials.

use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    #[sqlx(rename = "user_id")]
    pub id: i64,

    pub username: String,

    /// bcrypt hash.
    #[sqlx(rename = "password")]
    pub password_hash: String,
}
