//! Repository implementations for database operations.
//!
//! Every repository holds a clone of the shared pool. Queries use `?`
//! placeholders, which both supported dialects accept.

pub mod label;
pub mod note;
pub mod recipe;
pub mod recipe_label;
pub mod user;

pub use label::*;
pub use note::*;
pub use recipe::*;
pub use recipe_label::*;
pub use user::*;

use sqlx::AnyPool;

use crate::db::error::DbResult;

/// Database context containing all repositories.
#[derive(Clone)]
pub struct Db {
    pub pool: AnyPool,
    pub recipes: RecipeRepository,
    pub labels: LabelRepository,
    pub recipe_labels: RecipeLabelRepository,
    pub notes: NoteRepository,
    pub users: UserRepository,
}

impl Db {
    /// Create a new database context from a connection pool.
    pub fn new(pool: AnyPool) -> Self {
        Self {
            recipes: RecipeRepository::new(pool.clone()),
            labels: LabelRepository::new(pool.clone()),
            recipe_labels: RecipeLabelRepository::new(pool.clone()),
            notes: NoteRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Run a `SELECT COUNT(*) ... WHERE <id> = ?` query and report whether it
/// matched anything.
pub(crate) async fn row_exists(pool: &AnyPool, sql: &str, id: i64) -> DbResult<bool> {
    let count: i64 = sqlx::query_scalar(sql).bind(id).fetch_one(pool).await?;
    Ok(count > 0)
}

/// Whether an insert lost a race against a concurrent insert of the same key.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
