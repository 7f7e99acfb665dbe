//! Persistence layer for the recipe store.
//!
//! Entities, repositories and the bootstrapper all talk to the store through
//! one [`sqlx::AnyPool`], so the same code runs on SQLite and MySQL.
//!
//! ```rust,no_run
//! use recipe_box::db::{connect, Db};
//!
//! # async fn run() -> Result<(), recipe_box::db::DbError> {
//! let pool = connect("sqlite://recipes.db").await?;
//! let db = Db::new(pool);
//! let listing = db.recipes.list_active(false).await?;
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod dialect;
pub mod entities;
pub mod error;
pub mod repositories;

pub use bootstrap::{bootstrap, BootstrapOptions, BootstrapReport, SeedCounts};
pub use dialect::Dialect;
pub use error::*;

// Explicit re-exports: entities and repositories have submodules with the
// same names.
pub use entities::{
    Label, LabelOutcome, Note, Recipe, RecipeDraft, RecipeListing, TagOutcome, User,
};
pub use repositories::{
    Db, LabelRepository, NoteRepository, RecipeLabelRepository, RecipeRepository,
    UserRepository,
};

use std::time::Duration;

use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::AnyPool;
use tracing::debug;

/// Connect to the store named by `dsn` (any URL sqlx understands for the
/// SQLite or MySQL drivers).
///
/// An in-memory SQLite database only lives as long as its connection, so
/// for those the pool is pinned to a single connection that never expires.
pub async fn connect(dsn: &str) -> Result<AnyPool, DbError> {
    install_default_drivers();

    let options = if dsn.contains(":memory:") {
        AnyPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        AnyPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
    };

    let pool = options.connect(dsn).await?;
    debug!("database pool ready");
    Ok(pool)
}
