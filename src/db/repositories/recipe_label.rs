//! Recipe/label links - idempotent tagging and untagging.

use sqlx::AnyPool;
use tracing::debug;

use crate::db::entities::TagOutcome;
use crate::db::error::{DbError, DbResult};

/// Repository for the `recipe_label` link table.
#[derive(Clone)]
pub struct RecipeLabelRepository {
    pool: AnyPool,
}

impl RecipeLabelRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Check whether a recipe is linked to a label.
    pub async fn exists(&self, recipe_id: i64, label_id: i64) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM `recipe_label` WHERE recipe_id = ? AND label_id = ?",
        )
        .bind(recipe_id)
        .bind(label_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Link a recipe to a label.
    ///
    /// Both sides must exist. Linking an already-linked pair succeeds
    /// without writing anything.
    pub async fn tag(&self, recipe_id: i64, label_id: i64) -> DbResult<TagOutcome> {
        if !super::row_exists(
            &self.pool,
            "SELECT COUNT(*) FROM `recipe` WHERE recipe_id = ?",
            recipe_id,
        )
        .await?
        {
            return Err(DbError::not_found("recipe", recipe_id));
        }
        if !super::row_exists(
            &self.pool,
            "SELECT COUNT(*) FROM `label` WHERE label_id = ?",
            label_id,
        )
        .await?
        {
            return Err(DbError::not_found("label", label_id));
        }

        if self.exists(recipe_id, label_id).await? {
            return Ok(TagOutcome::AlreadyLinked);
        }

        let inserted = sqlx::query("INSERT INTO `recipe_label` (recipe_id, label_id) VALUES (?, ?)")
            .bind(recipe_id)
            .bind(label_id)
            .execute(&self.pool)
            .await;

        match inserted {
            Ok(_) => {}
            Err(e) if super::is_unique_violation(&e) => return Ok(TagOutcome::AlreadyLinked),
            Err(e) => return Err(e.into()),
        }

        debug!(recipe_id, label_id, "linked recipe to label");
        Ok(TagOutcome::Linked)
    }

    /// Remove a link if present. Always succeeds for missing links.
    pub async fn untag(&self, recipe_id: i64, label_id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM `recipe_label` WHERE recipe_id = ? AND label_id = ?")
            .bind(recipe_id)
            .bind(label_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
