//! Recipe repository - listing, CRUD and the soft/hard delete lifecycle.

use sqlx::AnyPool;
use tracing::{debug, warn};

use super::LabelRepository;
use crate::db::entities::{Recipe, RecipeDraft, RecipeListing, RecipeRow};
use crate::db::error::{DbError, DbResult};

const RECIPE_COLUMNS: &str =
    "recipe_id, title, recipe_body, total_time, active_time, deleted";

/// Repository for recipe operations.
#[derive(Clone)]
pub struct RecipeRepository {
    pool: AnyPool,
    labels: LabelRepository,
}

impl RecipeRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self {
            labels: LabelRepository::new(pool.clone()),
            pool,
        }
    }

    /// Get a recipe by ID, soft-deleted or not.
    pub async fn find_by_id(&self, id: i64, with_labels: bool) -> DbResult<Recipe> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM `recipe` WHERE recipe_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("recipe", id))?;

        let mut recipe = row.into_recipe(true);
        if with_labels {
            recipe.labels = self.labels.for_recipe(id).await?;
        }
        Ok(recipe)
    }

    /// Check whether a recipe row exists (deleted flag ignored).
    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        super::row_exists(
            &self.pool,
            "SELECT COUNT(*) FROM `recipe` WHERE recipe_id = ?",
            id,
        )
        .await
    }

    /// All recipes that are not soft-deleted, each with its labels.
    pub async fn list_active(&self, include_body: bool) -> DbResult<RecipeListing> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM `recipe` WHERE deleted = 0 ORDER BY recipe_id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(self.with_labels(rows, include_body).await)
    }

    /// Active recipes carrying the given label.
    pub async fn list_for_label(&self, label_id: i64) -> DbResult<RecipeListing> {
        let rows = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT r.recipe_id, r.title, r.recipe_body, r.total_time, r.active_time, r.deleted
            FROM `recipe` r
            JOIN `recipe_label` rl ON rl.recipe_id = r.recipe_id
            WHERE rl.label_id = ? AND r.deleted = 0
            ORDER BY r.recipe_id ASC
            "#,
        )
        .bind(label_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(self.with_labels(rows, false).await)
    }

    async fn with_labels(&self, rows: Vec<RecipeRow>, include_body: bool) -> RecipeListing {
        let mut listing = RecipeListing::default();

        for row in rows {
            let mut recipe = row.into_recipe(include_body);
            match self.labels.for_recipe(recipe.id).await {
                Ok(labels) => recipe.labels = labels,
                Err(e) => {
                    debug!(recipe_id = recipe.id, error = %e, "could not load labels");
                    listing.label_error.get_or_insert(e);
                }
            }
            listing.recipes.push(recipe);
        }

        listing
    }

    /// Create a new recipe.
    pub async fn create(&self, draft: &RecipeDraft) -> DbResult<Recipe> {
        draft.validate()?;

        let result = sqlx::query(
            r#"
            INSERT INTO `recipe` (title, recipe_body, total_time, active_time, deleted)
            VALUES (?, ?, ?, ?, 0)
            "#,
        )
        .bind(draft.title.as_str())
        .bind(draft.body.as_str())
        .bind(draft.total_time)
        .bind(draft.active_time)
        .execute(&self.pool)
        .await?;

        let id = result
            .last_insert_id()
            .ok_or_else(|| DbError::InvalidData("store did not report a recipe id".into()))?;

        debug!(recipe_id = id, title = %draft.title, "created recipe");
        Ok(Recipe {
            id,
            title: draft.title.clone(),
            body: Some(draft.body.clone()),
            total_time: draft.total_time,
            active_time: draft.active_time,
            deleted: false,
            labels: Vec::new(),
        })
    }

    /// Update a recipe in place. Does not check that the recipe exists;
    /// returns the number of rows touched (zero for an unknown id).
    pub async fn update(&self, id: i64, draft: &RecipeDraft) -> DbResult<u64> {
        draft.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE `recipe`
            SET title = ?, recipe_body = ?, total_time = ?, active_time = ?
            WHERE recipe_id = ?
            "#,
        )
        .bind(draft.title.as_str())
        .bind(draft.body.as_str())
        .bind(draft.total_time)
        .bind(draft.active_time)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!(recipe_id = id, "update matched no recipe");
        }
        Ok(result.rows_affected())
    }

    /// Mark a recipe deleted. Idempotent.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        self.set_deleted(id, true).await
    }

    /// Clear the deleted mark. Idempotent.
    pub async fn restore(&self, id: i64) -> DbResult<()> {
        self.set_deleted(id, false).await
    }

    async fn set_deleted(&self, id: i64, deleted: bool) -> DbResult<()> {
        sqlx::query("UPDATE `recipe` SET deleted = ? WHERE recipe_id = ?")
            .bind(i64::from(deleted))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Remove a recipe together with its label links and notes.
    ///
    /// All three deletes run in one transaction; nothing is removed unless
    /// every step succeeds. Unknown ids are a no-op.
    pub async fn hard_delete(&self, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM `recipe_label` WHERE recipe_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM `note` WHERE recipe_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let removed = sqlx::query("DELETE FROM `recipe` WHERE recipe_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(recipe_id = id, rows = removed.rows_affected(), "hard-deleted recipe");
        Ok(())
    }
}
