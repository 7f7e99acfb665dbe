//! Label repository - lookup and idempotent creation of labels.

use sqlx::AnyPool;
use tracing::debug;

use crate::db::entities::{Label, LabelOutcome};
use crate::db::error::{DbError, DbResult};

/// Repository for label operations.
#[derive(Clone)]
pub struct LabelRepository {
    pool: AnyPool,
}

impl LabelRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Get a label by its (already normalized) name.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Label>> {
        let label =
            sqlx::query_as::<_, Label>("SELECT label_id, label FROM `label` WHERE label = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(label)
    }

    /// List all labels.
    pub async fn find_all(&self) -> DbResult<Vec<Label>> {
        let labels =
            sqlx::query_as::<_, Label>("SELECT label_id, label FROM `label` ORDER BY label ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(labels)
    }

    /// Labels linked to a recipe.
    pub async fn for_recipe(&self, recipe_id: i64) -> DbResult<Vec<Label>> {
        let labels = sqlx::query_as::<_, Label>(
            r#"
            SELECT l.label_id, l.label
            FROM `label` l
            JOIN `recipe_label` rl ON rl.label_id = l.label_id
            WHERE rl.recipe_id = ?
            ORDER BY l.label ASC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(labels)
    }

    /// Get or create a label by name. The name is lowercased first, so
    /// "Chicken" and "chicken" resolve to the same row.
    pub async fn add(&self, name: &str) -> DbResult<LabelOutcome> {
        let name = Label::normalize(name);
        if name.is_empty() {
            return Err(DbError::InvalidData("label name is required".into()));
        }

        if let Some(label) = self.find_by_name(&name).await? {
            return Ok(LabelOutcome::Existing(label));
        }

        let result = match sqlx::query("INSERT INTO `label` (label) VALUES (?)")
            .bind(name.as_str())
            .execute(&self.pool)
            .await
        {
            Ok(result) => result,
            Err(e) if super::is_unique_violation(&e) => {
                // Another request created it between the lookup and the insert.
                let label = self
                    .find_by_name(&name)
                    .await?
                    .ok_or_else(|| DbError::InvalidData(format!("label {name} vanished after insert")))?;
                return Ok(LabelOutcome::Existing(label));
            }
            Err(e) => return Err(e.into()),
        };

        let id = match result.last_insert_id() {
            Some(id) => id,
            None => self
                .find_by_name(&name)
                .await?
                .map(|label| label.id)
                .ok_or_else(|| DbError::InvalidData(format!("label {name} vanished after insert")))?,
        };

        debug!(label_id = id, label = %name, "created label");
        Ok(LabelOutcome::Created(Label { id, name }))
    }
}
