//! Note repository - notes attached to recipes.

use chrono::Utc;
use sqlx::AnyPool;
use tracing::debug;

use crate::db::entities::{Note, NoteRow};
use crate::db::error::{DbError, DbResult};

const NOTE_COLUMNS: &str = "note_id, recipe_id, create_date, note, flagged";

/// Repository for note operations.
#[derive(Clone)]
pub struct NoteRepository {
    pool: AnyPool,
}

impl NoteRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Get a note by ID.
    pub async fn find_by_id(&self, id: i64) -> DbResult<Note> {
        sqlx::query_as::<_, NoteRow>(&format!(
            "SELECT {NOTE_COLUMNS} FROM `note` WHERE note_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Note::from)
        .ok_or_else(|| DbError::not_found("note", id))
    }

    /// Notes for a recipe, oldest first.
    pub async fn for_recipe(&self, recipe_id: i64) -> DbResult<Vec<Note>> {
        let rows = sqlx::query_as::<_, NoteRow>(&format!(
            "SELECT {NOTE_COLUMNS} FROM `note` WHERE recipe_id = ? ORDER BY create_date ASC, note_id ASC"
        ))
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Note::from).collect())
    }

    /// Attach a new, unflagged note to an existing recipe.
    pub async fn create(&self, recipe_id: i64, text: &str) -> DbResult<Note> {
        if !super::row_exists(
            &self.pool,
            "SELECT COUNT(*) FROM `recipe` WHERE recipe_id = ?",
            recipe_id,
        )
        .await?
        {
            return Err(DbError::not_found("recipe", recipe_id));
        }

        let create_date = Utc::now().timestamp();
        let result = sqlx::query(
            "INSERT INTO `note` (recipe_id, create_date, note, flagged) VALUES (?, ?, ?, 0)",
        )
        .bind(recipe_id)
        .bind(create_date)
        .bind(text)
        .execute(&self.pool)
        .await?;

        let id = result
            .last_insert_id()
            .ok_or_else(|| DbError::InvalidData("store did not report a note id".into()))?;

        debug!(note_id = id, recipe_id, "created note");
        Ok(Note {
            id,
            recipe_id,
            create_date,
            text: text.to_string(),
            flagged: false,
        })
    }

    /// Replace a note's text.
    pub async fn set_text(&self, id: i64, text: &str) -> DbResult<()> {
        self.ensure_exists(id).await?;

        sqlx::query("UPDATE `note` SET note = ? WHERE note_id = ?")
            .bind(text)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Flag or unflag a note.
    pub async fn set_flag(&self, id: i64, flagged: bool) -> DbResult<()> {
        self.ensure_exists(id).await?;

        sqlx::query("UPDATE `note` SET flagged = ? WHERE note_id = ?")
            .bind(i64::from(flagged))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete a note. Unknown ids are a no-op.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM `note` WHERE note_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn ensure_exists(&self, id: i64) -> DbResult<()> {
        if super::row_exists(&self.pool, "SELECT COUNT(*) FROM `note` WHERE note_id = ?", id).await? {
            Ok(())
        } else {
            Err(DbError::not_found("note", id))
        }
    }
}
