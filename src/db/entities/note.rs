//! Note entity - free text attached to a recipe, optionally flagged.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::flag_to_bool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub recipe_id: i64,
    /// Seconds since the Unix epoch.
    pub create_date: i64,
    pub text: String,
    pub flagged: bool,
}

/// Raw `note` row.
#[derive(Debug, Clone, FromRow)]
pub struct NoteRow {
    pub note_id: i64,
    pub recipe_id: i64,
    pub create_date: i64,
    pub note: String,
    pub flagged: i64,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Self {
            id: row.note_id,
            recipe_id: row.recipe_id,
            create_date: row.create_date,
            text: row.note,
            flagged: flag_to_bool(row.flagged),
        }
    }
}
