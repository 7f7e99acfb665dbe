//! Recipe entity.
//!
//! A recipe is soft-deleted by setting its `deleted` flag; it stays
//! addressable by id until hard-deleted along with its links and notes.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{flag_to_bool, Label};
use crate::db::error::{DbError, DbResult};

/// Recipe as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    /// Omitted from summary listings.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub body: Option<String>,
    pub total_time: i64,
    pub active_time: i64,
    pub deleted: bool,
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Raw `recipe` row.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub recipe_id: i64,
    pub title: String,
    pub recipe_body: String,
    pub total_time: i64,
    pub active_time: i64,
    pub deleted: i64,
}

impl RecipeRow {
    pub fn into_recipe(self, include_body: bool) -> Recipe {
        Recipe {
            id: self.recipe_id,
            title: self.title,
            body: include_body.then_some(self.recipe_body),
            total_time: self.total_time,
            active_time: self.active_time,
            deleted: flag_to_bool(self.deleted),
            labels: Vec::new(),
        }
    }
}

/// Fields accepted when creating or updating a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub title: String,
    pub body: String,
    pub active_time: i64,
    pub total_time: i64,
}

impl RecipeDraft {
    pub fn validate(&self) -> DbResult<()> {
        if self.title.trim().is_empty() {
            return Err(DbError::InvalidData("title is required".into()));
        }
        if self.active_time < 0 {
            return Err(DbError::InvalidData(
                "activeTime must be a non-negative integer".into(),
            ));
        }
        if self.total_time < 0 {
            return Err(DbError::InvalidData(
                "totalTime must be a non-negative integer".into(),
            ));
        }
        Ok(())
    }
}

/// Recipes from a listing query.
///
/// Label loading is best-effort per recipe: a failure leaves that recipe with
/// no labels and the first error is kept here instead of failing the list.
#[derive(Debug, Default)]
pub struct RecipeListing {
    pub recipes: Vec<Recipe>,
    pub label_error: Option<DbError>,
}
