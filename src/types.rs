//! Request forms and response bodies for the HTTP endpoints

use serde::{Deserialize, Serialize};

use crate::db::RecipeDraft;
use crate::error::ApiError;

// ═══════════════════════════════════════════════════════════════════════════
// Requests
// ═══════════════════════════════════════════════════════════════════════════

/// Form body for `POST /login/`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Form body for creating or updating a recipe.
///
/// Times arrive as text so a bad value can be reported by field name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub active_time: Option<String>,
    pub total_time: Option<String>,
}

impl RecipeForm {
    pub fn into_draft(self) -> Result<RecipeDraft, ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation("title is required".into()));
        }
        let active_time = parse_minutes("activeTime", self.active_time.as_deref())?;
        let total_time = parse_minutes("totalTime", self.total_time.as_deref())?;

        Ok(RecipeDraft {
            title: self.title,
            body: self.body,
            active_time,
            total_time,
        })
    }
}

fn parse_minutes(field: &str, raw: Option<&str>) -> Result<i64, ApiError> {
    let value: i64 = raw
        .map(str::trim)
        .unwrap_or_default()
        .parse()
        .map_err(|_| ApiError::Validation(format!("{field} must be an integer")))?;

    if value < 0 {
        return Err(ApiError::Validation(format!(
            "{field} must be a non-negative integer"
        )));
    }
    Ok(value)
}

/// Form body for creating or editing a note.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteForm {
    #[serde(default)]
    pub text: String,
}

/// Form body for `POST /debug/hash/`
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordForm {
    #[serde(default)]
    pub password: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// Responses
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashResponse {
    pub hash: String,
}
