//! HTTP request handlers
//!
//! Each handler parses its path/form input, calls one repository operation
//! and returns either a JSON body or a bare status code. Errors are returned
//! as [`ApiError`] and turned into responses in one place.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Form, Json,
};
use tracing::{info, warn};

use crate::auth::{self, TOKEN_HEADER};
use crate::config::AppState;
use crate::db::{Label, Note, Recipe, RecipeListing, TagOutcome};
use crate::error::{ApiError, DbResultExt};
use crate::types::*;

fn parse_id(raw: &str, entity: &'static str) -> Result<i64, ApiError> {
    raw.trim().parse().map_err(|_| ApiError::BadId(entity))
}

/// Labels are loaded per recipe on a best-effort basis; report a failure once.
fn recipes_from(listing: RecipeListing) -> Vec<Recipe> {
    if let Some(err) = listing.label_error {
        warn!(error = %err, "labels could not be loaded for every recipe");
    }
    listing.recipes
}

// ═══════════════════════════════════════════════════════════════════════════
// Login
// ═══════════════════════════════════════════════════════════════════════════

/// POST /login/
///
/// Exchange a username and password for a token. Unknown users and wrong
/// passwords get the same rejection.
pub async fn login_handler(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .db
        .users
        .find_by_username(&form.username)
        .await
        .or_api("problem loading user")?;

    let Some(user) = user else {
        info!(username = %form.username, "login for unknown user");
        return Err(ApiError::InvalidCredentials);
    };

    if !auth::verify_password(&form.password, &user.password_hash)? {
        info!(username = %user.username, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue()?;
    info!(user_id = user.id, "issued token");
    Ok(Json(TokenResponse { token }))
}

// ═══════════════════════════════════════════════════════════════════════════
// Recipes
// ═══════════════════════════════════════════════════════════════════════════

/// GET /recipes/
///
/// Active recipes without their bodies.
pub async fn list_recipes_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let listing = state
        .db
        .recipes
        .list_active(false)
        .await
        .or_api("Problem loading recipes")?;

    Ok(Json(recipes_from(listing)))
}

/// GET /recipes/full/
pub async fn list_full_recipes_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let listing = state
        .db
        .recipes
        .list_active(true)
        .await
        .or_api("Problem loading recipes")?;

    Ok(Json(recipes_from(listing)))
}

/// GET /recipe/:id/
pub async fn get_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    let id = parse_id(&id, "recipe")?;
    let recipe = state
        .db
        .recipes
        .find_by_id(id, true)
        .await
        .or_api("Problem loading recipe")?;

    Ok(Json(recipe))
}

/// POST /recipe/
pub async fn create_recipe_handler(
    State(state): State<AppState>,
    Form(form): Form<RecipeForm>,
) -> Result<(StatusCode, Json<Recipe>), ApiError> {
    let draft = form.into_draft()?;
    let recipe = state
        .db
        .recipes
        .create(&draft)
        .await
        .or_api("could not create recipe")?;

    Ok((StatusCode::CREATED, Json(recipe)))
}

/// PUT /recipe/:id/
///
/// Updating an id that does not exist is not an error.
pub async fn update_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<RecipeForm>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "recipe")?;
    let draft = form.into_draft()?;
    state
        .db
        .recipes
        .update(id, &draft)
        .await
        .or_api("could not update recipe")?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /recipe/:id/
pub async fn soft_delete_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "recipe")?;
    state
        .db
        .recipes
        .soft_delete(id)
        .await
        .or_api("could not soft-delete recipe")?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /recipe/:id/restore
pub async fn restore_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "recipe")?;
    state
        .db
        .recipes
        .restore(id)
        .await
        .or_api("could not un-delete recipe")?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /recipe/:id/hard
pub async fn hard_delete_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "recipe")?;
    state
        .db
        .recipes
        .hard_delete(id)
        .await
        .or_api("Problem deleting recipe")?;

    Ok(StatusCode::NO_CONTENT)
}

// ═══════════════════════════════════════════════════════════════════════════
// Labels & tagging
// ═══════════════════════════════════════════════════════════════════════════

/// GET /labels/
pub async fn list_labels_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Label>>, ApiError> {
    let labels = state
        .db
        .labels
        .find_all()
        .await
        .or_api("Problem loading labels")?;

    Ok(Json(labels))
}

/// GET /recipe/:id/labels/
pub async fn recipe_labels_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Label>>, ApiError> {
    let id = parse_id(&id, "recipe")?;
    let labels = state
        .db
        .labels
        .for_recipe(id)
        .await
        .or_api("Problem retrieving labels for recipe")?;

    Ok(Json(labels))
}

/// GET /label/:label/recipes/
pub async fn label_recipes_handler(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let label_id = parse_id(&label, "label")?;
    let listing = state
        .db
        .recipes
        .list_for_label(label_id)
        .await
        .or_api("Problem loading recipes for label")?;

    Ok(Json(recipes_from(listing)))
}

/// PUT /label/:label
///
/// 201 with the new label, or 200 with the existing one.
pub async fn add_label_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<Label>), ApiError> {
    let outcome = state
        .db
        .labels
        .add(&name)
        .await
        .or_api("problem creating label")?;

    let status = if outcome.was_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.into_label())))
}

/// PUT /recipe/:id/label/:label_id
///
/// 201 when a link is created, 204 when it already existed.
pub async fn tag_recipe_handler(
    State(state): State<AppState>,
    Path((recipe_id, label_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let recipe_id = parse_id(&recipe_id, "recipe")?;
    let label_id = parse_id(&label_id, "label")?;

    let outcome = state
        .db
        .recipe_labels
        .tag(recipe_id, label_id)
        .await
        .or_api("problem linking recipe to label")?;

    Ok(match outcome {
        TagOutcome::Linked => StatusCode::CREATED,
        TagOutcome::AlreadyLinked => StatusCode::NO_CONTENT,
    })
}

/// DELETE /recipe/:id/label/:label_id
pub async fn untag_recipe_handler(
    State(state): State<AppState>,
    Path((recipe_id, label_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let recipe_id = parse_id(&recipe_id, "recipe")?;
    let label_id = parse_id(&label_id, "label")?;

    state
        .db
        .recipe_labels
        .untag(recipe_id, label_id)
        .await
        .or_api("problem deleting recipe-label link")?;

    Ok(StatusCode::NO_CONTENT)
}

// ═══════════════════════════════════════════════════════════════════════════
// Notes
// ═══════════════════════════════════════════════════════════════════════════

/// GET /recipe/:id/notes/
pub async fn list_notes_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let recipe_id = parse_id(&id, "recipe")?;
    if !state
        .db
        .recipes
        .exists(recipe_id)
        .await
        .or_api("Problem loading recipe")?
    {
        return Err(ApiError::NotFound(format!(
            "No recipe with id={recipe_id} exists"
        )));
    }

    let notes = state
        .db
        .notes
        .for_recipe(recipe_id)
        .await
        .or_api("Problem loading notes")?;

    Ok(Json(notes))
}

/// POST /recipe/:id/note/
pub async fn create_note_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<NoteForm>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let recipe_id = parse_id(&id, "recipe")?;
    let note = state
        .db
        .notes
        .create(recipe_id, &form.text)
        .await
        .or_api("problem creating note")?;

    Ok((StatusCode::CREATED, Json(note)))
}

/// PUT /note/:id
pub async fn edit_note_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<NoteForm>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "note")?;
    state
        .db
        .notes
        .set_text(id, &form.text)
        .await
        .or_api("problem updating note")?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /note/:id/flag
pub async fn flag_note_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    set_note_flag(&state, &id, true).await
}

/// PUT /note/:id/unflag
pub async fn unflag_note_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    set_note_flag(&state, &id, false).await
}

async fn set_note_flag(state: &AppState, id: &str, flagged: bool) -> Result<StatusCode, ApiError> {
    let id = parse_id(id, "note")?;
    state
        .db
        .notes
        .set_flag(id, flagged)
        .await
        .or_api("problem flagging note")?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /note/:id
pub async fn delete_note_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "note")?;
    state
        .db
        .notes
        .delete(id)
        .await
        .or_api("problem deleting note")?;

    Ok(StatusCode::NO_CONTENT)
}

// ═══════════════════════════════════════════════════════════════════════════
// Debug utilities
// ═══════════════════════════════════════════════════════════════════════════

/// GET /debug/getToken/
pub async fn debug_token_handler(
    State(state): State<AppState>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.tokens.issue()?;
    Ok(Json(TokenResponse { token }))
}

/// GET /debug/checkToken/
///
/// Any failure, including a missing or expired token, is a 400 here.
pub async fn debug_check_token_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    match state.tokens.validate(token) {
        Ok(()) => Ok(StatusCode::OK),
        Err(auth::AuthError::Invalid(e)) => Err(ApiError::InvalidToken(e)),
        Err(e) => Err(ApiError::Validation(format!("invalid auth token: {e}"))),
    }
}

/// POST /debug/hash/
pub async fn debug_hash_handler(
    State(state): State<AppState>,
    Form(form): Form<PasswordForm>,
) -> Result<Json<HashResponse>, ApiError> {
    let hash = auth::hash_password(&form.password, state.config.bcrypt_cost)?;
    Ok(Json(HashResponse { hash }))
}
