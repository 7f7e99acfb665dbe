//! Router construction
//!
//! Public routes are open to anyone. Private routes sit behind
//! [`auth_required`] and the `/debug` routes behind [`debug_required`].
//! Every path answers both with and without a trailing slash.

use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{auth_required, debug_required, TOKEN_HEADER};
use crate::config::{AppState, Config};
use crate::error::attach_error_detail;
use crate::handlers::*;

/// Register a route under its path and the same path with the trailing
/// slash toggled.
trait RouteEitherSlash {
    fn route_slashed(self, path: &str, method_router: MethodRouter<AppState>) -> Self;
}

impl RouteEitherSlash for Router<AppState> {
    fn route_slashed(self, path: &str, method_router: MethodRouter<AppState>) -> Self {
        let twin = match path.strip_suffix('/') {
            Some(bare) => bare.to_string(),
            None => format!("{path}/"),
        };
        self.route(path, method_router.clone())
            .route(&twin, method_router)
    }
}

/// Build the application router around `state`.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route_slashed("/login/", post(login_handler))
        .route_slashed("/recipes/", get(list_recipes_handler))
        .route_slashed("/labels/", get(list_labels_handler))
        .route_slashed("/recipe/:id/labels/", get(recipe_labels_handler))
        .route_slashed("/label/:label/recipes/", get(label_recipes_handler));

    let private = Router::new()
        // Recipes
        .route_slashed("/recipes/full/", get(list_full_recipes_handler))
        .route_slashed("/recipe/", post(create_recipe_handler))
        .route_slashed(
            "/recipe/:id/",
            get(get_recipe_handler)
                .put(update_recipe_handler)
                .delete(soft_delete_recipe_handler),
        )
        .route_slashed("/recipe/:id/hard", delete(hard_delete_recipe_handler))
        .route_slashed("/recipe/:id/restore", put(restore_recipe_handler))
        // Labels
        .route_slashed(
            "/recipe/:id/label/:label",
            put(tag_recipe_handler).delete(untag_recipe_handler),
        )
        .route_slashed("/label/:label", put(add_label_handler))
        // Notes
        .route_slashed("/recipe/:id/notes/", get(list_notes_handler))
        .route_slashed("/recipe/:id/note/", post(create_note_handler))
        .route_slashed(
            "/note/:id",
            put(edit_note_handler).delete(delete_note_handler),
        )
        .route_slashed("/note/:id/flag", put(flag_note_handler))
        .route_slashed("/note/:id/unflag", put(unflag_note_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_required));

    let debug = Router::new()
        .route_slashed("/getToken/", get(debug_token_handler))
        .route_slashed("/checkToken/", get(debug_check_token_handler))
        .route_slashed("/hash/", post(debug_hash_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), debug_required));

    Router::new()
        .merge(public)
        .merge(private)
        .nest("/debug", debug)
        .layer(middleware::from_fn_with_state(state.clone(), attach_error_detail))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Debug mode allows any origin; otherwise only the configured list.
fn cors_layer(config: &Config) -> CorsLayer {
    if config.debug {
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    }

    // Config::validate rejects bad or wildcard origins. If it was skipped,
    // an unusable list allows no cross-origin requests at all.
    let origins = config.origin_headers().unwrap_or_default();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(TOKEN_HEADER)])
}
