//! Recipe Box - a small recipe-keeping REST API
//!
//! ## Endpoints
//!
//! Public:
//! - `POST /login/` - Exchange credentials for a token
//! - `GET /recipes/` - Active recipes, without bodies
//! - `GET /labels/` - All labels
//! - `GET /recipe/:id/labels/` - Labels on a recipe
//! - `GET /label/:id/recipes/` - Recipes carrying a label
//!
//! With an `x-access-token` header:
//! - `GET /recipes/full/`, `POST /recipe/`
//! - `GET|PUT|DELETE /recipe/:id/`, `DELETE /recipe/:id/hard`,
//!   `PUT /recipe/:id/restore`
//! - `PUT|DELETE /recipe/:id/label/:label_id`, `PUT /label/:name`
//! - `GET /recipe/:id/notes/`, `POST /recipe/:id/note/`
//! - `PUT|DELETE /note/:id`, `PUT /note/:id/flag`, `PUT /note/:id/unflag`
//!
//! Debug mode only: `GET /debug/getToken/`, `GET /debug/checkToken/`,
//! `POST /debug/hash/`

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod types;

pub use config::{AppState, Config};
pub use routes::router;
