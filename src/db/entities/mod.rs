//! Entity definitions for the recipe store.
//!
//! Row types (`*Row`) mirror the table columns and are what `sqlx` decodes;
//! the public entities are what the HTTP layer serializes.

pub mod label;
pub mod note;
pub mod recipe;
pub mod user;

pub use label::*;
pub use note::*;
pub use recipe::*;
pub use user::*;

/// Flags are stored as integers so both dialects decode them the same way.
pub(crate) fn flag_to_bool(value: i64) -> bool {
    value != 0
}
