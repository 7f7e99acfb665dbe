//! Label entity - a unique, lowercase tag that recipes can carry.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Label {
    #[sqlx(rename = "label_id")]
    pub id: i64,

    #[sqlx(rename = "label")]
    pub name: String,
}

impl Label {
    /// Names are stored lowercased so lookups are case-insensitive.
    pub fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

/// Result of asking for a label by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOutcome {
    Existing(Label),
    Created(Label),
}

impl LabelOutcome {
    pub fn label(&self) -> &Label {
        match self {
            LabelOutcome::Existing(label) | LabelOutcome::Created(label) => label,
        }
    }

    pub fn into_label(self) -> Label {
        match self {
            LabelOutcome::Existing(label) | LabelOutcome::Created(label) => label,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, LabelOutcome::Created(_))
    }
}

/// Result of linking a recipe to a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    Linked,
    AlreadyLinked,
}
