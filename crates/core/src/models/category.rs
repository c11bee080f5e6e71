//! Catalog categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::CategoryId;

/// A product category.
///
/// Categories are ordered by `display_order` when listed. Deleting one does
/// not touch the products that reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}
