//! Product categories.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Storage URL or key of the category image, if any.
    #[serde(default)]
    pub image: Option<String>,
}
