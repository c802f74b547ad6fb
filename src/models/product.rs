//! Catalog products and their specification rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog product as served by the REST API.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub price: f64,

    /// Strike-through price, when the product is discounted.
    #[serde(default)]
    pub old_price: Option<f64>,

    /// Units available; the ceiling for every cart quantity check.
    pub stock: u32,

    #[serde(default)]
    pub category_id: Option<i64>,

    /// Ordered gallery of storage URLs.
    #[serde(default)]
    pub images: Vec<String>,

    /// Single-image field from before the gallery existed. Consulted only
    /// when `images` is absent or empty.
    #[serde(default)]
    pub image: Option<String>,

    /// Storage URL or key of the product video, if any.
    #[serde(default)]
    pub video: Option<String>,

    #[serde(default)]
    pub specifications: Vec<Specification>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One name/value row in a product's specification table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Specification {
    pub name: String,
    pub value: String,
}
