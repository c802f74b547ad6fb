//! Cart wire types: lines as returned by the API and mutation requests.

use crate::models::product::Product;
use serde::{Deserialize, Serialize};

/// One (product, quantity) entry in a cart, as returned by `GET /cart`.
///
/// The server embeds a snapshot of the product in every line; the line id
/// is server-assigned and opaque to the client.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: i64,
    pub quantity: u32,
    pub product: Product,
}

impl CartLine {
    pub fn product_id(&self) -> i64 {
        self.product.id
    }
}

/// Body of `POST /cart/add`.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub session_id: String,
    pub product_id: i64,
    pub quantity: u32,
}

/// Body of `PATCH /cart/{lineId}`.
#[derive(Serialize, Deserialize, Debug)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}
