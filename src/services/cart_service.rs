//! Cart reconciliation.
//!
//! Keeps the visible cart consistent with server-authoritative stock.
//! Every mutation is gated by a client-side stock-ceiling check against
//! the loaded catalog snapshot (a violation is terminal and sends no
//! request), and every accepted or rejected mutation is followed by a
//! wholesale reload of the cart, so the local view never drifts from the
//! server's after an error.

use crate::{
    errors::ApiError,
    models::{
        cart::{AddToCartRequest, CartLine},
        product::Product,
    },
    services::api_client::ApiClient,
};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Shown when the server rejects a mutation without a message of its own.
const REJECTION_FALLBACK: &str = "Cart update failed. Please try again.";

#[derive(Debug, Error)]
pub enum CartError {
    /// The product is not part of the currently loaded catalog.
    #[error("product {0} is not in the loaded catalog")]
    UnknownProduct(i64),

    /// The line targeted by id is not present in the cart.
    #[error("cart line {0} is not present")]
    UnknownLine(i64),

    /// Client-side stock ceiling violation. Terminal: no request was sent.
    #[error(
        "only {stock} unit(s) of product {product_id} in stock ({in_cart} already in cart, {requested} requested)"
    )]
    StockExceeded {
        product_id: i64,
        stock: u32,
        in_cart: u32,
        requested: u32,
    },

    /// The server refused the mutation. Carries the server's message
    /// verbatim when one was provided, else a generic fallback.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Client-side view of one cart session.
///
/// Owns the session identity, the line list with its product→line index,
/// and a catalog snapshot used for stock-ceiling checks. The index is
/// rebuilt wholesale on every reload, never patched in place.
pub struct CartService {
    api: ApiClient,
    session_id: String,
    lines: Vec<CartLine>,
    by_product: HashMap<i64, usize>,
    products: HashMap<i64, Product>,
    count_tx: watch::Sender<u32>,
}

impl CartService {
    pub fn new(api: ApiClient, session_id: impl Into<String>) -> Self {
        let (count_tx, _) = watch::channel(0);
        Self {
            api,
            session_id: session_id.into(),
            lines: Vec::new(),
            by_product: HashMap::new(),
            products: HashMap::new(),
            count_tx,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Current lines, in the order the server returned them.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line_for(&self, product_id: i64) -> Option<&CartLine> {
        self.by_product.get(&product_id).map(|&index| &self.lines[index])
    }

    /// Sum of quantities across all lines.
    pub fn count(&self) -> u32 {
        *self.count_tx.borrow()
    }

    /// Watch the running item count, e.g. for a cart badge. The value is
    /// republished after every successful mutation.
    pub fn subscribe_count(&self) -> watch::Receiver<u32> {
        self.count_tx.subscribe()
    }

    /// Sum of price × quantity across all lines.
    pub fn total(&self) -> f64 {
        self.lines
            .iter()
            .map(|line| line.product.price * f64::from(line.quantity))
            .sum()
    }

    /// Replace the catalog snapshot used for stock-ceiling checks.
    pub fn set_products(&mut self, products: impl IntoIterator<Item = Product>) {
        self.products = products.into_iter().map(|p| (p.id, p)).collect();
    }

    /// Fetch the catalog from the API and install it as the snapshot.
    pub async fn refresh_catalog(&mut self, category_id: Option<i64>) -> Result<(), ApiError> {
        let products = self.api.get_products(category_id).await?;
        self.set_products(products);
        Ok(())
    }

    /// Add `quantity` units of a product to the cart.
    pub async fn add_to_cart(&mut self, product_id: i64, quantity: u32) -> Result<(), CartError> {
        self.check_stock(product_id, quantity)?;
        let request = AddToCartRequest {
            session_id: self.session_id.clone(),
            product_id,
            quantity,
        };
        if let Err(err) = self.api.add_to_cart(&request).await {
            return Err(self.rejected(err).await);
        }
        self.reload().await?;
        Ok(())
    }

    /// Bump an existing line by one. Same ceiling check as `add_to_cart`.
    pub async fn increase_quantity(
        &mut self,
        line_id: i64,
        product_id: i64,
    ) -> Result<(), CartError> {
        self.check_stock(product_id, 1)?;
        let current = self.line_by_id(line_id)?.quantity;
        if let Err(err) = self.api.update_quantity(line_id, current + 1).await {
            return Err(self.rejected(err).await);
        }
        self.reload().await?;
        Ok(())
    }

    /// Drop a line's quantity by one; a line that would hit zero is removed
    /// instead. Decreasing never needs a stock check.
    pub async fn decrease_quantity(&mut self, line_id: i64) -> Result<(), CartError> {
        let current = self.line_by_id(line_id)?.quantity;
        let result = if current > 1 {
            self.api.update_quantity(line_id, current - 1).await
        } else {
            self.api.remove_line(line_id).await
        };
        if let Err(err) = result {
            return Err(self.rejected(err).await);
        }
        self.reload().await?;
        Ok(())
    }

    /// Remove a line unconditionally. Confirmation is the caller's concern.
    pub async fn remove_item(&mut self, line_id: i64) -> Result<(), CartError> {
        if let Err(err) = self.api.remove_line(line_id).await {
            return Err(self.rejected(err).await);
        }
        self.reload().await?;
        Ok(())
    }

    /// Empty the whole cart. Confirmation is the caller's concern.
    pub async fn clear(&mut self) -> Result<(), CartError> {
        if let Err(err) = self.api.clear_cart(&self.session_id).await {
            return Err(self.rejected(err).await);
        }
        self.reload().await?;
        Ok(())
    }

    /// Fetch the authoritative cart and rebuild local state wholesale.
    pub async fn reload(&mut self) -> Result<(), CartError> {
        let lines = self.api.get_cart(&self.session_id).await.map_err(CartError::Api)?;
        self.by_product = lines
            .iter()
            .enumerate()
            .map(|(index, line)| (line.product.id, index))
            .collect();
        self.lines = lines;
        let count = self.lines.iter().map(|line| line.quantity).sum();
        self.count_tx.send_replace(count);
        debug!("cart reloaded: {} line(s), {} item(s)", self.lines.len(), count);
        Ok(())
    }

    /// Check that `additional` more units of a product fit under its stock
    /// ceiling. Uses the catalog snapshot, not the line's embedded product.
    fn check_stock(&self, product_id: i64, additional: u32) -> Result<(), CartError> {
        let product = self
            .products
            .get(&product_id)
            .ok_or(CartError::UnknownProduct(product_id))?;
        let in_cart = self.line_for(product_id).map(|line| line.quantity).unwrap_or(0);
        if product.stock == 0 || in_cart + additional > product.stock {
            return Err(CartError::StockExceeded {
                product_id,
                stock: product.stock,
                in_cart,
                requested: additional,
            });
        }
        Ok(())
    }

    fn line_by_id(&self, line_id: i64) -> Result<&CartLine, CartError> {
        self.lines
            .iter()
            .find(|line| line.id == line_id)
            .ok_or(CartError::UnknownLine(line_id))
    }

    /// Convert a server-side rejection into a user-facing error, reloading
    /// first so local state is not left optimistic.
    async fn rejected(&mut self, err: ApiError) -> CartError {
        warn!("cart mutation rejected: {}", err);
        if let Err(reload_err) = self.reload().await {
            warn!("cart resync after rejection failed: {}", reload_err);
        }
        CartError::Rejected(err.message_or(REJECTION_FALLBACK))
    }
}
