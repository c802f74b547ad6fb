//! Typed REST client for the storefront backend.
//!
//! Thin wrapper over one shared `reqwest::Client`: every call targets
//! `{base_url}{path}`, decodes JSON on success, and turns a non-success
//! status into [`ApiError::Rejected`] carrying the server's message when
//! the body provides one. Entity saves use the backend's multipart
//! convention — one JSON metadata part plus binary parts for new files.

use crate::{
    config::AppConfig,
    errors::ApiError,
    models::{
        cart::{AddToCartRequest, CartLine, UpdateQuantityRequest},
        category::Category,
        news::NewsItem,
        product::Product,
    },
};
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(cfg: &AppConfig) -> Self {
        Self::with_base_url(cfg.api_base_url.clone())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Pass a successful response through; turn anything else into
    /// `Rejected`, probing the body for a server-provided message.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Rejected {
            status,
            message: extract_server_message(&body),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!("GET {}", path);
        let response = self.http.get(self.url(path)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        debug!("DELETE {}", path);
        let response = self.http.delete(self.url(path)).send().await?;
        Self::check(response).await.map(drop)
    }

    // --- Cart ---

    pub async fn get_cart(&self, session_id: &str) -> Result<Vec<CartLine>, ApiError> {
        self.get_json(&format!("/cart?sessionId={}", session_id)).await
    }

    pub async fn add_to_cart(&self, request: &AddToCartRequest) -> Result<(), ApiError> {
        debug!("POST /cart/add product {}", request.product_id);
        let response = self.http.post(self.url("/cart/add")).json(request).send().await?;
        Self::check(response).await.map(drop)
    }

    pub async fn update_quantity(&self, line_id: i64, quantity: u32) -> Result<(), ApiError> {
        debug!("PATCH /cart/{} quantity {}", line_id, quantity);
        let response = self
            .http
            .patch(self.url(&format!("/cart/{}", line_id)))
            .json(&UpdateQuantityRequest { quantity })
            .send()
            .await?;
        Self::check(response).await.map(drop)
    }

    pub async fn remove_line(&self, line_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/cart/{}", line_id)).await
    }

    pub async fn clear_cart(&self, session_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/cart?sessionId={}", session_id)).await
    }

    // --- Catalog ---

    pub async fn get_products(&self, category_id: Option<i64>) -> Result<Vec<Product>, ApiError> {
        let path = match category_id {
            Some(id) => format!("/products?categoryId={}", id),
            None => "/products".to_string(),
        };
        self.get_json(&path).await
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, ApiError> {
        self.get_json(&format!("/products/{}", id)).await
    }

    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_json("/categories").await
    }

    pub async fn get_news(&self) -> Result<Vec<NewsItem>, ApiError> {
        self.get_json("/news").await
    }

    pub async fn get_news_item(&self, id: i64) -> Result<NewsItem, ApiError> {
        self.get_json(&format!("/news/{}", id)).await
    }

    // --- Admin: entity saves (multipart) and deletes ---

    pub async fn create_product(&self, form: Form) -> Result<(), ApiError> {
        self.post_multipart("/products", form).await
    }

    pub async fn update_product(&self, id: i64, form: Form) -> Result<(), ApiError> {
        self.patch_multipart(&format!("/products/{}", id), form).await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/products/{}", id)).await
    }

    pub async fn create_news(&self, form: Form) -> Result<(), ApiError> {
        self.post_multipart("/news", form).await
    }

    pub async fn update_news(&self, id: i64, form: Form) -> Result<(), ApiError> {
        self.patch_multipart(&format!("/news/{}", id), form).await
    }

    pub async fn delete_news(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/news/{}", id)).await
    }

    pub async fn create_category(&self, form: Form) -> Result<(), ApiError> {
        self.post_multipart("/categories", form).await
    }

    pub async fn update_category(&self, id: i64, form: Form) -> Result<(), ApiError> {
        self.patch_multipart(&format!("/categories/{}", id), form).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/categories/{}", id)).await
    }

    async fn post_multipart(&self, path: &str, form: Form) -> Result<(), ApiError> {
        debug!("POST {} (multipart)", path);
        let response = self.http.post(self.url(path)).multipart(form).send().await?;
        Self::check(response).await.map(drop)
    }

    async fn patch_multipart(&self, path: &str, form: Form) -> Result<(), ApiError> {
        debug!("PATCH {} (multipart)", path);
        let response = self.http.patch(self.url(path)).multipart(form).send().await?;
        Self::check(response).await.map(drop)
    }
}

/// Probe an error body for a human-readable message.
///
/// The backend reports errors as JSON with a `message` field; some proxies
/// in front of it use `error` instead. Anything unparseable yields `None`
/// and callers fall back to a generic string.
fn extract_server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for field in ["message", "error"] {
        if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::extract_server_message;

    #[test]
    fn message_field_is_preferred() {
        let body = r#"{"message":"Not enough stock","error":"ignored"}"#;
        assert_eq!(extract_server_message(body).as_deref(), Some("Not enough stock"));
    }

    #[test]
    fn error_field_is_a_fallback() {
        let body = r#"{"error":"bucket `media` not found","status":404}"#;
        assert_eq!(
            extract_server_message(body).as_deref(),
            Some("bucket `media` not found")
        );
    }

    #[test]
    fn unparseable_bodies_yield_none() {
        assert_eq!(extract_server_message("<html>502</html>"), None);
        assert_eq!(extract_server_message(""), None);
        assert_eq!(extract_server_message(r#"{"message":""}"#), None);
    }
}
