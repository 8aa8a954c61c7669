//! Remote cart service client.
//!
//! Plain REST/JSON over `reqwest`. Mutations come back in a
//! `{success, message?, cart?}` envelope; a non-2xx status or
//! `success: false` both map to [`ServiceError::Api`] carrying whatever
//! message the service supplied. Server cart payloads are opaque to this
//! client - only counts and the success flag are interpreted.
//!
//! Requests carry no retry policy and no timeout beyond the HTTP stack's
//! defaults: every failure is terminal for that invocation.

use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use voltfront_core::{CartLineId, CartLineItem, ColorId, ProductId, UserId};

use crate::config::CartConfig;

/// Fallback shown when the service rejects a mutation without a message.
const GENERIC_FAILURE_MESSAGE: &str = "Could not update your cart. Please try again.";

/// Errors that can occur when interacting with the cart service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// HTTP request failed before a usable response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status or `success: false`.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ServiceError {
    /// Message suitable for showing to the end user.
    ///
    /// Prefers the message supplied by the service and falls back to a
    /// generic one when the failure carries no usable text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } if !message.is_empty() => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_owned(),
        }
    }
}

/// One cart line as sent to the sync and add endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub product_id: ProductId,
    pub color_id: Option<ColorId>,
    pub quantity: u32,
}

impl From<&CartLineItem> for CartLineInput {
    fn from(line: &CartLineItem) -> Self {
        // added_at stays local: the server stamps its own insertion time.
        Self {
            product_id: line.product_id,
            color_id: line.color_id,
            quantity: line.quantity,
        }
    }
}

/// Outcome of a successful cart mutation.
#[derive(Debug, Clone)]
pub struct CartMutation {
    /// Human-readable confirmation from the service, if any.
    pub message: Option<String>,
    /// Affected cart state as the service represents it; its structure is
    /// owned by the service.
    pub cart: Option<serde_json::Value>,
}

/// Product suggestion for the storefront search dropdown.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSuggestion {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub price: Decimal,
}

/// Envelope for `{success, message?, cart?}` responses.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    cart: Option<T>,
}

/// Response of the count endpoint.
#[derive(Debug, Deserialize)]
struct CountResponse {
    #[serde(default)]
    count: u64,
}

/// Client for the remote cart service.
#[derive(Clone)]
pub struct CartServiceClient {
    client: reqwest::Client,
    base_url: Url,
}

impl CartServiceClient {
    /// Create a new cart service client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or the configured
    /// API token is not a valid header value.
    pub fn new(config: &CartConfig) -> Result<Self, ServiceError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.api_token {
            let auth_value = format!("Bearer {}", token.expose_secret());
            headers.insert(
                "Authorization",
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| ServiceError::Parse(format!("Invalid API token format: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Decode a mutation response, mapping non-2xx statuses and
    /// `success: false` envelopes to [`ServiceError::Api`].
    async fn read_envelope<T: DeserializeOwned + Default>(
        response: reqwest::Response,
    ) -> Result<Envelope<T>, ServiceError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Rejections use the same envelope shape; salvage the message.
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_default();
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| ServiceError::Parse(e.to_string()))?;

        if !envelope.success {
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: envelope.message.unwrap_or_default(),
            });
        }

        Ok(envelope)
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Merge locally collected cart lines into the user's server cart.
    ///
    /// Lines already present on the server (same product and color) have
    /// their quantities added; new lines are appended. Returns the merged
    /// server cart.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure, a non-success status, or a
    /// `success: false` envelope.
    #[instrument(skip(self, items), fields(user_id = %user_id, lines = items.len()))]
    pub async fn sync_cart(
        &self,
        user_id: UserId,
        items: &[CartLineInput],
    ) -> Result<Vec<serde_json::Value>, ServiceError> {
        let url = self.endpoint(&format!("/api/cart/sync/{user_id}"));
        let body = serde_json::json!({ "items": items });

        let response = self.client.post(&url).json(&body).send().await?;
        let envelope: Envelope<Vec<serde_json::Value>> = Self::read_envelope(response).await?;

        Ok(envelope.cart.unwrap_or_default())
    }

    /// Authoritative item count for an authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure, a non-success status, or an
    /// unparseable body.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn cart_count(&self, user_id: UserId) -> Result<u64, ServiceError> {
        let url = self.endpoint(&format!("/api/cart/count/{user_id}"));

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: String::new(),
            });
        }

        let body: CountResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;

        Ok(body.count)
    }

    /// Add an item to an authenticated user's server cart.
    ///
    /// The server merges by `(product, color)` the same way the local store
    /// does.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure, a non-success status, or a
    /// `success: false` envelope; the error carries the service's message
    /// when one was supplied.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        color_id: Option<ColorId>,
        quantity: u32,
    ) -> Result<CartMutation, ServiceError> {
        let url = self.endpoint("/api/cart/add");
        let body = serde_json::json!({
            "userId": user_id,
            "productId": product_id,
            "colorId": color_id,
            "quantity": quantity,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let envelope: Envelope<serde_json::Value> = Self::read_envelope(response).await?;

        Ok(CartMutation {
            message: envelope.message,
            cart: envelope.cart,
        })
    }

    /// Fetch an authenticated user's full server cart.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure, a non-success status, or an
    /// unparseable body.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user_cart(
        &self,
        user_id: UserId,
    ) -> Result<Vec<serde_json::Value>, ServiceError> {
        let url = self.endpoint(&format!("/api/cart/{user_id}"));

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: String::new(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }

    /// Set the quantity of a server cart line.
    ///
    /// A quantity of 0 removes the line server-side.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure, a non-success status, or a
    /// `success: false` envelope.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn update_quantity(
        &self,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<CartMutation, ServiceError> {
        let url = self.endpoint(&format!("/api/cart/{line_id}"));
        let body = serde_json::json!({ "quantity": quantity });

        let response = self.client.put(&url).json(&body).send().await?;
        let envelope: Envelope<serde_json::Value> = Self::read_envelope(response).await?;

        Ok(CartMutation {
            message: envelope.message,
            cart: envelope.cart,
        })
    }

    /// Remove a line from the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure, a non-success status, or a
    /// `success: false` envelope.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove_item(&self, line_id: CartLineId) -> Result<(), ServiceError> {
        let url = self.endpoint(&format!("/api/cart/{line_id}"));

        let response = self.client.delete(&url).send().await?;
        Self::read_envelope::<serde_json::Value>(response).await?;

        Ok(())
    }

    /// Remove every line from an authenticated user's server cart.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure, a non-success status, or a
    /// `success: false` envelope.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear_cart(&self, user_id: UserId) -> Result<(), ServiceError> {
        let url = self.endpoint(&format!("/api/cart/clear/{user_id}"));

        let response = self.client.delete(&url).send().await?;
        Self::read_envelope::<serde_json::Value>(response).await?;

        Ok(())
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Search products by keyword for the suggestion dropdown.
    ///
    /// # Errors
    ///
    /// Returns an error on connection failure, a non-success status, or an
    /// unparseable body.
    #[instrument(skip(self))]
    pub async fn product_suggestions(
        &self,
        keyword: &str,
    ) -> Result<Vec<ProductSuggestion>, ServiceError> {
        let url = self.endpoint("/api/products");

        let response = self
            .client
            .get(&url)
            .query(&[("keyword", keyword)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: String::new(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }
}
