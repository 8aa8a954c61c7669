//! Cart synchronizer.
//!
//! The single entry point for add-to-cart actions, and the one-time merge of
//! a local cart into the server cart after login. Authentication state and
//! user identity are passed in explicitly by the hosting page; nothing here
//! reads ambient globals.
//!
//! Two racing local adds perform unlocked read-modify-write over the same
//! storage key, so one increment can be lost. Accepted: single-visitor
//! context, worst case is one dropped unit.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, instrument};

use voltfront_core::{ColorId, ProductId, UserId};

use crate::badge::BadgeRenderer;
use crate::client::{CartLineInput, CartMutation, CartServiceClient, ServiceError};
use crate::debounce::Debouncer;
use crate::storage::StorageError;
use crate::store::LocalCartStore;

/// Delay before the one-time login prompt is offered after a local add.
const LOGIN_PROMPT_DELAY: Duration = Duration::from_secs(1);

/// Errors surfaced by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Caller input was malformed; nothing was stored or sent.
    #[error("{0}")]
    Validation(String),

    /// Local persistence failed in a way that could not be degraded.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The remote cart service rejected or failed the operation.
    #[error("{}", .0.user_message())]
    Service(#[from] ServiceError),
}

/// Add-to-cart input as supplied by the hosting page.
///
/// `product_id` and `quantity` come from the product form; `user_id` and
/// `authenticated` are whatever identity the page was rendered with.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub color_id: Option<ColorId>,
    /// Requested units; must be strictly positive.
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub authenticated: bool,
}

impl AddItemRequest {
    /// Request on behalf of an unauthenticated visitor.
    #[must_use]
    pub const fn local(product_id: ProductId, color_id: Option<ColorId>, quantity: i64) -> Self {
        Self {
            product_id: Some(product_id),
            color_id,
            quantity,
            user_id: None,
            authenticated: false,
        }
    }

    /// Request on behalf of an authenticated user.
    #[must_use]
    pub const fn authenticated(
        product_id: ProductId,
        color_id: Option<ColorId>,
        quantity: i64,
        user_id: UserId,
    ) -> Self {
        Self {
            product_id: Some(product_id),
            color_id,
            quantity,
            user_id: Some(user_id),
            authenticated: true,
        }
    }
}

/// Result of an add-to-cart action.
#[derive(Debug, Clone)]
pub enum AddOutcome {
    /// The item went to the server cart of an authenticated user.
    Server(CartMutation),
    /// The item was kept in the local cart; it reaches the server once the
    /// visitor logs in and the cart is synced.
    Local {
        /// Local cart total after the add.
        total_quantity: u64,
    },
}

/// Offered to unauthenticated visitors shortly after their first local add,
/// so they can log in and enable cross-device sync. Offered at most once per
/// synchronizer; declining has no further effect.
pub trait LoginPrompt: Send + Sync {
    /// Present the prompt.
    fn offer(&self);
}

/// Coordinates the local cart store, the remote cart service, and the badge.
pub struct CartSynchronizer {
    store: LocalCartStore,
    client: CartServiceClient,
    badge: Arc<dyn BadgeRenderer>,
    login_prompt: Option<Arc<dyn LoginPrompt>>,
    prompt_offered: AtomicBool,
    prompt_timer: Debouncer,
}

impl CartSynchronizer {
    /// Create a synchronizer with no login prompt wired up.
    #[must_use]
    pub fn new(
        store: LocalCartStore,
        client: CartServiceClient,
        badge: Arc<dyn BadgeRenderer>,
    ) -> Self {
        Self {
            store,
            client,
            badge,
            login_prompt: None,
            prompt_offered: AtomicBool::new(false),
            prompt_timer: Debouncer::new(),
        }
    }

    /// Attach the one-time login prompt offered after a local add.
    #[must_use]
    pub fn with_login_prompt(mut self, prompt: Arc<dyn LoginPrompt>) -> Self {
        self.login_prompt = Some(prompt);
        self
    }

    /// The local cart store backing unauthenticated adds.
    #[must_use]
    pub const fn store(&self) -> &LocalCartStore {
        &self.store
    }

    /// Push the local cart into the server cart after authentication.
    ///
    /// An empty local cart resolves immediately to an empty result with zero
    /// network calls. Otherwise the full local line list goes to the merge
    /// endpoint; on success the local cart is cleared (exactly once) and the
    /// badge re-rendered from the authoritative server count. On any failure
    /// the local cart is left untouched and the result is empty - sync
    /// failures never block the caller.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn sync_to_server(&self, user_id: UserId) -> Vec<serde_json::Value> {
        let local = self.store.read();
        if local.is_empty() {
            return Vec::new();
        }

        let items: Vec<CartLineInput> = local.iter().map(CartLineInput::from).collect();
        match self.client.sync_cart(user_id, &items).await {
            Ok(cart) => {
                self.store.clear();
                self.refresh_badge(user_id).await;
                cart
            }
            Err(e) => {
                error!(error = %e, "failed to sync local cart to server");
                Vec::new()
            }
        }
    }

    /// Authoritative item count for an authenticated user; 0 on any failure.
    pub async fn remote_count(&self, user_id: UserId) -> u64 {
        match self.client.cart_count(user_id).await {
            Ok(count) => count,
            Err(e) => {
                error!(error = %e, "failed to fetch server cart count");
                0
            }
        }
    }

    /// Re-render the badge from the server count.
    pub async fn refresh_badge(&self, user_id: UserId) {
        let count = self.remote_count(user_id).await;
        self.badge.render(count);
    }

    /// Re-render the badge from the local cart (unauthenticated page load).
    pub fn refresh_badge_local(&self) {
        self.badge.render(self.store.total_quantity());
    }

    /// Single entry point for add-to-cart actions.
    ///
    /// Input is validated before anything else; invalid input produces a
    /// [`CartError::Validation`] with no storage or network effect.
    /// Authenticated requests go to the server cart and refresh the badge
    /// from the server count. Unauthenticated requests go to the local store,
    /// update the badge locally, and schedule the one-time login prompt.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Validation`] for malformed input, or
    /// [`CartError::Service`] when the server rejects an authenticated add;
    /// the error's display form is the user-facing message.
    #[instrument(skip(self))]
    pub async fn add_item(&self, request: AddItemRequest) -> Result<AddOutcome, CartError> {
        let Some(product_id) = request.product_id else {
            return Err(CartError::Validation("A product must be selected.".to_owned()));
        };
        let quantity = match u32::try_from(request.quantity) {
            Ok(quantity) if quantity > 0 => quantity,
            _ => {
                return Err(CartError::Validation(
                    "Quantity must be a positive number.".to_owned(),
                ));
            }
        };

        if request.authenticated && let Some(user_id) = request.user_id {
            let mutation = self
                .client
                .add_item(user_id, product_id, request.color_id, quantity)
                .await
                .map_err(|e| {
                    error!(error = %e, "failed to add item to server cart");
                    e
                })?;

            self.refresh_badge(user_id).await;
            Ok(AddOutcome::Server(mutation))
        } else {
            let cart = self.store.add_item(product_id, request.color_id, quantity);
            let total_quantity = cart.iter().map(|l| u64::from(l.quantity)).sum();
            self.badge.render(total_quantity);
            self.offer_login_prompt();

            Ok(AddOutcome::Local { total_quantity })
        }
    }

    /// Schedule the one-time login prompt after a local add.
    fn offer_login_prompt(&self) {
        let Some(prompt) = &self.login_prompt else {
            return;
        };
        if self.prompt_offered.swap(true, Ordering::SeqCst) {
            return;
        }

        let prompt = Arc::clone(prompt);
        self.prompt_timer
            .schedule(LOGIN_PROMPT_DELAY, move || prompt.offer());
    }
}
