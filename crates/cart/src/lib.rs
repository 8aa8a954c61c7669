//! Voltfront cart synchronization.
//!
//! Maintains a locally persisted cart for anonymous visitors and defers to
//! the remote cart service once the visitor authenticates. The one piece of
//! real coordination is the login-time merge: the local cart is pushed to the
//! server exactly once, then cleared, and the badge is re-rendered from the
//! authoritative server count.
//!
//! # Architecture
//!
//! - [`store::LocalCartStore`] - anonymous cart over a pluggable
//!   [`storage::CartStorage`] backend
//! - [`client::CartServiceClient`] - REST client for the remote cart service
//! - [`sync::CartSynchronizer`] - the single entry point for add-to-cart
//!   actions and the local-to-server merge
//! - [`badge::BadgeRenderer`] - seam between cart state and whatever UI
//!   displays the item-count badge
//! - [`suggest::SuggestionFetcher`] - search-suggestion lookups that degrade
//!   to an empty list on failure
//!
//! # Failure posture
//!
//! Storage failures degrade silently (empty cart, swallowed writes) and are
//! logged. Read-only service calls degrade to safe defaults (zero count,
//! empty suggestions). Mutating service calls surface a user-facing message
//! and leave local state untouched. Nothing is retried automatically.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use voltfront_cart::{
//!     AddItemRequest, CartConfig, CartServiceClient, CartSynchronizer, FileStorage,
//!     LocalCartStore, SharedBadge,
//! };
//!
//! let config = CartConfig::from_env()?;
//! let store = LocalCartStore::new(Arc::new(FileStorage::new(&config.storage_dir)));
//! let client = CartServiceClient::new(&config)?;
//! let badge = SharedBadge::new();
//! let sync = CartSynchronizer::new(store, client, Arc::new(badge.clone()));
//!
//! // Visitor adds an item before logging in: goes to local storage.
//! sync.add_item(AddItemRequest::local(5.into(), None, 2)).await?;
//!
//! // After login: merge the local cart into the server cart.
//! let merged = sync.sync_to_server(42.into()).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod badge;
pub mod client;
pub mod config;
pub mod debounce;
pub mod storage;
pub mod store;
pub mod suggest;
pub mod sync;

pub use badge::{BadgeRenderer, BadgeView, SharedBadge};
pub use client::{CartLineInput, CartMutation, CartServiceClient, ProductSuggestion, ServiceError};
pub use config::{CartConfig, ConfigError};
pub use debounce::Debouncer;
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::LocalCartStore;
pub use suggest::SuggestionFetcher;
pub use sync::{AddItemRequest, AddOutcome, CartError, CartSynchronizer, LoginPrompt};
