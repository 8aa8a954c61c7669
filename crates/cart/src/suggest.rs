//! Search suggestions for the storefront dropdown.
//!
//! Suggestions are decorative: a failure must never surface past the
//! dropdown, so lookups degrade to an empty list and a log line.

use tracing::{instrument, warn};

use crate::client::{CartServiceClient, ProductSuggestion};

/// Keyword-based product suggestion lookups.
#[derive(Clone)]
pub struct SuggestionFetcher {
    client: CartServiceClient,
}

impl SuggestionFetcher {
    /// Create a fetcher over the given service client.
    #[must_use]
    pub const fn new(client: CartServiceClient) -> Self {
        Self { client }
    }

    /// Fetch suggestions for a keyword.
    ///
    /// A blank keyword resolves to an empty list without contacting the
    /// network; so does any service failure.
    #[instrument(skip(self))]
    pub async fn fetch(&self, keyword: &str) -> Vec<ProductSuggestion> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Vec::new();
        }

        match self.client.product_suggestions(keyword).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!(error = %e, "failed to fetch product suggestions");
                Vec::new()
            }
        }
    }
}
