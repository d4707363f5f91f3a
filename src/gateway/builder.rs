//! Builder for configuring client instances.

use std::path::PathBuf;
use std::sync::Arc;

use super::PetMatchClient;
use crate::cache::{CacheConfig, FileStore, KvStore, MemoryStore, TtlCache, key};
use crate::recommend::Recommender;
use crate::services::{
    CompletionClient, CompletionService, GeocodeClient, GeocodeService, PetListingClient,
    PetListingService, RetryConfig,
};
use crate::{PetMatchError, Result};

/// Main entry point for creating client instances.
pub struct PetMatch;

impl PetMatch {
    /// Create a new builder for configuring the client.
    pub fn builder() -> PetMatchBuilder {
        PetMatchBuilder::new()
    }
}

/// Builder for configuring client instances.
///
/// Either provider credentials or an injected service implementation must
/// be supplied for listings and completions; geocoding defaults to the
/// keyless provider.
pub struct PetMatchBuilder {
    listing_credentials: Option<(String, String)>,
    listing_base_url: Option<String>,
    completion_key: Option<String>,
    completion_model: Option<String>,
    completion_base_url: Option<String>,
    geocode_base_url: Option<String>,
    cache_config: CacheConfig,
    cache_path: Option<PathBuf>,
    retry: RetryConfig,
    listing_service: Option<Arc<dyn PetListingService>>,
    completion_service: Option<Arc<dyn CompletionService>>,
    geocode_service: Option<Arc<dyn GeocodeService>>,
    ephemeral_store: Option<Arc<dyn KvStore>>,
    durable_store: Option<Arc<dyn KvStore>>,
}

impl PetMatchBuilder {
    pub fn new() -> Self {
        Self {
            listing_credentials: None,
            listing_base_url: None,
            completion_key: None,
            completion_model: None,
            completion_base_url: None,
            geocode_base_url: None,
            cache_config: CacheConfig::default(),
            cache_path: None,
            retry: RetryConfig::default(),
            listing_service: None,
            completion_service: None,
            geocode_service: None,
            ephemeral_store: None,
            durable_store: None,
        }
    }

    /// Configure listings-provider API credentials.
    pub fn listing_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.listing_credentials = Some((client_id.into(), client_secret.into()));
        self
    }

    /// Override the listings-provider base URL.
    pub fn listing_base_url(mut self, url: impl Into<String>) -> Self {
        self.listing_base_url = Some(url.into());
        self
    }

    /// Configure the completion-provider API key.
    pub fn completion_key(mut self, api_key: impl Into<String>) -> Self {
        self.completion_key = Some(api_key.into());
        self
    }

    /// Override the completion model.
    pub fn completion_model(mut self, model: impl Into<String>) -> Self {
        self.completion_model = Some(model.into());
        self
    }

    /// Override the completion-provider base URL.
    pub fn completion_base_url(mut self, url: impl Into<String>) -> Self {
        self.completion_base_url = Some(url.into());
        self
    }

    /// Override the geocode-provider base URL.
    pub fn geocode_base_url(mut self, url: impl Into<String>) -> Self {
        self.geocode_base_url = Some(url.into());
        self
    }

    /// Override the cache TTLs.
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Set the durable cache file location.
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Set the retry configuration for upstream calls.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Inject a listing service implementation (replaces credentials).
    pub fn listing_service(mut self, service: Arc<dyn PetListingService>) -> Self {
        self.listing_service = Some(service);
        self
    }

    /// Inject a completion service implementation (replaces the API key).
    pub fn completion_service(mut self, service: Arc<dyn CompletionService>) -> Self {
        self.completion_service = Some(service);
        self
    }

    /// Inject a geocode service implementation.
    pub fn geocode_service(mut self, service: Arc<dyn GeocodeService>) -> Self {
        self.geocode_service = Some(service);
        self
    }

    /// Inject the ephemeral (session) storage backend.
    pub fn ephemeral_store(mut self, store: Arc<dyn KvStore>) -> Self {
        self.ephemeral_store = Some(store);
        self
    }

    /// Inject the durable storage backend.
    pub fn durable_store(mut self, store: Arc<dyn KvStore>) -> Self {
        self.durable_store = Some(store);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<PetMatchClient> {
        let listings: Arc<dyn PetListingService> = match (self.listing_service, self.listing_credentials)
        {
            (Some(service), _) => service,
            (None, Some((id, secret))) => {
                let client = match self.listing_base_url {
                    Some(base) => PetListingClient::with_base_url(id, secret, base),
                    None => PetListingClient::new(id, secret),
                };
                Arc::new(client.retry(self.retry.clone()))
            }
            (None, None) => {
                return Err(PetMatchError::Configuration(
                    "no listing service configured".to_string(),
                ));
            }
        };

        let completion: Arc<dyn CompletionService> =
            match (self.completion_service, self.completion_key) {
                (Some(service), _) => service,
                (None, Some(key)) => {
                    let mut client = match self.completion_base_url {
                        Some(base) => CompletionClient::with_base_url(key, base),
                        None => CompletionClient::new(key),
                    };
                    if let Some(model) = self.completion_model {
                        client = client.model(model);
                    }
                    Arc::new(client.retry(self.retry))
                }
                (None, None) => {
                    return Err(PetMatchError::Configuration(
                        "no completion service configured".to_string(),
                    ));
                }
            };

        let geocode: Arc<dyn GeocodeService> = match self.geocode_service {
            Some(service) => service,
            None => match self.geocode_base_url {
                Some(base) => Arc::new(GeocodeClient::with_base_url(base)),
                None => Arc::new(GeocodeClient::new()),
            },
        };

        let ephemeral = self
            .ephemeral_store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let durable = self.durable_store.unwrap_or_else(|| {
            let path = self.cache_path.unwrap_or_else(FileStore::default_path);
            Arc::new(FileStore::open(path))
        });

        let search_cache = TtlCache::new(
            Arc::clone(&ephemeral),
            key::SEARCH_NS,
            self.cache_config.search_ttl,
        );
        let details_cache =
            TtlCache::new(ephemeral, key::PET_DETAILS_NS, self.cache_config.search_ttl);
        let recommendation_cache = TtlCache::new(
            durable,
            key::RECOMMENDATION_NS,
            self.cache_config.recommendation_ttl,
        );

        let recommender = Recommender::new(completion, recommendation_cache.clone());

        Ok(PetMatchClient::new(
            listings,
            geocode,
            search_cache,
            details_cache,
            recommendation_cache,
            recommender,
        ))
    }
}

impl Default for PetMatchBuilder {
    fn default() -> Self {
        Self::new()
    }
}
