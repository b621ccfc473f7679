//! Command-line and environment configuration

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use pubmed_network::network::InMemoryCollectionStore;
use pubmed_network::{CacheConfig, ClientConfig, NetworkConfig, NetworkService, PubMedClient};

use crate::collections::load_collections;
use crate::routes::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "pubmed-network-server",
    about = "HTTP API for PubMed citation lookups and citation networks",
    version
)]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "PUBMED_NETWORK_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// YAML or JSON file mapping collection ids to member PMIDs
    #[arg(long, env = "PUBMED_NETWORK_COLLECTIONS")]
    pub collections: Option<PathBuf>,

    /// NCBI API key (raises the rate ceiling to 10 requests/second)
    #[arg(long, env = "NCBI_API_KEY")]
    pub api_key: Option<String>,

    /// Contact email sent to NCBI with every request
    #[arg(long, env = "NCBI_EMAIL")]
    pub email: Option<String>,

    /// Override the requests-per-second ceiling
    #[arg(long)]
    pub rate_limit: Option<f64>,

    /// E-utilities base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Lifetime of cached results in seconds
    #[arg(long, default_value_t = 600)]
    pub cache_ttl_secs: u64,

    /// Maximum cached results per handler
    #[arg(long, default_value_t = 1000)]
    pub cache_capacity: u64,
}

impl Args {
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new().with_timeout_seconds(self.timeout_secs);
        if let Some(api_key) = &self.api_key {
            config = config.with_api_key(api_key);
        }
        if let Some(email) = &self.email {
            config = config.with_email(email);
        }
        if let Some(rate) = self.rate_limit {
            config = config.with_rate_limit(rate);
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        config
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_capacity: self.cache_capacity,
            time_to_live: Duration::from_secs(self.cache_ttl_secs),
        }
    }

    /// Build the shared client, service and collection store
    pub fn build_state(&self) -> Result<AppState> {
        let client_config = self.client_config();
        info!(
            rate_limit = client_config.effective_rate_limit(),
            base_url = client_config.effective_base_url(),
            "Configuring PubMed client"
        );

        let client = PubMedClient::with_config(client_config);
        let service = NetworkService::new(
            Arc::new(client),
            &self.cache_config(),
            NetworkConfig::default(),
        );

        let collections = match &self.collections {
            Some(path) => load_collections(path)?,
            None => InMemoryCollectionStore::default(),
        };
        info!(collections = collections.len(), "Collections loaded");

        Ok(AppState {
            service: Arc::new(service),
            collections: Arc::new(collections),
        })
    }
}
