mod elink;

use reqwest::{Client, Response};
use tracing::{debug, info, instrument, warn};

use crate::common::PubMedId;
use crate::config::ClientConfig;
use crate::error::{PubMedError, Result};
use crate::pubmed::models::ArticleRecord;
use crate::pubmed::parser::{parse_records, DEFAULT_AUTHOR_CAP};
use crate::pubmed::responses::ESearchResult;
use crate::rate_limit::RateLimiter;
use crate::retry::{with_retry, RetryableError};

/// NCBI recommends batches of up to 200 IDs per EFetch request
const FETCH_BATCH_SIZE: usize = 200;

/// Client for the PubMed E-utilities
///
/// Cloning is cheap and every clone shares the same rate limiter, so one
/// client built at start-up bounds the request rate of the whole process.
#[derive(Clone)]
pub struct PubMedClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    config: ClientConfig,
    author_cap: usize,
}

impl PubMedClient {
    /// Create a new PubMed client with default configuration
    ///
    /// Uses default NCBI rate limiting (3 requests/second) and no API key.
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_network::PubMedClient;
    ///
    /// let client = PubMedClient::new();
    /// ```
    pub fn new() -> Self {
        Self::with_config(ClientConfig::new())
    }

    /// Create a new PubMed client with custom configuration
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_network::{ClientConfig, PubMedClient};
    ///
    /// let config = ClientConfig::new()
    ///     .with_api_key("your_api_key_here")
    ///     .with_email("researcher@university.edu");
    ///
    /// let client = PubMedClient::with_config(config);
    /// ```
    pub fn with_config(config: ClientConfig) -> Self {
        let client = Client::builder()
            .user_agent(config.effective_user_agent())
            .timeout(config.retry_policy.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to a default HTTP client");
                Client::new()
            });

        Self::with_client_and_config(client, config)
    }

    /// Create a client around a caller-built reqwest client
    pub fn with_client(client: Client) -> Self {
        Self::with_client_and_config(client, ClientConfig::new())
    }

    fn with_client_and_config(client: Client, config: ClientConfig) -> Self {
        Self {
            client,
            base_url: config.effective_base_url().to_string(),
            rate_limiter: config.create_rate_limiter(),
            config,
            author_cap: DEFAULT_AUTHOR_CAP,
        }
    }

    /// Cap the number of authors kept per parsed record
    pub fn with_author_cap(mut self, author_cap: usize) -> Self {
        self.author_cap = author_cap;
        self
    }

    /// Get a reference to the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get a reference to the shared rate limiter
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Search PubMed and return matching PMIDs in ESearch order
    ///
    /// An empty query returns an empty list without a request.
    ///
    /// # Errors
    ///
    /// * `PubMedError::ApiError` - If NCBI reports an error inside a 200 response
    /// * `PubMedError::UpstreamUnavailable` - If transient failures exhaust the retry budget
    #[instrument(skip(self), fields(query = %query, limit = limit))]
    pub async fn search_articles(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        if query.trim().is_empty() || limit == 0 {
            debug!("Empty query or zero limit, returning empty results");
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/esearch.fcgi?db=pubmed&term={}&retmax={}&retstart=0&retmode=json",
            self.base_url,
            urlencoding::encode(query),
            limit
        );

        let response = self.make_request(&url).await?;
        let body = response.text().await?;
        let search_result: ESearchResult = serde_json::from_str(&body)?;

        // NCBI sometimes returns 200 OK with an ERROR field
        if let Some(error_msg) = &search_result.esearchresult.error {
            return Err(PubMedError::ApiError {
                status: 200,
                message: format!("NCBI ESearch API error: {error_msg}"),
            });
        }

        let mut pmids = search_result.esearchresult.idlist;
        pmids.truncate(limit);

        info!(
            total = search_result.esearchresult.count.as_deref().unwrap_or("0"),
            returned = pmids.len(),
            "Search completed"
        );
        Ok(pmids)
    }

    /// Fetch and parse records for the given PMIDs, in batches of 200
    ///
    /// Records that fail to parse are skipped, so the result may be shorter
    /// than the input. All PMIDs are validated before any request is sent.
    #[instrument(skip(self, pmids), fields(pmids_count = pmids.len()))]
    pub async fn fetch_records<S: AsRef<str>>(&self, pmids: &[S]) -> Result<Vec<ArticleRecord>> {
        if pmids.is_empty() {
            return Ok(Vec::new());
        }

        let validated: Vec<PubMedId> = pmids
            .iter()
            .map(|pmid| PubMedId::parse(pmid.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let mut records = Vec::with_capacity(validated.len());

        for chunk in validated.chunks(FETCH_BATCH_SIZE) {
            let id_list = chunk
                .iter()
                .map(PubMedId::to_string)
                .collect::<Vec<_>>()
                .join(",");

            let url = format!(
                "{}/efetch.fcgi?db=pubmed&id={}&retmode=xml&rettype=abstract",
                self.base_url, id_list
            );

            debug!(batch_size = chunk.len(), "Making batch EFetch API request");
            let response = self.make_request(&url).await?;
            let xml_text = response.text().await?;

            let parsed = parse_records(&xml_text, self.author_cap);
            info!(
                requested = chunk.len(),
                parsed = parsed.len(),
                "Batch fetch completed"
            );
            records.extend(parsed);
        }

        Ok(records)
    }

    /// Fetch one record, failing with `RecordNotFound` when nothing parses
    #[instrument(skip(self), fields(pmid = %pmid))]
    pub async fn fetch_record(&self, pmid: &str) -> Result<ArticleRecord> {
        let wanted = PubMedId::parse(pmid)?.to_string();
        self.fetch_records(&[wanted.as_str()])
            .await?
            .into_iter()
            .find(|r| r.pmid == wanted)
            .ok_or(PubMedError::RecordNotFound { pmid: wanted })
    }

    /// Issue one GET through the rate limiter and the retry policy
    ///
    /// Every attempt, retries included, takes a token from the shared limiter.
    /// API parameters (api_key, email, tool) are appended to the URL.
    pub(crate) async fn make_request(&self, url: &str) -> Result<Response> {
        let mut final_url = url.to_string();
        let api_params = self.config.build_api_params();

        if !api_params.is_empty() {
            let separator = if url.contains('?') { '&' } else { '?' };
            final_url.push(separator);
            let param_strings: Vec<String> = api_params
                .into_iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
                .collect();
            final_url.push_str(&param_strings.join("&"));
        }

        let policy = &self.config.retry_policy;
        let result = with_retry(
            || async {
                self.rate_limiter.acquire().await;
                debug!("Making API request to: {}", final_url);
                let response = self
                    .client
                    .get(&final_url)
                    .send()
                    .await
                    .map_err(PubMedError::from)?;

                let status = response.status();
                if status.is_server_error() || status.as_u16() == 429 {
                    return Err(PubMedError::ApiError {
                        status: status.as_u16(),
                        message: status
                            .canonical_reason()
                            .unwrap_or("Unknown error")
                            .to_string(),
                    });
                }

                Ok(response)
            },
            policy,
            "NCBI API request",
        )
        .await;

        let response = match result {
            Ok(response) => response,
            Err(e) if e.is_retryable() => {
                warn!(
                    attempts = policy.max_attempts(),
                    error = %e,
                    "Retry budget exhausted"
                );
                return Err(PubMedError::UpstreamUnavailable {
                    attempts: policy.max_attempts(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        if !response.status().is_success() {
            warn!("API request failed with status: {}", response.status());
            return Err(PubMedError::ApiError {
                status: response.status().as_u16(),
                message: response
                    .status()
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            });
        }

        Ok(response)
    }
}

impl Default for PubMedClient {
    fn default() -> Self {
        Self::new()
    }
}
