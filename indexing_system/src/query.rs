use crate::config::IndexerConfig;
use crate::error::{IndexerError, IndexerResult};
use crate::models::{AccountResponse, PageResponse, PendingQuery, TransactionRecord};
use async_trait::async_trait;
use multiproxy_engine::{
    AccountArena, AccountRecord, Address, IndexService, Page, PageRequest, Transaction,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Client for the indexing service's read API
#[derive(Debug, Clone)]
pub struct IndexClient {
    /// HTTP client
    client: Client,

    /// Service base URL
    base_url: Url,

    /// Page size used when callers do not pick one
    page_size: u32,
}

impl IndexClient {
    /// Create a new index client
    ///
    /// # Arguments
    /// * `config` - Indexing service configuration
    pub fn new(config: &IndexerConfig) -> IndexerResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!("Index client targeting {}", config.base_url);

        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url)?,
            page_size: config.page_size,
        })
    }

    /// Default page request for listings
    pub fn default_page(&self) -> PageRequest {
        PageRequest::first(self.page_size)
    }

    fn endpoint(&self, segments: &[&str]) -> IndexerResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| IndexerError::Config("Indexer URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> IndexerResult<T> {
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(IndexerError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Indexer request {} failed with {}", url.path(), status);
            return Err(IndexerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| IndexerError::InvalidResponse(e.to_string()))
    }

    /// Fetch the account snapshot rooted at `address`
    ///
    /// # Returns
    /// The nested record with the block it was indexed at
    pub async fn account(&self, address: &Address) -> IndexerResult<AccountResponse> {
        let url = self.endpoint(&["accounts", address.as_str()])?;
        let response: AccountResponse = self.get_json(url).await?;
        debug!(
            "Account {} indexed at block {}",
            address, response.indexed_block
        );
        Ok(response)
    }

    /// Fetch and flatten the account snapshot rooted at `address`
    pub async fn load_arena(&self, address: &Address) -> IndexerResult<AccountArena> {
        self.account(address).await?.into_arena()
    }

    /// Fetch one transaction tree by id
    pub async fn transaction(&self, id: u64) -> IndexerResult<Transaction> {
        let url = self.endpoint(&["transactions", &id.to_string()])?;
        let record: TransactionRecord = self.get_json(url).await?;
        record.into_transaction()
    }

    /// List pending root transactions for an account
    ///
    /// # Arguments
    /// * `query` - Account and pagination
    pub async fn pending(&self, query: &PendingQuery) -> IndexerResult<Page<Transaction>> {
        let mut url = self.endpoint(&["transactions", "pending"])?;
        url.query_pairs_mut().extend_pairs(query.pairs());

        let response: PageResponse<TransactionRecord> = self.get_json(url).await?;
        let page = response.into_page()?;
        debug!(
            "Page {} of pending transactions for {}: {} of {}",
            page.page,
            query.address,
            page.items.len(),
            page.total
        );
        Ok(page)
    }

    /// Health check - verify the service answers
    pub async fn health_check(&self) -> IndexerResult<bool> {
        let url = self.endpoint(&["health"])?;
        let response = self.client.get(url).send().await?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl IndexService for IndexClient {
    type Error = IndexerError;

    async fn get_account(&self, address: &Address) -> IndexerResult<AccountRecord> {
        Ok(self.account(address).await?.account)
    }

    async fn get_transaction(&self, id: u64) -> IndexerResult<Transaction> {
        self.transaction(id).await
    }

    async fn pending_transactions(
        &self,
        address: &Address,
        page: PageRequest,
    ) -> IndexerResult<Page<Transaction>> {
        let query = PendingQuery::new(address.clone(), self.page_size).with_page(page);
        self.pending(&query).await
    }
}
