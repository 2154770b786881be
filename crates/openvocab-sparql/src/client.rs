//! Triple store over a SPARQL 1.1 Protocol endpoint.
//!
//! Queries go to the query endpoint as `application/x-www-form-urlencoded`
//! POSTs and return SPARQL JSON results. Updates go to the update endpoint.
//! Every call is a single HTTP round trip.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, trace, warn};

use openvocab_core::{Error, Result, Triple, TriplePattern, TripleStore, Uri};

use crate::config::SparqlConfig;
use crate::query;
use crate::results::{QueryResults, RESULTS_JSON};

/// Slow round trip threshold for warnings.
const SLOW_MS: u64 = 2_000;

/// SPARQL-backed [`TripleStore`].
#[derive(Clone)]
pub struct SparqlTripleStore {
    client: Client,
    config: SparqlConfig,
}

impl SparqlTripleStore {
    /// Build a client for the given endpoints.
    pub fn new(config: SparqlConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Build from `OPENVOCAB_SPARQL_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(SparqlConfig::from_env()?)
    }

    pub fn config(&self) -> &SparqlConfig {
        &self.config
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.username {
            Some(user) => request.basic_auth(user, self.config.password.as_deref()),
            None => request,
        }
    }

    /// Run a SELECT or ASK query.
    pub async fn query(&self, sparql: &str) -> Result<QueryResults> {
        let start = Instant::now();
        trace!(subsystem = "sparql", component = "client", op = "query", %sparql);

        let response = self
            .authorize(self.client.post(&self.config.query_url))
            .header(reqwest::header::ACCEPT, RESULTS_JSON)
            .form(&[("query", sparql)])
            .send()
            .await?;
        let body = Self::check(response).await?;
        self.note_duration("query", start);
        QueryResults::parse(&body)
    }

    /// Run an update request.
    pub async fn update(&self, sparql: &str) -> Result<()> {
        let start = Instant::now();
        trace!(subsystem = "sparql", component = "client", op = "update", %sparql);

        let response = self
            .authorize(self.client.post(&self.config.update_url))
            .form(&[("update", sparql)])
            .send()
            .await?;
        Self::check(response).await?;
        self.note_duration("update", start);
        Ok(())
    }

    /// Map HTTP failures onto the error taxonomy and return the body.
    async fn check(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }
        if status.is_server_error()
            || status == StatusCode::TOO_MANY_REQUESTS
            || status == StatusCode::REQUEST_TIMEOUT
        {
            return Err(Error::StoreUnavailable(format!(
                "SPARQL endpoint returned {}: {}",
                status, body
            )));
        }
        Err(Error::Request(format!(
            "SPARQL endpoint returned {}: {}",
            status, body
        )))
    }

    fn note_duration(&self, op: &str, start: Instant) {
        let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            subsystem = "sparql",
            component = "client",
            op,
            duration_ms = elapsed,
            "SPARQL round trip"
        );
        if elapsed > SLOW_MS {
            warn!(
                subsystem = "sparql",
                component = "client",
                op,
                duration_ms = elapsed,
                "Slow SPARQL round trip"
            );
        }
    }
}

#[async_trait]
impl TripleStore for SparqlTripleStore {
    async fn find_triples(
        &self,
        pattern: &TriplePattern,
        limit: Option<usize>,
    ) -> Result<Vec<Triple>> {
        self.query(&query::select_triples(pattern, limit))
            .await?
            .into_triples(pattern)
    }

    async fn ask(&self, pattern: &TriplePattern) -> Result<bool> {
        self.query(&query::ask(pattern)).await?.boolean()
    }

    async fn insert_triples(&self, triples: &[Triple]) -> Result<()> {
        if triples.is_empty() {
            return Ok(());
        }
        self.update(&query::insert_data(triples)).await
    }

    async fn delete_triples(&self, triples: &[Triple]) -> Result<()> {
        if triples.is_empty() {
            return Ok(());
        }
        self.update(&query::delete_data(triples)).await
    }

    async fn delete_subject(&self, subject: &Uri) -> Result<()> {
        self.update(&query::delete_subject(subject)).await
    }

    async fn replace_subject(&self, subject: &Uri, triples: &[Triple]) -> Result<()> {
        self.update(&query::replace_subject(subject, triples)).await
    }
}
