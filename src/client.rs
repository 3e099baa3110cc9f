// src/client.rs

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::config::QuakeConfig;
use crate::earthquake::{parse_count, parse_features, Earthquake};
use crate::error::QuakeError;
use crate::query::EarthquakeFilter;
use crate::requests::{build_url, QueryMode};

/// Status line and body of one HTTP exchange, as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one GET request and hands back the raw response.
///
/// Implementations must not retry: the client treats every failure as final.
pub trait Transport {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<RawResponse, QuakeError>> + Send;
}

/// `reqwest`-backed transport used by default.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, QuakeError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(HttpTransport {
            http_client: builder.build()?,
        })
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, url: &Url) -> Result<RawResponse, QuakeError> {
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("--- Catalog GET Request ---");
            log::debug!("URL: {}", url.as_str());
            log::debug!("---------------------------");
        }

        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(QuakeError::ReqwestError)?;

        let status = response.status();
        let body = response.text().await.map_err(QuakeError::ReqwestError)?;
        log::debug!("Response status: {}, body length: {}", status, body.len());

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Counts and fetches earthquakes matching an [`EarthquakeFilter`].
///
/// Every call performs exactly one request. Errors are returned as they
/// occur; nothing is retried.
///
/// ```rust,no_run
/// use equake_rs::{EarthquakeFilter, Filter, FilterOptions, MagnitudeFilter, QuakeClient, QuakeConfig};
/// # use equake_rs::QuakeError;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), QuakeError> {
/// let client = QuakeClient::new(QuakeConfig::default())?;
/// let filter = EarthquakeFilter::new(
///     vec![Filter::from(MagnitudeFilter::new(Some(6.0), None)?)],
///     FilterOptions::default(),
/// )?;
///
/// let total = client.count(&filter).await?;
/// for quake in client.get_limited(&filter, 10).await? {
///     println!("{}\n", quake);
/// }
/// println!("{} matching events", total);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct QuakeClient<T = HttpTransport> {
    base_url: Url,
    transport: T,
}

impl QuakeClient<HttpTransport> {
    /// Creates a client that talks to the service over HTTP.
    pub fn new(config: QuakeConfig) -> Result<Self, QuakeError> {
        let transport = HttpTransport::new(config.checked_timeout()?)?;
        Self::with_transport(&config, transport)
    }
}

impl<T: Transport> QuakeClient<T> {
    /// Creates a client that sends its requests through `transport`.
    pub fn with_transport(config: &QuakeConfig, transport: T) -> Result<Self, QuakeError> {
        config.checked_timeout()?;
        Ok(QuakeClient {
            base_url: config.parsed_base_url()?,
            transport,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The exact URL a call with these arguments would request.
    pub fn query_url(
        &self,
        filter: &EarthquakeFilter,
        mode: QueryMode,
        limit: Option<u32>,
    ) -> Result<Url, QuakeError> {
        build_url(&self.base_url, filter, mode, limit)
    }

    /// Number of events matching `filter`.
    pub async fn count(&self, filter: &EarthquakeFilter) -> Result<u64, QuakeError> {
        let url = self.query_url(filter, QueryMode::Count, None)?;
        let body = self.send(&url).await?;
        parse_count(&body)
    }

    /// All matching events, in the order the service returned them.
    pub async fn get(&self, filter: &EarthquakeFilter) -> Result<Vec<Earthquake>, QuakeError> {
        self.fetch_features(filter, None).await
    }

    /// At most `limit` matching events (capped at the service maximum).
    pub async fn get_limited(
        &self,
        filter: &EarthquakeFilter,
        limit: u32,
    ) -> Result<Vec<Earthquake>, QuakeError> {
        self.fetch_features(filter, Some(limit)).await
    }

    async fn fetch_features(
        &self,
        filter: &EarthquakeFilter,
        limit: Option<u32>,
    ) -> Result<Vec<Earthquake>, QuakeError> {
        let url = self.query_url(filter, QueryMode::Features, limit)?;
        let body = self.send(&url).await?;
        let earthquakes = parse_features(&body).inspect_err(|e| {
            if matches!(e, QuakeError::Parse(_)) {
                log::error!("Failed to parse feature collection from '{}': {}", url, e);
            }
        })?;
        log::debug!("Parsed {} earthquakes from '{}'", earthquakes.len(), url);
        Ok(earthquakes)
    }

    async fn send(&self, url: &Url) -> Result<String, QuakeError> {
        let response = self.transport.fetch(url).await?;
        if response.is_success() {
            Ok(response.body)
        } else {
            log::warn!(
                "Request to '{}' failed with status {} and body: {}",
                url,
                response.status,
                response.body
            );
            Err(QuakeError::from_response(response.status, &response.body))
        }
    }
}

/// Counts matching events using the public service and default settings.
pub async fn count(filter: &EarthquakeFilter) -> Result<u64, QuakeError> {
    QuakeClient::new(QuakeConfig::default())?.count(filter).await
}

/// Fetches matching events using the public service and default settings.
pub async fn get(filter: &EarthquakeFilter) -> Result<Vec<Earthquake>, QuakeError> {
    QuakeClient::new(QuakeConfig::default())?.get(filter).await
}
