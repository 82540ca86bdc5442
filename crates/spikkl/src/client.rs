//! Spikkl API client
//!
//! [`SpikklClient`] validates caller input through [`Validator`], issues the
//! keyed GET request, and routes non-2xx responses through
//! [`ApiError::classify`]. The [`GeolocationClient`] trait defines the
//! interface so callers can substitute a test double.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Method, StatusCode, header};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::SpikklConfig;
use crate::error::ApiError;
use crate::models::ApiResponse;
use crate::validator::Validator;

/// Default base URL for the Spikkl geo API
pub const API_ENDPOINT: &str = "https://api.spikkl.nl/geo";

const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 32 lowercase hexadecimal characters
static API_KEY_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Infallible with a valid static pattern
    Regex::new(r"^[0-9a-f]{32}$").expect("Failed to compile API key pattern")
});

/// Trait for Spikkl geolocation clients
#[async_trait]
pub trait GeolocationClient: Send + Sync {
    /// Look up address records by postal code and optional street number
    async fn lookup(
        &self,
        country_iso3_code: &str,
        postal_code: &str,
        street_number: Option<&str>,
        street_number_suffix: Option<&str>,
    ) -> Result<Vec<Value>, ApiError>;

    /// Look up address records nearest to a coordinate pair
    async fn reverse(
        &self,
        country_iso3_code: &str,
        longitude: f64,
        latitude: f64,
    ) -> Result<Vec<Value>, ApiError>;
}

/// Reqwest-backed Spikkl API client
///
/// # Examples
///
/// ```rust,ignore
/// use spikkl::{GeolocationClient, SpikklClient, SpikklConfig};
///
/// let mut client = SpikklClient::new(&SpikklConfig::default())?;
/// client.set_api_key("0ddf2aa8717c1d3dba1a4bcf2866eb4f")?;
///
/// let results = client.lookup("nld", "2611HB", Some("175"), None).await?;
/// ```
#[derive(Debug)]
pub struct SpikklClient {
    client: Client,
    api_endpoint: String,
    api_key: Option<String>,
    version_strings: Vec<String>,
    timeout_secs: u64,
}

impl SpikklClient {
    /// Create a new Spikkl client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized or if the
    /// configured API key is malformed.
    pub fn new(config: &SpikklConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::ConnectionFailed(e.to_string()))?;

        let mut spikkl = Self {
            client,
            api_endpoint: API_ENDPOINT.to_string(),
            api_key: None,
            version_strings: vec![format!("Spikkl/{CLIENT_VERSION}")],
            timeout_secs: config.timeout_secs,
        };

        spikkl.set_api_endpoint(&config.base_url);

        if let Some(api_key) = &config.api_key {
            spikkl.set_api_key(api_key)?;
        }

        Ok(spikkl)
    }

    /// Set and validate the API key
    ///
    /// The key is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidApiKey`] unless the key is exactly 32
    /// lowercase hexadecimal characters.
    pub fn set_api_key(&mut self, api_key: &str) -> Result<(), ApiError> {
        let api_key = api_key.trim();

        if !API_KEY_FORMAT.is_match(api_key) {
            return Err(ApiError::InvalidApiKey {
                key: api_key.to_string(),
            });
        }

        self.api_key = Some(api_key.to_string());
        Ok(())
    }

    /// Set the API endpoint, trimming whitespace and trailing slashes
    pub fn set_api_endpoint(&mut self, api_endpoint: &str) -> &mut Self {
        self.api_endpoint = api_endpoint.trim().trim_end_matches('/').to_string();
        self
    }

    /// The configured API endpoint
    #[must_use]
    pub fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    /// Append a version string reported in the User-Agent header
    ///
    /// Whitespace is replaced with hyphens.
    pub fn add_version_string(&mut self, version_string: &str) -> &mut Self {
        let cleaned: String = version_string
            .chars()
            .map(|c| if c.is_whitespace() { '-' } else { c })
            .collect();
        self.version_strings.push(cleaned);
        self
    }

    fn user_agent(&self) -> String {
        self.version_strings.join(";")
    }

    /// Perform a raw API request and return the parsed response body
    ///
    /// The configured API key is merged into the query parameters and always
    /// wins over a caller-supplied `key` entry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingApiKey`] when no key is configured,
    /// transport errors when the request itself fails, and classified API
    /// errors for responses with status 400 or higher.
    pub async fn perform_request(
        &self,
        method: Method,
        api_method: &str,
        params: &[(&str, String)],
        body: Option<String>,
    ) -> Result<Value, ApiError> {
        let Some(api_key) = &self.api_key else {
            return Err(ApiError::MissingApiKey);
        };

        let url = format!("{}/{}", self.api_endpoint, api_method);

        // Drop any caller-supplied key entry; the configured key always wins.
        let mut query: Vec<(&str, String)> = vec![("key", api_key.clone())];
        query.extend(params.iter().filter(|(name, _)| *name != "key").cloned());

        debug!(%url, "Performing Spikkl API request");

        let mut request = self
            .client
            .request(method, &url)
            .query(&query)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, self.user_agent())
            .header("X-Spikkl-Client-Info", platform_info());

        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                ApiError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|_| ApiError::NoResponse)?;

        Self::parse_response_body(status, &body)
    }

    /// Parse a response body, classifying non-2xx statuses
    fn parse_response_body(status: StatusCode, body: &str) -> Result<Value, ApiError> {
        if body.is_empty() {
            return Err(ApiError::EmptyBody);
        }

        let value: Value = serde_json::from_str(body).map_err(|_| ApiError::MalformedResponse {
            body: body.to_string(),
        })?;

        if status.as_u16() >= 400 {
            return Err(ApiError::classify(status.as_u16(), body));
        }

        Ok(value)
    }

    /// Extract the result records from a parsed success body
    fn extract_results(value: Value) -> Result<Vec<Value>, ApiError> {
        let response: ApiResponse =
            serde_json::from_value(value.clone()).map_err(|_| ApiError::MalformedResponse {
                body: value.to_string(),
            })?;

        Ok(response.results)
    }
}

#[async_trait]
impl GeolocationClient for SpikklClient {
    #[instrument(skip(self))]
    async fn lookup(
        &self,
        country_iso3_code: &str,
        postal_code: &str,
        street_number: Option<&str>,
        street_number_suffix: Option<&str>,
    ) -> Result<Vec<Value>, ApiError> {
        let validator = Validator::new(country_iso3_code)?;
        let postal_code = validator.validate_and_normalize_postal_code(postal_code)?;

        let mut suffix = match street_number_suffix {
            Some(raw) => Some(validator.validate_and_normalize_street_number_suffix(raw)?),
            None => None,
        };

        let mut number = None;
        if let Some(raw) = street_number {
            let (n, s) = validator.validate_and_normalize_street_number(raw, suffix.as_deref())?;
            number = Some(n);
            suffix = Some(s);
        }

        let mut params = vec![("postal_code", postal_code)];
        if let Some(number) = number {
            params.push(("street_number", number));
        }
        if let Some(suffix) = suffix {
            params.push(("street_number_suffix", suffix));
        }

        let api_method = format!("{}/lookup.json", country_iso3_code.to_lowercase());
        let value = self
            .perform_request(Method::GET, &api_method, &params, None)
            .await?;

        Self::extract_results(value)
    }

    #[instrument(skip(self))]
    async fn reverse(
        &self,
        country_iso3_code: &str,
        longitude: f64,
        latitude: f64,
    ) -> Result<Vec<Value>, ApiError> {
        let validator = Validator::new(country_iso3_code)?;
        let (longitude, latitude) =
            validator.validate_and_normalize_coordinate(longitude, latitude)?;

        let params = [("longitude", longitude), ("latitude", latitude)];

        let api_method = format!("{}/reverse.json", country_iso3_code.to_lowercase());
        let value = self
            .perform_request(Method::GET, &api_method, &params, None)
            .await?;

        Self::extract_results(value)
    }
}

/// Platform information reported in the X-Spikkl-Client-Info header
fn platform_info() -> String {
    format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH)
}
