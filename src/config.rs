// src/config.rs

use std::time::Duration;

use url::Url;

use crate::error::{QuakeError, ValidationError};

/// The public USGS FDSN event web service.
pub const DEFAULT_BASE_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/";

pub const BASE_URL_ENV: &str = "EQUAKE_BASE_URL";
pub const TIMEOUT_ENV: &str = "EQUAKE_TIMEOUT_SECS";

const MIN_TIMEOUT: Duration = Duration::from_millis(10);
const MAX_TIMEOUT: Duration = Duration::from_secs(86_400);

/// Connection settings for a `QuakeClient`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuakeConfig {
    /// Base URL of the event service. The `query` and `count` operations are
    /// resolved relative to it.
    pub base_url: String,
    /// Upper bound on one request round trip. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for QuakeConfig {
    fn default() -> Self {
        QuakeConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl QuakeConfig {
    pub fn new(base_url: &str) -> Self {
        QuakeConfig {
            base_url: base_url.to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reads `EQUAKE_BASE_URL` and `EQUAKE_TIMEOUT_SECS`, falling back to the
    /// defaults for whichever is unset.
    pub fn from_env() -> Result<Self, ValidationError> {
        let mut config = QuakeConfig::default();
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let secs: f64 = raw.trim().parse().map_err(|_| {
                ValidationError::new("timeout", format!("'{}' is not a number of seconds", raw))
            })?;
            if !secs.is_finite() || secs < 0.0 || secs > MAX_TIMEOUT.as_secs_f64() {
                return Err(ValidationError::new(
                    "timeout",
                    format!("{} is not a valid number of seconds", secs),
                ));
            }
            config.timeout = Some(Duration::from_secs_f64(secs));
        }
        log::debug!("Loaded configuration from environment: {:?}", config);
        Ok(config)
    }

    pub(crate) fn checked_timeout(&self) -> Result<Option<Duration>, ValidationError> {
        match self.timeout {
            Some(timeout) if !(MIN_TIMEOUT..=MAX_TIMEOUT).contains(&timeout) => {
                Err(ValidationError::new(
                    "timeout",
                    format!(
                        "{:?} is outside [{:?}, {:?}]",
                        timeout, MIN_TIMEOUT, MAX_TIMEOUT
                    ),
                ))
            }
            other => Ok(other),
        }
    }

    /// Parses the base URL, adding `https://` when no scheme is given and a
    /// trailing `/` so that operation paths join beneath it.
    pub(crate) fn parsed_base_url(&self) -> Result<Url, QuakeError> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.starts_with("http://") && !raw.starts_with("https://") {
            raw = format!("https://{}", raw);
        }
        if !raw.ends_with('/') {
            raw.push('/');
        }

        let url = Url::parse(&raw)?;
        if url.cannot_be_a_base() {
            return Err(QuakeError::InvalidUrl(format!(
                "The base_url '{}' resolved to '{}', which cannot be a base URL.",
                self.base_url, url
            )));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_scheme_and_trailing_slash() {
        let url = QuakeConfig::new("earthquake.usgs.gov/fdsnws/event/1")
            .parsed_base_url()
            .unwrap();
        assert_eq!(url.as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn timeout_bounds_are_enforced() {
        let too_short = QuakeConfig::default().with_timeout(Duration::from_millis(1));
        assert_eq!(too_short.checked_timeout().unwrap_err().field, "timeout");

        let fine = QuakeConfig::default().with_timeout(Duration::from_secs(30));
        assert_eq!(fine.checked_timeout().unwrap(), Some(Duration::from_secs(30)));
        assert_eq!(QuakeConfig::default().checked_timeout().unwrap(), None);
    }
}
