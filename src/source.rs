//! Sample sources.
//!
//! A source turns a [`Mode`] into a list of samples. The HTTP source queries
//! `GET {endpoint}?mode=<mode>` and expects a JSON array of
//! `{"x": .., "y": .., "value"?: ..}` objects.

use crate::error::Result;
use crate::geometry::Sample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data-source selector, passed to the endpoint verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mode(String);

impl Mode {
    /// Wrap a selector string.
    #[must_use]
    pub fn new(mode: impl Into<String>) -> Self {
        Self(mode.into())
    }

    /// The selector as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::new("ble")
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Mode {
    fn from(mode: &str) -> Self {
        Self::new(mode)
    }
}

/// Something that can produce samples for a mode.
#[allow(async_fn_in_trait)]
pub trait SampleSource {
    /// Fetch the current samples.
    ///
    /// # Errors
    ///
    /// Implementations report transport failures as [`crate::Error::Fetch`]
    /// and malformed payloads as [`crate::Error::Decode`].
    async fn fetch(&self, mode: &Mode) -> Result<Vec<Sample>>;
}

/// Fixed samples, the same for every mode.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    samples: Vec<Sample>,
}

impl StaticSource {
    /// Serve `samples`.
    #[must_use]
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }
}

impl SampleSource for StaticSource {
    async fn fetch(&self, _mode: &Mode) -> Result<Vec<Sample>> {
        Ok(self.samples.clone())
    }
}

/// Parse a JSON sample array.
///
/// # Errors
///
/// Returns [`crate::Error::Decode`] if the payload is not an array of samples.
pub fn decode_samples(body: &[u8]) -> Result<Vec<Sample>> {
    Ok(serde_json::from_slice(body)?)
}

#[cfg(feature = "http")]
pub use http::HttpSource;

#[cfg(feature = "http")]
mod http {
    use super::{decode_samples, Mode, SampleSource};
    use crate::error::{Error, Result};
    use crate::geometry::Sample;
    use std::time::Duration;
    use tracing::debug;

    /// Samples fetched from an HTTP endpoint.
    #[derive(Debug, Clone)]
    pub struct HttpSource {
        client: reqwest::Client,
        endpoint: String,
    }

    impl HttpSource {
        /// Default request timeout.
        pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

        /// Query `endpoint` with the default timeout.
        ///
        /// # Errors
        ///
        /// Returns [`Error::Fetch`] if the HTTP client cannot be built.
        pub fn new(endpoint: impl Into<String>) -> Result<Self> {
            Self::with_timeout(endpoint, Self::DEFAULT_TIMEOUT)
        }

        /// Query `endpoint`, giving up after `timeout`.
        ///
        /// # Errors
        ///
        /// Returns [`Error::Fetch`] if the HTTP client cannot be built.
        pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| Error::Fetch(e.to_string()))?;
            Ok(Self {
                client,
                endpoint: endpoint.into(),
            })
        }

        /// Endpoint URL without the query string.
        #[must_use]
        pub fn endpoint(&self) -> &str {
            &self.endpoint
        }
    }

    impl SampleSource for HttpSource {
        async fn fetch(&self, mode: &Mode) -> Result<Vec<Sample>> {
            let response = self
                .client
                .get(&self.endpoint)
                .query(&[("mode", mode.as_str())])
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| Error::Fetch(e.to_string()))?;

            let body = response
                .bytes()
                .await
                .map_err(|e| Error::Fetch(e.to_string()))?;
            let samples = decode_samples(&body)?;
            debug!(endpoint = %self.endpoint, %mode, samples = samples.len(), "samples fetched");
            Ok(samples)
        }
    }
}
