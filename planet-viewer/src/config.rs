//! Viewer configuration.

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

/// Listing URL of the hosted planet service.
pub const REMOTE_PLANETS_URL: &str = "https://planets.mybluemix.net/planets";

/// Listing URL of a development server on the local machine.
pub const LOCAL_PLANETS_URL: &str = "http://127.0.0.1:3000/planets";

/// Address used to ask the OS whether an outbound route exists.
pub const DEFAULT_PROBE_ADDR: &str = "1.1.1.1:53";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid planets URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Event channel capacity must be > 0")]
    ZeroCapacity,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Settings for one viewer session.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Listing endpoint; images live at `<planets_url>/<id>/image`
    pub planets_url: String,
    /// Per-request timeout for listing and image requests
    pub request_timeout: Duration,
    /// Target for the connectivity probe
    pub probe_addr: SocketAddr,
    /// Buffered fetch events before publishers start dropping
    pub channel_capacity: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            planets_url: REMOTE_PLANETS_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            probe_addr: SocketAddr::from(([1, 1, 1, 1], 53)),
            channel_capacity: 4,
        }
    }
}

impl ViewerConfig {
    /// Default configuration pointed at a different listing URL.
    pub fn with_url(planets_url: impl Into<String>) -> Self {
        Self {
            planets_url: planets_url.into(),
            ..Self::default()
        }
    }

    /// Check the URL scheme and channel capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = Url::parse(&self.planets_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.planets_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.planets_url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        if self.channel_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        Ok(())
    }
}
