//! Failure taxonomy for one fetch cycle.

use planets_shared::{PlanetId, PlanetsError};

/// Errors raised anywhere in the fetch/load pipeline.
///
/// Only `NetworkUnavailable`, `Channel` and `Config` ever escape to callers.
/// Fetch errors are folded into a failure event, and image errors are
/// recovered per planet by the loader.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Network not available")]
    NetworkUnavailable,

    #[error("Failed to fetch planets: {0}")]
    FetchTransport(PlanetsError),

    #[error("Failed to read planet listing: {0}")]
    FetchParse(PlanetsError),

    #[error("Image download failed for planet {id}: {source}")]
    ImageTransport {
        id: PlanetId,
        #[source]
        source: PlanetsError,
    },

    #[error("Image decode failed for planet {id}: {source}")]
    ImageDecode {
        id: PlanetId,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Channel(#[from] crate::events::ChannelError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl PipelineError {
    /// Classify a listing fetch error as transport or parse failure.
    pub fn from_fetch(err: PlanetsError) -> Self {
        if err.is_transport() {
            PipelineError::FetchTransport(err)
        } else {
            PipelineError::FetchParse(err)
        }
    }
}
