//! Per-planet image download and aggregation.
//!
//! Downloads run strictly one after another: the next request is not issued
//! until the previous response has been read and decoded. The work is
//! expressed as a lazy stream of per-planet steps, so bounded parallelism
//! would only change [`ImageLoader::downloads`].

use std::collections::HashMap;
use std::pin::pin;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use image::DynamicImage;
use planets_shared::{Planet, PlanetId, PlanetsClient};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::events::CycleId;

/// Decoded images keyed by planet. Planets whose download or decode failed
/// have no entry.
#[derive(Debug, Clone, Default)]
pub struct ImageMapping {
    images: HashMap<PlanetId, DynamicImage>,
}

impl ImageMapping {
    pub fn get(&self, id: PlanetId) -> Option<&DynamicImage> {
        self.images.get(&id)
    }

    pub fn contains(&self, id: PlanetId) -> bool {
        self.images.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Planet ids that have an image, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = PlanetId> + '_ {
        self.images.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlanetId, &DynamicImage)> {
        self.images.iter().map(|(id, image)| (*id, image))
    }

    fn insert(&mut self, id: PlanetId, image: DynamicImage) {
        self.images.insert(id, image);
    }
}

/// Output of one background image batch.
#[derive(Debug)]
pub struct LoadedCycle {
    pub cycle: CycleId,
    pub planets: Vec<Planet>,
    pub images: ImageMapping,
}

/// Outcome of one planet's download-and-decode step.
pub type ImageStep = (PlanetId, Result<DynamicImage, PipelineError>);

#[derive(Debug, Clone)]
pub struct ImageLoader {
    client: PlanetsClient,
}

impl ImageLoader {
    pub fn new(client: PlanetsClient) -> Self {
        Self { client }
    }

    /// Lazy per-planet download steps, evaluated sequentially in list order.
    pub fn downloads<'a>(&'a self, planets: &'a [Planet]) -> impl Stream<Item = ImageStep> + 'a {
        stream::iter(planets).then(move |planet| self.download(planet.planet_id))
    }

    async fn download(&self, id: PlanetId) -> ImageStep {
        let result = match self.client.fetch_image_bytes(id).await {
            Ok(bytes) => decode_image(id, &bytes),
            Err(source) => Err(PipelineError::ImageTransport { id, source }),
        };
        (id, result)
    }

    /// Download every planet's image and collect the ones that decode.
    ///
    /// A failure for one planet is logged and skipped; it never stops the
    /// rest of the batch.
    pub async fn load_images(&self, planets: &[Planet]) -> ImageMapping {
        let mut mapping = ImageMapping::default();
        let mut failed = 0usize;

        let mut steps = pin!(self.downloads(planets));
        while let Some((id, result)) = steps.next().await {
            match result {
                Ok(image) => mapping.insert(id, image),
                Err(e) => {
                    failed += 1;
                    warn!("{e}");
                }
            }
        }

        info!(
            "Loaded {} of {} planet images ({failed} failed)",
            mapping.len(),
            planets.len()
        );
        mapping
    }

    /// Run [`load_images`](Self::load_images) as a background task.
    ///
    /// The partial mapping lives inside the task, so aborting the returned
    /// handle drops it along with any download in progress.
    pub fn spawn(&self, cycle: CycleId, planets: Vec<Planet>) -> JoinHandle<LoadedCycle> {
        let loader = self.clone();
        tokio::spawn(async move {
            let images = loader.load_images(&planets).await;
            LoadedCycle {
                cycle,
                planets,
                images,
            }
        })
    }
}

fn decode_image(id: PlanetId, bytes: &Bytes) -> Result<DynamicImage, PipelineError> {
    image::load_from_memory(bytes).map_err(|source| PipelineError::ImageDecode { id, source })
}
