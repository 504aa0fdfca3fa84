//! Background fetch of the planet listing.

use planets_shared::PlanetsClient;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::events::{CycleId, EventPublisher, FetchEvent};

/// Fetches the listing once per call and turns the outcome into a
/// [`FetchEvent`]. No retries.
#[derive(Debug, Clone)]
pub struct FetchService {
    client: PlanetsClient,
}

impl FetchService {
    pub fn new(client: PlanetsClient) -> Self {
        Self { client }
    }

    /// Perform one GET of the listing. Every error becomes `Failure`.
    pub async fn fetch(&self) -> FetchEvent {
        match self.client.fetch_planets().await {
            Ok(planets) => {
                info!(
                    "Fetched {} planets from {}",
                    planets.len(),
                    self.client.base_url()
                );
                FetchEvent::Success(planets)
            }
            Err(e) => {
                let err = PipelineError::from_fetch(e);
                warn!("{err}");
                FetchEvent::Failure(err.to_string())
            }
        }
    }

    /// Run [`fetch`](Self::fetch) on the runtime and publish its single
    /// event tagged with `cycle`.
    pub fn spawn(&self, cycle: CycleId, publisher: EventPublisher) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let event = service.fetch().await;
            if !publisher.publish(cycle, event) {
                warn!("Fetch result for cycle {cycle} was not delivered");
            }
        })
    }
}
