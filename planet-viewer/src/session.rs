//! Coordinates fetch cycles for one consuming presenter.
//!
//! A cycle is: connectivity gate, listing fetch (published on the event
//! channel), then on success a background image batch whose result goes to
//! the presenter. At most one fetch and one image batch run per session.
//! Starting a new cycle aborts whatever the previous one still had in
//! flight, and anything the old cycle manages to publish is discarded by
//! its [`CycleId`].

use planets_shared::PlanetsClient;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ViewerConfig};
use crate::error::PipelineError;
use crate::events::{
    ChannelError, CycleEvent, CycleId, EventChannel, EventPublisher, FetchEvent, Subscription,
};
use crate::fetch::FetchService;
use crate::images::{ImageLoader, LoadedCycle};
use crate::network::NetworkAvailability;
use crate::presenter::ResultPresenter;

/// How a fetch cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Planets and images were handed to the presenter
    Presented {
        cycle: CycleId,
        planets: usize,
        images: usize,
    },
    /// The listing fetch failed; the presenter was notified
    FetchFailed { cycle: CycleId, message: String },
    /// The image task died without producing a mapping
    LoadFailed { cycle: CycleId, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Fetching,
    Loading,
}

enum Step {
    Event(Option<CycleEvent>),
    Loaded(Result<LoadedCycle, JoinError>),
}

pub struct Session<N: NetworkAvailability, P: ResultPresenter> {
    network: N,
    fetcher: FetchService,
    loader: ImageLoader,
    presenter: P,
    publisher: EventPublisher,
    subscription: Subscription,
    cycle: CycleId,
    phase: Phase,
    fetch_task: Option<JoinHandle<()>>,
    load_task: Option<JoinHandle<LoadedCycle>>,
}

impl<N: NetworkAvailability, P: ResultPresenter> Session<N, P> {
    /// Create a session and register it as the channel's subscriber.
    pub fn new(
        network: N,
        client: PlanetsClient,
        presenter: P,
        channel: &EventChannel,
    ) -> Result<Self, PipelineError> {
        let subscription = channel.subscribe()?;
        Ok(Self {
            network,
            fetcher: FetchService::new(client.clone()),
            loader: ImageLoader::new(client),
            presenter,
            publisher: channel.publisher(),
            subscription,
            cycle: CycleId::default(),
            phase: Phase::Idle,
            fetch_task: None,
            load_task: None,
        })
    }

    /// Validate `config` and build a session with its own channel and client.
    pub fn from_config(
        network: N,
        presenter: P,
        config: &ViewerConfig,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let client = PlanetsClient::with_timeout(&config.planets_url, config.request_timeout)
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        let channel = EventChannel::new(config.channel_capacity);
        Self::new(network, client, presenter, &channel)
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Id of the most recently started cycle.
    pub fn current_cycle(&self) -> CycleId {
        self.cycle
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// True while the image batch of the current cycle is running.
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Begin a new fetch cycle.
    ///
    /// Without connectivity the presenter is told so and nothing is
    /// requested or published.
    pub fn start_cycle(&mut self) -> Result<CycleId, PipelineError> {
        if !self.network.is_available() {
            let err = PipelineError::NetworkUnavailable;
            warn!("{err}, not starting fetch cycle");
            self.presenter.notify(&err.to_string());
            return Err(err);
        }

        self.abort_in_flight();
        let stale = self.subscription.drain();
        if stale > 0 {
            debug!("Dropped {stale} undelivered event(s) from earlier cycles");
        }

        self.cycle = self.cycle.next();
        info!("Starting fetch cycle {}", self.cycle);

        self.fetch_task = Some(self.fetcher.spawn(self.cycle, self.publisher.clone()));
        self.phase = Phase::Fetching;
        Ok(self.cycle)
    }

    /// Drive the current cycle until it reaches the presenter.
    ///
    /// Returns `None` when no cycle is in progress.
    pub async fn next_outcome(&mut self) -> Option<CycleOutcome> {
        loop {
            if self.phase == Phase::Idle {
                return None;
            }

            let step = tokio::select! {
                received = self.subscription.recv() => Step::Event(received),
                joined = join_loader(&mut self.load_task) => Step::Loaded(joined),
            };

            let outcome = match step {
                Step::Event(Some(received)) => self.on_event(received),
                Step::Event(None) => {
                    warn!("{}", ChannelError::Closed);
                    self.phase = Phase::Idle;
                    return None;
                }
                Step::Loaded(joined) => self.on_loaded(joined),
            };

            if outcome.is_some() {
                self.phase = Phase::Idle;
                return outcome;
            }
        }
    }

    /// [`start_cycle`](Self::start_cycle) followed by
    /// [`next_outcome`](Self::next_outcome).
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, PipelineError> {
        self.start_cycle()?;
        self.next_outcome()
            .await
            .ok_or(PipelineError::Channel(ChannelError::Closed))
    }

    fn on_event(&mut self, received: CycleEvent) -> Option<CycleOutcome> {
        if received.cycle != self.cycle || self.phase != Phase::Fetching {
            debug!(
                "Ignoring stale fetch event from cycle {} (current {})",
                received.cycle, self.cycle
            );
            return None;
        }

        self.fetch_task = None;
        match received.event {
            FetchEvent::Failure(message) => {
                self.presenter.notify(&message);
                Some(CycleOutcome::FetchFailed {
                    cycle: received.cycle,
                    message,
                })
            }
            FetchEvent::Success(planets) => {
                info!(
                    "Cycle {}: loading images for {} planets",
                    self.cycle,
                    planets.len()
                );
                self.load_task = Some(self.loader.spawn(self.cycle, planets));
                self.phase = Phase::Loading;
                None
            }
        }
    }

    fn on_loaded(&mut self, joined: Result<LoadedCycle, JoinError>) -> Option<CycleOutcome> {
        match joined {
            Ok(loaded) if loaded.cycle == self.cycle => {
                self.presenter.present(&loaded.planets, &loaded.images);
                Some(CycleOutcome::Presented {
                    cycle: loaded.cycle,
                    planets: loaded.planets.len(),
                    images: loaded.images.len(),
                })
            }
            Ok(loaded) => {
                debug!("Discarding images from stale cycle {}", loaded.cycle);
                self.phase = Phase::Idle;
                None
            }
            Err(e) if e.is_cancelled() => {
                debug!("Image batch for cycle {} was cancelled", self.cycle);
                self.phase = Phase::Idle;
                None
            }
            Err(e) => {
                warn!("Image task for cycle {} failed: {e}", self.cycle);
                Some(CycleOutcome::LoadFailed {
                    cycle: self.cycle,
                    message: e.to_string(),
                })
            }
        }
    }

    fn abort_in_flight(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            debug!("Aborting fetch of cycle {}", self.cycle);
            task.abort();
        }
        if let Some(task) = self.load_task.take() {
            debug!("Aborting image batch of cycle {}", self.cycle);
            task.abort();
        }
        self.phase = Phase::Idle;
    }
}

impl<N: NetworkAvailability, P: ResultPresenter> Drop for Session<N, P> {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}

async fn join_loader(task: &mut Option<JoinHandle<LoadedCycle>>) -> Result<LoadedCycle, JoinError> {
    match task {
        Some(handle) => {
            let joined = handle.await;
            *task = None;
            joined
        }
        None => std::future::pending().await,
    }
}
