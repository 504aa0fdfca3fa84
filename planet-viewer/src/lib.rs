//! Planet catalogue viewer pipeline.
//!
//! Fetches the planet listing in the background, publishes the result on a
//! single-subscriber event channel, then downloads one image per planet and
//! hands the planets plus their images to a [`ResultPresenter`].

pub mod config;
pub mod error;
pub mod events;
pub mod fetch;
pub mod images;
pub mod network;
pub mod presenter;
pub mod session;

pub use config::ViewerConfig;
pub use error::PipelineError;
pub use events::{CycleId, EventChannel, FetchEvent};
pub use images::{ImageLoader, ImageMapping};
pub use network::{NetworkAvailability, RouteProbe, StaticAvailability};
pub use presenter::{ResultPresenter, TerminalPresenter};
pub use session::{CycleOutcome, Session};
