//! Fetch the planet catalogue and print it with image sizes.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use planet_viewer::config::{DEFAULT_PROBE_ADDR, LOCAL_PLANETS_URL, REMOTE_PLANETS_URL};
use planet_viewer::{
    CycleOutcome, NetworkAvailability, PipelineError, RouteProbe, Session, StaticAvailability,
    TerminalPresenter, ViewerConfig,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Show the planet catalogue with downloaded images")]
struct Args {
    /// Planet listing URL; images are fetched from <URL>/<id>/image
    #[arg(long, env = "PLANETS_URL", default_value = REMOTE_PLANETS_URL)]
    url: String,

    /// Use a development server on this machine instead of --url
    #[arg(long)]
    localhost: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Address used to check for an outbound route
    #[arg(long, default_value = DEFAULT_PROBE_ADDR)]
    probe: SocketAddr,

    /// Treat the network as unavailable
    #[arg(long)]
    offline: bool,
}

impl Args {
    fn config(&self) -> ViewerConfig {
        let url = if self.localhost {
            LOCAL_PLANETS_URL
        } else {
            self.url.as_str()
        };

        ViewerConfig {
            request_timeout: Duration::from_secs(self.timeout_secs),
            probe_addr: self.probe,
            ..ViewerConfig::with_url(url)
        }
    }

    fn network(&self, config: &ViewerConfig) -> Arc<dyn NetworkAvailability> {
        if self.offline {
            Arc::new(StaticAvailability(false))
        } else {
            Arc::new(RouteProbe::from(config))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = args.config();
    info!("Using planet service at {}", config.planets_url);

    let presenter = TerminalPresenter::new(std::io::stdout());
    let mut session = Session::from_config(args.network(&config), presenter, &config)?;

    match session.start_cycle() {
        Ok(_) => {}
        Err(PipelineError::NetworkUnavailable) => return Ok(()),
        Err(e) => return Err(e.into()),
    }

    tokio::select! {
        outcome = session.next_outcome() => match outcome {
            Some(CycleOutcome::Presented { planets, images, .. }) => {
                info!("Presented {planets} planets with {images} images");
            }
            Some(CycleOutcome::FetchFailed { message, .. })
            | Some(CycleOutcome::LoadFailed { message, .. }) => {
                info!("Fetch cycle ended without results: {message}");
            }
            None => {}
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, abandoning fetch cycle");
        }
    }

    Ok(())
}
