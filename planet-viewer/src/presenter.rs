//! Consumer side of a finished fetch cycle.

use std::io::Write;

use planets_shared::Planet;

use crate::images::ImageMapping;

/// Receives the final result of a fetch cycle, or a message for the user.
pub trait ResultPresenter: Send {
    /// Planets in server order together with whatever images loaded.
    fn present(&mut self, planets: &[Planet], images: &ImageMapping);

    /// Short user-facing notice (network unavailable, fetch failure).
    fn notify(&mut self, message: &str);
}

/// Prints one row per planet to a writer.
pub struct TerminalPresenter<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_rows(&mut self, planets: &[Planet], images: &ImageMapping) -> std::io::Result<()> {
        for planet in planets {
            match images.get(planet.planet_id) {
                Some(image) => writeln!(
                    self.out,
                    "{:>4}  {:<12} {}x{}",
                    planet.planet_id.0,
                    planet.name,
                    image.width(),
                    image.height()
                )?,
                None => writeln!(
                    self.out,
                    "{:>4}  {:<12} (no image)",
                    planet.planet_id.0, planet.name
                )?,
            }
        }
        self.out.flush()
    }
}

impl<W: Write + Send> ResultPresenter for TerminalPresenter<W> {
    fn present(&mut self, planets: &[Planet], images: &ImageMapping) {
        if let Err(e) = self.write_rows(planets, images) {
            tracing::warn!("Failed to write planet list: {e}");
        }
    }

    fn notify(&mut self, message: &str) {
        if let Err(e) = writeln!(self.out, "{message}") {
            tracing::warn!("Failed to write notice '{message}': {e}");
        }
    }
}
