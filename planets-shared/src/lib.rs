//! Types and HTTP client for the planet catalogue service.
//!
//! Shared by anything that talks to the `/planets` endpoint: the catalogue
//! records themselves and a small async client for the list and image routes.

pub mod client;
mod planet;

pub use client::{PlanetsClient, PlanetsError};
pub use planet::{Planet, PlanetId};
