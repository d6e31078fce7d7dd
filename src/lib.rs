#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use std::sync::Arc;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, RegistryFairing};
use crate::logging::LoggerFairing;
use crate::model::clock::{SharedClock, SystemClock};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

pub use config::Config;

/// The server as deployed, configured from `Rocket.toml` and the
/// environment, reading the system clock.
pub fn build() -> Rocket<Build> {
    rocket_for_clock(rocket::build(), Arc::new(SystemClock))
}

/// Mount the API on `rocket` and attach everything it needs, with all
/// time-dependent rules judged against `clock`.
pub fn rocket_for_clock(rocket: Rocket<Build>, clock: SharedClock) -> Rocket<Build> {
    rocket
        .mount("/", api::routes())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(RegistryFairing)
        .manage(clock)
}
