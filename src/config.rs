use chrono::Duration;
use log::{error, info};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    notification::{Notifier, DEFAULT_EVENT_CAPACITY},
    registry::ElectionRegistry,
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    #[serde(default = "default_event_capacity")]
    event_capacity: usize,
    // secrets
    jwt_secret: String,
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Config {
    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// How many notifications a live subscriber may fall behind by.
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }

    /// Secret key shared with the authentication layer, used to verify JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        Ok(rocket.manage(config))
    }
}

/// A fairing that creates the process-wide [`ElectionRegistry`] and places
/// it into managed state. Must be attached after [`ConfigFairing`].
pub struct RegistryFairing;

#[rocket::async_trait]
impl Fairing for RegistryFairing {
    fn info(&self) -> Info {
        Info {
            name: "Election registry",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let Some(capacity) = rocket.state::<Config>().map(Config::event_capacity) else {
            error!("Cannot create election registry without application config");
            return Err(rocket);
        };

        let registry = ElectionRegistry::new(Notifier::new(capacity));
        info!("Election registry online, notification buffer {capacity}");
        Ok(rocket.manage(registry))
    }
}


#[cfg(test)]
pub(crate) use examples::test_figment;
