#![allow(async_fn_in_trait)]

use error::BackendError;
use tracing::Level;
use tracing_futures::Instrument;
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::data::Store;
use crate::error::ConfigurationError;
use crate::security::Security;

pub mod config;
pub mod data;
pub mod error;
pub mod role;
pub mod security;
pub mod util;

/// Builds a store from `$CONFIG_DIR/settings.yml` and seeds it when enabled.
pub async fn create(log_level: Option<Level>) -> Result<Store, BackendError> {
    if let Some(l) = log_level {
        if let Err(err) = tracing_log::LogTracer::init() {
            eprintln!("Unable to forward log records: {}", err);
        }

        let subscriber = FmtSubscriber::builder().with_max_level(l).finish();

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Unable to set global logger: {}", err);
        };
    }

    tracing::info!("Reading .env file...");
    if dotenv::dotenv().is_err() {
        tracing::warn!("Unable to load .env file.");
    }

    tracing::info!("Loading configuration...");
    let c = match Config::load() {
        Ok(c) => {
            tracing::info!("Configuration loaded.");
            c
        }
        Err(ConfigurationError::NotFound(_)) => {
            let c = Config::default();
            if c.save().is_err() {
                tracing::warn!("Unable to save generated configuration.");
            }
            c
        }
        Err(other) => {
            tracing::error!("Configuration error: {}", other);
            return Err(other.into());
        }
    };

    tracing::info!("Initializing password security...");
    let security = Security::load(&c)?;

    let seed = c.seed;
    tracing::info!("Simulated latency: {}ms", c.latency_ms);
    let store = Store::new(c, security);

    if seed {
        data::seed::seed(&store)
            .instrument(tracing::info_span!("seed"))
            .await?;
    }

    Ok(store)
}
