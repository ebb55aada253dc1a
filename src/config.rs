use crate::data::paging::PageState;
use crate::error::{ConfigurationError, StoreResult};
use crate::util;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn env_or<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    env::var(key)
        .ok()
        .and_then(|it| it.parse().ok())
        .unwrap_or(fallback)
}

fn default_latency_ms() -> u64 {
    env_or("PORTAL_LATENCY_MS", 500)
}

fn default_page_length() -> usize {
    env_or("PORTAL_PAGE_LENGTH", 10)
}

fn default_seed() -> bool {
    env_or("PORTAL_SEED", true)
}

fn default_password_cost() -> u32 {
    env_or("PORTAL_PASSWORD_COST", 10)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    file_path: PathBuf,

    /// Delay every store operation waits before completing.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    #[serde(default = "default_page_length")]
    pub page_length: usize,

    #[serde(default = "default_seed")]
    pub seed: bool,
    /// bcrypt cost; capped at 31.
    #[serde(default = "default_password_cost")]
    pub password_cost: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file_path: config_dir().join("settings.yml"),
            latency_ms: default_latency_ms(),
            page_length: default_page_length(),
            seed: default_seed(),
            password_cost: default_password_cost(),
        }
    }
}

#[inline]
fn config_dir() -> PathBuf {
    PathBuf::from(env::var("CONFIG_DIR").unwrap_or("./config".to_string()))
}

impl Config {
    pub fn load() -> Result<Config, ConfigurationError> {
        let config_file = util::find_first_subpath(
            config_dir(),
            &["settings.yml", "settings.yaml"],
            Path::exists,
        )
        .ok_or_else(|| ConfigurationError::NotFound(config_dir()))?;

        let file = File::open(&config_file)?;
        let mut config: Config = serde_yaml::from_reader(BufReader::new(file))?;
        config.file_path = config_file;

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigurationError> {
        if let Some(dir) = self.file_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let file = File::create(&self.file_path)?;
        let mut out = BufWriter::new(file);
        serde_yaml::to_writer(&mut out, self)?;
        out.flush()?;
        Ok(())
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Config {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_password_cost(mut self, password_cost: u32) -> Config {
        self.password_cost = password_cost;
        self
    }

    pub fn with_seed(mut self, seed: bool) -> Config {
        self.seed = seed;
        self
    }

    #[inline]
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Page `page` using the configured default page length.
    pub fn page_state(&self, page: usize) -> StoreResult<PageState> {
        PageState::new(page, self.page_length)
    }
}
