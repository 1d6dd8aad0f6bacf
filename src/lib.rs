pub mod builder;
pub mod config;
pub mod data;
pub mod linux;

pub use crate::builder::{MetricsBuilder, MetricsSink};
pub use crate::config::{MetricConfig, MetricsConfig, ScraperConfig, DEFAULT_ROOT};
pub use crate::data::{Metrics, Reading, Resource, SensorKind, Timestamp};
pub use crate::linux::hwmon::{Chip, FileReader, Sensor, ValueReader};
pub use crate::linux::Scraper;

use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read sensor {}: {error:#}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        error: io::Error,
    },
    #[error("invalid value in sensor {}: {error:#}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        error: ParseIntError,
    },
    #[error("scrape called before the scraper was started")]
    NotStarted,
    #[error("{message}: {error:#}")]
    Io {
        message: &'static str,
        #[source]
        error: io::Error,
    },
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn io(message: &'static str, error: io::Error) -> Self {
        Error::Io { message, error }
    }
}

pub trait IoResultExt<T> {
    fn context(self, message: &'static str) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn context(self, message: &'static str) -> Result<T> {
        self.map_err(|error| Error::io(message, error))
    }
}

pub fn hostname() -> Result<String> {
    hostname::get()
        .context("error getting hostname")?
        .into_string()
        .map_err(|_| Error::Other("non utf8 hostname".into()))
}
