pub mod filename;
pub mod hwmon;

use self::hwmon::{Chip, FileReader, ValueReader};
use crate::builder::{MetricsBuilder, MetricsSink};
use crate::config::ScraperConfig;
use crate::data::{Metrics, Timestamp};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Feed every chip to `sink` in order, giving up on the first failed sensor
pub fn scrape_chips<S: MetricsSink + ?Sized>(
    chips: &[Chip],
    sink: &mut S,
    timestamp: Timestamp,
) -> Result<()> {
    for chip in chips {
        chip.scrape(sink, timestamp)?;
    }
    Ok(())
}

/// Discovers hwmon chips once and scrapes them on demand
pub struct Scraper {
    config: ScraperConfig,
    reader: Arc<dyn ValueReader>,
    chips: Option<Vec<Chip>>,
}

impl Scraper {
    pub fn new(config: ScraperConfig) -> Scraper {
        Scraper::with_reader(config, Arc::new(FileReader))
    }

    pub fn with_reader(config: ScraperConfig, reader: Arc<dyn ValueReader>) -> Scraper {
        Scraper {
            config,
            reader,
            chips: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn is_started(&self) -> bool {
        self.chips.is_some()
    }

    /// Discover chips, an empty or absent root leaves the scraper with nothing to scrape
    pub fn start(&mut self, root_override: Option<PathBuf>) {
        if self.is_started() {
            warn!(root = %self.config.root.display(), "scraper already started");
            return;
        }
        if let Some(root) = root_override {
            self.config.root = root;
        }

        let chips = Chip::discover(&self.config.root, &self.config.metrics, &self.reader);
        info!(
            root = %self.config.root.display(),
            chips = chips.len(),
            sensors = chips.iter().map(|chip| chip.sensors().len()).sum::<usize>(),
            "discovered hwmon chips"
        );
        self.chips = Some(chips);
    }

    pub fn chips(&self) -> &[Chip] {
        self.chips.as_deref().unwrap_or_default()
    }

    pub fn scrape(&mut self) -> Result<Metrics> {
        self.scrape_at(Timestamp::now())
    }

    /// Scrape all chips with a shared timestamp, any failing sensor fails the whole scrape
    pub fn scrape_at(&mut self, timestamp: Timestamp) -> Result<Metrics> {
        let chips = self.chips.as_deref().ok_or(Error::NotStarted)?;
        let mut builder = MetricsBuilder::new();
        scrape_chips(chips, &mut builder, timestamp)?;
        Ok(builder.emit())
    }
}
