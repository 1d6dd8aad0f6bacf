use crate::builder::MetricsSink;
use crate::config::MetricsConfig;
use crate::data::{Reading, Resource, SensorKind, Timestamp};
use crate::linux::filename::parse_sensor_filename;
use crate::{Error, Result};
use std::fmt::{self, Debug, Formatter};
use std::fs::{read_dir, read_to_string};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

fn read_to_string_trimmed(path: &Path) -> io::Result<String> {
    let mut s = read_to_string(path)?;
    let len = s.trim_end().len();
    s.truncate(len);
    Ok(s)
}

/// Source of raw sensor values
pub trait ValueReader: Send + Sync {
    fn read_raw(&self, path: &Path) -> Result<i32>;
}

/// Reads the value file on every call, so a sensor that disappears shows up as an error
#[derive(Debug, Default, Clone, Copy)]
pub struct FileReader;

impl ValueReader for FileReader {
    fn read_raw(&self, path: &Path) -> Result<i32> {
        let raw = read_to_string_trimmed(path).map_err(|error| {
            warn!("failed to read sensor {}: {error:#}", path.display());
            Error::Read {
                path: path.into(),
                error,
            }
        })?;
        raw.trim().parse().map_err(|error| {
            warn!("invalid value {raw:?} in sensor {}", path.display());
            Error::Parse {
                path: path.into(),
                error,
            }
        })
    }
}

pub struct Chip {
    device: String,
    name: String,
    resource: Resource,
    sensors: Vec<Sensor>,
}

impl Chip {
    #[instrument(skip_all, fields(path = ?path))]
    pub fn new(
        path: &Path,
        config: &MetricsConfig,
        reader: &Arc<dyn ValueReader>,
    ) -> io::Result<Chip> {
        let device = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "invalid device name"))?
            .to_string();
        let name = read_to_string_trimmed(&path.join("name"))?;

        let sensors = read_dir(path)
            .into_iter()
            .flatten()
            .flatten()
            .filter(|entry| entry.file_type().map_or(false, |ty| ty.is_file()))
            .filter_map(|entry| {
                let file_name = entry.file_name();
                Sensor::from_file(path, &device, file_name.to_str()?, config, reader)
            })
            .collect::<Vec<_>>();
        debug!(device = %device, name = %name, sensors = sensors.len(), "found chip");

        Ok(Chip {
            resource: Resource::chip(&name),
            device,
            name,
            sensors,
        })
    }

    /// All readable chips under `root` in directory order, an unreadable root gives no chips
    #[instrument(skip(config, reader))]
    pub fn discover(
        root: &Path,
        config: &MetricsConfig,
        reader: &Arc<dyn ValueReader>,
    ) -> Vec<Chip> {
        let devices = read_dir(root).into_iter().flatten().flatten();
        devices
            .map(|device| device.path())
            .filter(|path| path.is_dir())
            .filter_map(|path| match Chip::new(&path, config, reader) {
                Ok(chip) => Some(chip),
                Err(e) => {
                    debug!("skipping {}: {e:#}", path.display());
                    None
                }
            })
            .collect()
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Record every sensor, then flush them as one batch for this chip.
    ///
    /// Stops at the first sensor that can't be read.
    pub fn scrape<S: MetricsSink + ?Sized>(
        &self,
        sink: &mut S,
        timestamp: Timestamp,
    ) -> Result<()> {
        for sensor in &self.sensors {
            let reading = sensor.read()?;
            sink.record_reading(sensor.kind, timestamp, reading, &sensor.id, &sensor.label);
        }
        sink.flush_for_resource(&self.resource);
        Ok(())
    }
}

impl Debug for Chip {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chip")
            .field("device", &self.device)
            .field("name", &self.name)
            .field("sensors", &self.sensors)
            .finish()
    }
}

pub struct Sensor {
    kind: SensorKind,
    number: u32,
    id: String,
    path: PathBuf,
    label: String,
    reader: Arc<dyn ValueReader>,
}

impl Sensor {
    /// Build a sensor for `<kind><id>_input` files of an enabled kind, other files are ignored
    pub fn from_file(
        chip_path: &Path,
        device: &str,
        file_name: &str,
        config: &MetricsConfig,
        reader: &Arc<dyn ValueReader>,
    ) -> Option<Sensor> {
        let parsed = parse_sensor_filename(file_name)?;
        let kind = SensorKind::from_prefix(parsed.kind)?;
        if parsed.property != "input" {
            return None;
        }
        if !config.enabled(kind) {
            debug!(file_name, "sensor kind disabled");
            return None;
        }

        Some(Sensor {
            kind,
            number: parsed.id,
            id: format!("{device}_{}{}", kind.prefix(), parsed.id),
            path: chip_path.join(file_name),
            label: resolve_label(chip_path, kind),
            reader: Arc::clone(reader),
        })
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn read(&self) -> Result<Reading> {
        let raw = self.reader.read_raw(&self.path)?;
        Ok(self.kind.convert(raw))
    }
}

impl Debug for Sensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sensor")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("path", &self.path)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Shared per-kind label from `temp_label`, empty when the chip has none
fn resolve_label(chip_path: &Path, kind: SensorKind) -> String {
    let file = format!("{}_label", kind.prefix());
    read_to_string_trimmed(&chip_path.join(file)).unwrap_or_default()
}
