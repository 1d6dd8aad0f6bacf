use crate::data::SensorKind;
use std::path::PathBuf;

/// Where the kernel exposes hwmon chips
pub const DEFAULT_ROOT: &str = "/sys/class/hwmon";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricConfig {
    pub enabled: bool,
}

impl Default for MetricConfig {
    fn default() -> Self {
        MetricConfig { enabled: true }
    }
}

/// Per-kind switches, a disabled kind never gets a sensor during discovery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsConfig {
    pub temperature: MetricConfig,
    pub humidity: MetricConfig,
    pub fan_speed: MetricConfig,
}

impl MetricsConfig {
    pub fn get(&self, kind: SensorKind) -> MetricConfig {
        match kind {
            SensorKind::Temperature => self.temperature,
            SensorKind::Humidity => self.humidity,
            SensorKind::Fan => self.fan_speed,
        }
    }

    pub fn enabled(&self, kind: SensorKind) -> bool {
        self.get(kind).enabled
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    pub root: PathBuf,
    pub metrics: MetricsConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        ScraperConfig {
            root: DEFAULT_ROOT.into(),
            metrics: MetricsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_everything() {
        let config = ScraperConfig::default();
        assert_eq!(config.root, PathBuf::from("/sys/class/hwmon"));
        for kind in SensorKind::ALL {
            assert!(config.metrics.enabled(kind));
        }
    }

    #[test]
    fn test_switch_per_kind() {
        let metrics = MetricsConfig {
            humidity: MetricConfig { enabled: false },
            ..MetricsConfig::default()
        };
        assert!(metrics.enabled(SensorKind::Temperature));
        assert!(!metrics.enabled(SensorKind::Humidity));
        assert!(metrics.enabled(SensorKind::Fan));
    }
}
