use std::fmt::{self, Display, Formatter, Write};
use std::time::{SystemTime, UNIX_EPOCH};

/// Resource attribute carrying the chip display name
pub const CHIP_NAME: &str = "hardware.chip.name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Temperature,
    Humidity,
    Fan,
}

impl SensorKind {
    pub const ALL: [SensorKind; 3] = [
        SensorKind::Temperature,
        SensorKind::Humidity,
        SensorKind::Fan,
    ];

    /// Match the kind part of a hwmon filename, `temp1_input` has the prefix `temp`
    pub fn from_prefix(prefix: &str) -> Option<SensorKind> {
        match prefix {
            "temp" => Some(SensorKind::Temperature),
            "humidity" => Some(SensorKind::Humidity),
            "fan" => Some(SensorKind::Fan),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            SensorKind::Temperature => "temp",
            SensorKind::Humidity => "humidity",
            SensorKind::Fan => "fan",
        }
    }

    pub fn metric_name(self) -> &'static str {
        match self {
            SensorKind::Temperature => "hardware.temperature",
            SensorKind::Humidity => "hardware.humidity",
            SensorKind::Fan => "hardware.fan_speed",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            SensorKind::Temperature => "Cel",
            SensorKind::Humidity => "%",
            SensorKind::Fan => "{rpm}",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SensorKind::Temperature => "Temperature reported by a hardware sensor",
            SensorKind::Humidity => "Relative humidity reported by a hardware sensor",
            SensorKind::Fan => "Fan speed reported by a hardware sensor",
        }
    }

    /// Fans report plain RPM, everything else is in milli-units
    pub fn convert(self, raw: i32) -> Reading {
        match self {
            SensorKind::Fan => Reading::Int(raw.into()),
            SensorKind::Temperature | SensorKind::Humidity => {
                Reading::Double(f64::from(raw) / 1000.0)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Int(i64),
    Double(f64),
}

/// Nanoseconds since the unix epoch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn now() -> Timestamp {
        SystemTime::now().into()
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        time.duration_since(UNIX_EPOCH)
            .map(|since| Timestamp(since.as_nanos() as u64))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    pub attributes: Vec<(&'static str, String)>,
}

impl Resource {
    pub fn chip(name: &str) -> Resource {
        Resource {
            attributes: vec![(CHIP_NAME, name.into())],
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub timestamp: Timestamp,
    pub value: Reading,
    pub sensor: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: &'static str,
    pub unit: &'static str,
    pub description: &'static str,
    pub data_points: Vec<DataPoint>,
}

impl Metric {
    pub fn new(kind: SensorKind) -> Metric {
        Metric {
            name: kind.metric_name(),
            unit: kind.unit(),
            description: kind.description(),
            data_points: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceMetrics {
    pub resource: Resource,
    pub metrics: Vec<Metric>,
}

/// One scrape worth of metrics, grouped per chip
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    pub resource_metrics: Vec<ResourceMetrics>,
}

impl Metrics {
    pub fn is_empty(&self) -> bool {
        self.resource_metrics.is_empty()
    }

    pub fn metric_count(&self) -> usize {
        self.resource_metrics
            .iter()
            .map(|resource| resource.metrics.len())
            .sum()
    }

    pub fn data_point_count(&self) -> usize {
        self.data_points().count()
    }

    /// All data points in emission order, with the resource they belong to
    pub fn data_points(&self) -> impl Iterator<Item = (&Resource, &Metric, &DataPoint)> {
        self.resource_metrics.iter().flat_map(|resource| {
            resource.metrics.iter().flat_map(move |metric| {
                metric
                    .data_points
                    .iter()
                    .map(move |point| (&resource.resource, metric, point))
            })
        })
    }

    /// Write metrics in prometheus compatible format
    pub fn write<W: Write>(&self, mut w: W, hostname: &str) {
        for resource in &self.resource_metrics {
            let chip = resource.resource.attribute(CHIP_NAME).unwrap_or_default();
            for metric in &resource.metrics {
                let name = metric.name.replace('.', "_");
                for point in &metric.data_points {
                    match point.value {
                        Reading::Int(value) => writeln!(
                            &mut w,
                            r#"{}{{host="{}", chip="{}", sensor="{}", label="{}"}} {}"#,
                            name,
                            Escaped(hostname),
                            Escaped(chip),
                            Escaped(&point.sensor),
                            Escaped(&point.label),
                            value
                        )
                        .ok(),
                        Reading::Double(value) => writeln!(
                            &mut w,
                            r#"{}{{host="{}", chip="{}", sensor="{}", label="{}"}} {:?}"#,
                            name,
                            Escaped(hostname),
                            Escaped(chip),
                            Escaped(&point.sensor),
                            Escaped(&point.label),
                            value
                        )
                        .ok(),
                    };
                }
            }
        }
    }
}

/// Label value escaping for the prometheus text format
struct Escaped<'a>(&'a str);

impl Display for Escaped<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '\\' => f.write_str(r"\\")?,
                '"' => f.write_str(r#"\""#)?,
                '\n' => f.write_str(r"\n")?,
                c => f.write_char(c)?,
            }
        }
        Ok(())
    }
}
