use crate::data::{
    DataPoint, Metric, Metrics, Reading, Resource, ResourceMetrics, SensorKind, Timestamp,
};
use std::mem::take;

/// Receiver for the readings of a scrape
pub trait MetricsSink {
    fn record_reading(
        &mut self,
        kind: SensorKind,
        timestamp: Timestamp,
        reading: Reading,
        sensor: &str,
        label: &str,
    );

    /// Group everything recorded since the last flush under `resource`
    fn flush_for_resource(&mut self, resource: &Resource);
}

/// Collects readings into [`Metrics`], one [`ResourceMetrics`] per flushed resource.
///
/// Metrics keep the order in which their kind was first recorded, data points
/// keep recording order.
#[derive(Debug, Default)]
pub struct MetricsBuilder {
    pending: Vec<Metric>,
    emitted: Vec<ResourceMetrics>,
}

impl MetricsBuilder {
    pub fn new() -> Self {
        MetricsBuilder::default()
    }

    /// Take all flushed resources, anything still pending goes out with an empty resource
    pub fn emit(&mut self) -> Metrics {
        if !self.pending.is_empty() {
            self.flush_for_resource(&Resource::default());
        }
        Metrics {
            resource_metrics: take(&mut self.emitted),
        }
    }
}

impl MetricsSink for MetricsBuilder {
    fn record_reading(
        &mut self,
        kind: SensorKind,
        timestamp: Timestamp,
        reading: Reading,
        sensor: &str,
        label: &str,
    ) {
        let point = DataPoint {
            timestamp,
            value: reading,
            sensor: sensor.into(),
            label: label.into(),
        };
        match self
            .pending
            .iter_mut()
            .find(|metric| metric.name == kind.metric_name())
        {
            Some(metric) => metric.data_points.push(point),
            None => {
                let mut metric = Metric::new(kind);
                metric.data_points.push(point);
                self.pending.push(metric);
            }
        }
    }

    fn flush_for_resource(&mut self, resource: &Resource) {
        // resources without any readings don't show up in the output
        if self.pending.is_empty() {
            return;
        }
        self.emitted.push(ResourceMetrics {
            resource: resource.clone(),
            metrics: take(&mut self.pending),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_per_resource() {
        let mut builder = MetricsBuilder::new();
        let ts = Timestamp(10);
        let temperature = SensorKind::Temperature;
        builder.record_reading(temperature, ts, Reading::Double(23.0), "hwmon0_temp1", "");
        builder.record_reading(SensorKind::Fan, ts, Reading::Int(900), "hwmon0_fan1", "");
        builder.record_reading(temperature, ts, Reading::Double(50.0), "hwmon0_temp2", "");
        builder.flush_for_resource(&Resource::chip("fake"));
        let humidity = SensorKind::Humidity;
        builder.record_reading(humidity, ts, Reading::Double(4.2), "hwmon1_humidity1", "room");
        builder.flush_for_resource(&Resource::chip("fake2"));

        let metrics = builder.emit();
        assert_eq!(metrics.resource_metrics.len(), 2);
        assert_eq!(metrics.metric_count(), 3);
        assert_eq!(metrics.data_point_count(), 4);

        let first = &metrics.resource_metrics[0];
        assert_eq!(first.resource, Resource::chip("fake"));
        let names = first.metrics.iter().map(|metric| metric.name).collect::<Vec<_>>();
        assert_eq!(names, ["hardware.temperature", "hardware.fan_speed"]);
        let temperatures = first.metrics[0]
            .data_points
            .iter()
            .map(|point| point.value)
            .collect::<Vec<_>>();
        assert_eq!(temperatures, [Reading::Double(23.0), Reading::Double(50.0)]);
        assert_eq!(first.metrics[0].unit, "Cel");

        let second = &metrics.resource_metrics[1];
        assert_eq!(second.metrics[0].unit, "%");
        assert_eq!(second.metrics[0].data_points[0].label, "room");
    }

    #[test]
    fn test_empty_flush() {
        let mut builder = MetricsBuilder::new();
        builder.flush_for_resource(&Resource::chip("empty"));
        assert!(builder.emit().is_empty());
    }

    #[test]
    fn test_emit_drains() {
        let mut builder = MetricsBuilder::new();
        builder.record_reading(SensorKind::Fan, Timestamp(1), Reading::Int(1), "a", "");
        let metrics = builder.emit();
        assert_eq!(metrics.resource_metrics[0].resource, Resource::default());
        assert!(builder.emit().is_empty());
    }
}
