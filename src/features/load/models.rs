use crate::shared::collector::LoadCallback;
use crate::shared::error::CollectionError;
use crate::shared::traits::{Event, Identifiable, Severity, Validatable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_PERIOD_MS: u64 = 1000;

/// Resource types that are recognised but cannot be collected.
#[derive(Debug, Clone, PartialEq)]
pub enum UnsupportedItem {
    Memory,
    Unknown(String),
}

/// Which resource to collect load for, keyed by `name` in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLoadItem", into = "RawLoadItem")]
pub enum LoadItemConfig {
    Cpu,
    Disk { drive: String },
    Network { interface: String, max_scale: f64 },
    Gpu,
    Unsupported(UnsupportedItem),
}

impl LoadItemConfig {
    pub fn name(&self) -> &str {
        match self {
            LoadItemConfig::Cpu => "cpu",
            LoadItemConfig::Disk { .. } => "disk",
            LoadItemConfig::Network { .. } => "network",
            LoadItemConfig::Gpu => "gpu",
            LoadItemConfig::Unsupported(UnsupportedItem::Memory) => "memory",
            LoadItemConfig::Unsupported(UnsupportedItem::Unknown(name)) => name,
        }
    }
}

impl Validatable for LoadItemConfig {
    fn validate(&self) -> Result<(), String> {
        match self {
            LoadItemConfig::Disk { drive } if drive.is_empty() => {
                Err("Disk drive cannot be empty".to_string())
            }
            LoadItemConfig::Network { interface, .. } if interface.is_empty() => {
                Err("Network interface cannot be empty".to_string())
            }
            LoadItemConfig::Network { max_scale, .. } if !(max_scale.is_finite() && *max_scale > 0.0) => {
                Err(format!("Network max_scale must be a positive number, got {}", max_scale))
            }
            _ => Ok(()),
        }
    }
}

/// Flat wire form of a load item, as written in YAML or JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawLoadItem {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    drive: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    interface: Option<String>,
    #[serde(default, alias = "maxScale", skip_serializing_if = "Option::is_none")]
    max_scale: Option<f64>,
}

impl TryFrom<RawLoadItem> for LoadItemConfig {
    type Error = String;

    fn try_from(raw: RawLoadItem) -> Result<Self, Self::Error> {
        let item = match raw.name.as_str() {
            "cpu" => LoadItemConfig::Cpu,
            "disk" => LoadItemConfig::Disk {
                drive: raw.drive.ok_or("disk item requires `drive`")?,
            },
            "network" => LoadItemConfig::Network {
                interface: raw.interface.ok_or("network item requires `interface`")?,
                max_scale: raw.max_scale.ok_or("network item requires `max_scale`")?,
            },
            "gpu" => LoadItemConfig::Gpu,
            "memory" => LoadItemConfig::Unsupported(UnsupportedItem::Memory),
            _ => LoadItemConfig::Unsupported(UnsupportedItem::Unknown(raw.name)),
        };
        item.validate()?;
        Ok(item)
    }
}

impl From<LoadItemConfig> for RawLoadItem {
    fn from(item: LoadItemConfig) -> Self {
        let mut raw = RawLoadItem {
            name: item.name().to_string(),
            drive: None,
            interface: None,
            max_scale: None,
        };
        match item {
            LoadItemConfig::Disk { drive } => raw.drive = Some(drive),
            LoadItemConfig::Network { interface, max_scale } => {
                raw.interface = Some(interface);
                raw.max_scale = Some(max_scale);
            }
            _ => {}
        }
        raw
    }
}

/// Everything needed to start one collector.
#[derive(Clone)]
pub struct LoadCollectorSpec {
    /// Sampling period in milliseconds, `DEFAULT_PERIOD_MS` when unset.
    pub period: Option<u64>,
    pub item: LoadItemConfig,
    /// When unset, samples are logged at debug level.
    pub on_load: Option<LoadCallback>,
}

impl LoadCollectorSpec {
    pub fn new(item: LoadItemConfig) -> Self {
        Self {
            period: None,
            item,
            on_load: None,
        }
    }

    pub fn period(mut self, period_ms: u64) -> Self {
        self.period = Some(period_ms);
        self
    }

    pub fn on_load<F>(mut self, on_load: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.on_load = Some(Arc::new(on_load));
        self
    }
}

/// Contents of the `loadmon` configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadMonitorConfig {
    #[serde(default)]
    pub period: Option<u64>,
    pub items: Vec<LoadItemConfig>,
}

impl LoadMonitorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CollectionError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| CollectionError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, CollectionError> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// One load sample as published by `loadmon`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub category: String,
    pub load: f64,
}

impl Event for LoadReport {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn event_type(&self) -> &str {
        "load_sample"
    }

    fn severity(&self) -> Severity {
        if self.load > 0.9 {
            Severity::Critical
        } else if self.load > 0.75 {
            Severity::High
        } else if self.load > 0.6 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl Identifiable for LoadReport {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> &str {
        &self.category
    }
}

impl Validatable for LoadReport {
    fn validate(&self) -> Result<(), String> {
        if self.category.is_empty() {
            return Err("Category cannot be empty".to_string());
        }
        // Loads above 1.0 are legitimate, e.g. network traffic over max_scale.
        if !self.load.is_finite() || self.load < 0.0 {
            return Err(format!("Load must be a finite non-negative number, got {}", self.load));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct LoadReportBuilder {
    id: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    source: Option<String>,
    category: Option<String>,
    load: Option<f64>,
}

impl LoadReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: String) -> Self {
        self.id = Some(id);
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn source(mut self, source: String) -> Self {
        self.source = Some(source);
        self
    }

    pub fn category(mut self, category: String) -> Self {
        self.category = Some(category);
        self
    }

    pub fn load(mut self, load: f64) -> Self {
        self.load = Some(load);
        self
    }

    pub fn build(self) -> Result<LoadReport, String> {
        let report = LoadReport {
            id: self.id.ok_or("id is required")?,
            timestamp: self.timestamp.ok_or("timestamp is required")?,
            source: self.source.ok_or("source is required")?,
            category: self.category.ok_or("category is required")?,
            load: self.load.ok_or("load is required")?,
        };

        report.validate()?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_items() {
        let config = LoadMonitorConfig::from_yaml(
            r#"
period: 2000
items:
  - name: cpu
  - name: disk
    drive: /var/lib
  - name: network
    interface: eth0
    maxScale: 100
  - name: gpu
  - name: memory
  - name: quantum
"#,
        )
        .unwrap();

        assert_eq!(config.period, Some(2000));
        assert_eq!(
            config.items,
            vec![
                LoadItemConfig::Cpu,
                LoadItemConfig::Disk { drive: "/var/lib".to_string() },
                LoadItemConfig::Network { interface: "eth0".to_string(), max_scale: 100.0 },
                LoadItemConfig::Gpu,
                LoadItemConfig::Unsupported(UnsupportedItem::Memory),
                LoadItemConfig::Unsupported(UnsupportedItem::Unknown("quantum".to_string())),
            ]
        );
        assert_eq!(config.items[5].name(), "quantum");
    }

    #[test]
    fn test_period_is_optional() {
        let config = LoadMonitorConfig::from_yaml("items:\n  - name: cpu\n").unwrap();
        assert_eq!(config.period, None);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let result = LoadMonitorConfig::from_yaml("items:\n  - name: disk\n");
        assert!(matches!(result, Err(CollectionError::Config(_))));

        let result = LoadMonitorConfig::from_yaml("items:\n  - name: network\n    interface: eth0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_non_positive_scale_is_rejected() {
        let yaml = "items:\n  - name: network\n    interface: eth0\n    max_scale: 0\n";
        assert!(LoadMonitorConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_item_json_round_trip() {
        let item = LoadItemConfig::Network { interface: "wlan0".to_string(), max_scale: 54.0 };
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"name":"network","interface":"wlan0","max_scale":54.0}"#);
        assert_eq!(serde_json::from_str::<LoadItemConfig>(&json).unwrap(), item);
    }

    #[test]
    fn test_report_builder() {
        let report = LoadReportBuilder::new()
            .id("42".to_string())
            .timestamp(Utc::now())
            .source("host-a".to_string())
            .category("network".to_string())
            .load(1.2)
            .build()
            .unwrap();

        assert_eq!(report.severity(), Severity::Critical);
        assert_eq!(report.event_type(), "load_sample");
        assert_eq!(Identifiable::category(&report), "network");
    }

    #[test]
    fn test_report_requires_valid_load() {
        let builder = || {
            LoadReportBuilder::new()
                .id("1".to_string())
                .timestamp(Utc::now())
                .source("host-a".to_string())
                .category("cpu".to_string())
        };
        assert!(builder().load(f64::NAN).build().is_err());
        assert!(builder().load(-0.1).build().is_err());
        assert!(builder().build().is_err());
        assert_eq!(builder().load(0.3).build().unwrap().severity(), Severity::Low);
    }
}
