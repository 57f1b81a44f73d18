// Metric snapshot and dashboard configuration domain models
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Reporting period shown by a metrics panel. Declaration order is the cycling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    Live,
    Today,
    Yesterday,
    ThisMonth,
    LastMonth,
    Total,
    PvTotal,
    About,
}

impl MetricKey {
    pub const ALL: [MetricKey; 8] = [
        MetricKey::Live,
        MetricKey::Today,
        MetricKey::Yesterday,
        MetricKey::ThisMonth,
        MetricKey::LastMonth,
        MetricKey::Total,
        MetricKey::PvTotal,
        MetricKey::About,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKey::Live => "live",
            MetricKey::Today => "today",
            MetricKey::Yesterday => "yesterday",
            MetricKey::ThisMonth => "this_month",
            MetricKey::LastMonth => "last_month",
            MetricKey::Total => "total",
            MetricKey::PvTotal => "pv_total",
            MetricKey::About => "about",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            MetricKey::Live => "Live",
            MetricKey::Today => "Today",
            MetricKey::Yesterday => "Yesterday",
            MetricKey::ThisMonth => "This Month",
            MetricKey::LastMonth => "Last Month",
            MetricKey::Total => "Total",
            MetricKey::PvTotal => "PV Total",
            MetricKey::About => "About",
        }
    }

    /// Live readings are instantaneous power, everything else is accumulated energy.
    pub fn is_power(self) -> bool {
        self == MetricKey::Live
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Screen arrangement of panels and charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    #[default]
    Default,
    DualMetrics,
    SingleMetric,
}

impl Layout {
    /// Order used when the user taps through layouts.
    pub const CYCLE: [Layout; 3] = [Layout::Default, Layout::DualMetrics, Layout::SingleMetric];

    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Default => "default",
            Layout::DualMetrics => "dual-metrics",
            Layout::SingleMetric => "single-metric",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown layout '{0}'")]
pub struct UnknownLayout(pub String);

impl FromStr for Layout {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "default" => Ok(Layout::Default),
            "dual-metrics" => Ok(Layout::DualMetrics),
            "single-metric" => Ok(Layout::SingleMetric),
            other => Err(UnknownLayout(other.to_string())),
        }
    }
}

/// A number as the data endpoint may send it: bare, quoted, or something else entirely.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl LooseNumber {
    fn value(self) -> Option<f64> {
        match self {
            LooseNumber::Number(n) => Some(n),
            LooseNumber::Text(s) => s.trim().parse().ok(),
            LooseNumber::Other(_) => None,
        }
    }
}

/// Optional number that tolerates strings, nulls and junk. Unusable values read as absent.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LooseNumber>::deserialize(deserializer)?;
    Ok(value.and_then(LooseNumber::value).filter(|n| n.is_finite()))
}

/// Reading that counts as zero when null or unusable.
fn reading<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.unwrap_or(0.0))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.map(|n| n.max(0.0).min(u32::MAX as f64) as u32))
}

/// Label that some backends send as a number, e.g. a year.
fn lenient_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<LooseNumber>::deserialize(deserializer)? {
        Some(LooseNumber::Text(s)) => Some(s),
        Some(LooseNumber::Number(n)) => Some(n.to_string()),
        Some(LooseNumber::Other(_)) | None => None,
    })
}

/// Readings for one reporting period. Missing numeric readings decode as zero;
/// battery readings stay absent for systems without a battery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "reading")]
    pub import: f64,
    #[serde(default, deserialize_with = "reading")]
    pub consumed: f64,
    #[serde(default, deserialize_with = "reading")]
    pub solar: f64,
    #[serde(default, deserialize_with = "reading")]
    pub solar_consumed: f64,
    #[serde(default, deserialize_with = "reading")]
    pub export: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub battery_charge: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub battery_discharge: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub battery_soc: Option<f64>,
    #[serde(default, deserialize_with = "reading")]
    pub co2: f64,
    #[serde(default, deserialize_with = "reading")]
    pub trees: f64,
    #[serde(default)]
    pub hour: Option<u32>,
    #[serde(default)]
    pub day: Option<u32>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub year: Option<String>,
}

impl MetricSnapshot {
    /// Reading for a chart series field, `None` when the field is not reported.
    pub fn series_value(&self, field: &str) -> Option<f64> {
        match field {
            "import" => Some(self.import),
            "consumed" => Some(self.consumed),
            "solar" => Some(self.solar),
            "solar_consumed" => Some(self.solar_consumed),
            "export" => Some(self.export),
            "battery_charge" => self.battery_charge,
            "battery_discharge" => self.battery_discharge,
            _ => None,
        }
    }
}

/// Dashboard section of the data endpoint. Every field is optional; a missing
/// section or flag means the feature is off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub metrics: BTreeMap<String, bool>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub refresh_interval: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cycle_interval: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub about_screen_cycle_interval: Option<u32>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub about_screen_display_interval: Option<f64>,
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub donut: BTreeMap<String, bool>,
    #[serde(default)]
    pub bar_chart: BTreeMap<String, bool>,
    #[serde(default)]
    pub about_caption: Option<String>,
}

impl DashboardConfig {
    pub fn is_enabled(&self, key: MetricKey) -> bool {
        self.metrics.get(key.as_str()).copied().unwrap_or(false)
    }

    pub fn donut_enabled(&self, field: &str) -> bool {
        self.donut.get(field).copied().unwrap_or(false)
    }

    pub fn bar_chart_enabled(&self, field: &str) -> bool {
        self.bar_chart.get(field).copied().unwrap_or(false)
    }

    /// Layout named by the config, `None` when absent or unrecognised.
    pub fn layout(&self) -> Option<Layout> {
        self.layout.as_deref().and_then(|l| l.parse().ok())
    }
}

/// One response from the data endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSnapshot {
    #[serde(default)]
    pub live: Option<MetricSnapshot>,
    #[serde(default)]
    pub day: Vec<MetricSnapshot>,
    #[serde(default)]
    pub month: Vec<MetricSnapshot>,
    #[serde(default)]
    pub year: Vec<MetricSnapshot>,
    #[serde(default)]
    pub total: Option<MetricSnapshot>,
    #[serde(default)]
    pub pv_total: Option<MetricSnapshot>,
    #[serde(default)]
    pub dashboard: Option<DashboardConfig>,
    #[serde(default)]
    pub last_updated: i64,
    #[serde(default)]
    pub configured: Option<bool>,
    #[serde(default)]
    pub config_ts: Option<f64>,
    #[serde(default)]
    pub setup_url: Option<String>,
}

impl DataSnapshot {
    /// Snapshot backing a metric key. Today/yesterday are the last two daily
    /// entries, this/last month the last two monthly entries.
    pub fn metric(&self, key: MetricKey) -> Option<&MetricSnapshot> {
        match key {
            MetricKey::Live => self.live.as_ref(),
            MetricKey::Today => self.month.last(),
            MetricKey::Yesterday => self.month.iter().rev().nth(1),
            MetricKey::ThisMonth => self.year.last(),
            MetricKey::LastMonth => self.year.iter().rev().nth(1),
            MetricKey::Total => self.total.as_ref(),
            MetricKey::PvTotal => self.pv_total.as_ref(),
            MetricKey::About => None,
        }
    }

    pub fn has_data(&self) -> bool {
        self.last_updated > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_key_order() {
        assert_eq!(MetricKey::Live.index(), 0);
        assert_eq!(MetricKey::About.index(), 7);
        assert_eq!(MetricKey::ThisMonth.to_string(), "this_month");
    }

    #[test]
    fn test_layout_parse() {
        assert_eq!("dual-metrics".parse::<Layout>(), Ok(Layout::DualMetrics));
        assert_eq!(" single-metric ".parse::<Layout>(), Ok(Layout::SingleMetric));
        assert!("portrait".parse::<Layout>().is_err());
    }

    #[test]
    fn test_snapshot_decodes_with_missing_fields() {
        let json = r#"{
            "live": {"import": 1.5, "solar": 0.2, "battery_soc": 64},
            "month": [{"day": 1, "month": "Jan", "import": 3}, {"day": 2, "month": "Jan", "import": 4}],
            "year": [{"month": "Jan", "year": 2024, "solar": 100}],
            "dashboard": {"metrics": {"live": true, "last_12_months": true}, "layout": "bogus"},
            "last_updated": 1700000000,
            "configured": true
        }"#;
        let snapshot: DataSnapshot = serde_json::from_str(json).unwrap();

        let live = snapshot.metric(MetricKey::Live).unwrap();
        assert_eq!(live.import, 1.5);
        assert_eq!(live.co2, 0.0);
        assert_eq!(live.battery_soc, Some(64.0));
        assert_eq!(live.battery_charge, None);

        assert_eq!(snapshot.metric(MetricKey::Today).unwrap().import, 4.0);
        assert_eq!(snapshot.metric(MetricKey::Yesterday).unwrap().import, 3.0);
        assert_eq!(snapshot.metric(MetricKey::ThisMonth).unwrap().solar, 100.0);
        assert_eq!(snapshot.metric(MetricKey::ThisMonth).unwrap().year.as_deref(), Some("2024"));
        assert!(snapshot.metric(MetricKey::LastMonth).is_none());
        assert!(snapshot.metric(MetricKey::About).is_none());

        let dashboard = snapshot.dashboard.unwrap();
        assert!(dashboard.is_enabled(MetricKey::Live));
        assert!(!dashboard.is_enabled(MetricKey::Today));
        assert_eq!(dashboard.layout(), None);
    }

    #[test]
    fn test_snapshot_decodes_backend_shaped_payload() {
        let json = r#"{
            "day": [{"year": "2023", "month": "Nov", "day": 14, "hour": 9, "import": 0.4}],
            "year": [{"year": "2023", "month": "Oct", "solar": 210.5}, {"year": "2023", "month": "Nov", "solar": "95"}],
            "dashboard": {
                "metrics": {"live": true, "today": true},
                "cycle_interval": "10",
                "refresh_interval": 5,
                "about_screen_cycle_interval": "3",
                "about_screen_display_interval": "not a number"
            },
            "last_updated": 1700000000
        }"#;
        let snapshot: DataSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.day[0].year.as_deref(), Some("2023"));
        assert_eq!(snapshot.metric(MetricKey::ThisMonth).unwrap().solar, 95.0);
        assert_eq!(snapshot.metric(MetricKey::LastMonth).unwrap().solar, 210.5);

        let dashboard = snapshot.dashboard.unwrap();
        assert_eq!(dashboard.cycle_interval, Some(10.0));
        assert_eq!(dashboard.refresh_interval, Some(5.0));
        assert_eq!(dashboard.about_screen_cycle_interval, Some(3));
        assert_eq!(dashboard.about_screen_display_interval, None);
    }

    #[test]
    fn test_null_readings_count_as_zero() {
        let json = r#"{
            "live": {"import": null, "solar": 1.2, "battery_soc": null, "co2": "junk"},
            "last_updated": 5
        }"#;
        let snapshot: DataSnapshot = serde_json::from_str(json).unwrap();

        let live = snapshot.metric(MetricKey::Live).unwrap();
        assert_eq!(live.import, 0.0);
        assert_eq!(live.solar, 1.2);
        assert_eq!(live.co2, 0.0);
        assert_eq!(live.battery_soc, None);
    }

    #[test]
    fn test_series_value() {
        let snapshot = MetricSnapshot {
            export: 2.0,
            battery_charge: Some(1.0),
            ..Default::default()
        };
        assert_eq!(snapshot.series_value("export"), Some(2.0));
        assert_eq!(snapshot.series_value("battery_charge"), Some(1.0));
        assert_eq!(snapshot.series_value("battery_discharge"), None);
        assert_eq!(snapshot.series_value("unknown"), None);
    }
}
