// Display frame handed to the rendering side
use super::format::FormattedValue;
use super::metrics::{Layout, MetricKey};
use serde::Serialize;

/// Colour class applied to a metric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Red,
    Green,
    Yellow,
    Orange,
    Blue,
    Grey,
    Charge,
    Discharge,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricField {
    pub id: &'static str,
    pub icon: &'static str,
    pub value: FormattedValue,
    pub tone: Tone,
}

/// One rendered metric set, e.g. `metrics_a` showing `today`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsPanel {
    pub metrics_id: &'static str,
    pub key: MetricKey,
    pub title: String,
    pub fields: Vec<MetricField>,
}

impl MetricsPanel {
    pub fn field(&self, id: &str) -> Option<&MetricField> {
        self.fields.iter().find(|f| f.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonutSlice {
    pub field: &'static str,
    pub label: &'static str,
    pub colour: &'static str,
    pub value: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonutChart {
    pub title: String,
    pub slices: Vec<DonutSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStyle {
    pub field: &'static str,
    pub label: &'static str,
    pub colour: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarRow {
    pub label: String,
    /// One entry per series, `None` where the period did not report the field.
    pub values: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub id: &'static str,
    pub title: String,
    pub axis: &'static str,
    pub series: Vec<SeriesStyle>,
    pub rows: Vec<BarRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AboutPanel {
    pub caption: Option<String>,
    pub setup_url: Option<String>,
    pub config_ts: Option<f64>,
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameBody {
    Splash { message: String },
    Metrics {
        panels: Vec<MetricsPanel>,
        donut: Option<DonutChart>,
        bar_charts: Vec<BarChart>,
    },
    About(AboutPanel),
}

/// Everything the renderer needs to paint the current selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayFrame {
    pub layout: Layout,
    pub key: MetricKey,
    pub stale: bool,
    pub status: Option<String>,
    pub body: FrameBody,
}

impl DisplayFrame {
    pub fn panels(&self) -> &[MetricsPanel] {
        match &self.body {
            FrameBody::Metrics { panels, .. } => panels,
            _ => &[],
        }
    }
}
