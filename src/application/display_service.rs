// Display service - Builds display frames from the latest snapshot and cycle state
use crate::domain::display::{
    AboutPanel, BarChart, BarRow, DisplayFrame, DonutChart, DonutSlice, FrameBody, MetricField,
    MetricsPanel, SeriesStyle, Tone,
};
use crate::domain::format::{battery_icon, format_trees, to_fixed, FormattedValue, UnitScale};
use crate::domain::metrics::{DashboardConfig, DataSnapshot, Layout, MetricKey, MetricSnapshot};
use chrono::DateTime;

const SPLASH_UNCONFIGURED: &str = "Please click setup icon above to continue";
const SPLASH_WAITING: &str = "Waiting for data...";

/// Chart series in display order: field, label, colour.
const SERIES: [(&str, &str, &str); 7] = [
    ("import", "Grid", "#990000"),
    ("consumed", "Consumed", "#4B0082"),
    ("solar", "PV", "#AAAA00"),
    ("solar_consumed", "PV Consumed", "#006600"),
    ("export", "PV Export", "#00487F"),
    ("battery_charge", "Battery (+)", "#5C985C"),
    ("battery_discharge", "Battery (-)", "#925EAE"),
];

/// Inputs resolved by the session for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameRequest<'a> {
    pub snapshot: Option<&'a DataSnapshot>,
    pub key: MetricKey,
    pub layout: Layout,
    pub refresh_errors: u32,
}

pub fn build_frame(request: FrameRequest<'_>) -> DisplayFrame {
    let FrameRequest {
        snapshot,
        key,
        layout,
        refresh_errors,
    } = request;

    let stale = refresh_errors > 0;
    let status = stale.then(|| format!("Data Refresh Failure #{}", refresh_errors));

    let body = match snapshot {
        Some(snapshot) if snapshot.has_data() => {
            if key == MetricKey::About {
                FrameBody::About(about_panel(snapshot))
            } else {
                metrics_body(snapshot, key, layout)
            }
        }
        _ => FrameBody::Splash {
            message: splash_message(snapshot),
        },
    };

    DisplayFrame {
        layout,
        key,
        stale,
        status,
        body,
    }
}

fn splash_message(snapshot: Option<&DataSnapshot>) -> String {
    match snapshot.and_then(|s| s.configured) {
        Some(false) => SPLASH_UNCONFIGURED.to_string(),
        _ => SPLASH_WAITING.to_string(),
    }
}

fn about_panel(snapshot: &DataSnapshot) -> AboutPanel {
    let last_updated = DateTime::from_timestamp(snapshot.last_updated, 0)
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string());

    AboutPanel {
        caption: snapshot
            .dashboard
            .as_ref()
            .and_then(|d| d.about_caption.clone()),
        setup_url: snapshot.setup_url.clone(),
        config_ts: snapshot.config_ts,
        last_updated,
    }
}

fn metrics_body(snapshot: &DataSnapshot, key: MetricKey, layout: Layout) -> FrameBody {
    let dashboard = snapshot.dashboard.as_ref();

    match layout {
        Layout::Default => {
            let panel = metrics_panel("metrics_a", key, snapshot);
            let donut = dashboard.map(|d| donut_chart(&panel.title, key, snapshot, d));
            let bar_charts = dashboard
                .map(|d| bar_charts(snapshot, d))
                .unwrap_or_default();
            FrameBody::Metrics {
                panels: vec![panel],
                donut,
                bar_charts,
            }
        }
        Layout::DualMetrics => {
            let mut panels = vec![metrics_panel("metrics_a", MetricKey::Live, snapshot)];
            if key != MetricKey::Live {
                panels.push(metrics_panel("metrics_b", key, snapshot));
            }
            FrameBody::Metrics {
                panels,
                donut: None,
                bar_charts: Vec::new(),
            }
        }
        Layout::SingleMetric => FrameBody::Metrics {
            panels: vec![metrics_panel("metrics_a", key, snapshot)],
            donut: None,
            bar_charts: Vec::new(),
        },
    }
}

fn tone_if_positive(value: f64, positive: Tone, otherwise: Tone) -> Tone {
    if value > 0.0 { positive } else { otherwise }
}

pub fn metrics_panel(metrics_id: &'static str, key: MetricKey, snapshot: &DataSnapshot) -> MetricsPanel {
    let empty = MetricSnapshot::default();
    let source = snapshot.metric(key).unwrap_or(&empty);
    let scale = if key.is_power() {
        UnitScale::POWER
    } else {
        UnitScale::ENERGY
    };

    let consumed_tone = if source.import <= 0.0 {
        Tone::Green
    } else if source.solar > 0.0 {
        Tone::Orange
    } else {
        Tone::Red
    };

    let mut fields = vec![
        MetricField {
            id: "import",
            icon: "login",
            value: scale.format(source.import),
            tone: tone_if_positive(source.import, Tone::Red, Tone::Green),
        },
        MetricField {
            id: "consumed",
            icon: "home",
            value: scale.format(source.consumed),
            tone: consumed_tone,
        },
        MetricField {
            id: "solar",
            icon: "solar_power",
            value: scale.format(source.solar),
            tone: tone_if_positive(source.solar, Tone::Yellow, Tone::Grey),
        },
        MetricField {
            id: "export",
            icon: "logout",
            value: scale.format(source.export),
            tone: tone_if_positive(source.export, Tone::Blue, Tone::Grey),
        },
    ];

    if let Some(charge) = source.battery_charge {
        fields.push(MetricField {
            id: "battery_charge",
            icon: "battery_charging_full",
            value: scale.format(charge),
            tone: tone_if_positive(charge, Tone::Charge, Tone::Grey),
        });
    }

    if let Some(discharge) = source.battery_discharge {
        fields.push(MetricField {
            id: "battery_discharge",
            icon: "battery_4_bar",
            value: scale.format(discharge),
            tone: tone_if_positive(discharge, Tone::Discharge, Tone::Grey),
        });
    }

    if let Some(soc) = source.battery_soc {
        let tone = if soc >= 50.0 {
            Tone::Green
        } else if soc >= 30.0 {
            Tone::Orange
        } else {
            Tone::Red
        };
        fields.push(MetricField {
            id: "battery_soc",
            icon: battery_icon(soc),
            value: FormattedValue {
                display: soc.to_string(),
                unit: "%".to_string(),
            },
            tone,
        });
    }

    fields.push(MetricField {
        id: "co2",
        icon: "co2",
        value: UnitScale::CO2.format(source.co2),
        tone: tone_if_positive(source.co2, Tone::Green, Tone::Grey),
    });
    fields.push(MetricField {
        id: "trees",
        icon: "forest",
        value: format_trees(source.trees),
        tone: tone_if_positive(source.trees, Tone::Green, Tone::Grey),
    });

    MetricsPanel {
        metrics_id,
        key,
        title: source
            .title
            .clone()
            .unwrap_or_else(|| key.title().to_string()),
        fields,
    }
}

fn donut_chart(
    title: &str,
    key: MetricKey,
    snapshot: &DataSnapshot,
    dashboard: &DashboardConfig,
) -> DonutChart {
    let empty = MetricSnapshot::default();
    let source = snapshot.metric(key).unwrap_or(&empty);

    let selected: Vec<(&'static str, &'static str, &'static str, f64)> = SERIES
        .iter()
        .filter(|(field, _, _)| dashboard.donut_enabled(field))
        .map(|&(field, label, colour)| (field, label, colour, source.series_value(field).unwrap_or(0.0)))
        .collect();

    let total: f64 = selected.iter().map(|s| s.3).sum();

    let slices = selected
        .into_iter()
        .map(|(field, label, colour, value)| DonutSlice {
            field,
            label,
            colour,
            value,
            percentage: if total > 0.0 { value / total * 100.0 } else { 0.0 },
        })
        .collect();

    DonutChart {
        title: title.to_string(),
        slices,
    }
}

fn bar_charts(snapshot: &DataSnapshot, dashboard: &DashboardConfig) -> Vec<BarChart> {
    let series: Vec<SeriesStyle> = SERIES
        .iter()
        .filter(|(field, _, _)| dashboard.bar_chart_enabled(field))
        .map(|&(field, label, colour)| SeriesStyle { field, label, colour })
        .collect();

    let periods: [(&'static str, &[MetricSnapshot], &'static str, &str); 3] = [
        ("day", &snapshot.day, "Hour", "Hours"),
        ("month", &snapshot.month, "Day", "Days"),
        ("year", &snapshot.year, "Month", "Months"),
    ];

    periods
        .into_iter()
        .filter(|(_, entries, _, _)| !entries.is_empty())
        .map(|(id, entries, axis, noun)| {
            let rows = entries
                .iter()
                .map(|entry| BarRow {
                    label: period_label(id, entry),
                    values: series
                        .iter()
                        .map(|s| entry.series_value(s.field).map(|v| to_fixed(v, 2)))
                        .collect(),
                })
                .collect();

            BarChart {
                id,
                title: format!("Last {} {}", entries.len(), noun),
                axis,
                series: series.clone(),
                rows,
            }
        })
        .collect()
}

fn period_label(chart_id: &str, entry: &MetricSnapshot) -> String {
    let month = entry.month.clone().unwrap_or_default();
    match chart_id {
        "day" => format!("{:02}", entry.hour.unwrap_or(0)),
        "month" => format!("{} {:02}", month, entry.day.unwrap_or(0)),
        _ => month,
    }
}
