// Metric and layout cycling state machines
use crate::domain::metrics::{DashboardConfig, Layout, MetricKey};
use chrono::{DateTime, Duration, Utc};

/// Rotation state for the metric panel. Lives for one dashboard session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleState {
    pub current: MetricKey,
    /// Full passes through the key list since the about screen was last shown.
    pub cycle_count: u32,
    pub about_last_shown: Option<DateTime<Utc>>,
}

impl Default for CycleState {
    fn default() -> Self {
        Self {
            current: MetricKey::Live,
            cycle_count: 0,
            about_last_shown: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricCycle {
    state: CycleState,
}

impl MetricCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> MetricKey {
        self.state.current
    }

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    /// Move to the next displayable metric key.
    ///
    /// Returns `None` without touching state when no dashboard config has been
    /// received yet. Falls back to `live` when nothing is eligible.
    pub fn advance(
        &mut self,
        config: Option<&DashboardConfig>,
        layout: Layout,
        now: DateTime<Utc>,
    ) -> Option<MetricKey> {
        let config = config?;
        let about_enabled = config.is_enabled(MetricKey::About);

        // An about screen holds until its display interval runs out.
        if self.state.current == MetricKey::About
            && about_enabled
            && !self.about_display_elapsed(config, now)
        {
            return Some(MetricKey::About);
        }

        let keys = MetricKey::ALL;
        let mut index = self.state.current.index();

        for _ in 0..keys.len() {
            index = (index + 1) % keys.len();
            if index == 0 {
                self.state.cycle_count += 1;
            }

            let candidate = keys[index];
            match candidate {
                MetricKey::About => {
                    if about_enabled && self.about_due(config, now) {
                        self.state.cycle_count = 0;
                        self.state.about_last_shown = Some(now);
                        self.state.current = MetricKey::About;
                        return Some(MetricKey::About);
                    }
                    continue;
                }
                // pinned to its own slot
                MetricKey::Live if layout == Layout::DualMetrics => continue,
                MetricKey::PvTotal if layout != Layout::SingleMetric => continue,
                _ => {}
            }

            if config.is_enabled(candidate) {
                self.state.current = candidate;
                return Some(candidate);
            }
        }

        self.state.current = MetricKey::Live;
        Some(MetricKey::Live)
    }

    fn about_due(&self, config: &DashboardConfig, now: DateTime<Utc>) -> bool {
        let Some(cycles) = config.about_screen_cycle_interval else {
            return false;
        };
        self.state.cycle_count >= cycles && self.about_display_elapsed(config, now)
    }

    fn about_display_elapsed(&self, config: &DashboardConfig, now: DateTime<Utc>) -> bool {
        let Some(seconds) = config.about_screen_display_interval else {
            return true;
        };
        let millis = (seconds.max(0.0) * 1000.0) as i64;
        let display_for = Duration::try_milliseconds(millis).unwrap_or(Duration::MAX);
        match self.state.about_last_shown {
            Some(shown) => now - shown >= display_for,
            None => true,
        }
    }
}

/// Tracks a user-forced layout and resolves the layout in effect.
#[derive(Debug, Clone, Default)]
pub struct LayoutSelector {
    forced: Option<Layout>,
    index: Option<usize>,
}

impl LayoutSelector {
    pub fn new(forced: Option<Layout>) -> Self {
        Self {
            forced,
            index: None,
        }
    }

    /// A forced layout wins over the configured one.
    pub fn resolve(&self, config: Option<&DashboardConfig>) -> Layout {
        self.forced
            .or_else(|| config.and_then(DashboardConfig::layout))
            .unwrap_or_default()
    }

    /// Step the forced layout through [`Layout::CYCLE`]; the first call selects its first entry.
    pub fn force_layout_cycle(&mut self) -> Layout {
        let next = self.index.map_or(0, |i| (i + 1) % Layout::CYCLE.len());
        self.index = Some(next);
        let layout = Layout::CYCLE[next];
        self.forced = Some(layout);
        layout
    }
}
