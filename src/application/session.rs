// Dashboard session - Timer driven refresh and metric cycling
use crate::application::cycle_controller::{LayoutSelector, MetricCycle};
use crate::application::display_service::{build_frame, FrameRequest};
use crate::application::snapshot_source::SnapshotSource;
use crate::domain::display::DisplayFrame;
use crate::domain::metrics::{DashboardConfig, DataSnapshot, Layout, MetricKey};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Shortest refresh or cycle period accepted from the data endpoint.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Rendering side of the dashboard; receives every resolved frame.
pub trait DisplaySink: Send + Sync {
    fn render(&self, frame: &DisplayFrame);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// User tapped the metrics panel.
    CycleMetric,
    /// User tapped the title/donut to step through layouts.
    CycleLayout,
    Focus,
    Blur,
    Shutdown,
}

#[derive(Debug, thiserror::Error)]
#[error("dashboard session has stopped")]
pub struct SessionClosed;

/// Cloneable sender used by the HTTP handlers to drive the session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub fn channel() -> (Self, mpsc::Receiver<SessionCommand>) {
        let (tx, rx) = mpsc::channel(32);
        (Self { tx }, rx)
    }

    pub async fn send(&self, command: SessionCommand) -> Result<(), SessionClosed> {
        self.tx.send(command).await.map_err(|_| SessionClosed)
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub forced_layout: Option<Layout>,
    pub refresh_interval: Duration,
    pub cycle_interval: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            forced_layout: None,
            refresh_interval: MIN_INTERVAL,
            cycle_interval: MIN_INTERVAL,
        }
    }
}

/// Convert an interval in seconds from the data endpoint into a timer period.
pub fn clamp_interval(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds.max(MIN_INTERVAL.as_secs_f64())).unwrap_or(MIN_INTERVAL)
}

/// Restartable periodic timer. A stopped timer never ticks.
struct Timer {
    period: Duration,
    interval: Option<Interval>,
}

impl Timer {
    fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_INTERVAL),
            interval: None,
        }
    }

    /// (Re)start so the next tick lands one full period from now.
    fn start(&mut self) {
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    fn stop(&mut self) {
        self.interval = None;
    }

    fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Returns true when the period changed; a running timer is restarted.
    fn set_period(&mut self, period: Duration) -> bool {
        if period == self.period {
            return false;
        }
        self.period = period;
        if self.is_running() {
            self.start();
        }
        true
    }

    async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

enum Wakeup {
    Refresh,
    Cycle,
    Command(SessionCommand),
}

/// Owns all dashboard state for one session. Mutated only from its own task.
pub struct DashboardSession {
    source: Arc<dyn SnapshotSource>,
    sink: Arc<dyn DisplaySink>,
    cycle: MetricCycle,
    layouts: LayoutSelector,
    snapshot: Option<DataSnapshot>,
    refresh_errors: u32,
    refresh_timer: Timer,
    cycle_timer: Timer,
}

impl DashboardSession {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        sink: Arc<dyn DisplaySink>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            source,
            sink,
            cycle: MetricCycle::new(),
            layouts: LayoutSelector::new(settings.forced_layout),
            snapshot: None,
            refresh_errors: 0,
            refresh_timer: Timer::new(settings.refresh_interval),
            cycle_timer: Timer::new(settings.cycle_interval),
        }
    }

    fn dashboard(&self) -> Option<&DashboardConfig> {
        self.snapshot.as_ref().and_then(|s| s.dashboard.as_ref())
    }

    pub fn layout(&self) -> Layout {
        self.layouts.resolve(self.dashboard())
    }

    pub fn current_key(&self) -> MetricKey {
        self.cycle.current()
    }

    pub fn refresh_errors(&self) -> u32 {
        self.refresh_errors
    }

    pub fn refresh_period(&self) -> Duration {
        self.refresh_timer.period
    }

    pub fn cycle_period(&self) -> Duration {
        self.cycle_timer.period
    }

    /// Poll the data source. On failure the previous snapshot stays in place.
    pub async fn refresh(&mut self) {
        match self.source.fetch().await {
            Ok(snapshot) => {
                self.refresh_errors = 0;
                self.apply_intervals(snapshot.dashboard.as_ref());
                self.snapshot = Some(snapshot);
            }
            Err(e) => {
                self.refresh_errors += 1;
                tracing::warn!("Data refresh failure #{}: {}", self.refresh_errors, e);
            }
        }
    }

    fn apply_intervals(&mut self, dashboard: Option<&DashboardConfig>) {
        let Some(dashboard) = dashboard else {
            return;
        };

        if let Some(seconds) = dashboard.refresh_interval {
            if self.refresh_timer.set_period(clamp_interval(seconds)) {
                tracing::info!("New refresh interval: {:?}", self.refresh_timer.period);
            }
        }

        if let Some(seconds) = dashboard.cycle_interval {
            if self.cycle_timer.set_period(clamp_interval(seconds)) {
                tracing::info!("New metric cycle interval: {:?}", self.cycle_timer.period);
            }
        }
    }

    /// Step the metric rotation and repaint.
    pub fn advance(&mut self) {
        let layout = self.layout();
        let config = self.snapshot.as_ref().and_then(|s| s.dashboard.as_ref());
        match self.cycle.advance(config, layout, Utc::now()) {
            Some(key) => tracing::debug!(
                "Metric cycled to {} ({} layout, {} full cycles)",
                key,
                layout,
                self.cycle.state().cycle_count
            ),
            None => tracing::debug!("No dashboard config yet, metric cycle skipped"),
        }
        self.display();
    }

    /// Manual metric cycle; the next automatic tick is a full period away.
    pub fn cycle_metric(&mut self) {
        self.advance();
        if self.cycle_timer.is_running() {
            self.cycle_timer.start();
        }
    }

    pub fn force_layout_cycle(&mut self) {
        let layout = self.layouts.force_layout_cycle();
        tracing::info!("Forced layout to {}", layout);
        self.display();
    }

    pub fn frame(&self) -> DisplayFrame {
        build_frame(FrameRequest {
            snapshot: self.snapshot.as_ref(),
            key: self.cycle.current(),
            layout: self.layout(),
            refresh_errors: self.refresh_errors,
        })
    }

    pub fn display(&self) {
        self.sink.render(&self.frame());
    }

    pub fn start(&mut self) {
        self.refresh_timer.start();
        self.cycle_timer.start();
    }

    pub fn stop(&mut self) {
        self.refresh_timer.stop();
        self.cycle_timer.stop();
    }

    /// Regaining focus refreshes immediately and restarts both timers.
    pub async fn focus(&mut self) {
        self.refresh().await;
        self.display();
        self.start();
    }

    pub fn blur(&mut self) {
        self.stop();
    }

    /// Returns false once the session should end.
    pub async fn handle(&mut self, command: SessionCommand) -> bool {
        tracing::debug!("Session command {:?}", command);
        match command {
            SessionCommand::CycleMetric => self.cycle_metric(),
            SessionCommand::CycleLayout => self.force_layout_cycle(),
            SessionCommand::Focus => self.focus().await,
            SessionCommand::Blur => self.blur(),
            SessionCommand::Shutdown => return false,
        }
        true
    }

    /// Drive the session until shut down or every handle is dropped.
    pub async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        self.refresh().await;
        self.display();
        self.start();

        loop {
            let wakeup = tokio::select! {
                _ = self.refresh_timer.tick() => Wakeup::Refresh,
                _ = self.cycle_timer.tick() => Wakeup::Cycle,
                command = commands.recv() => Wakeup::Command(command.unwrap_or(SessionCommand::Shutdown)),
            };

            match wakeup {
                Wakeup::Refresh => {
                    self.refresh().await;
                    self.display();
                }
                Wakeup::Cycle => self.advance(),
                Wakeup::Command(command) => {
                    if !self.handle(command).await {
                        break;
                    }
                }
            }
        }

        tracing::info!("Dashboard session stopped");
    }
}
