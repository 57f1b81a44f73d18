use crate::application::session::{clamp_interval, SessionSettings};
use crate::domain::metrics::Layout;
use serde::Deserialize;
use std::net::SocketAddr;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SOURCE_URL: &str = "http://127.0.0.1:8090/data";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub source: SourceSettings,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Pins the layout, as a `?layout=` query argument would.
    #[serde(default)]
    pub forced_layout: Option<String>,
    /// Seconds between polls until the endpoint supplies its own value.
    #[serde(default = "default_interval")]
    pub initial_refresh_interval: f64,
    #[serde(default = "default_interval")]
    pub initial_cycle_interval: f64,
}

fn default_interval() -> f64 {
    1.0
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            forced_layout: None,
            initial_refresh_interval: default_interval(),
            initial_cycle_interval: default_interval(),
        }
    }
}

impl AppConfig {
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address '{}': {}", self.server.bind_addr, e))
    }

    pub fn session_settings(&self) -> anyhow::Result<SessionSettings> {
        let forced_layout = match self.session.forced_layout.as_deref() {
            Some(name) => Some(name.parse::<Layout>()?),
            None => None,
        };

        Ok(SessionSettings {
            forced_layout,
            refresh_interval: clamp_interval(self.session.initial_refresh_interval),
            cycle_interval: clamp_interval(self.session.initial_cycle_interval),
        })
    }
}

fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("server.bind_addr", DEFAULT_BIND_ADDR)?
        .set_default("source.url", DEFAULT_SOURCE_URL)
}

/// Load `config/dashboard.*` (optional) with `SOLAR_DASHBOARD__*` overrides on top.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = builder()?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("SOLAR_DASHBOARD")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
