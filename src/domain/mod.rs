// Domain layer - Pure metric, formatting and display types
pub mod display;
pub mod format;
pub mod metrics;
