// Presentation layer - HTTP surface and render sink
pub mod app_state;
pub mod handlers;
pub mod render_sink;
