// Application state for HTTP handlers
use crate::application::session::SessionHandle;
use crate::domain::display::DisplayFrame;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub session: SessionHandle,
    pub frames: watch::Receiver<Option<DisplayFrame>>,
}
