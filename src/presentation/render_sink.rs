// Render sink publishing frames to HTTP subscribers
use crate::application::session::DisplaySink;
use crate::domain::display::DisplayFrame;
use tokio::sync::watch;

/// Keeps the latest frame in a watch channel; readers always see the newest one.
#[derive(Debug)]
pub struct WatchSink {
    tx: watch::Sender<Option<DisplayFrame>>,
}

impl WatchSink {
    pub fn new() -> (Self, watch::Receiver<Option<DisplayFrame>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }
}

impl DisplaySink for WatchSink {
    fn render(&self, frame: &DisplayFrame) {
        tracing::debug!("Rendering {} ({}, stale={})", frame.key, frame.layout, frame.stale);
        self.tx.send_replace(Some(frame.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::display::FrameBody;
    use crate::domain::metrics::{Layout, MetricKey};

    #[test]
    fn test_latest_frame_wins() {
        let (sink, rx) = WatchSink::new();
        assert!(rx.borrow().is_none());

        for key in [MetricKey::Live, MetricKey::Today] {
            sink.render(&DisplayFrame {
                layout: Layout::Default,
                key,
                stale: false,
                status: None,
                body: FrameBody::Splash {
                    message: "Waiting for data...".to_string(),
                },
            });
        }

        assert_eq!(rx.borrow().as_ref().map(|f| f.key), Some(MetricKey::Today));
    }
}
