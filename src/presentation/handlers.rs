// HTTP request handlers
use crate::application::session::SessionCommand;
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json,
    },
};
use futures::stream::Stream;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest display frame
pub async fn current_display(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let frame = state.frames.borrow().clone();
    match frame {
        Some(frame) => Json(frame).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "dashboard session not started").into_response(),
    }
}

/// Push every new frame to the client as it is rendered
pub async fn stream_display(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    tracing::debug!("Display stream connected");
    let mut rx = state.frames.clone();

    let stream = async_stream::stream! {
        loop {
            let frame = rx.borrow_and_update().clone();
            if let Some(frame) = frame {
                yield Event::default().event("frame").json_data(&frame);
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn dispatch(state: &AppState, command: SessionCommand) -> StatusCode {
    match state.session.send(command).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => {
            tracing::error!("Could not deliver {:?}: {}", command, e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Manual tap on the metrics panel
pub async fn cycle_metric(State(state): State<Arc<AppState>>) -> StatusCode {
    dispatch(&state, SessionCommand::CycleMetric).await
}

/// Manual tap on the title to step the layout
pub async fn cycle_layout(State(state): State<Arc<AppState>>) -> StatusCode {
    dispatch(&state, SessionCommand::CycleLayout).await
}

pub async fn focus(State(state): State<Arc<AppState>>) -> StatusCode {
    dispatch(&state, SessionCommand::Focus).await
}

pub async fn blur(State(state): State<Arc<AppState>>) -> StatusCode {
    dispatch(&state, SessionCommand::Blur).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session::SessionHandle;
    use crate::presentation::render_sink::WatchSink;

    #[tokio::test]
    async fn test_dispatch_forwards_commands() {
        let (session, mut rx) = SessionHandle::channel();
        let (_sink, frames) = WatchSink::new();
        let state = AppState { session, frames };

        assert_eq!(dispatch(&state, SessionCommand::CycleLayout).await, StatusCode::ACCEPTED);
        assert_eq!(rx.recv().await, Some(SessionCommand::CycleLayout));

        drop(rx);
        assert_eq!(dispatch(&state, SessionCommand::Blur).await, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_current_display_before_first_frame() {
        let (session, _rx) = SessionHandle::channel();
        let (_sink, frames) = WatchSink::new();
        let state = Arc::new(AppState { session, frames });

        let response = current_display(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
