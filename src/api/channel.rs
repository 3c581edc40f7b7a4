//! Server-sent event channel for turn streams.
//!
//! Frames each [`TurnEvent`] as one SSE event, in order, and closes the channel after the
//! first terminal event. A panic while driving the stream is turned into a final `error` event.

use crate::api::chats::schemas::{ChunkPayload, DonePayload, ErrorPayload};
use crate::core::events::TurnEvent;
use async_stream::stream;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use log::{debug, error};
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;

pub const CHUNK_EVENT: &str = "chunk";
pub const DONE_EVENT: &str = "done";
pub const ERROR_EVENT: &str = "error";

const FALLBACK_ERROR: &str = r#"{"error":"Stream failed","reason":"internal"}"#;

pub fn open(
    events: BoxStream<'static, TurnEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut events = Box::pin(AssertUnwindSafe(events).catch_unwind());

    let framed = stream! {
        while let Some(next) = events.next().await {
            match next {
                Ok(event) => {
                    let terminal = event.is_terminal();
                    yield Ok(frame(&event));
                    if terminal {
                        break;
                    }
                }
                Err(_) => {
                    error!("turn stream panicked, closing channel");
                    yield Ok(fallback_error());
                    break;
                }
            }
        }
        debug!("event channel closed");
    };

    Sse::new(framed).keep_alive(KeepAlive::default())
}

/// Builds the SSE frame for one event.
pub fn frame(event: &TurnEvent) -> Event {
    let framed = match event {
        TurnEvent::Fragment(fragment) => {
            Event::default()
                .event(CHUNK_EVENT)
                .json_data(ChunkPayload::from(fragment))
        }
        TurnEvent::Completed { turn_id, status } => {
            Event::default().event(DONE_EVENT).json_data(DonePayload {
                turn_id: *turn_id,
                status: *status,
            })
        }
        TurnEvent::Failed { error, reason } => {
            Event::default().event(ERROR_EVENT).json_data(ErrorPayload {
                error: error.clone(),
                reason: reason.clone(),
            })
        }
    };

    framed.unwrap_or_else(|err| {
        error!("failed to serialize event: {err}");
        fallback_error()
    })
}

fn fallback_error() -> Event {
    Event::default().event(ERROR_EVENT).data(FALLBACK_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::Fragment;
    use crate::infrastructure::entities::{ModelSlot, TurnStatus};
    use axum::response::IntoResponse;
    use futures_util::stream;
    use uuid::Uuid;

    async fn body_of(events: Vec<TurnEvent>) -> String {
        let response = open(stream::iter(events).boxed()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn fragment(text: &str) -> TurnEvent {
        TurnEvent::Fragment(Fragment {
            model_id: ModelSlot::A,
            content: text.to_owned(),
            sequence: 1,
        })
    }

    #[tokio::test]
    async fn test_events_are_framed_in_order() {
        let turn_id = Uuid::new_v4();
        let body = body_of(vec![
            fragment("first"),
            fragment("second"),
            TurnEvent::Completed {
                turn_id,
                status: TurnStatus::Completed,
            },
        ])
        .await;

        let first = body.find("first").unwrap();
        let second = body.find("second").unwrap();
        let done = body.find("event: done").unwrap();
        assert!(first < second && second < done);
        assert!(body.contains(r#""model_id":"model_a""#));
        assert!(body.contains(&turn_id.to_string()));
    }

    #[tokio::test]
    async fn test_channel_closes_after_terminal_event() {
        let body = body_of(vec![
            fragment("before"),
            TurnEvent::Failed {
                error: "Failed to generate response".to_owned(),
                reason: "internal".to_owned(),
            },
            fragment("after"),
        ])
        .await;

        assert!(body.contains("event: error"));
        assert!(body.contains("before"));
        assert!(!body.contains("after"));
    }

    #[tokio::test]
    async fn test_panicking_stream_ends_with_error_event() {
        let events = stream::iter(vec![0, 1])
            .map(|n| {
                if n == 1 {
                    panic!("generator blew up");
                }
                fragment("ok")
            })
            .boxed();

        let response = open(events).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(body.contains("event: chunk"));
        assert!(body.ends_with(&format!("event: error\ndata: {FALLBACK_ERROR}\n\n")));
        assert!(!body.contains("blew up"));
    }
}
