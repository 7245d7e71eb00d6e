//! The two event-stream responses: a channel's event feed and the
//! service-wide active-channels feed

use std::collections::BTreeMap;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderName, header};
use axum::response::IntoResponse;
use axum::response::sse::{Event as WireEvent, KeepAlive, Sse};
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::error::{ApiError, Result};
use crate::events::{ChannelSummary, ChannelsSnapshot, Event};
use crate::pubsub::Subscription;
use crate::storage::{Store, StoreError};
use crate::{AppState, repo};

/// Capacity of one SSE subscriber's mailbox; slow consumers lose events
/// rather than slow the publishers down
const MAILBOX_CAPACITY: usize = 10;

/// A ping is synthesized when nothing was emitted for this long
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// How often the active-channels feed rescans storage
const CHANNELS_SCAN_INTERVAL: Duration = Duration::from_secs(10);

/// `GET /crossword/{channel}/events`
///
/// Emits the channel's settings, then (when a puzzle is selected) its
/// current state, then every event published on the channel for as long as
/// the client stays connected. The mailbox is created here, pre-loaded with
/// the initial events and only then subscribed, so those are observed
/// first.
pub async fn channel_events(
    State(app): State<AppState>,
    Path(channel): Path<String>,
) -> Result<impl IntoResponse> {
    let store = app.store.as_ref();
    let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);

    let settings = repo::load_settings(store, &channel)?;
    let _ = tx.try_send(Event::settings(&settings)?);

    if let Some(state) = repo::load_state(store, &channel)? {
        let _ = tx.try_send(Event::state(&state)?);
    }

    let id = app
        .registry
        .subscribe(&channel, tx)
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let events = Subscription::new(app.registry.clone(), id, rx)
        .map(|event| wire_event(&event));

    let sse = Sse::new(events).keep_alive(keep_alive());
    Ok((stream_headers(), sse))
}

/// `GET /channels`
///
/// The union feed the bots watch: one `channels` event per change in the
/// set of active channels (and one on connect), keyed by integration.
pub async fn active_channels(State(app): State<AppState>) -> impl IntoResponse {
    let events = async_stream::stream! {
        let mut interval = tokio::time::interval(CHANNELS_SCAN_INTERVAL);
        let mut last: Option<ChannelsSnapshot> = None;

        loop {
            interval.tick().await;

            let snapshot = match channels_snapshot(app.store.as_ref()) {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    tracing::warn!(error = %err, "channel scan failed");
                    continue;
                }
            };

            if last.as_ref() == Some(&snapshot) {
                continue;
            }

            match Event::channels(&snapshot) {
                Ok(event) => {
                    last = Some(snapshot);
                    yield wire_event(&event);
                }
                Err(err) => tracing::warn!(error = %err, "channels event failed"),
            }
        }
    };

    let sse = Sse::new(events).keep_alive(keep_alive());
    (stream_headers(), sse)
}

/// Every active channel per integration; this service hosts one
fn channels_snapshot(store: &dyn Store) -> core::result::Result<ChannelsSnapshot, StoreError> {
    let channels = repo::all_states(store)?
        .into_iter()
        .map(|(name, state)| ChannelSummary {
            name,
            status: state.status,
        })
        .collect();

    Ok(BTreeMap::from([("crossword".to_string(), channels)]))
}

fn wire_event(event: &Event) -> core::result::Result<WireEvent, axum::Error> {
    WireEvent::default().event("message").json_data(event)
}

fn keep_alive() -> KeepAlive {
    KeepAlive::new()
        .interval(PING_INTERVAL)
        .event(WireEvent::default().event("message").data(PING_DATA))
}

/// Pre-rendered [`Event::ping`] payload for the keep-alive timer
const PING_DATA: &str = r#"{"kind":"ping","payload":null}"#;

fn stream_headers() -> [(HeaderName, &'static str); 3] {
    [
        (header::CONTENT_TYPE, "text/event-stream; charset=utf-8"),
        (header::CACHE_CONTROL, "no-transform"),
        (header::CONNECTION, "keep-alive"),
    ]
}
