//! The crosschat HTTP service
//!
//! Each channel owns a [`SolveState`](crosschat_crossword::SolveState) and a
//! [`Settings`](crosschat_crossword::Settings) row in the key-value
//! [storage]; every successful mutation publishes an [`Event`](events::Event)
//! through the process-wide [pub/sub registry](pubsub::Registry), which the
//! per-channel SSE streams fan it out from. The registry is plain shared
//! state handed to the handlers through the router, never a global.

pub mod error;
pub mod events;
pub mod pubsub;
pub mod repo;
pub mod routes;
pub mod sources;
pub mod sse;
pub mod storage;

use std::sync::Arc;

use crate::pubsub::Registry;
use crate::sources::Sources;
use crate::storage::Store;

/// Shared state behind every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub registry: Registry,
    pub sources: Arc<Sources>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, sources: Sources) -> Self {
        Self {
            store,
            registry: Registry::new(),
            sources: Arc::new(sources),
        }
    }
}
