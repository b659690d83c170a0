//! Builds the HTTP state from the configured storage adapter.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use murmur::inbound::http::state::{HttpState, HttpStatePorts};
use murmur::outbound::memory::{InMemorySocialStore, StoreSettings};

/// One in-memory store backs all three storage ports.
pub(super) fn build_http_state(store: StoreSettings) -> web::Data<HttpState> {
    let store = Arc::new(InMemorySocialStore::new(Arc::new(DefaultClock), store));
    web::Data::new(HttpState::from(HttpStatePorts {
        accounts: store.clone(),
        posts: store.clone(),
        follows: store,
    }))
}
