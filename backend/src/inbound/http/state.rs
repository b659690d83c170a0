//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data`. They only see the
//! request router and the renderer, so they stay testable against in-memory
//! or mocked ports.

use std::sync::Arc;

use crate::domain::RequestRouter;
use crate::domain::ports::{AccountRepository, FollowRepository, PostRepository};

use super::render::{JsonViewRenderer, ViewRenderer};

/// Port implementations backing the router.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub router: Arc<RequestRouter>,
    pub renderer: Arc<dyn ViewRenderer>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, Arc::new(JsonViewRenderer))
    }
}

impl HttpState {
    /// Build state from the storage ports and a renderer.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use murmur::inbound::http::render::JsonViewRenderer;
    /// use murmur::inbound::http::state::{HttpState, HttpStatePorts};
    /// use murmur::outbound::memory::{InMemorySocialStore, StoreSettings};
    ///
    /// let store = Arc::new(InMemorySocialStore::new(
    ///     Arc::new(DefaultClock),
    ///     StoreSettings::default(),
    /// ));
    /// let ports = HttpStatePorts {
    ///     accounts: store.clone(),
    ///     posts: store.clone(),
    ///     follows: store,
    /// };
    /// let state = HttpState::new(ports, Arc::new(JsonViewRenderer));
    /// let _router = state.router.clone();
    /// ```
    pub fn new(ports: HttpStatePorts, renderer: Arc<dyn ViewRenderer>) -> Self {
        let HttpStatePorts {
            accounts,
            posts,
            follows,
        } = ports;
        Self {
            router: Arc::new(RequestRouter::new(accounts, posts, follows)),
            renderer,
        }
    }
}
