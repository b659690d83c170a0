//! Domain primitives, ports, and the route core.
//!
//! Purpose: model accounts, posts, and sessions as strongly typed values and
//! drive every route through [`RequestRouter`]. Nothing in here knows about
//! HTTP; adapters live under `crate::inbound` and `crate::outbound`.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - UserName, UserId, Identity: account identity.
//! - Post, PostId, PostDraft: published and pending posts.
//! - AuthSession: request-scoped sign-in state.
//! - RequestRouter, RouteOutcome: route entry points and their results.

pub mod auth;
pub mod error;
pub mod feed;
pub mod outcome;
pub mod ports;
pub mod post;
pub mod profile;
pub mod router;
pub mod session;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    AuthGrant, AuthToken, LoginCredentials, LoginValidationError, SignInFlag, SignUpForm,
};
pub use self::error::{Error, ErrorCode};
pub use self::feed::{FeedResult, FeedSelector, FeedSource, GlobalFeed};
pub use self::outcome::{
    Attributes, DataKind, NoSuchData, OutcomeTarget, RouteOutcome, SessionDirective, ViewName,
};
pub use self::post::{POST_CONTENT_MAX, Post, PostDraft, PostId, PostValidationError};
pub use self::profile::{ProfileContext, ProfileEnricher, ViewerRelation};
pub use self::router::{PostForm, ProfileQuery, RequestRouter, ROOT_PATH, SIGN_IN_PATH};
pub use self::session::AuthSession;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Identity, USER_NAME_MAX, UserId, UserName, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use murmur::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::invalid_request("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
