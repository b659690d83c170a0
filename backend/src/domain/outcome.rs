//! What a route produces: a view to render or a location to redirect to.
//!
//! Attributes are a map rather than a struct so templates can tell "absent"
//! apart from "false". A key that was never inserted does not serialise at
//! all.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::{AuthGrant, Error};

/// Views the rendering collaborator knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ViewName {
    /// Profile page with its feed.
    Home,
    /// Posts mentioning a user.
    Mentions,
    /// Global stream and newest users.
    Timeline,
    /// Sign-in and sign-up forms.
    Signin,
    /// Single post permalink.
    Status,
    /// Generic page for missing users or posts.
    Nodata,
}

impl ViewName {
    /// Template name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Mentions => "mentions",
            Self::Timeline => "timeline",
            Self::Signin => "signin",
            Self::Status => "status",
            Self::Nodata => "nodata",
        }
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered attribute map handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[schema(value_type = Object)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, Value>);

impl Attributes {
    /// Empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialise `value` under `key`, replacing any earlier value.
    pub fn insert<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<&mut Self, Error> {
        let value = serde_json::to_value(value).map_err(|err| {
            Error::internal(format!("failed to serialise attribute {key}: {err}"))
        })?;
        self.0.insert(key.to_owned(), value);
        Ok(self)
    }

    /// Value stored under `key`; `None` means the attribute is absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether `key` was set at all.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no attribute was set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What the session cookie should do once the route finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionDirective {
    /// Leave the cookie untouched.
    #[default]
    Keep,
    /// Persist a freshly issued token.
    Establish(AuthGrant),
    /// Drop the cookie.
    Clear,
}

/// Kind of record a "no data" failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    User,
    Post,
}

/// Precondition failure: a route named a user or post that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no such {kind:?}: {identifier}")]
pub struct NoSuchData {
    identifier: String,
    kind: DataKind,
}

impl NoSuchData {
    /// Missing user handle.
    pub fn user(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            kind: DataKind::User,
        }
    }

    /// Missing post id.
    pub fn post(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            kind: DataKind::Post,
        }
    }

    /// Identifier as the caller supplied it.
    pub fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    /// Whether a user or a post was missing.
    pub fn kind(&self) -> DataKind {
        self.kind
    }
}

/// Where the response goes.
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeTarget {
    /// Render a view with attributes.
    View {
        name: ViewName,
        attributes: Attributes,
    },
    /// Send the client elsewhere.
    Redirect { location: String },
}

/// Terminal artifact of every route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    target: OutcomeTarget,
    session: SessionDirective,
    missing: Option<NoSuchData>,
}

impl RouteOutcome {
    /// Render `name` with `attributes`.
    pub fn view(name: ViewName, attributes: Attributes) -> Self {
        Self {
            target: OutcomeTarget::View { name, attributes },
            session: SessionDirective::Keep,
            missing: None,
        }
    }

    /// Redirect to `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            target: OutcomeTarget::Redirect {
                location: location.into(),
            },
            session: SessionDirective::Keep,
            missing: None,
        }
    }

    /// The generic "no data" view. The failure is kept for diagnostics but
    /// does not reach the attributes.
    pub fn no_data(missing: NoSuchData) -> Self {
        Self {
            missing: Some(missing),
            ..Self::view(ViewName::Nodata, Attributes::new())
        }
    }

    /// Attach a cookie instruction.
    #[must_use]
    pub fn with_session(mut self, session: SessionDirective) -> Self {
        self.session = session;
        self
    }

    /// Where the response goes.
    pub fn target(&self) -> &OutcomeTarget {
        &self.target
    }

    /// Cookie instruction.
    pub fn session(&self) -> &SessionDirective {
        &self.session
    }

    /// The precondition failure behind a "no data" view.
    pub fn missing(&self) -> Option<&NoSuchData> {
        self.missing.as_ref()
    }

    /// View name, when the outcome renders one.
    pub fn view_name(&self) -> Option<ViewName> {
        match &self.target {
            OutcomeTarget::View { name, .. } => Some(*name),
            OutcomeTarget::Redirect { .. } => None,
        }
    }

    /// Attributes, when the outcome renders a view.
    pub fn attributes(&self) -> Option<&Attributes> {
        match &self.target {
            OutcomeTarget::View { attributes, .. } => Some(attributes),
            OutcomeTarget::Redirect { .. } => None,
        }
    }

    /// Redirect location, when the outcome redirects.
    pub fn location(&self) -> Option<&str> {
        match &self.target {
            OutcomeTarget::View { .. } => None,
            OutcomeTarget::Redirect { location } => Some(location.as_str()),
        }
    }

    /// Split into parts for the rendering adapter.
    pub fn into_parts(self) -> (OutcomeTarget, SessionDirective) {
        (self.target, self.session)
    }
}
