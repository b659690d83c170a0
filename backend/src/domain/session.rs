//! Request-scoped authentication state.
//!
//! An [`AuthSession`] is built once per request from whatever the session
//! provider resolved and handed to the router explicitly. Nothing here is
//! global: two concurrent requests never share a session value.

use tracing::info;

use super::ports::AccountRepository;
use super::{AuthGrant, AuthToken, Error, Identity, UserId};

/// Identity state for the request being served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    identity: Option<Identity>,
}

impl AuthSession {
    /// Session with nobody signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session already bound to a resolved identity.
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// Resolve the caller from the token carried by their cookie.
    ///
    /// Unknown or revoked tokens yield an anonymous session.
    pub async fn resolve(
        accounts: &dyn AccountRepository,
        token: Option<&AuthToken>,
    ) -> Result<Self, Error> {
        let Some(token) = token else {
            return Ok(Self::anonymous());
        };
        let identity = accounts.identity_for_token(token).await?;
        Ok(Self { identity })
    }

    /// Whether a valid identity is attached to this request.
    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Identity attached to this request, if any.
    pub fn current_identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Whether the signed-in caller owns `target`.
    ///
    /// # Examples
    /// ```
    /// use murmur::domain::{AuthSession, Identity, UserId, UserName};
    ///
    /// let id = UserId::random();
    /// let session = AuthSession::signed_in(Identity::new(id.clone(), UserName::new("ada").unwrap()));
    /// assert!(session.is_owner(&id));
    /// assert!(!session.is_owner(&UserId::random()));
    /// assert!(!AuthSession::anonymous().is_owner(&id));
    /// ```
    pub fn is_owner(&self, target: &UserId) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|identity| identity.user_id() == target)
    }

    /// Bind `identity` to this request and return the instruction to persist
    /// `token` for seven days.
    pub fn establish(&mut self, identity: Identity, token: AuthToken) -> AuthGrant {
        info!(user = %identity.name(), "session established");
        self.identity = Some(identity);
        AuthGrant::new(token)
    }

    /// Revoke the server-side token of the signed-in identity.
    ///
    /// The request's own identity binding is left untouched; the revoked token
    /// simply stops resolving on the next request. Anonymous sessions have
    /// nothing to revoke.
    pub async fn clear(&self, accounts: &dyn AccountRepository) -> Result<(), Error> {
        let Some(identity) = &self.identity else {
            return Ok(());
        };
        accounts.delete_auth(identity.name()).await?;
        info!(user = %identity.name(), "auth token revoked");
        Ok(())
    }
}
