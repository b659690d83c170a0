//! Driven port for the follow graph.

use async_trait::async_trait;

use crate::domain::{UserId, UserName};

use super::define_port_error;

define_port_error! {
    /// Errors raised by follow graph adapters.
    pub enum FollowRepositoryError for "follow repository"
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Add the edge `follower -> target`. Idempotent.
    async fn follow(&self, follower: &UserId, target: &UserId)
    -> Result<(), FollowRepositoryError>;

    /// Remove the edge `follower -> target`. Idempotent.
    async fn stop_following(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<(), FollowRepositoryError>;

    /// Whether `follower` currently follows `target`.
    async fn is_following(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<bool, FollowRepositoryError>;

    /// Handles following `user`.
    async fn followers(&self, user: &UserId) -> Result<Vec<UserName>, FollowRepositoryError>;

    /// Handles `user` follows.
    async fn following(&self, user: &UserId) -> Result<Vec<UserName>, FollowRepositoryError>;

    /// Handles followed by both `viewer` and `target`.
    async fn also_followed(
        &self,
        viewer: &UserId,
        target: &UserId,
    ) -> Result<Vec<UserName>, FollowRepositoryError>;

    /// Handles following both `viewer` and `target`.
    async fn common_followers(
        &self,
        viewer: &UserId,
        target: &UserId,
    ) -> Result<Vec<UserName>, FollowRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Error, ErrorCode};

    #[test]
    fn connection_failures_are_transient() {
        let mapped = Error::from(FollowRepositoryError::connection("refused"));
        assert_eq!(mapped.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(mapped.message(), "follow repository unavailable: refused");
    }
}
