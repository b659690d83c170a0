//! Follow graph storage.

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::InMemorySocialStore;
use crate::domain::ports::{FollowRepository, FollowRepositoryError};
use crate::domain::{UserId, UserName};

#[async_trait]
impl FollowRepository for InMemorySocialStore {
    async fn follow(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<(), FollowRepositoryError> {
        let mut state = self.write().map_err(FollowRepositoryError::query)?;
        state
            .following
            .entry(follower.clone())
            .or_default()
            .insert(target.clone());
        state
            .followers
            .entry(target.clone())
            .or_default()
            .insert(follower.clone());
        Ok(())
    }

    async fn stop_following(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<(), FollowRepositoryError> {
        let mut state = self.write().map_err(FollowRepositoryError::query)?;
        if let Some(set) = state.following.get_mut(follower) {
            set.remove(target);
        }
        if let Some(set) = state.followers.get_mut(target) {
            set.remove(follower);
        }
        Ok(())
    }

    async fn is_following(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<bool, FollowRepositoryError> {
        let state = self.read().map_err(FollowRepositoryError::query)?;
        Ok(state
            .following
            .get(follower)
            .is_some_and(|set| set.contains(target)))
    }

    async fn followers(&self, user: &UserId) -> Result<Vec<UserName>, FollowRepositoryError> {
        let state = self.read().map_err(FollowRepositoryError::query)?;
        Ok(state.names_of(state.followers.get(user).into_iter().flatten()))
    }

    async fn following(&self, user: &UserId) -> Result<Vec<UserName>, FollowRepositoryError> {
        let state = self.read().map_err(FollowRepositoryError::query)?;
        Ok(state.names_of(state.following.get(user).into_iter().flatten()))
    }

    async fn also_followed(
        &self,
        viewer: &UserId,
        target: &UserId,
    ) -> Result<Vec<UserName>, FollowRepositoryError> {
        let state = self.read().map_err(FollowRepositoryError::query)?;
        let empty = BTreeSet::new();
        let mine = state.following.get(viewer).unwrap_or(&empty);
        let theirs = state.following.get(target).unwrap_or(&empty);
        Ok(state.names_of(mine.intersection(theirs)))
    }

    async fn common_followers(
        &self,
        viewer: &UserId,
        target: &UserId,
    ) -> Result<Vec<UserName>, FollowRepositoryError> {
        let state = self.read().map_err(FollowRepositoryError::query)?;
        let empty = BTreeSet::new();
        let mine = state.followers.get(viewer).unwrap_or(&empty);
        let theirs = state.followers.get(target).unwrap_or(&empty);
        Ok(state.names_of(mine.intersection(theirs)))
    }
}
