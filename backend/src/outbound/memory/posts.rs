//! Post log and the feeds derived from it.

use std::collections::BTreeSet;

use async_trait::async_trait;
use pagination::{Page, PageWindow};

use super::{InMemorySocialStore, StoreState, StoredPost};
use crate::domain::ports::{PostRepository, PostRepositoryError};
use crate::domain::{Post, PostDraft, PostId, UserId, UserName};

impl InMemorySocialStore {
    /// Cut one window out of the posts matching `keep`.
    ///
    /// `keep` is built from the same guard that supplies the posts, so the
    /// items and the "more" flag describe one snapshot.
    fn feed_page<K>(
        &self,
        window: &PageWindow,
        keep: impl FnOnce(&StoreState) -> K,
    ) -> Result<Page<Post>, PostRepositoryError>
    where
        K: Fn(&StoredPost) -> bool,
    {
        let guard = self.read().map_err(PostRepositoryError::query)?;
        let state: &StoreState = &guard;
        let feed = state.newest_first(keep(state));
        Ok(self.page_of(&feed, window).map(Post::clone))
    }
}

impl StoreState {
    /// `user` plus everyone `user` follows.
    fn timeline_members(&self, user: &UserId) -> BTreeSet<UserId> {
        let mut members = self.following.get(user).cloned().unwrap_or_default();
        members.insert(user.clone());
        members
    }
}

#[async_trait]
impl PostRepository for InMemorySocialStore {
    async fn post_exists(&self, id: &PostId) -> Result<bool, PostRepositoryError> {
        let state = self.read().map_err(PostRepositoryError::query)?;
        Ok(state.posts.iter().any(|stored| &stored.post.id == id))
    }

    async fn create_post(
        &self,
        author: &UserName,
        draft: &PostDraft,
    ) -> Result<PostId, PostRepositoryError> {
        let mut guard = self.write().map_err(PostRepositoryError::query)?;
        let state = &mut *guard;
        let author_id = state
            .accounts
            .get(author)
            .map(|account| account.id.clone())
            .ok_or_else(|| PostRepositoryError::query(format!("unknown author {author}")))?;
        let mentions = draft
            .mentions()
            .iter()
            .filter_map(|name| state.accounts.get(name).map(|account| account.id.clone()))
            .collect();
        let post = Post {
            id: PostId::random(),
            author: author.clone(),
            content: draft.content().to_owned(),
            created_at: self.clock.utc(),
            reply_to: draft.reply_to().cloned(),
            reply_pid: draft.reply_pid(),
        };
        let id = post.id;
        state.posts.push(StoredPost {
            post,
            author_id,
            mentions,
        });
        Ok(id)
    }

    async fn get_post(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError> {
        let state = self.read().map_err(PostRepositoryError::query)?;
        Ok(state
            .posts
            .iter()
            .find(|stored| &stored.post.id == id)
            .map(|stored| stored.post.clone()))
    }

    async fn user_posts(
        &self,
        user: &UserId,
        window: &PageWindow,
    ) -> Result<Page<Post>, PostRepositoryError> {
        self.feed_page(window, |_| |stored: &StoredPost| &stored.author_id == user)
    }

    async fn timeline(
        &self,
        user: &UserId,
        window: &PageWindow,
    ) -> Result<Page<Post>, PostRepositoryError> {
        self.feed_page(window, |state| {
            let members = state.timeline_members(user);
            move |stored: &StoredPost| members.contains(&stored.author_id)
        })
    }

    async fn global_timeline(
        &self,
        window: &PageWindow,
    ) -> Result<Page<Post>, PostRepositoryError> {
        self.feed_page(window, |_| |_: &StoredPost| true)
    }

    async fn mentions(
        &self,
        user: &UserId,
        window: &PageWindow,
    ) -> Result<Vec<Post>, PostRepositoryError> {
        let page = self.feed_page(window, |_| {
            |stored: &StoredPost| stored.mentions.contains(user)
        })?;
        Ok(page.items)
    }
}
