//! Driven port for posts and the feeds built from them.
//!
//! Paged feed queries answer with a [`Page`], so the items of a window and
//! whether the feed continues past it come from the same read.

use async_trait::async_trait;
use pagination::{Page, PageWindow};

use crate::domain::{Post, PostDraft, PostId, UserId, UserName};

use super::define_port_error;

define_port_error! {
    /// Errors raised by post repository adapters.
    pub enum PostRepositoryError for "post repository"
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Whether a post with this id exists.
    async fn post_exists(&self, id: &PostId) -> Result<bool, PostRepositoryError>;

    /// Publish a draft under `author` and fan it out to followers and
    /// mentioned users.
    async fn create_post(
        &self,
        author: &UserName,
        draft: &PostDraft,
    ) -> Result<PostId, PostRepositoryError>;

    /// Fetch one post.
    async fn get_post(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError>;

    /// One window of the posts written by `user`, newest first.
    async fn user_posts(
        &self,
        user: &UserId,
        window: &PageWindow,
    ) -> Result<Page<Post>, PostRepositoryError>;

    /// One window of `user`'s posts plus posts from everyone `user`
    /// follows, newest first.
    async fn timeline(
        &self,
        user: &UserId,
        window: &PageWindow,
    ) -> Result<Page<Post>, PostRepositoryError>;

    /// One window of every post on the service, newest first.
    async fn global_timeline(
        &self,
        window: &PageWindow,
    ) -> Result<Page<Post>, PostRepositoryError>;

    /// Posts that mention `user`, newest first.
    async fn mentions(
        &self,
        user: &UserId,
        window: &PageWindow,
    ) -> Result<Vec<Post>, PostRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Error, ErrorCode};
    use rstest::rstest;

    #[rstest]
    #[case(PostRepositoryError::connection("down"), ErrorCode::ServiceUnavailable)]
    #[case(PostRepositoryError::query("bad row"), ErrorCode::InternalError)]
    fn maps_to_domain_errors(#[case] error: PostRepositoryError, #[case] code: ErrorCode) {
        let mapped = Error::from(error);
        assert_eq!(mapped.code(), code);
        assert!(mapped.message().starts_with("post repository"));
    }
}
