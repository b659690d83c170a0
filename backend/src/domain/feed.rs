//! Feed selection.
//!
//! Decides which stream of posts a route shows and asks storage for one
//! window of it.

use std::sync::Arc;

use pagination::{Page, PageWindow};
use tracing::debug;

use super::ports::{AccountRepository, PostRepository};
use super::{AuthSession, Error, Post, PostId, UserId, UserName};

/// Which stream produced a [`FeedResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    /// The viewer's own posts plus everyone they follow.
    Timeline,
    /// Posts written by the profile owner only.
    OwnPosts,
    /// Posts mentioning the profile owner.
    Mentions,
    /// Every post on the service.
    Global,
}

/// Posts for one window of a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResult {
    pub items: Vec<Post>,
    pub has_more: bool,
    pub source: FeedSource,
}

impl FeedResult {
    fn from_page(page: Page<Post>, source: FeedSource) -> Self {
        Self {
            items: page.items,
            has_more: page.has_more,
            source,
        }
    }
}

/// Global stream plus the newest accounts shown beside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalFeed {
    pub feed: FeedResult,
    pub newest_users: Vec<UserName>,
}

/// Picks and loads the feed for a route.
#[derive(Clone)]
pub struct FeedSelector {
    posts: Arc<dyn PostRepository>,
    accounts: Arc<dyn AccountRepository>,
}

impl FeedSelector {
    /// Selector backed by the given ports.
    pub fn new(posts: Arc<dyn PostRepository>, accounts: Arc<dyn AccountRepository>) -> Self {
        Self { posts, accounts }
    }

    /// Feed for a profile page.
    ///
    /// The owner sees their aggregated timeline even when they follow
    /// nobody; anyone else sees the owner's own posts.
    pub async fn profile(
        &self,
        session: &AuthSession,
        target: &UserId,
        window: &PageWindow,
    ) -> Result<FeedResult, Error> {
        let result = if session.is_owner(target) {
            let page = self.posts.timeline(target, window).await?;
            FeedResult::from_page(page, FeedSource::Timeline)
        } else {
            let page = self.posts.user_posts(target, window).await?;
            FeedResult::from_page(page, FeedSource::OwnPosts)
        };
        debug!(
            target_user = %target,
            source = ?result.source,
            items = result.items.len(),
            "profile feed selected"
        );
        Ok(result)
    }

    /// Every post mentioning `target`, unpaginated.
    pub async fn mentions(&self, target: &UserId) -> Result<FeedResult, Error> {
        let items = self
            .posts
            .mentions(target, &PageWindow::full_range())
            .await?;
        debug!(target_user = %target, items = items.len(), "mentions feed selected");
        Ok(FeedResult {
            items,
            has_more: false,
            source: FeedSource::Mentions,
        })
    }

    /// One window of the global stream and the newest accounts.
    pub async fn global(&self, window: &PageWindow) -> Result<GlobalFeed, Error> {
        let page = self.posts.global_timeline(window).await?;
        let newest_users = self
            .accounts
            .newest_users(&PageWindow::full_range())
            .await?;
        let feed = FeedResult::from_page(page, FeedSource::Global);
        debug!(
            items = feed.items.len(),
            has_more = feed.has_more,
            "global feed selected"
        );
        Ok(GlobalFeed { feed, newest_users })
    }

    /// A single post, or `None` when the id does not resolve.
    pub async fn single_post(&self, id: &PostId) -> Result<Option<Post>, Error> {
        if !self.posts.post_exists(id).await? {
            return Ok(None);
        }
        Ok(self.posts.get_post(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Identity;
    use crate::domain::ports::{MockAccountRepository, MockPostRepository};
    use rstest::{fixture, rstest};

    #[fixture]
    fn owner() -> Identity {
        Identity::new(UserId::random(), UserName::new("ada").expect("fixture name"))
    }

    fn page(has_more: bool) -> Page<Post> {
        Page {
            items: Vec::new(),
            has_more,
            next_page: Some(2),
        }
    }

    fn empty_feed(source: FeedSource) -> FeedResult {
        FeedResult {
            items: Vec::new(),
            has_more: false,
            source,
        }
    }

    fn selector(posts: MockPostRepository) -> FeedSelector {
        FeedSelector::new(Arc::new(posts), Arc::new(MockAccountRepository::new()))
    }

    #[rstest]
    #[tokio::test]
    async fn owner_gets_timeline_even_with_no_follows(owner: Identity) {
        let mut posts = MockPostRepository::new();
        posts
            .expect_timeline()
            .times(1)
            .return_once(|_, _| Ok(page(false)));
        posts.expect_user_posts().never();
        let target = owner.user_id().clone();
        let session = AuthSession::signed_in(owner);

        let feed = selector(posts)
            .profile(&session, &target, &PageWindow::default())
            .await
            .expect("feed");

        assert_eq!(feed, empty_feed(FeedSource::Timeline));
    }

    #[rstest]
    #[case::anonymous(None)]
    #[case::other_viewer(Some("bob"))]
    #[tokio::test]
    async fn others_get_own_posts(#[case] viewer: Option<&str>) {
        let mut posts = MockPostRepository::new();
        posts.expect_timeline().never();
        posts
            .expect_user_posts()
            .times(1)
            .return_once(|_, _| Ok(page(true)));
        let session = viewer.map_or_else(AuthSession::anonymous, |name| {
            AuthSession::signed_in(Identity::new(
                UserId::random(),
                UserName::new(name).expect("viewer name"),
            ))
        });

        let feed = selector(posts)
            .profile(&session, &UserId::random(), &PageWindow::bounded(2))
            .await
            .expect("feed");

        assert_eq!(feed.source, FeedSource::OwnPosts);
        assert!(feed.has_more);
    }

    #[rstest]
    #[tokio::test]
    async fn mentions_ignore_paging() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_mentions()
            .withf(|_, window| window.is_full_range())
            .times(1)
            .return_once(|_, _| Ok(Vec::new()));

        let feed = selector(posts)
            .mentions(&UserId::random())
            .await
            .expect("feed");

        assert_eq!(feed, empty_feed(FeedSource::Mentions));
    }

    #[rstest]
    #[tokio::test]
    async fn global_lists_newest_users_unpaginated() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_global_timeline()
            .withf(|window| window.page_number() == Some(3))
            .return_once(|_| Ok(page(false)));
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_newest_users()
            .withf(PageWindow::is_full_range)
            .return_once(|_| Ok(vec![UserName::new("ada").expect("name")]));

        let global = FeedSelector::new(Arc::new(posts), Arc::new(accounts))
            .global(&PageWindow::bounded(3))
            .await
            .expect("feed");

        assert_eq!(global.feed.source, FeedSource::Global);
        assert_eq!(global.newest_users.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_post_resolves_to_none() {
        let mut posts = MockPostRepository::new();
        posts.expect_post_exists().return_once(|_| Ok(false));
        posts.expect_get_post().never();

        let post = selector(posts)
            .single_post(&PostId::random())
            .await
            .expect("lookup");

        assert!(post.is_none());
    }
}
