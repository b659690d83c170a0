//! Behaviour of the in-memory store through its port traits.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use pagination::{PageSize, PageWindow};
use rstest::{fixture, rstest};

use super::{InMemorySocialStore, StoreSettings};
use crate::domain::ports::{AccountRepository, FollowRepository, PostRepository};
use crate::domain::{AuthToken, LoginCredentials, PostDraft, UserId, UserName};

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }
}

#[fixture]
fn store() -> InMemorySocialStore {
    InMemorySocialStore::new(
        Arc::new(FixtureClock),
        StoreSettings {
            page_size: PageSize::new(2).expect("page size"),
            newest_users: 2,
        },
    )
}

fn name(raw: &str) -> UserName {
    UserName::new(raw).expect("valid name")
}

async fn register(store: &InMemorySocialStore, raw: &str) -> UserId {
    let handle = name(raw);
    store.add_user(&handle, "secret").await.expect("add user");
    store
        .find_user_id(&handle)
        .await
        .expect("lookup")
        .expect("registered")
}

async fn publish(store: &InMemorySocialStore, author: &str, content: &str) {
    let draft = PostDraft::new(content, None, None).expect("draft");
    store
        .create_post(&name(author), &draft)
        .await
        .expect("create post");
}

fn contents(posts: &[crate::domain::Post]) -> Vec<&str> {
    posts.iter().map(|post| post.content.as_str()).collect()
}

#[rstest]
#[tokio::test]
async fn own_posts_are_windowed_newest_first(store: InMemorySocialStore) {
    let ada = register(&store, "ada").await;
    for text in ["one", "two", "three"] {
        publish(&store, "ada", text).await;
    }

    let first = store
        .user_posts(&ada, &PageWindow::bounded(1))
        .await
        .expect("page 1");
    let second = store
        .user_posts(&ada, &PageWindow::bounded(2))
        .await
        .expect("page 2");

    assert_eq!(contents(&first.items), ["three", "two"]);
    assert!(first.has_more);
    assert_eq!(first.next_page, Some(2));
    assert_eq!(contents(&second.items), ["one"]);
    assert!(!second.has_more);
}

#[rstest]
#[tokio::test]
async fn timeline_flag_matches_the_items_it_returns(store: InMemorySocialStore) {
    let ada = register(&store, "ada").await;
    let bob = register(&store, "bob").await;
    store.follow(&ada, &bob).await.expect("follow");
    publish(&store, "ada", "mine").await;
    publish(&store, "bob", "theirs").await;

    let exact = store
        .timeline(&ada, &PageWindow::bounded(1))
        .await
        .expect("page 1");
    publish(&store, "bob", "later").await;
    let grown = store
        .timeline(&ada, &PageWindow::bounded(1))
        .await
        .expect("page 1 again");

    assert_eq!(contents(&exact.items), ["theirs", "mine"]);
    assert!(!exact.has_more);
    assert_eq!(contents(&grown.items), ["later", "theirs"]);
    assert!(grown.has_more);
}

#[rstest]
#[tokio::test]
async fn timeline_merges_followed_authors(store: InMemorySocialStore) {
    let ada = register(&store, "ada").await;
    let bob = register(&store, "bob").await;
    register(&store, "carol").await;
    publish(&store, "bob", "from bob").await;
    publish(&store, "carol", "from carol").await;
    publish(&store, "ada", "from ada").await;
    store.follow(&ada, &bob).await.expect("follow");

    let timeline = store
        .timeline(&ada, &PageWindow::full_range())
        .await
        .expect("timeline");

    assert_eq!(contents(&timeline.items), ["from ada", "from bob"]);
    assert!(!timeline.has_more);
}

#[rstest]
#[tokio::test]
async fn mentions_include_reply_target(store: InMemorySocialStore) {
    let bob = register(&store, "bob").await;
    register(&store, "ada").await;
    publish(&store, "ada", "hello @bob").await;
    publish(&store, "ada", "no mention").await;
    let reply = PostDraft::new("agreed", Some(name("bob")), None).expect("draft");
    store
        .create_post(&name("ada"), &reply)
        .await
        .expect("reply");

    let mentions = store
        .mentions(&bob, &PageWindow::full_range())
        .await
        .expect("mentions");

    assert_eq!(contents(&mentions), ["agreed", "hello @bob"]);
    assert_eq!(mentions[0].reply_to, Some(name("bob")));
}

#[rstest]
#[tokio::test]
async fn graph_intersections(store: InMemorySocialStore) {
    let ada = register(&store, "ada").await;
    let bob = register(&store, "bob").await;
    let carol = register(&store, "carol").await;
    let dave = register(&store, "dave").await;
    // ada and bob both follow carol; dave follows both of them.
    store.follow(&ada, &carol).await.expect("follow");
    store.follow(&bob, &carol).await.expect("follow");
    store.follow(&dave, &ada).await.expect("follow");
    store.follow(&dave, &bob).await.expect("follow");

    assert_eq!(
        store.also_followed(&ada, &bob).await.expect("also"),
        [name("carol")]
    );
    assert_eq!(
        store.common_followers(&ada, &bob).await.expect("common"),
        [name("dave")]
    );
    assert!(!store.is_following(&ada, &bob).await.expect("edge"));

    store.stop_following(&dave, &ada).await.expect("unfollow");
    assert!(store.followers(&ada).await.expect("followers").is_empty());
    assert_eq!(
        store.following(&dave).await.expect("following"),
        [name("bob")]
    );
}

#[rstest]
#[tokio::test]
async fn tokens_rotate_and_revoke(store: InMemorySocialStore) {
    let handle = name("ada");
    let first = store.add_user(&handle, "secret").await.expect("add user");
    let second = store.add_auth(&handle).await.expect("add auth");

    assert_ne!(first, second);
    assert!(store
        .identity_for_token(&first)
        .await
        .expect("lookup")
        .is_none());
    let identity = store
        .identity_for_token(&second)
        .await
        .expect("lookup")
        .expect("live token");
    assert_eq!(identity.name(), &handle);

    store.delete_auth(&handle).await.expect("revoke");
    assert!(store
        .identity_for_token(&second)
        .await
        .expect("lookup")
        .is_none());
    let stray = AuthToken::new("not-a-token").expect("token");
    assert!(store
        .identity_for_token(&stray)
        .await
        .expect("lookup")
        .is_none());
}

#[rstest]
#[case("ada", "secret", true)]
#[case("ada", "Secret", false)]
#[case("bob", "secret", false)]
#[tokio::test]
async fn password_verification(
    store: InMemorySocialStore,
    #[case] user: &str,
    #[case] password: &str,
    #[case] expected: bool,
) {
    register(&store, "ada").await;
    let credentials = LoginCredentials::try_from_parts(user, password).expect("credentials");
    assert_eq!(
        store.verify_password(&credentials).await.expect("verify"),
        expected
    );
}

#[rstest]
#[tokio::test]
async fn duplicate_registration_fails(store: InMemorySocialStore) {
    register(&store, "ada").await;
    assert!(store.add_user(&name("ada"), "other").await.is_err());
}

#[rstest]
#[tokio::test]
async fn newest_users_are_capped(store: InMemorySocialStore) {
    for user in ["ada", "bob", "carol"] {
        register(&store, user).await;
    }

    let newest = store
        .newest_users(&PageWindow::full_range())
        .await
        .expect("newest");

    assert_eq!(newest, [name("carol"), name("bob")]);
}

#[rstest]
#[tokio::test]
async fn posts_carry_clock_time(store: InMemorySocialStore) {
    register(&store, "ada").await;
    let draft = PostDraft::new("hi", None, None).expect("draft");
    let id = store
        .create_post(&name("ada"), &draft)
        .await
        .expect("create");

    let post = store.get_post(&id).await.expect("get").expect("stored");
    assert_eq!(post.created_at, FixtureClock.utc());
    assert!(store.post_exists(&id).await.expect("exists"));
}
