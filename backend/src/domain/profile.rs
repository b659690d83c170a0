//! Social context shown next to a profile or mentions feed.

use std::sync::Arc;

use super::ports::FollowRepository;
use super::{Attributes, AuthSession, Error, UserId, UserName};

/// How the signed-in viewer relates to someone else's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerRelation {
    /// Accounts the viewer follows that the profile owner also follows.
    pub also_followed: Vec<UserName>,
    /// Accounts following both the viewer and the profile owner.
    pub mutual_followers: Vec<UserName>,
    /// Whether the viewer follows the profile owner.
    pub is_following: bool,
}

/// Follow graph facts about a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileContext {
    pub followers: Vec<UserName>,
    pub following: Vec<UserName>,
    /// Present only for a signed-in viewer looking at another account.
    pub relation: Option<ViewerRelation>,
}

impl ProfileContext {
    /// Copy the context into view attributes.
    ///
    /// Relation keys are left out entirely when there is no relation, so a
    /// template can tell "not applicable" from "not following".
    pub fn write_to(&self, attributes: &mut Attributes) -> Result<(), Error> {
        attributes
            .insert("followers", &self.followers)?
            .insert("following", &self.following)?;
        if let Some(relation) = &self.relation {
            attributes
                .insert("alsoFollowed", &relation.also_followed)?
                .insert("mutualFollowers", &relation.mutual_followers)?
                .insert("isFollowing", &relation.is_following)?;
        }
        Ok(())
    }
}

/// Loads a [`ProfileContext`] for the viewer.
#[derive(Clone)]
pub struct ProfileEnricher {
    follows: Arc<dyn FollowRepository>,
}

impl ProfileEnricher {
    pub fn new(follows: Arc<dyn FollowRepository>) -> Self {
        Self { follows }
    }

    pub async fn enrich(
        &self,
        session: &AuthSession,
        target: &UserId,
    ) -> Result<ProfileContext, Error> {
        let followers = self.follows.followers(target).await?;
        let following = self.follows.following(target).await?;
        let relation = match session.current_identity() {
            Some(viewer) if viewer.user_id() != target => {
                let viewer = viewer.user_id();
                Some(ViewerRelation {
                    also_followed: self.follows.also_followed(viewer, target).await?,
                    mutual_followers: self.follows.common_followers(viewer, target).await?,
                    is_following: self.follows.is_following(viewer, target).await?,
                })
            }
            _ => None,
        };
        Ok(ProfileContext {
            followers,
            following,
            relation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Identity;
    use crate::domain::ports::MockFollowRepository;
    use rstest::rstest;
    use serde_json::json;

    fn name(raw: &str) -> UserName {
        UserName::new(raw).expect("valid name")
    }

    fn graph_basics(follows: &mut MockFollowRepository) {
        follows
            .expect_followers()
            .return_once(|_| Ok(vec![name("bob")]));
        follows.expect_following().return_once(|_| Ok(Vec::new()));
    }

    #[rstest]
    #[tokio::test]
    async fn anonymous_viewer_gets_no_relation() {
        let mut follows = MockFollowRepository::new();
        graph_basics(&mut follows);
        follows.expect_also_followed().never();
        follows.expect_common_followers().never();
        follows.expect_is_following().never();

        let context = ProfileEnricher::new(Arc::new(follows))
            .enrich(&AuthSession::anonymous(), &UserId::random())
            .await
            .expect("enrich");

        assert!(context.relation.is_none());
        let mut attributes = Attributes::new();
        context.write_to(&mut attributes).expect("write");
        assert_eq!(attributes.get("followers"), Some(&json!(["bob"])));
        assert!(!attributes.contains("isFollowing"));
        assert!(!attributes.contains("alsoFollowed"));
    }

    #[rstest]
    #[tokio::test]
    async fn owner_gets_no_relation() {
        let mut follows = MockFollowRepository::new();
        graph_basics(&mut follows);
        follows.expect_is_following().never();
        let owner = Identity::new(UserId::random(), name("ada"));
        let target = owner.user_id().clone();

        let context = ProfileEnricher::new(Arc::new(follows))
            .enrich(&AuthSession::signed_in(owner), &target)
            .await
            .expect("enrich");

        assert!(context.relation.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn other_viewer_gets_relation_even_when_false() {
        let mut follows = MockFollowRepository::new();
        graph_basics(&mut follows);
        follows
            .expect_also_followed()
            .return_once(|_, _| Ok(vec![name("carol")]));
        follows
            .expect_common_followers()
            .return_once(|_, _| Ok(Vec::new()));
        follows.expect_is_following().return_once(|_, _| Ok(false));
        let viewer = Identity::new(UserId::random(), name("ada"));

        let context = ProfileEnricher::new(Arc::new(follows))
            .enrich(&AuthSession::signed_in(viewer), &UserId::random())
            .await
            .expect("enrich");

        let mut attributes = Attributes::new();
        context.write_to(&mut attributes).expect("write");
        assert_eq!(attributes.get("isFollowing"), Some(&json!(false)));
        assert_eq!(attributes.get("alsoFollowed"), Some(&json!(["carol"])));
        assert_eq!(attributes.get("mutualFollowers"), Some(&json!([])));
    }
}
