//! Route handlers for the micro-blogging surface.
//!
//! Every route takes the request's [`AuthSession`] explicitly, checks its
//! preconditions against storage, and produces a [`RouteOutcome`]. A user or
//! post that does not resolve short-circuits to the "nodata" view; only
//! collaborator failures surface as [`Error`].

use std::sync::Arc;

use pagination::PageWindow;
use serde::Serialize;
use tracing::{info, warn};

use super::ports::{
    AccountRepository, AccountRepositoryError, FollowRepository, FollowRepositoryError,
    PostRepository, PostRepositoryError,
};
use super::{
    Attributes, AuthSession, AuthToken, Error, FeedSelector, Identity, LoginCredentials,
    NoSuchData, Post, PostDraft, PostId, ProfileEnricher, RouteOutcome, SessionDirective,
    SignInFlag, SignUpForm, UserId, UserName, ViewName,
};

/// Location of the service root.
pub const ROOT_PATH: &str = "/";
/// Location of the sign-in form.
pub const SIGN_IN_PATH: &str = "/signIn";

/// Query parameters accepted by the profile view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileQuery {
    pub page: Option<i64>,
    pub reply_to: Option<String>,
    pub reply_pid: Option<String>,
}

/// Fields submitted by the profile post form.
///
/// The default value doubles as the empty placeholder the home view binds
/// its form to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostForm {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_pid: Option<String>,
}

/// Why a route stopped before producing its normal outcome.
#[derive(Debug)]
enum Halt {
    Missing(NoSuchData),
    Failed(Error),
}

macro_rules! halt_from {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for Halt {
                fn from(error: $source) -> Self {
                    Self::Failed(Error::from(error))
                }
            }
        )+
    };
}

halt_from!(
    Error,
    AccountRepositoryError,
    PostRepositoryError,
    FollowRepositoryError,
);

impl From<NoSuchData> for Halt {
    fn from(missing: NoSuchData) -> Self {
        Self::Missing(missing)
    }
}

fn settle(result: Result<RouteOutcome, Halt>) -> Result<RouteOutcome, Error> {
    match result {
        Ok(outcome) => Ok(outcome),
        Err(Halt::Missing(missing)) => {
            warn!(
                identifier = missing.identifier(),
                kind = ?missing.kind(),
                "route target does not exist"
            );
            Ok(RouteOutcome::no_data(missing))
        }
        Err(Halt::Failed(error)) => Err(error),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

fn sign_in_view(flag: Option<SignInFlag>) -> Result<RouteOutcome, Error> {
    let mut attributes = Attributes::new();
    if let Some(flag) = flag {
        attributes.insert("error", &flag)?;
    }
    Ok(RouteOutcome::view(ViewName::Signin, attributes))
}

/// Entry point for every route.
#[derive(Clone)]
pub struct RequestRouter {
    accounts: Arc<dyn AccountRepository>,
    posts: Arc<dyn PostRepository>,
    follows: Arc<dyn FollowRepository>,
    feeds: FeedSelector,
    profiles: ProfileEnricher,
}

impl RequestRouter {
    /// Router over the three storage ports.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        posts: Arc<dyn PostRepository>,
        follows: Arc<dyn FollowRepository>,
    ) -> Self {
        let feeds = FeedSelector::new(Arc::clone(&posts), Arc::clone(&accounts));
        let profiles = ProfileEnricher::new(Arc::clone(&follows));
        Self {
            accounts,
            posts,
            follows,
            feeds,
            profiles,
        }
    }

    /// Resolve the session for a request from its cookie token.
    pub async fn session_for(&self, token: Option<&AuthToken>) -> Result<AuthSession, Error> {
        AuthSession::resolve(self.accounts.as_ref(), token).await
    }

    async fn require_user(&self, raw: &str) -> Result<(UserName, UserId), Halt> {
        let name = UserName::new(raw).map_err(|_| NoSuchData::user(raw))?;
        let id = self
            .accounts
            .find_user_id(&name)
            .await?
            .ok_or_else(|| NoSuchData::user(raw))?;
        Ok((name, id))
    }

    async fn require_post(&self, raw: &str) -> Result<Post, Halt> {
        let id = PostId::new(raw).map_err(|_| NoSuchData::post(raw))?;
        let post = self
            .feeds
            .single_post(&id)
            .await?
            .ok_or_else(|| NoSuchData::post(raw))?;
        Ok(post)
    }

    async fn establish(
        &self,
        session: &mut AuthSession,
        name: &UserName,
        token: AuthToken,
    ) -> Result<RouteOutcome, Error> {
        let user_id = self
            .accounts
            .find_user_id(name)
            .await?
            .ok_or_else(|| Error::internal(format!("account {name} vanished after auth")))?;
        let grant = session.establish(Identity::new(user_id, name.clone()), token);
        Ok(RouteOutcome::redirect(name.profile_path())
            .with_session(SessionDirective::Establish(grant)))
    }

    /// `/`: signed-in callers go to their own profile, everyone else sees
    /// the requested page of the global timeline.
    pub async fn root(
        &self,
        session: &AuthSession,
        page: Option<i64>,
    ) -> Result<RouteOutcome, Error> {
        match session.current_identity() {
            Some(identity) => Ok(RouteOutcome::redirect(identity.name().profile_path())),
            None => self.timeline(page).await,
        }
    }

    /// `/signUp`: register a new account and sign it in.
    pub async fn sign_up(
        &self,
        session: &mut AuthSession,
        form: &SignUpForm,
    ) -> Result<RouteOutcome, Error> {
        let Some(name) = form.name() else {
            return sign_in_view(Some(SignInFlag::InvalidName));
        };
        if self.accounts.user_exists(name).await? {
            return sign_in_view(Some(SignInFlag::DuplicateUser));
        }
        if !form.passwords_match() {
            return sign_in_view(Some(SignInFlag::PasswordMismatch));
        }
        let token = self.accounts.add_user(name, form.password()).await?;
        info!(user = %name, "account created");
        self.establish(session, name, token).await
    }

    /// `/signIn`: verify credentials and issue a fresh token.
    ///
    /// A request carrying neither field just shows the form.
    pub async fn sign_in(
        &self,
        session: &mut AuthSession,
        name: Option<&str>,
        password: Option<&str>,
    ) -> Result<RouteOutcome, Error> {
        if non_blank(name).is_none() && non_blank(password).is_none() {
            return sign_in_view(None);
        }
        let Ok(credentials) =
            LoginCredentials::try_from_parts(name.unwrap_or_default(), password.unwrap_or_default())
        else {
            return sign_in_view(Some(SignInFlag::BadPassword));
        };
        if !self.accounts.verify_password(&credentials).await? {
            warn!(user = %credentials.username(), "sign-in rejected");
            return sign_in_view(Some(SignInFlag::BadPassword));
        }
        let token = self.accounts.add_auth(credentials.username()).await?;
        info!(user = %credentials.username(), "signed in");
        self.establish(session, credentials.username(), token).await
    }

    /// `GET /!{name}`: profile page with its feed.
    pub async fn profile(
        &self,
        session: &AuthSession,
        name: &str,
        query: &ProfileQuery,
    ) -> Result<RouteOutcome, Error> {
        settle(self.profile_inner(session, name, query).await)
    }

    async fn profile_inner(
        &self,
        session: &AuthSession,
        raw_name: &str,
        query: &ProfileQuery,
    ) -> Result<RouteOutcome, Halt> {
        let (name, target) = self.require_user(raw_name).await?;
        let window = PageWindow::from_raw(query.page);
        let feed = self.feeds.profile(session, &target, &window).await?;
        let context = self.profiles.enrich(session, &target).await?;

        let mut attributes = Attributes::new();
        attributes
            .insert("post", &PostForm::default())?
            .insert("name", &name)?;
        context.write_to(&mut attributes)?;
        if session.is_signed_in() {
            if let Some(reply_to) = non_blank(query.reply_to.as_deref()) {
                attributes.insert("replyTo", reply_to)?;
            }
            if let Some(reply_pid) = non_blank(query.reply_pid.as_deref()) {
                attributes.insert("replyPid", reply_pid)?;
            }
        }
        attributes
            .insert("page", &window.displayed_page())?
            .insert("morePosts", &feed.has_more)?
            .insert("posts", &feed.items)?;
        Ok(RouteOutcome::view(ViewName::Home, attributes))
    }

    /// `POST /!{name}`: publish a post as the profile owner.
    ///
    /// Only the owner may post to a profile; anyone else is sent back to it
    /// without side effects. Content that fails validation is dropped the
    /// same way.
    pub async fn post_message(
        &self,
        session: &AuthSession,
        name: &str,
        form: &PostForm,
    ) -> Result<RouteOutcome, Error> {
        settle(self.post_inner(session, name, form).await)
    }

    async fn post_inner(
        &self,
        session: &AuthSession,
        raw_name: &str,
        form: &PostForm,
    ) -> Result<RouteOutcome, Halt> {
        let (name, target) = self.require_user(raw_name).await?;
        let back = RouteOutcome::redirect(name.profile_path());
        if !session.is_owner(&target) {
            warn!(target_user = %name, "post rejected: viewer does not own profile");
            return Ok(back);
        }
        let reply_to = non_blank(form.reply_to.as_deref()).and_then(|raw| UserName::new(raw).ok());
        let reply_pid = non_blank(form.reply_pid.as_deref()).and_then(|raw| PostId::new(raw).ok());
        let draft = match PostDraft::new(form.content.as_str(), reply_to, reply_pid) {
            Ok(draft) => draft,
            Err(error) => {
                warn!(target_user = %name, %error, "post rejected");
                return Ok(back);
            }
        };
        let id = self.posts.create_post(&name, &draft).await?;
        info!(author = %name, post = %id, "post published");
        Ok(back)
    }

    /// `/!{name}/follow`.
    pub async fn follow(&self, session: &AuthSession, name: &str) -> Result<RouteOutcome, Error> {
        settle(self.follow_inner(session, name, true).await)
    }

    /// `/!{name}/stopfollowing`.
    pub async fn stop_following(
        &self,
        session: &AuthSession,
        name: &str,
    ) -> Result<RouteOutcome, Error> {
        settle(self.follow_inner(session, name, false).await)
    }

    async fn follow_inner(
        &self,
        session: &AuthSession,
        raw_name: &str,
        follow: bool,
    ) -> Result<RouteOutcome, Halt> {
        let (name, target) = self.require_user(raw_name).await?;
        let Some(viewer) = session.current_identity() else {
            return Ok(RouteOutcome::redirect(SIGN_IN_PATH));
        };
        let back = RouteOutcome::redirect(name.profile_path());
        if viewer.user_id() == &target {
            return Ok(back);
        }
        if follow {
            self.follows.follow(viewer.user_id(), &target).await?;
            info!(follower = %viewer.name(), target_user = %name, "follow added");
        } else {
            self.follows.stop_following(viewer.user_id(), &target).await?;
            info!(follower = %viewer.name(), target_user = %name, "follow removed");
        }
        Ok(back)
    }

    /// `/!{name}/mentions`: every post mentioning the user.
    pub async fn mentions(&self, session: &AuthSession, name: &str) -> Result<RouteOutcome, Error> {
        settle(self.mentions_inner(session, name).await)
    }

    async fn mentions_inner(
        &self,
        session: &AuthSession,
        raw_name: &str,
    ) -> Result<RouteOutcome, Halt> {
        let (name, target) = self.require_user(raw_name).await?;
        let feed = self.feeds.mentions(&target).await?;
        let context = self.profiles.enrich(session, &target).await?;

        let mut attributes = Attributes::new();
        attributes
            .insert("name", &name)?
            .insert("posts", &feed.items)?;
        context.write_to(&mut attributes)?;
        Ok(RouteOutcome::view(ViewName::Mentions, attributes))
    }

    /// `/timeline`: the global stream and the newest accounts.
    pub async fn timeline(&self, page: Option<i64>) -> Result<RouteOutcome, Error> {
        let window = PageWindow::from_raw(page);
        let global = self.feeds.global(&window).await?;

        let mut attributes = Attributes::new();
        attributes
            .insert("page", &window.displayed_page())?
            .insert("morePosts", &global.feed.has_more)?
            .insert("posts", &global.feed.items)?
            .insert("users", &global.newest_users)?;
        Ok(RouteOutcome::view(ViewName::Timeline, attributes))
    }

    /// `/logout`: revoke the caller's token and drop the cookie.
    pub async fn logout(&self, session: &AuthSession) -> Result<RouteOutcome, Error> {
        session.clear(self.accounts.as_ref()).await?;
        Ok(RouteOutcome::redirect(ROOT_PATH).with_session(SessionDirective::Clear))
    }

    /// `/status?pid=`: a single post.
    pub async fn status(&self, pid: Option<&str>) -> Result<RouteOutcome, Error> {
        settle(self.status_inner(pid.unwrap_or_default()).await)
    }

    async fn status_inner(&self, pid: &str) -> Result<RouteOutcome, Halt> {
        let post = self.require_post(pid).await?;
        let mut attributes = Attributes::new();
        attributes.insert("posts", &[post])?;
        Ok(RouteOutcome::view(ViewName::Status, attributes))
    }
}
