//! Page handlers for the micro-blogging surface.
//!
//! ```text
//! GET  /                      own profile or global timeline, ?page
//! GET|POST /signUp            name, pass, pass2
//! GET  /signIn  POST /signIn  name, pass
//! GET  /!{name}               ?page&replyto&replypid
//! POST /!{name}               content, replyTo, replyPid
//! GET|POST /!{name}/follow
//! GET|POST /!{name}/stopfollowing
//! GET  /!{name}/mentions
//! GET  /timeline              ?page
//! GET  /logout
//! GET  /status                ?pid
//! ```
//!
//! Every handler resolves the caller's session from the cookie, hands the
//! request to the [`crate::domain::RequestRouter`] and renders the outcome.
//! Bodies or query strings that cannot be decoded at all are answered with
//! an `invalid_request` error.

use actix_web::{HttpResponse, get, post, route, web};
use serde::Deserialize;

use crate::domain::{AuthSession, Error, PostForm, ProfileQuery, SignUpForm};
use crate::inbound::http::ApiResult;
use crate::inbound::http::render::respond;
use crate::inbound::http::schemas::RenderedViewSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Sign-up fields, from the form body of `POST /signUp` or the query of
/// `GET /signUp`.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct SignUpRequest {
    pub name: String,
    pub pass: String,
    pub pass2: String,
}

/// Credentials for `/signIn`; both fields may be omitted to show the form.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SignInRequest {
    pub name: Option<String>,
    pub pass: Option<String>,
}

/// Query string of `GET /!{name}`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProfileParams {
    /// Page to show; negative values count as positive, garbage as page 1.
    pub page: Option<String>,
    /// Handle to prefill as the reply target.
    pub replyto: Option<String>,
    /// Post id to prefill as the reply anchor.
    pub replypid: Option<String>,
}

/// Post form for `POST /!{name}`.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PostRequest {
    pub content: String,
    pub reply_to: Option<String>,
    pub reply_pid: Option<String>,
}

/// Query string of `GET /timeline` and `GET /`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimelineParams {
    pub page: Option<String>,
}

/// Query string of `GET /status`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusParams {
    pub pid: Option<String>,
}

fn parse_page(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse().ok())
}

impl From<ProfileParams> for ProfileQuery {
    fn from(params: ProfileParams) -> Self {
        Self {
            page: parse_page(params.page.as_deref()),
            reply_to: params.replyto,
            reply_pid: params.replypid,
        }
    }
}

impl From<PostRequest> for PostForm {
    fn from(request: PostRequest) -> Self {
        Self {
            content: request.content,
            reply_to: request.reply_to,
            reply_pid: request.reply_pid,
        }
    }
}

async fn auth_session(state: &HttpState, session: &SessionContext) -> Result<AuthSession, Error> {
    let token = session.auth_token()?;
    state.router.session_for(token.as_ref()).await
}

/// Register every page handler.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use murmur::inbound::http::pages;
///
/// let app = App::new().configure(pages::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().error_handler(|err, _| undecodable(&err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| undecodable(&err)))
        .service(home)
        .service(sign_up)
        .service(sign_up_query)
        .service(sign_in_form)
        .service(sign_in)
        .service(timeline)
        .service(logout)
        .service(status)
        .service(follow)
        .service(stop_following)
        .service(mentions)
        .service(profile)
        .service(post_message);
}

fn undecodable(err: &impl std::fmt::Display) -> actix_web::Error {
    Error::invalid_request(format!("undecodable request: {err}")).into()
}

/// Own profile for signed-in callers, global timeline otherwise.
#[utoipa::path(
    get,
    path = "/",
    params(TimelineParams),
    responses(
        (status = 200, description = "Timeline view", body = RenderedViewSchema),
        (status = 303, description = "Redirect to the caller's profile")
    ),
    tags = ["pages"],
    operation_id = "home"
)]
#[get("/")]
pub async fn home(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<TimelineParams>,
) -> ApiResult<HttpResponse> {
    let auth = auth_session(&state, &session).await?;
    let outcome = state
        .router
        .root(&auth, parse_page(query.page.as_deref()))
        .await?;
    respond(outcome, &session, state.renderer.as_ref())
}

/// Register an account and sign it in.
#[utoipa::path(
    post,
    path = "/signUp",
    request_body(content = SignUpRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed up; redirect to the new profile", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 200, description = "Sign-in view with an error flag", body = RenderedViewSchema),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["pages"],
    operation_id = "signUp"
)]
#[post("/signUp")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<SignUpRequest>,
) -> ApiResult<HttpResponse> {
    sign_up_with(&state, &session, &form).await
}

/// Register from query parameters; with none supplied this lands on the
/// flagged sign-in view.
#[utoipa::path(
    get,
    path = "/signUp",
    params(SignUpRequest),
    responses(
        (status = 303, description = "Signed up; redirect to the new profile", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 200, description = "Sign-in view with an error flag", body = RenderedViewSchema)
    ),
    tags = ["pages"],
    operation_id = "signUpQuery"
)]
#[get("/signUp")]
pub async fn sign_up_query(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SignUpRequest>,
) -> ApiResult<HttpResponse> {
    sign_up_with(&state, &session, &query).await
}

async fn sign_up_with(
    state: &HttpState,
    session: &SessionContext,
    request: &SignUpRequest,
) -> ApiResult<HttpResponse> {
    let mut auth = auth_session(state, session).await?;
    let form = SignUpForm::new(&request.name, &request.pass, &request.pass2);
    let outcome = state.router.sign_up(&mut auth, &form).await?;
    respond(outcome, session, state.renderer.as_ref())
}

/// Show the sign-in form, or sign in when credentials are in the query.
#[utoipa::path(
    get,
    path = "/signIn",
    params(SignInRequest),
    responses(
        (status = 200, description = "Sign-in view", body = RenderedViewSchema),
        (status = 303, description = "Signed in; redirect to the caller's profile")
    ),
    tags = ["pages"],
    operation_id = "signInForm"
)]
#[get("/signIn")]
pub async fn sign_in_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SignInRequest>,
) -> ApiResult<HttpResponse> {
    sign_in_with(&state, &session, &query).await
}

/// Verify credentials and issue a fresh token.
#[utoipa::path(
    post,
    path = "/signIn",
    request_body(content = SignInRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in; redirect to the caller's profile", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 200, description = "Sign-in view, flagged when the credentials were wrong", body = RenderedViewSchema)
    ),
    tags = ["pages"],
    operation_id = "signIn"
)]
#[post("/signIn")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<SignInRequest>,
) -> ApiResult<HttpResponse> {
    sign_in_with(&state, &session, &form).await
}

async fn sign_in_with(
    state: &HttpState,
    session: &SessionContext,
    credentials: &SignInRequest,
) -> ApiResult<HttpResponse> {
    let mut auth = auth_session(state, session).await?;
    let outcome = state
        .router
        .sign_in(
            &mut auth,
            credentials.name.as_deref(),
            credentials.pass.as_deref(),
        )
        .await?;
    respond(outcome, session, state.renderer.as_ref())
}

/// Profile page: the owner's timeline or the user's own posts.
#[utoipa::path(
    get,
    path = "/!{name}",
    params(("name" = String, Path, description = "User handle"), ProfileParams),
    responses(
        (status = 200, description = "Home view, or nodata for unknown users", body = RenderedViewSchema)
    ),
    tags = ["pages"],
    operation_id = "profile"
)]
#[get("/!{name}")]
pub async fn profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<ProfileParams>,
) -> ApiResult<HttpResponse> {
    let auth = auth_session(&state, &session).await?;
    let query = ProfileQuery::from(query.into_inner());
    let outcome = state.router.profile(&auth, &path, &query).await?;
    respond(outcome, &session, state.renderer.as_ref())
}

/// Publish a post as the profile owner.
#[utoipa::path(
    post,
    path = "/!{name}",
    params(("name" = String, Path, description = "User handle")),
    request_body(content = PostRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect back to the profile"),
        (status = 200, description = "Nodata view for unknown users", body = RenderedViewSchema)
    ),
    tags = ["pages"],
    operation_id = "postMessage"
)]
#[post("/!{name}")]
pub async fn post_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    form: web::Form<PostRequest>,
) -> ApiResult<HttpResponse> {
    let auth = auth_session(&state, &session).await?;
    let form = PostForm::from(form.into_inner());
    let outcome = state.router.post_message(&auth, &path, &form).await?;
    respond(outcome, &session, state.renderer.as_ref())
}

/// Follow a user.
#[utoipa::path(
    method(get, post),
    path = "/!{name}/follow",
    params(("name" = String, Path, description = "User handle")),
    responses(
        (status = 303, description = "Redirect to the profile, or to sign-in when anonymous"),
        (status = 200, description = "Nodata view for unknown users", body = RenderedViewSchema)
    ),
    tags = ["pages"],
    operation_id = "follow"
)]
#[route("/!{name}/follow", method = "GET", method = "POST")]
pub async fn follow(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let auth = auth_session(&state, &session).await?;
    let outcome = state.router.follow(&auth, &path).await?;
    respond(outcome, &session, state.renderer.as_ref())
}

/// Stop following a user.
#[utoipa::path(
    method(get, post),
    path = "/!{name}/stopfollowing",
    params(("name" = String, Path, description = "User handle")),
    responses(
        (status = 303, description = "Redirect to the profile, or to sign-in when anonymous"),
        (status = 200, description = "Nodata view for unknown users", body = RenderedViewSchema)
    ),
    tags = ["pages"],
    operation_id = "stopFollowing"
)]
#[route("/!{name}/stopfollowing", method = "GET", method = "POST")]
pub async fn stop_following(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let auth = auth_session(&state, &session).await?;
    let outcome = state.router.stop_following(&auth, &path).await?;
    respond(outcome, &session, state.renderer.as_ref())
}

/// Every post mentioning a user, unpaginated.
#[utoipa::path(
    get,
    path = "/!{name}/mentions",
    params(("name" = String, Path, description = "User handle")),
    responses(
        (status = 200, description = "Mentions view, or nodata for unknown users", body = RenderedViewSchema)
    ),
    tags = ["pages"],
    operation_id = "mentions"
)]
#[get("/!{name}/mentions")]
pub async fn mentions(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let auth = auth_session(&state, &session).await?;
    let outcome = state.router.mentions(&auth, &path).await?;
    respond(outcome, &session, state.renderer.as_ref())
}

/// Global stream plus the newest accounts.
#[utoipa::path(
    get,
    path = "/timeline",
    params(TimelineParams),
    responses((status = 200, description = "Timeline view", body = RenderedViewSchema)),
    tags = ["pages"],
    operation_id = "timeline"
)]
#[get("/timeline")]
pub async fn timeline(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<TimelineParams>,
) -> ApiResult<HttpResponse> {
    let outcome = state
        .router
        .timeline(parse_page(query.page.as_deref()))
        .await?;
    respond(outcome, &session, state.renderer.as_ref())
}

/// Revoke the caller's token and drop the cookie.
#[utoipa::path(
    get,
    path = "/logout",
    responses((status = 303, description = "Redirect to the root")),
    tags = ["pages"],
    operation_id = "logout"
)]
#[get("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let auth = auth_session(&state, &session).await?;
    let outcome = state.router.logout(&auth).await?;
    respond(outcome, &session, state.renderer.as_ref())
}

/// Permalink for a single post.
#[utoipa::path(
    get,
    path = "/status",
    params(StatusParams),
    responses(
        (status = 200, description = "Status view, or nodata for unknown posts", body = RenderedViewSchema)
    ),
    tags = ["pages"],
    operation_id = "status"
)]
#[get("/status")]
pub async fn status(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<StatusParams>,
) -> ApiResult<HttpResponse> {
    let outcome = state.router.status(query.pid.as_deref()).await?;
    respond(outcome, &session, state.renderer.as_ref())
}
