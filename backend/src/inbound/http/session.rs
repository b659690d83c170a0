//! Cookie session glue.
//!
//! The encrypted session cookie carries nothing but the auth token issued at
//! sign-up or sign-in. Identity is looked up from that token on every
//! request, so revoking the token server-side signs the cookie out.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{AuthGrant, AuthToken, Error, SessionDirective};

pub(crate) const AUTH_TOKEN_KEY: &str = "auth";

/// Thin wrapper over the actix session exposing token operations only.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Token stored in the cookie, if any.
    ///
    /// Values that fail to decode are treated as a signed-out cookie.
    pub fn auth_token(&self) -> Result<Option<AuthToken>, Error> {
        match self.0.get::<String>(AUTH_TOKEN_KEY) {
            Ok(raw) => Ok(raw.and_then(AuthToken::new)),
            Err(error) => {
                warn!(%error, "unreadable auth token in session cookie");
                Ok(None)
            }
        }
    }

    /// Store a freshly issued token, rotating the session key.
    pub fn persist(&self, grant: &AuthGrant) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(AUTH_TOKEN_KEY, grant.token().expose())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Carry out a route's cookie instruction.
    pub fn apply(&self, directive: &SessionDirective) -> Result<(), Error> {
        match directive {
            SessionDirective::Keep => Ok(()),
            SessionDirective::Establish(grant) => self.persist(grant),
            SessionDirective::Clear => {
                self.purge();
                Ok(())
            }
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};

    fn body_for(token: Option<AuthToken>) -> String {
        token.map_or_else(|| "anonymous".to_owned(), |t| t.expose().to_owned())
    }

    #[actix_web::test]
    async fn round_trips_auth_token() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        let token = AuthToken::new("tok-1").expect("token");
                        session.apply(&SessionDirective::Establish(AuthGrant::new(token)))?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        Ok::<_, Error>(HttpResponse::Ok().body(body_for(session.auth_token()?)))
                    }),
                ),
        )
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = session_cookie(&set_res).expect("session cookie set");

        let get_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/get")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body = test::read_body(get_res).await;
        assert_eq!(body, "tok-1");
    }

    #[actix_web::test]
    async fn tampered_value_reads_as_anonymous() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set-invalid",
                    web::get().to(|session: Session| async move {
                        session
                            .insert(AUTH_TOKEN_KEY, 42_u32)
                            .expect("set numeric token");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        Ok::<_, Error>(HttpResponse::Ok().body(body_for(session.auth_token()?)))
                    }),
                ),
        )
        .await;

        let set_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let cookie = session_cookie(&set_res).expect("session cookie set");
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/get")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body = test::read_body(res).await;
        assert_eq!(body, "anonymous");
    }
}
