//! Turning route outcomes into HTTP responses.
//!
//! Views go through a [`ViewRenderer`] so templates can be swapped without
//! touching the handlers. Redirects are always `303 See Other`, which makes
//! browsers follow POST submissions with a GET.

use actix_web::HttpResponse;
use actix_web::http::header;
use serde::Serialize;

use crate::domain::{Attributes, Error, OutcomeTarget, RouteOutcome, ViewName};

use super::session::SessionContext;

/// Draws a named view with its attributes.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: ViewName, attributes: &Attributes) -> Result<HttpResponse, Error>;
}

/// Body written by [`JsonViewRenderer`].
#[derive(Debug, Serialize)]
pub struct RenderedView<'a> {
    pub view: ViewName,
    pub attributes: &'a Attributes,
}

/// Renders every view as `{"view": ..., "attributes": {...}}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonViewRenderer;

impl ViewRenderer for JsonViewRenderer {
    fn render(&self, view: ViewName, attributes: &Attributes) -> Result<HttpResponse, Error> {
        Ok(HttpResponse::Ok().json(RenderedView { view, attributes }))
    }
}

/// Apply the outcome's session directive, then render or redirect.
pub fn respond(
    outcome: RouteOutcome,
    session: &SessionContext,
    renderer: &dyn ViewRenderer,
) -> Result<HttpResponse, Error> {
    let (target, directive) = outcome.into_parts();
    session.apply(&directive)?;
    match target {
        OutcomeTarget::View { name, attributes } => renderer.render(name, &attributes),
        OutcomeTarget::Redirect { location } => Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, location))
            .finish()),
    }
}
