//! OpenAPI schema definitions for response bodies that borrow their data.
//!
//! [`crate::inbound::http::render::RenderedView`] holds a reference to the
//! attribute map, which utoipa cannot describe directly. The wrapper here
//! mirrors its shape for documentation only.

use utoipa::ToSchema;

use crate::domain::ViewName;

/// OpenAPI schema for [`crate::inbound::http::render::RenderedView`].
///
/// Body produced by the JSON renderer for every view.
#[derive(ToSchema)]
#[schema(as = RenderedView)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RenderedViewSchema {
    /// Template name.
    #[schema(example = "home")]
    view: ViewName,
    /// Values bound to the template. Absent keys are omitted, never null.
    #[schema(value_type = Object)]
    attributes: serde_json::Value,
}
