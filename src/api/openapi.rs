use super::handlers::{auth, header, health};
use utoipa::OpenApi;

/// OpenAPI document for every documented route.
///
/// `/` and `OPTIONS /health` are served but not documented.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::login::login,
        auth::password::reset_password,
        auth::session::session,
        auth::session::logout,
        header::header,
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Login, session and password reset"),
        (name = "navigation", description = "Site header state"),
    )
)]
pub struct ApiDoc;
