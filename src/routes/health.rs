use axum::http::StatusCode;

/// Health check endpoint
///
/// Returns 200 OK once seeding has finished and the service is accepting
/// traffic. Suitable for container liveness probes.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "health"
)]
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
