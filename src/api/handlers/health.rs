/// Health check endpoint
///
/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = String)),
    security(())
)]
pub async fn health_check() -> &'static str {
    "OK"
}
