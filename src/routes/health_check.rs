use actix_web::HttpResponse;

/// Liveness probe, answers with an empty 200 once the server accepts requests.
#[tracing::instrument(name = "Health Check handler")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
