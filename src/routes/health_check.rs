use actix_web::HttpResponse;

/// `GET /health_check`
///
/// Touches neither provider; it only says the server is accepting requests.
pub async fn health_check() -> HttpResponse { HttpResponse::Ok().finish() }
