use std::fmt::Debug;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use actix_web::ResponseError;

use crate::domain::SubscriptionResult;
use crate::utils::error_chain_fmt;

/// Every way a signup can fail. `Display` is the (Spanish) text shown to the
/// visitor; the `anyhow` source carries whatever the provider actually said,
/// and only ever ends up in logs.
#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("Por favor ingresa un email válido")]
    InvalidEmail,
    #[error("El servicio de suscripción no está configurado correctamente")]
    Misconfigured(#[source] anyhow::Error),
    #[error("Error de permisos en el servicio. Por favor contacta al administrador.")]
    PermissionDenied(#[source] anyhow::Error),
    // same text as `Misconfigured`: a missing sheet is a setup problem as far
    // as the visitor is concerned
    #[error("El servicio de suscripción no está configurado correctamente")]
    NotFound(#[source] anyhow::Error),
    #[error("Demasiados intentos. Por favor espera un momento e intenta nuevamente.")]
    RateLimited(#[source] anyhow::Error),
    #[error("Error de conexión. Por favor verifica tu internet e intenta nuevamente.")]
    Connectivity(#[source] anyhow::Error),
    /// The provider answered 2xx, but not with anything we recognise as an
    /// acknowledged write
    #[error("Hubo un problema al procesar tu suscripción. Por favor intenta nuevamente.")]
    UnexpectedResponse(#[source] anyhow::Error),
    #[error("Hubo un error inesperado. Por favor intenta nuevamente más tarde.")]
    Unexpected(#[from] anyhow::Error),
}

impl Debug for SubscribeError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidEmail => StatusCode::BAD_REQUEST,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Misconfigured(_) | Self::PermissionDenied(_) | Self::NotFound(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Connectivity(_) => StatusCode::BAD_GATEWAY,
            Self::UnexpectedResponse(_) | Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // the body is the same normalized result a successful call gets, so the
    // form never has to parse two shapes
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code()).json(SubscriptionResult::failed(self.to_string()))
    }
}

impl From<Result<(), SubscribeError>> for SubscriptionResult {
    fn from(outcome: Result<(), SubscribeError>) -> Self {
        match outcome {
            Ok(()) => SubscriptionResult::subscribed(),
            Err(e) => SubscriptionResult::failed(e.to_string()),
        }
    }
}

/// Map a provider's failure description onto the error taxonomy.
///
/// Substrings are checked first, in this order, because that is what the
/// providers' client libraries have always been matched against. The HTTP
/// status, if there is one, is only consulted when no substring matched.
pub fn classify(
    description: &str,
    status: Option<u16>,
    cause: anyhow::Error,
) -> SubscribeError {
    let has = |needle: &str| description.contains(needle);

    if has("credentials not configured") {
        SubscribeError::Misconfigured(cause)
    } else if has("PERMISSION_DENIED") {
        SubscribeError::PermissionDenied(cause)
    } else if has("NOT_FOUND") {
        SubscribeError::NotFound(cause)
    } else if has("RATE_LIMIT_EXCEEDED") || has("quota") || has("rate limit") {
        SubscribeError::RateLimited(cause)
    } else if has("network") || has("ENOTFOUND") || has("fetch") {
        SubscribeError::Connectivity(cause)
    } else {
        match status {
            Some(401) | Some(403) => SubscribeError::PermissionDenied(cause),
            Some(404) => SubscribeError::NotFound(cause),
            Some(429) => SubscribeError::RateLimited(cause),
            _ => SubscribeError::Unexpected(cause),
        }
    }
}

/// A request that never produced a usable response
pub(crate) fn transport_error(
    provider: &str,
    e: reqwest::Error,
) -> SubscribeError {
    if e.is_connect() || e.is_timeout() {
        return SubscribeError::Connectivity(
            anyhow::Error::new(e).context(format!("{provider} is unreachable")),
        );
    }
    let description = e.to_string();
    let status = e.status().map(|s| s.as_u16());
    classify(
        &description,
        status,
        anyhow::Error::new(e).context(format!("{provider} request failed")),
    )
}

/// A response with a non-success status. The body is read so that the
/// provider's own error code (e.g. `PERMISSION_DENIED`) can be matched.
pub(crate) async fn rejected(
    provider: &str,
    response: reqwest::Response,
) -> SubscribeError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let description = format!("{status} {body}");
    classify(
        &description,
        Some(status.as_u16()),
        anyhow::anyhow!("{provider} rejected the request: {description}"),
    )
}
