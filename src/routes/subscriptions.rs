use actix_web::web;
use actix_web::HttpResponse;
use anyhow::Context;

use crate::configuration::ProviderEndpoints;
use crate::configuration::ProviderEnv;
use crate::dispatcher::try_dispatch;
use crate::dispatcher::Providers;
use crate::domain::SubscriptionRequest;
use crate::domain::SubscriptionResult;
use crate::providers::SubscribeError;

/// `POST /subscriptions`. Writes the email to the configured provider(s).
///
/// # Request example
///
/// ```sh
///     curl --data 'email=john@foo.com&source=Hero' http://127.0.0.1:8000/subscriptions
/// ```
///
/// # Response
///
/// Always a JSON `SubscriptionResult`, whatever the status code, so the form
/// can show `message`/`error` verbatim. A body that cannot be deserialized at
/// all (missing field, unknown `source`) is rejected by the `Form` extractor
/// with a 400 before we ever get here.
///
/// Provider configuration is read from the environment on every call, so
/// flipping `USE_LOOPS` or `NEWSLETTER_DUAL_WRITE` takes effect without a
/// restart.
#[tracing::instrument(
    name = "Adding new subscriber",
    skip(form, http_client, endpoints, provider_env),
    fields(
        subscriber_email = %form.email,
        source = %form.source,
    )
)]
pub async fn subscribe(
    form: web::Form<SubscriptionRequest>,
    // all subsequent args are inherited via App.app_data; thus arg types must be unique
    http_client: web::Data<reqwest::Client>,
    endpoints: web::Data<ProviderEndpoints>,
    provider_env: web::Data<ProviderEnv>,
) -> Result<HttpResponse, SubscribeError> {
    let cfg = provider_env
        .resolve()
        .context("could not read provider configuration")
        .map_err(SubscribeError::Misconfigured)?;

    let google_sheets = cfg.google_sheets_client(http_client.get_ref().clone(), &endpoints);
    let loops = cfg.loops_client(http_client.get_ref().clone(), &endpoints);
    let providers = Providers {
        google_sheets: &google_sheets,
        loops: &loops,
    };

    try_dispatch(cfg.delivery_mode(), providers, form.0)
        .await
        .map_err(|e| {
            // a typo in the form is not worth an error log
            if !matches!(e, SubscribeError::InvalidEmail) {
                tracing::error!(error.cause_chain = ?e, error.message = %e, "subscription failed");
            }
            e
        })?;

    Ok(HttpResponse::Ok().json(SubscriptionResult::subscribed()))
}
