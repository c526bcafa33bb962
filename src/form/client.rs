use async_trait::async_trait;

use crate::dispatcher::dispatch;
use crate::dispatcher::DeliveryMode;
use crate::dispatcher::Providers;
use crate::domain::SubscriptionRequest;
use crate::domain::SubscriptionResult;
use crate::providers::SubscribeError;

/// Whatever the form submits to. It always answers with a normalized result;
/// transport problems are folded in like any other failure.
#[async_trait]
pub trait SubscribeClient: Send + Sync {
    async fn subscribe(
        &self,
        request: &SubscriptionRequest,
    ) -> SubscriptionResult;
}

/// Talks to `POST /subscriptions` over HTTP, the way the page does
pub struct HttpSubscribeClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpSubscribeClient {
    pub fn new(
        http_client: reqwest::Client,
        base_url: String,
    ) -> Self {
        Self {
            http_client,
            base_url,
        }
    }
}

#[async_trait]
impl SubscribeClient for HttpSubscribeClient {
    #[tracing::instrument(
        name = "Submitting signup form",
        skip_all,
        fields(source = %request.source)
    )]
    async fn subscribe(
        &self,
        request: &SubscriptionRequest,
    ) -> SubscriptionResult {
        let response = match self
            .http_client
            .post(format!("{}/subscriptions", self.base_url))
            .form(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error.message = %e, "signup request never reached the server");
                return SubscriptionResult::failed(
                    SubscribeError::Connectivity(e.into()).to_string(),
                );
            }
        };

        // the body is a `SubscriptionResult` for every status we produce
        // ourselves; anything else (a proxy error page, an extractor
        // rejection) gets the generic text
        let status = response.status();
        match response.json::<SubscriptionResult>().await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(%status, error.message = %e, "unreadable signup response");
                SubscriptionResult::failed(SubscribeError::Unexpected(e.into()).to_string())
            }
        }
    }
}

/// Calls the dispatcher in-process, skipping HTTP entirely
pub struct DispatchClient<'a> {
    mode: DeliveryMode,
    providers: Providers<'a>,
}

impl<'a> DispatchClient<'a> {
    pub fn new(
        mode: DeliveryMode,
        providers: Providers<'a>,
    ) -> Self {
        Self { mode, providers }
    }
}

#[async_trait]
impl SubscribeClient for DispatchClient<'_> {
    async fn subscribe(
        &self,
        request: &SubscriptionRequest,
    ) -> SubscriptionResult {
        dispatch(self.mode, self.providers, request.clone()).await
    }
}
