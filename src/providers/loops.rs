use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde::Serialize;

use super::error::rejected;
use super::error::transport_error;
use super::SubscribeError;
use super::SubscriptionProvider;
use crate::domain::NewsletterSource;
use crate::domain::SubscriberEmail;

const PROVIDER: &str = "Loops";

/// Upserts a contact in Loops, keyed by email
pub struct LoopsClient {
    http_client: Client,
    base_url: String,
    // don't want this logged by accident
    api_key: Option<Secret<String>>,
}

impl LoopsClient {
    pub fn new(
        http_client: Client,
        base_url: String,
        api_key: Option<Secret<String>>,
    ) -> Self {
        Self {
            http_client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl SubscriptionProvider for LoopsClient {
    fn name(&self) -> &'static str { PROVIDER }

    #[tracing::instrument(
        name = "Upserting subscriber in Loops",
        skip_all,
        fields(source = %source)
    )]
    async fn subscribe(
        &self,
        email: &SubscriberEmail,
        source: NewsletterSource,
    ) -> Result<(), SubscribeError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            tracing::error!("LOOPS_API_KEY is not configured");
            SubscribeError::Misconfigured(anyhow::anyhow!("LOOPS_API_KEY is not configured"))
        })?;

        let url = format!("{}/contacts/update", self.base_url);
        let request_body = UpdateContactRequest {
            email: email.as_ref(),
            subscribed: true,
            source: source.as_str(),
        };

        let response = self
            .http_client
            .put(&url)
            .bearer_auth(api_key.expose_secret())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(rejected(PROVIDER, response).await);
        }

        let body: UpdateContactResponse = response
            .json()
            .await
            .context("could not read Loops response")
            .map_err(SubscribeError::UnexpectedResponse)?;

        match body.success {
            true => Ok(()),
            false => {
                tracing::error!(message = ?body.message, "Loops did not acknowledge the update");
                Err(SubscribeError::UnexpectedResponse(anyhow::anyhow!(
                    "Loops answered success=false: {:?}",
                    body.message
                )))
            }
        }
    }
}

#[derive(Serialize)]
struct UpdateContactRequest<'a> {
    email: &'a str,
    subscribed: bool,
    source: &'a str,
}

#[derive(Deserialize)]
struct UpdateContactResponse {
    #[serde(default)]
    success: bool,
    message: Option<String>,
}
