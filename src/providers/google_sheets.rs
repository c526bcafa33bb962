use anyhow::Context;
use async_trait::async_trait;
use chrono::SecondsFormat;
use chrono::Utc;
use jsonwebtoken::Algorithm;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::Url;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde::Serialize;

use super::error::rejected;
use super::error::transport_error;
use super::SubscribeError;
use super::SubscriptionProvider;
use super::SUBSCRIBED;
use crate::domain::NewsletterSource;
use crate::domain::SubscriberEmail;

const PROVIDER: &str = "Google Sheets";
const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime of the signed assertion; Google caps this at one hour
const ASSERTION_TTL_SECONDS: i64 = 3600;

/// Service account credentials, as found in the downloaded key file. `Debug`
/// is safe: `Secret` redacts the key.
#[derive(Clone, Debug)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: Secret<String>,
}

impl ServiceAccount {
    pub fn new(
        client_email: String,
        private_key: Secret<String>,
    ) -> Self {
        Self {
            client_email,
            private_key,
        }
    }

    fn encoding_key(&self) -> Result<EncodingKey, SubscribeError> {
        let pem = normalize_private_key(self.private_key.expose_secret());
        EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
            // never log the key itself, only enough to tell what shape it is in
            tracing::error!(
                has_begin_marker = pem.contains("BEGIN PRIVATE KEY"),
                has_end_marker = pem.contains("END PRIVATE KEY"),
                has_newlines = pem.contains('\n'),
                key_length = pem.len(),
                "could not parse service account private key"
            );
            SubscribeError::Misconfigured(
                anyhow::Error::new(e).context("invalid service account private key"),
            )
        })
    }
}

/// Undo what hosting dashboards tend to do to a pasted PEM key: surrounding
/// quotes are kept, and newlines are stored as a literal `\n`.
pub fn normalize_private_key(raw: &str) -> String {
    let is_quote = |c: char| c == '"' || c == '\'';
    let unquoted = raw.strip_prefix(is_quote).unwrap_or(raw);
    let unquoted = unquoted.strip_suffix(is_quote).unwrap_or(unquoted);
    unquoted.replace("\\n", "\n")
}

/// Appends one row per signup to a sheet, authenticating as a service
/// account. A fresh access token is requested on every call.
pub struct GoogleSheetsClient {
    http_client: Client,
    api_base_url: String,
    token_uri: String,
    spreadsheet_id: Option<String>,
    sheet_name: String,
    credentials: Option<ServiceAccount>,
}

impl GoogleSheetsClient {
    /// `http_client` is cheap to clone (it is an `Arc` internally), so the
    /// connection pool is shared with every other client built from it.
    pub fn new(
        http_client: Client,
        api_base_url: String,
        token_uri: String,
        spreadsheet_id: Option<String>,
        sheet_name: String,
        credentials: Option<ServiceAccount>,
    ) -> Self {
        Self {
            http_client,
            api_base_url,
            token_uri,
            spreadsheet_id,
            sheet_name,
            credentials,
        }
    }

    /// `{base}/v4/spreadsheets/{id}/values/{sheet}!A:D:append`; the sheet name
    /// may contain spaces, so it goes through `Url`'s segment encoding
    fn append_url(
        &self,
        spreadsheet_id: &str,
    ) -> Result<Url, SubscribeError> {
        let range = format!("{}!A:D:append", self.sheet_name);
        let mut url = Url::parse(&self.api_base_url)
            .context("invalid Google Sheets base url")
            .map_err(SubscribeError::Misconfigured)?;
        url.path_segments_mut()
            .map_err(|_| {
                SubscribeError::Misconfigured(anyhow::anyhow!(
                    "Google Sheets base url cannot have a path"
                ))
            })?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                spreadsheet_id,
                "values",
                range.as_str(),
            ]);
        Ok(url)
    }

    #[tracing::instrument(name = "Requesting Google access token", skip_all)]
    async fn access_token(
        &self,
        credentials: &ServiceAccount,
    ) -> Result<Secret<String>, SubscribeError> {
        let key = credentials.encoding_key()?;

        let iat = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &credentials.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_TTL_SECONDS,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .context("could not sign service account assertion")
            .map_err(SubscribeError::Misconfigured)?;

        let response = self
            .http_client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(rejected(PROVIDER, response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("could not read access token response")?;
        Ok(Secret::new(token.access_token))
    }
}

#[async_trait]
impl SubscriptionProvider for GoogleSheetsClient {
    fn name(&self) -> &'static str { PROVIDER }

    #[tracing::instrument(
        name = "Appending subscriber to Google Sheets",
        skip_all,
        fields(sheet = %self.sheet_name, source = %source)
    )]
    async fn subscribe(
        &self,
        email: &SubscriberEmail,
        source: NewsletterSource,
    ) -> Result<(), SubscribeError> {
        let spreadsheet_id = self.spreadsheet_id.as_deref().ok_or_else(|| {
            tracing::error!("GOOGLE_SPREADSHEET_ID is not configured");
            SubscribeError::Misconfigured(anyhow::anyhow!(
                "GOOGLE_SPREADSHEET_ID is not configured"
            ))
        })?;
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            SubscribeError::Misconfigured(anyhow::anyhow!(
                "Google Sheets credentials not configured"
            ))
        })?;

        let token = self.access_token(credentials).await?;

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let request_body = AppendRequest {
            values: [[timestamp.as_str(), email.as_ref(), source.as_str(), SUBSCRIBED]],
        };

        let response = self
            .http_client
            .post(self.append_url(spreadsheet_id)?)
            // let the sheet coerce the timestamp into a date cell
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(token.expose_secret())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejected(PROVIDER, response).await);
        }

        let body: AppendResponse = response
            .json()
            .await
            .context("could not read append response")
            .map_err(SubscribeError::UnexpectedResponse)?;

        match body.updates.and_then(|u| u.updated_rows) {
            Some(rows) if status == StatusCode::OK && rows > 0 => Ok(()),
            rows => {
                tracing::error!(%status, ?rows, "unexpected Google Sheets response");
                Err(SubscribeError::UnexpectedResponse(anyhow::anyhow!(
                    "append acknowledged with status {status} and updatedRows {rows:?}"
                )))
            }
        }
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Columns A-D: timestamp, email, source, status
#[derive(Serialize)]
struct AppendRequest<'a> {
    values: [[&'a str; 4]; 1],
}

#[derive(Deserialize)]
struct AppendResponse {
    updates: Option<AppendUpdates>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_rows: Option<u64>,
}
