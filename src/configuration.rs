use std::collections::HashMap;
use std::env;
use std::env::current_dir;
use std::fmt::Display;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::dispatcher::DeliveryMode;
use crate::dispatcher::ProviderKind;
use crate::providers::GoogleSheetsClient;
use crate::providers::LoopsClient;
use crate::providers::ServiceAccount;

pub const DEFAULT_SHEET_NAME: &str = "Subscribers";

/// Global configuration, loaded from `configuration/*.yaml`. See
/// `get_configuration`.
///
/// Note that provider credentials are -not- part of this; they are read per
/// request, see `ProviderConfig`.
#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub providers: ProviderEndpoints,
}

/// Server configuration
#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    /// Should be localhost on dev machine, 0.0.0.0 on prod
    pub host: String,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

/// Where the providers live. Only ever changed to point at a mock server.
#[derive(Deserialize, Clone)]
pub struct ProviderEndpoints {
    pub google_sheets_api_base_url: String,
    pub google_token_uri: String,
    pub loops_base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl ProviderEndpoints {
    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_milliseconds) }

    /// One `Client` (and thus one connection pool) shared by every adapter
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder().timeout(self.timeout()).build()
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!("Invalid: {e}")),
        }
    }
}

/// Load yaml configuration files at `<project_root>/configuration`, then
/// apply `APP_` env overrides (`APP_APPLICATION__PORT=5001` ->
/// `Settings.application.port`).
///
/// All fields must be present, otherwise initialisation fails immediately and
/// the server does not start.
pub fn get_configuration() -> Result<Settings, anyhow::Error> {
    let cfg_dir = current_dir()?.join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or("local".to_string())
        .try_into()
        .map_err(|e: String| anyhow::anyhow!("could not parse APP_ENVIRONMENT: {e}"))?;

    let settings = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are -always- strings; `serde-aux` parses the numeric ones
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<Settings>()?)
}

/// Where per-request provider configuration comes from. In production this
/// is the live process environment; tests hand in a fixed map so that
/// concurrently running apps don't trample each other's env vars.
#[derive(Clone, Debug, Default)]
pub enum ProviderEnv {
    #[default]
    Process,
    Fixed(HashMap<String, String>),
}

impl ProviderEnv {
    /// Read the provider configuration afresh. Called once per subscription
    /// attempt; nothing is cached between requests.
    pub fn resolve(&self) -> Result<ProviderConfig, ConfigError> {
        let source = match self {
            Self::Process => config::Environment::default(),
            Self::Fixed(vars) => config::Environment::default().source(Some(vars.clone())),
        };
        Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize::<ProviderConfig>()
    }
}

/// Provider credentials and switches, straight from the environment. All
/// fields are optional: a missing value only matters if the request actually
/// needs it, and then it is reported as a configuration error rather than a
/// crash.
///
/// Keys are the env var names, lowercased by `config`.
#[derive(Deserialize)]
pub struct ProviderConfig {
    google_sheets_client_email: Option<String>,
    google_sheets_private_key: Option<Secret<String>>,
    google_spreadsheet_id: Option<String>,
    google_sheet_name: Option<String>,
    loops_api_key: Option<Secret<String>>,
    use_loops: Option<String>,
    newsletter_dual_write: Option<String>,
}

// an empty env var is as good as an unset one
fn present(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

fn present_secret(value: &Option<Secret<String>>) -> Option<Secret<String>> {
    value
        .as_ref()
        .filter(|v| !v.expose_secret().is_empty())
        .cloned()
}

// only the literal "true" switches anything on
fn flag(value: &Option<String>) -> bool { value.as_deref() == Some("true") }

impl ProviderConfig {
    pub fn delivery_mode(&self) -> DeliveryMode {
        if flag(&self.newsletter_dual_write) {
            DeliveryMode::DualWrite {
                mirror: present_secret(&self.loops_api_key).is_some(),
            }
        } else if flag(&self.use_loops) {
            DeliveryMode::Single(ProviderKind::Loops)
        } else {
            DeliveryMode::Single(ProviderKind::GoogleSheets)
        }
    }

    pub fn sheet_name(&self) -> String {
        present(&self.google_sheet_name).unwrap_or(DEFAULT_SHEET_NAME.to_string())
    }

    pub fn service_account(&self) -> Option<ServiceAccount> {
        Some(ServiceAccount::new(
            present(&self.google_sheets_client_email)?,
            present_secret(&self.google_sheets_private_key)?,
        ))
    }

    pub fn google_sheets_client(
        &self,
        http_client: reqwest::Client,
        endpoints: &ProviderEndpoints,
    ) -> GoogleSheetsClient {
        GoogleSheetsClient::new(
            http_client,
            endpoints.google_sheets_api_base_url.clone(),
            endpoints.google_token_uri.clone(),
            present(&self.google_spreadsheet_id),
            self.sheet_name(),
            self.service_account(),
        )
    }

    pub fn loops_client(
        &self,
        http_client: reqwest::Client,
        endpoints: &ProviderEndpoints,
    ) -> LoopsClient {
        LoopsClient::new(
            http_client,
            endpoints.loops_base_url.clone(),
            present_secret(&self.loops_api_key),
        )
    }
}
