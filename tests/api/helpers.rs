use std::collections::HashMap;

use chemango_newsletter::configuration::get_configuration;
use chemango_newsletter::configuration::ProviderEnv;
use chemango_newsletter::startup::Application;
use chemango_newsletter::telemetry::get_subscriber;
use chemango_newsletter::telemetry::init_subscriber;
use once_cell::sync::Lazy;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

pub const SPREADSHEET_ID: &str = "sheet-123";
pub const APPEND_PATH: &str = "/v4/spreadsheets/sheet-123/values/Subscribers!A:D:append";
pub const LOOPS_API_KEY: &str = "loops-test-key";

/// Verbose logs are opt-in:
///
/// ```sh
///      TEST_LOG=true cargo test [test_name] | bunyan
/// ```
static TRACING: Lazy<()> = Lazy::new(|| {
    // the two sinks are different types, hence two arms
    match std::env::var("TEST_LOG") {
        Ok(_) => init_subscriber(get_subscriber("test", "debug", std::io::stdout)).unwrap(),
        Err(_) => init_subscriber(get_subscriber("test", "debug", std::io::sink)).unwrap(),
    };
});

pub struct TestApp {
    pub addr: String,
    /// Serves both the OAuth token endpoint (`/token`) and the Sheets API
    pub google_server: MockServer,
    pub loops_server: MockServer,
}

impl TestApp {
    pub async fn post_subscriptions(
        &self,
        body: String,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/subscriptions", self.addr))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .expect("execute request")
    }

    /// Accept any token request and hand out a fixed bearer token
    pub async fn mount_token(&self) {
        Mock::given(path("/token"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.test-token",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .mount(&self.google_server)
            .await;
    }

    /// Every request that reached the Sheets append endpoint, as JSON
    pub async fn appended_rows(&self) -> Vec<serde_json::Value> {
        self.google_server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.url.path() == APPEND_PATH)
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }
}

/// Env vars for a fully configured Google Sheets provider. The private key
/// is stored the way hosting dashboards usually keep it: on one line, with
/// literal `\n`s.
pub fn sheets_env() -> Vec<(&'static str, String)> {
    vec![
        (
            "GOOGLE_SHEETS_CLIENT_EMAIL",
            "signup@chemango.iam.gserviceaccount.com".to_string(),
        ),
        (
            "GOOGLE_SHEETS_PRIVATE_KEY",
            include_str!("../fixtures/service_account.pem").replace('\n', "\\n"),
        ),
        ("GOOGLE_SPREADSHEET_ID", SPREADSHEET_ID.to_string()),
    ]
}

/// Spawn the app on a random port, with both providers pointed at fresh mock
/// servers. `vars` stands in for the process environment.
pub async fn spawn_app(vars: &[(&str, String)]) -> TestApp {
    Lazy::force(&TRACING);

    let google_server = MockServer::start().await;
    let loops_server = MockServer::start().await;

    let cfg = {
        let mut cfg = get_configuration().unwrap();
        // the OS picks a free port
        cfg.application.port = 0;
        cfg.providers.google_sheets_api_base_url = google_server.uri();
        cfg.providers.google_token_uri = format!("{}/token", google_server.uri());
        cfg.providers.loops_base_url = loops_server.uri();
        cfg
    };

    let provider_env = ProviderEnv::Fixed(
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<HashMap<_, _>>(),
    );

    let app = Application::build(cfg, provider_env).await.unwrap();
    let addr = format!("http://127.0.0.1:{}", app.get_port());
    tokio::spawn(app.run_until_stopped());

    TestApp {
        addr,
        google_server,
        loops_server,
    }
}
