use chemango_newsletter::configuration::get_configuration;
use chemango_newsletter::configuration::ProviderEnv;
use chemango_newsletter::startup::Application;
use chemango_newsletter::telemetry::get_subscriber;
use chemango_newsletter::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the server
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // only logs at the specified level and higher are emitted; override with
    // RUST_LOG
    let subscriber = get_subscriber("chemango-newsletter", "info", std::io::stdout);
    init_subscriber(subscriber)?;

    let cfg = get_configuration()?;
    tracing::info!(
        host = %cfg.application.host,
        port = cfg.application.port,
        "starting newsletter signup server"
    );

    // provider credentials and switches stay in the process environment and
    // are re-read on every request
    let app = Application::build(cfg, ProviderEnv::Process).await?;
    app.run_until_stopped().await?;

    Ok(())
}
