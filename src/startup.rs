use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::web;
use actix_web::App;
use actix_web::HttpServer;
use tracing_actix_web::TracingLogger;

use crate::configuration::ProviderEndpoints;
use crate::configuration::ProviderEnv;
use crate::configuration::Settings;
use crate::routes::health_check;
use crate::routes::subscribe;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Bind the listener and build the `Server`. Provider credentials are
    /// -not- checked here; they are read per request from `provider_env`.
    pub async fn build(
        cfg: Settings,
        provider_env: ProviderEnv,
    ) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;

        // with port 0, the OS picks a free port; remember which
        let port = listener.local_addr()?.port();

        let server = run(listener, cfg.providers, provider_env)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all API endpoints.
pub fn run(
    listener: TcpListener,
    endpoints: ProviderEndpoints,
    provider_env: ProviderEnv,
) -> Result<Server, anyhow::Error> {
    // establishing a HTTP connection is expensive, so one `Client` (and its
    // connection pool) is built here and shared by every adapter on every
    // worker
    let http_client = web::Data::new(endpoints.http_client()?);
    let endpoints = web::Data::new(endpoints);
    let provider_env = web::Data::new(provider_env);

    // the closure runs once per worker; everything it captures must be
    // cloneable, hence `Data` (an `Arc`)
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/subscriptions", web::post().to(subscribe))
            .app_data(http_client.clone())
            .app_data(endpoints.clone())
            .app_data(provider_env.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
