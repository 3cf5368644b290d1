use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::Parser;
use tracing::{error, info};

mod api;
mod cli;
mod config;
mod logging;
mod upstream;

use crate::api::{health::health_config, job::handlers::job_config, job::JobService, validation};
use crate::upstream::UpstreamClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = cli::Cli::parse();

    // Load configuration from environment
    let config = config::Config::from_env().map_err(std::io::Error::other)?;

    logging::init(&config.log_dir)?;

    let client = match UpstreamClient::new(config.upstream()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Invalid upstream configuration: {}", e);
            return Err(std::io::Error::other(e));
        }
    };

    info!("Starting job-gateway application");
    info!("Configuration loaded successfully:");
    info!("  - Upstream url: {}", config.upstream_url);
    info!("  - Upstream timeout: {:?}", config.upstream_timeout);
    info!("  - Max payload size: {} bytes", config.max_payload_size);
    info!("  - Job defaults: {:?}", config.job_defaults);

    let job_service = web::Data::new(JobService::new(
        Arc::clone(&client),
        config.job_defaults.clone(),
    ));
    let client = web::Data::from(client);
    let max_payload_size = config.max_payload_size;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(client.clone()) // Shared upstream client (readiness probe)
            .app_data(job_service.clone())
            .app_data(web::PayloadConfig::default().limit(max_payload_size))
            .app_data(validation::json_config().limit(max_payload_size))
            .configure(health_config)
            .configure(job_config::<UpstreamClient>)
    });

    info!("Server starting on http://{}:{}", cli.host, cli.port);

    server.bind((cli.host.as_str(), cli.port))?.run().await
}
