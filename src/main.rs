use clap::Parser;
use tracing::error;
use wallhub::config::{AppConfig, http_client_builder, setup_logging};

#[tokio::main]
async fn main() {
    // a missing .env is fine, everything can come from the real environment
    dotenvy::dotenv().ok();
    let cli = wallhub::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let config = AppConfig::from_cli(&cli);
    let client = match http_client_builder().build() {
        Ok(client) => client,
        Err(err) => {
            error!("Failed to build HTTP client: {}", err);
            return;
        }
    };

    if let Err(err) = wallhub::web::setup_server(
        &cli.listen_address,
        cli.port,
        &cli.static_dir,
        cli.cors,
        wallhub::web::AppState::new(config, client),
    )
    .await
    {
        error!("Application error: {}", err);
    }
}
