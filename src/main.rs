use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{prelude::*, EnvFilter};
use wiki_iiif::config::Config;
use wiki_iiif::manifest::ManifestService;
use wikimedia_client::title::FILE_NAMESPACE;
use wikimedia_client::WikimediaClient;

const USAGE: &str = "Usage: wiki_iiif <article slug | File:name> [...]";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    let targets: Vec<String> = std::env::args().skip(1).collect();
    if targets.is_empty() {
        anyhow::bail!(USAGE);
    }

    // Initialize variables
    let log_level = config.log_level();
    let log_dir = &config.logging.dir;

    // Create log directory if it doesn't exist
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir))?;

    // Setup file appender (daily rotation)
    let file_appender = tracing_appender::rolling::daily(log_dir, "wiki_iiif.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Use local time for log timestamps
    let local_timer = ChronoLocal::rfc_3339();

    // Console logs go to stderr; stdout carries the manifest JSON
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_file(true)
        .with_target(false)
        .with_timer(local_timer.clone())
        .with_writer(std::io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_timer(local_timer)
        .with_writer(non_blocking);

    let filter_layer = EnvFilter::from_default_env()
        .add_directive(log_level.into())
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    info!("Logs are written to: {}", log_dir);

    let client = WikimediaClient::new(config.wikimedia.to_client_config())?;
    let service = ManifestService::new(client, config.manifest.clone())?;
    info!("✅ Wikimedia client initialized");

    for target in &targets {
        let built = match target.strip_prefix(FILE_NAMESPACE) {
            Some(file_name) => service.build_file_manifest(file_name).await,
            None => service.build_article_manifest(target).await,
        };

        let manifest = match built {
            Ok(manifest) => manifest,
            Err(e) => {
                error!("Failed to build manifest for {}: {}", target, e);
                return Err(e).with_context(|| format!("Failed to build manifest for {}", target));
            }
        };

        println!("{}", serde_json::to_string_pretty(&manifest)?);
    }

    Ok(())
}
