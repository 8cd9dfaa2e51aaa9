use anyhow::Context;
use eframe::CreationContext;
use multi_file_uploader::app::FileUploaderApp;
use multi_file_uploader::config::{Config, LogFormat};
use multi_file_uploader::upload::FileProcessor;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(format: LogFormat) {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_target(true))
                .init();
        }
        LogFormat::Plain => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_tracing(config.log_format);
    info!(version = env!("CARGO_PKG_VERSION"), endpoint = %config.endpoint, "file uploader starting");

    let runtime = Runtime::new().context("failed to start tokio runtime")?;
    let processor = FileProcessor::from_config(&config).context("failed to build HTTP client")?;
    let endpoint_label = processor.endpoint().to_string();
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([600.0, 600.0])
            .with_min_inner_size([400.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "File Uploader",
        options,
        Box::new(move |cc: &CreationContext| {
            Box::new(FileUploaderApp::new(
                cc,
                Arc::new(processor),
                endpoint_label,
                handle,
            ))
        }),
    )
    .map_err(|e| anyhow::anyhow!("failed to run window: {e}"))?;

    info!("file uploader closed");
    Ok(())
}
