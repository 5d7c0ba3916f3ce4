use clap::Parser;
use tracing::error;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use warera_battalions::{args::Args, commands};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level);

    if let Err(e) = commands::run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// Logs go through the indicatif writer so progress bars are redrawn below them.
fn init_tracing(level: &str) {
    let indicatif_layer = IndicatifLayer::new();
    let filter = EnvFilter::try_new(format!("{},sqlx=warn", level)).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(indicatif_layer.get_stderr_writer())
        )
        .with(indicatif_layer)
        .init();
}
