use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cleanup_games::api::{self, cleanup, AppState};
use cleanup_games::cli::{Cli, Commands};
use cleanup_games::config::{self, Config, LogFormat};
use cleanup_games::supabase::EnvCredentials;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let cfg = config::load()?;
    init_tracing(cfg.log_format)?;

    match args.command {
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(Commands::Invoke) => invoke_once(cfg).await,
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    }
}

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::{trace as sdktrace, Resource};

    // OTLP export only when a collector is configured
    let telemetry_layer = if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(opentelemetry_otlp::new_exporter().tonic())
            .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                KeyValue::new("service.name", "cleanup-games"),
            ])))
            .install_batch(opentelemetry_sdk::runtime::Tokio)?;
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    // stdout is reserved for the `invoke` envelope
    let (text_layer, json_layer) = match format {
        LogFormat::Text => (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "cleanup_games=info,tower_http=info".into()),
        ))
        .with(text_layer)
        .with(json_layer)
        .with(telemetry_layer)
        .init();

    Ok(())
}

async fn run_server(cfg: Config, port: u16) -> anyhow::Result<()> {
    tracing::info!(procedure = %cfg.procedure, "initializing cleanup endpoint");
    let state = Arc::new(AppState::new(
        cfg.procedure,
        Arc::new(EnvCredentials::default()),
    )?);

    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("cleanup endpoint listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn invoke_once(cfg: Config) -> anyhow::Result<()> {
    let state = AppState::new(cfg.procedure, Arc::new(EnvCredentials::default()))?;
    cleanup::invoke(&state, &mut std::io::stdout()).await
}
