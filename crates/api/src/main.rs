use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use hirecast_api::app::{AppServices, build_app};
use hirecast_api::config::AppConfig;
use hirecast_core::SystemClock;
use hirecast_infra::{
    ForecastRunner, HistoryOptions, HistoryProvider, InMemoryForecastSink, InMemoryHistoryProvider,
    PostgresHistoryProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hirecast_observability::init();

    let config = AppConfig::from_env()?;
    let options = HistoryOptions {
        lookback_years: config.lookback_years,
        ..HistoryOptions::default()
    };

    let provider: Arc<dyn HistoryProvider> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = PgPool::connect(url)
                .await
                .context("failed to connect to Postgres")?;
            tracing::info!("using postgres history provider");
            Arc::new(PostgresHistoryProvider::new(pool, options)?)
        }
        None => {
            let records = config.load_seed_records()?;
            tracing::warn!(
                records = records.len(),
                "DATABASE_URL not set; using in-memory history provider"
            );
            Arc::new(InMemoryHistoryProvider::with_records(records).with_options(options))
        }
    };

    let clock = Arc::new(SystemClock);
    let mut services = AppServices::new(provider.clone(), clock.clone());

    let runner = match config.refresh_interval {
        Some(interval) => {
            let sink = Arc::new(InMemoryForecastSink::new());
            let runner = ForecastRunner {
                interval,
                ..ForecastRunner::default()
            };
            let handle = runner
                .spawn("forecast-refresh", Arc::new(provider), clock, sink.clone())
                .context("failed to spawn forecast runner")?;
            services = services.with_forecast_cache(sink);
            Some(handle)
        }
        None => None,
    };

    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = runner {
        tokio::task::spawn_blocking(move || handle.shutdown()).await?;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
