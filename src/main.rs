use std::{process, sync::Arc};

use setaccio::{
    application::{error::AppError, responses::ResponseService},
    cache::{CacheConfig, ResponseStore},
    config,
    infra::{
        error::InfraError,
        http::{self, AppState},
        telemetry,
        upstream::{FilloutClient, SubmissionsApi},
    },
};
use tracing::{Dispatch, Level, debug, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    run_serve(settings).await
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let upstream: Arc<dyn SubmissionsApi> = Arc::new(
        FilloutClient::new(&settings.upstream)
            .map_err(|err| AppError::from(InfraError::configuration(err.to_string())))?,
    );

    let cache_config = CacheConfig::from(&settings.cache);
    let store = cache_config
        .enabled
        .then(|| Arc::new(ResponseStore::new(&cache_config)));

    let state = AppState {
        responses: Arc::new(ResponseService::new(upstream, store.clone())),
    };

    // Spawn the periodic eviction sweep; it runs independent of request
    // traffic so idle keys do not outlive their TTL in memory.
    let sweep_handle = store.map(|store| {
        let interval = cache_config.sweep_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // Skip the first immediate tick
            loop {
                ticker.tick().await;
                let removed = store.sweep();
                if removed > 0 {
                    debug!(removed, "cache sweep evicted expired entries");
                }
            }
        })
    });

    let result = serve_http(&settings, state).await;

    if let Some(handle) = sweep_handle {
        handle.abort();
        let _ = handle.await;
    }

    result
}

async fn serve_http(settings: &config::Settings, state: AppState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(addr = %settings.server.addr, "listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
}
