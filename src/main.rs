// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use axum::{http::StatusCode, routing::get, Router};
use clap::Parser;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Service;
use kube::{
    runtime::{controller::Action, watcher::Config, Controller},
    Api, Client, ResourceExt,
};
use linode_lb::{
    config::ControllerConfig,
    constants::{ERROR_REQUEUE_DURATION_SECS, METRICS_SERVER_PATH, TOKIO_WORKER_THREADS},
    context::Context,
    metrics,
    reconcilers::{reconcile_service, service::error_reason, service_operation, ServiceOperation},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    let config = ControllerConfig::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("linode-lb-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: ControllerConfig) -> Result<()> {
    // RUST_LOG selects the level (default info), RUST_LOG_FORMAT=json switches
    // to structured output.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!(
        region = %config.linode_region,
        api = %config.linode_url,
        cluster = %config.cluster_name,
        "Starting Linode NodeBalancer controller"
    );
    debug!(config = ?config, "Loaded configuration");

    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized");

    let shutdown = CancellationToken::new();
    let ctx = Arc::new(Context::new(client.clone(), &config, shutdown.clone()));

    tokio::spawn(cancel_on_signal(shutdown.clone()));

    tokio::select! {
        result = run_metrics_server(config.metrics_bind_address) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Metrics server exited unexpectedly without error")
        }
        result = run_service_controller(client, ctx, shutdown) => {
            info!("Service controller stopped");
            result
        }
    }
}

/// Cancel `shutdown` on SIGINT/SIGTERM.
async fn cancel_on_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM, only handling Ctrl-C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}

/// Serve Prometheus metrics on `addr`.
async fn run_metrics_server(addr: SocketAddr) -> Result<()> {
    let app = Router::new().route(METRICS_SERVER_PATH, get(metrics_handler));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, path = METRICS_SERVER_PATH, "Metrics server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics_handler() -> Result<String, (StatusCode, String)> {
    metrics::gather_metrics().map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Run the `Service` controller until `shutdown` fires.
async fn run_service_controller(
    client: Client,
    ctx: Arc<Context>,
    shutdown: CancellationToken,
) -> Result<()> {
    info!("Starting Service controller");

    let api = Api::<Service>::all(client);

    Controller::new(api, Config::default())
        .graceful_shutdown_on(async move { shutdown.cancelled().await })
        .run(reconcile_service_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `Service`
async fn reconcile_service_wrapper(
    service: Arc<Service>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let operation = service_operation(&service);
    let start = Instant::now();

    debug!(
        namespace = ?service.namespace(),
        name = %service.name_any(),
        operation = operation.as_str(),
        "Reconcile wrapper called for Service"
    );

    match reconcile_service(service.clone(), ctx).await {
        Ok(action) => {
            if operation != ServiceOperation::Ignore {
                metrics::record_reconciliation_success(operation.as_str(), start.elapsed());
                info!(
                    namespace = ?service.namespace(),
                    name = %service.name_any(),
                    operation = operation.as_str(),
                    "Successfully reconciled Service"
                );
            }
            Ok(action)
        }
        Err(e) => {
            metrics::record_reconciliation_error(operation.as_str(), start.elapsed());
            metrics::record_error(operation.as_str(), error_reason(&e));
            error!(
                namespace = ?service.namespace(),
                name = %service.name_any(),
                operation = operation.as_str(),
                "Failed to reconcile Service: {:#}",
                e
            );
            Err(e.into())
        }
    }
}

/// Error policy for the Service controller
fn error_policy(service: Arc<Service>, _err: &ReconcileError, _ctx: Arc<Context>) -> Action {
    metrics::record_reconciliation_requeue(service_operation(&service).as_str(), "error");
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}
