// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP server
//!
//! Serves the dashboard API until Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use aagate_core::domain::gateway_config::GatewayConfigManifest;
use aagate_core::presentation::api;

use crate::embedded;

pub async fn run(
    config: GatewayConfigManifest,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    config
        .validate_settings()
        .context("Configuration validation failed")?;
    if let Err(e) = config.validate_advisory_alias() {
        warn!("{:#}; advisory endpoints will answer 503", e);
    }

    let host = host.unwrap_or_else(|| config.spec.api.bind_address.clone());
    let port = port.unwrap_or(config.spec.api.port);

    if config.spec.observability.metrics.enabled {
        install_metrics_exporter(&host, config.spec.observability.metrics.port)?;
    }

    let catalog = embedded::catalog_service(&config)?;
    let advisories = embedded::optional_advisory_gateway(&config);
    let app = api::app(catalog, advisories);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("AAGATE gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("AAGATE gateway stopped");
    Ok(())
}

fn install_metrics_exporter(host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid metrics address {}:{}", host, port))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;

    info!("Prometheus metrics exposed on {}", addr);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
