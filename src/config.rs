// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Controller configuration from command-line flags and environment variables.

use crate::constants::{
    DEFAULT_CLUSTER_NAME, DEFAULT_LINODE_URL, DEFAULT_REQUEUE_SECS, METRICS_SERVER_BIND_ADDRESS,
};
use clap::Parser;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Runtime configuration of the `NodeBalancer` controller.
#[derive(Parser, Clone)]
#[command(
    name = "linode-lb",
    version,
    about = "Provisions Linode NodeBalancers for Kubernetes LoadBalancer Services"
)]
pub struct ControllerConfig {
    /// Linode API personal access token
    #[arg(long, env = "LINODE_API_TOKEN", hide_env_values = true)]
    pub linode_token: String,

    /// Region new `NodeBalancers` are created in (e.g. us-east)
    #[arg(long, env = "LINODE_REGION")]
    pub linode_region: String,

    /// Linode API endpoint
    #[arg(
        long,
        env = "LINODE_URL",
        default_value = DEFAULT_LINODE_URL,
        value_parser = parse_api_url
    )]
    pub linode_url: String,

    /// Cluster name passed to the load balancer operations
    #[arg(long, env = "CLUSTER_NAME", default_value = DEFAULT_CLUSTER_NAME)]
    pub cluster_name: String,

    /// Address the `/metrics` endpoint listens on
    #[arg(long, env = "METRICS_BIND_ADDRESS", default_value = METRICS_SERVER_BIND_ADDRESS)]
    pub metrics_bind_address: SocketAddr,

    /// Seconds between periodic reconciliations of each Service
    #[arg(long, env = "REQUEUE_SECS", default_value_t = DEFAULT_REQUEUE_SECS)]
    pub requeue_secs: u64,
}

impl ControllerConfig {
    #[must_use]
    pub fn requeue_interval(&self) -> Duration {
        Duration::from_secs(self.requeue_secs)
    }
}

impl fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("linode_token", &"<redacted>")
            .field("linode_region", &self.linode_region)
            .field("linode_url", &self.linode_url)
            .field("cluster_name", &self.cluster_name)
            .field("metrics_bind_address", &self.metrics_bind_address)
            .field("requeue_secs", &self.requeue_secs)
            .finish()
    }
}

/// Validate a Linode API endpoint.
///
/// Endpoints without a scheme are taken as https. Only http and https are
/// accepted; a trailing slash is dropped.
///
/// # Errors
///
/// Returns a message suitable for clap if the endpoint is not a valid URL.
pub fn parse_api_url(raw: &str) -> Result<String, String> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    let url = url::Url::parse(&candidate).map_err(|e| format!("invalid URL {raw:?}: {e}"))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme {other:?} in {raw:?}")),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(format!("missing host in {raw:?}"));
    }

    Ok(candidate.trim_end_matches('/').to_string())
}
