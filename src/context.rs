// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the Service controller.
//!
//! Every reconciliation receives an `Arc<Context>` holding the Kubernetes
//! client, the `NodeBalancer` provider and the controller settings.

use crate::config::ControllerConfig;
use crate::linode::LinodeClient;
use crate::loadbalancers::LoadBalancers;
use kube::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Shared state passed to every reconciliation.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for Services, Nodes and Secrets
    pub client: Client,

    /// `NodeBalancer` lifecycle operations
    pub load_balancers: Arc<LoadBalancers>,

    /// Cluster name forwarded to the load balancer operations
    pub cluster_name: String,

    /// Interval between periodic reconciliations of a Service
    pub requeue: Duration,

    /// Cancelled on shutdown so in-flight reconciliations stop issuing calls
    pub shutdown: CancellationToken,
}

impl Context {
    /// Build the context from `config`, using `client` for Kubernetes and
    /// as the Secret store.
    #[must_use]
    pub fn new(client: Client, config: &ControllerConfig, shutdown: CancellationToken) -> Self {
        let linode = LinodeClient::new(&config.linode_url, &config.linode_token);
        let load_balancers = LoadBalancers::new(
            Arc::new(linode),
            Arc::new(client.clone()),
            config.linode_region.clone(),
        );

        Self {
            client,
            load_balancers: Arc::new(load_balancers),
            cluster_name: config.cluster_name.clone(),
            requeue: config.requeue_interval(),
            shutdown,
        }
    }
}
