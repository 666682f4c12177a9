// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `NodeBalancer` lifecycle for `type: LoadBalancer` Services.
//!
//! [`LoadBalancers`] implements the four operations a cloud controller needs:
//! query, ensure, update and ensure-deleted. Each Service maps to exactly one
//! `NodeBalancer`, found by a label derived from the Service UID, with one
//! config per Service port and one backend node per cluster node.
//!
//! # Example
//!
//! ```rust,no_run
//! use linode_lb::linode::LinodeClient;
//! use linode_lb::loadbalancers::LoadBalancers;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(service: k8s_openapi::api::core::v1::Service) -> anyhow::Result<()> {
//! let kube = kube::Client::try_default().await?;
//! let linode = LinodeClient::new("https://api.linode.com", "token");
//! let lbs = LoadBalancers::new(Arc::new(linode), Arc::new(kube), "us-east");
//!
//! let status = lbs
//!     .ensure_load_balancer(&CancellationToken::new(), "kubernetes", &service, &[])
//!     .await?;
//! println!("{status:?}");
//! # Ok(())
//! # }
//! ```

pub mod annotations;
pub mod finder;
pub mod nodes;
pub mod port_config;
pub mod request;
pub(crate) mod sync;
pub mod tls;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
pub(crate) mod fixtures;


use crate::errors::{LoadBalancerError, Result};
use crate::linode::{NodeBalancer, NodeBalancerApi};
use crate::metrics;
use crate::secrets::SecretStore;
use annotations::connection_throttle;
use finder::{load_balancer_name, load_balancer_status};
use k8s_openapi::api::core::v1::{LoadBalancerStatus, Node, Service};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Load-balancer provider backed by Linode `NodeBalancers`.
pub struct LoadBalancers {
    client: Arc<dyn NodeBalancerApi>,
    secrets: Arc<dyn SecretStore>,
    region: String,
}

impl LoadBalancers {
    /// Provider creating balancers in `region`.
    pub fn new(
        client: Arc<dyn NodeBalancerApi>,
        secrets: Arc<dyn SecretStore>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            client,
            secrets,
            region: region.into(),
        }
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Find the `NodeBalancer` labelled `name`.
    ///
    /// # Errors
    ///
    /// Returns the Linode API error if listing fails.
    pub async fn lb_by_name(&self, name: &str) -> Result<Option<NodeBalancer>> {
        finder::lb_by_name(self.client.as_ref(), name).await
    }

    /// Status of the balancer for `service`, `None` if it has none.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` or the Linode API error.
    pub async fn get_load_balancer(
        &self,
        cancel: &CancellationToken,
        cluster_name: &str,
        service: &Service,
    ) -> Result<Option<LoadBalancerStatus>> {
        let name = load_balancer_name(cluster_name, service);
        cancellable(cancel, async {
            Ok(self.lb_by_name(&name).await?.as_ref().map(load_balancer_status))
        })
        .await
    }

    /// Make sure `service` has a balancer matching its ports, annotations and
    /// `nodes`, creating it if needed.
    ///
    /// A new balancer is created in one call with every config and backend
    /// inline. An existing one is converged in place.
    ///
    /// # Errors
    ///
    /// Returns validation errors before any write, then `Cancelled` or the
    /// first Linode API error.
    pub async fn ensure_load_balancer(
        &self,
        cancel: &CancellationToken,
        cluster_name: &str,
        service: &Service,
        nodes: &[Node],
    ) -> Result<LoadBalancerStatus> {
        let name = load_balancer_name(cluster_name, service);
        cancellable(cancel, async {
            let nb = match self.lb_by_name(&name).await? {
                Some(existing) => {
                    self.converge(&existing, service, nodes).await?;
                    self.client.get_node_balancer(existing.id).await?
                }
                None => {
                    let configs = self.build_config_requests(service, nodes).await?;
                    self.create_node_balancer(cluster_name, service, configs)
                        .await?
                }
            };
            Ok(load_balancer_status(&nb))
        })
        .await
    }

    /// Converge the existing balancer of `service` onto its desired state.
    ///
    /// # Errors
    ///
    /// Returns `LoadBalancerNotFound` if the Service has no balancer,
    /// validation errors before any write, then `Cancelled` or the first Linode
    /// API error.
    pub async fn update_load_balancer(
        &self,
        cancel: &CancellationToken,
        cluster_name: &str,
        service: &Service,
        nodes: &[Node],
    ) -> Result<()> {
        let name = load_balancer_name(cluster_name, service);
        cancellable(cancel, async {
            let nb = self
                .lb_by_name(&name)
                .await?
                .ok_or_else(|| LoadBalancerError::LoadBalancerNotFound {
                    name: name.clone(),
                })?;
            self.converge(&nb, service, nodes).await
        })
        .await
    }

    /// Delete the balancer of `service` if it has one.
    ///
    /// Deleting an absent balancer, or one that vanishes mid-call, succeeds.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` or any other Linode API error.
    pub async fn ensure_load_balancer_deleted(
        &self,
        cancel: &CancellationToken,
        cluster_name: &str,
        service: &Service,
    ) -> Result<()> {
        let name = load_balancer_name(cluster_name, service);
        cancellable(cancel, async {
            let Some(nb) = self.lb_by_name(&name).await? else {
                info!(name = %name, "No NodeBalancer to delete");
                return Ok(());
            };

            match self.client.delete_node_balancer(nb.id).await {
                Ok(()) => {
                    metrics::record_resource_deleted("nodebalancer");
                    info!(id = nb.id, name = %name, "Deleted NodeBalancer");
                    Ok(())
                }
                Err(e) if e.is_not_found() => {
                    warn!(id = nb.id, name = %name, "NodeBalancer already gone");
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    /// Resolve every desired config first so nothing is written for an
    /// invalid Service, then sync.
    async fn converge(&self, nb: &NodeBalancer, service: &Service, nodes: &[Node]) -> Result<()> {
        let desired = self.build_config_requests(service, nodes).await?;
        self.sync_node_balancer(nb, connection_throttle(service), &desired)
            .await
    }
}

/// Run `fut` unless `cancel` fires first. Calls already issued are not rolled
/// back.
async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(LoadBalancerError::Cancelled),
        res = fut => res,
    }
}
