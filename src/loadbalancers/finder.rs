// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Naming and lookup of the `NodeBalancer` backing a Service.

use crate::constants::MAX_LOAD_BALANCER_NAME_LEN;
use crate::errors::Result;
use crate::linode::{NodeBalancer, NodeBalancerApi};
use k8s_openapi::api::core::v1::{LoadBalancerIngress, LoadBalancerStatus, Service};
use tracing::debug;

/// Deterministic `NodeBalancer` label for `service`.
///
/// `"a"` followed by the Service UID without dashes, cut to 32 characters,
/// matching the upstream cloud-provider default. The cluster name does not
/// take part so renaming a cluster never orphans balancers. Services without a
/// UID (not yet persisted) fall back to their name.
#[must_use]
pub fn load_balancer_name(_cluster_name: &str, service: &Service) -> String {
    let identity = service
        .metadata
        .uid
        .as_deref()
        .filter(|uid| !uid.is_empty())
        .or(service.metadata.name.as_deref())
        .unwrap_or_default();

    format!("a{identity}")
        .replace('-', "")
        .chars()
        .take(MAX_LOAD_BALANCER_NAME_LEN)
        .collect()
}

/// Find the `NodeBalancer` labelled `name`.
///
/// `Ok(None)` is the normal outcome for a Service that has no balancer yet.
///
/// # Errors
///
/// Returns the Linode API error if listing fails.
pub async fn lb_by_name(client: &dyn NodeBalancerApi, name: &str) -> Result<Option<NodeBalancer>> {
    let balancers = client.list_node_balancers(Some(name)).await?;

    // The label filter is applied server-side; re-check in case it was ignored.
    let found = balancers
        .into_iter()
        .find(|nb| nb.label.as_deref() == Some(name));

    debug!(name = %name, found = found.is_some(), "Looked up NodeBalancer by label");

    Ok(found)
}

/// Externally visible status of `nb`.
#[must_use]
#[allow(clippy::needless_update)]
pub fn load_balancer_status(nb: &NodeBalancer) -> LoadBalancerStatus {
    LoadBalancerStatus {
        ingress: Some(vec![LoadBalancerIngress {
            hostname: nb.hostname.clone(),
            ip: nb.ipv4.clone(),
            ..Default::default()
        }]),
        ..Default::default()
    }
}
