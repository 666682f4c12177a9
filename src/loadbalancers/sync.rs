// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Convergence of an existing `NodeBalancer` onto its desired configs.
//!
//! Configs are matched to Service ports by port number and nodes to cluster
//! nodes by `ip:nodePort` address. Anything matched is updated in place so
//! that config and node IDs survive, which keeps established connections on
//! unaffected backends. Creates and updates run before deletes.

use super::LoadBalancers;
use crate::constants::LINODE_REDACTED_CERT;
use crate::errors::Result;
use crate::linode::{
    NodeBalancer, NodeBalancerConfig, NodeBalancerConfigCreateOptions,
    NodeBalancerConfigUpdateOptions, NodeBalancerNode, NodeBalancerNodeCreateOptions,
    NodeBalancerUpdateOptions, Protocol,
};
use crate::metrics;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// How the existing configs relate to the desired ones.
#[derive(Debug, Default)]
pub(crate) struct ConfigPlan<'a> {
    pub create: Vec<&'a NodeBalancerConfigCreateOptions>,
    pub keep: Vec<(&'a NodeBalancerConfig, &'a NodeBalancerConfigCreateOptions)>,
    pub delete: Vec<&'a NodeBalancerConfig>,
}

/// Match `existing` configs to `desired` ones by port.
///
/// Existing configs on ports no longer exposed, and duplicates of a port
/// already matched, are scheduled for deletion.
pub(crate) fn plan_configs<'a>(
    existing: &'a [NodeBalancerConfig],
    desired: &'a [NodeBalancerConfigCreateOptions],
) -> ConfigPlan<'a> {
    let mut by_port: HashMap<i32, &NodeBalancerConfig> = HashMap::new();
    let mut plan = ConfigPlan::default();

    for config in existing {
        if by_port.contains_key(&config.port) {
            plan.delete.push(config);
        } else {
            by_port.insert(config.port, config);
        }
    }

    for want in desired {
        match by_port.remove(&want.port) {
            Some(have) => plan.keep.push((have, want)),
            None => plan.create.push(want),
        }
    }

    let mut stale: Vec<_> = by_port.into_values().collect();
    stale.sort_by_key(|c| c.port);
    plan.delete.extend(stale);
    plan
}

/// Fields of `have` that differ from `want`.
///
/// TLS material is re-sent when the protocol changes to https or the stored
/// certificate is missing or known to differ.
pub(crate) fn config_changes(
    have: &NodeBalancerConfig,
    want: &NodeBalancerConfigCreateOptions,
) -> NodeBalancerConfigUpdateOptions {
    let mut changes = NodeBalancerConfigUpdateOptions::default();

    if have.protocol != want.protocol {
        changes.protocol = Some(want.protocol);
    }
    if have.check != want.check {
        changes.check = Some(want.check);
    }
    if want.protocol == Protocol::Https
        && (changes.protocol.is_some()
            || cert_outdated(have.ssl_cert.as_deref(), want.ssl_cert.as_deref()))
    {
        changes.ssl_cert.clone_from(&want.ssl_cert);
        changes.ssl_key.clone_from(&want.ssl_key);
    }

    changes
}

/// True if the stored certificate `have` must be replaced by `want`.
///
/// The API answers [`LINODE_REDACTED_CERT`] for any stored certificate, which
/// only says one is present; its contents cannot be compared.
fn cert_outdated(have: Option<&str>, want: Option<&str>) -> bool {
    match have.map(str::trim).filter(|cert| !cert.is_empty()) {
        None => true,
        Some(LINODE_REDACTED_CERT) => false,
        Some(cert) => Some(cert) != want.map(str::trim),
    }
}

/// Backends to register and to remove on one config.
#[derive(Debug, Default)]
pub(crate) struct NodePlan<'a> {
    pub register: Vec<&'a NodeBalancerNodeCreateOptions>,
    pub deregister: Vec<&'a NodeBalancerNode>,
}

/// Diff registered backends against `desired` by address.
///
/// The first backend on an address is kept; later ones on the same address
/// are removed along with those whose address is no longer desired.
pub(crate) fn plan_nodes<'a>(
    existing: &'a [NodeBalancerNode],
    desired: &'a [NodeBalancerNodeCreateOptions],
) -> NodePlan<'a> {
    let wanted: HashSet<&str> = desired.iter().map(|n| n.address.as_str()).collect();
    let mut kept: HashSet<&str> = HashSet::new();
    let mut plan = NodePlan::default();

    for node in existing {
        if wanted.contains(node.address.as_str()) && kept.insert(node.address.as_str()) {
            continue;
        }
        plan.deregister.push(node);
    }

    for want in desired {
        if kept.insert(want.address.as_str()) {
            plan.register.push(want);
        }
    }

    plan
}

impl LoadBalancers {
    /// Bring `nb` in line with `desired`.
    pub(crate) async fn sync_node_balancer(
        &self,
        nb: &NodeBalancer,
        throttle: i32,
        desired: &[NodeBalancerConfigCreateOptions],
    ) -> Result<()> {
        if nb.client_conn_throttle != throttle {
            info!(
                id = nb.id,
                from = nb.client_conn_throttle,
                to = throttle,
                "Updating NodeBalancer connection throttle"
            );
            self.client
                .update_node_balancer(
                    nb.id,
                    &NodeBalancerUpdateOptions {
                        label: None,
                        client_conn_throttle: Some(throttle),
                    },
                )
                .await?;
            metrics::record_resource_updated("nodebalancer");
        }

        let existing = self.client.list_configs(nb.id).await?;
        let plan = plan_configs(&existing, desired);

        for want in plan.create {
            self.add_config(nb.id, want).await?;
        }

        for (have, want) in plan.keep {
            let changes = config_changes(have, want);
            if !changes.is_empty() {
                info!(
                    nb = nb.id,
                    config = have.id,
                    port = have.port,
                    protocol = %want.protocol,
                    "Updating NodeBalancer config"
                );
                self.client.update_config(nb.id, have.id, &changes).await?;
                metrics::record_resource_updated("config");
            }
            self.sync_nodes(nb.id, have.id, &want.nodes).await?;
        }

        for stale in plan.delete {
            info!(
                nb = nb.id,
                config = stale.id,
                port = stale.port,
                "Deleting NodeBalancer config"
            );
            self.client.delete_config(nb.id, stale.id).await?;
            metrics::record_resource_deleted("config");
        }

        Ok(())
    }

    /// Create a config on an existing balancer, then register its backends.
    async fn add_config(&self, nb_id: i64, want: &NodeBalancerConfigCreateOptions) -> Result<()> {
        info!(
            nb = nb_id,
            port = want.port,
            protocol = %want.protocol,
            "Creating NodeBalancer config"
        );
        let bare = NodeBalancerConfigCreateOptions {
            nodes: Vec::new(),
            ..want.clone()
        };
        let config = self.client.create_config(nb_id, &bare).await?;
        metrics::record_resource_created("config");

        for node in &want.nodes {
            self.client.create_node(nb_id, config.id, node).await?;
            metrics::record_resource_created("node");
        }
        Ok(())
    }

    async fn sync_nodes(
        &self,
        nb_id: i64,
        config_id: i64,
        desired: &[NodeBalancerNodeCreateOptions],
    ) -> Result<()> {
        let existing = self.client.list_nodes(nb_id, config_id).await?;
        let plan = plan_nodes(&existing, desired);

        debug!(
            nb = nb_id,
            config = config_id,
            register = plan.register.len(),
            deregister = plan.deregister.len(),
            "Syncing NodeBalancer nodes"
        );

        for node in plan.register {
            self.client.create_node(nb_id, config_id, node).await?;
            metrics::record_resource_created("node");
        }
        for node in plan.deregister {
            self.client.delete_node(nb_id, config_id, node.id).await?;
            metrics::record_resource_deleted("node");
        }
        Ok(())
    }
}
