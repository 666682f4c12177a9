// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Construction of `NodeBalancer` create payloads from a Service and its nodes.
//!
//! Every validation (protocols, health check type, TLS material) happens here,
//! before anything is sent to Linode. A Service that fails to build produces
//! no API writes.

use super::annotations::{connection_throttle, health_check_type};
use super::finder::load_balancer_name;
use super::nodes::{node_internal_ip, node_label};
use super::port_config::port_config;
use super::tls::tls_cert_info;
use super::LoadBalancers;
use crate::errors::Result;
use crate::linode::{
    ConfigCheck, NodeBalancer, NodeBalancerConfigCreateOptions, NodeBalancerCreateOptions,
    NodeBalancerNodeCreateOptions, Protocol,
};
use k8s_openapi::api::core::v1::{Node, Service, ServicePort};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Namespace of `service`, `default` when unset.
pub(crate) fn service_namespace(service: &Service) -> &str {
    service
        .metadata
        .namespace
        .as_deref()
        .unwrap_or("default")
}

/// Ports exposed by `service`, in declaration order.
pub(crate) fn service_ports(service: &Service) -> &[ServicePort] {
    service
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_deref())
        .unwrap_or_default()
}

/// Backend entries for `nodes` on `node_port`.
///
/// Nodes without an internal IP are left out, as are repeated addresses.
#[must_use]
pub fn node_entries(nodes: &[Node], node_port: i32) -> Vec<NodeBalancerNodeCreateOptions> {
    let mut seen = HashSet::new();
    nodes
        .iter()
        .filter_map(|node| {
            let Some(ip) = node_internal_ip(node) else {
                debug!(
                    node = node.metadata.name.as_deref().unwrap_or_default(),
                    "Skipping node without an internal IP"
                );
                return None;
            };
            let address = format!("{ip}:{node_port}");
            seen.insert(address.clone())
                .then(|| NodeBalancerNodeCreateOptions {
                    label: node_label(node, &ip),
                    address,
                    weight: None,
                })
        })
        .collect()
}

impl LoadBalancers {
    /// Desired config of one Service port, backends included.
    ///
    /// For https ports the certificate is fetched from the Service's namespace
    /// and embedded.
    ///
    /// # Errors
    ///
    /// Returns the port's protocol or annotation error, or the TLS lookup error.
    pub async fn build_config_request(
        &self,
        service: &Service,
        port: &ServicePort,
        check: ConfigCheck,
        nodes: &[Node],
    ) -> Result<NodeBalancerConfigCreateOptions> {
        let port_config = port_config(service, port.port)?;

        let (ssl_cert, ssl_key) = if port_config.protocol == Protocol::Https {
            let cert =
                tls_cert_info(self.secrets.as_ref(), service_namespace(service), &port_config)
                    .await?;
            (Some(cert.cert_pem), Some(cert.key_pem))
        } else {
            (None, None)
        };

        let nodes = match port.node_port {
            Some(node_port) => node_entries(nodes, node_port),
            None => {
                warn!(port = port.port, "Service port has no node port allocated yet");
                Vec::new()
            }
        };

        Ok(NodeBalancerConfigCreateOptions {
            port: port.port,
            protocol: port_config.protocol,
            check,
            ssl_cert,
            ssl_key,
            nodes,
        })
    }

    /// Desired configs for every port of `service`, in port order.
    ///
    /// # Errors
    ///
    /// Returns the first port's build error; no partial result is produced.
    pub(crate) async fn build_config_requests(
        &self,
        service: &Service,
        nodes: &[Node],
    ) -> Result<Vec<NodeBalancerConfigCreateOptions>> {
        let check = health_check_type(service)?;
        let mut configs = Vec::new();
        for port in service_ports(service) {
            configs.push(self.build_config_request(service, port, check, nodes).await?);
        }
        Ok(configs)
    }

    /// Full create payload for `service`: label, region, throttle and one
    /// config per port with its backends inline.
    ///
    /// # Errors
    ///
    /// Returns any validation or TLS lookup error.
    pub async fn build_load_balancer_request(
        &self,
        cluster_name: &str,
        service: &Service,
        nodes: &[Node],
    ) -> Result<NodeBalancerCreateOptions> {
        let configs = self.build_config_requests(service, nodes).await?;
        Ok(self.create_options(cluster_name, service, configs))
    }

    /// Create the balancer for `service` with `configs` in a single call.
    ///
    /// # Errors
    ///
    /// Returns the Linode API error if creation fails.
    pub async fn create_node_balancer(
        &self,
        cluster_name: &str,
        service: &Service,
        configs: Vec<NodeBalancerConfigCreateOptions>,
    ) -> Result<NodeBalancer> {
        let opts = self.create_options(cluster_name, service, configs);
        let nb = self.client.create_node_balancer(&opts).await?;
        crate::metrics::record_resource_created("nodebalancer");
        info!(
            id = nb.id,
            label = nb.label.as_deref().unwrap_or_default(),
            region = %nb.region,
            configs = opts.configs.len(),
            "Created NodeBalancer"
        );
        Ok(nb)
    }

    fn create_options(
        &self,
        cluster_name: &str,
        service: &Service,
        configs: Vec<NodeBalancerConfigCreateOptions>,
    ) -> NodeBalancerCreateOptions {
        NodeBalancerCreateOptions {
            label: Some(load_balancer_name(cluster_name, service)),
            region: self.region.clone(),
            client_conn_throttle: Some(connection_throttle(service)),
            configs,
        }
    }
}
