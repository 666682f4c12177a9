// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation of `type: LoadBalancer` Services.
//!
//! For each Service the controller either ensures a `NodeBalancer` and
//! publishes its address in `status.loadBalancer`, or, once the Service is
//! deleted or no longer of type `LoadBalancer`, deletes the balancer and
//! releases the finalizer.

use super::finalizers::{ensure_finalizer, has_finalizer, remove_finalizer};
use crate::constants::{LABEL_EXCLUDE_FROM_LB, SERVICE_TYPE_LOAD_BALANCER};
use crate::context::Context;
use crate::errors::LoadBalancerError;
use anyhow::Result;
use k8s_openapi::api::core::v1::{LoadBalancerStatus, Node, Service};
use kube::api::{ListParams, Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::{Api, ResourceExt};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// What a reconciliation of a Service does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOperation {
    /// Create or converge the balancer
    Ensure,
    /// Delete the balancer and release the finalizer
    Delete,
    /// Not ours; nothing to do
    Ignore,
}

impl ServiceOperation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ensure => "ensure",
            Self::Delete => "delete",
            Self::Ignore => "ignore",
        }
    }
}

/// True if `service` asks for an external load balancer.
#[must_use]
pub fn wants_load_balancer(service: &Service) -> bool {
    service
        .spec
        .as_ref()
        .and_then(|spec| spec.type_.as_deref())
        == Some(SERVICE_TYPE_LOAD_BALANCER)
}

/// Decide what reconciling `service` should do.
#[must_use]
pub fn service_operation(service: &Service) -> ServiceOperation {
    let deleting = service.metadata.deletion_timestamp.is_some();
    if !deleting && wants_load_balancer(service) {
        ServiceOperation::Ensure
    } else if has_finalizer(service) {
        ServiceOperation::Delete
    } else {
        ServiceOperation::Ignore
    }
}

/// True if `node` is `Ready`.
#[must_use]
pub fn node_is_ready(node: &Node) -> bool {
    node.status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .is_some_and(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True")
        })
}

/// Nodes eligible as backends: ready and not labelled for exclusion.
#[must_use]
pub fn backend_nodes(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .filter(|node| {
            node_is_ready(node) && !node.labels().contains_key(LABEL_EXCLUDE_FROM_LB)
        })
        .collect()
}

/// True if `service` does not already publish `status`.
#[must_use]
pub fn status_changed(service: &Service, status: &LoadBalancerStatus) -> bool {
    service
        .status
        .as_ref()
        .and_then(|s| s.load_balancer.as_ref())
        != Some(status)
}

/// Short reason label for a reconciliation failure, used in metrics.
#[must_use]
pub fn error_reason(err: &anyhow::Error) -> &'static str {
    if let Some(lb_err) = err.downcast_ref::<LoadBalancerError>() {
        lb_err.reason()
    } else if err.downcast_ref::<kube::Error>().is_some() {
        "KubernetesApiError"
    } else {
        "Unknown"
    }
}

/// Reconcile one Service.
///
/// # Errors
///
/// Returns load balancer or Kubernetes API errors; the caller requeues.
pub async fn reconcile_service(service: Arc<Service>, ctx: Arc<Context>) -> Result<Action> {
    let namespace = service.namespace().unwrap_or_default();
    let name = service.name_any();

    match service_operation(&service) {
        ServiceOperation::Ignore => {
            debug!(
                namespace = %namespace,
                name = %name,
                "Service does not need a NodeBalancer"
            );
            Ok(Action::await_change())
        }
        ServiceOperation::Delete => {
            info!(namespace = %namespace, name = %name, "Deleting NodeBalancer for Service");
            ctx.load_balancers
                .ensure_load_balancer_deleted(&ctx.shutdown, &ctx.cluster_name, &service)
                .await?;
            if service.metadata.deletion_timestamp.is_none() {
                clear_status(&ctx, &service).await?;
            }
            remove_finalizer(&ctx.client, &service).await?;
            Ok(Action::await_change())
        }
        ServiceOperation::Ensure => {
            ensure_finalizer(&ctx.client, &service).await?;

            let nodes = Api::<Node>::all(ctx.client.clone())
                .list(&ListParams::default())
                .await?;
            let backends = backend_nodes(nodes.items);
            debug!(
                namespace = %namespace,
                name = %name,
                backends = backends.len(),
                "Ensuring NodeBalancer for Service"
            );

            let status = ctx
                .load_balancers
                .ensure_load_balancer(&ctx.shutdown, &ctx.cluster_name, &service, &backends)
                .await?;

            if status_changed(&service, &status) {
                publish_status(&ctx, &service, &status).await?;
                info!(namespace = %namespace, name = %name, "Published load balancer status");
            }

            Ok(Action::requeue(ctx.requeue))
        }
    }
}

async fn publish_status(
    ctx: &Context,
    service: &Service,
    status: &LoadBalancerStatus,
) -> Result<()> {
    patch_status(ctx, service, json!({ "status": { "loadBalancer": status } })).await
}

async fn clear_status(ctx: &Context, service: &Service) -> Result<()> {
    let patch = json!({ "status": { "loadBalancer": { "ingress": null } } });
    patch_status(ctx, service, patch).await
}

async fn patch_status(ctx: &Context, service: &Service, patch: serde_json::Value) -> Result<()> {
    let api: Api<Service> =
        Api::namespaced(ctx.client.clone(), &service.namespace().unwrap_or_default());
    api.patch_status(&service.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
        .await?;
    Ok(())
}
