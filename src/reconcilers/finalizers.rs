// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Finalizer management for Services that own a `NodeBalancer`.
//!
//! The finalizer keeps a Service object around until its balancer has been
//! deleted, so a `kubectl delete` never leaks a billed Linode resource.

use crate::constants::SERVICE_FINALIZER;
use anyhow::Result;
use k8s_openapi::api::core::v1::Service;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use serde_json::json;
use tracing::info;

/// True if `service` carries the controller's finalizer.
#[must_use]
pub fn has_finalizer(service: &Service) -> bool {
    service.finalizers().iter().any(|f| f == SERVICE_FINALIZER)
}

/// Finalizer list with ours appended, `None` if already present.
#[must_use]
pub fn finalizers_with_ours(service: &Service) -> Option<Vec<String>> {
    if has_finalizer(service) {
        return None;
    }
    let mut finalizers = service.finalizers().to_vec();
    finalizers.push(SERVICE_FINALIZER.to_string());
    Some(finalizers)
}

/// Finalizer list without ours, `None` if it was not there.
#[must_use]
pub fn finalizers_without_ours(service: &Service) -> Option<Vec<String>> {
    if !has_finalizer(service) {
        return None;
    }
    Some(
        service
            .finalizers()
            .iter()
            .filter(|f| *f != SERVICE_FINALIZER)
            .cloned()
            .collect(),
    )
}

/// Add the finalizer to `service` if missing.
///
/// # Errors
///
/// Returns the Kubernetes API error if the patch fails.
pub async fn ensure_finalizer(client: &Client, service: &Service) -> Result<()> {
    if let Some(finalizers) = finalizers_with_ours(service) {
        patch_finalizers(client, service, finalizers).await?;
        info!(
            namespace = %service.namespace().unwrap_or_default(),
            name = %service.name_any(),
            finalizer = SERVICE_FINALIZER,
            "Added finalizer"
        );
    }
    Ok(())
}

/// Remove the finalizer from `service` if present.
///
/// # Errors
///
/// Returns the Kubernetes API error if the patch fails.
pub async fn remove_finalizer(client: &Client, service: &Service) -> Result<()> {
    if let Some(finalizers) = finalizers_without_ours(service) {
        patch_finalizers(client, service, finalizers).await?;
        info!(
            namespace = %service.namespace().unwrap_or_default(),
            name = %service.name_any(),
            finalizer = SERVICE_FINALIZER,
            "Removed finalizer"
        );
    }
    Ok(())
}

async fn patch_finalizers(
    client: &Client,
    service: &Service,
    finalizers: Vec<String>,
) -> Result<()> {
    let api: Api<Service> =
        Api::namespaced(client.clone(), &service.namespace().unwrap_or_default());
    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&service.name_any(), &PatchParams::default(), &Patch::Merge(&patch))
        .await?;
    Ok(())
}
