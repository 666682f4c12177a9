// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Secret store access for TLS certificate material.
//!
//! Only the get-by-name contract is consumed. A missing Secret is reported as
//! [`LoadBalancerError::SecretNotFound`] so callers can distinguish it from
//! transport failures.

use crate::errors::{LoadBalancerError, Result};
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use std::collections::BTreeMap;
use tracing::debug;

/// Read access to namespaced Secrets.
#[async_trait::async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the Secret `name` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns `SecretNotFound` if it does not exist, or the underlying API error.
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret>;
}

#[async_trait::async_trait]
impl SecretStore for Client {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret> {
        debug!(namespace = %namespace, name = %name, "Fetching Secret");
        let api: Api<Secret> = Api::namespaced(self.clone(), namespace);
        api.get_opt(name)
            .await?
            .ok_or_else(|| LoadBalancerError::SecretNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }
}

/// Secret store backed by a fixed map, keyed by `(namespace, name)`.
#[derive(Debug, Clone, Default)]
pub struct StaticSecretStore {
    secrets: BTreeMap<(String, String), Secret>,
}

impl StaticSecretStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a Secret; its namespace and name are taken from its metadata.
    #[must_use]
    pub fn with_secret(mut self, secret: Secret) -> Self {
        let key = (
            secret.metadata.namespace.clone().unwrap_or_default(),
            secret.metadata.name.clone().unwrap_or_default(),
        );
        self.secrets.insert(key, secret);
        self
    }
}

#[async_trait::async_trait]
impl SecretStore for StaticSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret> {
        self.secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| LoadBalancerError::SecretNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }
}
