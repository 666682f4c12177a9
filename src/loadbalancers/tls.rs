// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! TLS certificate lookup for https ports.
//!
//! Certificates are relayed as-is from `kubernetes.io/tls` Secrets; nothing
//! here issues or rotates them.

use super::port_config::PortConfig;
use crate::constants::{TLS_CERT_KEY, TLS_PRIVATE_KEY_KEY};
use crate::errors::{LoadBalancerError, Result};
use crate::linode::PrivateKey;
use crate::secrets::SecretStore;
use k8s_openapi::api::core::v1::Secret;
use tracing::debug;

/// PEM certificate chain and private key for one port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub cert_pem: String,
    pub key_pem: PrivateKey,
}

/// Fetch the certificate referenced by `port_config` from `namespace`.
///
/// # Errors
///
/// - `MissingTlsSecretName` if the port names no Secret (the store is not queried)
/// - `SecretNotFound` or the store's transport error, unchanged
/// - `InvalidCertificate` if either entry is missing, empty or not UTF-8
pub async fn tls_cert_info(
    store: &dyn SecretStore,
    namespace: &str,
    port_config: &PortConfig,
) -> Result<Certificate> {
    let secret_name = port_config
        .tls_secret_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or(LoadBalancerError::MissingTlsSecretName {
            port: port_config.port,
        })?;

    debug!(
        namespace = %namespace,
        secret = %secret_name,
        port = port_config.port,
        "Resolving TLS certificate"
    );

    let secret = store.get_secret(namespace, secret_name).await?;

    Ok(Certificate {
        cert_pem: secret_entry(&secret, namespace, secret_name, TLS_CERT_KEY)?,
        key_pem: PrivateKey(secret_entry(
            &secret,
            namespace,
            secret_name,
            TLS_PRIVATE_KEY_KEY,
        )?),
    })
}

fn secret_entry(secret: &Secret, namespace: &str, name: &str, key: &str) -> Result<String> {
    secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .and_then(|bytes| String::from_utf8(bytes.0.clone()).ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| LoadBalancerError::InvalidCertificate {
            namespace: namespace.to_string(),
            name: name.to_string(),
            key: key.to_string(),
        })
}
