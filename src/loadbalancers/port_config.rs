// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-port configuration resolution.
//!
//! The protocol of a port comes from, in order of precedence:
//! 1. the `protocol` field of the port's JSON annotation
//! 2. the service-wide default-protocol annotation
//! 3. `tcp`

use super::annotations::{annotation, port_config_annotation};
use crate::constants::{ANN_DEFAULT_PROTOCOL, DEFAULT_PROTOCOL};
use crate::errors::{LoadBalancerError, Result};
use crate::linode::Protocol;
use k8s_openapi::api::core::v1::Service;

/// Resolved configuration of one exposed port. Recomputed on every reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortConfig {
    pub port: i32,
    pub protocol: Protocol,
    pub tls_secret_name: Option<String>,
}

impl PortConfig {
    /// Plain TCP config for `port` with no TLS reference.
    #[must_use]
    pub fn tcp(port: i32) -> Self {
        Self {
            port,
            protocol: Protocol::Tcp,
            tls_secret_name: None,
        }
    }
}

/// Lower-case `raw` and map it onto a [`Protocol`].
///
/// # Errors
///
/// Returns `InvalidProtocol` naming the lower-cased value if it is not one of
/// tcp, http or https.
pub fn normalize_protocol(raw: &str) -> Result<Protocol> {
    let lower = raw.to_lowercase();
    Protocol::from_name(&lower).ok_or(LoadBalancerError::InvalidProtocol(lower))
}

/// Resolve the configuration of `port` from the Service annotations.
///
/// # Errors
///
/// Returns the per-port annotation's JSON error, or `InvalidProtocol`.
pub fn port_config(service: &Service, port: i32) -> Result<PortConfig> {
    let ann = port_config_annotation(service, port)?;

    let raw_protocol = ann
        .protocol
        .as_deref()
        .filter(|p| !p.is_empty())
        .or_else(|| annotation(service, ANN_DEFAULT_PROTOCOL).filter(|p| !p.is_empty()))
        .unwrap_or(DEFAULT_PROTOCOL);

    Ok(PortConfig {
        port,
        protocol: normalize_protocol(raw_protocol)?,
        tls_secret_name: ann.tls_secret_name,
    })
}
