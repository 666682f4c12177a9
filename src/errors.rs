// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for load balancer reconciliation.
//!
//! Errors fall into three groups:
//! - **Validation** - bad annotations or missing TLS references, detected
//!   before any API call is issued
//! - **Not found** - a missing `NodeBalancer` on update or a missing Secret;
//!   callers can tell them apart with [`LoadBalancerError::is_not_found`]
//! - **Transport/API** - failures from the Linode API or the Kubernetes API,
//!   passed through unchanged so the caller can decide whether to retry

use crate::linode::LinodeError;
use thiserror::Error;

/// Errors that can occur while reconciling a Service against its `NodeBalancer`.
#[derive(Error, Debug)]
pub enum LoadBalancerError {
    /// Protocol annotation holds something other than tcp, http or https
    #[error("invalid protocol: {0:?} specified")]
    InvalidProtocol(String),

    /// Health check annotation holds something other than connection or http
    #[error("invalid health check type: {value:?} specified in annotation: {annotation:?}")]
    InvalidHealthCheckType {
        /// The rejected value
        value: String,
        /// The annotation key it was read from
        annotation: String,
    },

    /// Per-port config annotation is not valid JSON
    #[error(transparent)]
    PortConfigAnnotation(#[from] serde_json::Error),

    /// An https port has no TLS secret reference
    #[error("TLS secret name for port {port} is not specified")]
    MissingTlsSecretName {
        /// The service port lacking a secret
        port: i32,
    },

    /// The referenced TLS Secret does not exist
    #[error("secrets {name:?} not found")]
    SecretNotFound {
        /// Namespace that was searched
        namespace: String,
        /// Secret name
        name: String,
    },

    /// The TLS Secret lacks a certificate or key entry
    #[error("secret {namespace}/{name} has no usable {key:?} entry")]
    InvalidCertificate {
        namespace: String,
        name: String,
        /// Data key that was missing, empty or not UTF-8
        key: String,
    },

    /// The `NodeBalancer` backing a Service does not exist
    #[error("load balancer {name:?} not found")]
    LoadBalancerNotFound {
        /// Deterministic `NodeBalancer` label
        name: String,
    },

    /// The caller cancelled the operation
    #[error("load balancer operation cancelled")]
    Cancelled,

    /// Kubernetes API failure while reading a Secret
    #[error(transparent)]
    Kube(#[from] kube::Error),

    /// Linode API failure
    #[error(transparent)]
    Linode(#[from] LinodeError),
}

impl LoadBalancerError {
    /// True for every not-found condition, whichever system reported it.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::SecretNotFound { .. } | Self::LoadBalancerNotFound { .. } => true,
            Self::Linode(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// True for errors caused by the Service's own configuration.
    ///
    /// Retrying these without changing the Service cannot succeed.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidProtocol(_)
                | Self::InvalidHealthCheckType { .. }
                | Self::PortConfigAnnotation(_)
                | Self::MissingTlsSecretName { .. }
                | Self::InvalidCertificate { .. }
        )
    }

    /// Short, stable label for metrics and status reporting.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidProtocol(_) => "InvalidProtocol",
            Self::InvalidHealthCheckType { .. } => "InvalidHealthCheckType",
            Self::PortConfigAnnotation(_) => "InvalidPortConfig",
            Self::MissingTlsSecretName { .. } => "MissingTLSSecret",
            Self::SecretNotFound { .. } => "SecretNotFound",
            Self::InvalidCertificate { .. } => "InvalidCertificate",
            Self::LoadBalancerNotFound { .. } => "LoadBalancerNotFound",
            Self::Cancelled => "Cancelled",
            Self::Kube(_) => "KubernetesApiError",
            Self::Linode(e) if e.is_not_found() => "LinodeNotFound",
            Self::Linode(LinodeError::Api { .. }) => "LinodeApiError",
            Self::Linode(_) => "LinodeUnreachable",
        }
    }
}

/// Result alias for load balancer operations.
pub type Result<T, E = LoadBalancerError> = std::result::Result<T, E>;
