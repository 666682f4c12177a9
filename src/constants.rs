// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Linode load balancer controller.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Service Annotation Keys
// ============================================================================

/// Annotation holding the client connection throttle (0-20)
pub const ANN_THROTTLE: &str = "service.beta.kubernetes.io/linode-loadbalancer-throttle";

/// Annotation holding the protocol used by ports without a per-port override
pub const ANN_DEFAULT_PROTOCOL: &str =
    "service.beta.kubernetes.io/linode-loadbalancer-default-protocol";

/// Prefix of the per-port JSON override annotation; the port number is appended
pub const ANN_PORT_CONFIG_PREFIX: &str = "service.beta.kubernetes.io/linode-loadbalancer-port-";

/// Annotation holding the health check type (`connection` or `http`)
pub const ANN_CHECK_TYPE: &str = "service.beta.kubernetes.io/linode-loadbalancer-check-type";

// ============================================================================
// Load Balancer Defaults
// ============================================================================

/// Throttle used when the annotation is absent or unparseable
pub const DEFAULT_CONN_THROTTLE: i32 = 20;

/// Lowest accepted client connection throttle (0 disables throttling)
pub const MIN_CONN_THROTTLE: i32 = 0;

/// Highest accepted client connection throttle
pub const MAX_CONN_THROTTLE: i32 = 20;

/// Protocol used when neither the port nor the service names one
pub const DEFAULT_PROTOCOL: &str = "tcp";

/// Maximum length of a `NodeBalancer` label
pub const MAX_LOAD_BALANCER_NAME_LEN: usize = 32;

/// Maximum length of a `NodeBalancer` node label
pub const MAX_NODE_LABEL_LEN: usize = 32;

// ============================================================================
// Kubernetes Constants
// ============================================================================

/// Secret data key holding the PEM certificate of a `kubernetes.io/tls` Secret
pub const TLS_CERT_KEY: &str = "tls.crt";

/// Secret data key holding the PEM private key of a `kubernetes.io/tls` Secret
pub const TLS_PRIVATE_KEY_KEY: &str = "tls.key";

/// Node address type used for backends
pub const NODE_INTERNAL_IP: &str = "InternalIP";

/// Service type handled by this controller
pub const SERVICE_TYPE_LOAD_BALANCER: &str = "LoadBalancer";

/// Node label excluding a node from external load balancer backends
pub const LABEL_EXCLUDE_FROM_LB: &str = "node.kubernetes.io/exclude-from-external-load-balancers";

/// Finalizer guarding `NodeBalancer` cleanup on Service deletion
pub const SERVICE_FINALIZER: &str = "linode-ccm.io/nodebalancer";

// ============================================================================
// Linode API Constants
// ============================================================================

/// Default Linode API endpoint
pub const DEFAULT_LINODE_URL: &str = "https://api.linode.com";

/// Linode API version path segment
pub const LINODE_API_VERSION: &str = "v4";

/// Page size requested from Linode list endpoints (API maximum)
pub const LINODE_LIST_PAGE_SIZE: u32 = 500;

/// Header carrying Linode list filters
pub const LINODE_FILTER_HEADER: &str = "X-Filter";

/// Placeholder the API returns in place of a stored TLS certificate
pub const LINODE_REDACTED_CERT: &str = "<REDACTED>";

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Requeue delay after a failed reconciliation
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Default requeue interval for converged Services (picks up node changes)
pub const DEFAULT_REQUEUE_SECS: u64 = 300;

/// Default cluster name passed to the load balancer operations
pub const DEFAULT_CLUSTER_NAME: &str = "kubernetes";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of Tokio worker threads
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Default metrics bind address
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";
