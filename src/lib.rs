// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # linode-lb - Linode `NodeBalancers` for Kubernetes `LoadBalancer` Services
//!
//! A cloud-controller component that gives every `type: LoadBalancer` Service
//! its own Linode `NodeBalancer` and keeps it in line with the Service's ports,
//! annotations and the cluster's nodes.
//!
//! ## Overview
//!
//! - One `NodeBalancer` per Service, labelled from the Service UID
//! - One `NodeBalancer` config per Service port, with tcp, http or https
//!   chosen through annotations
//! - One backend node per cluster node, addressed `internalIP:nodePort`
//! - TLS certificates for https ports read from `kubernetes.io/tls` Secrets
//! - Updates converge in place so unaffected configs and backends keep their IDs
//!
//! ## Modules
//!
//! - [`loadbalancers`] - Query, ensure, update and delete of `NodeBalancers`
//! - [`linode`] - Linode API v4 client for the `NodeBalancer` endpoints
//! - [`secrets`] - Secret lookup for TLS material
//! - [`reconcilers`] - kube-runtime reconciler for `Service` objects
//! - [`config`] - Command-line and environment configuration
//! - [`metrics`] - Prometheus metrics
//!
//! ## Annotations
//!
//! | Annotation | Meaning |
//! |---|---|
//! | `service.beta.kubernetes.io/linode-loadbalancer-throttle` | Connections per second per client IP, 0-20 (default 20) |
//! | `service.beta.kubernetes.io/linode-loadbalancer-default-protocol` | Protocol for ports without their own setting |
//! | `service.beta.kubernetes.io/linode-loadbalancer-port-<port>` | JSON `{"protocol": ..., "tls-secret-name": ...}` |
//! | `service.beta.kubernetes.io/linode-loadbalancer-check-type` | `connection` or `http` |
//!
//! ## Example
//!
//! ```rust,no_run
//! use linode_lb::linode::LinodeClient;
//! use linode_lb::loadbalancers::LoadBalancers;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(service: k8s_openapi::api::core::v1::Service) -> anyhow::Result<()> {
//! let kube = kube::Client::try_default().await?;
//! let lbs = LoadBalancers::new(
//!     Arc::new(LinodeClient::new("https://api.linode.com", "token")),
//!     Arc::new(kube),
//!     "us-east",
//! );
//!
//! lbs.ensure_load_balancer_deleted(&CancellationToken::new(), "kubernetes", &service)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod errors;
pub mod linode;
pub mod loadbalancers;
pub mod metrics;
pub mod reconcilers;
pub mod secrets;

#[cfg(test)]
mod errors_tests;
#[cfg(test)]
mod secrets_tests;
