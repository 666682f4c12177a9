// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconcilers.
//!
//! The only watched kind is `Service`. Each `type: LoadBalancer` Service is
//! backed by one Linode `NodeBalancer`, kept in sync by
//! [`service::reconcile_service`].
//!
//! # Example
//!
//! ```rust,no_run
//! use linode_lb::context::Context;
//! use linode_lb::reconcilers::reconcile_service;
//! use k8s_openapi::api::core::v1::Service;
//! use std::sync::Arc;
//!
//! async fn handle(service: Arc<Service>, ctx: Arc<Context>) -> anyhow::Result<()> {
//!     let action = reconcile_service(service, ctx).await?;
//!     println!("next: {action:?}");
//!     Ok(())
//! }
//! ```

pub mod finalizers;
pub mod service;


pub use service::{reconcile_service, service_operation, ServiceOperation};
