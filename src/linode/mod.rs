// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Linode `NodeBalancer` API client.
//!
//! The reconciliation engine talks to the cloud through the [`NodeBalancerApi`]
//! trait. [`LinodeClient`] is the production implementation over `reqwest`;
//! tests substitute an in-memory implementation.
//!
//! # Example
//!
//! ```rust,no_run
//! use linode_lb::linode::{LinodeClient, NodeBalancerApi};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = LinodeClient::new("https://api.linode.com", "my-token");
//! let balancers = client.list_node_balancers(Some("a1b2c3")).await?;
//! println!("found {} balancers", balancers.len());
//! # Ok(())
//! # }
//! ```

pub mod request;
pub mod types;


pub use types::{
    ConfigCheck, NodeBalancer, NodeBalancerConfig, NodeBalancerConfigCreateOptions,
    NodeBalancerConfigUpdateOptions, NodeBalancerCreateOptions, NodeBalancerNode,
    NodeBalancerNodeCreateOptions, NodeBalancerUpdateOptions, PrivateKey, Protocol,
};

use crate::constants::LINODE_API_VERSION;
use reqwest::{Client as HttpClient, Method};
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by the Linode API client.
#[derive(Error, Debug)]
pub enum LinodeError {
    /// The API answered with a non-2xx status
    #[error("Linode API {method} {url} failed with HTTP {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// HTTP method of the failed request
        method: String,
        /// URL of the failed request
        url: String,
        /// Reasons reported by the API, or the raw body
        message: String,
    },

    /// The request never produced a response (connection refused, TLS, timeout)
    #[error("Failed to send HTTP request to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON
    #[error("Failed to decode Linode API response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LinodeError {
    /// HTTP status code of an API error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the API reported that the addressed object does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Operations on `NodeBalancer`s, their configs and their nodes.
///
/// Implementations must be safe to share between concurrent reconciliations
/// of different Services.
#[async_trait::async_trait]
pub trait NodeBalancerApi: Send + Sync {
    /// List `NodeBalancer`s, optionally filtered by exact label.
    async fn list_node_balancers(&self, label: Option<&str>)
        -> Result<Vec<NodeBalancer>, LinodeError>;

    async fn get_node_balancer(&self, id: i64) -> Result<NodeBalancer, LinodeError>;

    async fn create_node_balancer(
        &self,
        opts: &NodeBalancerCreateOptions,
    ) -> Result<NodeBalancer, LinodeError>;

    async fn update_node_balancer(
        &self,
        id: i64,
        opts: &NodeBalancerUpdateOptions,
    ) -> Result<NodeBalancer, LinodeError>;

    async fn delete_node_balancer(&self, id: i64) -> Result<(), LinodeError>;

    async fn list_configs(&self, nb_id: i64) -> Result<Vec<NodeBalancerConfig>, LinodeError>;

    async fn create_config(
        &self,
        nb_id: i64,
        opts: &NodeBalancerConfigCreateOptions,
    ) -> Result<NodeBalancerConfig, LinodeError>;

    async fn update_config(
        &self,
        nb_id: i64,
        config_id: i64,
        opts: &NodeBalancerConfigUpdateOptions,
    ) -> Result<NodeBalancerConfig, LinodeError>;

    async fn delete_config(&self, nb_id: i64, config_id: i64) -> Result<(), LinodeError>;

    async fn list_nodes(
        &self,
        nb_id: i64,
        config_id: i64,
    ) -> Result<Vec<NodeBalancerNode>, LinodeError>;

    async fn create_node(
        &self,
        nb_id: i64,
        config_id: i64,
        opts: &NodeBalancerNodeCreateOptions,
    ) -> Result<NodeBalancerNode, LinodeError>;

    async fn delete_node(&self, nb_id: i64, config_id: i64, node_id: i64)
        -> Result<(), LinodeError>;
}

/// Linode API v4 client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct LinodeClient {
    /// HTTP client for API requests
    client: Arc<HttpClient>,
    /// Personal access token
    token: Arc<String>,
    /// Base URL including the API version, without trailing slash
    base_url: String,
}

impl LinodeClient {
    /// Create a client for the given endpoint and token.
    #[must_use]
    pub fn new(endpoint: &str, token: &str) -> Self {
        Self::with_http_client(HttpClient::new(), endpoint, token)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(client: HttpClient, endpoint: &str, token: &str) -> Self {
        Self {
            client: Arc::new(client),
            token: Arc::new(token.to_string()),
            base_url: format!("{}/{LINODE_API_VERSION}", request::build_api_url(endpoint)),
        }
    }

    /// Base URL requests are issued against, e.g. `https://api.linode.com/v4`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn node_balancers_url(&self) -> String {
        format!("{}/nodebalancers", self.base_url)
    }

    fn node_balancer_url(&self, id: i64) -> String {
        format!("{}/nodebalancers/{id}", self.base_url)
    }

    fn configs_url(&self, nb_id: i64) -> String {
        format!("{}/configs", self.node_balancer_url(nb_id))
    }

    fn config_url(&self, nb_id: i64, config_id: i64) -> String {
        format!("{}/{config_id}", self.configs_url(nb_id))
    }

    fn nodes_url(&self, nb_id: i64, config_id: i64) -> String {
        format!("{}/nodes", self.config_url(nb_id, config_id))
    }

    async fn delete(&self, url: &str) -> Result<(), LinodeError> {
        request::linode_request(&self.client, &self.token, Method::DELETE, url, None, None::<&()>)
            .await
            .map(|_| ())
    }
}

#[async_trait::async_trait]
impl NodeBalancerApi for LinodeClient {
    async fn list_node_balancers(
        &self,
        label: Option<&str>,
    ) -> Result<Vec<NodeBalancer>, LinodeError> {
        let filter = label.map(|l| serde_json::json!({ "label": l }).to_string());
        request::list_all(
            &self.client,
            &self.token,
            &self.node_balancers_url(),
            filter.as_deref(),
        )
        .await
    }

    async fn get_node_balancer(&self, id: i64) -> Result<NodeBalancer, LinodeError> {
        request::linode_json(
            &self.client,
            &self.token,
            Method::GET,
            &self.node_balancer_url(id),
            None::<&()>,
        )
        .await
    }

    async fn create_node_balancer(
        &self,
        opts: &NodeBalancerCreateOptions,
    ) -> Result<NodeBalancer, LinodeError> {
        request::linode_json(
            &self.client,
            &self.token,
            Method::POST,
            &self.node_balancers_url(),
            Some(opts),
        )
        .await
    }

    async fn update_node_balancer(
        &self,
        id: i64,
        opts: &NodeBalancerUpdateOptions,
    ) -> Result<NodeBalancer, LinodeError> {
        request::linode_json(
            &self.client,
            &self.token,
            Method::PUT,
            &self.node_balancer_url(id),
            Some(opts),
        )
        .await
    }

    async fn delete_node_balancer(&self, id: i64) -> Result<(), LinodeError> {
        self.delete(&self.node_balancer_url(id)).await
    }

    async fn list_configs(&self, nb_id: i64) -> Result<Vec<NodeBalancerConfig>, LinodeError> {
        request::list_all(&self.client, &self.token, &self.configs_url(nb_id), None).await
    }

    async fn create_config(
        &self,
        nb_id: i64,
        opts: &NodeBalancerConfigCreateOptions,
    ) -> Result<NodeBalancerConfig, LinodeError> {
        request::linode_json(
            &self.client,
            &self.token,
            Method::POST,
            &self.configs_url(nb_id),
            Some(opts),
        )
        .await
    }

    async fn update_config(
        &self,
        nb_id: i64,
        config_id: i64,
        opts: &NodeBalancerConfigUpdateOptions,
    ) -> Result<NodeBalancerConfig, LinodeError> {
        request::linode_json(
            &self.client,
            &self.token,
            Method::PUT,
            &self.config_url(nb_id, config_id),
            Some(opts),
        )
        .await
    }

    async fn delete_config(&self, nb_id: i64, config_id: i64) -> Result<(), LinodeError> {
        self.delete(&self.config_url(nb_id, config_id)).await
    }

    async fn list_nodes(
        &self,
        nb_id: i64,
        config_id: i64,
    ) -> Result<Vec<NodeBalancerNode>, LinodeError> {
        request::list_all(
            &self.client,
            &self.token,
            &self.nodes_url(nb_id, config_id),
            None,
        )
        .await
    }

    async fn create_node(
        &self,
        nb_id: i64,
        config_id: i64,
        opts: &NodeBalancerNodeCreateOptions,
    ) -> Result<NodeBalancerNode, LinodeError> {
        request::linode_json(
            &self.client,
            &self.token,
            Method::POST,
            &self.nodes_url(nb_id, config_id),
            Some(opts),
        )
        .await
    }

    async fn delete_node(
        &self,
        nb_id: i64,
        config_id: i64,
        node_id: i64,
    ) -> Result<(), LinodeError> {
        self.delete(&format!("{}/{node_id}", self.nodes_url(nb_id, config_id)))
            .await
    }
}
