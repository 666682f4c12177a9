// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Wire types for the Linode `NodeBalancer` API (v4).
//!
//! Response types tolerate unknown fields so newer API versions keep decoding.
//! Request types skip unset optional fields so the API applies its own defaults.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol spoken by a `NodeBalancer` config towards clients.
///
/// `Unknown` covers protocols this controller never requests (e.g. a `udp`
/// config created out-of-band); such configs are converged like any other
/// mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Http,
    Https,
    #[serde(other)]
    Unknown,
}

impl Protocol {
    /// Parse an already lower-cased protocol name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tcp" => Some(Self::Tcp),
            "http" => Some(Self::Http),
            "https" => Some(Self::Https),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Http => "http",
            Self::Https => "https",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health check performed by a `NodeBalancer` config against its nodes.
///
/// Only `Connection` and `Http` can be requested through annotations; the
/// remaining variants exist so configs created out-of-band still decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigCheck {
    None,
    Connection,
    Http,
    HttpBody,
}

impl ConfigCheck {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Connection => "connection",
            Self::Http => "http",
            Self::HttpBody => "http_body",
        }
    }
}

impl fmt::Display for ConfigCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PEM private key that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivateKey(pub String);

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// A `NodeBalancer` as returned by `GET /v4/nodebalancers/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeBalancer {
    pub id: i64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ipv4: Option<String>,
    #[serde(default)]
    pub ipv6: Option<String>,
    #[serde(default)]
    pub client_conn_throttle: i32,
}

/// A per-port config of a `NodeBalancer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeBalancerConfig {
    pub id: i64,
    pub port: i32,
    pub protocol: Protocol,
    pub check: ConfigCheck,
    /// PEM certificate; the API never returns the private key.
    #[serde(default)]
    pub ssl_cert: Option<String>,
    #[serde(default)]
    pub nodebalancer_id: i64,
}

/// A backend registered under a `NodeBalancer` config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeBalancerNode {
    pub id: i64,
    /// `ip:port` of the backend
    pub address: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub config_id: i64,
    #[serde(default)]
    pub nodebalancer_id: i64,
}

/// Body of `POST /v4/nodebalancers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeBalancerCreateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_conn_throttle: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<NodeBalancerConfigCreateOptions>,
}

/// Body of `PUT /v4/nodebalancers/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeBalancerUpdateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_conn_throttle: Option<i32>,
}

/// Body of `POST /v4/nodebalancers/{id}/configs`, also embedded in the
/// `NodeBalancer` create body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeBalancerConfigCreateOptions {
    pub port: i32,
    pub protocol: Protocol,
    pub check: ConfigCheck,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_cert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_key: Option<PrivateKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeBalancerNodeCreateOptions>,
}

/// Body of `PUT /v4/nodebalancers/{id}/configs/{config_id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeBalancerConfigUpdateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<ConfigCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_cert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_key: Option<PrivateKey>,
}

impl NodeBalancerConfigUpdateOptions {
    /// True when the update would not change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Body of `POST /v4/nodebalancers/{id}/configs/{config_id}/nodes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeBalancerNodeCreateOptions {
    /// `ip:port` of the backend
    pub address: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
}

/// One page of a Linode list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "first_page")]
    pub pages: u32,
    #[serde(default)]
    pub results: u32,
}

fn first_page() -> u32 {
    1
}

/// Error body returned by the Linode API on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorEntry {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub field: Option<String>,
}

impl ApiErrorBody {
    /// Join the reported reasons into one message, prefixing field names.
    #[must_use]
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(|e| match &e.field {
                Some(field) => format!("[{field}] {}", e.reason),
                None => e.reason.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}
