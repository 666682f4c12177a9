// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Backend address resolution for cluster nodes.

use crate::constants::{MAX_NODE_LABEL_LEN, NODE_INTERNAL_IP};
use k8s_openapi::api::core::v1::Node;

/// First `InternalIP` address of `node`.
///
/// `None` means the node is not routable yet; it is skipped as a backend.
#[must_use]
pub fn node_internal_ip(node: &Node) -> Option<String> {
    node.status
        .as_ref()
        .and_then(|status| status.addresses.as_ref())
        .and_then(|addresses| {
            addresses
                .iter()
                .find(|addr| addr.type_ == NODE_INTERNAL_IP)
                .map(|addr| addr.address.clone())
        })
        .filter(|address| !address.is_empty())
}

/// `NodeBalancer` node label for `node`: its name, or `fallback` when unnamed,
/// cut to the API's label limit.
#[must_use]
pub fn node_label(node: &Node, fallback: &str) -> String {
    let label = node
        .metadata
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback);
    label.chars().take(MAX_NODE_LABEL_LEN).collect()
}
