// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use k8s_openapi::api::core::v1::{
    Node, NodeAddress, NodeStatus, Service, ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use linode_lb::linode::LinodeClient;
use linode_lb::loadbalancers::LoadBalancers;
use linode_lb::secrets::StaticSecretStore;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::MockServer;

pub const TOKEN: &str = "integration-token";
pub const REGION: &str = "us-east";
pub const CLUSTER: &str = "kubernetes";

/// Label the controller derives for a Service with uid `uid`.
pub fn label_for(uid: &str) -> String {
    format!("a{}", uid.replace('-', ""))
}

/// `LoadBalancers` talking to `server`.
pub fn load_balancers(server: &MockServer) -> LoadBalancers {
    LoadBalancers::new(
        Arc::new(LinodeClient::new(&server.uri(), TOKEN)),
        Arc::new(StaticSecretStore::new()),
        REGION,
    )
}

/// A `type: LoadBalancer` Service exposing `(port, node_port)` pairs.
pub fn service(name: &str, uid: &str, ports: &[(i32, i32)]) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            uid: Some(uid.to_string()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some("LoadBalancer".to_string()),
            ports: Some(
                ports
                    .iter()
                    .map(|(port, node_port)| ServicePort {
                        name: Some(format!("p{port}")),
                        protocol: Some("TCP".to_string()),
                        port: *port,
                        node_port: Some(*node_port),
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// A cluster node with a single `InternalIP`.
pub fn node(name: &str, ip: &str) -> Node {
    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        status: Some(NodeStatus {
            addresses: Some(vec![NodeAddress {
                type_: "InternalIP".to_string(),
                address: ip.to_string(),
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// One page of a Linode list response.
pub fn page(data: Vec<Value>) -> Value {
    let results = data.len();
    json!({ "data": data, "page": 1, "pages": 1, "results": results })
}

pub fn nb_json(id: i64, label: &str, throttle: i32) -> Value {
    json!({
        "id": id,
        "label": label,
        "region": REGION,
        "hostname": format!("nb-{id}.newark.nodebalancer.linode.com"),
        "ipv4": format!("192.0.2.{id}"),
        "ipv6": null,
        "client_conn_throttle": throttle
    })
}

pub fn config_json(id: i64, nb_id: i64, port: i32, protocol: &str) -> Value {
    json!({
        "id": id,
        "port": port,
        "protocol": protocol,
        "check": "connection",
        "ssl_cert": null,
        "nodebalancer_id": nb_id
    })
}

pub fn node_json(id: i64, nb_id: i64, config_id: i64, address: &str) -> Value {
    json!({
        "id": id,
        "address": address,
        "label": "node",
        "status": "UP",
        "config_id": config_id,
        "nodebalancer_id": nb_id
    })
}
