// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared builders for Services, Nodes and Secrets used by the unit tests.

use k8s_openapi::api::core::v1::{
    Node, NodeAddress, NodeStatus, Secret, Service, ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use std::collections::BTreeMap;

pub const TEST_NAMESPACE: &str = "test";
pub const TEST_UID: &str = "foobar123";

/// TCP service port `port` forwarded to `node_port`.
pub fn service_port(name: &str, port: i32, node_port: i32) -> ServicePort {
    ServicePort {
        name: Some(name.to_string()),
        protocol: Some("TCP".to_string()),
        port,
        node_port: Some(node_port),
        ..Default::default()
    }
}

/// `LoadBalancer` Service with the given identity, annotations and ports.
pub fn service(name: &str, uid: &str, annotations: &[(&str, &str)], ports: Vec<ServicePort>) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(TEST_NAMESPACE.to_string()),
            uid: Some(uid.to_string()),
            annotations: Some(
                annotations
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            ),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some("LoadBalancer".to_string()),
            ports: Some(ports),
            ..Default::default()
        }),
        status: None,
    }
}

/// Single-port Service carrying only `annotations`.
pub fn annotated_service(annotations: &[(&str, &str)]) -> Service {
    service(
        "test",
        "abc123",
        annotations,
        vec![service_port("test", 80, 30000)],
    )
}

/// Replace every annotation of `svc`.
pub fn set_annotations(svc: &mut Service, annotations: &[(&str, &str)]) {
    svc.metadata.annotations = Some(
        annotations
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect(),
    );
}

/// Append a port to `svc`.
pub fn add_port(svc: &mut Service, port: ServicePort) {
    if let Some(spec) = svc.spec.as_mut() {
        spec.ports.get_or_insert_with(Vec::new).push(port);
    }
}

/// Node with a single address of the given type.
pub fn node_with_address(name: &str, address_type: &str, address: &str) -> Node {
    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        status: Some(NodeStatus {
            addresses: Some(vec![NodeAddress {
                type_: address_type.to_string(),
                address: address.to_string(),
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Node with an internal IP.
pub fn node(name: &str, ip: &str) -> Node {
    node_with_address(name, "InternalIP", ip)
}

/// Node that has not reported any address yet.
pub fn node_without_address(name: &str) -> Node {
    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// `kubernetes.io/tls` Secret in the test namespace.
pub fn tls_secret(name: &str, cert: &str, key: &str) -> Secret {
    let mut data = BTreeMap::new();
    data.insert("tls.crt".to_string(), ByteString(cert.as_bytes().to_vec()));
    data.insert("tls.key".to_string(), ByteString(key.as_bytes().to_vec()));
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(TEST_NAMESPACE.to_string()),
            ..Default::default()
        },
        data: Some(data),
        type_: Some("kubernetes.io/tls".to_string()),
        ..Default::default()
    }
}
