// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed access to the load balancer annotations on a Service.

use crate::constants::{
    ANN_CHECK_TYPE, ANN_PORT_CONFIG_PREFIX, ANN_THROTTLE, DEFAULT_CONN_THROTTLE,
    MAX_CONN_THROTTLE, MIN_CONN_THROTTLE,
};
use crate::errors::{LoadBalancerError, Result};
use crate::linode::ConfigCheck;
use k8s_openapi::api::core::v1::Service;
use serde::Deserialize;

/// Per-port override read from `<prefix><port>`.
///
/// Unknown JSON fields are ignored so newer annotation formats still parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PortConfigAnnotation {
    #[serde(rename = "tls-secret-name", default)]
    pub tls_secret_name: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
}

/// Value of annotation `key`, if set.
pub(crate) fn annotation<'a>(service: &'a Service, key: &str) -> Option<&'a str> {
    service
        .metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(key))
        .map(String::as_str)
}

/// Annotation key of the per-port override for `port`.
#[must_use]
pub fn port_config_annotation_key(port: i32) -> String {
    format!("{ANN_PORT_CONFIG_PREFIX}{port}")
}

/// Client connection throttle requested by the Service.
///
/// Absent or non-integer values yield the default of 20; integers are clamped
/// to `0..=20`. Never fails.
#[must_use]
pub fn connection_throttle(service: &Service) -> i32 {
    let Some(value) = annotation(service, ANN_THROTTLE) else {
        return DEFAULT_CONN_THROTTLE;
    };
    match value.parse::<i64>() {
        Ok(value) => {
            let clamped = value.clamp(i64::from(MIN_CONN_THROTTLE), i64::from(MAX_CONN_THROTTLE));
            i32::try_from(clamped).unwrap_or(DEFAULT_CONN_THROTTLE)
        }
        // Integers beyond i64 still clamp by sign.
        Err(_) if is_negative_integer(value) => MIN_CONN_THROTTLE,
        Err(_) => DEFAULT_CONN_THROTTLE,
    }
}

fn is_negative_integer(value: &str) -> bool {
    value
        .strip_prefix('-')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Health check type requested by the Service, `connection` by default.
///
/// # Errors
///
/// Returns `InvalidHealthCheckType` for any value other than `connection` or
/// `http` (case-sensitive).
pub fn health_check_type(service: &Service) -> Result<ConfigCheck> {
    match annotation(service, ANN_CHECK_TYPE) {
        None | Some("") | Some("connection") => Ok(ConfigCheck::Connection),
        Some("http") => Ok(ConfigCheck::Http),
        Some(other) => Err(LoadBalancerError::InvalidHealthCheckType {
            value: other.to_string(),
            annotation: ANN_CHECK_TYPE.to_string(),
        }),
    }
}

/// Per-port override for `port`; the default struct when not annotated.
///
/// # Errors
///
/// Returns the JSON parse error unchanged when the annotation is malformed.
pub fn port_config_annotation(service: &Service, port: i32) -> Result<PortConfigAnnotation> {
    match annotation(service, &port_config_annotation_key(port)) {
        Some(raw) => Ok(serde_json::from_str(raw)?),
        None => Ok(PortConfigAnnotation::default()),
    }
}
