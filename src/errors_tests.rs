// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `errors.rs`

#[cfg(test)]
mod tests {
    use crate::errors::LoadBalancerError;
    use crate::linode::LinodeError;

    fn api_error(status: u16) -> LinodeError {
        LinodeError::Api {
            status,
            method: "GET".into(),
            url: "https://api.linode.com/v4/nodebalancers/1".into(),
            message: "Not found".into(),
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            LoadBalancerError::InvalidProtocol("udp".into()).to_string(),
            "invalid protocol: \"udp\" specified"
        );
        assert_eq!(
            LoadBalancerError::InvalidHealthCheckType {
                value: "ping".into(),
                annotation: "service.beta.kubernetes.io/linode-loadbalancer-check-type".into(),
            }
            .to_string(),
            "invalid health check type: \"ping\" specified in annotation: \
             \"service.beta.kubernetes.io/linode-loadbalancer-check-type\""
        );
        assert_eq!(
            LoadBalancerError::MissingTlsSecretName { port: 443 }.to_string(),
            "TLS secret name for port 443 is not specified"
        );
        assert_eq!(
            LoadBalancerError::SecretNotFound {
                namespace: "default".into(),
                name: "tls".into(),
            }
            .to_string(),
            "secrets \"tls\" not found"
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(LoadBalancerError::LoadBalancerNotFound { name: "a1".into() }.is_not_found());
        assert!(LoadBalancerError::SecretNotFound {
            namespace: "default".into(),
            name: "tls".into(),
        }
        .is_not_found());
        assert!(LoadBalancerError::from(api_error(404)).is_not_found());
        assert!(!LoadBalancerError::from(api_error(500)).is_not_found());
        assert!(!LoadBalancerError::Cancelled.is_not_found());
    }

    #[test]
    fn test_is_validation() {
        assert!(LoadBalancerError::InvalidProtocol("udp".into()).is_validation());
        assert!(LoadBalancerError::MissingTlsSecretName { port: 443 }.is_validation());
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(LoadBalancerError::from(json_err).is_validation());
        assert!(!LoadBalancerError::from(api_error(400)).is_validation());
        assert!(!LoadBalancerError::Cancelled.is_validation());
    }

    #[test]
    fn test_reason() {
        assert_eq!(
            LoadBalancerError::InvalidProtocol("udp".into()).reason(),
            "InvalidProtocol"
        );
        assert_eq!(LoadBalancerError::from(api_error(404)).reason(), "LinodeNotFound");
        assert_eq!(LoadBalancerError::from(api_error(502)).reason(), "LinodeApiError");
        assert_eq!(LoadBalancerError::Cancelled.reason(), "Cancelled");
    }
}
