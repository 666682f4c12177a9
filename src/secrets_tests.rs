// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `secrets.rs`

#[cfg(test)]
mod tests {
    use crate::errors::LoadBalancerError;
    use crate::secrets::{SecretStore, StaticSecretStore};
    use k8s_openapi::api::core::v1::Secret;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn secret(namespace: &str, name: &str) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_static_store_lookup() {
        let store = StaticSecretStore::new()
            .with_secret(secret("default", "tls"))
            .with_secret(secret("prod", "tls"));

        let found = store.get_secret("prod", "tls").await.unwrap();
        assert_eq!(found.metadata.namespace.as_deref(), Some("prod"));
    }

    #[tokio::test]
    async fn test_static_store_missing() {
        let store = StaticSecretStore::new().with_secret(secret("default", "tls"));

        let err = store.get_secret("default", "other").await.unwrap_err();
        assert!(matches!(
            err,
            LoadBalancerError::SecretNotFound { ref namespace, ref name }
                if namespace == "default" && name == "other"
        ));
    }
}
