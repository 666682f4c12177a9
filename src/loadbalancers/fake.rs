// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory `NodeBalancerApi` used by the engine tests.
//!
//! Behaves like the Linode API for the endpoints the engine uses and records
//! every call so tests can assert which writes were issued.

use crate::constants::LINODE_REDACTED_CERT;
use crate::linode::{
    LinodeError, NodeBalancer, NodeBalancerApi, NodeBalancerConfig,
    NodeBalancerConfigCreateOptions, NodeBalancerConfigUpdateOptions, NodeBalancerCreateOptions,
    NodeBalancerNode, NodeBalancerNodeCreateOptions, NodeBalancerUpdateOptions,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    next_id: i64,
    balancers: BTreeMap<i64, NodeBalancer>,
    configs: BTreeMap<i64, NodeBalancerConfig>,
    nodes: BTreeMap<i64, NodeBalancerNode>,
    calls: Vec<String>,
}

impl State {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_config(
        &mut self,
        nb_id: i64,
        opts: &NodeBalancerConfigCreateOptions,
    ) -> NodeBalancerConfig {
        let config = NodeBalancerConfig {
            id: self.id(),
            port: opts.port,
            protocol: opts.protocol,
            check: opts.check,
            ssl_cert: opts.ssl_cert.as_ref().map(|_| LINODE_REDACTED_CERT.to_string()),
            nodebalancer_id: nb_id,
        };
        self.configs.insert(config.id, config.clone());
        for node in &opts.nodes {
            self.insert_node(nb_id, config.id, node);
        }
        config
    }

    fn insert_node(
        &mut self,
        nb_id: i64,
        config_id: i64,
        opts: &NodeBalancerNodeCreateOptions,
    ) -> NodeBalancerNode {
        let node = NodeBalancerNode {
            id: self.id(),
            address: opts.address.clone(),
            label: opts.label.clone(),
            status: Some("Unknown".into()),
            config_id,
            nodebalancer_id: nb_id,
        };
        self.nodes.insert(node.id, node.clone());
        node
    }
}

fn not_found(url: String) -> LinodeError {
    LinodeError::Api {
        status: 404,
        method: "GET".into(),
        url,
        message: "Not found".into(),
    }
}

#[derive(Default)]
pub struct FakeLinode {
    state: Mutex<State>,
    lose_delete_race: AtomicBool,
}

impl FakeLinode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `delete_node_balancer` remove the balancer but answer 404,
    /// as if another actor deleted it first.
    pub fn lose_next_delete_race(&self) {
        self.lose_delete_race.store(true, Ordering::SeqCst);
    }

    /// Every call made so far, e.g. `"create_config:1"`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls that mutate state.
    pub fn writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| {
                c.starts_with("create") || c.starts_with("update") || c.starts_with("delete")
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn balancer_by_label(&self, label: &str) -> Option<NodeBalancer> {
        self.state
            .lock()
            .unwrap()
            .balancers
            .values()
            .find(|nb| nb.label.as_deref() == Some(label))
            .cloned()
    }

    pub fn balancer_count(&self) -> usize {
        self.state.lock().unwrap().balancers.len()
    }

    /// Configs of `nb_id`, ordered by port.
    pub fn configs_of(&self, nb_id: i64) -> Vec<NodeBalancerConfig> {
        let mut configs: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .configs
            .values()
            .filter(|c| c.nodebalancer_id == nb_id)
            .cloned()
            .collect();
        configs.sort_by_key(|c| c.port);
        configs
    }

    /// Node addresses of `config_id`, sorted.
    pub fn node_addresses(&self, config_id: i64) -> Vec<String> {
        let mut addresses: Vec<_> = self
            .nodes_of(config_id)
            .into_iter()
            .map(|n| n.address)
            .collect();
        addresses.sort();
        addresses
    }

    pub fn nodes_of(&self, config_id: i64) -> Vec<NodeBalancerNode> {
        self.state
            .lock()
            .unwrap()
            .nodes
            .values()
            .filter(|n| n.config_id == config_id)
            .cloned()
            .collect()
    }

    /// Register a backend directly, bypassing the engine.
    pub fn seed_node(&self, nb_id: i64, config_id: i64, address: &str) -> NodeBalancerNode {
        self.state.lock().unwrap().insert_node(
            nb_id,
            config_id,
            &NodeBalancerNodeCreateOptions {
                address: address.into(),
                label: "seeded".into(),
                weight: None,
            },
        )
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait::async_trait]
impl NodeBalancerApi for FakeLinode {
    async fn list_node_balancers(
        &self,
        label: Option<&str>,
    ) -> Result<Vec<NodeBalancer>, LinodeError> {
        self.record("list_node_balancers".into());
        let state = self.state.lock().unwrap();
        Ok(state
            .balancers
            .values()
            .filter(|nb| label.is_none() || nb.label.as_deref() == label)
            .cloned()
            .collect())
    }

    async fn get_node_balancer(&self, id: i64) -> Result<NodeBalancer, LinodeError> {
        self.record(format!("get_node_balancer:{id}"));
        self.state
            .lock()
            .unwrap()
            .balancers
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(format!("/nodebalancers/{id}")))
    }

    async fn create_node_balancer(
        &self,
        opts: &NodeBalancerCreateOptions,
    ) -> Result<NodeBalancer, LinodeError> {
        self.record("create_node_balancer".into());
        let mut state = self.state.lock().unwrap();
        let id = state.id();
        let nb = NodeBalancer {
            id,
            label: opts.label.clone(),
            region: opts.region.clone(),
            hostname: Some(format!("nb-{id}.nodebalancer.linode.com")),
            ipv4: Some(format!("192.0.2.{id}")),
            ipv6: None,
            client_conn_throttle: opts.client_conn_throttle.unwrap_or(0),
        };
        state.balancers.insert(id, nb.clone());
        for config in &opts.configs {
            state.insert_config(id, config);
        }
        Ok(nb)
    }

    async fn update_node_balancer(
        &self,
        id: i64,
        opts: &NodeBalancerUpdateOptions,
    ) -> Result<NodeBalancer, LinodeError> {
        self.record(format!("update_node_balancer:{id}"));
        let mut state = self.state.lock().unwrap();
        let nb = state
            .balancers
            .get_mut(&id)
            .ok_or_else(|| not_found(format!("/nodebalancers/{id}")))?;
        if let Some(label) = &opts.label {
            nb.label = Some(label.clone());
        }
        if let Some(throttle) = opts.client_conn_throttle {
            nb.client_conn_throttle = throttle;
        }
        Ok(nb.clone())
    }

    async fn delete_node_balancer(&self, id: i64) -> Result<(), LinodeError> {
        self.record(format!("delete_node_balancer:{id}"));
        let mut state = self.state.lock().unwrap();
        if state.balancers.remove(&id).is_none() {
            return Err(not_found(format!("/nodebalancers/{id}")));
        }
        state.configs.retain(|_, c| c.nodebalancer_id != id);
        state.nodes.retain(|_, n| n.nodebalancer_id != id);
        if self.lose_delete_race.swap(false, Ordering::SeqCst) {
            return Err(not_found(format!("/nodebalancers/{id}")));
        }
        Ok(())
    }

    async fn list_configs(&self, nb_id: i64) -> Result<Vec<NodeBalancerConfig>, LinodeError> {
        self.record(format!("list_configs:{nb_id}"));
        Ok(self.configs_of(nb_id))
    }

    async fn create_config(
        &self,
        nb_id: i64,
        opts: &NodeBalancerConfigCreateOptions,
    ) -> Result<NodeBalancerConfig, LinodeError> {
        self.record(format!("create_config:{}", opts.port));
        let mut state = self.state.lock().unwrap();
        if !state.balancers.contains_key(&nb_id) {
            return Err(not_found(format!("/nodebalancers/{nb_id}")));
        }
        Ok(state.insert_config(nb_id, opts))
    }

    async fn update_config(
        &self,
        _nb_id: i64,
        config_id: i64,
        opts: &NodeBalancerConfigUpdateOptions,
    ) -> Result<NodeBalancerConfig, LinodeError> {
        self.record(format!("update_config:{config_id}"));
        let mut state = self.state.lock().unwrap();
        let config = state
            .configs
            .get_mut(&config_id)
            .ok_or_else(|| not_found(format!("/configs/{config_id}")))?;
        if let Some(protocol) = opts.protocol {
            config.protocol = protocol;
        }
        if let Some(check) = opts.check {
            config.check = check;
        }
        if opts.ssl_cert.is_some() {
            config.ssl_cert = Some(LINODE_REDACTED_CERT.to_string());
        }
        Ok(config.clone())
    }

    async fn delete_config(&self, _nb_id: i64, config_id: i64) -> Result<(), LinodeError> {
        self.record(format!("delete_config:{config_id}"));
        let mut state = self.state.lock().unwrap();
        if state.configs.remove(&config_id).is_none() {
            return Err(not_found(format!("/configs/{config_id}")));
        }
        state.nodes.retain(|_, n| n.config_id != config_id);
        Ok(())
    }

    async fn list_nodes(
        &self,
        _nb_id: i64,
        config_id: i64,
    ) -> Result<Vec<NodeBalancerNode>, LinodeError> {
        self.record(format!("list_nodes:{config_id}"));
        Ok(self.nodes_of(config_id))
    }

    async fn create_node(
        &self,
        nb_id: i64,
        config_id: i64,
        opts: &NodeBalancerNodeCreateOptions,
    ) -> Result<NodeBalancerNode, LinodeError> {
        self.record(format!("create_node:{}", opts.address));
        let mut state = self.state.lock().unwrap();
        if !state.configs.contains_key(&config_id) {
            return Err(not_found(format!("/configs/{config_id}")));
        }
        Ok(state.insert_node(nb_id, config_id, opts))
    }

    async fn delete_node(
        &self,
        _nb_id: i64,
        _config_id: i64,
        node_id: i64,
    ) -> Result<(), LinodeError> {
        self.record(format!("delete_node:{node_id}"));
        self.state
            .lock()
            .unwrap()
            .nodes
            .remove(&node_id)
            .map(|_| ())
            .ok_or_else(|| not_found(format!("/nodes/{node_id}")))
    }
}

/// Engine in `us-west` backed by `fake` and `secrets`.
pub fn load_balancers(
    fake: &std::sync::Arc<FakeLinode>,
    secrets: crate::secrets::StaticSecretStore,
) -> crate::loadbalancers::LoadBalancers {
    crate::loadbalancers::LoadBalancers::new(
        fake.clone(),
        std::sync::Arc::new(secrets),
        "us-west",
    )
}
