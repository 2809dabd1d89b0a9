/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Routing-table data model and snapshot owner.
//!
//! [`Topology`] is the validated in-memory model; every insert and removal rule lives here
//! so that runtime administration and startup recovery share one code path.
//! [`RoutingTable`] publishes immutable `Topology` snapshots through `ArcSwap`: publishers
//! load the current snapshot without locking, writers build the next one and swap it in.

use crate::binding::Binding;
use crate::errors::{AdminError, NotFoundError, ValidationError};
use crate::headers::Headers;
use crate::persistence::BindingRecord;
use crate::queue::Queue;
use crate::routing::exchange::Exchange;
use crate::routing::exchange_type::ExchangeType;
use arc_swap::{ArcSwap, Guard};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

const RESERVED_PREFIX: &str = "amq.";

const BUILT_IN_EXCHANGES: [(&str, ExchangeType); 4] = [
    ("amq.direct", ExchangeType::Direct),
    ("amq.topic", ExchangeType::Topic),
    ("amq.fanout", ExchangeType::Fanout),
    ("amq.headers", ExchangeType::Headers),
];

pub(crate) fn is_built_in_exchange(name: &str) -> bool {
    BUILT_IN_EXCHANGES
        .iter()
        .any(|(built_in, _)| *built_in == name)
}

/// Queue together with the bindings removed by its deletion.
pub(crate) struct RemovedQueue {
    pub(crate) queue: Queue,
    pub(crate) bindings: Vec<BindingRecord>,
}

#[derive(Clone)]
pub(crate) struct Topology {
    version: u64,
    exchanges: HashMap<String, Arc<Exchange>>,
    queues: HashMap<String, Queue>,
}

impl Topology {
    /// Creates a topology holding only the built-in exchanges.
    pub(crate) fn with_built_in_exchanges() -> Self {
        let exchanges = BUILT_IN_EXCHANGES
            .iter()
            .filter_map(|(name, exchange_type)| {
                Exchange::new(name, *exchange_type)
                    .ok()
                    .map(|exchange| (name.to_string(), Arc::new(exchange)))
            })
            .collect();

        Self {
            version: 0,
            exchanges,
            queues: HashMap::new(),
        }
    }

    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn exchange(&self, name: &str) -> Option<&Arc<Exchange>> {
        self.exchanges.get(name)
    }

    pub(crate) fn queue(&self, name: &str) -> Option<&Queue> {
        self.queues.get(name)
    }

    pub(crate) fn exchange_names(&self) -> impl Iterator<Item = &str> {
        self.exchanges.keys().map(String::as_str)
    }

    /// Bindings to transient queues are never written to the store.
    pub(crate) fn is_binding_durable(&self, binding: &Binding) -> bool {
        match binding.queue_name() {
            Some(queue_name) => self
                .queues
                .get(queue_name)
                .is_some_and(Queue::is_durable),
            None => true,
        }
    }

    /// Adds a queue. Returns `false` when an identical queue already exists.
    pub(crate) fn add_queue(&mut self, queue: Queue) -> Result<bool, AdminError> {
        if let Some(existing) = self.queues.get(queue.name()) {
            if existing.is_durable() != queue.is_durable() {
                return Err(ValidationError::QueueDurabilityMismatch {
                    queue: queue.name().to_string(),
                    existing: existing.is_durable(),
                }
                .into());
            }
            return Ok(false);
        }
        self.queues.insert(queue.name().to_string(), queue);
        Ok(true)
    }

    /// Removes a queue and cascades to every binding that targets it.
    pub(crate) fn remove_queue(&mut self, name: &str) -> Result<RemovedQueue, AdminError> {
        let queue = self
            .queues
            .remove(name)
            .ok_or_else(|| NotFoundError::Queue(name.to_string()))?;

        let mut bindings = Vec::new();
        for (exchange_name, exchange) in self.exchanges.iter_mut() {
            if !exchange.is_bound_to(name) {
                continue;
            }
            bindings.extend(
                Arc::make_mut(exchange)
                    .remove_bindings_for_queue(name)
                    .into_iter()
                    .map(|binding| BindingRecord::new(exchange_name, binding)),
            );
        }

        Ok(RemovedQueue { queue, bindings })
    }

    /// Adds an exchange. Returns `false` when an exchange of the same type already exists.
    pub(crate) fn add_exchange(
        &mut self,
        name: &str,
        exchange_type: ExchangeType,
    ) -> Result<bool, AdminError> {
        if let Some(existing) = self.exchanges.get(name) {
            if existing.exchange_type() != exchange_type {
                return Err(ValidationError::ExchangeTypeMismatch {
                    exchange: name.to_string(),
                    existing: existing.exchange_type(),
                    requested: exchange_type,
                }
                .into());
            }
            return Ok(false);
        }
        if name.starts_with(RESERVED_PREFIX) {
            return Err(ValidationError::ReservedExchangeName(name.to_string()).into());
        }

        let exchange = Exchange::new(name, exchange_type)?;
        self.exchanges.insert(name.to_string(), Arc::new(exchange));
        Ok(true)
    }

    /// Removes an exchange together with its bindings.
    pub(crate) fn remove_exchange(&mut self, name: &str) -> Result<Arc<Exchange>, AdminError> {
        if is_built_in_exchange(name) {
            return Err(ValidationError::ReservedExchangeName(name.to_string()).into());
        }
        self.exchanges
            .remove(name)
            .ok_or_else(|| NotFoundError::Exchange(name.to_string()).into())
    }

    /// Adds a binding. Returns `false` when the identical binding is already present.
    pub(crate) fn add_binding(
        &mut self,
        exchange_name: &str,
        binding: Binding,
    ) -> Result<bool, AdminError> {
        if let Some(queue_name) = binding.queue_name() {
            if !self.queues.contains_key(queue_name) {
                return Err(ValidationError::UnknownQueue(queue_name.to_string()).into());
            }
        }

        let exchange = self
            .exchanges
            .get_mut(exchange_name)
            .ok_or_else(|| NotFoundError::Exchange(exchange_name.to_string()))?;

        Ok(Arc::make_mut(exchange).add_binding(binding)?)
    }

    /// Removes the binding identified by `(binding_pattern, queue_name)`.
    pub(crate) fn remove_binding(
        &mut self,
        exchange_name: &str,
        binding_pattern: &str,
        queue_name: Option<&str>,
    ) -> Result<Binding, AdminError> {
        let exchange = self
            .exchanges
            .get_mut(exchange_name)
            .ok_or_else(|| NotFoundError::Exchange(exchange_name.to_string()))?;

        if exchange.find_binding(binding_pattern, queue_name).is_none() {
            return Err(NotFoundError::Binding {
                exchange: exchange_name.to_string(),
                binding_pattern: binding_pattern.to_string(),
                queue_name: queue_name.map(str::to_string),
            }
            .into());
        }

        Arc::make_mut(exchange)
            .remove_binding(binding_pattern, queue_name)
            .ok_or_else(|| {
                NotFoundError::Binding {
                    exchange: exchange_name.to_string(),
                    binding_pattern: binding_pattern.to_string(),
                    queue_name: queue_name.map(str::to_string),
                }
                .into()
            })
    }

    pub(crate) fn route(
        &self,
        exchange_name: &str,
        routing_key: &str,
        headers: &Headers,
    ) -> Result<BTreeSet<String>, NotFoundError> {
        self.exchanges
            .get(exchange_name)
            .map(|exchange| exchange.route(routing_key, headers))
            .ok_or_else(|| NotFoundError::Exchange(exchange_name.to_string()))
    }
}

/// Snapshot owner shared by the publish path and administrative writers.
pub(crate) struct RoutingTable {
    snapshot: ArcSwap<Topology>,
    commit_lock: Mutex<()>,
}

impl RoutingTable {
    pub(crate) fn new(topology: Topology) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(topology),
            commit_lock: Mutex::new(()),
        }
    }

    /// Lock-free read of the current snapshot.
    pub(crate) fn load(&self) -> Guard<Arc<Topology>> {
        self.snapshot.load()
    }

    /// Private copy of the current snapshot for validating a change before any I/O.
    pub(crate) fn stage(&self) -> Topology {
        Topology::clone(&self.snapshot.load())
    }

    /// Applies `change` to the latest snapshot and publishes the result.
    ///
    /// Nothing is published when `change` fails. The commit lock only orders concurrent
    /// writers; publishers never take it.
    pub(crate) fn commit<R>(
        &self,
        change: impl FnOnce(&mut Topology) -> Result<R, AdminError>,
    ) -> Result<R, AdminError> {
        let _commit = self
            .commit_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut next = Topology::clone(&self.snapshot.load());
        let outcome = change(&mut next)?;
        next.version += 1;
        self.snapshot.store(Arc::new(next));
        Ok(outcome)
    }

    /// Replaces the whole snapshot, used once when recovery completes.
    pub(crate) fn replace(&self, mut topology: Topology) {
        let _commit = self
            .commit_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        topology.version = self.snapshot.load().version + 1;
        self.snapshot.store(Arc::new(topology));
    }
}

#[cfg(test)]
mod tests {
    use super::{RoutingTable, Topology};
    use crate::binding::Binding;
    use crate::errors::{AdminError, NotFoundError, ValidationError};
    use crate::headers::Headers;
    use crate::queue::Queue;
    use crate::routing::exchange_type::ExchangeType;

    fn topology_with_orders() -> Topology {
        let mut topology = Topology::with_built_in_exchanges();
        topology.add_queue(Queue::new("q1", true).unwrap()).unwrap();
        topology.add_queue(Queue::new("q2", false).unwrap()).unwrap();
        topology.add_exchange("orders", ExchangeType::Topic).unwrap();
        topology
            .add_binding(
                "orders",
                Binding::new("orders.*.created", Some("q1"), None).unwrap(),
            )
            .unwrap();
        topology
            .add_binding("orders", Binding::new("orders.#", Some("q2"), None).unwrap())
            .unwrap();
        topology
    }

    #[test]
    fn built_in_exchanges_exist_and_cannot_be_removed() {
        let mut topology = Topology::with_built_in_exchanges();

        assert_eq!(
            topology.exchange("amq.topic").map(|e| e.exchange_type()),
            Some(ExchangeType::Topic)
        );
        assert!(matches!(
            topology.remove_exchange("amq.topic"),
            Err(AdminError::Validation(ValidationError::ReservedExchangeName(_)))
        ));
        assert!(matches!(
            topology.add_exchange("amq.custom", ExchangeType::Direct),
            Err(AdminError::Validation(ValidationError::ReservedExchangeName(_)))
        ));
        assert!(matches!(topology.add_exchange("amq.topic", ExchangeType::Topic), Ok(false)));
    }

    #[test]
    fn add_exchange_rejects_type_change() {
        let mut topology = topology_with_orders();

        assert!(matches!(
            topology.add_exchange("orders", ExchangeType::Fanout),
            Err(AdminError::Validation(ValidationError::ExchangeTypeMismatch { .. }))
        ));
        assert!(matches!(topology.add_exchange("orders", ExchangeType::Topic), Ok(false)));
    }

    #[test]
    fn add_binding_requires_existing_queue_and_exchange() {
        let mut topology = topology_with_orders();

        assert!(matches!(
            topology.add_binding("orders", Binding::new("x", Some("missing"), None).unwrap()),
            Err(AdminError::Validation(ValidationError::UnknownQueue(_)))
        ));
        assert!(matches!(
            topology.add_binding("missing", Binding::new("x", Some("q1"), None).unwrap()),
            Err(AdminError::NotFound(NotFoundError::Exchange(_)))
        ));
    }

    #[test]
    fn remove_queue_cascades_to_bindings() {
        let mut topology = topology_with_orders();

        let removed = topology.remove_queue("q2").unwrap();

        assert_eq!(removed.queue.name(), "q2");
        assert_eq!(removed.bindings.len(), 1);
        assert_eq!(removed.bindings[0].exchange_name, "orders");
        assert_eq!(
            topology.route("orders", "orders.eu.created", &Headers::new()).unwrap(),
            ["q1".to_string()].into_iter().collect()
        );
    }

    #[test]
    fn binding_durability_follows_target_queue() {
        let topology = topology_with_orders();

        assert!(topology.is_binding_durable(&Binding::new("a", Some("q1"), None).unwrap()));
        assert!(!topology.is_binding_durable(&Binding::new("a", Some("q2"), None).unwrap()));
        assert!(topology.is_binding_durable(&Binding::new("a", None, Some("x = 1")).unwrap()));
    }

    #[test]
    fn staged_changes_are_invisible_until_committed() {
        let table = RoutingTable::new(topology_with_orders());

        let mut staged = table.stage();
        staged
            .remove_binding("orders", "orders.#", Some("q2"))
            .unwrap();
        assert_eq!(
            table.load().exchange("orders").map(|e| e.binding_count()),
            Some(2)
        );

        table
            .commit(|topology| topology.remove_binding("orders", "orders.#", Some("q2")))
            .unwrap();
        assert_eq!(
            table.load().exchange("orders").map(|e| e.binding_count()),
            Some(1)
        );
        assert_eq!(table.load().version(), 1);
    }

    #[test]
    fn failed_commit_publishes_nothing() {
        let table = RoutingTable::new(topology_with_orders());

        let result = table.commit(|topology| {
            topology.remove_binding("orders", "orders.#", Some("q2"))?;
            topology.remove_binding("orders", "missing", Some("q2"))
        });

        assert!(result.is_err());
        assert_eq!(
            table.load().exchange("orders").map(|e| e.binding_count()),
            Some(2)
        );
        assert_eq!(table.load().version(), 0);
    }
}
