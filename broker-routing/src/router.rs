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

use crate::binding::Binding;
use crate::control_plane::lifecycle::AdminLifecycle;
use crate::control_plane::routing_table::{RoutingTable, Topology};
use crate::control_plane::writer_locks::WriterLocks;
use crate::errors::{AdminError, RecoveryError, RouteError};
use crate::headers::Headers;
use crate::observability::{events, fields};
use crate::persistence::DaoSet;
use crate::queue::Queue;
use crate::recovery::loader::RecoveryLoader;
use crate::recovery::state::{RecoveryState, RecoveryStateCell};
use crate::routing::exchange::Exchange;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const COMPONENT: &str = "router";

///
/// [`MessageRouter`] owns one routing table: its exchanges, queues and bindings, the store
/// behind them and the recovery lifecycle.
///
/// A router starts [`RecoveryState::Uninitialized`]. [`MessageRouter::recover`] must
/// complete before any administrative call or [`MessageRouter::route`] is accepted.
///
/// [`MessageRouter::route`] is synchronous and lock-free, so any number of publishers may
/// call it concurrently with administrative changes. Administrative calls are async because
/// they wait on the store.
///
/// Share a router between tasks by wrapping it in an `Arc`.
pub struct MessageRouter {
    name: String,
    daos: DaoSet,
    table: RoutingTable,
    locks: WriterLocks,
    state: RecoveryStateCell,
}

impl MessageRouter {
    /// Creates a router over the given store. The table holds only the built-in exchanges
    /// until [`MessageRouter::recover`] runs.
    pub fn new(name: &str, daos: DaoSet) -> Self {
        debug!(
            component = COMPONENT,
            router = name,
            "router created, awaiting recovery"
        );

        Self {
            name: name.to_string(),
            daos,
            table: RoutingTable::new(Topology::with_built_in_exchanges()),
            locks: WriterLocks::new(),
            state: RecoveryStateCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> RecoveryState {
        self.state.get()
    }

    /// Rebuilds the routing table from the store and moves the router to
    /// [`RecoveryState::Ready`].
    ///
    /// May be triggered once. Any store or validation failure leaves the router
    /// [`RecoveryState::Failed`] for good; the table keeps only the built-in exchanges.
    pub async fn recover(&self) -> Result<(), RecoveryError> {
        if let Err(observed) = self
            .state
            .transition(RecoveryState::Uninitialized, RecoveryState::Loading)
        {
            warn!(
                event = events::RECOVERY_FAILED,
                component = COMPONENT,
                router = self.name.as_str(),
                state = %observed,
                "recovery already triggered"
            );
            return Err(RecoveryError::AlreadyStarted(observed));
        }

        info!(
            event = events::RECOVERY_START,
            component = COMPONENT,
            router = self.name.as_str(),
            "recovering routing table"
        );

        match RecoveryLoader::new(&self.name, &self.daos).load().await {
            Ok(topology) => {
                self.table.replace(topology);
                self.state.set(RecoveryState::Ready);
                Ok(())
            }
            Err(err) => {
                self.state.set(RecoveryState::Failed);
                error!(
                    event = events::RECOVERY_FAILED,
                    component = COMPONENT,
                    router = self.name.as_str(),
                    err = %err,
                    "recovery failed, router will not accept traffic"
                );
                Err(err)
            }
        }
    }

    fn admin(&self) -> Result<AdminLifecycle<'_>, AdminError> {
        match self.state.get() {
            RecoveryState::Ready => Ok(AdminLifecycle::new(
                &self.name,
                &self.table,
                &self.daos,
                &self.locks,
            )),
            state => Err(AdminError::NotReady(state)),
        }
    }

    /// Declares a queue. Only durable queues, and bindings to them, are written to the
    /// store.
    pub async fn create_queue(&self, name: &str, durable: bool) -> Result<(), AdminError> {
        self.admin()?.create_queue(name, durable).await
    }

    /// Deletes a queue and every binding that targets it.
    pub async fn delete_queue(&self, name: &str) -> Result<(), AdminError> {
        self.admin()?.delete_queue(name).await
    }

    /// Declares an exchange. `exchange_type` is one of `direct`, `topic`, `fanout` or
    /// `headers`.
    pub async fn create_exchange(&self, name: &str, exchange_type: &str) -> Result<(), AdminError> {
        self.admin()?.create_exchange(name, exchange_type).await
    }

    /// Deletes an exchange together with its bindings.
    pub async fn delete_exchange(&self, name: &str) -> Result<(), AdminError> {
        self.admin()?.delete_exchange(name).await
    }

    /// Adds a binding to an exchange. The binding is visible to [`MessageRouter::route`]
    /// only after the store accepted it.
    pub async fn bind(&self, exchange_name: &str, binding: Binding) -> Result<(), AdminError> {
        self.admin()?.bind(exchange_name, binding).await
    }

    /// Removes the binding identified by `(binding_pattern, queue_name)`.
    pub async fn unbind(
        &self,
        exchange_name: &str,
        binding_pattern: &str,
        queue_name: Option<&str>,
    ) -> Result<(), AdminError> {
        self.admin()?
            .unbind(exchange_name, binding_pattern, queue_name)
            .await
    }

    /// Returns the set of queues a message published to `exchange_name` with the given
    /// routing key and headers must be delivered to.
    pub fn route(
        &self,
        exchange_name: &str,
        routing_key: &str,
        headers: &Headers,
    ) -> Result<BTreeSet<String>, RouteError> {
        let state = self.state.get();
        if state != RecoveryState::Ready {
            debug!(
                event = events::ROUTE_REJECTED_NOT_READY,
                component = COMPONENT,
                router = self.name.as_str(),
                exchange = exchange_name,
                state = %state,
                "publish rejected"
            );
            return Err(RouteError::NotReady(state));
        }

        match self.table.load().route(exchange_name, routing_key, headers) {
            Ok(queues) => {
                debug!(
                    event = events::ROUTE_DECISION,
                    component = COMPONENT,
                    router = self.name.as_str(),
                    exchange = exchange_name,
                    routing_key,
                    matched = %fields::format_queue_set(&queues),
                    "route decision"
                );
                Ok(queues)
            }
            Err(err) => {
                debug!(
                    event = events::ROUTE_EXCHANGE_MISSING,
                    component = COMPONENT,
                    router = self.name.as_str(),
                    exchange = exchange_name,
                    routing_key,
                    "publish to unknown exchange"
                );
                Err(RouteError::NotFound(err))
            }
        }
    }

    /// Current view of an exchange, including its bindings.
    pub fn exchange(&self, name: &str) -> Option<Arc<Exchange>> {
        self.table.load().exchange(name).cloned()
    }

    pub fn queue(&self, name: &str) -> Option<Queue> {
        self.table.load().queue(name).cloned()
    }

    /// Names of all exchanges, built-ins included, in sorted order.
    pub fn exchange_names(&self) -> Vec<String> {
        let snapshot = self.table.load();
        let mut names: Vec<String> = snapshot.exchange_names().map(str::to_string).collect();
        names.sort_unstable();
        names
    }

    /// Monotonic counter bumped by every published table change.
    pub fn table_version(&self) -> u64 {
        self.table.load().version()
    }
}

#[cfg(test)]
mod tests {
    use super::MessageRouter;
    use crate::errors::{AdminError, DurabilityError, RecoveryError, RouteError};
    use crate::headers::Headers;
    use crate::persistence::{Collector, Dao, DaoSet, Record, RetrieveError};
    use crate::recovery::RecoveryState;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EmptyStore;

    #[async_trait]
    impl<T: Record> Dao<T> for EmptyStore {
        async fn persist(&self, _record: &T) -> Result<(), DurabilityError> {
            Ok(())
        }

        async fn delete(&self, _record: &T) -> Result<(), DurabilityError> {
            Ok(())
        }

        async fn retrieve_all(&self, _collector: &mut dyn Collector<T>) -> Result<(), RetrieveError> {
            Ok(())
        }
    }

    fn router() -> MessageRouter {
        let store = Arc::new(EmptyStore);
        MessageRouter::new("unit", DaoSet::new(store.clone(), store.clone(), store))
    }

    #[tokio::test]
    async fn calls_before_recovery_are_rejected() {
        let router = router();

        assert!(matches!(
            router.create_queue("q1", true).await,
            Err(AdminError::NotReady(RecoveryState::Uninitialized))
        ));
        assert_eq!(
            router.route("amq.direct", "k", &Headers::new()),
            Err(RouteError::NotReady(RecoveryState::Uninitialized))
        );
    }

    #[tokio::test]
    async fn recovery_runs_once() {
        let router = router();

        router.recover().await.unwrap();
        assert_eq!(router.state(), RecoveryState::Ready);
        assert!(matches!(
            router.recover().await,
            Err(RecoveryError::AlreadyStarted(RecoveryState::Ready))
        ));
    }

    #[tokio::test]
    async fn built_in_exchanges_are_listed_after_recovery() {
        let router = router();
        router.recover().await.unwrap();

        assert_eq!(
            router.exchange_names(),
            vec!["amq.direct", "amq.fanout", "amq.headers", "amq.topic"]
        );
        assert!(router
            .route("amq.fanout", "", &Headers::new())
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn every_committed_change_bumps_the_table_version() {
        let router = router();
        router.recover().await.unwrap();
        let recovered = router.table_version();

        router.create_queue("q1", false).await.unwrap();
        router.create_queue("q1", false).await.unwrap();

        assert_eq!(router.table_version(), recovered + 1);
    }
}
