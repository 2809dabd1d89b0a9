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

//! Writer serialization for administrative operations.
//!
//! Changes scoped to one exchange hold the topology guard shared plus that exchange's
//! mutex, so writers on different exchanges proceed in parallel. Queue creation and
//! deletion can touch every exchange and hold the topology guard exclusively.
//! Lock order is always topology guard first, exchange mutex second.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Held for the duration of a single-exchange change.
pub(crate) struct ExchangeWriteGuard<'a> {
    _exchange: OwnedMutexGuard<()>,
    _topology: RwLockReadGuard<'a, ()>,
}

pub(crate) struct WriterLocks {
    topology: RwLock<()>,
    exchanges: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl WriterLocks {
    pub(crate) fn new() -> Self {
        Self {
            topology: RwLock::new(()),
            exchanges: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) async fn exchange_writer(&self, exchange_name: &str) -> ExchangeWriteGuard<'_> {
        let topology = self.topology.read().await;
        let exchange_lock = {
            let mut exchanges = self.exchanges.lock().unwrap_or_else(PoisonError::into_inner);
            exchanges
                .entry(exchange_name.to_string())
                .or_default()
                .clone()
        };
        let exchange = exchange_lock.lock_owned().await;

        ExchangeWriteGuard {
            _exchange: exchange,
            _topology: topology,
        }
    }

    pub(crate) async fn topology_writer(&self) -> RwLockWriteGuard<'_, ()> {
        self.topology.write().await
    }

    /// Drops the mutex of a deleted exchange unless another writer is waiting on it.
    pub(crate) fn release_exchange(&self, exchange_name: &str) {
        let mut exchanges = self.exchanges.lock().unwrap_or_else(PoisonError::into_inner);
        if exchanges
            .get(exchange_name)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            exchanges.remove(exchange_name);
        }
    }

    #[cfg(test)]
    fn tracked_exchanges(&self) -> usize {
        self.exchanges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::WriterLocks;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn writers_on_different_exchanges_do_not_block_each_other() {
        let locks = WriterLocks::new();

        let _orders = locks.exchange_writer("orders").await;
        let invoices = tokio::time::timeout(
            Duration::from_millis(200),
            locks.exchange_writer("invoices"),
        )
        .await;

        assert!(invoices.is_ok());
    }

    #[tokio::test]
    async fn writers_on_the_same_exchange_are_serialized() {
        let locks = WriterLocks::new();

        let _first = locks.exchange_writer("orders").await;
        let second =
            tokio::time::timeout(Duration::from_millis(50), locks.exchange_writer("orders")).await;

        assert!(second.is_err());
    }

    #[tokio::test]
    async fn topology_writer_excludes_exchange_writers() {
        let locks = Arc::new(WriterLocks::new());

        let topology = locks.topology_writer().await;
        let blocked =
            tokio::time::timeout(Duration::from_millis(50), locks.exchange_writer("orders")).await;
        assert!(blocked.is_err());

        drop(topology);
        let admitted =
            tokio::time::timeout(Duration::from_millis(200), locks.exchange_writer("orders")).await;
        assert!(admitted.is_ok());
    }

    #[tokio::test]
    async fn release_exchange_prunes_idle_locks_only() {
        let locks = WriterLocks::new();

        {
            let _writer = locks.exchange_writer("orders").await;
        }
        assert_eq!(locks.tracked_exchanges(), 1);

        locks.release_exchange("orders");
        assert_eq!(locks.tracked_exchanges(), 0);
    }
}
