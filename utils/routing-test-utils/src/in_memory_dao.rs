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

use async_trait::async_trait;
use broker_routing::{
    BindingRecord, Collector, Dao, DaoSet, DurabilityError, ExchangeRecord, QueueRecord, Record,
    RetrieveError, StoreOperation,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Faults {
    fail_persist: bool,
    fail_delete: bool,
    fail_retrieve: bool,
    deletes_before_failure: Option<usize>,
}

/// Map-backed [`Dao`] with switchable failures, for exercising commit and recovery paths.
pub struct InMemoryDao<T> {
    records: Mutex<BTreeMap<String, T>>,
    faults: Mutex<Faults>,
    persist_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl<T: Record> Default for InMemoryDao<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> InMemoryDao<T> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            faults: Mutex::new(Faults::default()),
            persist_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    fn records_guard(&self) -> MutexGuard<'_, BTreeMap<String, T>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn faults_guard(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores records directly, bypassing fault injection and call counters.
    pub fn seed(&self, records: impl IntoIterator<Item = T>) {
        let mut stored = self.records_guard();
        for record in records {
            stored.insert(record.record_key(), record);
        }
    }

    pub fn fail_persist(&self, fail: bool) {
        self.faults_guard().fail_persist = fail;
    }

    pub fn fail_delete(&self, fail: bool) {
        self.faults_guard().fail_delete = fail;
        self.faults_guard().deletes_before_failure = None;
    }

    /// Lets the next `count` deletes succeed, then fails every delete after them.
    pub fn fail_delete_after(&self, count: usize) {
        let mut faults = self.faults_guard();
        faults.fail_delete = false;
        faults.deletes_before_failure = Some(count);
    }

    pub fn fail_retrieve(&self, fail: bool) {
        self.faults_guard().fail_retrieve = fail;
    }

    /// Stored records in key order.
    pub fn records(&self) -> Vec<T> {
        self.records_guard().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records_guard().is_empty()
    }

    /// Number of `persist` calls, failed ones included.
    pub fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }

    /// Number of `delete` calls, failed ones included.
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn injected(operation: StoreOperation) -> DurabilityError {
        DurabilityError::new(T::KIND, operation, "injected fault")
    }
}

#[async_trait]
impl<T: Record> Dao<T> for InMemoryDao<T> {
    async fn persist(&self, record: &T) -> Result<(), DurabilityError> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        if self.faults_guard().fail_persist {
            return Err(Self::injected(StoreOperation::Persist));
        }
        self.records_guard().insert(record.record_key(), record.clone());
        Ok(())
    }

    async fn delete(&self, record: &T) -> Result<(), DurabilityError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut faults = self.faults_guard();
            if faults.fail_delete {
                return Err(Self::injected(StoreOperation::Delete));
            }
            if let Some(remaining) = faults.deletes_before_failure.as_mut() {
                if *remaining == 0 {
                    return Err(Self::injected(StoreOperation::Delete));
                }
                *remaining -= 1;
            }
        }
        self.records_guard().remove(&record.record_key());
        Ok(())
    }

    async fn retrieve_all(&self, collector: &mut dyn Collector<T>) -> Result<(), RetrieveError> {
        if self.faults_guard().fail_retrieve {
            return Err(Self::injected(StoreOperation::Retrieve).into());
        }
        for record in self.records() {
            collector.collect(record).map_err(RetrieveError::Rejected)?;
        }
        Ok(())
    }
}

/// The three in-memory DAOs of one router, kept typed so tests can inspect and fault them.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    pub exchanges: Arc<InMemoryDao<ExchangeRecord>>,
    pub queues: Arc<InMemoryDao<QueueRecord>>,
    pub bindings: Arc<InMemoryDao<BindingRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dao_set(&self) -> DaoSet {
        DaoSet::new(
            self.exchanges.clone(),
            self.queues.clone(),
            self.bindings.clone(),
        )
    }
}
