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

//! Generic data-access contract implemented by storage engines.

use crate::errors::DurabilityError;
use crate::persistence::records::{BindingRecord, ExchangeRecord, QueueRecord, Record};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Error a [`Collector`] returns to abort a bulk retrieval.
pub type CollectError = Box<dyn Error + Send + Sync + 'static>;

/// Receives records one at a time during [`Dao::retrieve_all`].
///
/// Any closure `FnMut(T) -> Result<(), CollectError>` is a collector.
pub trait Collector<T>: Send {
    fn collect(&mut self, record: T) -> Result<(), CollectError>;
}

impl<T, F> Collector<T> for F
where
    F: FnMut(T) -> Result<(), CollectError> + Send,
{
    fn collect(&mut self, record: T) -> Result<(), CollectError> {
        self(record)
    }
}

/// Failure of a bulk retrieval: either the store itself or the collector gave up.
#[derive(Debug)]
pub enum RetrieveError {
    Store(DurabilityError),
    Rejected(CollectError),
}

impl Display for RetrieveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrieveError::Store(err) => write!(f, "{err}"),
            RetrieveError::Rejected(err) => write!(f, "record rejected: {err}"),
        }
    }
}

impl Error for RetrieveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RetrieveError::Store(err) => Some(err),
            RetrieveError::Rejected(err) => Some(&**err),
        }
    }
}

impl From<DurabilityError> for RetrieveError {
    fn from(err: DurabilityError) -> Self {
        RetrieveError::Store(err)
    }
}

///
/// [`Dao`] is the persistence contract for one record kind.
///
/// Every call completes (or fails) before the routing core treats the corresponding
/// in-memory change as committed. Implementations must:
///
/// - fail `persist` with a [`DurabilityError`] whenever the write is not durable;
/// - treat `delete` of an absent record as success;
/// - hand records to the collector one by one in `retrieve_all`, stopping at and
///   propagating the first collector error as [`RetrieveError::Rejected`].
#[async_trait]
pub trait Dao<T: Record>: Send + Sync {
    async fn persist(&self, record: &T) -> Result<(), DurabilityError>;

    async fn delete(&self, record: &T) -> Result<(), DurabilityError>;

    async fn retrieve_all(&self, collector: &mut dyn Collector<T>) -> Result<(), RetrieveError>;
}

/// The three DAOs backing one routing table.
#[derive(Clone)]
pub struct DaoSet {
    pub exchanges: Arc<dyn Dao<ExchangeRecord>>,
    pub queues: Arc<dyn Dao<QueueRecord>>,
    pub bindings: Arc<dyn Dao<BindingRecord>>,
}

impl DaoSet {
    pub fn new(
        exchanges: Arc<dyn Dao<ExchangeRecord>>,
        queues: Arc<dyn Dao<QueueRecord>>,
        bindings: Arc<dyn Dao<BindingRecord>>,
    ) -> Self {
        Self {
            exchanges,
            queues,
            bindings,
        }
    }
}
