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

//! Administrative change orchestration across the routing table and the store.
//!
//! Every change follows the same order: take the writer lock, validate against a staged
//! copy of the current snapshot, make the change durable, then commit it to the live
//! table. A store failure therefore never leaves a change visible to publishers.
//! The per-entity operations live in `exchange_lifecycle`, `queue_lifecycle` and
//! `binding_lifecycle`.

use crate::control_plane::routing_table::RoutingTable;
use crate::control_plane::writer_locks::WriterLocks;
use crate::errors::DurabilityError;
use crate::observability::{events, fields};
use crate::persistence::{BindingRecord, DaoSet};
use tracing::{debug, error};

const COMPONENT: &str = "lifecycle";

/// Borrows the owners an administrative change touches.
pub(crate) struct AdminLifecycle<'a> {
    pub(super) router: &'a str,
    pub(super) table: &'a RoutingTable,
    pub(super) daos: &'a DaoSet,
    pub(super) locks: &'a WriterLocks,
}

impl<'a> AdminLifecycle<'a> {
    pub(crate) fn new(
        router: &'a str,
        table: &'a RoutingTable,
        daos: &'a DaoSet,
        locks: &'a WriterLocks,
    ) -> Self {
        Self {
            router,
            table,
            daos,
            locks,
        }
    }

    /// Deletes binding records in order. On the first failure, records already deleted
    /// are written back before the error is returned.
    pub(super) async fn delete_binding_records(
        &self,
        records: &[BindingRecord],
    ) -> Result<(), DurabilityError> {
        for (index, record) in records.iter().enumerate() {
            if let Err(err) = self.daos.bindings.delete(record).await {
                self.restore_binding_records(&records[..index]).await;
                return Err(err);
            }
        }
        Ok(())
    }

    /// Best-effort re-persist of binding records removed by a cascade that did not
    /// complete.
    pub(super) async fn restore_binding_records(&self, records: &[BindingRecord]) {
        for record in records {
            let queue = fields::format_optional(record.binding.queue_name());
            match self.daos.bindings.persist(record).await {
                Ok(()) => debug!(
                    event = events::STORE_COMPENSATION_OK,
                    component = COMPONENT,
                    router = self.router,
                    exchange = record.exchange_name.as_str(),
                    binding_pattern = record.binding.binding_pattern(),
                    queue,
                    "restored binding record"
                ),
                Err(err) => error!(
                    event = events::STORE_COMPENSATION_FAILED,
                    component = COMPONENT,
                    router = self.router,
                    exchange = record.exchange_name.as_str(),
                    binding_pattern = record.binding.binding_pattern(),
                    queue,
                    err = %err,
                    "failed to restore binding record, store and routing table diverge"
                ),
            }
        }
    }
}
