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

//! Rebuilds a [`Topology`] from the store.
//!
//! Records are streamed queues first, then exchanges, then bindings, so every binding
//! finds its exchange and queue already staged. Each record goes through the same
//! validated insert as a live administrative call; the first rejection aborts recovery.

use crate::control_plane::routing_table::Topology;
use crate::errors::RecoveryError;
use crate::observability::events;
use crate::persistence::{
    BindingRecord, CollectError, DaoSet, EntityKind, ExchangeRecord, QueueRecord,
};
use crate::queue::Queue;
use crate::routing::exchange_type::ExchangeType;
use tracing::{debug, info};

const COMPONENT: &str = "recovery";

pub(crate) struct RecoveryLoader<'a> {
    router: &'a str,
    daos: &'a DaoSet,
}

impl<'a> RecoveryLoader<'a> {
    pub(crate) fn new(router: &'a str, daos: &'a DaoSet) -> Self {
        Self { router, daos }
    }

    pub(crate) async fn load(&self) -> Result<Topology, RecoveryError> {
        let mut staged = Topology::with_built_in_exchanges();

        let queues = self.load_queues(&mut staged).await?;
        self.phase_ok(EntityKind::Queue, queues);
        let exchanges = self.load_exchanges(&mut staged).await?;
        self.phase_ok(EntityKind::Exchange, exchanges);
        let bindings = self.load_bindings(&mut staged).await?;
        self.phase_ok(EntityKind::Binding, bindings);

        info!(
            event = events::RECOVERY_OK,
            component = COMPONENT,
            router = self.router,
            queues,
            exchanges,
            bindings,
            "routing table rebuilt from store"
        );
        Ok(staged)
    }

    async fn load_queues(&self, staged: &mut Topology) -> Result<usize, RecoveryError> {
        let mut count = 0;
        let mut collector = |record: QueueRecord| -> Result<(), CollectError> {
            let queue = Queue::new(&record.name, record.durable)?;
            staged.add_queue(queue)?;
            count += 1;
            Ok(())
        };

        self.daos
            .queues
            .retrieve_all(&mut collector)
            .await
            .map_err(|source| RecoveryError::Retrieve {
                kind: EntityKind::Queue,
                source,
            })?;
        Ok(count)
    }

    async fn load_exchanges(&self, staged: &mut Topology) -> Result<usize, RecoveryError> {
        let mut count = 0;
        let mut collector = |record: ExchangeRecord| -> Result<(), CollectError> {
            let exchange_type: ExchangeType = record.type_name.parse()?;
            staged.add_exchange(&record.name, exchange_type)?;
            count += 1;
            Ok(())
        };

        self.daos
            .exchanges
            .retrieve_all(&mut collector)
            .await
            .map_err(|source| RecoveryError::Retrieve {
                kind: EntityKind::Exchange,
                source,
            })?;
        Ok(count)
    }

    async fn load_bindings(&self, staged: &mut Topology) -> Result<usize, RecoveryError> {
        let mut count = 0;
        let mut collector = |record: BindingRecord| -> Result<(), CollectError> {
            let BindingRecord {
                exchange_name,
                binding,
            } = record;
            staged.add_binding(&exchange_name, binding)?;
            count += 1;
            Ok(())
        };

        self.daos
            .bindings
            .retrieve_all(&mut collector)
            .await
            .map_err(|source| RecoveryError::Retrieve {
                kind: EntityKind::Binding,
                source,
            })?;
        Ok(count)
    }

    fn phase_ok(&self, kind: EntityKind, record_count: usize) {
        debug!(
            event = events::RECOVERY_PHASE_OK,
            component = COMPONENT,
            router = self.router,
            entity_kind = %kind,
            record_count,
            "recovery phase complete"
        );
    }
}
