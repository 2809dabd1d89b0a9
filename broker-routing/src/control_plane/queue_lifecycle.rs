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

//! Queue creation and deletion. Both hold the topology guard exclusively because a
//! queue deletion cascades into every exchange.

use crate::control_plane::lifecycle::AdminLifecycle;
use crate::errors::AdminError;
use crate::observability::{events, fields};
use crate::persistence::QueueRecord;
use crate::queue::Queue;
use tracing::{debug, info, warn};

const COMPONENT: &str = "queue_lifecycle";

impl AdminLifecycle<'_> {
    pub(crate) async fn create_queue(&self, queue_name: &str, durable: bool) -> Result<(), AdminError> {
        match self.add_queue(queue_name, durable).await {
            Ok(true) => {
                info!(
                    event = events::QUEUE_CREATE_OK,
                    component = COMPONENT,
                    router = self.router,
                    queue = queue_name,
                    durable,
                    "queue created"
                );
                Ok(())
            }
            Ok(false) => {
                debug!(
                    event = events::QUEUE_CREATE_NOOP,
                    component = COMPONENT,
                    router = self.router,
                    queue = queue_name,
                    durable,
                    "queue already exists"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    event = events::QUEUE_CREATE_FAILED,
                    component = COMPONENT,
                    router = self.router,
                    queue = queue_name,
                    durable,
                    err = %err,
                    "queue creation rejected"
                );
                Err(err)
            }
        }
    }

    async fn add_queue(&self, queue_name: &str, durable: bool) -> Result<bool, AdminError> {
        let queue = Queue::new(queue_name, durable)?;
        let _writer = self.locks.topology_writer().await;

        let mut staged = self.table.stage();
        if !staged.add_queue(queue.clone())? {
            return Ok(false);
        }

        if queue.is_durable() {
            self.daos.queues.persist(&QueueRecord::from(&queue)).await?;
        } else {
            debug!(
                component = COMPONENT,
                router = self.router,
                queue = queue_name,
                reason = fields::REASON_TRANSIENT_QUEUE,
                "skipping store write"
            );
        }

        self.table.commit(|topology| topology.add_queue(queue))
    }

    /// Deletes `queue_name` and every binding that targets it, on any exchange.
    pub(crate) async fn delete_queue(&self, queue_name: &str) -> Result<(), AdminError> {
        let result = self.remove_queue(queue_name).await;
        match &result {
            Ok(binding_count) => info!(
                event = events::QUEUE_DELETE_OK,
                component = COMPONENT,
                router = self.router,
                queue = queue_name,
                binding_count,
                "queue deleted"
            ),
            Err(err) => warn!(
                event = events::QUEUE_DELETE_FAILED,
                component = COMPONENT,
                router = self.router,
                queue = queue_name,
                err = %err,
                "queue deletion rejected"
            ),
        }
        result.map(|_| ())
    }

    async fn remove_queue(&self, queue_name: &str) -> Result<usize, AdminError> {
        let _writer = self.locks.topology_writer().await;

        let mut staged = self.table.stage();
        let removed = staged.remove_queue(queue_name)?;

        if removed.queue.is_durable() {
            self.delete_binding_records(&removed.bindings).await?;

            if let Err(err) = self
                .daos
                .queues
                .delete(&QueueRecord::from(&removed.queue))
                .await
            {
                self.restore_binding_records(&removed.bindings).await;
                return Err(err.into());
            }
        }

        self.table
            .commit(|topology| topology.remove_queue(queue_name))
            .map(|removed| removed.bindings.len())
    }
}
