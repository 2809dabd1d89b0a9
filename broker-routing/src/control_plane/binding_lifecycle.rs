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

//! Bind and unbind.

use crate::binding::Binding;
use crate::control_plane::lifecycle::AdminLifecycle;
use crate::errors::AdminError;
use crate::observability::{events, fields};
use crate::persistence::BindingRecord;
use tracing::{debug, info, warn};

const COMPONENT: &str = "binding_lifecycle";

impl AdminLifecycle<'_> {
    /// Adds `binding` to `exchange_name`. Rebinding an identical binding is a no-op.
    pub(crate) async fn bind(&self, exchange_name: &str, binding: Binding) -> Result<(), AdminError> {
        let queue = fields::format_optional(binding.queue_name()).to_string();
        debug!(
            event = events::BINDING_ADD_START,
            component = COMPONENT,
            router = self.router,
            exchange = exchange_name,
            binding = %binding,
            "adding binding"
        );

        match self.add_binding(exchange_name, binding.clone()).await {
            Ok(true) => {
                info!(
                    event = events::BINDING_ADD_OK,
                    component = COMPONENT,
                    router = self.router,
                    exchange = exchange_name,
                    binding_pattern = binding.binding_pattern(),
                    queue,
                    "binding added"
                );
                Ok(())
            }
            Ok(false) => {
                debug!(
                    event = events::BINDING_ADD_NOOP,
                    component = COMPONENT,
                    router = self.router,
                    exchange = exchange_name,
                    binding_pattern = binding.binding_pattern(),
                    queue,
                    "binding already present"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    event = events::BINDING_ADD_FAILED,
                    component = COMPONENT,
                    router = self.router,
                    exchange = exchange_name,
                    binding_pattern = binding.binding_pattern(),
                    queue,
                    err = %err,
                    "binding rejected"
                );
                Err(err)
            }
        }
    }

    async fn add_binding(&self, exchange_name: &str, binding: Binding) -> Result<bool, AdminError> {
        let _writer = self.locks.exchange_writer(exchange_name).await;

        let mut staged = self.table.stage();
        if !staged.add_binding(exchange_name, binding.clone())? {
            return Ok(false);
        }

        let record = staged
            .is_binding_durable(&binding)
            .then(|| BindingRecord::new(exchange_name, binding.clone()));
        if let Some(record) = &record {
            self.daos.bindings.persist(record).await?;
        }

        if let Err(err) = self
            .table
            .commit(|topology| topology.add_binding(exchange_name, binding))
        {
            if let Some(record) = &record {
                if let Err(delete_err) = self.daos.bindings.delete(record).await {
                    warn!(
                        event = events::STORE_COMPENSATION_FAILED,
                        component = COMPONENT,
                        router = self.router,
                        exchange = exchange_name,
                        err = %delete_err,
                        "failed to withdraw binding record after rejected commit"
                    );
                }
            }
            return Err(err);
        }
        Ok(true)
    }

    /// Removes the binding identified by `(binding_pattern, queue_name)` from
    /// `exchange_name`.
    pub(crate) async fn unbind(
        &self,
        exchange_name: &str,
        binding_pattern: &str,
        queue_name: Option<&str>,
    ) -> Result<(), AdminError> {
        let queue = fields::format_optional(queue_name);
        debug!(
            event = events::BINDING_REMOVE_START,
            component = COMPONENT,
            router = self.router,
            exchange = exchange_name,
            binding_pattern,
            queue,
            "removing binding"
        );

        let result = self
            .remove_binding(exchange_name, binding_pattern, queue_name)
            .await;
        match &result {
            Ok(()) => info!(
                event = events::BINDING_REMOVE_OK,
                component = COMPONENT,
                router = self.router,
                exchange = exchange_name,
                binding_pattern,
                queue,
                "binding removed"
            ),
            Err(err) => warn!(
                event = events::BINDING_REMOVE_FAILED,
                component = COMPONENT,
                router = self.router,
                exchange = exchange_name,
                binding_pattern,
                queue,
                err = %err,
                "binding removal rejected"
            ),
        }
        result
    }

    async fn remove_binding(
        &self,
        exchange_name: &str,
        binding_pattern: &str,
        queue_name: Option<&str>,
    ) -> Result<(), AdminError> {
        let _writer = self.locks.exchange_writer(exchange_name).await;

        let mut staged = self.table.stage();
        let removed = staged.remove_binding(exchange_name, binding_pattern, queue_name)?;

        if staged.is_binding_durable(&removed) {
            self.daos
                .bindings
                .delete(&BindingRecord::new(exchange_name, removed))
                .await?;
        }

        self.table.commit(|topology| {
            topology
                .remove_binding(exchange_name, binding_pattern, queue_name)
                .map(|_| ())
        })
    }
}
