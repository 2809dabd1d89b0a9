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

//! Exchange creation and deletion.

use crate::control_plane::lifecycle::AdminLifecycle;
use crate::errors::AdminError;
use crate::observability::events;
use crate::persistence::{BindingRecord, ExchangeRecord};
use crate::routing::exchange_type::ExchangeType;
use tracing::{debug, info, warn};

const COMPONENT: &str = "exchange_lifecycle";

impl AdminLifecycle<'_> {
    /// Creates `exchange_name` of the given type. Re-creating an exchange with the same
    /// type is a no-op.
    pub(crate) async fn create_exchange(
        &self,
        exchange_name: &str,
        type_name: &str,
    ) -> Result<(), AdminError> {
        let result = match type_name.parse::<ExchangeType>() {
            Ok(exchange_type) => self.add_exchange(exchange_name, exchange_type).await,
            Err(err) => Err(err.into()),
        };

        match result {
            Ok(true) => {
                info!(
                    event = events::EXCHANGE_CREATE_OK,
                    component = COMPONENT,
                    router = self.router,
                    exchange = exchange_name,
                    exchange_type = type_name,
                    "exchange created"
                );
                Ok(())
            }
            Ok(false) => {
                debug!(
                    event = events::EXCHANGE_CREATE_NOOP,
                    component = COMPONENT,
                    router = self.router,
                    exchange = exchange_name,
                    exchange_type = type_name,
                    "exchange already exists"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    event = events::EXCHANGE_CREATE_FAILED,
                    component = COMPONENT,
                    router = self.router,
                    exchange = exchange_name,
                    exchange_type = type_name,
                    err = %err,
                    "exchange creation rejected"
                );
                Err(err)
            }
        }
    }

    async fn add_exchange(
        &self,
        exchange_name: &str,
        exchange_type: ExchangeType,
    ) -> Result<bool, AdminError> {
        let _writer = self.locks.exchange_writer(exchange_name).await;

        let mut staged = self.table.stage();
        if !staged.add_exchange(exchange_name, exchange_type)? {
            return Ok(false);
        }

        let record = ExchangeRecord::new(exchange_name, exchange_type);
        self.daos.exchanges.persist(&record).await?;

        self.table
            .commit(|topology| topology.add_exchange(exchange_name, exchange_type))
    }

    /// Deletes `exchange_name` and every binding it owns. Built-in exchanges cannot be
    /// deleted.
    pub(crate) async fn delete_exchange(&self, exchange_name: &str) -> Result<(), AdminError> {
        let result = self.remove_exchange(exchange_name).await;
        self.locks.release_exchange(exchange_name);

        match &result {
            Ok(binding_count) => info!(
                event = events::EXCHANGE_DELETE_OK,
                component = COMPONENT,
                router = self.router,
                exchange = exchange_name,
                binding_count,
                "exchange deleted"
            ),
            Err(err) => warn!(
                event = events::EXCHANGE_DELETE_FAILED,
                component = COMPONENT,
                router = self.router,
                exchange = exchange_name,
                err = %err,
                "exchange deletion rejected"
            ),
        }
        result.map(|_| ())
    }

    async fn remove_exchange(&self, exchange_name: &str) -> Result<usize, AdminError> {
        let _writer = self.locks.exchange_writer(exchange_name).await;

        let mut staged = self.table.stage();
        let exchange = staged.remove_exchange(exchange_name)?;

        let records: Vec<BindingRecord> = exchange
            .bindings()
            .filter(|binding| staged.is_binding_durable(binding))
            .map(|binding| BindingRecord::new(exchange_name, binding.clone()))
            .collect();
        self.delete_binding_records(&records).await?;

        if let Err(err) = self
            .daos
            .exchanges
            .delete(&ExchangeRecord::from(exchange.as_ref()))
            .await
        {
            self.restore_binding_records(&records).await;
            return Err(err.into());
        }

        self.table
            .commit(|topology| topology.remove_exchange(exchange_name))
            .map(|removed| removed.binding_count())
    }
}
