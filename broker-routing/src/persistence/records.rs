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

//! Durable record shapes handed to storage engines.

use crate::binding::Binding;
use crate::queue::Queue;
use crate::routing::exchange::Exchange;
use crate::routing::exchange_type::ExchangeType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

const KEY_SEPARATOR: char = '\u{1f}';

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EntityKind {
    Exchange,
    Queue,
    Binding,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Exchange => f.write_str("exchange"),
            EntityKind::Queue => f.write_str("queue"),
            EntityKind::Binding => f.write_str("binding"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StoreOperation {
    Persist,
    Delete,
    Retrieve,
}

impl Display for StoreOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreOperation::Persist => f.write_str("persist"),
            StoreOperation::Delete => f.write_str("delete"),
            StoreOperation::Retrieve => f.write_str("retrieve"),
        }
    }
}

/// A persistable routing entity.
///
/// `record_key` is the store-level identity: persisting a record with an existing key
/// replaces it, deleting by key is idempotent.
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    fn record_key(&self) -> String;
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRecord {
    pub name: String,
    /// Kept as free text so that an unknown type is reported by recovery, not by the store.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ExchangeRecord {
    pub fn new(name: &str, exchange_type: ExchangeType) -> Self {
        Self {
            name: name.to_string(),
            type_name: exchange_type.as_str().to_string(),
        }
    }
}

impl From<&Exchange> for ExchangeRecord {
    fn from(exchange: &Exchange) -> Self {
        Self::new(exchange.name(), exchange.exchange_type())
    }
}

impl Record for ExchangeRecord {
    const KIND: EntityKind = EntityKind::Exchange;

    fn record_key(&self) -> String {
        self.name.clone()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRecord {
    pub name: String,
    pub durable: bool,
}

impl From<&Queue> for QueueRecord {
    fn from(queue: &Queue) -> Self {
        Self {
            name: queue.name().to_string(),
            durable: queue.is_durable(),
        }
    }
}

impl Record for QueueRecord {
    const KIND: EntityKind = EntityKind::Queue;

    fn record_key(&self) -> String {
        self.name.clone()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingRecord {
    pub exchange_name: String,
    pub binding: Binding,
}

impl BindingRecord {
    pub fn new(exchange_name: &str, binding: Binding) -> Self {
        Self {
            exchange_name: exchange_name.to_string(),
            binding,
        }
    }
}

impl Record for BindingRecord {
    const KIND: EntityKind = EntityKind::Binding;

    fn record_key(&self) -> String {
        format!(
            "{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}",
            self.exchange_name,
            self.binding.queue_name().unwrap_or_default(),
            self.binding.binding_pattern()
        )
    }
}
