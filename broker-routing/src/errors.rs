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

//! Error taxonomy shared by the administrative and publish paths.

use crate::persistence::{EntityKind, RetrieveError, StoreOperation};
use crate::recovery::RecoveryState;
use crate::routing::exchange_type::ExchangeType;
use crate::routing::filter_expression::FilterParseError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Malformed or missing input, rejected before any state change.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationError {
    EmptyExchangeName,
    EmptyQueueName,
    EmptyBindingPattern,
    InvalidExchangeType(String),
    ReservedExchangeName(String),
    ExchangeTypeMismatch {
        exchange: String,
        existing: ExchangeType,
        requested: ExchangeType,
    },
    QueueDurabilityMismatch {
        queue: String,
        existing: bool,
    },
    MissingQueueName(ExchangeType),
    UnknownQueue(String),
    MalformedFilter(FilterParseError),
    ConflictingBinding {
        binding_pattern: String,
        queue_name: Option<String>,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyExchangeName => write!(f, "exchange name must not be empty"),
            ValidationError::EmptyQueueName => write!(f, "queue name must not be empty"),
            ValidationError::EmptyBindingPattern => {
                write!(f, "binding pattern must not be empty")
            }
            ValidationError::InvalidExchangeType(exchange_type) => {
                write!(f, "invalid exchange type '{exchange_type}'")
            }
            ValidationError::ReservedExchangeName(name) => {
                write!(f, "exchange name '{name}' is reserved")
            }
            ValidationError::ExchangeTypeMismatch {
                exchange,
                existing,
                requested,
            } => write!(
                f,
                "exchange '{exchange}' already exists with type '{existing}', requested '{requested}'"
            ),
            ValidationError::QueueDurabilityMismatch { queue, existing } => write!(
                f,
                "queue '{queue}' already exists with durable={existing}"
            ),
            ValidationError::MissingQueueName(exchange_type) => write!(
                f,
                "bindings on a '{exchange_type}' exchange require a queue name"
            ),
            ValidationError::UnknownQueue(queue) => write!(f, "queue '{queue}' does not exist"),
            ValidationError::MalformedFilter(err) => {
                write!(f, "malformed filter expression: {err}")
            }
            ValidationError::ConflictingBinding {
                binding_pattern,
                queue_name,
            } => write!(
                f,
                "binding '{binding_pattern}' -> '{}' already exists with a different filter",
                queue_name.as_deref().unwrap_or("none")
            ),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ValidationError::MalformedFilter(err) => Some(err),
            _ => None,
        }
    }
}

/// An administrative call referenced an entity that does not exist.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NotFoundError {
    Exchange(String),
    Queue(String),
    Binding {
        exchange: String,
        binding_pattern: String,
        queue_name: Option<String>,
    },
}

impl Display for NotFoundError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NotFoundError::Exchange(name) => write!(f, "exchange '{name}' not found"),
            NotFoundError::Queue(name) => write!(f, "queue '{name}' not found"),
            NotFoundError::Binding {
                exchange,
                binding_pattern,
                queue_name,
            } => write!(
                f,
                "binding '{binding_pattern}' -> '{}' not found on exchange '{exchange}'",
                queue_name.as_deref().unwrap_or("none")
            ),
        }
    }
}

impl Error for NotFoundError {}

/// The storage engine rejected a write or could not be reached.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DurabilityError {
    kind: EntityKind,
    operation: StoreOperation,
    reason: String,
}

impl DurabilityError {
    pub fn new(kind: EntityKind, operation: StoreOperation, reason: impl Into<String>) -> Self {
        Self {
            kind,
            operation,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn operation(&self) -> StoreOperation {
        self.operation
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for DurabilityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to {} {} record: {}",
            self.operation, self.kind, self.reason
        )
    }
}

impl Error for DurabilityError {}

/// Startup reconstruction of the routing table failed. Always fatal.
#[derive(Debug)]
pub enum RecoveryError {
    AlreadyStarted(RecoveryState),
    Retrieve {
        kind: EntityKind,
        source: RetrieveError,
    },
}

impl Display for RecoveryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoveryError::AlreadyStarted(state) => {
                write!(f, "recovery already triggered, router is {state}")
            }
            RecoveryError::Retrieve { kind, source } => {
                write!(f, "failed to recover {kind} records: {source}")
            }
        }
    }
}

impl Error for RecoveryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RecoveryError::Retrieve { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failures surfaced by administrative operations.
#[derive(Debug)]
pub enum AdminError {
    NotReady(RecoveryState),
    Validation(ValidationError),
    NotFound(NotFoundError),
    Durability(DurabilityError),
}

impl Display for AdminError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminError::NotReady(state) => write!(f, "router is not ready ({state})"),
            AdminError::Validation(err) => write!(f, "validation failed: {err}"),
            AdminError::NotFound(err) => write!(f, "{err}"),
            AdminError::Durability(err) => write!(f, "not committed: {err}"),
        }
    }
}

impl Error for AdminError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AdminError::NotReady(_) => None,
            AdminError::Validation(err) => Some(err),
            AdminError::NotFound(err) => Some(err),
            AdminError::Durability(err) => Some(err),
        }
    }
}

impl From<ValidationError> for AdminError {
    fn from(err: ValidationError) -> Self {
        AdminError::Validation(err)
    }
}

impl From<NotFoundError> for AdminError {
    fn from(err: NotFoundError) -> Self {
        AdminError::NotFound(err)
    }
}

impl From<DurabilityError> for AdminError {
    fn from(err: DurabilityError) -> Self {
        AdminError::Durability(err)
    }
}

/// Failures surfaced by the publish path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RouteError {
    NotReady(RecoveryState),
    NotFound(NotFoundError),
}

impl Display for RouteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteError::NotReady(state) => write!(f, "router is not ready ({state})"),
            RouteError::NotFound(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RouteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RouteError::NotFound(err) => Some(err),
            RouteError::NotReady(_) => None,
        }
    }
}
