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

//! Exchange model and per-type routing decision.

use crate::binding::Binding;
use crate::errors::ValidationError;
use crate::headers::Headers;
use crate::observability::{events, fields};
use crate::routing::exchange_type::ExchangeType;
use crate::routing::filter_expression::FilterExpression;
use crate::routing::topic_pattern::TopicPattern;
use std::collections::BTreeSet;
use tracing::debug;

const COMPONENT: &str = "exchange";

/// A binding together with its compiled matchers.
#[derive(Clone, Debug)]
struct BoundRule {
    binding: Binding,
    topic_pattern: Option<TopicPattern>,
    filter: Option<FilterExpression>,
}

impl BoundRule {
    fn key_matches(&self, exchange_type: ExchangeType, routing_key: &str) -> bool {
        match exchange_type {
            ExchangeType::Direct => self.binding.binding_pattern() == routing_key,
            ExchangeType::Topic => self
                .topic_pattern
                .as_ref()
                .is_some_and(|pattern| pattern.matches(routing_key)),
            ExchangeType::Fanout | ExchangeType::Headers => true,
        }
    }

    fn filter_matches(&self, exchange: &str, headers: &Headers) -> bool {
        let Some(filter) = &self.filter else {
            return true;
        };

        match filter.evaluate(headers) {
            Ok(matched) => matched,
            Err(err) => {
                debug!(
                    event = events::ROUTE_FILTER_EVALUATION_FAILED,
                    component = COMPONENT,
                    exchange,
                    binding_pattern = self.binding.binding_pattern(),
                    queue = self.binding.queue_name().unwrap_or(fields::NONE),
                    filter = filter.source(),
                    err = %err,
                    "filter evaluation failed, treating binding as non-matching"
                );
                false
            }
        }
    }
}

/// Named routing entry point owning a set of bindings.
#[derive(Clone, Debug)]
pub struct Exchange {
    name: String,
    exchange_type: ExchangeType,
    rules: Vec<BoundRule>,
}

impl Exchange {
    pub fn new(name: &str, exchange_type: ExchangeType) -> Result<Self, ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::EmptyExchangeName);
        }
        Ok(Self {
            name: name.to_string(),
            exchange_type,
            rules: Vec::new(),
        })
    }

    /// Builds an exchange from a type name as received from the administrative layer or a
    /// store, failing with [`ValidationError::InvalidExchangeType`] for unknown names.
    pub fn from_type_name(name: &str, exchange_type: &str) -> Result<Self, ValidationError> {
        Self::new(name, exchange_type.parse()?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exchange_type(&self) -> ExchangeType {
        self.exchange_type
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.rules.iter().map(|rule| &rule.binding)
    }

    pub fn binding_count(&self) -> usize {
        self.rules.len()
    }

    pub fn find_binding(&self, binding_pattern: &str, queue_name: Option<&str>) -> Option<&Binding> {
        self.rules
            .iter()
            .map(|rule| &rule.binding)
            .find(|binding| binding.is_identified_by(binding_pattern, queue_name))
    }

    /// Adds a binding. Returns `false` when an identical binding is already present.
    pub(crate) fn add_binding(&mut self, binding: Binding) -> Result<bool, ValidationError> {
        if binding.queue_name().is_none()
            && (self.exchange_type.requires_queue_name() || binding.filter_expression().is_none())
        {
            return Err(ValidationError::MissingQueueName(self.exchange_type));
        }

        if let Some(existing) = self.find_binding(binding.binding_pattern(), binding.queue_name()) {
            if existing == &binding {
                return Ok(false);
            }
            return Err(ValidationError::ConflictingBinding {
                binding_pattern: binding.binding_pattern().to_string(),
                queue_name: binding.queue_name().map(str::to_string),
            });
        }

        let filter = binding
            .filter_expression()
            .map(FilterExpression::parse)
            .transpose()
            .map_err(ValidationError::MalformedFilter)?;
        let topic_pattern = (self.exchange_type == ExchangeType::Topic)
            .then(|| TopicPattern::compile(binding.binding_pattern()));

        self.rules.push(BoundRule {
            binding,
            topic_pattern,
            filter,
        });
        Ok(true)
    }

    /// Removes the binding with the given identity, returning it when present.
    pub(crate) fn remove_binding(
        &mut self,
        binding_pattern: &str,
        queue_name: Option<&str>,
    ) -> Option<Binding> {
        let index = self
            .rules
            .iter()
            .position(|rule| rule.binding.is_identified_by(binding_pattern, queue_name))?;
        Some(self.rules.remove(index).binding)
    }

    /// Removes every binding targeting `queue_name`.
    pub(crate) fn remove_bindings_for_queue(&mut self, queue_name: &str) -> Vec<Binding> {
        let (removed, kept): (Vec<BoundRule>, Vec<BoundRule>) = self
            .rules
            .drain(..)
            .partition(|rule| rule.binding.queue_name() == Some(queue_name));
        self.rules = kept;
        removed.into_iter().map(|rule| rule.binding).collect()
    }

    pub(crate) fn is_bound_to(&self, queue_name: &str) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.binding.queue_name() == Some(queue_name))
    }

    /// Returns the queues that should receive a message published with the given routing
    /// key and headers. Never mutates state.
    pub fn route(&self, routing_key: &str, headers: &Headers) -> BTreeSet<String> {
        self.rules
            .iter()
            .filter(|rule| rule.key_matches(self.exchange_type, routing_key))
            .filter(|rule| rule.filter_matches(&self.name, headers))
            .filter_map(|rule| rule.binding.queue_name())
            .map(str::to_string)
            .collect()
    }
}
