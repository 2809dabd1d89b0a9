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

use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

///
/// [`Binding`] is one routing rule of an exchange: a routing pattern, the queue it delivers
/// to and an optional filter expression evaluated against message headers.
///
/// A binding is immutable once built. Its identity inside an exchange is the
/// `(queue_name, binding_pattern)` pair; equality compares all three fields.
///
/// # Examples
///
/// ```
/// use broker_routing::Binding;
///
/// let binding = Binding::new("orders.*.created", Some("q1"), None).unwrap();
/// assert_eq!(binding.binding_pattern(), "orders.*.created");
/// assert_eq!(binding.queue_name(), Some("q1"));
///
/// assert!(Binding::new("", Some("q1"), None).is_err());
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BindingInfo", rename_all = "camelCase")]
pub struct Binding {
    binding_pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    queue_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter_expression: Option<String>,
}

impl Binding {
    /// Builds a binding, rejecting an empty pattern or an empty queue name.
    pub fn new(
        binding_pattern: &str,
        queue_name: Option<&str>,
        filter_expression: Option<&str>,
    ) -> Result<Self, ValidationError> {
        if binding_pattern.is_empty() {
            return Err(ValidationError::EmptyBindingPattern);
        }
        if queue_name.is_some_and(str::is_empty) {
            return Err(ValidationError::EmptyQueueName);
        }

        Ok(Self {
            binding_pattern: binding_pattern.to_string(),
            queue_name: queue_name.map(str::to_string),
            filter_expression: filter_expression
                .map(str::trim)
                .filter(|expression| !expression.is_empty())
                .map(str::to_string),
        })
    }

    pub fn binding_pattern(&self) -> &str {
        &self.binding_pattern
    }

    pub fn queue_name(&self) -> Option<&str> {
        self.queue_name.as_deref()
    }

    pub fn filter_expression(&self) -> Option<&str> {
        self.filter_expression.as_deref()
    }

    /// Returns `true` when this binding has the given `(pattern, queue)` identity.
    pub fn is_identified_by(&self, binding_pattern: &str, queue_name: Option<&str>) -> bool {
        self.binding_pattern == binding_pattern && self.queue_name.as_deref() == queue_name
    }
}

impl Display for Binding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "bindingPattern={} queueName={} filterExpression={}",
            self.binding_pattern,
            self.queue_name.as_deref().unwrap_or("none"),
            self.filter_expression.as_deref().unwrap_or("none")
        )
    }
}

/// Wire shape accepted from the administrative layer before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BindingInfo {
    binding_pattern: String,
    #[serde(default)]
    queue_name: Option<String>,
    #[serde(default)]
    filter_expression: Option<String>,
}

impl TryFrom<BindingInfo> for Binding {
    type Error = ValidationError;

    fn try_from(info: BindingInfo) -> Result<Self, Self::Error> {
        Binding::new(
            &info.binding_pattern,
            info.queue_name.as_deref(),
            info.filter_expression.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Binding;
    use crate::errors::ValidationError;

    #[test]
    fn blank_filter_expression_is_treated_as_absent() {
        let binding = Binding::new("orders.#", Some("q2"), Some("   ")).unwrap();

        assert_eq!(binding.filter_expression(), None);
        assert_eq!(binding, Binding::new("orders.#", Some("q2"), None).unwrap());
    }

    #[test]
    fn empty_queue_name_is_rejected() {
        assert_eq!(
            Binding::new("orders.#", Some(""), None),
            Err(ValidationError::EmptyQueueName)
        );
    }

    #[test]
    fn display_rendering_is_stable() {
        let binding = Binding::new("orders.#", Some("q2"), Some("region = 'eu'")).unwrap();

        assert_eq!(
            binding.to_string(),
            "bindingPattern=orders.# queueName=q2 filterExpression=region = 'eu'"
        );
        assert_eq!(
            Binding::new("match", None, Some("x = 1")).unwrap().to_string(),
            "bindingPattern=match queueName=none filterExpression=x = 1"
        );
    }

    #[test]
    fn deserialization_runs_validation() {
        let parsed: Binding = serde_json::from_str(
            r#"{"bindingPattern":"orders.*.created","queueName":"q1"}"#,
        )
        .unwrap();
        assert_eq!(parsed, Binding::new("orders.*.created", Some("q1"), None).unwrap());

        let rejected = serde_json::from_str::<Binding>(r#"{"bindingPattern":""}"#);
        assert!(rejected.is_err());
    }

    #[test]
    fn serialization_uses_camel_case_and_skips_absent_fields() {
        let binding = Binding::new("orders.#", Some("q2"), None).unwrap();

        assert_eq!(
            serde_json::to_string(&binding).unwrap(),
            r#"{"bindingPattern":"orders.#","queueName":"q2"}"#
        );
    }
}
