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

/// A bindable message destination. Only its name and durability matter to routing.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Queue {
    name: String,
    durable: bool,
}

impl Queue {
    pub fn new(name: &str, durable: bool) -> Result<Self, ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::EmptyQueueName);
        }
        Ok(Self {
            name: name.to_string(),
            durable,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_durable(&self) -> bool {
        self.durable
    }
}
