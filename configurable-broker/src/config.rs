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

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub(crate) broker: BrokerConfig,
    pub(crate) store: StoreConfig,
    #[serde(default)]
    pub(crate) queues: Vec<QueueConfig>,
    #[serde(default)]
    pub(crate) exchanges: Vec<ExchangeConfig>,
    #[serde(default)]
    pub(crate) bindings: Vec<BindingConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct BrokerConfig {
    pub(crate) name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    pub(crate) directory: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    pub(crate) name: String,
    #[serde(default = "durable_by_default")]
    pub(crate) durable: bool,
}

fn durable_by_default() -> bool {
    true
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ExchangeConfig {
    pub(crate) name: String,
    #[serde(rename = "type")]
    pub(crate) exchange_type: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    pub(crate) exchange: String,
    pub(crate) binding_pattern: String,
    #[serde(default)]
    pub(crate) queue_name: Option<String>,
    #[serde(default)]
    pub(crate) filter_expression: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Unable to read config file {path}: {e}"))?;
        let config = json5::from_str(&contents)
            .map_err(|e| format!("Unable to parse config file {path}: {e}"))?;
        Ok(config)
    }
}
