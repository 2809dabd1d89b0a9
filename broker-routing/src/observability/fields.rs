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

//! Shared field values and value-format helpers for structured log events.

use std::collections::BTreeSet;

pub const NONE: &str = "none";
pub const REASON_TRANSIENT_QUEUE: &str = "transient_queue";

pub fn format_optional(value: Option<&str>) -> &str {
    value.unwrap_or(NONE)
}

/// Renders a routing result as `{a,b,c}` for log lines.
pub fn format_queue_set(queues: &BTreeSet<String>) -> String {
    let joined = queues
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{joined}}}")
}
