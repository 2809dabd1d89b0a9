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

mod config;

use crate::config::Config;
use broker_routing::{Binding, HeaderValue, Headers, MessageRouter};
use clap::Parser;
use routing_store_file::FileStore;
use tracing::info;

#[derive(Parser)]
#[command()]
struct BrokerArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,

    /// Routes a probe message after the configured topology is applied.
    #[arg(long, num_args = 2, value_names = ["EXCHANGE", "ROUTING_KEY"])]
    route: Option<Vec<String>>,

    /// Header attached to the probe message. May be repeated.
    #[arg(long = "header", value_name = "KEY=VALUE")]
    headers: Vec<String>,
}

fn parse_header(entry: &str) -> Result<(String, HeaderValue), String> {
    let (key, value) = entry
        .split_once('=')
        .ok_or_else(|| format!("Header '{entry}' is not KEY=VALUE"))?;

    let value = if let Ok(integer) = value.parse::<i64>() {
        HeaderValue::Integer(integer)
    } else if let Ok(float) = value.parse::<f64>() {
        HeaderValue::Float(float)
    } else if let Ok(boolean) = value.parse::<bool>() {
        HeaderValue::Boolean(boolean)
    } else {
        HeaderValue::from(value)
    };
    Ok((key.to_string(), value))
}

async fn apply_declarations(
    router: &MessageRouter,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    for queue in &config.queues {
        router.create_queue(&queue.name, queue.durable).await?;
    }
    for exchange in &config.exchanges {
        router
            .create_exchange(&exchange.name, &exchange.exchange_type)
            .await?;
    }
    for binding in &config.bindings {
        let declared = Binding::new(
            &binding.binding_pattern,
            binding.queue_name.as_deref(),
            binding.filter_expression.as_deref(),
        )?;
        router.bind(&binding.exchange, declared).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt::try_init();

    info!("Started configurable-broker");

    let args = BrokerArgs::parse();
    let config = Config::load(&args.config)?;

    let store = FileStore::open(&config.store.directory).await?;
    let router = MessageRouter::new(&config.broker.name, store.dao_set());
    router.recover().await?;
    apply_declarations(&router, &config).await?;

    info!(
        broker = config.broker.name.as_str(),
        exchanges = router.exchange_names().len(),
        "Topology applied"
    );

    if let Some(probe) = args.route {
        let headers = args
            .headers
            .iter()
            .map(|entry| parse_header(entry))
            .collect::<Result<Headers, _>>()?;
        let queues = router.route(&probe[0], &probe[1], &headers)?;
        let queues: Vec<&str> = queues.iter().map(String::as_str).collect();
        println!("{}", queues.join(","));
    }

    Ok(())
}
