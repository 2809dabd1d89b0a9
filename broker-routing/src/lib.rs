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

//!
//! `broker-routing` is the metadata-routing core of a message broker: exchanges, queues and
//! the bindings between them, kept durable through a pluggable store and rebuilt from it on
//! startup.
//!
//! Typical usage is centered on [`MessageRouter`]: build it over a [`DaoSet`], call
//! [`MessageRouter::recover`] once, then administer the topology and route messages.
//!
//! ```
//! use broker_routing::{Binding, Headers, MessageRouter};
//! # use broker_routing::{Collector, Dao, DaoSet, DurabilityError, Record, RetrieveError};
//! # use async_trait::async_trait;
//! # use std::sync::Arc;
//! #
//! # struct NullDao;
//! #
//! # #[async_trait]
//! # impl<T: Record> Dao<T> for NullDao {
//! #     async fn persist(&self, _record: &T) -> Result<(), DurabilityError> { Ok(()) }
//! #     async fn delete(&self, _record: &T) -> Result<(), DurabilityError> { Ok(()) }
//! #     async fn retrieve_all(&self, _collector: &mut dyn Collector<T>) -> Result<(), RetrieveError> {
//! #         Ok(())
//! #     }
//! # }
//! #
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! # let daos = DaoSet::new(Arc::new(NullDao), Arc::new(NullDao), Arc::new(NullDao));
//! let router = MessageRouter::new("quick-start", daos);
//! router.recover().await.unwrap();
//!
//! router.create_queue("q1", true).await.unwrap();
//! router.create_queue("q2", true).await.unwrap();
//! router.create_exchange("orders", "topic").await.unwrap();
//! router
//!     .bind("orders", Binding::new("orders.*.created", Some("q1"), None).unwrap())
//!     .await
//!     .unwrap();
//! router
//!     .bind("orders", Binding::new("orders.#", Some("q2"), None).unwrap())
//!     .await
//!     .unwrap();
//!
//! let queues = router.route("orders", "orders.eu.created", &Headers::new()).unwrap();
//! assert_eq!(queues.into_iter().collect::<Vec<_>>(), vec!["q1", "q2"]);
//!
//! let queues = router.route("orders", "orders.eu.cancelled", &Headers::new()).unwrap();
//! assert_eq!(queues.into_iter().collect::<Vec<_>>(), vec!["q2"]);
//! # });
//! ```
//!
//! Headers exchanges, and any binding carrying a filter, match on a filter expression
//! evaluated over message headers:
//!
//! ```
//! use broker_routing::{FilterExpression, HeaderValue, Headers};
//!
//! let filter = FilterExpression::parse("region = 'eu' AND priority > 5").unwrap();
//!
//! let mut headers = Headers::new();
//! headers.insert("region".to_string(), HeaderValue::from("eu"));
//! headers.insert("priority".to_string(), HeaderValue::from(7));
//! assert!(filter.evaluate(&headers).unwrap());
//!
//! headers.insert("priority".to_string(), HeaderValue::from(3));
//! assert!(!filter.evaluate(&headers).unwrap());
//! ```
//!
//! ## Internal architecture map
//!
//! - API facade: [`MessageRouter`]
//! - Routing: exchange types, topic patterns and the header filter language
//! - Control plane: routing-table snapshots, writer locks and the administrative lifecycle
//! - Persistence: record shapes and the generic [`Dao`] contract
//! - Recovery: lifecycle state and the startup loader
//!
//! ## Observability model
//!
//! The crate uses `tracing` for logs and events. Library code emits events and never
//! initializes a global subscriber. Binaries and tests are responsible for one-time
//! `tracing_subscriber` initialization at process boundaries.

mod binding;
mod control_plane;
mod errors;
mod headers;
#[doc(hidden)]
pub mod observability;
mod persistence;
mod queue;
mod recovery;
mod router;
mod routing;

pub use binding::Binding;
pub use errors::{
    AdminError, DurabilityError, NotFoundError, RecoveryError, RouteError, ValidationError,
};
pub use headers::{HeaderValue, Headers};
pub use persistence::{
    BindingRecord, CollectError, Collector, Dao, DaoSet, EntityKind, ExchangeRecord,
    QueueRecord, Record, RetrieveError, StoreOperation,
};
pub use queue::Queue;
pub use recovery::RecoveryState;
pub use router::MessageRouter;
pub use routing::exchange::Exchange;
pub use routing::exchange_type::ExchangeType;
pub use routing::filter_expression::{FilterEvaluationError, FilterExpression, FilterParseError};
