//! Control-plane layer.
//!
//! Owns the routing table and the administrative lifecycle around it: queue and exchange
//! creation and deletion, bind and unbind. Changes are validated first, made durable
//! second and only then published, so publishers never observe a change the store did
//! not accept.
//!
//! ```
//! use broker_routing::{AdminError, Binding, Headers, MessageRouter, NotFoundError};
//! # use broker_routing::{CollectError, Collector, Dao, DaoSet, DurabilityError, Record, RetrieveError};
//! # use async_trait::async_trait;
//! # use std::sync::Arc;
//! #
//! # struct NullDao;
//! #
//! # #[async_trait]
//! # impl<T: Record> Dao<T> for NullDao {
//! #     async fn persist(&self, _record: &T) -> Result<(), DurabilityError> {
//! #         Ok(())
//! #     }
//! #
//! #     async fn delete(&self, _record: &T) -> Result<(), DurabilityError> {
//! #         Ok(())
//! #     }
//! #
//! #     async fn retrieve_all(&self, _collector: &mut dyn Collector<T>) -> Result<(), RetrieveError> {
//! #         Ok(())
//! #     }
//! # }
//! #
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! # let daos = DaoSet::new(Arc::new(NullDao), Arc::new(NullDao), Arc::new(NullDao));
//! let router = MessageRouter::new("control-plane-doc", daos);
//! router.recover().await.unwrap();
//!
//! router.create_queue("q1", true).await.unwrap();
//! router.create_exchange("orders", "direct").await.unwrap();
//!
//! // Bind and unbind are idempotent in one direction only.
//! let binding = Binding::new("created", Some("q1"), None).unwrap();
//! router.bind("orders", binding.clone()).await.unwrap();
//! router.bind("orders", binding).await.unwrap();
//! router.unbind("orders", "created", Some("q1")).await.unwrap();
//! assert!(matches!(
//!     router.unbind("orders", "created", Some("q1")).await,
//!     Err(AdminError::NotFound(NotFoundError::Binding { .. }))
//! ));
//! assert!(router.route("orders", "created", &Headers::new()).unwrap().is_empty());
//! # });
//! ```

pub(crate) mod binding_lifecycle;
pub(crate) mod exchange_lifecycle;
pub(crate) mod lifecycle;
pub(crate) mod queue_lifecycle;
pub(crate) mod routing_table;
pub(crate) mod writer_locks;
