//! Routing-decision layer.
//!
//! Owns exchange types, topic pattern matching and the header filter language. Everything
//! here is pure: deciding where a message goes never mutates state, so any number of
//! publishers can evaluate the same exchange concurrently.
//!
//! ```
//! use broker_routing::{Exchange, ExchangeType, Headers};
//!
//! // A freshly created exchange has no bindings and routes nowhere.
//! let orders = Exchange::new("orders", ExchangeType::Topic).unwrap();
//! assert!(orders.route("orders.eu.created", &Headers::new()).is_empty());
//! assert!(Exchange::from_type_name("orders", "x-unknown").is_err());
//! ```

pub(crate) mod exchange;
pub(crate) mod exchange_type;
pub(crate) mod filter_expression;
pub(crate) mod topic_pattern;
