//! Persistence layer.
//!
//! Defines the storage-engine boundary: record shapes, the generic [`Dao`] contract and the
//! streaming [`Collector`] used by bulk recovery. No storage engine lives in this crate.

mod dao;
mod records;

pub use dao::{CollectError, Collector, Dao, DaoSet, RetrieveError};
pub use records::{
    BindingRecord, EntityKind, ExchangeRecord, QueueRecord, Record, StoreOperation,
};
