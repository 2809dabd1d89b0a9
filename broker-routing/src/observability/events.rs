//! Canonical structured event names used across `broker-routing`.

// Publish-path events.
pub const ROUTE_DECISION: &str = "route_decision";
pub const ROUTE_EXCHANGE_MISSING: &str = "route_exchange_missing";
pub const ROUTE_REJECTED_NOT_READY: &str = "route_rejected_not_ready";
pub const ROUTE_FILTER_EVALUATION_FAILED: &str = "route_filter_evaluation_failed";

// Control-plane lifecycle events.
pub const EXCHANGE_CREATE_OK: &str = "exchange_create_ok";
pub const EXCHANGE_CREATE_NOOP: &str = "exchange_create_noop";
pub const EXCHANGE_CREATE_FAILED: &str = "exchange_create_failed";
pub const EXCHANGE_DELETE_OK: &str = "exchange_delete_ok";
pub const EXCHANGE_DELETE_FAILED: &str = "exchange_delete_failed";
pub const QUEUE_CREATE_OK: &str = "queue_create_ok";
pub const QUEUE_CREATE_NOOP: &str = "queue_create_noop";
pub const QUEUE_CREATE_FAILED: &str = "queue_create_failed";
pub const QUEUE_DELETE_OK: &str = "queue_delete_ok";
pub const QUEUE_DELETE_FAILED: &str = "queue_delete_failed";
pub const BINDING_ADD_START: &str = "binding_add_start";
pub const BINDING_ADD_OK: &str = "binding_add_ok";
pub const BINDING_ADD_NOOP: &str = "binding_add_noop";
pub const BINDING_ADD_FAILED: &str = "binding_add_failed";
pub const BINDING_REMOVE_START: &str = "binding_remove_start";
pub const BINDING_REMOVE_OK: &str = "binding_remove_ok";
pub const BINDING_REMOVE_FAILED: &str = "binding_remove_failed";

// Persistence events.
pub const STORE_COMPENSATION_OK: &str = "store_compensation_ok";
pub const STORE_COMPENSATION_FAILED: &str = "store_compensation_failed";

// Recovery events.
pub const RECOVERY_START: &str = "recovery_start";
pub const RECOVERY_PHASE_OK: &str = "recovery_phase_ok";
pub const RECOVERY_OK: &str = "recovery_ok";
pub const RECOVERY_FAILED: &str = "recovery_failed";
