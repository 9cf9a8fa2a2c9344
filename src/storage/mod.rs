//! Local persistence for host state.

pub mod auto_orders;

pub use auto_orders::{AutoOrderStore, StorageError, DEFAULT_STATE_PATH};
