//! Relatics data exchange operations
//!
//! Reading and importing go through the fixed `GetResult` and `Import`
//! envelopes of the data exchange service. Logging in lives in
//! [`crate::api::auth`], generic API operations in [`crate::api::client`].

pub mod operations;

pub use operations::{IMPORT_DATA_NOT_A_MAPPING, import_data, read_data};
