//! The resource model of an OCF device and the engine dispatching requests
//! against it.
//!
//! This crate provides APIs to:
//!
//! - Describe device capabilities as [`resource::Resource`]s. A resource is
//!   composed of one or more [`resource_type::ResourceType`]s, each one a
//!   named set of [`attribute::Attribute`]s.
//! - Bind each attribute to a [`value::Value`], which stores or computes the
//!   attribute state, and to a [`validator::Validator`], which decides
//!   whether a candidate payload is acceptable.
//! - Dispatch `CREATE`, `RETRIEVE`, `UPDATE`, and `DELETE` requests through
//!   [`interface::ResourceInterface`]s. Every resource is retrievable through
//!   the baseline interface, which aggregates all its attributes together
//!   with the `if` and `rt` metadata.
//! - Bracket each request with a [`transaction::Transaction`], so that an
//!   update commits exactly once after every attribute has been attempted.
//! - Register resources on a [`device::Device`], a registry which readers
//!   iterate over as a consistent snapshot while writers replace it.
//!
//! Data exchanged with the outside world is a [`payload::Payload`] tree.
//! Encoding it on the wire, as well as transport and authorization, is left
//! to the layers built on top of this crate.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod macros;

/// Attributes binding a value to its validator.
pub mod attribute;
/// Device configuration.
pub mod config;
/// The device resource registry.
pub mod device;
/// The `/oic/res` discovery resource.
pub mod discovery;
/// Error management.
pub mod error;
/// The `/oic/d` identity resource.
pub mod identity;
/// Resource interfaces and the baseline dispatch algorithm.
pub mod interface;
/// Deterministic iteration over unordered collections.
pub mod iterator;
/// `CREATE`, `RETRIEVE`, `UPDATE`, and `DELETE` operations on a resource.
pub mod operation;
/// The data tree exchanged with requests and responses.
pub mod payload;
/// Requests sent to a resource.
pub mod request;
/// Resource definition.
pub mod resource;
/// Resource types.
pub mod resource_type;
/// Transactions bracketing resource operations.
pub mod transaction;
/// Payload validators.
pub mod validator;
/// Attribute values.
pub mod value;

#[cfg(test)]
pub(crate) fn serialize<T: serde::Serialize>(value: T) -> serde_json::Value {
    serde_json::to_value(value).unwrap()
}

#[cfg(test)]
#[cfg(feature = "deserialize")]
pub(crate) fn deserialize<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).unwrap()
}
