//! Pavilion - cricket league backend
//!
//! REST service persisting player records and a small set of global links
//! in DynamoDB. Request handling is stateless; all state lives in the
//! remote store behind the [`store::KeyValueStore`] seam.

pub mod config;
pub mod http;
pub mod links;
pub mod players;
pub mod store;
