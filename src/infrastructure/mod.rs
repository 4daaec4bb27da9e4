//! Infrastructure layer: durable stores, edge cache backends, and the
//! upstream HTTP client.

pub mod cache;
pub mod persistence;
pub mod upstream;
