//! Upstream directory source implementations.

mod http_client;

pub use http_client::HttpUpstreamClient;
