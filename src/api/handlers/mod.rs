//! HTTP request handlers.

mod bangs;
mod health;
mod resolve;

pub use bangs::{HASH_HEADER, UPDATED_AT_HEADER, bangs_handler};
pub use health::health_handler;
pub use resolve::resolve_handler;
