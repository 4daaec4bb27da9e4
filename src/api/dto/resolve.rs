//! Query parameters for the resolve endpoint.

use serde::Deserialize;

/// `GET /?q=...` parameters.
#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    /// Free text optionally containing one `!trigger` token.
    pub q: Option<String>,
}
