//! Query-to-URL resolution.
//!
//! Pure and deterministic: identical `(query, snapshot)` inputs always yield
//! identical output, keeping resolution independently testable from network
//! and storage concerns.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::entities::{DirectorySnapshot, PLACEHOLDER, Resolution};
use crate::utils::encode::encode_search_text;

/// First `!` followed by one or more non-whitespace characters.
static BANG_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!(\S+)").expect("bang token pattern is valid"));

/// The first bang token plus one following whitespace run.
static BANG_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\S+\s*").expect("bang strip pattern is valid"));

/// Resolves a raw search query against a directory snapshot.
///
/// A query without a bang token renders the default page. A bang that
/// matches no entry falls back to the configured default trigger's entry,
/// then to the snapshot's first entry; only an empty snapshot degrades to
/// the default page. When no search text remains after removing the bang,
/// the destination is the entry's bare domain.
pub fn resolve(raw_query: &str, snapshot: &DirectorySnapshot, default_trigger: &str) -> Resolution {
    let query = raw_query.trim();
    if query.is_empty() {
        return Resolution::ShowDefault;
    }

    let Some(captures) = BANG_TOKEN.captures(query) else {
        return Resolution::ShowDefault;
    };
    let trigger = captures[1].to_lowercase();

    let entry = snapshot
        .lookup(&trigger)
        .or_else(|| snapshot.lookup(default_trigger))
        .or_else(|| snapshot.first());
    let Some(entry) = entry else {
        return Resolution::ShowDefault;
    };

    let residual = BANG_STRIP.replacen(query, 1, "");
    let residual = residual.trim();

    if residual.is_empty() || !entry.has_placeholder() {
        return Resolution::Redirect(format!("https://{}", entry.domain));
    }

    let encoded = encode_search_text(residual);
    Resolution::Redirect(entry.url_template.replacen(PLACEHOLDER, &encoded, 1))
}
