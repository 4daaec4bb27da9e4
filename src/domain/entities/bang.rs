//! Bang entry representing one shorthand-to-URL mapping.

use serde::{Deserialize, Serialize};

/// Placeholder marker substituted with the percent-encoded search text.
pub const PLACEHOLDER: &str = "{{{s}}}";

/// A single directory record mapping a `!trigger` to a search destination.
///
/// Serialized with the upstream directory's compact field names
/// (`t` = trigger, `d` = domain, `u` = URL template, plus presentational
/// extras). Only `trigger`, `domain` and `url_template` participate in
/// resolution; the rest is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BangEntry {
    /// Short token selecting this entry, without the leading `!`.
    #[serde(rename = "t")]
    pub trigger: String,

    /// Bare host, used as the destination when no search text remains.
    #[serde(rename = "d")]
    pub domain: String,

    /// Destination URL containing [`PLACEHOLDER`] exactly once.
    ///
    /// A template without the placeholder is treated as domain-only.
    #[serde(rename = "u")]
    pub url_template: String,

    #[serde(rename = "c", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(rename = "sc", default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,

    #[serde(rename = "r", default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,

    #[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl BangEntry {
    /// Creates an entry with only the fields resolution cares about.
    pub fn new(
        trigger: impl Into<String>,
        domain: impl Into<String>,
        url_template: impl Into<String>,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            domain: domain.into(),
            url_template: url_template.into(),
            category: None,
            subcategory: None,
            rank: None,
            display_name: None,
        }
    }

    /// Returns true if the template carries the search-text placeholder.
    pub fn has_placeholder(&self) -> bool {
        self.url_template.contains(PLACEHOLDER)
    }
}
