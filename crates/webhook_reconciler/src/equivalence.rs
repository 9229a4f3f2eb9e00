//! Provider-neutral comparison of desired and actual hooks.
//!
//! Both sides are reduced to a [`ComparableHook`] before comparing. The
//! reduction drops everything that is assigned or rewritten by the provider
//! or that cannot be read back:
//!
//! - hook ID and resource type tag
//! - creation and update timestamps
//! - response, ping, test and delivery URLs
//! - the signing secret or token
//!
//! What remains is compared field by field. The event set is order
//! insensitive and the SSL setting is held in one canonical form,
//! `insecure_ssl == true` meaning certificates are not verified.

use std::collections::BTreeSet;

#[cfg(test)]
#[path = "equivalence_tests.rs"]
mod tests;

/// The comparable projection of a hook.
///
/// Fields a provider does not model are `None` on both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparableHook {
    pub url: String,
    pub events: BTreeSet<String>,
    pub active: Option<bool>,
    pub content_type: Option<String>,
    pub insecure_ssl: bool,
    pub branch_filter: Option<String>,
}

impl ComparableHook {
    /// Returns the names of the fields that differ, in a fixed order.
    pub fn differences(&self, other: &ComparableHook) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.url != other.url {
            fields.push("url");
        }
        if self.events != other.events {
            fields.push("events");
        }
        if self.active != other.active {
            fields.push("active");
        }
        if self.content_type != other.content_type {
            fields.push("content_type");
        }
        if self.insecure_ssl != other.insecure_ssl {
            fields.push("insecure_ssl");
        }
        if self.branch_filter != other.branch_filter {
            fields.push("branch_filter");
        }
        fields
    }

    /// Returns `true` when no compared field differs.
    pub fn is_equivalent(&self, other: &ComparableHook) -> bool {
        self.differences(other).is_empty()
    }
}

/// Maps an empty or whitespace-only branch filter to `None`.
pub fn normalize_branch_filter(filter: Option<&str>) -> Option<String> {
    filter
        .map(str::trim)
        .filter(|filter| !filter.is_empty())
        .map(str::to_string)
}
