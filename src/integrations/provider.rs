// src/integrations/provider.rs
//
// Contracts the catalog core consumes from metadata providers.
//
// Clients map provider payloads into typed `AttributeRecord`s at this
// boundary; nothing past it looks at raw JSON shapes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{AttributeRecord, ProviderSite};
use crate::error::AppResult;

/// Fetches one movie's attributes from a single provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    fn site(&self) -> ProviderSite;

    /// Errors: `ProviderNotFound` when the provider has no such code,
    /// `ProviderUnavailable` for transport / status failures,
    /// `MalformedPayload` when the body cannot be decoded.
    async fn fetch_by_code(&self, code: &str) -> AppResult<AttributeRecord>;
}

/// Maps a code on one provider to the same title's code on the other.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrossReference: Send + Sync {
    /// Canonical counterpart code, or `None` when there is no match.
    async fn counterpart(&self, code: &str, from: ProviderSite) -> AppResult<Option<String>>;
}

/// One hit from a provider's title search or popularity list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub site: ProviderSite,
    pub code: String,
    pub title: String,
    pub year: Option<i32>,
    pub overview: Option<String>,
}

/// Four-digit year at the start of a provider date string.
pub(crate) fn leading_year(value: &str) -> Option<i32> {
    let prefix = value.trim().get(..4)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}
