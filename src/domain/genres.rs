// src/domain/genres.rs
//
// Genre merge: two providers' genre lists become one ordered, duplicate-free
// sequence where every tag remembers which provider it came from.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{AttributeRecord, GenreTag, ProviderSite};

/// A tag in the merged view, with the provider it was taken from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedGenre {
    pub origin: ProviderSite,
    pub tag: GenreTag,
}

/// Merge the genre lists of two records.
///
/// When `primary_first` is set the primary record's genres are emitted first
/// in their original order, otherwise the secondary's are. Names from the
/// list traversed second are only emitted if not already present. Matching is
/// exact and case-sensitive. Neither input is modified.
pub fn merge_genres(
    primary: &AttributeRecord,
    secondary: &AttributeRecord,
    primary_first: bool,
) -> Vec<MergedGenre> {
    let (first, second) = if primary_first {
        (primary, secondary)
    } else {
        (secondary, primary)
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged = Vec::with_capacity(first.genres.len() + second.genres.len());

    for record in [first, second] {
        for name in &record.genres {
            if name.trim().is_empty() || !seen.insert(name.as_str()) {
                continue;
            }
            merged.push(MergedGenre {
                origin: record.site,
                tag: GenreTag::new(name),
            });
        }
    }

    merged
}

/// The merged tags that originated from `site`, in merge order.
pub fn tags_for(merged: &[MergedGenre], site: ProviderSite) -> Vec<GenreTag> {
    merged
        .iter()
        .filter(|g| g.origin == site)
        .map(|g| g.tag.clone())
        .collect()
}
