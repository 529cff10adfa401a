use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The canonical local record for one title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// Internal immutable identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// URL-friendly key derived from name and year
    pub slug: String,

    pub year: Option<i32>,

    /// Release date (if any provider supplied one)
    pub date: Option<NaiveDate>,

    /// Original language code
    pub language: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MovieRecord {
    pub fn new(name: String, year: Option<i32>) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let mut slug = slugify(&name, year);
        if slug.is_empty() {
            // Names without ASCII alphanumerics fall back to the id prefix.
            slug = id.simple().to_string()[..8].to_string();
        }
        Self {
            id,
            name,
            slug,
            year,
            date: None,
            language: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Strings handed to content providers when searching for releases.
    pub fn search_strings(&self) -> Vec<String> {
        let mut strings = Vec::with_capacity(2);
        if let Some(year) = self.year {
            strings.push(format!("{} {}", self.name, year));
        }
        strings.push(self.name.clone());
        strings
    }
}

/// Lowercase, ASCII alphanumerics joined by single dashes, year appended.
pub fn slugify(name: &str, year: Option<i32>) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));

    let lowered = name.to_lowercase();
    let base = re.replace_all(&lowered, "-");
    let base = base.trim_matches('-');

    match (base.is_empty(), year) {
        (false, Some(y)) => format!("{}-{}", base, y),
        (false, None) => base.to_string(),
        (true, Some(y)) => y.to_string(),
        (true, None) => String::new(),
    }
}
