//! Highlights and notes attached to document passages.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Color used when the client does not pick one.
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "yellow";

/// A highlighted passage with an optional note.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: String,
    pub document_id: String,
    pub owner_id: String,
    pub page: Option<i32>,
    pub text: String,
    pub note: Option<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Highlight {
    pub fn new(
        document_id: String,
        owner_id: String,
        page: Option<i32>,
        text: String,
        note: Option<String>,
        color: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            document_id,
            owner_id,
            page,
            text,
            note: note
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            color: color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_HIGHLIGHT_COLOR.to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Highlights belonging to one page.
#[derive(Debug, Clone, Serialize)]
pub struct HighlightGroup {
    pub page: Option<i32>,
    pub highlights: Vec<Highlight>,
}

/// Group highlights by page. Highlights without a page come first;
/// within a page, creation order is kept.
pub fn group_by_page(highlights: Vec<Highlight>) -> Vec<HighlightGroup> {
    let mut pages: BTreeMap<Option<i32>, Vec<Highlight>> = BTreeMap::new();
    for highlight in highlights {
        pages.entry(highlight.page).or_default().push(highlight);
    }

    pages
        .into_iter()
        .map(|(page, mut highlights)| {
            highlights.sort_by_key(|h| h.created_at);
            HighlightGroup { page, highlights }
        })
        .collect()
}
