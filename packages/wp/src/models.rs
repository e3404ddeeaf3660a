use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

/// One post as returned by `GET /wp-json/wp/v2/posts?_embed`.
///
/// Only the fields the importer consumes are modeled; WordPress sends
/// plenty more and serde ignores the rest.
#[derive(Debug, Clone, Deserialize)]
pub struct WpPost {
    pub id: i64,
    /// Site-local publish date, e.g. "2024-05-01T12:00:00".
    pub date: String,
    pub slug: String,
    pub status: String,
    pub title: WpRendered,
    pub content: WpRendered,
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<WpEmbedded>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WpRendered {
    pub rendered: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WpEmbedded {
    #[serde(rename = "wp:featuredmedia", default)]
    pub featured_media: Vec<WpMedia>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WpMedia {
    pub source_url: Option<String>,
}

impl WpPost {
    /// URL of the embedded featured image, when the post has one.
    pub fn cover_image_url(&self) -> Option<&str> {
        self.embedded
            .as_ref()?
            .featured_media
            .first()?
            .source_url
            .as_deref()
    }

    /// Publish timestamp. The `date` field is a naive site-local
    /// ISO-8601 string, taken as UTC here; offset-bearing strings are
    /// accepted too. Unparseable dates fall back to the current time.
    pub fn created_at_utc(&self) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(&self.date, "%Y-%m-%dT%H:%M:%S")
            .map(|naive| naive.and_utc())
            .or_else(|_| {
                DateTime::parse_from_rfc3339(&self.date).map(|dt| dt.with_timezone(&Utc))
            })
            .unwrap_or_else(|_| Utc::now())
    }
}
