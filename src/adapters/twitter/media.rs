use crate::core::{ItemFailure, ItemResult, Record, Transformer};
use async_trait::async_trait;

pub const DEFAULT_MEDIA_FIELD: &str = "media_url";

/// Pulls the first attached image link out of a post.
///
/// Only `entities.media[0]` is read; posts without attached media fail with
/// `MissingField`, which is expected for plain-text posts.
#[derive(Debug, Clone)]
pub struct MediaLinkExtractor {
    field: String,
}

impl MediaLinkExtractor {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    pub fn extract(&self, post: &Record) -> ItemResult {
        post.get("entities")
            .and_then(|entities| entities.get("media"))
            .and_then(|media| media.as_array())
            .and_then(|media| media.first())
            .and_then(|first| first.get(&self.field))
            .and_then(|url| url.as_str())
            .filter(|url| !url.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| ItemFailure::missing(format!("entities.media[0].{}", self.field)))
    }
}

impl Default for MediaLinkExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_FIELD)
    }
}

#[async_trait]
impl Transformer for MediaLinkExtractor {
    type Input = Record;

    async fn transform(&self, post: Record) -> ItemResult {
        self.extract(&post)
    }
}
