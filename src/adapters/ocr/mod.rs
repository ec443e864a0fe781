pub mod tesseract;

use crate::core::{ItemFailure, ItemResult, TextRecognizer, Transformer};
use async_trait::async_trait;
use reqwest::Client;

pub use tesseract::TesseractCli;

/// Each line break becomes one space; the trailing page break is dropped.
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{c}')
        .to_string()
}

/// Downloads an image, decodes it and runs text recognition on it.
pub struct OcrExtractor<R: TextRecognizer> {
    client: Client,
    recognizer: R,
}

impl<R: TextRecognizer> OcrExtractor<R> {
    pub fn new(client: Client, recognizer: R) -> Self {
        Self { client, recognizer }
    }

    pub async fn extract(&self, url: &str) -> ItemResult {
        if url.is_empty() {
            return Err(ItemFailure::extraction("empty image URL"));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ItemFailure::extraction(format!("fetch failed: {}", e)))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| ItemFailure::extraction(format!("reading body failed: {}", e)))?;

        let image = image::load_from_memory(&body)
            .map_err(|e| ItemFailure::extraction(format!("not a decodable image: {}", e)))?;
        tracing::debug!("Decoded {}x{} image from {}", image.width(), image.height(), url);

        let text = self
            .recognizer
            .recognize(&image)
            .await
            .map_err(|e| ItemFailure::extraction(format!("recognition failed: {}", e)))?;

        Ok(normalize_text(&text))
    }
}

#[async_trait]
impl<R: TextRecognizer> Transformer for OcrExtractor<R> {
    type Input = String;

    async fn transform(&self, url: String) -> ItemResult {
        self.extract(&url).await
    }
}
