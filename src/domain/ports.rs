use crate::domain::model::{DerivedRecord, ItemResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Lazy, finite sequence of raw records. An `Err` aborts the run.
#[async_trait]
pub trait Source: Send {
    type Item: Send;

    async fn next_item(&mut self) -> Result<Option<Self::Item>>;

    /// Total number of items, when known up front.
    fn size_hint(&self) -> Option<usize> {
        None
    }
}

/// Maps one raw record to exactly one outcome.
#[async_trait]
pub trait Transformer: Send + Sync {
    type Input: Send;

    async fn transform(&self, item: Self::Input) -> ItemResult;
}

/// Persists the whole ordered result once, returning where it was written.
pub trait Sink: Send + Sync {
    fn write(
        &self,
        records: &[DerivedRecord],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &image::DynamicImage) -> Result<String>;
}
