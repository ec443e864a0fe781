use crate::core::{Source, Storage};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use std::io::Cursor;

/// Enumerates one column of a CSV file. The first row is a header and is skipped.
pub struct CsvColumnSource {
    reader: csv::Reader<Cursor<Vec<u8>>>,
    row: csv::StringRecord,
    column: usize,
    total: usize,
}

impl CsvColumnSource {
    pub async fn open<S: Storage>(storage: &S, path: &str, column: usize) -> Result<Self> {
        let data = storage
            .read_file(path)
            .await
            .map_err(|e| EtlError::EnumerationError {
                message: format!("cannot read input file '{}': {}", path, e),
            })?;

        let total = Self::reader_for(data.clone()).records().count();
        tracing::debug!("Input file {} has {} rows after the header", path, total);

        Ok(Self {
            reader: Self::reader_for(data),
            row: csv::StringRecord::new(),
            column,
            total,
        })
    }

    fn reader_for(data: Vec<u8>) -> csv::Reader<Cursor<Vec<u8>>> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(Cursor::new(data))
    }
}

#[async_trait]
impl Source for CsvColumnSource {
    type Item = String;

    async fn next_item(&mut self) -> Result<Option<String>> {
        if !self.reader.read_record(&mut self.row)? {
            return Ok(None);
        }
        // 欄位不存在時給空字串，交給 transformer 判定失敗
        let value = self.row.get(self.column).unwrap_or("").trim().to_string();
        Ok(Some(value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use tempfile::TempDir;

    async fn collect(source: &mut CsvColumnSource) -> Vec<String> {
        let mut items = Vec::new();
        while let Some(item) = source.next_item().await.unwrap() {
            items.push(item);
        }
        items
    }

    #[tokio::test]
    async fn test_skips_header_row() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("urls.csv"),
            "media_url\nhttp://img/1.png\nhttp://img/2.png\n",
        )
        .unwrap();
        let storage = LocalStorage::new(dir.path());

        let mut source = CsvColumnSource::open(&storage, "urls.csv", 0).await.unwrap();

        assert_eq!(source.size_hint(), Some(2));
        assert_eq!(
            collect(&mut source).await,
            vec!["http://img/1.png", "http://img/2.png"]
        );
    }

    #[tokio::test]
    async fn test_reads_configured_column() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("indexed.csv"), ",0\n0,http://a\n1,http://b\n").unwrap();
        let storage = LocalStorage::new(dir.path());

        let mut source = CsvColumnSource::open(&storage, "indexed.csv", 1).await.unwrap();

        assert_eq!(collect(&mut source).await, vec!["http://a", "http://b"]);
    }

    #[tokio::test]
    async fn test_short_row_yields_empty_item() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ragged.csv"), "id,url\n1,http://a\n2\n").unwrap();
        let storage = LocalStorage::new(dir.path());

        let mut source = CsvColumnSource::open(&storage, "ragged.csv", 1).await.unwrap();

        assert_eq!(collect(&mut source).await, vec!["http://a", ""]);
    }

    #[tokio::test]
    async fn test_header_only_file_is_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("empty.csv"), "media_url\n").unwrap();
        let storage = LocalStorage::new(dir.path());

        let mut source = CsvColumnSource::open(&storage, "empty.csv", 0).await.unwrap();

        assert_eq!(source.size_hint(), Some(0));
        assert!(source.next_item().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_enumeration_error() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        let result = CsvColumnSource::open(&storage, "nope.csv", 0).await;

        assert!(matches!(result, Err(EtlError::EnumerationError { .. })));
    }
}
