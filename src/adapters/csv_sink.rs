use crate::core::{DerivedRecord, Sink, Storage};
use crate::utils::error::{EtlError, Result};

/// Writes records as a one-column CSV file, replacing whatever was there.
#[derive(Debug, Clone)]
pub struct CsvSink<S: Storage> {
    storage: S,
    path: String,
    header: Option<String>,
}

impl<S: Storage> CsvSink<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
            header: None,
        }
    }

    pub fn with_header(mut self, header: Option<String>) -> Self {
        self.header = header;
        self
    }

    pub fn encode(&self, records: &[DerivedRecord]) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

        if let Some(header) = &self.header {
            writer.write_record([header])?;
        }
        for record in records {
            writer.write_record([record])?;
        }

        writer.into_inner().map_err(|e| EtlError::SinkWriteError {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

impl<S: Storage> Sink for CsvSink<S> {
    async fn write(&self, records: &[DerivedRecord]) -> Result<String> {
        let data = self.encode(records)?;
        tracing::debug!("Writing {} bytes to {}", data.len(), self.path);

        self.storage
            .write_file(&self.path, &data)
            .await
            .map_err(|e| EtlError::SinkWriteError {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        Ok(self.path.clone())
    }
}
