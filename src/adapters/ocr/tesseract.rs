use crate::core::TextRecognizer;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs the `tesseract` binary, piping a PNG through stdin and reading text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
    language: Option<String>,
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| EtlError::OcrError {
                message: format!("cannot encode image for OCR: {}", e),
            })?;
        Ok(png)
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl TextRecognizer for TesseractCli {
    async fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let png = Self::encode_png(image)?;

        let mut command = Command::new(&self.binary);
        command.arg("stdin").arg("stdout");
        if let Some(language) = &self.language {
            command.arg("-l").arg(language);
        }

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EtlError::OcrError {
                message: format!("cannot start {}: {}", self.binary.display(), e),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&png).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(EtlError::OcrError {
                message: format!(
                    "{} exited with {}: {}",
                    self.binary.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
