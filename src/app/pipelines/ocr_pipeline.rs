use crate::adapters::csv_sink::CsvSink;
use crate::adapters::csv_source::CsvColumnSource;
use crate::adapters::http::build_client;
use crate::adapters::ocr::{OcrExtractor, TesseractCli};
use crate::config::AppConfig;
use crate::core::etl::EtlEngine;
use crate::core::{RunReport, Storage, TextRecognizer};
use crate::utils::error::Result;

pub type OcrEngine<S, R> = EtlEngine<CsvColumnSource, OcrExtractor<R>, CsvSink<S>>;

/// 圖片連結 → 下載 → OCR → CSV
pub async fn ocr_engine<S, R>(config: &AppConfig, storage: S, recognizer: R) -> Result<OcrEngine<S, R>>
where
    S: Storage,
    R: TextRecognizer,
{
    config.validate_ocr_job()?;
    let ocr = config.ocr()?;

    tracing::info!("🔎 OCR run {} → {}", ocr.input_path, ocr.output_path);

    let source = CsvColumnSource::open(&storage, &ocr.input_path, ocr.column()).await?;
    let extractor = OcrExtractor::new(build_client(ocr.request_timeout_seconds())?, recognizer);
    let sink = CsvSink::new(storage, ocr.output_path.clone()).with_header(ocr.header());

    Ok(
        EtlEngine::new_with_monitoring(source, extractor, sink, config.monitoring_enabled())
            .with_progress(config.progress_enabled()),
    )
}

/// Builds the tesseract recognizer described by the `[ocr]` section.
pub fn tesseract_from_config(config: &AppConfig) -> Result<TesseractCli> {
    let ocr = config.ocr()?;
    Ok(TesseractCli::new(ocr.tesseract_path()).with_language(ocr.language.clone()))
}

pub async fn run_ocr<S, R>(config: &AppConfig, storage: S, recognizer: R) -> Result<RunReport>
where
    S: Storage,
    R: TextRecognizer,
{
    ocr_engine(config, storage, recognizer).await?.run().await
}
