pub mod link_pipeline;
pub mod ocr_pipeline;

pub use link_pipeline::{link_engine, run_link_extraction};
pub use ocr_pipeline::{ocr_engine, run_ocr, tesseract_from_config};
